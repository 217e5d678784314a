use crate::Result;
use crate::random::{Keystream, RandomSource};

/// Probability that a leetspeak-able letter is replaced.
pub const LEET_INTENSITY: f64 = 0.4;

const ADJECTIVES: &[&str] = &[
    "Swift", "Bright", "Dark", "Silent", "Mighty", "Fierce", "Noble", "Wild", "Cosmic", "Electric",
    "Quantum", "Crystal", "Shadow", "Thunder", "Neon", "Cyber", "Digital", "Mystic", "Phoenix",
    "Dragon", "Storm", "Frost", "Blaze", "Steel", "Iron", "Gold", "Silver", "Crimson", "Azure",
    "Emerald",
];

const NOUNS: &[&str] = &[
    "Wolf", "Tiger", "Eagle", "Lion", "Bear", "Fox", "Hawk", "Panther", "Ninja", "Samurai",
    "Knight", "Warrior", "Hunter", "Ranger", "Sage", "Wizard", "Striker", "Phantom", "Specter",
    "Ghost", "Viper", "Cobra", "Raven", "Falcon", "Dragon", "Phoenix", "Titan", "Guardian",
    "Champion", "Legend",
];

const MODERN_ADJECTIVES: &[&str] = &[
    "Nova", "Prime", "Core", "Next", "True", "Urban", "North", "Blue", "Clear", "Flex", "Pure",
    "Apex", "Pulse", "Smart", "Bright", "Edge",
];

const MODERN_NOUNS: &[&str] = &[
    "Labs", "Works", "Desk", "Link", "Grid", "Ops", "Logic", "Layer", "Mode", "Flow", "Shift",
    "Loop", "Form", "Point", "Nest", "Peak",
];

const FIRST_NAMES: &[&str] = &[
    "Alex", "Jordan", "Morgan", "Taylor", "Avery", "Cameron", "Sydney", "Drew", "Logan", "Riley",
    "Casey", "Parker", "Reese", "Emerson", "Harper", "Rowan", "Blake", "Hayden", "Payton", "Quinn",
];

const LAST_NAMES: &[&str] = &[
    "Hughes", "Carter", "Bennett", "Morgan", "Reynolds", "Clark", "Dawson", "Ellis", "Foster",
    "Grant", "Hayes", "Jensen", "Keller", "Lawson", "Monroe", "Nash", "Porter", "Quincy", "Ramsey",
    "Sutton",
];

const PREFIXES: &[&str] = &[
    "xX", "i", "The", "Mr", "Dr", "Sir", "Lord", "Dark", "Pro", "Xx", "iAm", "Its", "Real",
    "Official", "True", "Epic", "Super", "Ultra",
];

const SUFFIXES: &[&str] = &[
    "Xx", "Gaming", "TV", "YT", "TTV", "HD", "Pro", "Elite", "Master", "King", "Boss", "Lord",
    "God", "Legend", "Official", "Real", "OG",
];

const LEET: &[(char, [char; 3])] = &[
    ('a', ['4', '@', '\u{3b1}']),
    ('e', ['3', '\u{20ac}', '\u{3b5}']),
    ('i', ['1', '!', '\u{ed}']),
    ('o', ['0', '\u{f8}', '\u{3c9}']),
    ('s', ['5', '$', '\u{15f}']),
    ('t', ['7', '+', '\u{163}']),
    ('l', ['1', '|', '\u{142}']),
    ('g', ['9', '&', '\u{11f}']),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Style {
    /// `first.last` style handles built from real-looking names.
    Professional,
    /// Leetspeak tags with optional prefix, suffix and number.
    Gamer,
    /// A modern adjective and noun.
    #[default]
    Random,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UsernameOptions {
    pub style: Style,
    /// Free text folded into the handle. Only ASCII letters, digits and
    /// whitespace survive sanitization.
    pub keyword: String,
}

impl UsernameOptions {
    pub fn new(style: Style) -> Self {
        Self {
            style,
            keyword: String::new(),
        }
    }

    pub fn keyword(mut self, keyword: impl Into<String>) -> Self {
        self.keyword = keyword.into();
        self
    }
}

pub fn generate_username(options: &UsernameOptions) -> Result<String> {
    let mut rng = Keystream::from_entropy()?;
    Ok(generate_username_with(&mut rng, options))
}

pub fn generate_username_with<R: RandomSource>(rng: &mut R, options: &UsernameOptions) -> String {
    let keyword = sanitize_keyword(&options.keyword);
    match options.style {
        Style::Professional => professional(rng, &keyword),
        Style::Gamer => gamer(rng, &keyword),
        Style::Random => random(rng, &keyword),
    }
}

/// Keep ASCII letters, digits and whitespace, trimmed.
fn sanitize_keyword(keyword: &str) -> String {
    keyword
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || c.is_whitespace())
        .collect::<String>()
        .trim()
        .to_string()
}

/// Lowercase ASCII letters and digits only.
fn sanitize_name(value: &str) -> String {
    value
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

fn choose<R: RandomSource>(rng: &mut R, items: &[&'static str]) -> &'static str {
    rng.pick(items).copied().unwrap_or_default()
}

fn professional<R: RandomSource>(rng: &mut R, keyword: &str) -> String {
    let parts: Vec<&str> = keyword.split_whitespace().collect();
    if parts.len() >= 2 {
        let first = sanitize_name(parts[0]);
        let last = sanitize_name(parts[parts.len() - 1]);
        if !first.is_empty() && !last.is_empty() {
            return professional_handle(rng, &first, &last);
        }
    }

    let name = sanitize_name(keyword);
    if !name.is_empty() {
        return if rng.rand_float() > 0.5 {
            let first = sanitize_name(choose(rng, FIRST_NAMES));
            professional_handle(rng, &first, &name)
        } else {
            let last = sanitize_name(choose(rng, LAST_NAMES));
            professional_handle(rng, &name, &last)
        };
    }

    let first = sanitize_name(choose(rng, FIRST_NAMES));
    let last = sanitize_name(choose(rng, LAST_NAMES));
    professional_handle(rng, &first, &last)
}

fn professional_handle<R: RandomSource>(rng: &mut R, first: &str, last: &str) -> String {
    let first = if first.is_empty() { "user" } else { first };
    let last = if last.is_empty() { "team" } else { last };
    let initial = &first[..1];

    match rng.rand_int(6) {
        0 => format!("{}.{}", first, last),
        1 => format!("{}_{}", first, last),
        2 => format!("{}{}", first, last),
        3 => format!("{}.{}", last, first),
        4 => format!("{}{}", initial, last),
        _ => format!("{}.{}{}", first, last, rng.rand_int(40) + 10),
    }
}

fn gamer<R: RandomSource>(rng: &mut R, keyword: &str) -> String {
    let mut base = sanitize_name(keyword);
    if base.is_empty() {
        base = format!("{}{}", choose(rng, ADJECTIVES), choose(rng, NOUNS));
    }

    let mut handle = leetspeak(rng, &base, LEET_INTENSITY);

    if rng.rand_float() < 0.5 {
        handle.insert_str(0, choose(rng, PREFIXES));
    }
    if rng.rand_float() < 0.5 {
        handle.push_str(choose(rng, SUFFIXES));
    }
    if rng.rand_float() < 0.6 {
        handle.push_str(&(rng.rand_int(999) + 100).to_string());
    }

    handle
}

/// Replace each leetspeak-able letter with probability `intensity`.
fn leetspeak<R: RandomSource>(rng: &mut R, text: &str, intensity: f64) -> String {
    text.chars()
        .map(|ch| {
            let lower = ch.to_ascii_lowercase();
            match LEET.iter().find(|(letter, _)| *letter == lower) {
                Some((_, replacements)) if rng.rand_float() < intensity => {
                    replacements[rng.rand_int(replacements.len())]
                }
                _ => ch,
            }
        })
        .collect()
}

fn random<R: RandomSource>(rng: &mut R, keyword: &str) -> String {
    let name = sanitize_name(keyword);
    if !name.is_empty() {
        let adjective = choose(rng, MODERN_ADJECTIVES);
        if rng.rand_float() > 0.5 {
            return format!("{}{}", capitalize(&name), choose(rng, MODERN_NOUNS));
        }
        return format!("{}{}", adjective, capitalize(&name));
    }

    let mut handle = format!(
        "{}{}",
        choose(rng, MODERN_ADJECTIVES),
        choose(rng, MODERN_NOUNS)
    );
    if handle.len() < 12 && rng.rand_float() < 0.5 {
        handle.push_str(&(rng.rand_int(90) + 10).to_string());
    }
    handle
}

fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}
