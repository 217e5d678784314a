use std::collections::{BTreeSet, HashSet};

use tracing::debug;
use zeroize::Zeroizing;

use crate::charset::{CharClasses, DEFAULT_EMOJI, NON_LATIN_RANGES, ScriptRange, basic_pool};
use crate::random::{Keystream, RandomSource};
use crate::wordlist::EMOJI;
use crate::{Error, Result};

/// Attempts per character before a range draw accepts a duplicate.
pub const MAX_RANGE_ATTEMPTS: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Unique characters from the lookalike-free pool.
    #[default]
    Basic,
    /// Even quotas across every enabled character class.
    Universal,
}

/// Options for [`generate_password`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationOptions {
    pub length: usize,
    pub mode: Mode,
    /// Only consulted in [`Mode::Universal`].
    pub classes: CharClasses,
    /// Characters never emitted in [`Mode::Universal`].
    pub excluded: BTreeSet<char>,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            length: 12,
            mode: Mode::Basic,
            classes: CharClasses::default(),
            excluded: BTreeSet::new(),
        }
    }
}

impl GenerationOptions {
    pub fn new(length: usize) -> Self {
        Self {
            length,
            ..Default::default()
        }
    }

    pub fn basic(mut self) -> Self {
        self.mode = Mode::Basic;
        self
    }

    pub fn universal(mut self) -> Self {
        self.mode = Mode::Universal;
        self
    }

    pub fn classes(mut self, classes: CharClasses) -> Self {
        self.classes = classes;
        self
    }

    /// Add every character of `chars` to the exclusion set.
    pub fn exclude(mut self, chars: &str) -> Self {
        self.excluded.extend(chars.chars());
        self
    }
}

enum Pool<'a> {
    Literal(Vec<char>),
    Glyphs(Vec<&'a str>),
    Ranges(&'static [ScriptRange]),
}

/// One generated glyph tagged with the class that produced it.
#[derive(Debug, Clone)]
pub(crate) struct Piece {
    pub class: CharClasses,
    pub glyph: String,
}

/// Generate a password with a fresh OS-keyed stream.
///
/// The emoji class uses the installed [`EMOJI`] list, or the built-in set
/// when none was installed.
pub fn generate_password(options: &GenerationOptions) -> Result<Zeroizing<String>> {
    let mut rng = Keystream::from_entropy()?;
    match EMOJI.get() {
        Some(emoji) => generate_password_with(&mut rng, options, emoji.as_slice()),
        None => generate_password_with(&mut rng, options, DEFAULT_EMOJI),
    }
}

pub fn generate_password_with<R, S>(
    rng: &mut R,
    options: &GenerationOptions,
    emoji: &[S],
) -> Result<Zeroizing<String>>
where
    R: RandomSource,
    S: AsRef<str>,
{
    if options.length == 0 {
        return Err(Error::InvalidOptions(
            "password length must be at least 1".to_string(),
        ));
    }

    let password = match options.mode {
        Mode::Basic => generate_basic(rng, options.length),
        Mode::Universal => generate_universal(
            rng,
            options.length,
            options.classes,
            &options.excluded,
            emoji,
        ),
    };

    Ok(Zeroizing::new(password))
}

/// Shuffle the lookalike-free pool and keep the first `length` characters.
///
/// `length` is clamped to the pool size, so no character ever repeats.
pub fn generate_basic<R: RandomSource>(rng: &mut R, length: usize) -> String {
    let pool = basic_pool();
    let length = if length > pool.len() {
        debug!(requested = length, pool = pool.len(), "clamping basic password length");
        pool.len()
    } else {
        length
    };

    rng.shuffle(&pool).into_iter().take(length).collect()
}

/// Split `length` evenly across the enabled classes, spreading the
/// remainder over a random subset of them, then shuffle the result.
///
/// Falls back to [`generate_basic`] when no enabled class has anything left
/// after exclusions.
pub fn generate_universal<R, S>(
    rng: &mut R,
    length: usize,
    classes: CharClasses,
    excluded: &BTreeSet<char>,
    emoji: &[S],
) -> String
where
    R: RandomSource,
    S: AsRef<str>,
{
    let pools = resolve_pools(classes, excluded, emoji);
    if pools.is_empty() {
        debug!(?classes, "no usable character class, falling back to basic mode");
        return generate_basic(rng, length);
    }

    let pieces = assemble(rng, length, &pools, excluded);
    debug!(
        counts = ?pools
            .iter()
            .map(|(class, _)| (*class, pieces.iter().filter(|p| p.class == *class).count()))
            .collect::<Vec<_>>(),
        "assembled universal password"
    );

    pieces.into_iter().map(|piece| piece.glyph).collect()
}

fn resolve_pools<'a, S: AsRef<str>>(
    classes: CharClasses,
    excluded: &BTreeSet<char>,
    emoji: &'a [S],
) -> Vec<(CharClasses, Pool<'a>)> {
    let mut pools = Vec::new();

    for class in classes.iter() {
        let pool = if let Some(alphabet) = class.literal() {
            let chars: Vec<char> = alphabet.chars().filter(|c| !excluded.contains(c)).collect();
            if chars.is_empty() {
                continue;
            }
            Pool::Literal(chars)
        } else if class == CharClasses::NON_LATIN {
            Pool::Ranges(NON_LATIN_RANGES)
        } else if class == CharClasses::EMOJI {
            let glyphs: Vec<&str> = emoji
                .iter()
                .map(AsRef::as_ref)
                .filter(|g| !g.is_empty() && !g.chars().any(|c| excluded.contains(&c)))
                .collect();
            if glyphs.is_empty() {
                continue;
            }
            Pool::Glyphs(glyphs)
        } else {
            continue;
        };
        pools.push((class, pool));
    }

    pools
}

/// Per-class counts: `length / classes` each, plus one for a randomly chosen
/// `length % classes` of them.
pub(crate) fn plan_quotas<R: RandomSource>(rng: &mut R, length: usize, classes: usize) -> Vec<usize> {
    if classes == 0 {
        return Vec::new();
    }

    let mut quotas = vec![length / classes; classes];
    let order: Vec<usize> = (0..classes).collect();
    for index in rng.shuffle(&order).into_iter().take(length % classes) {
        quotas[index] += 1;
    }
    quotas
}

fn assemble<R: RandomSource>(
    rng: &mut R,
    length: usize,
    pools: &[(CharClasses, Pool<'_>)],
    excluded: &BTreeSet<char>,
) -> Vec<Piece> {
    let quotas = plan_quotas(rng, length, pools.len());
    let mut pieces: Vec<Piece> = Vec::with_capacity(length);
    let mut used: HashSet<char> = HashSet::new();

    for ((class, pool), &quota) in pools.iter().zip(quotas.iter()) {
        let glyphs: Vec<String> = match pool {
            Pool::Literal(chars) => fill_literal(rng, chars, quota)
                .into_iter()
                .map(String::from)
                .collect(),
            Pool::Glyphs(glyphs) => fill_literal(rng, glyphs, quota)
                .into_iter()
                .map(str::to_string)
                .collect(),
            Pool::Ranges(ranges) => {
                let mut drawn = Vec::with_capacity(quota);
                for _ in 0..quota {
                    let Some(ch) = draw_from_ranges(rng, ranges, excluded, &used) else {
                        debug!(?class, "every code point in range is excluded");
                        break;
                    };
                    used.insert(ch);
                    drawn.push(ch.to_string());
                }
                drawn
            }
        };

        for glyph in glyphs {
            used.extend(glyph.chars());
            pieces.push(Piece {
                class: *class,
                glyph,
            });
        }
    }

    rng.shuffle_in_place(&mut pieces);
    pieces
}

/// Unique draws while the pool lasts; past that, the whole pool once and
/// independent picks for the rest.
fn fill_literal<R: RandomSource, T: Copy>(rng: &mut R, pool: &[T], quota: usize) -> Vec<T> {
    if quota <= pool.len() {
        return rng.sample(pool, quota);
    }

    let mut out = pool.to_vec();
    while out.len() < quota {
        if let Some(item) = rng.pick(pool) {
            out.push(*item);
        }
    }
    out
}

/// One code point from `ranges` that is neither excluded nor already used.
///
/// After [`MAX_RANGE_ATTEMPTS`] random draws the best candidate wins: a
/// repeat of a used character, or failing that the first allowed code point
/// in range order. Excluded characters are never returned.
fn draw_from_ranges<R: RandomSource>(
    rng: &mut R,
    ranges: &[ScriptRange],
    excluded: &BTreeSet<char>,
    used: &HashSet<char>,
) -> Option<char> {
    if ranges.is_empty() {
        return None;
    }

    let mut duplicate = None;
    for _ in 0..MAX_RANGE_ATTEMPTS {
        let range = ranges[rng.rand_int(ranges.len())];
        let code = range.start + rng.rand_int(range.len()) as u32;
        let Some(ch) = char::from_u32(code) else {
            continue;
        };

        if excluded.contains(&ch) {
            continue;
        }
        if !used.contains(&ch) {
            return Some(ch);
        }
        duplicate = Some(ch);
    }

    if duplicate.is_some() {
        debug!(attempts = MAX_RANGE_ATTEMPTS, "range draw exhausted its retries, accepting a duplicate");
        return duplicate;
    }

    debug!(attempts = MAX_RANGE_ATTEMPTS, "range draw only hit excluded characters, scanning");
    let mut allowed = ranges
        .iter()
        .flat_map(|range| range.start..=range.end)
        .filter_map(char::from_u32)
        .filter(|ch| !excluded.contains(ch))
        .peekable();
    let first = allowed.peek().copied();
    allowed.find(|ch| !used.contains(ch)).or(first)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charset::{DIGITS, LOOKALIKES, LOWERCASE, SYMBOLS, UPPERCASE};
    use crate::random::tests::{replay, seeded};
    use std::collections::HashMap;

    const GREEK: &[ScriptRange] = &[ScriptRange {
        name: "greek",
        start: 0x03b1,
        end: 0x03c9,
    }];

    const NO_EMOJI: &[&str] = &[];

    fn in_class(class: CharClasses, glyph: &str, emoji: &[&str]) -> bool {
        if let Some(alphabet) = class.literal() {
            return glyph.chars().count() == 1 && alphabet.contains(glyph);
        }
        if class == CharClasses::NON_LATIN {
            let ch = glyph.chars().next().unwrap();
            return NON_LATIN_RANGES.iter().any(|r| r.contains(ch));
        }
        emoji.contains(&glyph)
    }

    #[test]
    fn test_basic_length_and_uniqueness() {
        let mut rng = seeded();
        for len in [1usize, 12, 20, 84] {
            let password = generate_basic(&mut rng, len);
            assert_eq!(password.chars().count(), len);

            let unique: HashSet<char> = password.chars().collect();
            assert_eq!(unique.len(), len, "Repeated character in \"{}\"", password);

            for ch in LOOKALIKES.chars() {
                assert!(!password.contains(ch), "Lookalike \"{}\" in \"{}\"", ch, password);
            }
        }
    }

    #[test]
    fn test_basic_clamps_to_pool() {
        let mut rng = seeded();
        let password = generate_basic(&mut rng, 200);
        assert_eq!(password.chars().count(), basic_pool().len());
    }

    #[test]
    fn test_plan_quotas_sum_and_spread() {
        let mut rng = seeded();
        for (length, classes) in [(10usize, 4usize), (21, 7), (3, 7), (16, 1)] {
            let quotas = plan_quotas(&mut rng, length, classes);
            assert_eq!(quotas.len(), classes);
            assert_eq!(quotas.iter().sum::<usize>(), length);

            let base = length / classes;
            assert!(quotas.iter().all(|&q| q == base || q == base + 1));
            assert_eq!(
                quotas.iter().filter(|&&q| q == base + 1).count(),
                length % classes
            );
        }
    }

    #[test]
    fn test_plan_quotas_remainder_not_fixed() {
        let mut rng = seeded();
        let mut extra = [0usize; 4];
        for _ in 0..400 {
            let quotas = plan_quotas(&mut rng, 5, 4);
            let index = quotas.iter().position(|&q| q == 2).unwrap();
            extra[index] += 1;
        }
        assert!(extra.iter().all(|&c| c > 50), "remainder favours a class: {:?}", extra);
    }

    #[test]
    fn test_universal_quota_counts_all_classes() {
        let mut rng = seeded();
        let emoji = DEFAULT_EMOJI;
        let excluded = BTreeSet::new();
        let pools = resolve_pools(CharClasses::all(), &excluded, emoji);
        assert_eq!(pools.len(), 7);

        for length in [7usize, 10, 21, 40] {
            let pieces = assemble(&mut rng, length, &pools, &excluded);
            assert_eq!(pieces.len(), length);

            let mut counts: HashMap<CharClasses, usize> = HashMap::new();
            for piece in &pieces {
                assert!(
                    in_class(piece.class, &piece.glyph, emoji),
                    "\"{}\" does not belong to {:?}",
                    piece.glyph,
                    piece.class
                );
                *counts.entry(piece.class).or_default() += 1;
            }

            assert_eq!(counts.values().sum::<usize>(), length);
            assert_eq!(counts.len(), 7, "every class should be represented");
            let base = length / 7;
            assert!(counts.values().all(|&c| c == base || c == base + 1));
        }
    }

    #[test]
    fn test_universal_string_length() {
        let mut rng = seeded();
        let password = generate_universal(
            &mut rng,
            16,
            CharClasses::all(),
            &BTreeSet::new(),
            DEFAULT_EMOJI,
        );
        assert_eq!(password.chars().count(), 16);
    }

    #[test]
    fn test_universal_only_enabled_pools() {
        let mut rng = seeded();
        let classes = CharClasses::LOWERCASE | CharClasses::NUMBERS;
        for _ in 0..50 {
            let password = generate_universal(&mut rng, 12, classes, &BTreeSet::new(), NO_EMOJI);
            assert!(password.chars().all(|c| LOWERCASE.contains(c) || DIGITS.contains(c)));
            assert_eq!(password.chars().filter(|c| c.is_ascii_digit()).count(), 6);
        }
    }

    #[test]
    fn test_universal_respects_exclusions() {
        let mut rng = seeded();
        let excluded: BTreeSet<char> = "abcXYZ019!@".chars().collect();
        for _ in 0..50 {
            let password =
                generate_universal(&mut rng, 30, CharClasses::default(), &excluded, NO_EMOJI);
            assert_eq!(password.chars().count(), 30);
            assert!(!password.chars().any(|c| excluded.contains(&c)), "\"{}\"", password);
        }
    }

    #[test]
    fn test_universal_drops_fully_excluded_class() {
        let mut rng = seeded();
        let excluded: BTreeSet<char> = DIGITS.chars().collect();
        let classes = CharClasses::NUMBERS | CharClasses::UPPERCASE;
        let password = generate_universal(&mut rng, 10, classes, &excluded, NO_EMOJI);
        assert!(password.chars().all(|c| UPPERCASE.contains(c)));
    }

    #[test]
    fn test_universal_falls_back_to_basic() {
        let mut rng = seeded();
        let pool = basic_pool();

        let password = generate_universal(&mut rng, 14, CharClasses::empty(), &BTreeSet::new(), NO_EMOJI);
        assert_eq!(password.chars().count(), 14);
        assert!(password.chars().all(|c| pool.contains(&c)));

        // Emoji enabled with no glyphs available behaves the same way.
        let password = generate_universal(&mut rng, 14, CharClasses::EMOJI, &BTreeSet::new(), NO_EMOJI);
        assert!(password.chars().all(|c| pool.contains(&c)));
    }

    #[test]
    fn test_universal_quota_exceeding_pool() {
        let mut rng = seeded();
        let password =
            generate_universal(&mut rng, 25, CharClasses::NUMBERS, &BTreeSet::new(), NO_EMOJI);
        assert_eq!(password.len(), 25);
        for digit in DIGITS.chars() {
            assert!(password.contains(digit), "Digit {} missing from \"{}\"", digit, password);
        }
    }

    #[test]
    fn test_universal_small_pool_unique() {
        let mut rng = seeded();
        for _ in 0..50 {
            let password =
                generate_universal(&mut rng, 15, CharClasses::SYMBOLS, &BTreeSet::new(), NO_EMOJI);
            let unique: HashSet<char> = password.chars().collect();
            assert_eq!(unique.len(), SYMBOLS.len());
        }
    }

    #[test]
    fn test_universal_non_latin_unique() {
        let mut rng = seeded();
        let password =
            generate_universal(&mut rng, 40, CharClasses::NON_LATIN, &BTreeSet::new(), NO_EMOJI);
        let chars: Vec<char> = password.chars().collect();
        assert_eq!(chars.len(), 40);
        assert!(chars.iter().all(|&c| NON_LATIN_RANGES.iter().any(|r| r.contains(c))));

        let unique: HashSet<&char> = chars.iter().collect();
        assert_eq!(unique.len(), chars.len());
    }

    #[test]
    fn test_universal_custom_emoji() {
        let mut rng = seeded();
        let emoji = vec!["\u{1f34f}".to_string(), "\u{1f350}".to_string()];
        let password = generate_universal(&mut rng, 6, CharClasses::EMOJI, &BTreeSet::new(), &emoji);
        assert_eq!(password.chars().count(), 6);
        assert!(password.chars().all(|c| c == '\u{1f34f}' || c == '\u{1f350}'));
    }

    #[test]
    fn test_generate_password_zero_length() {
        let mut rng = seeded();
        let result = generate_password_with(&mut rng, &GenerationOptions::new(0), NO_EMOJI);
        assert!(matches!(result, Err(Error::InvalidOptions(_))));
    }

    #[test]
    fn test_generate_password_modes() {
        let basic = generate_password(&GenerationOptions::new(16)).unwrap();
        assert_eq!(basic.chars().count(), 16);

        let options = GenerationOptions::new(18)
            .universal()
            .classes(CharClasses::all())
            .exclude("O0");
        let universal = generate_password(&options).unwrap();
        assert_eq!(universal.chars().count(), 18);
        assert!(!universal.contains('O') && !universal.contains('0'));
    }

    #[test]
    fn test_generate_password_deterministic() {
        let options = GenerationOptions::new(20).universal();
        let first = generate_password_with(&mut seeded(), &options, NO_EMOJI).unwrap();
        let second = generate_password_with(&mut seeded(), &options, NO_EMOJI).unwrap();
        assert_eq!(*first, *second);
    }

    #[test]
    fn test_options_builder() {
        let options = GenerationOptions::new(9).universal().exclude("ab").exclude("b");
        assert_eq!(options.length, 9);
        assert_eq!(options.mode, Mode::Universal);
        assert_eq!(options.classes, CharClasses::default());
        assert_eq!(options.excluded.len(), 2);
        assert_eq!(options.basic().mode, Mode::Basic);
    }

    #[test]
    fn test_range_draw_accepts_duplicate_at_retry_cap() {
        let mut rng = replay(vec![0]);
        let used: HashSet<char> = ['\u{3b1}'].into_iter().collect();

        let ch = draw_from_ranges(&mut rng, GREEK, &BTreeSet::new(), &used);
        assert_eq!(ch, Some('\u{3b1}'));
        // One draw for the range and one for the code point per attempt.
        assert_eq!(rng.draws(), 2 * MAX_RANGE_ATTEMPTS);
    }

    #[test]
    fn test_range_draw_never_returns_excluded() {
        let excluded: BTreeSet<char> = ['\u{3b1}'].into_iter().collect();

        let mut rng = replay(vec![0]);
        let ch = draw_from_ranges(&mut rng, GREEK, &excluded, &HashSet::new());
        assert_eq!(ch, Some('\u{3b2}'));
        assert_eq!(rng.draws(), 2 * MAX_RANGE_ATTEMPTS);

        let used: HashSet<char> = ['\u{3b2}'].into_iter().collect();
        let ch = draw_from_ranges(&mut replay(vec![0]), GREEK, &excluded, &used);
        assert_eq!(ch, Some('\u{3b3}'));
    }

    #[test]
    fn test_range_draw_everything_excluded() {
        let tiny = [ScriptRange {
            name: "tiny",
            start: 0x03b1,
            end: 0x03b2,
        }];
        let excluded: BTreeSet<char> = ['\u{3b1}', '\u{3b2}'].into_iter().collect();
        let ch = draw_from_ranges(&mut replay(vec![0]), &tiny, &excluded, &HashSet::new());
        assert_eq!(ch, None);
    }

    #[test]
    fn test_universal_exclusion_holds_when_draws_keep_hitting_it() {
        let first = char::from_u32(NON_LATIN_RANGES[0].start).unwrap();
        let excluded: BTreeSet<char> = [first].into_iter().collect();
        let mut rng = replay(vec![0]);

        let password = generate_universal(&mut rng, 3, CharClasses::NON_LATIN, &excluded, NO_EMOJI);
        let mut chars: Vec<char> = password.chars().collect();
        chars.sort_unstable();
        assert_eq!(chars, ['\u{a2}', '\u{a3}', '\u{a4}'], "\"{}\"", password);
    }
}
