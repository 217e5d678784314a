use zeroize::Zeroizing;

use crate::charset::DIGITS;
use crate::random::{Keystream, RandomSource};
use crate::wordlist::Memo;
use crate::{Error, Result};

/// Symbols paired with a digit between words of an advanced passphrase.
pub const SEPARATOR_SYMBOLS: &str = "!@#$%^&*+-_=?:|~";

/// Distinct digit and symbol pairs a separator can take.
pub const SEPARATOR_ALPHABET_SIZE: usize = 10 * 16;

const PRIME_OFFSETS: [usize; 3] = [3, 5, 7];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PassphraseOptions {
    pub word_count: usize,
    /// Capitalize words and join them with digit and symbol separators.
    pub advanced: bool,
}

impl Default for PassphraseOptions {
    fn default() -> Self {
        Self {
            word_count: 5,
            advanced: false,
        }
    }
}

impl PassphraseOptions {
    pub fn new(word_count: usize) -> Self {
        Self {
            word_count,
            ..Default::default()
        }
    }

    pub fn advanced(mut self, advanced: bool) -> Self {
        self.advanced = advanced;
        self
    }
}

/// Generate a passphrase from a caller-supplied wordlist.
pub fn generate_passphrase<S: AsRef<str>>(
    wordlist: &[S],
    options: &PassphraseOptions,
) -> Result<Zeroizing<String>> {
    validate(wordlist.len(), options)?;
    let mut rng = Keystream::from_entropy()?;
    generate_passphrase_with(&mut rng, wordlist, options)
}

/// Generate a passphrase from a memoized wordlist, running `load` only if
/// the cache is still empty.
pub fn generate_passphrase_cached<F>(
    cache: &Memo<Vec<String>>,
    load: F,
    options: &PassphraseOptions,
) -> Result<Zeroizing<String>>
where
    F: FnOnce() -> Result<Vec<String>>,
{
    let words = cache.get_or_load(load)?;
    generate_passphrase(words.as_slice(), options)
}

pub fn generate_passphrase_with<R, S>(
    rng: &mut R,
    wordlist: &[S],
    options: &PassphraseOptions,
) -> Result<Zeroizing<String>>
where
    R: RandomSource,
    S: AsRef<str>,
{
    validate(wordlist.len(), options)?;

    let digits: Vec<char> = DIGITS.chars().collect();
    let symbols: Vec<char> = SEPARATOR_SYMBOLS.chars().collect();
    let mut separators: Vec<String> = Vec::new();
    if options.advanced {
        for _ in 1..options.word_count {
            let mut separator = String::with_capacity(2);
            separator.extend(rng.pick(&digits));
            separator.extend(rng.pick(&symbols));
            separators.push(separator);
        }
    }

    let indices: Vec<usize> = (0..wordlist.len()).collect();
    let mut selected = rng.shuffle(&indices);
    selected.truncate(options.word_count);
    let selected = entropic_shuffle(rng, selected);

    let words = selected.iter().map(|&index| {
        let word = wordlist[index].as_ref().to_lowercase();
        if options.advanced {
            capitalize(&word)
        } else {
            word
        }
    });

    let mut passphrase = Zeroizing::new(String::new());
    if options.advanced {
        for (i, word) in words.enumerate() {
            passphrase.push_str(&word);
            if let Some(separator) = separators.get(i) {
                passphrase.push_str(separator);
            }
        }
    } else {
        for (i, word) in words.enumerate() {
            if i > 0 {
                passphrase.push(' ');
            }
            passphrase.push_str(&word);
        }
    }

    Ok(passphrase)
}

fn validate(available: usize, options: &PassphraseOptions) -> Result<()> {
    if options.word_count == 0 {
        return Err(Error::InvalidOptions(
            "passphrase needs at least one word".to_string(),
        ));
    }
    if available == 0 || available < options.word_count {
        return Err(Error::WordlistUnavailable {
            available,
            required: options.word_count,
        });
    }
    Ok(())
}

/// Shuffle, then for each prime offset rotate left by `prime % len`,
/// reverse on even passes, and shuffle again.
pub(crate) fn entropic_shuffle<R: RandomSource, T: Clone>(rng: &mut R, items: Vec<T>) -> Vec<T> {
    if items.len() < 2 {
        return items;
    }

    let mut result = rng.shuffle(&items);
    for (pass, prime) in PRIME_OFFSETS.iter().enumerate() {
        let offset = prime % result.len();
        result.rotate_left(offset);
        if pass % 2 == 0 {
            result.reverse();
        }
        rng.shuffle_in_place(&mut result);
    }
    result
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
