use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::charset::Category;
use crate::passphrase::SEPARATOR_ALPHABET_SIZE;

/// Bits subtracted for every repeat of a character beyond its first use.
pub const REPETITION_PENALTY: f64 = 1.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Strength {
    Weak,
    Strong,
    VeryStrong,
    QuantumResistant,
}

impl Strength {
    pub fn from_bits(bits: u32) -> Self {
        match bits {
            0..60 => Self::Weak,
            60..100 => Self::Strong,
            100..150 => Self::VeryStrong,
            _ => Self::QuantumResistant,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Weak => "Weak",
            Self::Strong => "Strong",
            Self::VeryStrong => "Very Strong",
            Self::QuantumResistant => "Quantum Resistant",
        }
    }
}

impl fmt::Display for Strength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntropyResult {
    pub bits: u32,
    pub label: Strength,
}

impl EntropyResult {
    fn from_estimate(estimate: f64) -> Self {
        let bits = estimate.round().max(0.0) as u32;
        Self {
            bits,
            label: Strength::from_bits(bits),
        }
    }
}

fn pool_size(category: Category) -> usize {
    match category {
        Category::Lowercase => 26,
        Category::Uppercase => 26,
        Category::Digit => 10,
        Category::Symbol => 33,
        Category::NonAscii => 100,
    }
}

/// Estimate the strength of a finished password.
///
/// The pool is the sum of the classes present, never less than the number of
/// distinct characters. Each repeat costs [`REPETITION_PENALTY`] bits.
pub fn estimate_password_entropy(password: &str) -> EntropyResult {
    if password.is_empty() {
        return EntropyResult::from_estimate(0.0);
    }

    let mut categories = HashSet::new();
    let mut frequency: HashMap<char, usize> = HashMap::new();
    let mut length = 0usize;
    for ch in password.chars() {
        categories.insert(Category::of(ch));
        *frequency.entry(ch).or_default() += 1;
        length += 1;
    }

    let pool = categories
        .into_iter()
        .map(pool_size)
        .sum::<usize>()
        .max(frequency.len())
        .max(2);

    let penalty: f64 = frequency
        .values()
        .filter(|&&count| count > 1)
        .map(|&count| (count - 1) as f64 * REPETITION_PENALTY)
        .sum();

    EntropyResult::from_estimate((pool as f64).log2() * length as f64 - penalty)
}

/// Analytic strength of a passphrase: each word is a uniform draw from the
/// wordlist and each advanced separator a uniform digit and symbol pair.
pub fn estimate_passphrase_entropy(
    word_count: usize,
    wordlist_size: usize,
    advanced: bool,
) -> EntropyResult {
    if word_count == 0 || wordlist_size == 0 {
        return EntropyResult::from_estimate(0.0);
    }

    let mut bits = word_count as f64 * (wordlist_size as f64).log2();
    if advanced {
        bits += (word_count - 1) as f64 * (SEPARATOR_ALPHABET_SIZE as f64).log2();
    }

    EntropyResult::from_estimate(bits)
}
