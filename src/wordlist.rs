// This file is part of Passg.
//
// Copyright (c) 2025  René Coignard <contact@renecoignard.com>
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::sync::{Mutex, OnceLock, PoisonError};

use tracing::{debug, warn};

use crate::Result;

/// Used when no large wordlist can be loaded.
pub const FALLBACK_WORDS: &[&str] = &[
    "abandon", "ability", "able", "about", "above", "absent", "absorb", "abstract", "absurd",
    "abuse", "access", "accident", "account", "accuse", "achieve", "acid", "acoustic", "acquire",
    "across", "act", "action", "actor", "actress", "actual", "adapt", "add", "addict", "address",
    "adjust", "admit", "adult", "advance",
];

/// Process-wide wordlist for passphrases.
pub static WORDLIST: Memo<Vec<String>> = Memo::new();

/// Process-wide emoji glyphs for the universal password emoji class.
pub static EMOJI: Memo<Vec<String>> = Memo::new();

/// A value written at most once and read-only afterwards.
///
/// Loading goes through a single gate, so a loader never runs once a value
/// is present and two callers never load concurrently.
pub struct Memo<T> {
    cell: OnceLock<T>,
    gate: Mutex<()>,
}

impl<T> Memo<T> {
    pub const fn new() -> Self {
        Self {
            cell: OnceLock::new(),
            gate: Mutex::new(()),
        }
    }

    pub fn get(&self) -> Option<&T> {
        self.cell.get()
    }

    /// Store `value` unless something is already there. Returns whether it
    /// was stored.
    pub fn install(&self, value: T) -> bool {
        self.cell.set(value).is_ok()
    }

    pub fn get_or_load<E, F>(&self, load: F) -> std::result::Result<&T, E>
    where
        F: FnOnce() -> std::result::Result<T, E>,
    {
        if let Some(value) = self.cell.get() {
            return Ok(value);
        }

        let _gate = self.gate.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(value) = self.cell.get() {
            return Ok(value);
        }

        let value = load()?;
        Ok(self.cell.get_or_init(|| value))
    }
}

impl<T> Default for Memo<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse a wordlist with one entry per line.
///
/// Blank lines and `#` comments are skipped. Diceware lines such as
/// `11111\tabacus` keep only the last token. Words are lowercased and
/// repeats dropped, keeping the first occurrence.
pub fn parse_wordlist(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split_whitespace().last())
        .map(str::to_lowercase)
        .filter(|word| seen.insert(word.clone()))
        .collect()
}

pub fn load_wordlist(path: &Path) -> Result<Vec<String>> {
    let text = fs::read_to_string(path)?;
    let words = parse_wordlist(&text);
    debug!(path = %path.display(), words = words.len(), "loaded wordlist");
    Ok(words)
}

pub fn fallback_wordlist() -> Vec<String> {
    FALLBACK_WORDS.iter().map(|w| w.to_string()).collect()
}

/// Load `path`, or use [`FALLBACK_WORDS`] when no path is given or the file
/// cannot be read or holds no words.
pub fn load_wordlist_or_fallback(path: Option<&Path>) -> Vec<String> {
    let Some(path) = path else {
        warn!(
            words = FALLBACK_WORDS.len(),
            "no wordlist given, using the small built-in list"
        );
        return fallback_wordlist();
    };

    match load_wordlist(path) {
        Ok(words) if !words.is_empty() => words,
        Ok(_) => {
            warn!(path = %path.display(), "wordlist is empty, using the fallback list");
            fallback_wordlist()
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "failed to load wordlist, using the fallback list");
            fallback_wordlist()
        }
    }
}

/// Parse whitespace-separated emoji glyphs, skipping `#` comment lines.
pub fn parse_emoji(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    text.lines()
        .map(str::trim)
        .filter(|line| !line.starts_with('#'))
        .flat_map(str::split_whitespace)
        .map(str::to_string)
        .filter(|glyph| seen.insert(glyph.clone()))
        .collect()
}

pub fn load_emoji(path: &Path) -> Result<Vec<String>> {
    let text = fs::read_to_string(path)?;
    let glyphs = parse_emoji(&text);
    debug!(path = %path.display(), glyphs = glyphs.len(), "loaded emoji list");
    Ok(glyphs)
}
