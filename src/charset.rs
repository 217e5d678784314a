//! Character classes, literal pools and script ranges.

use bitflags::bitflags;

pub const LOWERCASE: &str = "abcdefghijklmnopqrstuvwxyz";
pub const UPPERCASE: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";
pub const DIGITS: &str = "0123456789";
pub const SYMBOLS: &str = "!@#$%^&*+-_=?:|";
pub const EXTENDED_SYMBOLS: &str = "~;.{}<>[]()/\\'`";

/// Glyphs removed from the basic pool because they read as `0` or `1`.
pub const LOOKALIKES: &str = "01oOiIlL";

bitflags! {
    /// Character classes a universal password draws from.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct CharClasses: u8 {
        const LOWERCASE        = 0b0000_0001;
        const UPPERCASE        = 0b0000_0010;
        const NUMBERS          = 0b0000_0100;
        const SYMBOLS          = 0b0000_1000;
        const EXTENDED_SYMBOLS = 0b0001_0000;
        /// Every script in [`NON_LATIN_RANGES`], treated as one class.
        const NON_LATIN        = 0b0010_0000;
        const EMOJI            = 0b0100_0000;
    }
}

impl Default for CharClasses {
    fn default() -> Self {
        Self::LOWERCASE | Self::UPPERCASE | Self::NUMBERS | Self::SYMBOLS
    }
}

impl CharClasses {
    /// The literal ASCII alphabet for a single class, if it has one.
    pub fn literal(self) -> Option<&'static str> {
        LITERALS
            .iter()
            .find(|(class, _)| *class == self)
            .map(|(_, alphabet)| *alphabet)
    }
}

const LITERALS: [(CharClasses, &str); 5] = [
    (CharClasses::LOWERCASE, LOWERCASE),
    (CharClasses::UPPERCASE, UPPERCASE),
    (CharClasses::NUMBERS, DIGITS),
    (CharClasses::SYMBOLS, SYMBOLS),
    (CharClasses::EXTENDED_SYMBOLS, EXTENDED_SYMBOLS),
];

/// An inclusive block of Unicode scalar values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScriptRange {
    pub name: &'static str,
    pub start: u32,
    pub end: u32,
}

impl ScriptRange {
    const fn new(name: &'static str, start: u32, end: u32) -> Self {
        Self { name, start, end }
    }

    pub fn len(&self) -> usize {
        (self.end - self.start + 1) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.end < self.start
    }

    pub fn contains(&self, ch: char) -> bool {
        (self.start..=self.end).contains(&(ch as u32))
    }
}

pub const NON_LATIN_RANGES: &[ScriptRange] = &[
    ScriptRange::new("latin1", 0x00a1, 0x00ff),
    ScriptRange::new("latinext", 0x0100, 0x017f),
    ScriptRange::new("greek", 0x0370, 0x03ff),
    ScriptRange::new("cyrillic", 0x0400, 0x04ff),
    ScriptRange::new("hebrew", 0x0590, 0x05ff),
    ScriptRange::new("arabic", 0x0600, 0x06ff),
    ScriptRange::new("devanagari", 0x0900, 0x097f),
    ScriptRange::new("thai", 0x0e00, 0x0e7f),
    ScriptRange::new("hangul", 0x1100, 0x11ff),
    ScriptRange::new("math", 0x2200, 0x22ff),
    ScriptRange::new("hiragana", 0x3040, 0x309f),
    ScriptRange::new("katakana", 0x30a0, 0x30ff),
    ScriptRange::new("cjk", 0x4e00, 0x9fbf),
];

/// Used for the emoji class when the caller has not installed a list.
pub const DEFAULT_EMOJI: &[&str] = &[
    "\u{1f300}", "\u{1f308}", "\u{1f30a}", "\u{1f319}", "\u{1f31f}", "\u{1f332}",
    "\u{1f335}", "\u{1f337}", "\u{1f33b}", "\u{1f340}", "\u{1f344}", "\u{1f34b}",
    "\u{1f34e}", "\u{1f352}", "\u{1f355}", "\u{1f36a}", "\u{1f369}", "\u{1f381}",
    "\u{1f388}", "\u{1f389}", "\u{1f3a8}", "\u{1f3b2}", "\u{1f3b8}", "\u{1f3c0}",
    "\u{1f3c6}", "\u{1f3e0}", "\u{1f40c}", "\u{1f419}", "\u{1f41d}", "\u{1f422}",
    "\u{1f42c}", "\u{1f431}", "\u{1f436}", "\u{1f43c}", "\u{1f440}", "\u{1f451}",
    "\u{1f48e}", "\u{1f4a1}", "\u{1f4a5}", "\u{1f4da}", "\u{1f4e6}", "\u{1f511}",
    "\u{1f514}", "\u{1f525}", "\u{1f52e}", "\u{1f680}", "\u{1f60e}", "\u{1f642}",
];

/// Basic-mode pool: letters and digits without lookalikes, plus every ASCII
/// symbol from the regular and extended sets. No glyph appears twice.
pub fn basic_pool() -> Vec<char> {
    let mut pool: Vec<char> = Vec::new();
    let sources = [LOWERCASE, UPPERCASE, DIGITS, SYMBOLS, EXTENDED_SYMBOLS];
    for ch in sources.iter().flat_map(|s| s.chars()) {
        if !LOOKALIKES.contains(ch) && !pool.contains(&ch) {
            pool.push(ch);
        }
    }
    pool
}

/// Coarse classification of a single character, computed once per glyph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Lowercase,
    Uppercase,
    Digit,
    /// Any ASCII character that is not a letter or digit.
    Symbol,
    /// Anything above the ASCII range.
    NonAscii,
}

impl Category {
    pub fn of(ch: char) -> Self {
        match ch {
            'a'..='z' => Self::Lowercase,
            'A'..='Z' => Self::Uppercase,
            '0'..='9' => Self::Digit,
            _ if ch.is_ascii() => Self::Symbol,
            _ => Self::NonAscii,
        }
    }
}
