// Characters that are escaped even though they would print safely.

use super::flags::FlagSet;
use super::symbol::Symbol;

/// Glob metacharacters, escaped under `GLOB`.
pub const GLOB_CHARS: &str = "*?[#";

/// Shell metacharacters, escaped under `SHELL`.
pub const SHELL_CHARS: &str = "'`\";&<>()|{}]\\$!^~";

/// Immutable set of always-escaped characters for one encoder.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtraSet {
    /// Members in composition order, without duplicates.
    chars: Vec<char>,
    /// Bitmap of the ASCII members.
    ascii: u128,
}

impl ExtraSet {
    /// Build the set for `flags`, starting from the caller's `extra` string.
    ///
    /// Composition order: `extra`, glob metacharacters, shell metacharacters,
    /// space, tab, newline, double quote, and finally backslash unless
    /// `NO_SLASH` is set.
    pub fn build(flags: FlagSet, extra: &str) -> Self {
        let mut set = Self::default();
        set.extend(extra.chars());
        if flags.contains(FlagSet::GLOB) {
            set.extend(GLOB_CHARS.chars());
        }
        if flags.contains(FlagSet::SHELL) {
            set.extend(SHELL_CHARS.chars());
        }
        if flags.contains(FlagSet::SPACE) {
            set.insert(' ');
        }
        if flags.contains(FlagSet::TAB) {
            set.insert('\t');
        }
        if flags.contains(FlagSet::NEWLINE) {
            set.insert('\n');
        }
        if flags.contains(FlagSet::DOUBLE_QUOTE) {
            set.insert('"');
        }
        if !flags.contains(FlagSet::NO_SLASH) {
            set.insert('\\');
        }
        set
    }

    fn extend(&mut self, chars: impl Iterator<Item = char>) {
        for c in chars {
            self.insert(c);
        }
    }

    fn insert(&mut self, c: char) {
        if self.contains_char(c) {
            return;
        }
        if c.is_ascii() {
            self.ascii |= 1u128 << (c as u32);
        }
        self.chars.push(c);
    }

    #[inline]
    pub fn contains_char(&self, c: char) -> bool {
        if c.is_ascii() {
            self.ascii & (1u128 << (c as u32)) != 0
        } else {
            self.chars.contains(&c)
        }
    }

    /// Opaque high bytes never match: they carry no character identity.
    #[inline]
    pub fn contains(&self, sym: Symbol) -> bool {
        match sym {
            Symbol::Char(c) => self.contains_char(c),
            Symbol::Byte(b) => b.is_ascii() && self.contains_char(b as char),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = char> + '_ {
        self.chars.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
