// Input character segmentation for the encoder.
//
// In locale mode the input is read as UTF-8: a well-formed scalar is one
// symbol, and any byte that does not start a well-formed scalar stands on
// its own. With NO_LOCALE every byte is a symbol.

/// One input character as seen by the encoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Symbol {
    /// A well-formed UTF-8 scalar.
    Char(char),
    /// An opaque byte (NO_LOCALE input, or a byte outside any valid scalar).
    Byte(u8),
}

impl Symbol {
    /// The ASCII value, if this symbol is ASCII.
    #[inline]
    pub fn ascii(self) -> Option<u8> {
        match self {
            Self::Char(c) if c.is_ascii() => Some(c as u8),
            Self::Byte(b) if b.is_ascii() => Some(b),
            _ => None,
        }
    }

    /// Encoded bytes of this symbol, with their count.
    #[inline]
    pub fn to_bytes(self) -> ([u8; 4], usize) {
        let mut buf = [0u8; 4];
        let len = match self {
            Self::Char(c) => c.encode_utf8(&mut buf).len(),
            Self::Byte(b) => {
                buf[0] = b;
                1
            }
        };
        (buf, len)
    }

    /// First encoded byte.
    #[inline]
    pub fn first_byte(self) -> u8 {
        self.to_bytes().0[0]
    }

    /// Printable and not blank. Non-ASCII scalars count as graphic unless
    /// they are control or whitespace characters; opaque high bytes never do.
    pub fn is_graphic(self) -> bool {
        match self {
            Self::Char(c) if c.is_ascii() => (c as u8).is_ascii_graphic(),
            Self::Char(c) => !c.is_control() && !c.is_whitespace(),
            Self::Byte(b) => b.is_ascii_graphic(),
        }
    }

    /// Space, tab or newline.
    #[inline]
    pub fn is_white(self) -> bool {
        matches!(self.ascii(), Some(b' ' | b'\t' | b'\n'))
    }

    /// Backspace, bell or carriage return: passed through under SAFE_ONLY.
    #[inline]
    pub fn is_safe(self) -> bool {
        matches!(self.ascii(), Some(0x08 | 0x07 | b'\r'))
    }
}

/// Expected length of a UTF-8 sequence from its lead byte, 0 if invalid.
#[inline]
fn utf8_width(lead: u8) -> usize {
    match lead {
        0x00..=0x7F => 1,
        0xC2..=0xDF => 2,
        0xE0..=0xEF => 3,
        0xF0..=0xF4 => 4,
        _ => 0,
    }
}

/// Split the next symbol off `buf`.
///
/// Returns the symbol and the number of bytes it occupies, or `None` when
/// `buf` is empty or ends inside a sequence that could still become a valid
/// scalar (only possible while `eof` is false).
pub fn next_symbol(buf: &[u8], no_locale: bool, eof: bool) -> Option<(Symbol, usize)> {
    let &lead = buf.first()?;
    if no_locale {
        return Some((Symbol::Byte(lead), 1));
    }
    let width = utf8_width(lead);
    match width {
        0 => return Some((Symbol::Byte(lead), 1)),
        1 => return Some((Symbol::Char(lead as char), 1)),
        _ => {}
    }
    if buf.len() < width {
        // A partial tail may complete with the next chunk.
        let prefix_ok = match std::str::from_utf8(buf) {
            Ok(_) => true,
            Err(e) => e.error_len().is_none(),
        };
        if prefix_ok && !eof {
            return None;
        }
        return Some((Symbol::Byte(lead), 1));
    }
    match std::str::from_utf8(&buf[..width]) {
        Ok(s) => s.chars().next().map(|c| (Symbol::Char(c), width)),
        Err(_) => Some((Symbol::Byte(lead), 1)),
    }
}

/// Iterate the symbols of a complete buffer.
pub fn symbols(buf: &[u8], no_locale: bool) -> impl Iterator<Item = Symbol> + '_ {
    let mut pos = 0;
    std::iter::from_fn(move || {
        let (sym, len) = next_symbol(&buf[pos..], no_locale, true)?;
        pos += len;
        Some(sym)
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
