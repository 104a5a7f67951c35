// Per-character vis encoder.
//
// Each input symbol is rendered as one or more atomic output units: either
// the symbol itself, passed through, or one complete escape token per
// encoded byte. Units are handed to a `Sink`, which lets the folder insert
// hidden line breaks between tokens without ever splitting one.

use log::debug;

use super::extra::ExtraSet;
use super::flags::{ConfigError, FlagSet, Style};
use super::symbol::Symbol;

const HEX_LOWER: &[u8; 16] = b"0123456789abcdef";
const HEX_UPPER: &[u8; 16] = b"0123456789ABCDEF";

/// Characters the MIME style always encodes.
const MIME_SPECIALS: &[u8] = b"#$@[\\]^`{|}~";

/// Characters the HTTP style leaves to the generic encoder.
const HTTP_SAFE: &[u8] = b"$-_.+!*'(),";

/// Characters that already introduce an escape of their own after a
/// backslash, so C style never writes them as `\c` literals.
const CSTYLE_RESERVED: &[u8] = b"nrbavtfs0M^$x";

// ---------------------------------------------------------------------------
// Output sink
// ---------------------------------------------------------------------------

/// Receives encoded output one atomic unit at a time.
pub trait Sink {
    fn unit(&mut self, unit: &[u8]);
}

impl Sink for Vec<u8> {
    #[inline]
    fn unit(&mut self, unit: &[u8]) {
        self.extend_from_slice(unit);
    }
}

// ---------------------------------------------------------------------------
// Encoder
// ---------------------------------------------------------------------------

/// Stateless per-character encoder for one flag configuration.
#[derive(Debug, Clone)]
pub struct Encoder {
    flags: FlagSet,
    style: Style,
    extra: ExtraSet,
}

impl Encoder {
    /// Build an encoder for `flags`, escaping the characters of `extra` in
    /// addition to those the flags select.
    pub fn new(flags: FlagSet, extra: &str) -> Result<Self, ConfigError> {
        let flags = flags.validate()?;
        let extra = ExtraSet::build(flags, extra);
        debug!(
            "vis encoder: flags={:#06x} style={:?} extra={} chars",
            flags.bits(),
            flags.style(),
            extra.len()
        );
        Ok(Self {
            flags,
            style: flags.style(),
            extra,
        })
    }

    pub fn flags(&self) -> FlagSet {
        self.flags
    }

    pub fn extra(&self) -> &ExtraSet {
        &self.extra
    }

    /// Encode `sym` into a fresh buffer. `next` is the following input
    /// symbol, `None` at end of input.
    pub fn encode(&self, sym: Symbol, next: Option<Symbol>) -> Vec<u8> {
        let mut out = Vec::with_capacity(4);
        self.encode_into(sym, next, &mut out);
        out
    }

    /// Encode `sym`, passing each output unit to `sink`.
    pub fn encode_into<S: Sink + ?Sized>(&self, sym: Symbol, next: Option<Symbol>, sink: &mut S) {
        match self.style {
            Style::Http => self.encode_http(sym, next, sink),
            Style::Mime => self.encode_mime(sym, next, sink),
            Style::Generic => self.encode_generic(sym, next, sink),
        }
    }

    fn encode_http<S: Sink + ?Sized>(&self, sym: Symbol, next: Option<Symbol>, sink: &mut S) {
        let keep = sym
            .ascii()
            .is_some_and(|b| b.is_ascii_alphanumeric() || HTTP_SAFE.contains(&b));
        if keep {
            return self.encode_generic(sym, next, sink);
        }
        let (buf, len) = sym.to_bytes();
        for &b in &buf[..len] {
            sink.unit(&[b'%', HEX_LOWER[(b >> 4) as usize], HEX_LOWER[(b & 0xf) as usize]]);
        }
    }

    fn encode_mime<S: Sink + ?Sized>(&self, sym: Symbol, next: Option<Symbol>, sink: &mut S) {
        let ascii = sym.ascii();
        let is_space = ascii.is_some_and(|b| b.is_ascii_whitespace() || b == 0x0b);
        let before_eol = matches!(next.and_then(Symbol::ascii), Some(b'\r' | b'\n'));
        let out_of_range = match ascii {
            Some(b) => b < 33 || b == b'=' || b > 126,
            None => true,
        };
        let special = ascii.is_some_and(|b| MIME_SPECIALS.contains(&b));

        let escape = ascii != Some(b'\n')
            && ((is_space && before_eol) || (!is_space && out_of_range) || special);
        if !escape {
            return self.encode_generic(sym, next, sink);
        }
        let (buf, len) = sym.to_bytes();
        for &b in &buf[..len] {
            sink.unit(&[b'=', HEX_UPPER[(b >> 4) as usize], HEX_UPPER[(b & 0xf) as usize]]);
        }
    }

    fn encode_generic<S: Sink + ?Sized>(&self, sym: Symbol, next: Option<Symbol>, sink: &mut S) {
        let in_extra = self.extra.contains(sym);
        if !in_extra
            && (sym.is_graphic()
                || sym.is_white()
                || (self.flags.contains(FlagSet::SAFE_ONLY) && sym.is_safe()))
        {
            let (buf, len) = sym.to_bytes();
            sink.unit(&buf[..len]);
            return;
        }

        // Multi-byte characters are escaped byte by byte.
        let next_byte = next.map(Symbol::first_byte);
        let (buf, len) = sym.to_bytes();
        for &b in &buf[..len] {
            self.encode_byte(b, next_byte, in_extra, sink);
        }
    }

    fn encode_byte<S: Sink + ?Sized>(&self, b: u8, next: Option<u8>, in_extra: bool, sink: &mut S) {
        if self.flags.contains(FlagSet::C_STYLE) {
            let short = match b {
                b'\n' => Some(b'n'),
                b'\r' => Some(b'r'),
                0x08 => Some(b'b'),
                0x07 => Some(b'a'),
                0x0b => Some(b'v'),
                b'\t' => Some(b't'),
                0x0c => Some(b'f'),
                b' ' => Some(b's'),
                _ => None,
            };
            if let Some(letter) = short {
                return sink.unit(&[b'\\', letter]);
            }
            if b == 0 {
                if next.is_some_and(is_octal) {
                    return sink.unit(b"\\000");
                }
                return sink.unit(b"\\0");
            }
            if b.is_ascii_graphic() && !is_octal(b) && !CSTYLE_RESERVED.contains(&b) {
                return sink.unit(&[b'\\', b]);
            }
        }

        if in_extra || (b & 0x7f) == b' ' || self.flags.contains(FlagSet::OCTAL) {
            return sink.unit(&[
                b'\\',
                b'0' + ((b >> 6) & 0o3),
                b'0' + ((b >> 3) & 0o7),
                b'0' + (b & 0o7),
            ]);
        }

        let mut unit = [0u8; 4];
        let mut n = 0;
        if !self.flags.contains(FlagSet::NO_SLASH) {
            unit[n] = b'\\';
            n += 1;
        }
        let mut c = b;
        if c & 0x80 != 0 {
            c &= 0x7f;
            unit[n] = b'M';
            n += 1;
        }
        if c.is_ascii_control() {
            unit[n] = b'^';
            unit[n + 1] = if c == 0x7f { b'?' } else { c + b'@' };
        } else {
            unit[n] = b'-';
            unit[n + 1] = c;
        }
        sink.unit(&unit[..n + 2]);
    }
}

#[inline]
fn is_octal(b: u8) -> bool {
    (b'0'..=b'7').contains(&b)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
