// unvis decoder: a byte-at-a-time finite-state machine.
//
// The caller feeds one encoded byte per call and gets back a `Step`:
//   - `Valid`      a decoded value is ready, advance past the input byte
//   - `ValidPush`  a decoded value is ready, and the same input byte must be
//                  fed again (it starts the next token)
//   - `NoChar`     nothing yet, keep feeding
//   - `SynBad`     the sequence is not a valid escape; state is back at
//                  `Ground` and the offending byte has been consumed
//   - `Error`      the state itself is corrupt
//
// After the last input byte, `finish` (the END flag) flushes a pending
// octal or hex value, or reports a truncated escape.

use std::ops::Range;

use log::debug;

use super::entity;
use super::flags::{ConfigError, FlagSet};

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

/// Decoder state. Variants that accumulate a value carry it with them.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum State {
    /// Outside any escape.
    #[default]
    Ground,
    /// Seen `\`.
    Start,
    /// Seen `\M`; the high bit is pending.
    Meta,
    /// Seen `\M-`.
    Meta1 { acc: u8 },
    /// Seen `\^` or `\M^`.
    Ctrl { acc: u8 },
    /// One octal digit read.
    Octal2 { acc: u8 },
    /// Two octal digits read.
    Octal3 { acc: u8 },
    /// Seen `\x`; a hex digit is mandatory.
    Hex,
    /// Seen `%`.
    Hex1,
    /// One hex digit read.
    Hex2 { acc: u8 },
    /// Seen `=`.
    Mime1,
    /// One quoted-printable hex digit read.
    Mime2 { acc: u8 },
    /// Inside a quoted-printable soft line break.
    EatCrNl,
    /// Seen `&`.
    Amp,
    /// Inside `&#...;`.
    Number { value: u32, digits: u8 },
    /// Inside `&name;`: `candidates` are the table entries whose names start
    /// with the `matched` bytes seen so far.
    StringMatch {
        candidates: Range<usize>,
        matched: usize,
    },
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

/// A decoded value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decoded {
    /// A byte reconstructed from an escape, or passed through.
    Byte(u8),
    /// A character named by an HTML reference.
    Scalar(char),
}

impl Decoded {
    /// Append the value to `out`. Scalars are written as UTF-8, except under
    /// NO_LOCALE where Latin-1 values are written as a single byte.
    pub fn write_to(self, flags: FlagSet, out: &mut Vec<u8>) {
        match self {
            Self::Byte(b) => out.push(b),
            Self::Scalar(c) if flags.contains(FlagSet::NO_LOCALE) && (c as u32) <= 0xff => {
                out.push(c as u32 as u8)
            }
            Self::Scalar(c) => {
                let mut buf = [0u8; 4];
                out.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
            }
        }
    }
}

/// Outcome of one decoder call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Valid(Decoded),
    ValidPush(Decoded),
    NoChar,
    /// Degenerate no-op, handled like `NoChar`.
    Zero,
    SynBad,
    Error,
}

impl Step {
    /// The decoded value, if any.
    pub fn decoded(self) -> Option<Decoded> {
        match self {
            Self::Valid(d) | Self::ValidPush(d) => Some(d),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Transition function
// ---------------------------------------------------------------------------

#[inline]
fn is_octal(c: u8) -> bool {
    (b'0'..=b'7').contains(&c)
}

#[inline]
fn hex_value(c: u8) -> Option<u8> {
    (c as char).to_digit(16).map(|d| d as u8)
}

/// Quoted-printable only admits upper-case hex digits.
#[inline]
fn mime_hex_value(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' | b'A'..=b'F' => hex_value(c),
        _ => None,
    }
}

/// Feed one byte `c` to the machine in `state`.
///
/// With `FlagSet::END` in `flags`, `c` is ignored and the pending escape is
/// flushed instead.
pub fn unvis(c: u8, state: &mut State, flags: FlagSet) -> Step {
    if flags.contains(FlagSet::END) {
        return flush(state);
    }

    match std::mem::take(state) {
        State::Ground => {
            if c == b'\\' && !flags.contains(FlagSet::NO_ESCAPE) {
                *state = State::Start;
                return Step::NoChar;
            }
            if c == b'%' && flags.contains(FlagSet::HTTP_STYLE) {
                *state = State::Hex1;
                return Step::NoChar;
            }
            if c == b'&' && flags.contains(FlagSet::HTTP_1866) {
                *state = State::Amp;
                return Step::NoChar;
            }
            if c == b'=' && flags.contains(FlagSet::MIME_STYLE) {
                *state = State::Mime1;
                return Step::NoChar;
            }
            Step::Valid(Decoded::Byte(c))
        }

        State::Start => match c {
            b'\\' => Step::Valid(Decoded::Byte(b'\\')),
            b'0'..=b'7' => {
                *state = State::Octal2 { acc: c - b'0' };
                Step::NoChar
            }
            b'M' => {
                *state = State::Meta;
                Step::NoChar
            }
            b'^' => {
                *state = State::Ctrl { acc: 0 };
                Step::NoChar
            }
            b'n' => Step::Valid(Decoded::Byte(b'\n')),
            b'r' => Step::Valid(Decoded::Byte(b'\r')),
            b'b' => Step::Valid(Decoded::Byte(0x08)),
            b'a' => Step::Valid(Decoded::Byte(0x07)),
            b'v' => Step::Valid(Decoded::Byte(0x0b)),
            b't' => Step::Valid(Decoded::Byte(b'\t')),
            b'f' => Step::Valid(Decoded::Byte(0x0c)),
            b's' => Step::Valid(Decoded::Byte(b' ')),
            b'x' => {
                *state = State::Hex;
                Step::NoChar
            }
            // Hidden newline (fold) and hidden end-of-line marker.
            b'\n' | b'$' => Step::NoChar,
            _ if c.is_ascii_graphic() => Step::Valid(Decoded::Byte(c)),
            _ => Step::SynBad,
        },

        State::Meta => match c {
            b'-' => {
                *state = State::Meta1 { acc: 0x80 };
                Step::NoChar
            }
            b'^' => {
                *state = State::Ctrl { acc: 0x80 };
                Step::NoChar
            }
            _ => Step::SynBad,
        },

        State::Meta1 { acc } => Step::Valid(Decoded::Byte(acc | c)),

        State::Ctrl { acc } => {
            let value = if c == b'?' { acc | 0x7f } else { acc | (c & 0x1f) };
            Step::Valid(Decoded::Byte(value))
        }

        State::Octal2 { acc } => {
            if is_octal(c) {
                *state = State::Octal3 {
                    acc: (acc << 3) | (c - b'0'),
                };
                return Step::NoChar;
            }
            Step::ValidPush(Decoded::Byte(acc))
        }

        State::Octal3 { acc } => {
            if is_octal(c) {
                return Step::Valid(Decoded::Byte((acc << 3) | (c - b'0')));
            }
            Step::ValidPush(Decoded::Byte(acc))
        }

        State::Hex | State::Hex1 => match hex_value(c) {
            Some(d) => {
                *state = State::Hex2 { acc: d };
                Step::NoChar
            }
            None => Step::SynBad,
        },

        State::Hex2 { acc } => match hex_value(c) {
            Some(d) => Step::Valid(Decoded::Byte((acc << 4) | d)),
            None => Step::ValidPush(Decoded::Byte(acc)),
        },

        State::Mime1 => {
            if c == b'\n' || c == b'\r' {
                *state = State::EatCrNl;
                return Step::NoChar;
            }
            match mime_hex_value(c) {
                Some(d) => {
                    *state = State::Mime2 { acc: d };
                    Step::NoChar
                }
                None => Step::SynBad,
            }
        }

        State::Mime2 { acc } => match mime_hex_value(c) {
            Some(d) => Step::Valid(Decoded::Byte((acc << 4) | d)),
            None => Step::SynBad,
        },

        State::EatCrNl => match c {
            b'\r' | b'\n' => {
                *state = State::EatCrNl;
                Step::NoChar
            }
            b'=' => {
                *state = State::Mime1;
                Step::NoChar
            }
            _ => Step::Valid(Decoded::Byte(c)),
        },

        State::Amp => {
            if c == b'#' {
                *state = State::Number {
                    value: 0,
                    digits: 0,
                };
                return Step::NoChar;
            }
            match_entity(c, entity::all(), 0, state)
        }

        State::Number { value, digits } => {
            if c == b';' {
                return match char::from_u32(value) {
                    Some(ch) if digits > 0 => Step::Valid(Decoded::Scalar(ch)),
                    _ => Step::SynBad,
                };
            }
            let Some(d) = (c as char).to_digit(10) else {
                return Step::SynBad;
            };
            match value.checked_mul(10).and_then(|v| v.checked_add(d)) {
                Some(value) if value <= char::MAX as u32 => {
                    *state = State::Number {
                        value,
                        digits: digits.saturating_add(1),
                    };
                    Step::NoChar
                }
                _ => Step::SynBad,
            }
        }

        State::StringMatch {
            candidates,
            matched,
        } => {
            if candidates.start > candidates.end || candidates.end > entity::ENTITIES.len() {
                return Step::Error;
            }
            match_entity(c, candidates, matched, state)
        }
    }
}

/// Advance an entity-name match by one byte. `state` has already been reset
/// to `Ground`.
fn match_entity(c: u8, candidates: Range<usize>, matched: usize, state: &mut State) -> Step {
    if c == b';' {
        return match entity::exact(candidates, matched) {
            Some(value) => Step::Valid(Decoded::Scalar(char::from(value))),
            None => Step::SynBad,
        };
    }
    let narrowed = entity::narrow(candidates.clone(), matched, c);
    if !narrowed.is_empty() {
        *state = State::StringMatch {
            candidates: narrowed,
            matched: matched + 1,
        };
        return Step::NoChar;
    }
    // A complete name followed by something else: emit it and replay `c`.
    match entity::exact(candidates, matched) {
        Some(value) if matched > 0 => Step::ValidPush(Decoded::Scalar(char::from(value))),
        _ => Step::SynBad,
    }
}

/// End-of-input flush.
fn flush(state: &mut State) -> Step {
    match std::mem::take(state) {
        State::Octal2 { acc } | State::Octal3 { acc } | State::Hex2 { acc } => {
            Step::Valid(Decoded::Byte(acc))
        }
        State::Ground => Step::NoChar,
        _ => Step::SynBad,
    }
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

/// An owned decoder: one state plus the flags it was configured with.
#[derive(Debug, Clone)]
pub struct Decoder {
    state: State,
    flags: FlagSet,
}

impl Decoder {
    pub fn new(flags: FlagSet) -> Result<Self, ConfigError> {
        let flags = flags.validate()?.difference(FlagSet::END);
        debug!("unvis decoder: flags={:#06x}", flags.bits());
        Ok(Self {
            state: State::Ground,
            flags,
        })
    }

    pub fn flags(&self) -> FlagSet {
        self.flags
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    /// Feed one encoded byte.
    #[inline]
    pub fn step(&mut self, c: u8) -> Step {
        unvis(c, &mut self.state, self.flags)
    }

    /// Flush at end of input. The decoder is back at `Ground` afterwards.
    pub fn finish(&mut self) -> Step {
        unvis(0, &mut self.state, self.flags | FlagSet::END)
    }

    /// Drop any partial escape.
    pub fn reset(&mut self) {
        self.state = State::Ground;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
