// Streaming unvis decoder.
//
// UnvisDecoder wraps the byte-at-a-time state machine with:
//   - Push-back replay: a `ValidPush` byte is fed again exactly once
//   - END flush once the input is exhausted
//   - Lenient mode (log the offset, skip, continue) or strict mode (the
//     first malformed sequence is returned as an error)
//   - Streaming output via the Write trait

use std::io::{self, Write};

use log::{debug, warn};
use thiserror::Error;

use crate::codec::decoder::{Decoded, Decoder, State, Step};
use crate::codec::flags::{ConfigError, FlagSet};

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Configuration for the streaming decoder.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnvisOptions {
    /// Decoder flags (`HTTP_STYLE`, `MIME_STYLE`, `HTTP_1866`, `NO_ESCAPE`,
    /// `NO_LOCALE`).
    pub flags: FlagSet,
    /// Stop at the first malformed sequence instead of skipping it.
    pub strict: bool,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("malformed escape sequence at byte {offset}")]
    Malformed { offset: u64 },

    #[error("truncated escape sequence starting at byte {offset}")]
    Truncated { offset: u64 },

    #[error("decoder reached an invalid state at byte {offset}")]
    InvalidState { offset: u64 },
}

// ---------------------------------------------------------------------------
// Stats
// ---------------------------------------------------------------------------

/// Counters reported when a decoder finishes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecodeStats {
    /// Encoded bytes consumed.
    pub bytes_in: u64,
    /// Decoded bytes written.
    pub bytes_out: u64,
    /// Malformed sequences skipped (always 0 in strict mode).
    pub errors: u64,
}

// ---------------------------------------------------------------------------
// UnvisDecoder
// ---------------------------------------------------------------------------

/// Streaming unvis decoder.
pub struct UnvisDecoder<W: Write> {
    writer: W,
    decoder: Decoder,
    strict: bool,
    out: Vec<u8>,
    /// Offset of the next input byte.
    offset: u64,
    /// Offset of the byte that opened the current escape.
    token_start: u64,
    bytes_out: u64,
    errors: u64,
}

impl<W: Write> UnvisDecoder<W> {
    pub fn new(writer: W, opts: UnvisOptions) -> Result<Self, DecodeError> {
        let decoder = Decoder::new(opts.flags)?;
        debug!("unvis stream: strict={}", opts.strict);
        Ok(Self {
            writer,
            decoder,
            strict: opts.strict,
            out: Vec::new(),
            offset: 0,
            token_start: 0,
            bytes_out: 0,
            errors: 0,
        })
    }

    /// Feed encoded input to the decoder.
    pub fn write_input(&mut self, data: &[u8]) -> Result<(), DecodeError> {
        for &c in data {
            if let Err(e) = self.feed(c) {
                // Bytes decoded ahead of the failure still reach the writer.
                self.drain()?;
                return Err(e);
            }
            self.offset += 1;
        }
        self.drain()
    }

    /// Flush a trailing escape and the writer.
    ///
    /// Returns the underlying writer and the final counters.
    pub fn finish(mut self) -> Result<(W, DecodeStats), DecodeError> {
        match self.decoder.finish() {
            Step::Valid(d) => self.push(d),
            Step::SynBad => {
                let truncated = DecodeError::Truncated {
                    offset: self.token_start,
                };
                if let Err(e) = self.reject(truncated) {
                    self.drain()?;
                    self.writer.flush()?;
                    return Err(e);
                }
            }
            _ => {}
        }
        self.drain()?;
        self.writer.flush()?;

        let stats = DecodeStats {
            bytes_in: self.offset,
            bytes_out: self.bytes_out,
            errors: self.errors,
        };
        debug!(
            "unvis stream finished: {} bytes in, {} bytes out, {} errors",
            stats.bytes_in, stats.bytes_out, stats.errors
        );
        Ok((self.writer, stats))
    }

    /// Encoded bytes consumed so far.
    pub fn bytes_in(&self) -> u64 {
        self.offset
    }

    /// Malformed sequences skipped so far.
    pub fn errors(&self) -> u64 {
        self.errors
    }

    fn feed(&mut self, c: u8) -> Result<(), DecodeError> {
        if *self.decoder.state() == State::Ground {
            self.token_start = self.offset;
        }
        let mut step = self.decoder.step(c);
        if let Step::ValidPush(d) = step {
            self.push(d);
            self.token_start = self.offset;
            step = self.decoder.step(c);
        }
        match step {
            Step::Valid(d) => self.push(d),
            Step::NoChar | Step::Zero => {}
            Step::SynBad => self.reject(DecodeError::Malformed {
                offset: self.offset,
            })?,
            Step::ValidPush(_) | Step::Error => {
                return Err(DecodeError::InvalidState {
                    offset: self.offset,
                });
            }
        }
        Ok(())
    }

    #[inline]
    fn push(&mut self, d: Decoded) {
        d.write_to(self.decoder.flags(), &mut self.out);
    }

    /// Strict mode returns `err`; lenient mode logs it and carries on.
    fn reject(&mut self, err: DecodeError) -> Result<(), DecodeError> {
        if self.strict {
            return Err(err);
        }
        warn!("{err}, skipped");
        self.errors += 1;
        Ok(())
    }

    fn drain(&mut self) -> Result<(), DecodeError> {
        if !self.out.is_empty() {
            self.writer.write_all(&self.out)?;
            self.bytes_out += self.out.len() as u64;
            self.out.clear();
        }
        Ok(())
    }
}

/// Convenience: decode an entire input at once.
pub fn decode_all<W: Write>(
    writer: W,
    input: &[u8],
    opts: UnvisOptions,
) -> Result<(W, DecodeStats), DecodeError> {
    let mut dec = UnvisDecoder::new(writer, opts)?;
    dec.write_input(input)?;
    dec.finish()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
