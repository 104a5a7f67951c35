// Streaming vis encoder.
//
// VisEncoder accepts input in arbitrary chunks:
//   - A UTF-8 sequence split across two chunks is held back until complete
//   - One symbol is always held so the encoder sees its lookahead
//   - Output units go through the folder (when enabled) and are written to
//     the underlying writer at the end of every chunk

use std::io::{self, Write};

use log::debug;
use thiserror::Error;

use crate::codec::encoder::{Encoder, Sink};
use crate::codec::flags::{ConfigError, FlagSet};
use crate::codec::fold::{Folded, Folder};
use crate::codec::symbol::{Symbol, next_symbol};

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Configuration for the streaming encoder.
#[derive(Debug, Clone, Default)]
pub struct VisOptions {
    /// Style and character-class flags.
    pub flags: FlagSet,
    /// Additional characters to escape.
    pub extra: String,
    /// Fold output lines to this width. `None` disables folding.
    pub fold_width: Option<usize>,
    /// Write newline as `\$` followed by a newline.
    pub mark_eol: bool,
    /// No encoding at all, except that backslash is doubled.
    pub passthrough: bool,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
}

// ---------------------------------------------------------------------------
// Stats
// ---------------------------------------------------------------------------

/// Counters reported when an encoder finishes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EncodeStats {
    /// Raw input bytes consumed.
    pub bytes_in: u64,
    /// Encoded bytes written.
    pub bytes_out: u64,
    /// Hidden line breaks inserted by the folder.
    pub folds: u64,
}

// ---------------------------------------------------------------------------
// VisEncoder
// ---------------------------------------------------------------------------

/// Streaming vis encoder.
///
/// # Example
/// ```no_run
/// use vistext::codec::FlagSet;
/// use vistext::stream::{VisEncoder, VisOptions};
/// let opts = VisOptions { flags: FlagSet::C_STYLE | FlagSet::TAB, ..Default::default() };
/// let mut enc = VisEncoder::new(Vec::new(), &opts).unwrap();
/// enc.write_input(b"tab\there").unwrap();
/// let (out, _stats) = enc.finish().unwrap();
/// assert_eq!(out, b"tab\\there");
/// ```
pub struct VisEncoder<W: Write> {
    writer: W,
    encoder: Encoder,
    folder: Option<Folder>,
    mark_eol: bool,
    passthrough: bool,
    no_locale: bool,
    /// Input bytes not yet segmented (an incomplete UTF-8 tail).
    pending: Vec<u8>,
    /// Segmented symbol waiting for its lookahead.
    held: Option<Symbol>,
    /// Encoded output not yet handed to the writer.
    out: Vec<u8>,
    bytes_in: u64,
    bytes_out: u64,
}

impl<W: Write> VisEncoder<W> {
    /// Create a new streaming encoder. Configuration errors are reported
    /// here, before any input is processed.
    pub fn new(writer: W, opts: &VisOptions) -> Result<Self, EncodeError> {
        let encoder = Encoder::new(opts.flags, &opts.extra)?;
        let folder = opts
            .fold_width
            .map(|width| Folder::new(width, opts.flags))
            .transpose()?;
        debug!(
            "vis stream: fold={:?} mark_eol={} passthrough={}",
            opts.fold_width, opts.mark_eol, opts.passthrough
        );
        Ok(Self {
            writer,
            encoder,
            folder,
            mark_eol: opts.mark_eol,
            passthrough: opts.passthrough,
            no_locale: opts.flags.contains(FlagSet::NO_LOCALE),
            pending: Vec::new(),
            held: None,
            out: Vec::new(),
            bytes_in: 0,
            bytes_out: 0,
        })
    }

    /// Feed raw input to the encoder.
    pub fn write_input(&mut self, data: &[u8]) -> Result<(), EncodeError> {
        self.bytes_in += data.len() as u64;
        self.pending.extend_from_slice(data);
        self.segment(false);
        self.drain()
    }

    /// Encode everything still held back, terminate a folded last line and
    /// flush the writer.
    ///
    /// Returns the underlying writer and the final counters.
    pub fn finish(mut self) -> Result<(W, EncodeStats), EncodeError> {
        self.segment(true);
        if let Some(last) = self.held.take() {
            self.emit(last, None);
        }
        if let Some(folder) = self.folder.as_mut() {
            folder.finish(&mut self.out);
        }
        self.drain()?;
        self.writer.flush()?;

        let stats = EncodeStats {
            bytes_in: self.bytes_in,
            bytes_out: self.bytes_out,
            folds: self.folder.as_ref().map_or(0, Folder::folds),
        };
        debug!(
            "vis stream finished: {} bytes in, {} bytes out, {} folds",
            stats.bytes_in, stats.bytes_out, stats.folds
        );
        Ok((self.writer, stats))
    }

    /// Raw input bytes received so far.
    pub fn bytes_in(&self) -> u64 {
        self.bytes_in
    }

    /// Encoded bytes written so far.
    pub fn bytes_out(&self) -> u64 {
        self.bytes_out
    }

    /// Split `pending` into symbols, encoding each one as soon as its
    /// successor is known.
    fn segment(&mut self, eof: bool) {
        let mut pos = 0;
        while let Some((sym, len)) = next_symbol(&self.pending[pos..], self.no_locale, eof) {
            pos += len;
            if let Some(prev) = self.held.replace(sym) {
                self.emit(prev, Some(sym));
            }
        }
        self.pending.drain(..pos);
    }

    fn emit(&mut self, sym: Symbol, next: Option<Symbol>) {
        let mut sink = Folded {
            folder: self.folder.as_mut(),
            out: &mut self.out,
        };
        if self.passthrough {
            if sym.ascii() == Some(b'\\') {
                sink.unit(b"\\\\");
            } else {
                let (buf, len) = sym.to_bytes();
                sink.unit(&buf[..len]);
            }
            return;
        }
        if self.mark_eol && sym.ascii() == Some(b'\n') {
            if self.encoder.flags().contains(FlagSet::NO_SLASH) {
                sink.unit(b"$\n");
            } else {
                sink.unit(b"\\$\n");
            }
            return;
        }
        self.encoder.encode_into(sym, next, &mut sink);
    }

    fn drain(&mut self) -> Result<(), EncodeError> {
        if !self.out.is_empty() {
            self.writer.write_all(&self.out)?;
            self.bytes_out += self.out.len() as u64;
            self.out.clear();
        }
        Ok(())
    }
}

/// Convenience: encode an entire input at once.
pub fn encode_all<W: Write>(
    writer: W,
    input: &[u8],
    opts: &VisOptions,
) -> Result<(W, EncodeStats), EncodeError> {
    let mut enc = VisEncoder::new(writer, opts)?;
    enc.write_input(input)?;
    enc.finish()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
