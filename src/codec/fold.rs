// Line folding for encoded output.
//
// The folder tracks the display column of everything written so far and
// inserts a hidden line break (`\` or `=` followed by newline) in front of
// any unit that would run past `width - 2`. Units are never split, so a
// fold always lands between complete escape tokens and decodes to nothing.
// A unit wider than a whole line (a long escape, or a tab below width 10)
// is written at the start of a line of its own and may overrun it.

use log::trace;
use unicode_width::UnicodeWidthChar;

use super::encoder::Sink;
use super::flags::{ConfigError, FlagSet};

/// Narrowest fold width accepted.
pub const MIN_FOLD_WIDTH: usize = 5;

/// Fold width used when folding is requested without an explicit width.
pub const DEFAULT_FOLD_WIDTH: usize = 80;

const TAB_STOP: usize = 8;

#[derive(Debug, Clone)]
pub struct Folder {
    width: usize,
    marker: &'static [u8],
    col: usize,
    last: Option<u8>,
    folds: u64,
}

impl Folder {
    pub fn new(width: usize, flags: FlagSet) -> Result<Self, ConfigError> {
        if width < MIN_FOLD_WIDTH {
            return Err(ConfigError::FoldTooNarrow { width });
        }
        Ok(Self {
            width,
            marker: flags.fold_marker(),
            col: 0,
            last: None,
            folds: 0,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// Current output column.
    pub fn column(&self) -> usize {
        self.col
    }

    /// Number of hidden breaks inserted so far (including the final one).
    pub fn folds(&self) -> u64 {
        self.folds
    }

    /// Append `unit` to `out`, folding first if it would overflow the line.
    pub fn push(&mut self, unit: &[u8], out: &mut Vec<u8>) {
        if unit.is_empty() {
            return;
        }
        let limit = self.width - 2;
        let (peak, _) = advance(self.col, unit);
        if peak > limit && self.col > 0 {
            self.fold(out);
        }
        self.col = advance(self.col, unit).1;
        out.extend_from_slice(unit);
        self.last = unit.last().copied();
    }

    /// Terminate a partial last line.
    pub fn finish(&mut self, out: &mut Vec<u8>) {
        if self.last.is_some_and(|b| b != b'\n') {
            self.fold(out);
        }
    }

    fn fold(&mut self, out: &mut Vec<u8>) {
        trace!("fold at column {}", self.col);
        out.extend_from_slice(self.marker);
        self.col = 0;
        self.last = Some(b'\n');
        self.folds += 1;
    }
}

/// Column arithmetic over `unit` starting at `col`.
///
/// Returns the highest column reached after any character, and the final
/// column.
fn advance(mut col: usize, unit: &[u8]) -> (usize, usize) {
    let mut peak = col;
    for chunk in unit.utf8_chunks() {
        for c in chunk.valid().chars() {
            col = match c {
                '\n' | '\r' => 0,
                '\t' => (col + TAB_STOP) & !(TAB_STOP - 1),
                '\u{8}' => col.saturating_sub(1),
                _ => col + c.width().unwrap_or(0),
            };
            peak = peak.max(col);
        }
        for _ in chunk.invalid() {
            col += 1;
            peak = peak.max(col);
        }
    }
    (peak, col)
}

// ---------------------------------------------------------------------------
// Folded sink
// ---------------------------------------------------------------------------

/// A `Sink` that writes into a buffer, folding through `folder` when set.
pub struct Folded<'a> {
    pub folder: Option<&'a mut Folder>,
    pub out: &'a mut Vec<u8>,
}

impl Sink for Folded<'_> {
    #[inline]
    fn unit(&mut self, unit: &[u8]) {
        match self.folder.as_deref_mut() {
            Some(folder) => folder.push(unit, self.out),
            None => self.out.extend_from_slice(unit),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
