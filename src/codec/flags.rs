// Encoding style and character class flags.
//
// Bit values follow the classic `vis.h` assignments so that numeric flag
// words produced by other vis/unvis implementations mean the same thing here.

use bitflags::bitflags;
use thiserror::Error;

bitflags! {
    /// Style selectors and character-class toggles shared by the encoder
    /// and the decoder.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct FlagSet: u32 {
        /// Use `\ddd` octal escapes for every encoded byte.
        const OCTAL        = 0x0001;
        /// Prefer C-style short escapes (`\n`, `\t`, `\0`, `\s`, ...).
        const C_STYLE      = 0x0002;
        /// Always encode space.
        const SPACE        = 0x0004;
        /// Always encode tab.
        const TAB          = 0x0008;
        /// Always encode newline.
        const NEWLINE      = 0x0010;
        const WHITE        = Self::SPACE.bits() | Self::TAB.bits() | Self::NEWLINE.bits();
        /// Pass backspace, bell and carriage return through unencoded.
        const SAFE_ONLY    = 0x0020;
        /// Omit the leading backslash on `M-`/`^` escapes; backslash itself
        /// is no longer escaped.
        const NO_SLASH     = 0x0040;
        /// URI percent-encoding (RFC 1808).
        const HTTP_STYLE   = 0x0080;
        /// Quoted-printable (RFC 2045).
        const MIME_STYLE   = 0x0100;
        /// Decoder: HTML character references (RFC 1866).
        const HTTP_1866    = 0x0200;
        /// Decoder: backslash is an ordinary character.
        const NO_ESCAPE    = 0x0400;
        /// Decoder: flush a pending partial escape at end of input.
        #[doc(hidden)]
        const END          = 0x0800;
        /// Encode glob metacharacters.
        const GLOB         = 0x1000;
        /// Encode shell metacharacters.
        const SHELL        = 0x2000;
        const META         = Self::WHITE.bits() | Self::GLOB.bits() | Self::SHELL.bits();
        /// Treat input as opaque bytes rather than UTF-8 characters.
        const NO_LOCALE    = 0x4000;
        /// Always encode the double quote.
        const DOUBLE_QUOTE = 0x8000;
    }
}

/// Escape family selected by a flag set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Style {
    /// Backslash escapes (`\M-x`, `\^X`, `\ddd`, C-style).
    Generic,
    /// `%xx` percent-encoding, falling back to backslash escapes.
    Http,
    /// `=XX` quoted-printable, falling back to backslash escapes.
    Mime,
}

impl FlagSet {
    /// Reject flag combinations that cannot be honoured together.
    pub fn validate(self) -> Result<Self, ConfigError> {
        if self.contains(Self::HTTP_STYLE | Self::MIME_STYLE) {
            return Err(ConfigError::ConflictingStyles);
        }
        Ok(self)
    }

    /// The escape family used by the encoder.
    pub fn style(self) -> Style {
        if self.contains(Self::HTTP_STYLE) {
            Style::Http
        } else if self.contains(Self::MIME_STYLE) {
            Style::Mime
        } else {
            Style::Generic
        }
    }

    /// The hidden line break emitted by the folder.
    pub fn fold_marker(self) -> &'static [u8] {
        if self.contains(Self::MIME_STYLE) {
            b"=\n"
        } else {
            b"\\\n"
        }
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Configuration rejected before any byte is processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("HTTP and MIME escape styles are mutually exclusive")]
    ConflictingStyles,

    #[error("cannot fold lines to {width} columns (minimum is {min})", min = super::fold::MIN_FOLD_WIDTH)]
    FoldTooNarrow { width: usize },
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
