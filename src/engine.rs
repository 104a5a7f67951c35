// In-memory vis/unvis helpers.
//
// Thin wrappers over the streaming drivers for callers that already hold
// the whole input:
//   - `encode` / `encode_with_options` / `encode_to_string`
//   - `decode` / `decode_with_options`

use crate::codec::flags::FlagSet;
use crate::stream::decoder::{self, DecodeError, UnvisOptions};
use crate::stream::encoder::{self, EncodeError, VisOptions};

// ---------------------------------------------------------------------------
// Encode
// ---------------------------------------------------------------------------

/// Encode `input` with `flags` and no folding.
pub fn encode(input: &[u8], flags: FlagSet) -> Result<Vec<u8>, EncodeError> {
    encode_with_options(
        input,
        &VisOptions {
            flags,
            ..Default::default()
        },
    )
}

/// Encode with full options (extra characters, folding, end-of-line marks).
pub fn encode_with_options(input: &[u8], opts: &VisOptions) -> Result<Vec<u8>, EncodeError> {
    let output = Vec::with_capacity(input.len() + input.len() / 4);
    let (output, _) = encoder::encode_all(output, input, opts)?;
    Ok(output)
}

/// Encode `input` as text.
///
/// Only HTTP and MIME output is pure ASCII; the generic style passes
/// printable UTF-8 through. Bytes that are not valid UTF-8 are always
/// escaped, so the result is valid UTF-8 unless `NO_SLASH` or pass-through
/// mode lets a raw byte through, in which case it is replaced lossily.
pub fn encode_to_string(input: &[u8], opts: &VisOptions) -> Result<String, EncodeError> {
    let output = encode_with_options(input, opts)?;
    Ok(match String::from_utf8(output) {
        Ok(s) => s,
        Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
    })
}

// ---------------------------------------------------------------------------
// Decode
// ---------------------------------------------------------------------------

/// Decode `input` strictly: the first malformed sequence is an error.
pub fn decode(input: &[u8], flags: FlagSet) -> Result<Vec<u8>, DecodeError> {
    decode_with_options(
        input,
        UnvisOptions {
            flags,
            strict: true,
        },
    )
}

/// Decode with full options.
pub fn decode_with_options(input: &[u8], opts: UnvisOptions) -> Result<Vec<u8>, DecodeError> {
    let (output, _) = decoder::decode_all(Vec::with_capacity(input.len()), input, opts)?;
    Ok(output)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
