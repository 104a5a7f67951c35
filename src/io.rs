// File-level I/O helpers for vis/unvis.
//
// `encode_stream()` / `decode_stream()` pump any reader into any writer
// through the streaming drivers; `encode_file()` / `decode_file()` wrap
// them with buffered file I/O.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;

use thiserror::Error;

use crate::stream::decoder::{DecodeError, DecodeStats, UnvisDecoder, UnvisOptions};
use crate::stream::encoder::{EncodeError, EncodeStats, VisEncoder, VisOptions};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Error type for file I/O operations.
#[derive(Debug, Error)]
pub enum IoError {
    /// I/O error (file open, read, write).
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    /// Encoding error.
    #[error("encode error: {0}")]
    Encode(#[from] EncodeError),
    /// Decoding error.
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),
}

// ---------------------------------------------------------------------------
// Default buffer size
// ---------------------------------------------------------------------------

const BUF_SIZE: usize = 64 * 1024; // 64 KiB

// ---------------------------------------------------------------------------
// Streams
// ---------------------------------------------------------------------------

/// Encode everything `reader` yields into `writer`.
pub fn encode_stream<R: Read, W: Write>(
    reader: &mut R,
    writer: W,
    opts: &VisOptions,
) -> Result<EncodeStats, IoError> {
    let mut encoder = VisEncoder::new(writer, opts)?;
    let mut buf = vec![0u8; BUF_SIZE];
    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        };
        encoder.write_input(&buf[..n])?;
    }
    let (_, stats) = encoder.finish()?;
    Ok(stats)
}

/// Decode everything `reader` yields into `writer`.
pub fn decode_stream<R: Read, W: Write>(
    reader: &mut R,
    writer: W,
    opts: UnvisOptions,
) -> Result<DecodeStats, IoError> {
    let mut decoder = UnvisDecoder::new(writer, opts)?;
    let mut buf = vec![0u8; BUF_SIZE];
    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        };
        decoder.write_input(&buf[..n])?;
    }
    let (_, stats) = decoder.finish()?;
    Ok(stats)
}

// ---------------------------------------------------------------------------
// Files
// ---------------------------------------------------------------------------

/// Encode `input_path` into `output_path`.
pub fn encode_file(
    input_path: &Path,
    output_path: &Path,
    opts: &VisOptions,
) -> Result<EncodeStats, IoError> {
    let mut reader = BufReader::with_capacity(BUF_SIZE, File::open(input_path)?);
    let writer = BufWriter::with_capacity(BUF_SIZE, File::create(output_path)?);
    encode_stream(&mut reader, writer, opts)
}

/// Decode `input_path` into `output_path`.
pub fn decode_file(
    input_path: &Path,
    output_path: &Path,
    opts: UnvisOptions,
) -> Result<DecodeStats, IoError> {
    let mut reader = BufReader::with_capacity(BUF_SIZE, File::open(input_path)?);
    let writer = BufWriter::with_capacity(BUF_SIZE, File::create(output_path)?);
    decode_stream(&mut reader, writer, opts)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::flags::FlagSet;

    #[test]
    fn encode_decode_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let input_path = dir.path().join("input.bin");
        let encoded_path = dir.path().join("encoded.txt");
        let output_path = dir.path().join("output.bin");

        let data: Vec<u8> = (0..=255u8).cycle().take(10_000).collect();
        std::fs::write(&input_path, &data).unwrap();

        let opts = VisOptions {
            flags: FlagSet::C_STYLE | FlagSet::WHITE,
            fold_width: Some(76),
            ..Default::default()
        };
        let enc_stats = encode_file(&input_path, &encoded_path, &opts).unwrap();
        assert_eq!(enc_stats.bytes_in, data.len() as u64);
        assert!(enc_stats.folds > 0);
        assert_eq!(
            enc_stats.bytes_out,
            std::fs::metadata(&encoded_path).unwrap().len()
        );

        let dec_stats = decode_file(
            &encoded_path,
            &output_path,
            UnvisOptions {
                strict: true,
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(dec_stats.bytes_out, data.len() as u64);
        assert_eq!(dec_stats.errors, 0);
        assert_eq!(std::fs::read(&output_path).unwrap(), data);
    }

    #[test]
    fn streams_larger_than_buffer() {
        let data = vec![0x07u8; BUF_SIZE * 2 + 17];
        let mut encoded = Vec::new();
        let stats = encode_stream(&mut &data[..], &mut encoded, &VisOptions::default()).unwrap();
        assert_eq!(stats.bytes_out, (data.len() * 3) as u64);

        let mut decoded = Vec::new();
        decode_stream(&mut &encoded[..], &mut decoded, UnvisOptions::default()).unwrap();
        assert_eq!(decoded, data);
    }

    #[test]
    fn missing_input_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = encode_file(
            &dir.path().join("missing"),
            &dir.path().join("out"),
            &VisOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, IoError::Io(_)));
    }

    #[test]
    fn strict_decode_error_is_wrapped() {
        let mut out = Vec::new();
        let err = decode_stream(
            &mut &b"\\M"[..],
            &mut out,
            UnvisOptions {
                strict: true,
                ..Default::default()
            },
        )
        .unwrap_err();
        assert!(matches!(
            err,
            IoError::Decode(DecodeError::Truncated { offset: 0 })
        ));
    }

    #[test]
    fn strict_decode_error_keeps_prefix() {
        let mut out = Vec::new();
        let err = decode_stream(
            &mut &b"hello world\\M!"[..],
            &mut out,
            UnvisOptions {
                strict: true,
                ..Default::default()
            },
        )
        .unwrap_err();
        assert!(matches!(
            err,
            IoError::Decode(DecodeError::Malformed { offset: 13 })
        ));
        assert_eq!(out, b"hello world");
    }
}
