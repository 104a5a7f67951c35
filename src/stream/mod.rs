// Streaming drivers around the codec core.
//
// - `encoder`: VisEncoder: chunked input, lookahead across chunk
//              boundaries, folding, end-of-line marking, pass-through
// - `decoder`: UnvisDecoder: push-back replay, END flush, lenient or
//              strict error handling with byte offsets

pub mod decoder;
pub mod encoder;

pub use decoder::{DecodeError, DecodeStats, UnvisDecoder, UnvisOptions};
pub use encoder::{EncodeError, EncodeStats, VisEncoder, VisOptions};
