// vis/unvis codec core.
//
// Leaves first:
//
// - `flags`  : FlagSet bit flags, escape Style, configuration errors
// - `extra`  : ExtraSet: characters escaped even though they print
// - `symbol` : input segmentation (UTF-8 scalars or opaque bytes)
// - `encoder`: per-character encoder emitting atomic units to a Sink
// - `fold`   : column tracking and hidden line breaks
// - `entity` : RFC 1866 entity table, prefix-searchable
// - `decoder`: byte-at-a-time unvis state machine

pub mod decoder;
pub mod encoder;
pub mod entity;
pub mod extra;
pub mod flags;
pub mod fold;
pub mod symbol;

pub use decoder::{Decoded, Decoder, State, Step, unvis};
pub use encoder::{Encoder, Sink};
pub use extra::ExtraSet;
pub use flags::{ConfigError, FlagSet, Style};
pub use fold::{DEFAULT_FOLD_WIDTH, Folder, MIN_FOLD_WIDTH};
pub use symbol::Symbol;
