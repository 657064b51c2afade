//! Error types surfaced by the crate.
//!
//! Expected emptiness is not an error here: a too-short input parses to an
//! empty container, and a deepening step that cannot make progress reports
//! `false`. Only alphabet construction and the binary codec can fail.

use thiserror::Error;

/// Failures reported by alphabet initialisation and the binary codec.
#[derive(Debug, Error)]
pub enum LcpError {
    /// An encoding table could not be constructed. The process-wide tables
    /// are left unchanged when this is returned.
    #[error("invalid alphabet: {0}")]
    InvalidAlphabet(String),

    /// A serialized container ended before the declared number of core
    /// records could be read.
    #[error("truncated input while reading parse container")]
    TruncatedInput,

    /// The serialized container header is not plausible (e.g. level 0).
    #[error("invalid parse container header")]
    InvalidHeader,

    /// An underlying I/O failure other than a short read.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
