//! Locally Consistent Parsing (LCP) over small-alphabet sequences.
//!
//! This crate turns a string over a 2-bit-encodable alphabet (DNA bases by
//! default) into a compact sequence of *cores*: substrings whose
//! boundaries depend only on a bounded local neighbourhood. The parse can
//! then be *deepened*: a deterministic-coin-tossing pass rewrites each
//! core as a small description of its difference from its left neighbour,
//! and the same boundary machine runs again over the rewritten sequence,
//! producing a shorter core list one level up.
//!
//! ## Core idea
//! 1. Encode the input through the process-wide [`alphabet`] tables.
//! 2. [`Lps::new`] scans once and emits level-1 cores at local minima,
//!    guarded local maxima, flanked runs, and bridging positions.
//! 3. [`Lps::deepen_to`] alternates DCT compression with the level-k
//!    parser to reach higher levels.
//!
//! Because every boundary decision is local, equal substrings receive
//! equal core sequences at every level, regardless of their surrounding
//! context. That property is what makes the parse usable for matching and
//! anchoring.
//!
//! ## Quick start
//! ```
//! use lcparse::Lps;
//!
//! let sequence = b"GGGACCTGGTGACCCCAGCCCACGACAGCCAAGCGCCAGCTGAGCTCAGGTGTGAGGAGATCACAGTCCT";
//! let mut parse = Lps::new(sequence);
//! assert_eq!(parse.len(), 31);
//!
//! parse.deepen_to(3);
//! assert_eq!(parse.level(), 3);
//! assert_eq!(parse.len(), 4);
//! ```
//!
//! Long inputs can be parsed in windows with [`ChunkedBuilder`], and a
//! container can be checkpointed with [`Lps::write_to`] /
//! [`Lps::read_from`].
//!
//! The engine is single-threaded and allocation-light: a container owns a
//! flat core vector, and deepening rewrites it in place. The only global
//! state is the pair of alphabet tables, initialised once at startup (they
//! default to the DNA mapping).

pub mod alphabet;
mod builder;
mod codec;
mod core;
mod error;
mod lps;
mod parser;
mod utils;

pub use crate::builder::ChunkedBuilder;
pub use crate::codec::CORE_RECORD_BYTES;
pub use crate::core::Core;
pub use crate::error::LcpError;
pub use crate::lps::{Lps, DCT_ITERATION_COUNT};
