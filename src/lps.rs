//! The parse container and the deepening driver.
//!
//! An [`Lps`] (locally-parsed sequence) owns an ordered vector of cores at
//! a given level. Level 1 is produced by scanning the raw bytes; each
//! further level is produced by [`Lps::deepen_once`]: a DCT pass rewrites
//! every core (except a fixed prefix) as its difference from the left
//! neighbour, and the level-k machine re-parses the rewritten sequence
//! into a shorter one.
//!
//! ## Quick start
//! ```
//! use lcparse::Lps;
//!
//! let mut parse = Lps::new(b"GGGACCTGGTGACCCCAGCCCACGACAGCCAAGCGCCAGCTGAGCTCAGGTGTGAGGAGATCACAGTCCT");
//! assert_eq!(parse.len(), 31);
//! assert!(parse.deepen_to(2));
//! assert_eq!(parse.len(), 12);
//! ```

use crate::alphabet::{self, SymbolCode};
use crate::core::Core;
use crate::parser;
use crate::utils::estimated_core_count;

/// Number of DCT passes per deepening step. Each pass leaves one more core
/// of untouched prefix, and the re-parse starts past that prefix.
pub const DCT_ITERATION_COUNT: usize = 1;

/// A sequence parsed into cores at some level ≥ 1.
#[derive(Debug, Clone)]
pub struct Lps {
    level: u32,
    cores: Vec<Core>,
}

impl Lps {
    /// Parse a byte sequence at level 1 using the process-wide alphabet.
    ///
    /// Never fails: inputs shorter than 3 symbols, or without any
    /// recognisable boundary, produce an empty container.
    pub fn new(sequence: &[u8]) -> Self {
        Self::with_offset(sequence, 0)
    }

    /// Parse a slice of a larger input: every emitted index is shifted by
    /// `offset` so cores report spans over the original coordinates.
    pub fn with_offset(sequence: &[u8], offset: u64) -> Self {
        let tables = alphabet::current();
        let codes: Vec<SymbolCode> = sequence.iter().map(|&b| tables.encode(b)).collect();
        Self::from_codes(&codes, offset, sequence.len())
    }

    /// Parse the reverse complement of a byte sequence at level 1.
    ///
    /// Equivalent to parsing the reverse-complemented string forward;
    /// emitted indices live in the reversed coordinate system
    /// (`i ↦ len - i`).
    pub fn reverse_complement(sequence: &[u8]) -> Self {
        let tables = alphabet::current();
        let codes: Vec<SymbolCode> = sequence
            .iter()
            .rev()
            .map(|&b| tables.encode_rc(b))
            .collect();
        Self::from_codes(&codes, 0, sequence.len())
    }

    fn from_codes(codes: &[SymbolCode], offset: u64, input_len: usize) -> Self {
        #[cfg(feature = "tracing")]
        let span = tracing::debug_span!("lps_build", input_len, offset);
        #[cfg(feature = "tracing")]
        let _enter = span.enter();

        let mut cores = Vec::with_capacity(estimated_core_count(input_len, 1));
        parser::parse_level1(codes, offset, &mut cores);
        Lps { level: 1, cores }
    }

    /// Assemble a container from parts; used by the codec and the chunked
    /// builder.
    pub(crate) fn from_parts(level: u32, cores: Vec<Core>) -> Self {
        Lps { level, cores }
    }

    /// Current parse level (1 after construction).
    #[inline]
    pub fn level(&self) -> u32 {
        self.level
    }

    /// Number of cores.
    #[inline]
    pub fn len(&self) -> usize {
        self.cores.len()
    }

    /// Whether the container holds no cores.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cores.is_empty()
    }

    /// The cores, in input order.
    #[inline]
    pub fn cores(&self) -> &[Core] {
        &self.cores
    }

    /// Bytes owned by this container: the fixed header plus one record per
    /// core.
    pub fn memsize(&self) -> usize {
        std::mem::size_of::<Lps>() + self.cores.len() * std::mem::size_of::<Core>()
    }

    /// One deepening step: DCT-compress in place, then re-parse the
    /// compressed cores past the DCT prefix into the next level.
    ///
    /// Returns `false` (no progress) when fewer than
    /// `DCT_ITERATION_COUNT + 1` cores remain; the container is emptied
    /// but its level still advances, so repeated calls terminate.
    pub fn deepen_once(&mut self) -> bool {
        #[cfg(feature = "tracing")]
        let span = tracing::debug_span!("deepen_once", level = self.level, size = self.cores.len());
        #[cfg(feature = "tracing")]
        let _enter = span.enter();

        if self.cores.len() < DCT_ITERATION_COUNT + 1 {
            self.cores.clear();
            self.level += 1;
            return false;
        }

        self.dct();
        self.cores = parser::parse_level_k(&self.cores[DCT_ITERATION_COUNT..]);
        self.level += 1;
        true
    }

    /// Deepen until `target` is reached or a step reports no progress.
    ///
    /// Returns `false` when `target` does not exceed the current level,
    /// `true` otherwise (even if the container ran empty on the way).
    pub fn deepen_to(&mut self, target: u32) -> bool {
        if target <= self.level {
            return false;
        }
        while self.level < target && self.deepen_once() {}
        true
    }

    /// Deterministic coin tossing over adjacent pairs, right to left, so
    /// every pair reads the left core's pre-compression value. Iteration
    /// `k` starts one core further in, leaving the prefix for the
    /// re-parse to skip.
    fn dct(&mut self) {
        for iteration in 0..DCT_ITERATION_COUNT {
            for right in ((iteration + 1)..self.cores.len()).rev() {
                let (left, rest) = self.cores.split_at_mut(right);
                Core::compress(&left[right - 1], &mut rest[0]);
            }
        }
    }
}

impl PartialEq for Lps {
    /// Containers are equal when their core sequences are equal; the level
    /// field is bookkeeping and does not participate.
    fn eq(&self, other: &Self) -> bool {
        self.cores == other.cores
    }
}

impl Eq for Lps {}

impl std::fmt::Display for Lps {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Level: {}", self.level)?;
        for core in &self.cores {
            write!(f, "{core} ")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEQ: &[u8] = b"GGGACCTGGTGACCCCAGCCCACGACAGCCAAGCGCCAGCTGAGCTCAGGTGTGAGGAGATCACAGTCCT";

    #[test]
    fn short_inputs_yield_empty_containers() {
        assert!(Lps::new(b"").is_empty());
        assert!(Lps::new(b"AC").is_empty());
        assert_eq!(Lps::new(b"").level(), 1);
    }

    #[test]
    fn spans_are_monotonic_and_bounded() {
        let parse = Lps::new(SEQ);
        let cores = parse.cores();
        assert!(!cores.is_empty());
        for pair in cores.windows(2) {
            assert!(pair[0].start() <= pair[1].start());
            assert!(pair[0].end() <= pair[1].end());
        }
        assert!(cores.iter().all(|c| c.end() <= SEQ.len() as u64));
        assert!(cores.iter().all(|c| c.start() < c.end()));
    }

    #[test]
    fn deepen_past_exhaustion_terminates() {
        let mut parse = Lps::new(SEQ);
        assert!(parse.deepen_to(10));
        // The parse runs dry before level 10; the failing step still
        // advanced the level once, and the loop stopped there.
        assert!(parse.is_empty());
        let reached = parse.level();
        assert!(reached < 10);
        // Further calls advance one empty level at a time.
        assert!(parse.deepen_to(10));
        assert_eq!(parse.level(), reached + 1);
        assert!(parse.is_empty());
    }

    #[test]
    fn deepen_to_lower_level_is_a_noop() {
        let mut parse = Lps::new(SEQ);
        let before = parse.clone();
        assert!(!parse.deepen_to(1));
        assert!(!parse.deepen_to(0));
        assert_eq!(parse, before);
        assert_eq!(parse.level(), 1);
    }

    #[test]
    fn memsize_is_linear_in_core_count() {
        let parse = Lps::new(SEQ);
        let base = Lps::new(b"").memsize();
        assert_eq!(
            parse.memsize(),
            base + parse.len() * std::mem::size_of::<Core>()
        );
    }

    #[test]
    fn equality_ignores_level_and_metadata() {
        let a = Lps::new(SEQ);
        let mut b = Lps::with_offset(SEQ, 1000);
        assert_eq!(a, b);
        b.deepen_once();
        assert_ne!(a, b);
    }

    #[test]
    fn deepening_propagates_spans_from_previous_level() {
        let mut parse = Lps::new(SEQ);
        let old_starts: Vec<u64> = parse.cores().iter().map(Core::start).collect();
        let old_ends: Vec<u64> = parse.cores().iter().map(Core::end).collect();
        assert!(parse.deepen_once());
        for core in parse.cores() {
            assert!(old_starts.contains(&core.start()));
            assert!(old_ends.contains(&core.end()));
        }
    }
}
