//! Windowed parsing for long inputs.
//!
//! [`ChunkedBuilder`] parses a long sequence in fixed-size windows, deepens
//! each window independently, and merges the per-window results by
//! overlapping the head of each new window against the tail of the
//! accumulator. Because core recognition is local, a window that produces
//! at least two fully-recognised cores overlaps the previous one on
//! exactly 0, 1 or 2 cores (matched by start index), and the merged output
//! is identical to parsing the whole input at once.

use crate::alphabet::{self, INVALID_SYMBOL};
use crate::core::Core;
use crate::lps::Lps;
use crate::utils::estimated_core_count;

/// Builder for the windowed parse-and-merge strategy.
///
/// ```
/// use lcparse::{ChunkedBuilder, Lps};
///
/// let seq: Vec<u8> = b"GGGACCTGGTGACCCCAGCCCACGACAGCCAAGC".repeat(64);
/// let chunked = ChunkedBuilder::new(3, 256).build(&seq);
/// let mut whole = Lps::new(&seq);
/// whole.deepen_to(3);
/// assert_eq!(chunked, whole);
/// ```
#[derive(Debug, Clone)]
pub struct ChunkedBuilder {
    target_level: u32,
    chunk_size: usize,
}

impl ChunkedBuilder {
    /// Configure a builder for the given target level and window size.
    ///
    /// # Panics
    /// Panics if `target_level` is 0 or `chunk_size` is 0.
    pub fn new(target_level: u32, chunk_size: usize) -> Self {
        assert!(target_level >= 1, "target level must be at least 1");
        assert!(chunk_size > 0, "chunk size must be positive");
        ChunkedBuilder {
            target_level,
            chunk_size,
        }
    }

    /// Parse `sequence` window by window, deepen each window to the target
    /// level, and merge.
    pub fn build(&self, sequence: &[u8]) -> Lps {
        #[cfg(feature = "tracing")]
        let span = tracing::debug_span!(
            "chunked_build",
            len = sequence.len(),
            chunk = self.chunk_size,
            level = self.target_level
        );
        #[cfg(feature = "tracing")]
        let _enter = span.enter();

        let tables = alphabet::current();
        let len = sequence.len();
        let mut cores: Vec<Core> =
            Vec::with_capacity(estimated_core_count(len, self.target_level));

        // Seed with the first window, then rewind the cursor to the
        // second-to-last core's start so the next window re-derives the
        // tail cores with full right context.
        let first_len = self.chunk_size.min(len);
        let mut piece = Lps::with_offset(&sequence[..first_len], 0);
        piece.deepen_to(self.target_level);
        let mut cursor = if piece.is_empty() {
            self.skip_ahead(sequence, &tables, 0, first_len)
        } else {
            let anchor = piece.len().saturating_sub(2);
            let rewind = piece.cores()[anchor].start() as usize;
            cores.extend_from_slice(piece.cores());
            rewind
        };

        while cursor < len {
            let window = self.chunk_size.min(len - cursor);
            let mut piece = Lps::with_offset(&sequence[cursor..cursor + window], cursor as u64);
            piece.deepen_to(self.target_level);

            if piece.len() > 1 {
                let overlap = matched_overlap(&cores, piece.cores());
                cores.extend_from_slice(&piece.cores()[overlap..]);

                // Jump to the new second-to-last start when it advances the
                // cursor; otherwise fall through and skip ahead.
                let anchor = cores[cores.len() - 2].start() as usize;
                if cursor < anchor {
                    cursor = anchor;
                    continue;
                }
            }

            cursor = self.skip_ahead(sequence, &tables, cursor, window);
        }

        cores.shrink_to_fit();
        Lps::from_parts(self.target_level, cores)
    }

    /// A window that contributed at most one core cannot anchor the merge.
    /// Move past the last invalid character inside it, or past the whole
    /// window when it holds none.
    fn skip_ahead(
        &self,
        sequence: &[u8],
        tables: &alphabet::Alphabet,
        cursor: usize,
        window: usize,
    ) -> usize {
        for i in (cursor..cursor + window).rev() {
            if tables.encode(sequence[i]) == INVALID_SYMBOL {
                return i + 1;
            }
        }
        cursor + window
    }
}

/// Number of accumulator tail cores re-derived by the new window: the
/// window's first core matches the second-to-last or last accumulated core
/// by start index, or none at all.
fn matched_overlap(accumulated: &[Core], incoming: &[Core]) -> usize {
    let first_start = incoming[0].start();
    let mut overlap = 2.min(accumulated.len());
    while overlap > 0 {
        if accumulated[accumulated.len() - overlap].start() == first_start {
            break;
        }
        overlap -= 1;
    }
    overlap
}

impl Lps {
    /// Convenience for [`ChunkedBuilder`]: parse `sequence` in windows of
    /// `chunk_size` symbols and deepen to `target_level`.
    pub fn chunked(sequence: &[u8], target_level: u32, chunk_size: usize) -> Lps {
        ChunkedBuilder::new(target_level, chunk_size).build(sequence)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[should_panic]
    fn zero_chunk_size_panics() {
        let _ = ChunkedBuilder::new(2, 0);
    }

    #[test]
    #[should_panic]
    fn zero_target_level_panics() {
        let _ = ChunkedBuilder::new(0, 128);
    }

    #[test]
    fn overlap_is_bounded_by_two() {
        let a = [
            Core::from_raw(2, 1, 0, 0, 4),
            Core::from_raw(2, 2, 0, 3, 8),
            Core::from_raw(2, 3, 0, 6, 11),
        ];
        let incoming_two = [Core::from_raw(2, 2, 0, 3, 8)];
        assert_eq!(matched_overlap(&a, &incoming_two), 2);
        let incoming_one = [Core::from_raw(2, 3, 0, 6, 11)];
        assert_eq!(matched_overlap(&a, &incoming_one), 1);
        let incoming_none = [Core::from_raw(2, 4, 0, 9, 13)];
        assert_eq!(matched_overlap(&a, &incoming_none), 0);
    }

    #[test]
    fn empty_input_builds_empty_container() {
        let parse = ChunkedBuilder::new(2, 64).build(b"");
        assert!(parse.is_empty());
        assert_eq!(parse.level(), 2);
    }

    #[test]
    fn all_invalid_input_terminates() {
        let seq = vec![b'N'; 1000];
        let parse = ChunkedBuilder::new(2, 64).build(&seq);
        assert!(parse.is_empty());
    }
}
