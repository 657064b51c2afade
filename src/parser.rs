//! Boundary-detection state machines.
//!
//! Both parsers make a single left-to-right pass, emitting a core whenever
//! one of the local recognitions fires at the earliest position:
//!
//! - **RINT**: a maximal run flanked by differing symbols.
//! - **LMIN**: a strict three-symbol local minimum.
//! - **LMAX**: a strict three-symbol local maximum, guarded on both sides
//!   so that overlapping maxima resolve deterministically.
//! - **SSEQ**: a bridge emitted between two adjacent cores that would
//!   otherwise leave a gap, overlapping one position into each.
//!
//! The level-1 machine reads symbol codes; the level-k machine reads cores
//! and compares their packed representations. The recognitions are local:
//! every decision at position `i` looks at most at `i-1 ..= i+3`, which is
//! what makes equal substrings parse identically in any context.

use crate::alphabet::{SymbolCode, INVALID_SYMBOL};
use crate::core::Core;

/// Level-1 pass over a code slice, pushing cores onto `out`.
///
/// `offset` is added to every emitted index. Invalid codes are stream
/// discontinuities: no recognition window may contain one, and a position
/// following an invalid code behaves like the start of the input. Inputs
/// shorter than 3 symbols emit nothing.
pub(crate) fn parse_level1(codes: &[SymbolCode], offset: u64, out: &mut Vec<Core>) {
    let len = codes.len();
    #[cfg(feature = "tracing")]
    let span = tracing::trace_span!("parse_level1", len, offset);
    #[cfg(feature = "tracing")]
    let _enter = span.enter();

    // End of the most recently emitted core; `len` doubles as the "no core
    // yet" sentinel since emissions only ever start below `len - 2`.
    let mut prev_end = len;
    let mut last_invalid: Option<usize> = None;
    let mut i = 0;

    while i + 2 < len {
        let c0 = codes[i];
        if c0 == INVALID_SYMBOL {
            last_invalid = Some(i);
            i += 1;
            continue;
        }
        let c1 = codes[i + 1];
        if c0 == c1 {
            i += 1;
            continue;
        }
        let c2 = codes[i + 2];

        // RINT: c1 begins a run; the run needs a valid trailing non-run
        // symbol, which becomes the window's last element.
        if c1 != INVALID_SYMBOL && c1 == c2 {
            let mut t = i + 2;
            while t < len && codes[t - 1] == codes[t] {
                t += 1;
            }
            if t != len && codes[t] != INVALID_SYMBOL {
                emit_sseq(codes, offset, prev_end, i, last_invalid, out);
                out.push(Core::leaf(
                    &codes[i..t + 1],
                    i as u64 + offset,
                    (t + 1) as u64 + offset,
                ));
                prev_end = t + 1;
                i += 1;
                continue;
            }
            // Run reaches the end of the input or a discontinuity: nothing
            // can flank it, and no other recognition can fire here either.
        }

        // LMIN: strict local minimum over three symbols.
        if c1 != INVALID_SYMBOL && c2 != INVALID_SYMBOL && c0 > c1 && c1 < c2 {
            emit_sseq(codes, offset, prev_end, i, last_invalid, out);
            out.push(Core::leaf(
                &codes[i..i + 3],
                i as u64 + offset,
                (i + 3) as u64 + offset,
            ));
            prev_end = i + 3;
            i += 1;
            continue;
        }

        if i == 0 {
            i += 1;
            continue;
        }

        // LMAX: strict local maximum, guarded by both neighbours. A
        // position right after a discontinuity has no usable left guard,
        // exactly like position 0.
        if i + 3 < len {
            let cm1 = codes[i - 1];
            let c3 = codes[i + 3];
            if cm1 != INVALID_SYMBOL
                && c1 != INVALID_SYMBOL
                && c2 != INVALID_SYMBOL
                && c3 != INVALID_SYMBOL
                && c0 < c1
                && c1 > c2
                && cm1 <= c0
                && c2 >= c3
            {
                emit_sseq(codes, offset, prev_end, i, last_invalid, out);
                out.push(Core::leaf(
                    &codes[i..i + 3],
                    i as u64 + offset,
                    (i + 3) as u64 + offset,
                ));
                prev_end = i + 3;
            }
        }
        i += 1;
    }
}

/// Emit the bridging core over `[prev_end - 1, i + 1)` when the previous
/// core ended strictly before `i`, unless an invalid code lies at or after
/// the bridge start.
fn emit_sseq(
    codes: &[SymbolCode],
    offset: u64,
    prev_end: usize,
    i: usize,
    last_invalid: Option<usize>,
    out: &mut Vec<Core>,
) {
    if prev_end < i && last_invalid.map_or(true, |inv| inv + 1 < prev_end) {
        out.push(Core::leaf(
            &codes[prev_end - 1..i + 1],
            (prev_end - 1) as u64 + offset,
            (i + 1) as u64 + offset,
        ));
    }
}

/// Level-k pass over a core slice.
///
/// The machine is the one from [`parse_level1`] with symbol comparison
/// replaced by the total order on packed representations. The alphabet is
/// closed under composition, so there is no invalid-symbol handling and no
/// interior guard on the bridge.
pub(crate) fn parse_level_k(cores: &[Core]) -> Vec<Core> {
    let len = cores.len();
    #[cfg(feature = "tracing")]
    let span = tracing::trace_span!("parse_level_k", len);
    #[cfg(feature = "tracing")]
    let _enter = span.enter();

    let mut out = Vec::with_capacity(len.div_ceil(2));
    let mut prev_end = len;
    let mut i = 0;

    while i + 2 < len {
        if cores[i] == cores[i + 1] {
            i += 1;
            continue;
        }

        // RINT over equal neighbours.
        if cores[i + 1] == cores[i + 2] {
            let mut t = i + 2;
            while t < len && cores[t - 1] == cores[t] {
                t += 1;
            }
            if t != len {
                if prev_end < i {
                    out.push(Core::compose(&cores[prev_end - 1..i + 1]));
                }
                out.push(Core::compose(&cores[i..t + 1]));
                prev_end = t + 1;
                i += 1;
                continue;
            }
        }

        // LMIN.
        if cores[i] > cores[i + 1] && cores[i + 1] < cores[i + 2] {
            if prev_end < i {
                out.push(Core::compose(&cores[prev_end - 1..i + 1]));
            }
            out.push(Core::compose(&cores[i..i + 3]));
            prev_end = i + 3;
            i += 1;
            continue;
        }

        if i == 0 {
            i += 1;
            continue;
        }

        // LMAX.
        if i + 3 < len
            && cores[i] < cores[i + 1]
            && cores[i + 1] > cores[i + 2]
            && cores[i - 1] <= cores[i]
            && cores[i + 2] >= cores[i + 3]
        {
            if prev_end < i {
                out.push(Core::compose(&cores[prev_end - 1..i + 1]));
            }
            out.push(Core::compose(&cores[i..i + 3]));
            prev_end = i + 3;
        }
        i += 1;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alphabet::Alphabet;

    fn codes(seq: &[u8]) -> Vec<SymbolCode> {
        let a = Alphabet::dna();
        seq.iter().map(|&b| a.encode(b)).collect()
    }

    fn parse(seq: &[u8]) -> Vec<Core> {
        let mut out = Vec::new();
        parse_level1(&codes(seq), 0, &mut out);
        out
    }

    #[test]
    fn too_short_input_emits_nothing() {
        assert!(parse(b"").is_empty());
        assert!(parse(b"A").is_empty());
        assert!(parse(b"AC").is_empty());
    }

    #[test]
    fn local_minimum_is_recognised() {
        // G A C: 2 > 0 < 1.
        let cores = parse(b"GAC");
        assert_eq!(cores.len(), 1);
        assert_eq!(cores[0].packed_value(), 0x61);
        assert_eq!((cores[0].start(), cores[0].end()), (0, 3));
    }

    #[test]
    fn run_needs_a_trailing_symbol() {
        // The run reaches the end of the input: no core.
        assert!(parse(b"ACC").is_empty());
        // With a trailing symbol the run is flanked on both sides.
        let cores = parse(b"ACCT");
        assert_eq!(cores.len(), 1);
        assert_eq!(cores[0].packed_value(), 0x87);
        assert_eq!((cores[0].start(), cores[0].end()), (0, 4));
    }

    #[test]
    fn local_maximum_requires_both_guards() {
        // C T G alone lacks the outer guards.
        assert!(parse(b"CTG").is_empty());
        // A C T G G: i = 1 has 0 <= 1, 1 < 3 > 2, 2 >= 2.
        let cores = parse(b"ACTGG");
        assert_eq!(cores.len(), 1);
        assert_eq!(cores[0].packed_value(), 0x5E);
        assert_eq!((cores[0].start(), cores[0].end()), (1, 4));
    }

    #[test]
    fn offset_shifts_emitted_indices() {
        let mut out = Vec::new();
        parse_level1(&codes(b"GAC"), 100, &mut out);
        assert_eq!((out[0].start(), out[0].end()), (100, 103));
    }

    #[test]
    fn invalid_codes_break_recognition_windows() {
        // The N interrupts what would otherwise recognise "GAC".
        assert!(parse(b"GNC").is_empty());
        assert!(parse(b"GANC").is_empty());
        // A core on the far side of the discontinuity is still found.
        let cores = parse(b"NNGACNN");
        assert_eq!(cores.len(), 1);
        assert_eq!((cores[0].start(), cores[0].end()), (2, 5));
    }

    #[test]
    fn run_flanked_by_invalid_emits_nothing() {
        // The trailing flank is part of the run window; an N there must
        // suppress the recognition, not be packed into the core.
        assert!(parse(b"ACCN").is_empty());
        assert!(parse(b"ACCCCN").is_empty());
        // The same run with a valid flank past the gap is found as usual.
        let cores = parse(b"ACCNACCT");
        assert_eq!(cores.len(), 1);
        assert_eq!((cores[0].start(), cores[0].end()), (4, 8));
        assert_eq!(cores[0].packed_value(), 0x87);
    }

    #[test]
    fn adjacent_cores_need_no_bridge() {
        // LMIN [0,3), RINT [2,6), LMIN [5,8): overlapping chain, no bridge.
        let cores = parse(b"GACTTGAC");
        assert_eq!(cores.len(), 3);
        let starts: Vec<u64> = cores.iter().map(Core::start).collect();
        assert_eq!(starts, vec![0, 2, 5]);
    }

    #[test]
    fn sseq_bridges_gaps_between_cores() {
        // T A C G T A C: LMIN [0,3), then the ascent to the peak at 4 fires
        // nothing (the peak's right guard fails), and the next minimum
        // starts at 4, past the previous end 3. The bridge over [2,5) is
        // emitted first.
        let cores = parse(b"TACGTAC");
        assert_eq!(cores.len(), 3);
        let spans: Vec<(u64, u64)> = cores.iter().map(|c| (c.start(), c.end())).collect();
        assert_eq!(spans, vec![(0, 3), (2, 5), (4, 7)]);
        assert_eq!(cores[0].packed_value(), 0x71);
        assert_eq!(cores[1].packed_value(), 0x5B);
        assert_eq!(cores[2].packed_value(), 0x71);
    }

    #[test]
    fn sseq_is_suppressed_across_invalid_codes() {
        // Same shape with the bridge interior replaced by N: both minima
        // survive, the bridge does not.
        let cores = parse(b"TACNTAC");
        assert_eq!(cores.len(), 2);
        let spans: Vec<(u64, u64)> = cores.iter().map(|c| (c.start(), c.end())).collect();
        assert_eq!(spans, vec![(0, 3), (4, 7)]);
    }

    #[test]
    fn invalid_codes_suppress_bridges_only_inside_the_gap() {
        // An invalid code well before the previous core's end leaves later
        // bridges intact.
        let cores = parse(b"NNTACGTAC");
        assert_eq!(cores.len(), 3);
        let spans: Vec<(u64, u64)> = cores.iter().map(|c| (c.start(), c.end())).collect();
        assert_eq!(spans, vec![(2, 5), (4, 7), (6, 9)]);
    }

    #[test]
    fn level_k_machine_matches_symbol_machine_shape() {
        // Cores with representations 3,0,1 form a local minimum.
        let input = [
            Core::from_raw(2, 3, 0, 0, 3),
            Core::from_raw(2, 0, 0, 2, 5),
            Core::from_raw(2, 1, 0, 4, 7),
        ];
        let out = parse_level_k(&input);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].bit_rep(), 0b11_00_01);
        assert_eq!((out[0].start(), out[0].end()), (0, 7));
    }

    #[test]
    fn level_k_emits_bridges() {
        // After the minimum over (3,0,1), the ascent 1,2,3 fires nothing
        // until the minimum at (5,2,3); the gap is covered by a bridge
        // composed of (1,2,3,5).
        let input = [
            Core::from_raw(2, 3, 0, 0, 3),
            Core::from_raw(2, 0, 0, 2, 5),
            Core::from_raw(2, 1, 0, 4, 7),
            Core::from_raw(2, 2, 0, 6, 10),
            Core::from_raw(2, 3, 0, 8, 12),
            Core::from_raw(3, 5, 0, 11, 14),
            Core::from_raw(2, 2, 0, 13, 16),
            Core::from_raw(2, 3, 0, 15, 18),
        ];
        let out = parse_level_k(&input);
        assert_eq!(out.len(), 3);
        assert_eq!(out[0].bit_rep(), 0b11_00_01);
        assert_eq!((out[0].start(), out[0].end()), (0, 7));
        // Bridge over cores 2..=5: 1 ++ 2 ++ 3 ++ 5 with sizes 2,2,2,3.
        assert_eq!(out[1].bit_rep(), 0b01_10_11_101);
        assert_eq!(out[1].bit_size(), 9);
        assert_eq!((out[1].start(), out[1].end()), (4, 14));
        // Minimum over cores 5..=7: 5 ++ 2 ++ 3 with sizes 3,2,2.
        assert_eq!(out[2].bit_rep(), 0b101_10_11);
        assert_eq!((out[2].start(), out[2].end()), (11, 18));
    }
}
