//! Symbol encoding tables and process-wide alphabet configuration.
//!
//! The engine works over codes in `0..=3` produced by two 128-entry tables:
//! a forward table and a reverse-complement table. Characters without an
//! entry carry [`INVALID_SYMBOL`] and act as stream discontinuities in the
//! level-1 parser.
//!
//! The tables are process-wide configuration: initialise them once at
//! startup (they default to the DNA mapping), then treat them as read-only.
//! Callers that need to re-initialise concurrently must serialise those
//! calls themselves. Parsers take a snapshot via [`current`], so a parse
//! never observes a half-written table.

use std::io::BufRead;
use std::sync::{LazyLock, RwLock};

use crate::error::LcpError;

/// A symbol code: `0..=3` for valid symbols, [`INVALID_SYMBOL`] otherwise.
pub type SymbolCode = i8;

/// Sentinel code for characters outside the alphabet.
pub const INVALID_SYMBOL: SymbolCode = -1;

/// Largest code representable in the packed core layout (2 bits).
pub const MAX_SYMBOL_CODE: SymbolCode = 3;

/// Forward and reverse-complement encoding tables for bytes `0..128`.
///
/// For the DNA default, composing the reverse-complement table with itself
/// is the identity on valid codes. [`Alphabet::from_reader`] does not
/// enforce that on user tables.
#[derive(Clone)]
pub struct Alphabet {
    forward: [SymbolCode; 128],
    reverse_complement: [SymbolCode; 128],
    characters: [u8; 4],
}

impl Alphabet {
    /// The standard DNA mapping: A/a=0, C/c=1, G/g=2, T/t=3, with the
    /// reverse complement exchanging A↔T and C↔G.
    pub fn dna() -> Self {
        let mut forward = [INVALID_SYMBOL; 128];
        let mut reverse_complement = [INVALID_SYMBOL; 128];
        for (ch, fwd, rc) in [
            (b'A', 0, 3),
            (b'C', 1, 2),
            (b'G', 2, 1),
            (b'T', 3, 0),
        ] {
            forward[ch as usize] = fwd;
            forward[ch.to_ascii_lowercase() as usize] = fwd;
            reverse_complement[ch as usize] = rc;
            reverse_complement[ch.to_ascii_lowercase() as usize] = rc;
        }
        Alphabet {
            forward,
            reverse_complement,
            characters: *b"ACGT",
        }
    }

    /// Build an alphabet from whitespace-separated `<char> <fwd> <rc>`
    /// lines. Blank lines are ignored.
    ///
    /// Fails with [`LcpError::InvalidAlphabet`] on a malformed line, a
    /// non-ASCII character, or a code outside `0..=3` (the packed core
    /// layout reserves exactly two bits per symbol).
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self, LcpError> {
        let mut forward = [INVALID_SYMBOL; 128];
        let mut reverse_complement = [INVALID_SYMBOL; 128];
        let mut characters = [b'?'; 4];
        let mut entries = 0usize;

        for (lineno, line) in reader.lines().enumerate() {
            let line = line?;
            let mut fields = line.split_whitespace();
            let Some(ch) = fields.next() else { continue };
            let (fwd, rc) = match (fields.next(), fields.next(), fields.next()) {
                (Some(fwd), Some(rc), None) => (fwd, rc),
                _ => {
                    return Err(LcpError::InvalidAlphabet(format!(
                        "line {}: expected `<char> <fwd> <rc>`",
                        lineno + 1
                    )))
                }
            };
            let mut bytes = ch.bytes();
            let byte = match (bytes.next(), bytes.next()) {
                (Some(b), None) if b < 128 => b,
                _ => {
                    return Err(LcpError::InvalidAlphabet(format!(
                        "line {}: character must be a single ASCII byte",
                        lineno + 1
                    )))
                }
            };
            let fwd = parse_code(fwd, lineno)?;
            let rc = parse_code(rc, lineno)?;
            forward[byte as usize] = fwd;
            reverse_complement[byte as usize] = rc;
            if characters[fwd as usize] == b'?' {
                characters[fwd as usize] = byte;
            }
            entries += 1;
        }

        if entries == 0 {
            return Err(LcpError::InvalidAlphabet(
                "no encoding entries found".to_string(),
            ));
        }

        Ok(Alphabet {
            forward,
            reverse_complement,
            characters,
        })
    }

    /// Forward code for a byte. Bytes ≥ 128 are invalid.
    #[inline]
    pub fn encode(&self, byte: u8) -> SymbolCode {
        self.forward
            .get(byte as usize)
            .copied()
            .unwrap_or(INVALID_SYMBOL)
    }

    /// Reverse-complement code for a byte. Bytes ≥ 128 are invalid.
    #[inline]
    pub fn encode_rc(&self, byte: u8) -> SymbolCode {
        self.reverse_complement
            .get(byte as usize)
            .copied()
            .unwrap_or(INVALID_SYMBOL)
    }

    /// Representative character for a valid code.
    #[inline]
    pub fn decode(&self, code: SymbolCode) -> Option<u8> {
        if (0..=MAX_SYMBOL_CODE).contains(&code) {
            Some(self.characters[code as usize])
        } else {
            None
        }
    }

    fn summary(&self) -> String {
        let mut out = String::from("# Alphabet encoding summary\n# Coefficients:");
        for byte in 0..128u8 {
            let code = self.forward[byte as usize];
            if code != INVALID_SYMBOL {
                out.push_str(&format!(" {}:{}", byte as char, code));
            }
        }
        out.push_str("\n# Symbol width: 2 bits");
        out
    }
}

fn parse_code(field: &str, lineno: usize) -> Result<SymbolCode, LcpError> {
    let value: i32 = field.parse().map_err(|_| {
        LcpError::InvalidAlphabet(format!("line {}: `{field}` is not a code", lineno + 1))
    })?;
    if !(0..=MAX_SYMBOL_CODE as i32).contains(&value) {
        return Err(LcpError::InvalidAlphabet(format!(
            "line {}: code {value} does not fit in 2 bits",
            lineno + 1
        )));
    }
    Ok(value as SymbolCode)
}

static TABLES: LazyLock<RwLock<Alphabet>> = LazyLock::new(|| RwLock::new(Alphabet::dna()));

/// Reset the process-wide tables to the DNA default.
pub fn init_default(verbose: bool) {
    install(Alphabet::dna());
    if verbose {
        println!("{}", current().summary());
    }
}

/// Replace the process-wide tables with an alphabet read from a stream of
/// `<char> <fwd> <rc>` lines.
///
/// On failure the tables are left unchanged.
pub fn init_from_reader<R: BufRead>(reader: R, verbose: bool) -> Result<(), LcpError> {
    let alphabet = Alphabet::from_reader(reader)?;
    install(alphabet);
    if verbose {
        println!("{}", current().summary());
    }
    Ok(())
}

/// Install a specific alphabet as the process-wide configuration.
///
/// This is the swap hook for tests and for callers with dynamic alphabets;
/// such callers must serialise initialisation against running parses.
pub fn install(alphabet: Alphabet) {
    #[cfg(feature = "tracing")]
    tracing::info!("installing alphabet tables");
    *TABLES.write().expect("alphabet table lock poisoned") = alphabet;
}

/// Snapshot of the process-wide tables.
pub fn current() -> Alphabet {
    TABLES.read().expect("alphabet table lock poisoned").clone()
}
