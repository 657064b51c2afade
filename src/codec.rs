//! Length-prefixed binary dump and load of a parse container.
//!
//! Layout, all little-endian: `level: u32`, `size: u32`, then `size`
//! 32-byte core records (`bit_size: u32`, `bit_rep: u64`, `label: u32`,
//! `start: u64`, `end: u64`). This is a same-host checkpoint format, not a
//! portable interchange format.

use std::io::{self, ErrorKind, Read, Write};

use crate::core::Core;
use crate::error::LcpError;
use crate::lps::Lps;

/// Serialized size of one core record.
pub const CORE_RECORD_BYTES: usize = 32;

impl Lps {
    /// Serialize the container.
    pub fn write_to<W: Write>(&self, out: &mut W) -> io::Result<()> {
        out.write_all(&self.level().to_le_bytes())?;
        out.write_all(&(self.len() as u32).to_le_bytes())?;
        for core in self.cores() {
            out.write_all(&core.bit_size().to_le_bytes())?;
            out.write_all(&core.bit_rep().to_le_bytes())?;
            out.write_all(&core.label().to_le_bytes())?;
            out.write_all(&core.start().to_le_bytes())?;
            out.write_all(&core.end().to_le_bytes())?;
        }
        Ok(())
    }

    /// Deserialize a container previously written by [`Lps::write_to`].
    ///
    /// Fails with [`LcpError::InvalidHeader`] on a zero level and with
    /// [`LcpError::TruncatedInput`] when the stream ends before the
    /// declared record count.
    pub fn read_from<R: Read>(input: &mut R) -> Result<Lps, LcpError> {
        let level = read_u32(input)?;
        if level == 0 {
            return Err(LcpError::InvalidHeader);
        }
        let size = read_u32(input)? as usize;

        // Allocation is paced by what the stream can actually hold; a
        // corrupt size fails on the first missing record instead of
        // reserving gigabytes up front.
        let mut cores = Vec::with_capacity(size.min(1 << 20));
        for _ in 0..size {
            let bit_size = read_u32(input)?;
            let bit_rep = read_u64(input)?;
            let label = read_u32(input)?;
            let start = read_u64(input)?;
            let end = read_u64(input)?;
            cores.push(Core::from_raw(bit_size, bit_rep, label, start, end));
        }
        Ok(Lps::from_parts(level, cores))
    }
}

fn read_u32<R: Read>(input: &mut R) -> Result<u32, LcpError> {
    let mut buf = [0u8; 4];
    input.read_exact(&mut buf).map_err(map_read_err)?;
    Ok(u32::from_le_bytes(buf))
}

fn read_u64<R: Read>(input: &mut R) -> Result<u64, LcpError> {
    let mut buf = [0u8; 8];
    input.read_exact(&mut buf).map_err(map_read_err)?;
    Ok(u64::from_le_bytes(buf))
}

fn map_read_err(err: io::Error) -> LcpError {
    if err.kind() == ErrorKind::UnexpectedEof {
        LcpError::TruncatedInput
    } else {
        LcpError::Io(err)
    }
}
