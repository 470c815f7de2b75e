//! The fixed-size container trailer.

use std::io::Cursor;

use crate::checksum::{Checksum, Crc32};
use crate::format::cursor::ByteCursor;
use crate::format::{FORMAT_VERSION, KNOWN_GLOBAL_FLAGS, MAGIC, TRAILER_SIZE};
use crate::{Error, Result};

/// Offset of the trailer checksum field; the checksum covers every byte
/// before it.
const CHECKSUM_OFFSET: usize = TRAILER_SIZE as usize - 4;

/// Decoded container trailer.
///
/// The trailer is the last [`TRAILER_SIZE`] bytes of every archive. It
/// identifies the container and locates the directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Trailer {
    /// Container format version.
    pub version: u16,
    /// Global flag bits.
    pub flags: u16,
    /// Number of records in the directory.
    pub entry_count: u32,
    /// Container offset of the serialized directory.
    pub directory_offset: u64,
    /// Length of the serialized directory in bytes.
    pub directory_length: u64,
    /// CRC-32 of the serialized directory.
    pub directory_checksum: u32,
}

impl Trailer {
    /// Creates a version 1 trailer with no global flags.
    pub fn new(
        entry_count: u32,
        directory_offset: u64,
        directory_length: u64,
        directory_checksum: u32,
    ) -> Self {
        Self {
            version: FORMAT_VERSION,
            flags: 0,
            entry_count,
            directory_offset,
            directory_length,
            directory_checksum,
        }
    }

    /// Encodes the trailer, appending its own checksum.
    pub fn encode(&self) -> [u8; TRAILER_SIZE as usize] {
        let mut buf = [0u8; TRAILER_SIZE as usize];
        buf[0..25].copy_from_slice(MAGIC);
        buf[25..27].copy_from_slice(&self.version.to_le_bytes());
        buf[27..29].copy_from_slice(&self.flags.to_le_bytes());
        buf[29..33].copy_from_slice(&self.entry_count.to_le_bytes());
        buf[33..41].copy_from_slice(&self.directory_offset.to_le_bytes());
        buf[41..49].copy_from_slice(&self.directory_length.to_le_bytes());
        buf[49..53].copy_from_slice(&self.directory_checksum.to_le_bytes());
        let crc = Crc32::compute(&buf[..CHECKSUM_OFFSET]);
        buf[CHECKSUM_OFFSET..].copy_from_slice(&crc.to_le_bytes());
        buf
    }

    /// Parses and validates trailer bytes.
    ///
    /// Checks run in a fixed order: magic, version, trailer checksum, then
    /// global flags. A foreign file is therefore always reported as
    /// [`Error::NotAnArchive`] and a newer archive as
    /// [`Error::UnsupportedVersion`], whatever else is wrong with it.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != TRAILER_SIZE as usize {
            return Err(Error::NotAnArchive(format!(
                "trailer must be {} bytes, got {}",
                TRAILER_SIZE,
                bytes.len()
            )));
        }

        let mut cursor = ByteCursor::new(Cursor::new(bytes))?;
        let magic = cursor.read_array::<25>()?;
        if &magic != MAGIC {
            return Err(Error::NotAnArchive("magic string not found".into()));
        }

        let version = cursor.read_u16()?;
        if version != FORMAT_VERSION {
            return Err(Error::UnsupportedVersion { version });
        }

        let flags = cursor.read_u16()?;
        let entry_count = cursor.read_u32()?;
        let directory_offset = cursor.read_u64()?;
        let directory_length = cursor.read_u64()?;
        let directory_checksum = cursor.read_u32()?;
        let stored = cursor.read_u32()?;

        let actual = Crc32::compute(&bytes[..CHECKSUM_OFFSET]);
        if stored != actual {
            return Err(Error::CorruptTrailer {
                expected: stored,
                actual,
            });
        }

        if flags & !KNOWN_GLOBAL_FLAGS != 0 {
            return Err(Error::UnsupportedFlags { flags });
        }

        Ok(Self {
            version,
            flags,
            entry_count,
            directory_offset,
            directory_length,
            directory_checksum,
        })
    }

    /// Returns the container offset one past the end of the directory.
    pub fn directory_end(&self) -> Option<u64> {
        self.directory_offset.checked_add(self.directory_length)
    }
}
