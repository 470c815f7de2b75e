//! The entry directory: the archive's table of contents.
//!
//! The directory is built incrementally while an archive is written and is
//! immutable once the archive is sealed or opened. It is the sole owner of
//! entry metadata; payload bytes are referenced by offset and only
//! materialized on extraction.
//!
//! # Serialized form
//!
//! ```text
//! entry count          u32
//! repeated per entry, in insertion order:
//!   name length        u16
//!   name bytes         UTF-8, name length bytes
//!   uncompressed size  u64
//!   compressed size    u64
//!   payload offset     u64
//!   method id          u16
//!   checksum           u32 (CRC-32 of the uncompressed payload)
//!   flags              u8
//! ```

use std::collections::HashMap;
use std::io::Cursor;

use crate::codec::MethodId;
use crate::entry_name::EntryName;
use crate::format::cursor::{ByteCursor, ByteSink};
use crate::format::{DIRECTORY_COUNT_SIZE, RECORD_FIXED_SIZE};
use crate::{Error, Result};

/// Per-entry flag bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct EntryFlags(u8);

impl EntryFlags {
    /// The payload is stored after the directory rather than before it.
    pub const PAYLOAD_AFTER_DIRECTORY: Self = Self(0x01);

    const KNOWN_BITS: u8 = 0x01;

    /// Returns flags with no bits set.
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Returns the raw bits.
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Returns flags from raw bits, or `None` if a reserved bit is set.
    pub const fn from_bits(bits: u8) -> Option<Self> {
        if bits & !Self::KNOWN_BITS != 0 {
            None
        } else {
            Some(Self(bits))
        }
    }

    /// Returns `true` if every bit of `other` is set in `self`.
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

/// A single directory record.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct EntryRecord {
    /// Entry name.
    pub name: EntryName,
    /// Size of the payload after decompression.
    pub uncompressed_size: u64,
    /// Size of the payload as stored.
    pub compressed_size: u64,
    /// Container offset of the stored payload.
    pub offset: u64,
    /// Compression method id.
    pub method: MethodId,
    /// CRC-32 of the uncompressed payload.
    pub checksum: u32,
    /// Entry flags.
    pub flags: EntryFlags,
}

impl EntryRecord {
    /// Returns the container offset one past the stored payload, or `None`
    /// if it overflows.
    pub fn payload_end(&self) -> Option<u64> {
        self.offset.checked_add(self.compressed_size)
    }

    /// Returns the stored size as a fraction of the uncompressed size.
    ///
    /// Empty entries report `1.0`.
    pub fn compression_ratio(&self) -> f64 {
        if self.uncompressed_size == 0 {
            1.0
        } else {
            self.compressed_size as f64 / self.uncompressed_size as f64
        }
    }

    fn encoded_len(&self) -> u64 {
        RECORD_FIXED_SIZE + self.name.len() as u64
    }
}

/// Metadata fixed when an entry is added, before its payload is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EntryMetadata {
    /// Compression method id.
    pub method: MethodId,
    /// Entry flags.
    pub flags: EntryFlags,
}

/// Where a payload ended up and what it contained.
///
/// Applied to a record with [`Directory::patch`] once the payload has been
/// fully written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Placement {
    /// Container offset of the stored payload.
    pub offset: u64,
    /// Size of the payload as stored.
    pub compressed_size: u64,
    /// Size of the payload before compression.
    pub uncompressed_size: u64,
    /// CRC-32 of the uncompressed payload.
    pub checksum: u32,
}

/// Handle to a record added with [`Directory::add_entry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntryHandle(usize);

impl EntryHandle {
    /// Returns the record's position in insertion order.
    pub fn index(self) -> usize {
        self.0
    }
}

/// Ordered, name-unique collection of entry records.
#[derive(Debug, Clone, Default)]
pub struct Directory {
    records: Vec<EntryRecord>,
    index: HashMap<EntryName, usize>,
}

impl Directory {
    /// Creates an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a record with zero sizes, to be patched once its payload is
    /// written.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateName`] if the name is already present. The
    /// directory is left unchanged.
    pub fn add_entry(&mut self, name: EntryName, metadata: EntryMetadata) -> Result<EntryHandle> {
        if self.index.contains_key(&name) {
            return Err(Error::DuplicateName {
                name: name.into_string(),
            });
        }
        let handle = EntryHandle(self.records.len());
        self.index.insert(name.clone(), handle.0);
        self.records.push(EntryRecord {
            name,
            uncompressed_size: 0,
            compressed_size: 0,
            offset: 0,
            method: metadata.method,
            checksum: 0,
            flags: metadata.flags,
        });
        Ok(handle)
    }

    /// Records the final placement of an entry's payload and returns the
    /// completed record.
    pub fn patch(&mut self, handle: EntryHandle, placement: Placement) -> Result<&EntryRecord> {
        let record = self
            .records
            .get_mut(handle.0)
            .ok_or_else(|| Error::EntryNotFound {
                name: format!("#{}", handle.0),
            })?;
        record.offset = placement.offset;
        record.compressed_size = placement.compressed_size;
        record.uncompressed_size = placement.uncompressed_size;
        record.checksum = placement.checksum;
        Ok(&*record)
    }

    /// Looks up a record by exact name.
    pub fn get(&self, name: &str) -> Option<&EntryRecord> {
        self.index.get(name).map(|&i| &self.records[i])
    }

    /// Returns the insertion position of a name.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Returns `true` if a record with this exact name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Returns the record behind a handle.
    pub fn record(&self, handle: EntryHandle) -> Option<&EntryRecord> {
        self.records.get(handle.0)
    }

    /// Returns all records in insertion order.
    pub fn records(&self) -> &[EntryRecord] {
        &self.records
    }

    /// Iterates over records in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, EntryRecord> {
        self.records.iter()
    }

    /// Returns the number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if there are no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns the size of the serialized form in bytes.
    pub fn serialized_len(&self) -> u64 {
        DIRECTORY_COUNT_SIZE + self.records.iter().map(EntryRecord::encoded_len).sum::<u64>()
    }

    /// Serializes the directory.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ResourceLimitExceeded`] if there are more records
    /// than a `u32` count can express.
    pub fn serialize(&self) -> Result<Vec<u8>> {
        let count = u32::try_from(self.records.len()).map_err(|_| {
            Error::ResourceLimitExceeded(format!(
                "{} entries exceed the directory limit of {}",
                self.records.len(),
                u32::MAX
            ))
        })?;

        let capacity = usize::try_from(self.serialized_len()).unwrap_or(0);
        let mut sink = ByteSink::new(Vec::with_capacity(capacity));
        sink.write_u32(count)?;
        for record in &self.records {
            // EntryName guarantees the length fits in u16.
            sink.write_u16(record.name.len() as u16)?;
            sink.write(record.name.as_str().as_bytes())?;
            sink.write_u64(record.uncompressed_size)?;
            sink.write_u64(record.compressed_size)?;
            sink.write_u64(record.offset)?;
            sink.write_u16(record.method)?;
            sink.write_u32(record.checksum)?;
            sink.write_u8(record.flags.bits())?;
        }
        Ok(sink.into_inner())
    }

    /// Parses a serialized directory.
    ///
    /// Every inconsistency is reported as [`Error::MalformedDirectory`] with
    /// the offset inside `bytes` where it was found: short input, invalid or
    /// duplicate names, reserved flag bits, payload ranges that overflow, and
    /// trailing bytes after the last record.
    pub fn deserialize(bytes: &[u8]) -> Result<Self> {
        let mut cursor = ByteCursor::new(Cursor::new(bytes))?;
        let count = cursor.read_u32().map_err(as_malformed)?;

        // Each record needs at least its fixed fields, so a count the input
        // cannot possibly hold is rejected before anything is allocated.
        let body = bytes.len() as u64 - DIRECTORY_COUNT_SIZE;
        if u64::from(count) > body / RECORD_FIXED_SIZE {
            return Err(Error::malformed(
                0,
                format!(
                    "entry count {} does not fit in {} bytes of records",
                    count, body
                ),
            ));
        }

        let mut directory = Self {
            records: Vec::with_capacity(count as usize),
            index: HashMap::with_capacity(count as usize),
        };

        for _ in 0..count {
            let record_start = cursor.position()?;
            let name_len = cursor.read_u16().map_err(as_malformed)?;
            let name_bytes = cursor.read(usize::from(name_len)).map_err(as_malformed)?;
            let name = EntryName::from_stored(name_bytes).map_err(|e| match e {
                Error::InvalidEntryName(reason) => Error::malformed(record_start + 2, reason),
                other => other,
            })?;

            let uncompressed_size = cursor.read_u64().map_err(as_malformed)?;
            let compressed_size = cursor.read_u64().map_err(as_malformed)?;
            let offset = cursor.read_u64().map_err(as_malformed)?;
            let method = cursor.read_u16().map_err(as_malformed)?;
            let checksum = cursor.read_u32().map_err(as_malformed)?;
            let flags_pos = cursor.position()?;
            let raw_flags = cursor.read_u8().map_err(as_malformed)?;
            let flags = EntryFlags::from_bits(raw_flags).ok_or_else(|| {
                Error::malformed(
                    flags_pos,
                    format!("entry '{}' has reserved flag bits {:#04x}", name, raw_flags),
                )
            })?;

            if offset.checked_add(compressed_size).is_none() {
                return Err(Error::malformed(
                    record_start,
                    format!("payload range of entry '{}' overflows", name),
                ));
            }

            if directory.index.contains_key(&name) {
                return Err(Error::malformed(
                    record_start,
                    format!("duplicate entry name '{}'", name),
                ));
            }

            directory.index.insert(name.clone(), directory.records.len());
            directory.records.push(EntryRecord {
                name,
                uncompressed_size,
                compressed_size,
                offset,
                method,
                checksum,
                flags,
            });
        }

        let end = cursor.position()?;
        if end != bytes.len() as u64 {
            return Err(Error::malformed(
                end,
                format!("{} trailing bytes after last record", bytes.len() as u64 - end),
            ));
        }

        Ok(directory)
    }

    /// Checks every payload range against the container layout.
    ///
    /// `container_len` is the offset of the trailer. Payloads without
    /// [`EntryFlags::PAYLOAD_AFTER_DIRECTORY`] must end at or before the
    /// directory; payloads with it must lie between the directory and the
    /// trailer.
    pub fn validate_layout(
        &self,
        container_len: u64,
        directory_offset: u64,
        directory_len: u64,
    ) -> Result<()> {
        let directory_end = directory_offset
            .checked_add(directory_len)
            .filter(|&end| end <= container_len)
            .ok_or_else(|| Error::malformed(0, "directory extends past the trailer"))?;

        for record in &self.records {
            let end = record
                .payload_end()
                .ok_or_else(|| Error::malformed(record.offset, "payload range overflows"))?;

            let fits = if record.flags.contains(EntryFlags::PAYLOAD_AFTER_DIRECTORY) {
                record.offset >= directory_end && end <= container_len
            } else {
                end <= directory_offset
            };

            if !fits {
                return Err(Error::malformed(
                    record.offset,
                    format!(
                        "payload of entry '{}' ({} bytes at {:#x}) lies outside its region",
                        record.name, record.compressed_size, record.offset
                    ),
                ));
            }
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a Directory {
    type Item = &'a EntryRecord;
    type IntoIter = std::slice::Iter<'a, EntryRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

fn as_malformed(err: Error) -> Error {
    match err {
        Error::TruncatedInput {
            offset,
            needed,
            available,
        } => Error::malformed(
            offset,
            format!(
                "record truncated: needed {} bytes, {} available",
                needed, available
            ),
        ),
        other => other,
    }
}
