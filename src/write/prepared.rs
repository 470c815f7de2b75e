//! Entries compressed off the write path.
//!
//! Compression is usually the expensive part of writing an archive, and it
//! does not need the writer: [`PreparedEntry::prepare`] compresses and
//! checksums a buffer on its own, and [`prepare_parallel`] does so for many
//! buffers at once. The writer then only has to append the finished payloads
//! in order.

use crate::checksum::{Checksum, Crc32};
use crate::codec::{CodecRegistry, MethodId};
use crate::entry_name::EntryName;
use crate::Result;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// An entry whose payload is already compressed and checksummed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedEntry {
    name: EntryName,
    method: MethodId,
    payload: Vec<u8>,
    uncompressed_size: u64,
    checksum: u32,
}

impl PreparedEntry {
    /// Compresses `data` with `method` from `registry`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidEntryName`](crate::Error::InvalidEntryName) or
    /// [`Error::UnsupportedMethod`](crate::Error::UnsupportedMethod).
    pub fn prepare(
        registry: &CodecRegistry,
        name: impl AsRef<str>,
        data: &[u8],
        method: MethodId,
    ) -> Result<Self> {
        let name = EntryName::new(name.as_ref())?;
        let payload = registry
            .compress(method, data)
            .map_err(|e| e.with_entry(name.as_str()))?;
        Ok(Self {
            name,
            method,
            payload,
            uncompressed_size: data.len() as u64,
            checksum: Crc32::compute(data),
        })
    }

    /// Returns the entry name.
    pub fn name(&self) -> &EntryName {
        &self.name
    }

    /// Returns the method the payload was compressed with.
    pub fn method(&self) -> MethodId {
        self.method
    }

    /// Returns the compressed payload.
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Returns the size of the data before compression.
    pub fn uncompressed_size(&self) -> u64 {
        self.uncompressed_size
    }

    /// Returns the size of the compressed payload.
    pub fn compressed_size(&self) -> u64 {
        self.payload.len() as u64
    }

    /// Returns the CRC-32 of the data before compression.
    pub fn checksum(&self) -> u32 {
        self.checksum
    }
}

/// Prepares many entries with the same method, preserving input order.
///
/// Entries are compressed concurrently on the rayon thread pool when the
/// `parallel` feature is enabled, and one after another otherwise. The first
/// failure is returned.
///
/// # Example
///
/// ```rust
/// use mparc::{prepare_parallel, Writer};
/// use mparc::codec::{method, CodecRegistry};
///
/// let registry = CodecRegistry::default();
/// let items = vec![("a.txt", b"alpha".to_vec()), ("b.txt", b"beta".to_vec())];
/// let prepared = prepare_parallel(&registry, &items, method::STORE)?;
///
/// let mut writer = Writer::new(Vec::new());
/// for entry in prepared {
///     writer.append_prepared(entry)?;
/// }
/// let (result, _) = writer.finish()?;
/// assert_eq!(result.entries_written, 2);
/// # Ok::<(), mparc::Error>(())
/// ```
#[cfg(feature = "parallel")]
pub fn prepare_parallel<N, D>(
    registry: &CodecRegistry,
    items: &[(N, D)],
    method: MethodId,
) -> Result<Vec<PreparedEntry>>
where
    N: AsRef<str> + Sync,
    D: AsRef<[u8]> + Sync,
{
    items
        .par_iter()
        .map(|(name, data)| PreparedEntry::prepare(registry, name, data.as_ref(), method))
        .collect()
}

/// Prepares many entries with the same method, preserving input order.
///
/// Without the `parallel` feature entries are compressed one after another.
#[cfg(not(feature = "parallel"))]
pub fn prepare_parallel<N, D>(
    registry: &CodecRegistry,
    items: &[(N, D)],
    method: MethodId,
) -> Result<Vec<PreparedEntry>>
where
    N: AsRef<str> + Sync,
    D: AsRef<[u8]> + Sync,
{
    items
        .iter()
        .map(|(name, data)| PreparedEntry::prepare(registry, name, data.as_ref(), method))
        .collect()
}
