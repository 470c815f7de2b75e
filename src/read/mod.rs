//! Archive reading API.
//!
//! [`Archive::open`] validates the trailer and the directory up front; an
//! archive value therefore always has a consistent directory, and listing
//! entries never touches the medium. Payloads are read, decompressed and
//! verified only when an entry is extracted.
//!
//! # Example
//!
//! ```rust
//! use mparc::{Archive, Writer};
//! use mparc::codec::method;
//! use std::io::Cursor;
//!
//! let mut writer = Writer::new(Vec::new());
//! writer.add_bytes("readme.txt", b"Read me first", method::STORE)?;
//! let (_, bytes) = writer.finish()?;
//!
//! let mut archive = Archive::open(Cursor::new(bytes))?;
//! for entry in archive.entries() {
//!     println!("{}: {} bytes", entry.name, entry.uncompressed_size);
//! }
//! assert_eq!(archive.extract("readme.txt")?, b"Read me first");
//! # Ok::<(), mparc::Error>(())
//! ```

mod extraction;
mod info;
mod options;
mod query;

pub use info::{ArchiveInfo, ExtractResult, VerifyResult};
pub use options::{ReadOptions, ResourceLimits};
pub use query::Query;

use std::io::{Read, Seek};

use crate::checksum::{Checksum, Crc32};
use crate::codec::CodecRegistry;
use crate::format::TRAILER_SIZE;
use crate::format::cursor::ByteCursor;
use crate::format::directory::{Directory, EntryRecord};
use crate::format::trailer::Trailer;
use crate::{Error, Result};

/// An open, validated MPARC archive.
pub struct Archive<R> {
    cursor: ByteCursor<R>,
    directory: Directory,
    trailer: Trailer,
    registry: CodecRegistry,
    limits: ResourceLimits,
}

impl<R> std::fmt::Debug for Archive<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Archive")
            .field("entries", &self.directory.len())
            .field("trailer", &self.trailer)
            .finish_non_exhaustive()
    }
}

impl<R: Read + Seek> Archive<R> {
    /// Opens an archive with the default codec registry and limits.
    pub fn open(reader: R) -> Result<Self> {
        Self::open_with_options(reader, ReadOptions::default())
    }

    /// Opens an archive with custom options.
    ///
    /// Validation happens in a fixed order, and the first failure rejects
    /// the archive:
    ///
    /// 1. the medium must hold a trailer with the MPARC magic
    ///    ([`Error::NotAnArchive`])
    /// 2. the format version must be 1 ([`Error::UnsupportedVersion`])
    /// 3. the trailer checksum must match ([`Error::CorruptTrailer`])
    /// 4. no unknown global flags ([`Error::UnsupportedFlags`])
    /// 5. the directory must lie before the trailer
    ///    ([`Error::MalformedDirectory`])
    /// 6. the directory checksum must match ([`Error::CorruptDirectory`])
    /// 7. the directory must parse and agree with the trailer and with the
    ///    container layout ([`Error::MalformedDirectory`])
    pub fn open_with_options(reader: R, options: ReadOptions) -> Result<Self> {
        let ReadOptions { registry, limits } = options;
        let mut cursor = ByteCursor::new(reader)?;

        let len = cursor.len();
        if len < TRAILER_SIZE {
            return Err(Error::NotAnArchive(format!(
                "{} bytes is too short to hold a trailer",
                len
            )));
        }
        let trailer_offset = len - TRAILER_SIZE;
        let trailer = Trailer::parse(&cursor.read_at(trailer_offset, TRAILER_SIZE as usize)?)?;

        if trailer
            .directory_end()
            .is_none_or(|end| end > trailer_offset)
        {
            return Err(Error::malformed(
                0,
                format!(
                    "directory ({} bytes at {:#x}) extends past the trailer at {:#x}",
                    trailer.directory_length, trailer.directory_offset, trailer_offset
                ),
            ));
        }

        if trailer.directory_length > limits.max_directory_bytes {
            return Err(Error::ResourceLimitExceeded(format!(
                "directory of {} bytes exceeds the limit of {}",
                trailer.directory_length, limits.max_directory_bytes
            )));
        }
        let directory_length = usize::try_from(trailer.directory_length).map_err(|_| {
            Error::ResourceLimitExceeded(format!(
                "directory of {} bytes does not fit in memory",
                trailer.directory_length
            ))
        })?;

        let bytes = cursor.read_at(trailer.directory_offset, directory_length)?;
        let actual = Crc32::compute(&bytes);
        if actual != trailer.directory_checksum {
            return Err(Error::CorruptDirectory {
                expected: trailer.directory_checksum,
                actual,
            });
        }

        let directory = Directory::deserialize(&bytes)?;
        if directory.len() != trailer.entry_count as usize {
            return Err(Error::malformed(
                0,
                format!(
                    "directory holds {} entries but the trailer announces {}",
                    directory.len(),
                    trailer.entry_count
                ),
            ));
        }
        if directory.len() > limits.max_entries {
            return Err(Error::ResourceLimitExceeded(format!(
                "{} entries exceed the limit of {}",
                directory.len(),
                limits.max_entries
            )));
        }
        directory.validate_layout(
            trailer_offset,
            trailer.directory_offset,
            trailer.directory_length,
        )?;

        log::debug!(
            "opened archive: {} entries, directory {} bytes at {:#x}, container {} bytes",
            directory.len(),
            trailer.directory_length,
            trailer.directory_offset,
            len
        );

        Ok(Self {
            cursor,
            directory,
            trailer,
            registry,
            limits,
        })
    }

    /// Returns all entry records in directory order.
    pub fn entries(&self) -> &[EntryRecord] {
        self.directory.records()
    }

    /// Returns all entry records in directory order.
    ///
    /// Same as [`entries`](Self::entries).
    pub fn list_entries(&self) -> &[EntryRecord] {
        self.entries()
    }

    /// Iterates over entry names in directory order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.directory.iter().map(|r| r.name.as_str())
    }

    /// Looks up an entry by exact, case-sensitive name.
    pub fn entry(&self, name: &str) -> Option<&EntryRecord> {
        self.directory.get(name)
    }

    /// Returns `true` if an entry with this exact name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.directory.contains(name)
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.directory.len()
    }

    /// Returns `true` if the archive has no entries.
    pub fn is_empty(&self) -> bool {
        self.directory.is_empty()
    }

    /// Returns the validated directory.
    pub fn directory(&self) -> &Directory {
        &self.directory
    }

    /// Returns the decoded trailer.
    pub fn trailer(&self) -> &Trailer {
        &self.trailer
    }

    /// Returns summary information about the archive.
    pub fn info(&self) -> ArchiveInfo {
        let mut methods: Vec<_> = self.directory.iter().map(|r| r.method).collect();
        methods.sort_unstable();
        methods.dedup();

        ArchiveInfo {
            version: self.trailer.version,
            flags: self.trailer.flags,
            entry_count: self.directory.len(),
            directory_offset: self.trailer.directory_offset,
            directory_length: self.trailer.directory_length,
            directory_checksum: self.trailer.directory_checksum,
            container_length: self.cursor.len(),
            total_size: self.directory.iter().map(|r| r.uncompressed_size).sum(),
            compressed_size: self.directory.iter().map(|r| r.compressed_size).sum(),
            methods,
        }
    }

    /// Consumes the archive and returns the medium.
    pub fn into_inner(self) -> R {
        self.cursor.into_inner()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Writer;
    use crate::codec::method;
    use std::io::Cursor;

    fn build(entries: &[(&str, &[u8])]) -> Vec<u8> {
        let mut writer = Writer::new(Vec::new());
        for (name, data) in entries {
            writer.add_bytes(name, data, method::STORE).unwrap();
        }
        writer.finish().unwrap().1
    }

    #[test]
    fn test_open_empty_archive() {
        let archive = Archive::open(Cursor::new(build(&[]))).unwrap();
        assert!(archive.is_empty());
        let info = archive.info();
        assert_eq!(info.version, 1);
        assert_eq!(info.directory_offset, 0);
        assert_eq!(info.directory_length, 4);
        assert_eq!(info.container_length, 4 + TRAILER_SIZE);
        assert!(info.methods.is_empty());
    }

    #[test]
    fn test_listing_and_lookup() {
        let archive =
            Archive::open(Cursor::new(build(&[("b", b"22"), ("a", b"1")]))).unwrap();
        assert_eq!(archive.names().collect::<Vec<_>>(), ["b", "a"]);
        assert_eq!(archive.len(), 2);
        assert!(archive.contains("a"));
        assert!(!archive.contains("A"));
        assert_eq!(archive.entry("b").unwrap().uncompressed_size, 2);
        assert_eq!(archive.list_entries(), archive.entries());
    }

    #[test]
    fn test_info_totals() {
        let archive =
            Archive::open(Cursor::new(build(&[("x", b"12345"), ("y", b"678")]))).unwrap();
        let info = archive.info();
        assert_eq!(info.entry_count, 2);
        assert_eq!(info.total_size, 8);
        assert_eq!(info.compressed_size, 8);
        assert_eq!(info.methods, [method::STORE]);
        assert_eq!(info.directory_offset, 8);
    }

    #[test]
    fn test_too_short() {
        for len in [0usize, 1, TRAILER_SIZE as usize - 1] {
            let err = Archive::open(Cursor::new(vec![0u8; len])).unwrap_err();
            assert!(matches!(err, Error::NotAnArchive(_)), "{len}: {err:?}");
        }
    }

    #[test]
    fn test_entry_limit() {
        let bytes = build(&[("a", b""), ("b", b""), ("c", b"")]);
        let options = ReadOptions::new().limits(ResourceLimits::new().max_entries(2));
        let err = Archive::open_with_options(Cursor::new(bytes), options).unwrap_err();
        assert!(matches!(err, Error::ResourceLimitExceeded(_)));
    }

    #[test]
    fn test_directory_size_limit() {
        let bytes = build(&[("a", b"")]);
        let options = ReadOptions::new().limits(ResourceLimits::new().max_directory_bytes(8));
        let err = Archive::open_with_options(Cursor::new(bytes), options).unwrap_err();
        assert!(matches!(err, Error::ResourceLimitExceeded(_)));
    }

    #[test]
    fn test_into_inner_returns_medium() {
        let bytes = build(&[("a", b"1")]);
        let archive = Archive::open(Cursor::new(bytes.clone())).unwrap();
        assert_eq!(archive.into_inner().into_inner(), bytes);
    }
}
