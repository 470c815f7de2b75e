//! Error types for MPARC archive operations.
//!
//! This module provides the [`Error`] enum which represents all possible
//! failure modes when reading or writing MPARC containers, along with a
//! convenient [`Result<T>`] type alias.
//!
//! # Error Categories
//!
//! | Category | Variants | Effect |
//! |----------|----------|--------|
//! | Medium | [`Io`][Error::Io] | Surfaced as-is, never retried |
//! | Structure | [`TruncatedInput`][Error::TruncatedInput], [`MalformedDirectory`][Error::MalformedDirectory], [`NotAnArchive`][Error::NotAnArchive], [`UnsupportedVersion`][Error::UnsupportedVersion], [`CorruptDirectory`][Error::CorruptDirectory], [`CorruptTrailer`][Error::CorruptTrailer], [`UnsupportedFlags`][Error::UnsupportedFlags] | The open attempt is rejected wholesale |
//! | Writer | [`DuplicateName`][Error::DuplicateName], [`ArchiveSealed`][Error::ArchiveSealed], [`AlreadySealed`][Error::AlreadySealed], [`WriterPoisoned`][Error::WriterPoisoned] | Misuse of, or medium failure in, one writer |
//! | Entry | [`UnsupportedMethod`][Error::UnsupportedMethod], [`CorruptPayload`][Error::CorruptPayload], [`ChecksumMismatch`][Error::ChecksumMismatch], [`EntryNotFound`][Error::EntryNotFound] | One extraction fails, the rest of the archive stays usable |
//!
//! # Example
//!
//! ```rust
//! use mparc::{Archive, Error};
//! use std::io::Cursor;
//!
//! fn read_one(bytes: Vec<u8>, name: &str) -> mparc::Result<Option<Vec<u8>>> {
//!     let mut archive = Archive::open(Cursor::new(bytes))?;
//!     match archive.extract(name) {
//!         Ok(data) => Ok(Some(data)),
//!         // A damaged entry does not invalidate its neighbours.
//!         Err(e) if e.is_entry_error() => {
//!             eprintln!("skipping {}: {}", name, e);
//!             Ok(None)
//!         }
//!         Err(e) => Err(e),
//!     }
//! }
//! ```

use std::io;

/// Helper struct for formatting ChecksumMismatch error messages.
struct ChecksumMismatchDisplay<'a> {
    entry_name: &'a str,
    offset: u64,
    expected: u32,
    actual: u32,
}

impl std::fmt::Display for ChecksumMismatchDisplay<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Checksum mismatch for entry '{}' (payload at {:#x}): expected {:#010x}, got {:#010x}",
            self.entry_name, self.offset, self.expected, self.actual
        )
    }
}

/// Helper struct for formatting errors that may name an entry.
struct EntryContext<'a>(Option<&'a str>);

impl std::fmt::Display for EntryContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.0 {
            Some(name) => write!(f, " for entry '{}'", name),
            None => Ok(()),
        }
    }
}

/// The main error type for MPARC archive operations.
///
/// Each variant carries the context available at the point of failure
/// (entry name, byte offset, method id) so that callers can diagnose a
/// problem without re-reading the archive.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The underlying byte medium failed.
    ///
    /// The core never retries; retry policy belongs to the caller.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A read requested more bytes than remain in the medium.
    #[error("Truncated input at offset {offset:#x}: needed {needed} bytes, {available} available")]
    TruncatedInput {
        /// Offset at which the read started.
        offset: u64,
        /// Number of bytes requested.
        needed: u64,
        /// Number of bytes actually available.
        available: u64,
    },

    /// The input does not carry an MPARC trailer.
    #[error("Not an MPARC archive: {0}")]
    NotAnArchive(String),

    /// The trailer announces a format version this build does not read.
    #[error("Unsupported archive version {version}")]
    UnsupportedVersion {
        /// The version found in the trailer.
        version: u16,
    },

    /// The trailer announces global flags this build does not understand.
    #[error("Unsupported archive flags {flags:#06x}")]
    UnsupportedFlags {
        /// The flag bits found in the trailer.
        flags: u16,
    },

    /// The trailer's own checksum does not match its contents.
    #[error("Corrupt trailer: checksum expected {expected:#010x}, got {actual:#010x}")]
    CorruptTrailer {
        /// Checksum stored in the trailer.
        expected: u32,
        /// Checksum computed over the trailer bytes.
        actual: u32,
    },

    /// The entry directory is structurally inconsistent.
    ///
    /// For parse failures `offset` is relative to the start of the
    /// serialized directory; for payload ranges that break the container
    /// layout it is the payload's container offset.
    #[error("Malformed directory at offset {offset:#x}: {reason}")]
    MalformedDirectory {
        /// Where the inconsistency was found.
        offset: u64,
        /// What was wrong.
        reason: String,
    },

    /// The directory bytes do not match the checksum recorded in the trailer.
    #[error("Corrupt directory: checksum expected {expected:#010x}, got {actual:#010x}")]
    CorruptDirectory {
        /// Checksum recorded in the trailer.
        expected: u32,
        /// Checksum computed over the directory bytes.
        actual: u32,
    },

    /// An entry with this name already exists in the archive.
    #[error("Duplicate entry name '{name}'")]
    DuplicateName {
        /// The rejected name.
        name: String,
    },

    /// An entry was added after the archive was finalized.
    #[error("Archive is sealed; no further entries can be added")]
    ArchiveSealed,

    /// `finalize` was called on an archive that is already sealed.
    #[error("Archive has already been finalized")]
    AlreadySealed,

    /// A previous medium failure left the writer with a partial archive.
    #[error("Writer is poisoned by an earlier I/O failure; the archive is incomplete")]
    WriterPoisoned,

    /// No codec is registered for this method id.
    #[error("Unsupported method {method_id}{}", EntryContext(entry_name.as_deref()))]
    UnsupportedMethod {
        /// The method id that is not registered.
        method_id: u16,
        /// Entry whose payload uses the method, if known.
        entry_name: Option<String>,
    },

    /// A payload did not decompress to its recorded size, or the decoder
    /// rejected it.
    #[error("Corrupt payload{}: {reason}", EntryContext(entry_name.as_deref()))]
    CorruptPayload {
        /// Entry whose payload is corrupt, if known.
        entry_name: Option<String>,
        /// What went wrong.
        reason: String,
    },

    /// A decompressed payload does not match its recorded checksum.
    #[error("{}", ChecksumMismatchDisplay { entry_name, offset: *offset, expected: *expected, actual: *actual })]
    ChecksumMismatch {
        /// The entry that failed verification.
        entry_name: String,
        /// Payload offset within the container.
        offset: u64,
        /// Checksum recorded in the directory.
        expected: u32,
        /// Checksum of the decompressed bytes.
        actual: u32,
    },

    /// No entry with this name exists.
    #[error("Entry not found: '{name}'")]
    EntryNotFound {
        /// The requested name.
        name: String,
    },

    /// An entry name violates the naming policy.
    ///
    /// Names must be non-empty UTF-8 without NUL bytes, use `/` as the only
    /// separator, and contain no empty, `.` or `..` segments.
    #[error("Invalid entry name: {0}")]
    InvalidEntryName(String),

    /// A codec is already registered under this method id.
    #[error("Method {method_id} is already registered")]
    MethodAlreadyRegistered {
        /// The contested method id.
        method_id: u16,
    },

    /// A configured resource limit was exceeded.
    #[error("Resource limit exceeded: {0}")]
    ResourceLimitExceeded(String),
}

impl Error {
    /// Returns `true` if this error rejects an archive at open time.
    ///
    /// Structural failures are always fatal to the open attempt; there is
    /// no partial parsing.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            Error::TruncatedInput { .. }
                | Error::MalformedDirectory { .. }
                | Error::NotAnArchive(_)
                | Error::UnsupportedVersion { .. }
                | Error::UnsupportedFlags { .. }
                | Error::CorruptDirectory { .. }
                | Error::CorruptTrailer { .. }
        )
    }

    /// Returns `true` if this error is fatal to a writer instance.
    pub fn is_writer_error(&self) -> bool {
        matches!(
            self,
            Error::DuplicateName { .. }
                | Error::ArchiveSealed
                | Error::AlreadySealed
                | Error::WriterPoisoned
        )
    }

    /// Returns `true` if this error affects a single extraction only.
    ///
    /// A caller may skip the entry and keep reading the others.
    pub fn is_entry_error(&self) -> bool {
        matches!(
            self,
            Error::UnsupportedMethod { .. }
                | Error::CorruptPayload { .. }
                | Error::ChecksumMismatch { .. }
                | Error::EntryNotFound { .. }
        )
    }

    /// Returns `true` if this is a data corruption error.
    pub fn is_corruption(&self) -> bool {
        matches!(
            self,
            Error::ChecksumMismatch { .. }
                | Error::CorruptPayload { .. }
                | Error::CorruptDirectory { .. }
                | Error::CorruptTrailer { .. }
                | Error::MalformedDirectory { .. }
        )
    }

    /// Returns the entry name associated with this error, if any.
    pub fn entry_name(&self) -> Option<&str> {
        match self {
            Error::DuplicateName { name } | Error::EntryNotFound { name } => Some(name),
            Error::ChecksumMismatch { entry_name, .. } => Some(entry_name),
            Error::UnsupportedMethod { entry_name, .. }
            | Error::CorruptPayload { entry_name, .. } => entry_name.as_deref(),
            _ => None,
        }
    }

    /// Returns the byte offset associated with this error, if any.
    pub fn offset(&self) -> Option<u64> {
        match self {
            Error::TruncatedInput { offset, .. }
            | Error::MalformedDirectory { offset, .. }
            | Error::ChecksumMismatch { offset, .. } => Some(*offset),
            _ => None,
        }
    }

    /// Returns the method id if this is a method-related error.
    pub fn method_id(&self) -> Option<u16> {
        match self {
            Error::UnsupportedMethod { method_id, .. }
            | Error::MethodAlreadyRegistered { method_id } => Some(*method_id),
            _ => None,
        }
    }

    /// Creates a MalformedDirectory error.
    pub fn malformed(offset: u64, reason: impl Into<String>) -> Self {
        Error::MalformedDirectory {
            offset,
            reason: reason.into(),
        }
    }

    /// Creates an UnsupportedMethod error without entry context.
    pub fn unsupported_method(method_id: u16) -> Self {
        Error::UnsupportedMethod {
            method_id,
            entry_name: None,
        }
    }

    /// Creates a CorruptPayload error.
    pub fn corrupt_payload(entry_name: Option<String>, reason: impl Into<String>) -> Self {
        Error::CorruptPayload {
            entry_name,
            reason: reason.into(),
        }
    }

    /// Attaches an entry name to per-entry errors that were raised without one.
    pub(crate) fn with_entry(self, name: &str) -> Self {
        match self {
            Error::UnsupportedMethod {
                method_id,
                entry_name: None,
            } => Error::UnsupportedMethod {
                method_id,
                entry_name: Some(name.to_string()),
            },
            Error::CorruptPayload {
                entry_name: None,
                reason,
            } => Error::CorruptPayload {
                entry_name: Some(name.to_string()),
                reason,
            },
            other => other,
        }
    }
}

/// A specialized Result type for MPARC operations.
pub type Result<T> = std::result::Result<T, Error>;
