//! # mparc
//!
//! A pure-Rust library for reading and writing MPARC archives.
//!
//! An MPARC archive is a single byte container holding any number of named
//! entries. Each entry's payload is compressed with a pluggable method and
//! protected by a CRC-32; the directory describing all entries is written
//! after the payloads, and a fixed-size trailer at the very end locates and
//! checksums the directory:
//!
//! ```text
//! [payload 0][payload 1]...[payload n-1][directory][trailer]
//! ```
//!
//! ## Quick Start
//!
//! ### Creating an Archive
//!
//! ```rust
//! use mparc::{Result, Writer};
//! use mparc::codec::method;
//!
//! fn main() -> Result<()> {
//!     let mut writer = Writer::new(Vec::new());
//!     writer.add_bytes("hello.txt", b"Hello, World!", method::STORE)?;
//!     writer.add_bytes("docs/readme.md", b"# Readme", method::STORE)?;
//!
//!     let (result, bytes) = writer.finish()?;
//!     println!(
//!         "Wrote {} entries into {} bytes",
//!         result.entries_written,
//!         bytes.len()
//!     );
//!     Ok(())
//! }
//! ```
//!
//! ### Reading an Archive
//!
//! ```rust
//! use mparc::{Archive, Result, Writer};
//! use mparc::codec::method;
//! use std::io::Cursor;
//!
//! fn main() -> Result<()> {
//! #   let mut writer = Writer::new(Vec::new());
//! #   writer.add_bytes("hello.txt", b"Hello, World!", method::STORE)?;
//! #   let (_, bytes) = writer.finish()?;
//!     let mut archive = Archive::open(Cursor::new(bytes))?;
//!
//!     for entry in archive.entries() {
//!         println!("{}: {} bytes", entry.name, entry.uncompressed_size);
//!     }
//!
//!     let data = archive.extract("hello.txt")?;
//!     assert_eq!(data, b"Hello, World!");
//!     Ok(())
//! }
//! ```
//!
//! ## Compression Methods
//!
//! | Method | Id | Feature |
//! |--------|----|---------|
//! | Store | 0 | always available |
//! | Deflate | 1 | `deflate` (default) |
//! | BZip2 | 2 | `bzip2` |
//! | Zstandard | 3 | `zstd` |
//!
//! Further methods can be plugged in through [`CodecRegistry`]; see the
//! [`codec`] module.
//!
//! ## Feature Flags
//!
//! - `deflate` (default): Deflate via `flate2`
//! - `bzip2`: BZip2 via `bzip2`
//! - `zstd`: Zstandard via `zstd`
//! - `parallel`: compress entries on a `rayon` thread pool with
//!   [`prepare_parallel`]
//!
//! ## Safety
//!
//! Archives are untrusted input. Opening validates the trailer, the
//! directory checksum and the payload layout before any entry is exposed,
//! and [`ResourceLimits`] bound how much a hostile archive can make the
//! reader allocate. Every extracted payload is checked against its recorded
//! size and CRC-32 before it is returned.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

/// Default buffer size for streaming operations (8 KiB).
pub(crate) const READ_BUFFER_SIZE: usize = 8192;

pub mod checksum;
pub mod codec;
pub mod entry_name;
pub mod error;
pub mod format;
pub mod read;
pub mod write;

pub use entry_name::EntryName;
pub use error::{Error, Result};

// Re-export reading API at crate root for convenience
pub use read::{
    Archive, ArchiveInfo, ExtractResult, Query, ReadOptions, ResourceLimits, VerifyResult,
};

// Re-export writing API at crate root for convenience
pub use write::{
    PreparedEntry, WriteOptions, WriteResult, Writer, WriterState, prepare_parallel,
};

pub use codec::{CodecRegistry, MethodId};
pub use format::directory::{Directory, EntryFlags, EntryRecord};
