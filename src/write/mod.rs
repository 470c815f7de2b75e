//! Archive writing API.
//!
//! A [`Writer`] appends entry payloads to a byte sink as they are added,
//! then writes the directory and the trailer when the archive is finalized.
//! Nothing is ever rewritten in place, so any `Write` sink works, including
//! pipes and sockets.
//!
//! # Example
//!
//! ```rust
//! use mparc::{Archive, Writer};
//! use mparc::codec::method;
//! use std::io::Cursor;
//!
//! let mut writer = Writer::new(Vec::new());
//! writer.add_bytes("hello.txt", b"Hello, World!", method::STORE)?;
//! writer.add_entry("data/log.txt", &mut Cursor::new(vec![b'x'; 4096]), method::STORE)?;
//! let (result, bytes) = writer.finish()?;
//! assert_eq!(result.entries_written, 2);
//!
//! let mut archive = Archive::open(Cursor::new(bytes))?;
//! assert_eq!(archive.extract("hello.txt")?, b"Hello, World!");
//! # Ok::<(), mparc::Error>(())
//! ```
//!
//! # States
//!
//! A writer starts [`Open`](WriterState::Open) and becomes
//! [`Sealed`](WriterState::Sealed) once [`Writer::finalize`] succeeds. An I/O
//! failure while writing leaves a partial archive behind and moves the
//! writer to [`Failed`](WriterState::Failed); every later operation then
//! fails with [`Error::WriterPoisoned`]. Rejections that happen before any
//! byte is written (duplicate names, invalid names, unknown methods) leave
//! the writer usable.

pub(crate) mod options;
mod prepared;

pub use options::{WriteOptions, WriteResult};
pub use prepared::{PreparedEntry, prepare_parallel};

use std::io::{self, Read, Write};

use crate::checksum::{Checksum, Crc32, Crc32Reader};
use crate::codec::{Compressor, MethodId};
use crate::entry_name::EntryName;
use crate::format::cursor::ByteSink;
use crate::format::directory::{Directory, EntryHandle, EntryMetadata, EntryRecord, Placement};
use crate::format::trailer::Trailer;
use crate::{Error, Result};

/// State of the writer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriterState {
    /// Accepting new entries.
    Open,
    /// Directory and trailer written; the archive is complete.
    Sealed,
    /// A medium failure left the archive incomplete.
    Failed,
}

/// Writes an MPARC archive to a byte sink.
pub struct Writer<W: Write> {
    sink: ByteSink<W>,
    directory: Directory,
    state: WriterState,
    options: WriteOptions,
    total_size: u64,
    compressed_size: u64,
}

impl<W: Write> std::fmt::Debug for Writer<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Writer")
            .field("state", &self.state)
            .field("entries", &self.directory.len())
            .field("position", &self.sink.position())
            .finish_non_exhaustive()
    }
}

impl<W: Write> Writer<W> {
    /// Creates a writer that appends to `sink`.
    ///
    /// The sink must be positioned where the archive should start.
    pub fn new(sink: W) -> Self {
        Self {
            sink: ByteSink::new(sink),
            directory: Directory::new(),
            state: WriterState::Open,
            options: WriteOptions::default(),
            total_size: 0,
            compressed_size: 0,
        }
    }

    /// Replaces the writer options.
    pub fn options(mut self, options: WriteOptions) -> Self {
        self.options = options;
        self
    }

    /// Returns the current state.
    pub fn state(&self) -> WriterState {
        self.state
    }

    /// Returns the directory built so far.
    pub fn directory(&self) -> &Directory {
        &self.directory
    }

    /// Returns the number of entries added.
    pub fn len(&self) -> usize {
        self.directory.len()
    }

    /// Returns `true` if no entries have been added.
    pub fn is_empty(&self) -> bool {
        self.directory.is_empty()
    }

    /// Adds an entry by streaming `reader` through the method's encoder.
    ///
    /// The source is consumed in chunks of [`WriteOptions::buffer_size`]
    /// bytes; the CRC-32 of the uncompressed bytes is accumulated as they
    /// pass, so the payload is never held in memory as a whole.
    ///
    /// # Errors
    ///
    /// - [`Error::ArchiveSealed`] / [`Error::WriterPoisoned`] if the writer
    ///   is no longer open
    /// - [`Error::InvalidEntryName`], [`Error::DuplicateName`] or
    ///   [`Error::UnsupportedMethod`] before anything is written; the writer
    ///   stays usable
    /// - [`Error::Io`] if the source or the sink fails; the writer is then
    ///   poisoned
    pub fn add_entry(
        &mut self,
        name: impl AsRef<str>,
        reader: &mut dyn Read,
        method: MethodId,
    ) -> Result<EntryRecord> {
        let name = self.admit(name.as_ref(), method)?;
        let handle = self
            .directory
            .add_entry(name, EntryMetadata { method, ..Default::default() })?;

        let offset = self.sink.position();
        let compressor = self.options.registry.compressor(method)?;
        let streamed = stream_entry(
            compressor,
            &mut self.sink,
            reader,
            self.options.buffer_size,
        );
        let (uncompressed_size, checksum) = match streamed {
            Ok(done) => done,
            Err(e) => return Err(self.poison(e.into())),
        };

        let placement = Placement {
            offset,
            compressed_size: self.sink.position() - offset,
            uncompressed_size,
            checksum,
        };
        self.complete(handle, placement)
    }

    /// Adds an entry from an in-memory buffer.
    pub fn add_bytes(
        &mut self,
        name: impl AsRef<str>,
        data: &[u8],
        method: MethodId,
    ) -> Result<EntryRecord> {
        let mut source = data;
        self.add_entry(name, &mut source, method)
    }

    /// Appends an entry compressed ahead of time with
    /// [`PreparedEntry::prepare`].
    ///
    /// The entry's method must be registered with this writer.
    pub fn append_prepared(&mut self, entry: PreparedEntry) -> Result<EntryRecord> {
        let name = self.admit(entry.name().as_str(), entry.method())?;
        let handle = self.directory.add_entry(
            name,
            EntryMetadata {
                method: entry.method(),
                ..Default::default()
            },
        )?;

        let offset = self.sink.position();
        if let Err(e) = self.sink.write(entry.payload()) {
            return Err(self.poison(e));
        }

        let placement = Placement {
            offset,
            compressed_size: entry.compressed_size(),
            uncompressed_size: entry.uncompressed_size(),
            checksum: entry.checksum(),
        };
        self.complete(handle, placement)
    }

    /// Writes the directory and the trailer, sealing the archive.
    ///
    /// # Errors
    ///
    /// - [`Error::AlreadySealed`] if called a second time
    /// - [`Error::WriterPoisoned`] if an earlier write failed
    /// - [`Error::Io`] if the sink fails; the writer is then poisoned
    pub fn finalize(&mut self) -> Result<WriteResult> {
        match self.state {
            WriterState::Open => {}
            WriterState::Sealed => return Err(Error::AlreadySealed),
            WriterState::Failed => return Err(Error::WriterPoisoned),
        }

        let directory = self.directory.serialize()?;
        let directory_offset = self.sink.position();
        let trailer = Trailer::new(
            self.directory.len() as u32,
            directory_offset,
            directory.len() as u64,
            Crc32::compute(&directory),
        );

        if let Err(e) = self.write_tail(&directory, &trailer) {
            return Err(self.poison(e));
        }

        self.state = WriterState::Sealed;
        let result = WriteResult {
            entries_written: self.directory.len(),
            total_size: self.total_size,
            compressed_size: self.compressed_size,
            directory_size: directory.len() as u64,
            archive_size: self.sink.position(),
        };
        log::debug!(
            "sealed archive: {} entries, directory {} bytes at {:#x}, {} bytes total",
            result.entries_written,
            result.directory_size,
            directory_offset,
            result.archive_size
        );
        Ok(result)
    }

    /// Finalizes the archive and returns the sink.
    pub fn finish(mut self) -> Result<(WriteResult, W)> {
        let result = self.finalize()?;
        Ok((result, self.sink.into_inner()))
    }

    /// Returns the sink without finalizing.
    ///
    /// Unless the writer is sealed, the sink then holds an incomplete
    /// archive that readers reject.
    pub fn into_inner(self) -> W {
        self.sink.into_inner()
    }

    /// Runs every check that must pass before bytes are written for a new
    /// entry, and returns the name to store.
    fn admit(&self, name: &str, method: MethodId) -> Result<EntryName> {
        match self.state {
            WriterState::Open => {}
            WriterState::Sealed => return Err(Error::ArchiveSealed),
            WriterState::Failed => return Err(Error::WriterPoisoned),
        }

        let mut name = EntryName::new(name)?;
        if self.options.strip_directories {
            name = name.basename();
        }

        if self.directory.contains(name.as_str()) {
            return Err(Error::DuplicateName {
                name: name.into_string(),
            });
        }

        if !self.options.registry.contains(method) {
            return Err(Error::UnsupportedMethod {
                method_id: method,
                entry_name: Some(name.into_string()),
            });
        }

        if self.directory.len() >= u32::MAX as usize {
            return Err(Error::ResourceLimitExceeded(format!(
                "an archive holds at most {} entries",
                u32::MAX
            )));
        }

        Ok(name)
    }

    fn write_tail(&mut self, directory: &[u8], trailer: &Trailer) -> Result<()> {
        self.sink.write(directory)?;
        self.sink.write(&trailer.encode())?;
        self.sink.flush()
    }

    fn complete(&mut self, handle: EntryHandle, placement: Placement) -> Result<EntryRecord> {
        self.total_size += placement.uncompressed_size;
        self.compressed_size += placement.compressed_size;
        let record = self.directory.patch(handle, placement)?;
        log::debug!(
            "added entry '{}': {} -> {} bytes, method {} at {:#x}",
            record.name,
            record.uncompressed_size,
            record.compressed_size,
            record.method,
            record.offset
        );
        Ok(record.clone())
    }

    fn poison(&mut self, err: Error) -> Error {
        if matches!(err, Error::Io(_)) {
            log::warn!(
                "writer poisoned after {} entries: {}",
                self.directory.len(),
                err
            );
            self.state = WriterState::Failed;
        }
        err
    }
}

/// Streams `reader` through a fresh encoder into `sink`, returning the
/// uncompressed length and its CRC-32.
fn stream_entry(
    compressor: &dyn Compressor,
    sink: &mut dyn Write,
    reader: &mut dyn Read,
    buffer_size: usize,
) -> io::Result<(u64, u32)> {
    let mut source = Crc32Reader::new(reader);
    let mut encoder = compressor.encoder(sink)?;
    let mut buffer = vec![0u8; buffer_size];
    loop {
        let n = match source.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        encoder.write_all(&buffer[..n])?;
    }
    encoder.finish()?;
    Ok((source.bytes_read(), source.crc()))
}
