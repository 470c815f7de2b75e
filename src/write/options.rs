//! Options and results for archive writing.

use crate::READ_BUFFER_SIZE;
use crate::codec::CodecRegistry;

/// Options for creating archives.
#[derive(Debug, Clone)]
pub struct WriteOptions {
    /// Codecs available to the writer.
    pub registry: CodecRegistry,
    /// Size of the chunks read from entry sources, in bytes.
    pub buffer_size: usize,
    /// Store only the last segment of each entry name.
    pub strip_directories: bool,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            registry: CodecRegistry::default(),
            buffer_size: READ_BUFFER_SIZE,
            strip_directories: false,
        }
    }
}

impl WriteOptions {
    /// Creates new write options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the codec registry.
    pub fn registry(mut self, registry: CodecRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Sets the streaming chunk size. Zero is raised to one byte.
    pub fn buffer_size(mut self, size: usize) -> Self {
        self.buffer_size = size.max(1);
        self
    }

    /// Sets whether directory segments are stripped from entry names.
    ///
    /// With this enabled, `docs/guide/intro.md` is stored as `intro.md`.
    /// Two inputs that share a last segment then collide and the second is
    /// rejected as a duplicate.
    ///
    /// # Example
    ///
    /// ```rust
    /// use mparc::{Archive, Writer, WriteOptions};
    /// use mparc::codec::method;
    /// use std::io::Cursor;
    ///
    /// let mut writer = Writer::new(Vec::new())
    ///     .options(WriteOptions::new().strip_directories(true));
    /// writer.add_bytes("nested/dir/file.txt", b"data", method::STORE)?;
    /// let (_, bytes) = writer.finish()?;
    ///
    /// let archive = Archive::open(Cursor::new(bytes))?;
    /// assert!(archive.contains("file.txt"));
    /// # Ok::<(), mparc::Error>(())
    /// ```
    pub fn strip_directories(mut self, strip: bool) -> Self {
        self.strip_directories = strip;
        self
    }
}

/// Result of finalizing an archive.
#[must_use = "write results should be checked to ensure archive was created successfully"]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteResult {
    /// Number of entries written.
    pub entries_written: usize,
    /// Total uncompressed bytes.
    pub total_size: u64,
    /// Total stored payload bytes.
    pub compressed_size: u64,
    /// Size of the serialized directory.
    pub directory_size: u64,
    /// Size of the whole container, trailer included.
    pub archive_size: u64,
}

impl WriteResult {
    /// Returns the compression ratio (compressed / uncompressed).
    pub fn compression_ratio(&self) -> f64 {
        if self.total_size == 0 {
            1.0
        } else {
            self.compressed_size as f64 / self.total_size as f64
        }
    }

    /// Returns the fraction of payload bytes saved by compression.
    pub fn space_savings(&self) -> f64 {
        if self.total_size == 0 {
            0.0
        } else {
            1.0 - self.compression_ratio()
        }
    }
}
