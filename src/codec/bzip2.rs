//! BZip2 codec implementation.

use std::io::{self, Read, Write};

use bzip2::Compression;
use bzip2::read::BzDecoder;
use bzip2::write::BzEncoder;

use super::{Compressor, Decompressor, Encoder};

/// BZip2 method with a fixed block size level.
#[derive(Debug, Clone, Copy)]
pub struct Bzip2 {
    /// Compression level (1-9, default 9).
    level: u32,
}

impl Default for Bzip2 {
    fn default() -> Self {
        Self { level: 9 }
    }
}

impl Bzip2 {
    /// Creates a bzip2 method with the given level, clamped to 1-9.
    pub fn with_level(level: u32) -> Self {
        Self {
            level: level.clamp(1, 9),
        }
    }

    /// Returns the compression level.
    pub fn level(&self) -> u32 {
        self.level
    }
}

/// BZip2 encoder.
pub struct Bzip2Encoder<W: Write> {
    inner: BzEncoder<W>,
}

impl<W: Write> std::fmt::Debug for Bzip2Encoder<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bzip2Encoder").finish_non_exhaustive()
    }
}

impl<W: Write> Bzip2Encoder<W> {
    /// Creates a new BZip2 encoder writing to `output`.
    pub fn new(output: W, level: u32) -> Self {
        Self {
            inner: BzEncoder::new(output, Compression::new(level)),
        }
    }
}

impl<W: Write> Write for Bzip2Encoder<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

impl<W: Write> Encoder for Bzip2Encoder<W> {
    fn finish(self: Box<Self>) -> io::Result<()> {
        self.inner.finish()?;
        Ok(())
    }
}

impl Compressor for Bzip2 {
    fn encoder<'a>(&self, sink: &'a mut dyn Write) -> io::Result<Box<dyn Encoder + 'a>> {
        Ok(Box::new(Bzip2Encoder::new(sink, self.level)))
    }
}

impl Decompressor for Bzip2 {
    fn decoder<'a>(&self, source: &'a mut dyn Read) -> io::Result<Box<dyn Read + 'a>> {
        Ok(Box::new(BzDecoder::new(source)))
    }
}
