//! Deflate codec implementation.
//!
//! Payloads are raw deflate streams (RFC 1951) with no zlib or gzip framing.

use std::io::{self, Read, Write};

use flate2::Compression;
use flate2::read::DeflateDecoder as FlateDecoder;
use flate2::write::DeflateEncoder as FlateEncoder;

use super::{Compressor, Decompressor, Encoder};

/// Deflate method with a fixed compression level.
#[derive(Debug, Clone, Copy)]
pub struct Deflate {
    level: u32,
}

impl Default for Deflate {
    fn default() -> Self {
        Self { level: 6 }
    }
}

impl Deflate {
    /// Creates a deflate method with the given compression level.
    ///
    /// Levels above 9 are clamped to 9.
    pub fn with_level(level: u32) -> Self {
        Self {
            level: level.min(9),
        }
    }

    /// Returns the compression level.
    pub fn level(&self) -> u32 {
        self.level
    }
}

/// Deflate encoder.
pub struct DeflateEncoder<W: Write> {
    inner: FlateEncoder<W>,
}

impl<W: Write> std::fmt::Debug for DeflateEncoder<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeflateEncoder").finish_non_exhaustive()
    }
}

impl<W: Write> DeflateEncoder<W> {
    /// Creates a new Deflate encoder writing to `output`.
    pub fn new(output: W, level: u32) -> Self {
        Self {
            inner: FlateEncoder::new(output, Compression::new(level)),
        }
    }
}

impl<W: Write> Write for DeflateEncoder<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

impl<W: Write> Encoder for DeflateEncoder<W> {
    fn finish(self: Box<Self>) -> io::Result<()> {
        self.inner.finish()?;
        Ok(())
    }
}

impl Compressor for Deflate {
    fn encoder<'a>(&self, sink: &'a mut dyn Write) -> io::Result<Box<dyn Encoder + 'a>> {
        Ok(Box::new(DeflateEncoder::new(sink, self.level)))
    }
}

impl Decompressor for Deflate {
    fn decoder<'a>(&self, source: &'a mut dyn Read) -> io::Result<Box<dyn Read + 'a>> {
        Ok(Box::new(FlateDecoder::new(source)))
    }
}
