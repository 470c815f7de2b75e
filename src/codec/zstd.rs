//! Zstandard (ZSTD) compression codec.
//!
//! ZSTD gives good compression ratios with fast decompression, which suits
//! archives that are written once and read often.

use std::io::{self, Read, Write};

use zstd::stream::{Decoder as ZstdStreamDecoder, Encoder as ZstdEncoderInner};

use super::{Compressor, Decompressor, Encoder};

/// ZSTD method with a fixed compression level.
#[derive(Debug, Clone, Copy)]
pub struct Zstd {
    /// Compression level (1-22, default 3).
    level: i32,
}

impl Default for Zstd {
    fn default() -> Self {
        Self { level: 3 }
    }
}

impl Zstd {
    /// Creates a ZSTD method with the given level, clamped to 1-22.
    pub fn with_level(level: i32) -> Self {
        Self {
            level: level.clamp(1, 22),
        }
    }

    /// Returns the compression level.
    pub fn level(&self) -> i32 {
        self.level
    }
}

/// ZSTD encoder.
pub struct ZstdEncoder<W: Write> {
    inner: ZstdEncoderInner<'static, W>,
}

impl<W: Write> std::fmt::Debug for ZstdEncoder<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ZstdEncoder").finish_non_exhaustive()
    }
}

impl<W: Write> ZstdEncoder<W> {
    /// Creates a new ZSTD encoder writing to `output`.
    pub fn new(output: W, level: i32) -> io::Result<Self> {
        let encoder = ZstdEncoderInner::new(output, level)?;
        Ok(Self { inner: encoder })
    }
}

impl<W: Write> Write for ZstdEncoder<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

impl<W: Write> Encoder for ZstdEncoder<W> {
    fn finish(self: Box<Self>) -> io::Result<()> {
        self.inner.finish()?;
        Ok(())
    }
}

impl Compressor for Zstd {
    fn encoder<'a>(&self, sink: &'a mut dyn Write) -> io::Result<Box<dyn Encoder + 'a>> {
        Ok(Box::new(ZstdEncoder::new(sink, self.level)?))
    }
}

impl Decompressor for Zstd {
    fn decoder<'a>(&self, source: &'a mut dyn Read) -> io::Result<Box<dyn Read + 'a>> {
        Ok(Box::new(ZstdStreamDecoder::new(source)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zstd_roundtrip() {
        let data = b"Hello, World! This is a test of ZSTD compression.".repeat(10);
        let codec = Zstd::default();

        let mut compressed = Vec::new();
        {
            let mut encoder = codec.encoder(&mut compressed).unwrap();
            encoder.write_all(&data).unwrap();
            encoder.finish().unwrap();
        }
        assert!(compressed.len() < data.len());

        let mut source = &compressed[..];
        let mut out = Vec::new();
        codec
            .decoder(&mut source)
            .unwrap()
            .read_to_end(&mut out)
            .unwrap();
        assert_eq!(out, data);
    }

    #[test]
    fn test_zstd_levels() {
        assert_eq!(Zstd::default().level(), 3);
        assert_eq!(Zstd::with_level(0).level(), 1);
        assert_eq!(Zstd::with_level(30).level(), 22);
    }
}
