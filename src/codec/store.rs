//! Store codec (no compression).

use std::io::{self, Read, Write};

use super::{Compressor, Decompressor, Encoder};

/// The identity method: payloads are stored exactly as given.
#[derive(Debug, Clone, Copy, Default)]
pub struct Store;

/// An encoder that passes data through unchanged.
pub struct StoreEncoder<W> {
    inner: W,
}

impl<W: Write> Write for StoreEncoder<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

impl<W: Write> Encoder for StoreEncoder<W> {
    fn finish(mut self: Box<Self>) -> io::Result<()> {
        self.inner.flush()
    }
}

impl Compressor for Store {
    fn encoder<'a>(&self, sink: &'a mut dyn Write) -> io::Result<Box<dyn Encoder + 'a>> {
        Ok(Box::new(StoreEncoder { inner: sink }))
    }
}

impl Decompressor for Store {
    fn decoder<'a>(&self, source: &'a mut dyn Read) -> io::Result<Box<dyn Read + 'a>> {
        Ok(Box::new(source))
    }
}
