//! Positioned byte access over a medium.
//!
//! [`ByteCursor`] is the read half: every read either returns exactly the
//! bytes requested or fails with [`Error::TruncatedInput`], so callers never
//! see short reads. [`ByteSink`] is the write half: it appends, and tracks the
//! container offset of the next byte so the writer can record payload
//! locations.

use std::io::{self, Read, Seek, SeekFrom, Write};

use crate::{Error, Result};

/// Bounds-checked little-endian reader over a seekable medium.
#[derive(Debug)]
pub struct ByteCursor<R> {
    inner: R,
    len: u64,
}

impl<R: Read + Seek> ByteCursor<R> {
    /// Wraps a medium, measuring its length and rewinding to the start.
    pub fn new(mut inner: R) -> Result<Self> {
        let len = inner.seek(SeekFrom::End(0))?;
        inner.seek(SeekFrom::Start(0))?;
        Ok(Self { inner, len })
    }

    /// Returns the length of the medium as measured at construction.
    pub fn len(&self) -> u64 {
        self.len
    }

    /// Returns `true` if the medium is empty.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the current offset.
    pub fn position(&mut self) -> Result<u64> {
        Ok(self.inner.stream_position()?)
    }

    /// Returns the number of bytes between the current offset and the end.
    pub fn remaining(&mut self) -> Result<u64> {
        let pos = self.position()?;
        Ok(self.len.saturating_sub(pos))
    }

    /// Moves to an absolute offset.
    ///
    /// Seeking to exactly the end is allowed; seeking beyond it fails with
    /// [`Error::TruncatedInput`] naming the requested offset and the medium
    /// length.
    pub fn seek(&mut self, pos: u64) -> Result<()> {
        if pos > self.len {
            return Err(Error::TruncatedInput {
                offset: pos,
                needed: 0,
                available: self.len,
            });
        }
        self.inner.seek(SeekFrom::Start(pos))?;
        Ok(())
    }

    /// Reads exactly `n` bytes from the current offset.
    pub fn read(&mut self, n: usize) -> Result<Vec<u8>> {
        let offset = self.position()?;
        self.ensure_available(offset, n as u64)?;
        let mut buf = vec![0u8; n];
        self.fill(offset, &mut buf)?;
        Ok(buf)
    }

    /// Reads exactly `n` bytes starting at `offset`.
    pub fn read_at(&mut self, offset: u64, n: usize) -> Result<Vec<u8>> {
        self.ensure_available(offset, n as u64)?;
        self.inner.seek(SeekFrom::Start(offset))?;
        let mut buf = vec![0u8; n];
        self.fill(offset, &mut buf)?;
        Ok(buf)
    }

    /// Reads a fixed-size array from the current offset.
    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let offset = self.position()?;
        self.ensure_available(offset, N as u64)?;
        let mut buf = [0u8; N];
        self.fill(offset, &mut buf)?;
        Ok(buf)
    }

    /// Reads a single byte.
    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read_array::<1>()?[0])
    }

    /// Reads a little-endian `u16`.
    pub fn read_u16(&mut self) -> Result<u16> {
        Ok(u16::from_le_bytes(self.read_array()?))
    }

    /// Reads a little-endian `u32`.
    pub fn read_u32(&mut self) -> Result<u32> {
        Ok(u32::from_le_bytes(self.read_array()?))
    }

    /// Reads a little-endian `u64`.
    pub fn read_u64(&mut self) -> Result<u64> {
        Ok(u64::from_le_bytes(self.read_array()?))
    }

    /// Returns a streaming view of `len` bytes starting at `offset`.
    ///
    /// The range is bounds-checked up front; the returned reader yields at
    /// most `len` bytes.
    pub fn take_at(&mut self, offset: u64, len: u64) -> Result<io::Take<&mut R>> {
        self.ensure_available(offset, len)?;
        self.inner.seek(SeekFrom::Start(offset))?;
        Ok((&mut self.inner).take(len))
    }

    /// Consumes the cursor and returns the medium.
    pub fn into_inner(self) -> R {
        self.inner
    }

    fn ensure_available(&self, offset: u64, needed: u64) -> Result<()> {
        let available = self.len.saturating_sub(offset);
        if needed > available {
            return Err(Error::TruncatedInput {
                offset,
                needed,
                available,
            });
        }
        Ok(())
    }

    fn fill(&mut self, offset: u64, buf: &mut [u8]) -> Result<()> {
        // The medium may have shrunk since it was measured.
        self.inner.read_exact(buf).map_err(|e| {
            if e.kind() == io::ErrorKind::UnexpectedEof {
                Error::TruncatedInput {
                    offset,
                    needed: buf.len() as u64,
                    available: self.len.saturating_sub(offset),
                }
            } else {
                Error::Io(e)
            }
        })
    }
}

/// Append-only little-endian writer that tracks its container offset.
///
/// The offset counts bytes written since the sink was created, so the first
/// byte written lands at container offset 0.
#[derive(Debug)]
pub struct ByteSink<W> {
    inner: W,
    position: u64,
}

impl<W: Write> ByteSink<W> {
    /// Wraps a medium positioned at the start of the container.
    pub fn new(inner: W) -> Self {
        Self { inner, position: 0 }
    }

    /// Returns the container offset of the next byte to be written.
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Appends all of `bytes`.
    pub fn write(&mut self, bytes: &[u8]) -> Result<()> {
        self.inner.write_all(bytes)?;
        self.position += bytes.len() as u64;
        Ok(())
    }

    /// Appends a single byte.
    pub fn write_u8(&mut self, value: u8) -> Result<()> {
        self.write(&[value])
    }

    /// Appends a little-endian `u16`.
    pub fn write_u16(&mut self, value: u16) -> Result<()> {
        self.write(&value.to_le_bytes())
    }

    /// Appends a little-endian `u32`.
    pub fn write_u32(&mut self, value: u32) -> Result<()> {
        self.write(&value.to_le_bytes())
    }

    /// Appends a little-endian `u64`.
    pub fn write_u64(&mut self, value: u64) -> Result<()> {
        self.write(&value.to_le_bytes())
    }

    /// Flushes the medium.
    pub fn flush(&mut self) -> Result<()> {
        self.inner.flush()?;
        Ok(())
    }

    /// Returns a reference to the medium.
    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    /// Consumes the sink and returns the medium.
    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write + Seek> ByteSink<W> {
    /// Moves to a container offset.
    ///
    /// The move is made relative to the tracked offset, so a medium that was
    /// not at position 0 when the sink was created is still addressed
    /// consistently.
    pub fn seek(&mut self, pos: u64) -> Result<()> {
        let delta = i128::from(pos) - i128::from(self.position);
        let delta = i64::try_from(delta).map_err(|_| {
            Error::Io(io::Error::new(
                io::ErrorKind::InvalidInput,
                "seek distance out of range",
            ))
        })?;
        self.inner.seek(SeekFrom::Current(delta))?;
        self.position = pos;
        Ok(())
    }
}

impl<W: Write> Write for ByteSink<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.position += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}
