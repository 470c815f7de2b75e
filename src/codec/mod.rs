//! Compression codec infrastructure.
//!
//! Compression is a pluggable capability: every entry records a small
//! integer [method id](method), and a [`CodecRegistry`] maps each id to a
//! [`Compressor`] and a [`Decompressor`]. The registry is an explicit value
//! handed to readers and writers through their options; there is no global
//! codec table.
//!
//! Method [`STORE`](method::STORE) is built into every registry and can never
//! be replaced. The other built-in methods are available behind cargo
//! features:
//!
//! | Id | Method | Feature |
//! |----|--------|---------|
//! | 0 | store (identity) | always |
//! | 1 | deflate | `deflate` (default) |
//! | 2 | bzip2 | `bzip2` |
//! | 3 | zstd | `zstd` |
//!
//! # Custom codecs
//!
//! ```rust
//! use mparc::codec::{CodecRegistry, Compressor, Decompressor, Encoder};
//! use std::io::{self, Read, Write};
//!
//! /// XORs every byte with a fixed key.
//! struct Xor(u8);
//!
//! struct XorEncoder<'a> {
//!     sink: &'a mut dyn Write,
//!     key: u8,
//! }
//!
//! impl Write for XorEncoder<'_> {
//!     fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
//!         let mixed: Vec<u8> = buf.iter().map(|b| b ^ self.key).collect();
//!         self.sink.write_all(&mixed)?;
//!         Ok(buf.len())
//!     }
//!     fn flush(&mut self) -> io::Result<()> {
//!         self.sink.flush()
//!     }
//! }
//!
//! impl Encoder for XorEncoder<'_> {
//!     fn finish(self: Box<Self>) -> io::Result<()> {
//!         Ok(())
//!     }
//! }
//!
//! impl Compressor for Xor {
//!     fn encoder<'a>(&self, sink: &'a mut dyn Write) -> io::Result<Box<dyn Encoder + 'a>> {
//!         Ok(Box::new(XorEncoder { sink, key: self.0 }))
//!     }
//! }
//!
//! impl Decompressor for Xor {
//!     fn decoder<'a>(&self, source: &'a mut dyn Read) -> io::Result<Box<dyn Read + 'a>> {
//!         let mut data = Vec::new();
//!         source.read_to_end(&mut data)?;
//!         let plain: Vec<u8> = data.iter().map(|b| b ^ self.0).collect();
//!         Ok(Box::new(io::Cursor::new(plain)))
//!     }
//! }
//!
//! let mut registry = CodecRegistry::new();
//! registry.register_codec(200, Xor(0x5A)).unwrap();
//!
//! let packed = registry.compress(200, b"secret").unwrap();
//! assert_ne!(packed, b"secret");
//! assert_eq!(registry.decompress(200, &packed, 6).unwrap(), b"secret");
//! ```

mod store;

#[cfg(feature = "deflate")]
pub mod deflate;

#[cfg(feature = "bzip2")]
pub mod bzip2;

#[cfg(feature = "zstd")]
pub mod zstd;

use std::collections::BTreeMap;
use std::io::{self, Read, Write};
use std::sync::Arc;

use crate::{Error, Result};

pub use store::Store;

#[cfg(feature = "deflate")]
pub use deflate::{Deflate, DeflateEncoder};

#[cfg(feature = "bzip2")]
pub use self::bzip2::{Bzip2, Bzip2Encoder};

#[cfg(feature = "zstd")]
pub use self::zstd::{Zstd, ZstdEncoder};

/// Numeric identifier of a compression method, as stored in entry records.
pub type MethodId = u16;

/// Upper bound on speculative output preallocation during decompression.
///
/// Sizes come from the directory and may lie; buffers grow past this only
/// as real output arrives.
const MAX_PREALLOC: u64 = 1 << 20;

/// Well-known method ids.
pub mod method {
    use super::MethodId;

    /// Store (no compression).
    pub const STORE: MethodId = 0;
    /// Deflate compression.
    pub const DEFLATE: MethodId = 1;
    /// BZip2 compression.
    pub const BZIP2: MethodId = 2;
    /// Zstandard compression.
    pub const ZSTD: MethodId = 3;

    /// Returns a human-readable name for a method id.
    pub fn name(id: MethodId) -> &'static str {
        match id {
            STORE => "store",
            DEFLATE => "deflate",
            BZIP2 => "bzip2",
            ZSTD => "zstd",
            _ => "custom",
        }
    }
}

/// A push-based encoder: the caller writes uncompressed chunks, then calls
/// [`finish`](Encoder::finish) to flush the compressed tail.
pub trait Encoder: Write {
    /// Finishes encoding and flushes any remaining data.
    fn finish(self: Box<Self>) -> io::Result<()>;
}

/// Compression half of a method.
pub trait Compressor: Send + Sync {
    /// Creates an encoder that writes compressed bytes to `sink`.
    fn encoder<'a>(&self, sink: &'a mut dyn Write) -> io::Result<Box<dyn Encoder + 'a>>;
}

/// Decompression half of a method.
pub trait Decompressor: Send + Sync {
    /// Creates a reader that yields the decompressed form of `source`.
    ///
    /// Malformed input should surface as an [`io::ErrorKind::InvalidData`]
    /// or [`io::ErrorKind::UnexpectedEof`] error from the returned reader.
    ///
    /// Extraction cannot tell a decoder's `UnexpectedEof` apart from one
    /// raised by the medium itself, so a file that shrinks after the archive
    /// was opened reports [`Error::CorruptPayload`] rather than
    /// [`Error::Io`].
    fn decoder<'a>(&self, source: &'a mut dyn Read) -> io::Result<Box<dyn Read + 'a>>;
}

#[derive(Clone)]
struct RegisteredMethod {
    compressor: Arc<dyn Compressor>,
    decompressor: Arc<dyn Decompressor>,
}

/// Table mapping method ids to codec capabilities.
///
/// Cloning is cheap; codecs are shared behind `Arc`.
#[derive(Clone)]
pub struct CodecRegistry {
    methods: BTreeMap<MethodId, RegisteredMethod>,
}

impl std::fmt::Debug for CodecRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CodecRegistry")
            .field("methods", &self.methods.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Default for CodecRegistry {
    /// Creates a registry with store plus every feature-enabled built-in
    /// method.
    fn default() -> Self {
        #[allow(unused_mut)]
        let mut registry = Self::new();
        #[cfg(feature = "deflate")]
        registry.insert(method::DEFLATE, Arc::new(Deflate::default()));
        #[cfg(feature = "bzip2")]
        registry.insert(method::BZIP2, Arc::new(Bzip2::default()));
        #[cfg(feature = "zstd")]
        registry.insert(method::ZSTD, Arc::new(Zstd::default()));
        registry
    }
}

impl CodecRegistry {
    /// Creates a registry holding only the store method.
    pub fn new() -> Self {
        let mut registry = Self {
            methods: BTreeMap::new(),
        };
        registry.insert(method::STORE, Arc::new(Store));
        registry
    }

    fn insert<C: Compressor + Decompressor + 'static>(&mut self, id: MethodId, codec: Arc<C>) {
        self.methods.insert(
            id,
            RegisteredMethod {
                compressor: codec.clone(),
                decompressor: codec,
            },
        );
    }

    /// Registers a method from separate compression and decompression
    /// halves.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MethodAlreadyRegistered`] if the id is taken.
    pub fn register(
        &mut self,
        id: MethodId,
        compressor: impl Compressor + 'static,
        decompressor: impl Decompressor + 'static,
    ) -> Result<()> {
        if self.methods.contains_key(&id) {
            return Err(Error::MethodAlreadyRegistered { method_id: id });
        }
        log::debug!("registering method {} ({})", id, method::name(id));
        self.methods.insert(
            id,
            RegisteredMethod {
                compressor: Arc::new(compressor),
                decompressor: Arc::new(decompressor),
            },
        );
        Ok(())
    }

    /// Registers a value implementing both halves of a method.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MethodAlreadyRegistered`] if the id is taken.
    pub fn register_codec<C: Compressor + Decompressor + 'static>(
        &mut self,
        id: MethodId,
        codec: C,
    ) -> Result<()> {
        if self.methods.contains_key(&id) {
            return Err(Error::MethodAlreadyRegistered { method_id: id });
        }
        log::debug!("registering method {} ({})", id, method::name(id));
        self.insert(id, Arc::new(codec));
        Ok(())
    }

    /// Returns `true` if a codec is registered under this id.
    pub fn contains(&self, id: MethodId) -> bool {
        self.methods.contains_key(&id)
    }

    /// Iterates over registered ids in ascending order.
    pub fn method_ids(&self) -> impl Iterator<Item = MethodId> + '_ {
        self.methods.keys().copied()
    }

    /// Returns the compressor registered under `id`.
    pub fn compressor(&self, id: MethodId) -> Result<&dyn Compressor> {
        self.methods
            .get(&id)
            .map(|m| m.compressor.as_ref())
            .ok_or_else(|| Error::unsupported_method(id))
    }

    /// Returns the decompressor registered under `id`.
    pub fn decompressor(&self, id: MethodId) -> Result<&dyn Decompressor> {
        self.methods
            .get(&id)
            .map(|m| m.decompressor.as_ref())
            .ok_or_else(|| Error::unsupported_method(id))
    }

    /// Compresses a whole buffer.
    pub fn compress(&self, id: MethodId, data: &[u8]) -> Result<Vec<u8>> {
        let compressor = self.compressor(id)?;
        let mut out = Vec::new();
        let mut encoder = compressor.encoder(&mut out)?;
        encoder.write_all(data)?;
        encoder.finish()?;
        Ok(out)
    }

    /// Decompresses a whole buffer that must expand to exactly
    /// `expected_size` bytes.
    ///
    /// At most `expected_size + 1` bytes are ever produced, so a payload that
    /// lies about its size cannot exhaust memory.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedMethod`] for an unregistered id, and
    /// [`Error::CorruptPayload`] if the decoder rejects the input or the
    /// output length differs from `expected_size`.
    pub fn decompress(&self, id: MethodId, data: &[u8], expected_size: u64) -> Result<Vec<u8>> {
        let decompressor = self.decompressor(id)?;
        let mut source = data;
        let mut decoder = decompressor
            .decoder(&mut source)
            .map_err(map_decode_error)?;

        let mut out = Vec::with_capacity(expected_size.min(MAX_PREALLOC) as usize);
        decoder
            .by_ref()
            .take(expected_size.saturating_add(1))
            .read_to_end(&mut out)
            .map_err(map_decode_error)?;

        check_length(out.len() as u64, expected_size)?;
        Ok(out)
    }
}

/// Classifies an I/O error raised by a decoder.
///
/// Errors that describe the data rather than the medium become
/// [`Error::CorruptPayload`].
pub(crate) fn map_decode_error(err: io::Error) -> Error {
    match err.kind() {
        io::ErrorKind::InvalidData | io::ErrorKind::UnexpectedEof | io::ErrorKind::InvalidInput => {
            Error::corrupt_payload(None, err.to_string())
        }
        _ => Error::Io(err),
    }
}

/// Fails with [`Error::CorruptPayload`] unless `produced == expected`.
///
/// `produced` may be at most one byte past `expected`, which is how bounded
/// output reports an oversized payload.
pub(crate) fn check_length(produced: u64, expected: u64) -> Result<()> {
    if produced == expected {
        Ok(())
    } else if produced > expected {
        Err(Error::corrupt_payload(
            None,
            format!("payload expands beyond its recorded size of {} bytes", expected),
        ))
    } else {
        Err(Error::corrupt_payload(
            None,
            format!(
                "payload expands to {} bytes, expected {}",
                produced, expected
            ),
        ))
    }
}
