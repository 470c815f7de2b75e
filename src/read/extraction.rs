//! Entry extraction and verification.

use std::io::{self, Read, Seek, Write};

use crate::READ_BUFFER_SIZE;
use crate::checksum::Crc32Writer;
use crate::codec::{check_length, map_decode_error};
use crate::format::directory::EntryRecord;
use crate::read::{Archive, ExtractResult, VerifyResult};
use crate::{Error, Result};

/// Upper bound on speculative preallocation for in-memory extraction.
const MAX_PREALLOC: u64 = 1 << 20;

impl<R: Read + Seek> Archive<R> {
    /// Extracts an entry into memory.
    ///
    /// The payload is decompressed and its CRC-32 verified before it is
    /// returned.
    ///
    /// # Errors
    ///
    /// - [`Error::EntryNotFound`] if no entry has this exact name
    /// - [`Error::UnsupportedMethod`] if the entry's method is not registered
    /// - [`Error::CorruptPayload`] if the payload does not decompress to its
    ///   recorded size
    /// - [`Error::ChecksumMismatch`] if the decompressed bytes fail
    ///   verification
    pub fn extract(&mut self, name: &str) -> Result<Vec<u8>> {
        let index = self.index_of(name)?;
        self.extract_index(index)
    }

    /// Extracts the entry at `index` in directory order.
    pub fn extract_index(&mut self, index: usize) -> Result<Vec<u8>> {
        let record = self.record_at(index)?;
        let mut out = Vec::with_capacity(record.uncompressed_size.min(MAX_PREALLOC) as usize);
        self.extract_record(&record, &mut out)?;
        Ok(out)
    }

    /// Streams an entry into `sink` and returns the number of bytes written.
    ///
    /// Bytes reach the sink as they are decoded; verification completes only
    /// at the end. On error the sink may already hold a partial or corrupt
    /// payload, which the caller must discard.
    pub fn extract_to(&mut self, name: &str, sink: &mut dyn Write) -> Result<u64> {
        let index = self.index_of(name)?;
        let record = self.record_at(index)?;
        self.extract_record(&record, sink)
    }

    /// Extracts every entry in directory order, handing each verified
    /// payload to `on_entry`.
    ///
    /// Per-entry failures are logged, collected in the result and skipped.
    /// Medium failures and errors returned by `on_entry` abort the walk.
    ///
    /// # Example
    ///
    /// ```rust
    /// use mparc::{Archive, Writer};
    /// use mparc::codec::method;
    /// use std::collections::HashMap;
    /// use std::io::Cursor;
    ///
    /// let mut writer = Writer::new(Vec::new());
    /// writer.add_bytes("a", b"alpha", method::STORE)?;
    /// writer.add_bytes("b", b"beta", method::STORE)?;
    /// let (_, bytes) = writer.finish()?;
    ///
    /// let mut archive = Archive::open(Cursor::new(bytes))?;
    /// let mut files = HashMap::new();
    /// let result = archive.extract_all(|entry, data| {
    ///     files.insert(entry.name.to_string(), data.to_vec());
    ///     Ok(())
    /// })?;
    /// assert!(result.is_ok());
    /// assert_eq!(files["b"], b"beta");
    /// # Ok::<(), mparc::Error>(())
    /// ```
    pub fn extract_all<F>(&mut self, mut on_entry: F) -> Result<ExtractResult>
    where
        F: FnMut(&EntryRecord, &[u8]) -> Result<()>,
    {
        let mut result = ExtractResult::default();
        for index in 0..self.len() {
            let record = self.record_at(index)?;
            let mut data =
                Vec::with_capacity(record.uncompressed_size.min(MAX_PREALLOC) as usize);
            match self.extract_record(&record, &mut data) {
                Ok(n) => {
                    on_entry(&record, &data)?;
                    result.entries_extracted += 1;
                    result.bytes_extracted += n;
                }
                Err(e) if is_skippable(&e) => {
                    log::warn!("skipping entry '{}': {}", record.name, e);
                    result.entries_failed += 1;
                    result.failures.push((record.name.to_string(), e));
                }
                Err(e) => return Err(e),
            }
        }
        Ok(result)
    }

    /// Decompresses and verifies every entry without keeping the data.
    ///
    /// Like [`extract_all`](Self::extract_all), per-entry failures are
    /// collected and medium failures abort.
    pub fn verify(&mut self) -> Result<VerifyResult> {
        let mut result = VerifyResult::default();
        for index in 0..self.len() {
            let record = self.record_at(index)?;
            result.entries_tested += 1;
            match self.extract_record(&record, &mut io::sink()) {
                Ok(_) => result.entries_passed += 1,
                Err(e) if is_skippable(&e) => {
                    log::warn!("entry '{}' failed verification: {}", record.name, e);
                    result.entries_failed += 1;
                    result.failures.push((record.name.to_string(), e));
                }
                Err(e) => return Err(e),
            }
        }
        Ok(result)
    }

    fn index_of(&self, name: &str) -> Result<usize> {
        self.directory
            .position(name)
            .ok_or_else(|| Error::EntryNotFound {
                name: name.to_string(),
            })
    }

    fn record_at(&self, index: usize) -> Result<EntryRecord> {
        self.directory
            .records()
            .get(index)
            .cloned()
            .ok_or_else(|| Error::EntryNotFound {
                name: format!("#{}", index),
            })
    }

    /// Decodes one payload into `sink`, verifying length and checksum.
    fn extract_record(&mut self, record: &EntryRecord, sink: &mut dyn Write) -> Result<u64> {
        let name = record.name.as_str();
        if record.uncompressed_size > self.limits.max_entry_size {
            return Err(Error::ResourceLimitExceeded(format!(
                "entry '{}' expands to {} bytes, limit is {}",
                name, record.uncompressed_size, self.limits.max_entry_size
            )));
        }

        let decompressor = self
            .registry
            .decompressor(record.method)
            .map_err(|e| e.with_entry(name))?;
        let mut payload = self.cursor.take_at(record.offset, record.compressed_size)?;
        let mut decoder = decompressor
            .decoder(&mut payload)
            .map_err(|e| map_decode_error(e).with_entry(name))?;

        // One byte past the recorded size is enough to detect an oversized
        // payload without producing it in full.
        let mut bounded = decoder
            .by_ref()
            .take(record.uncompressed_size.saturating_add(1));
        let mut out = Crc32Writer::new(sink);
        let mut buffer = [0u8; READ_BUFFER_SIZE];
        loop {
            let n = match bounded.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(map_decode_error(e).with_entry(name)),
            };
            out.write_all(&buffer[..n])?;
        }

        check_length(out.bytes_written(), record.uncompressed_size)
            .map_err(|e| e.with_entry(name))?;

        let actual = out.crc();
        if actual != record.checksum {
            return Err(Error::ChecksumMismatch {
                entry_name: name.to_string(),
                offset: record.offset,
                expected: record.checksum,
                actual,
            });
        }
        Ok(out.bytes_written())
    }
}

/// Errors that condemn one entry but leave the rest of the archive readable.
fn is_skippable(err: &Error) -> bool {
    err.is_entry_error() || matches!(err, Error::ResourceLimitExceeded(_))
}
