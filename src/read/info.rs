//! Archive information and whole-archive operation results.

use crate::Error;
use crate::codec::MethodId;

/// Information about an opened archive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArchiveInfo {
    /// Container format version.
    pub version: u16,
    /// Global flag bits.
    pub flags: u16,
    /// Number of entries.
    pub entry_count: usize,
    /// Container offset of the directory.
    pub directory_offset: u64,
    /// Size of the serialized directory.
    pub directory_length: u64,
    /// CRC-32 of the serialized directory.
    pub directory_checksum: u32,
    /// Size of the whole medium, trailer included.
    pub container_length: u64,
    /// Total uncompressed size of all entries.
    pub total_size: u64,
    /// Total stored size of all payloads.
    pub compressed_size: u64,
    /// Distinct methods used, in ascending order.
    pub methods: Vec<MethodId>,
}

impl ArchiveInfo {
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

/// Result of verifying every entry of an archive.
#[must_use = "verification results should be checked to confirm archive integrity"]
#[derive(Debug, Default)]
pub struct VerifyResult {
    /// Number of entries verified.
    pub entries_tested: usize,
    /// Number of entries that passed.
    pub entries_passed: usize,
    /// Number of entries that failed.
    pub entries_failed: usize,
    /// Failed entries with the error each one produced.
    pub failures: Vec<(String, Error)>,
}

impl VerifyResult {
    /// Returns true if all entries passed.
    pub fn is_ok(&self) -> bool {
        self.entries_failed == 0
    }

    /// Returns true if any entries failed.
    pub fn is_err(&self) -> bool {
        self.entries_failed > 0
    }
}

/// Result of extracting every entry of an archive.
#[must_use = "extraction results should be checked for partial failures"]
#[derive(Debug, Default)]
pub struct ExtractResult {
    /// Number of entries extracted.
    pub entries_extracted: usize,
    /// Number of entries that failed.
    pub entries_failed: usize,
    /// Total bytes extracted.
    pub bytes_extracted: u64,
    /// Failed entries with the error each one produced.
    pub failures: Vec<(String, Error)>,
}

impl ExtractResult {
    /// Returns true if every entry was extracted.
    pub fn is_ok(&self) -> bool {
        self.entries_failed == 0
    }

    /// Returns true if any entries failed.
    pub fn is_err(&self) -> bool {
        self.entries_failed > 0
    }
}
