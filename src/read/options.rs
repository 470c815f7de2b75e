//! Options for opening archives.

use crate::codec::CodecRegistry;

/// Resource limits applied while opening and extracting.
///
/// Every size in an archive is attacker-controlled; these limits bound what
/// a hostile file can make the reader allocate or produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceLimits {
    /// Maximum number of entries allowed in the directory.
    pub max_entries: usize,
    /// Maximum size of the serialized directory in bytes.
    pub max_directory_bytes: u64,
    /// Maximum uncompressed size of a single extracted entry.
    pub max_entry_size: u64,
}

impl Default for ResourceLimits {
    /// Creates resource limits with the following default values:
    ///
    /// | Limit | Default Value |
    /// |-------|---------------|
    /// | `max_entries` | 1,000,000 |
    /// | `max_directory_bytes` | 64 MiB |
    /// | `max_entry_size` | 64 GiB |
    ///
    /// Use [`ResourceLimits::unlimited()`] to disable all limits.
    fn default() -> Self {
        Self {
            max_entries: 1_000_000,
            max_directory_bytes: 64 << 20,
            max_entry_size: 64 << 30,
        }
    }
}

impl ResourceLimits {
    /// Creates new resource limits with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates resource limits with no restrictions.
    pub fn unlimited() -> Self {
        Self {
            max_entries: usize::MAX,
            max_directory_bytes: u64::MAX,
            max_entry_size: u64::MAX,
        }
    }

    /// Sets the maximum number of entries.
    pub fn max_entries(mut self, max: usize) -> Self {
        self.max_entries = max;
        self
    }

    /// Sets the maximum directory size.
    pub fn max_directory_bytes(mut self, max: u64) -> Self {
        self.max_directory_bytes = max;
        self
    }

    /// Sets the maximum size of a single extracted entry.
    pub fn max_entry_size(mut self, max: u64) -> Self {
        self.max_entry_size = max;
        self
    }
}

/// Options for opening archives.
#[derive(Debug, Clone, Default)]
pub struct ReadOptions {
    /// Codecs available for extraction.
    pub registry: CodecRegistry,
    /// Resource limits.
    pub limits: ResourceLimits,
}

impl ReadOptions {
    /// Creates new read options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the codec registry.
    pub fn registry(mut self, registry: CodecRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Sets the resource limits.
    pub fn limits(mut self, limits: ResourceLimits) -> Self {
        self.limits = limits;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_limits() {
        let limits = ResourceLimits::default();
        assert_eq!(limits.max_entries, 1_000_000);
        assert_eq!(limits.max_directory_bytes, 64 * 1024 * 1024);
        assert_eq!(limits.max_entry_size, 64 * 1024 * 1024 * 1024);
    }

    #[test]
    fn test_unlimited() {
        let limits = ResourceLimits::unlimited();
        assert_eq!(limits.max_entries, usize::MAX);
        assert_eq!(limits.max_directory_bytes, u64::MAX);
        assert_eq!(limits.max_entry_size, u64::MAX);
    }

    #[test]
    fn test_limits_builder() {
        let limits = ResourceLimits::new()
            .max_entries(10)
            .max_directory_bytes(1024)
            .max_entry_size(4096);
        assert_eq!(limits.max_entries, 10);
        assert_eq!(limits.max_directory_bytes, 1024);
        assert_eq!(limits.max_entry_size, 4096);
    }

    #[test]
    fn test_read_options_builder() {
        let opts = ReadOptions::new()
            .registry(CodecRegistry::new())
            .limits(ResourceLimits::unlimited());
        assert_eq!(opts.limits, ResourceLimits::unlimited());
        assert_eq!(opts.registry.method_ids().count(), 1);
    }
}
