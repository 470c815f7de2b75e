//! MPARC container layout: constants and low-level encoding.
//!
//! A version 1 container is laid out as:
//!
//! ```text
//! [payload 0][payload 1]...[payload n-1][directory][trailer]
//! ```
//!
//! The fixed-size [trailer](trailer::Trailer) sits at the very end of the
//! medium and locates the [directory](directory::Directory), which in turn
//! locates every payload. All integers are little-endian with fixed widths.

pub mod cursor;
pub mod directory;
pub mod trailer;

/// The MPARC magic string, stored at the start of the trailer.
pub const MAGIC: &[u8; 25] = b"MXPSQL's Portable Archive";

/// The only container format version this crate reads and writes.
pub const FORMAT_VERSION: u16 = 1;

/// Size of the trailer in bytes.
///
/// The trailer contains:
/// - 25 bytes: magic
/// - 2 bytes: format version
/// - 2 bytes: global flags
/// - 4 bytes: entry count
/// - 8 bytes: directory offset
/// - 8 bytes: directory length
/// - 4 bytes: directory CRC-32
/// - 4 bytes: trailer CRC-32 over the preceding 53 bytes
pub const TRAILER_SIZE: u64 = 57;

/// Global flag bits understood by this version. None are defined.
pub const KNOWN_GLOBAL_FLAGS: u16 = 0;

/// Size in bytes of the entry count prefix of a serialized directory.
pub const DIRECTORY_COUNT_SIZE: u64 = 4;

/// Size in bytes of a directory record excluding its name.
///
/// name length (2) + uncompressed size (8) + compressed size (8) +
/// payload offset (8) + method (2) + checksum (4) + flags (1).
pub const RECORD_FIXED_SIZE: u64 = 33;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_magic_length() {
        assert_eq!(MAGIC.len(), 25);
        assert!(MAGIC.is_ascii());
    }

    #[test]
    fn test_trailer_size_matches_fields() {
        assert_eq!(TRAILER_SIZE, 25 + 2 + 2 + 4 + 8 + 8 + 4 + 4);
    }

    #[test]
    fn test_record_fixed_size_matches_fields() {
        assert_eq!(RECORD_FIXED_SIZE, 2 + 8 + 8 + 8 + 2 + 4 + 1);
    }
}
