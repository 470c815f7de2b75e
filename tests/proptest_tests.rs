//! Property-based tests using proptest.
//!
//! These tests verify invariants of the container with randomly generated
//! names and payloads.

use std::collections::BTreeMap;
use std::io::Cursor;

use mparc::codec::method;
use mparc::format::directory::Directory;
use mparc::{Archive, EntryName, Error, Writer};
use proptest::prelude::*;

/// Strategy for generating valid entry names.
///
/// - 1-4 segments separated by '/'
/// - Each segment is 1-10 characters from a small alphabet, never "." or ".."
fn valid_name_strategy() -> impl Strategy<Value = String> {
    proptest::collection::vec("[a-zA-Z0-9_-][a-zA-Z0-9_.-]{0,9}", 1..5)
        .prop_map(|parts| parts.join("/"))
}

/// Strategy for a set of uniquely named entries with arbitrary payloads.
fn entries_strategy() -> impl Strategy<Value = BTreeMap<String, Vec<u8>>> {
    proptest::collection::btree_map(
        valid_name_strategy(),
        proptest::collection::vec(any::<u8>(), 0..2048),
        0..24,
    )
}

fn build(entries: &BTreeMap<String, Vec<u8>>, method: u16) -> Vec<u8> {
    let mut writer = Writer::new(Vec::new());
    for (name, data) in entries {
        writer.add_bytes(name, data, method).unwrap();
    }
    writer.finish().unwrap().1
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Every entry reads back exactly as written, in insertion order.
    #[test]
    fn roundtrip_preserves_entries(entries in entries_strategy()) {
        let bytes = build(&entries, method::STORE);
        let mut archive = Archive::open(Cursor::new(bytes)).unwrap();

        prop_assert_eq!(archive.len(), entries.len());
        let names: Vec<String> = archive.names().map(String::from).collect();
        let expected: Vec<String> = entries.keys().cloned().collect();
        prop_assert_eq!(names, expected);

        for (name, data) in &entries {
            prop_assert_eq!(&archive.extract(name).unwrap(), data);
        }
        prop_assert!(archive.verify().unwrap().is_ok());
    }

    /// Compressed entries read back exactly as written.
    #[cfg(feature = "deflate")]
    #[test]
    fn deflate_roundtrip(entries in entries_strategy()) {
        let bytes = build(&entries, method::DEFLATE);
        let mut archive = Archive::open(Cursor::new(bytes)).unwrap();
        for (name, data) in &entries {
            prop_assert_eq!(&archive.extract(name).unwrap(), data);
        }
    }

    /// Flipping any single bit never yields silently different data.
    #[test]
    fn single_bit_flip_is_detected(
        entries in entries_strategy(),
        position in any::<prop::sample::Index>(),
        bit in 0u8..8,
    ) {
        let clean = build(&entries, method::STORE);
        let mut bytes = clean.clone();
        let at = position.index(bytes.len());
        bytes[at] ^= 1 << bit;

        if let Ok(mut archive) = Archive::open(Cursor::new(bytes)) {
            for (name, data) in &entries {
                match archive.extract(name) {
                    Ok(out) => prop_assert_eq!(&out, data),
                    Err(e) => prop_assert!(e.is_corruption(), "{:?}", e),
                }
            }
        }
    }

    /// Arbitrary bytes never panic the reader.
    #[test]
    fn arbitrary_bytes_never_panic(data in proptest::collection::vec(any::<u8>(), 0..512)) {
        if let Ok(mut archive) = Archive::open(Cursor::new(data)) {
            let _ = archive.verify();
        }
    }

    /// Arbitrary bytes never panic the directory parser.
    #[test]
    fn directory_parser_never_panics(data in proptest::collection::vec(any::<u8>(), 0..512)) {
        let _ = Directory::deserialize(&data);
    }

    /// A directory that deserializes serializes back to the same bytes.
    #[test]
    fn directory_serialization_is_stable(entries in entries_strategy()) {
        let bytes = build(&entries, method::STORE);
        let archive = Archive::open(Cursor::new(bytes)).unwrap();
        let serialized = archive.directory().serialize().unwrap();
        let reparsed = Directory::deserialize(&serialized).unwrap();
        prop_assert_eq!(reparsed.records(), archive.entries());
    }

    /// Valid names are accepted unchanged.
    #[test]
    fn valid_names_are_accepted(name in valid_name_strategy()) {
        let parsed = EntryName::new(&name).unwrap();
        prop_assert_eq!(parsed.as_str(), name.as_str());
    }

    /// Backslash separators canonicalize to slashes.
    #[test]
    fn backslashes_canonicalize(name in valid_name_strategy()) {
        let windows = name.replace('/', "\\");
        let parsed = EntryName::new(&windows).unwrap();
        prop_assert_eq!(parsed.as_str(), name.as_str());
    }

    /// Arbitrary strings never panic name validation, and accepted names
    /// obey the naming rules.
    #[test]
    fn arbitrary_names_are_safe(s in "\\PC{0,40}") {
        if let Ok(name) = EntryName::new(&s) {
            let name = name.as_str();
            prop_assert!(!name.is_empty());
            prop_assert!(!name.starts_with('/'));
            prop_assert!(!name.ends_with('/'));
            prop_assert!(!name.contains('\\'));
            prop_assert!(!name.contains('\0'));
            prop_assert!(name.split('/').all(|seg| !seg.is_empty() && seg != "." && seg != ".."));
        }
    }

    /// Duplicate names are rejected and the writer stays usable.
    #[test]
    fn duplicates_rejected(name in valid_name_strategy(), data in proptest::collection::vec(any::<u8>(), 0..64)) {
        let mut writer = Writer::new(Vec::new());
        writer.add_bytes(&name, &data, method::STORE).unwrap();
        let is_duplicate = matches!(
            writer.add_bytes(&name, &data, method::STORE),
            Err(Error::DuplicateName { .. })
        );
        prop_assert!(is_duplicate);
        prop_assert!(writer.finish().is_ok());
    }
}
