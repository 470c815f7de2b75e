//! Fuzz target for Directory::deserialize.
//!
//! A directory that parses must serialize back to the same bytes.
//!
//! Run with: cargo +nightly fuzz run directory_parse

#![no_main]

use libfuzzer_sys::fuzz_target;
use mparc::Directory;

fuzz_target!(|data: &[u8]| {
    if let Ok(directory) = Directory::deserialize(data) {
        let encoded = directory.serialize().expect("parsed directory serializes");
        assert_eq!(encoded, data, "directory did not round-trip");
    }
});
