//! Fuzz target for Archive::open with arbitrary byte input.
//!
//! Exercises trailer validation, directory parsing and payload extraction
//! with adversarial containers. Any panic, hang or unbounded allocation is
//! a bug.
//!
//! Run with: cargo +nightly fuzz run archive_open

#![no_main]

use libfuzzer_sys::fuzz_target;
use mparc::{Archive, ReadOptions, ResourceLimits};
use std::io::Cursor;

fuzz_target!(|data: &[u8]| {
    let limits = ResourceLimits::new()
        .max_entries(10_000)
        .max_directory_bytes(1 << 20)
        .max_entry_size(16 << 20);
    let options = ReadOptions::new().limits(limits);

    if let Ok(mut archive) = Archive::open_with_options(Cursor::new(data), options) {
        let _ = archive.info();
        for entry in archive.entries() {
            let _ = entry.name.extension();
            let _ = entry.compression_ratio();
        }
        // Extraction must fail cleanly or return verified bytes.
        let _ = archive.verify();
    }
});
