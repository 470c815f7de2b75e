//! Fuzz target for EntryName::new with arbitrary string input.
//!
//! Run with: cargo +nightly fuzz run entry_name
//!
//! Properties checked for every accepted name:
//! - no leading or trailing slash
//! - no empty, "." or ".." segments
//! - no backslash or NUL byte
//! - canonicalization is idempotent

#![no_main]

use libfuzzer_sys::fuzz_target;
use mparc::EntryName;

fuzz_target!(|data: &[u8]| {
    let Ok(s) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(name) = EntryName::new(s) else {
        return;
    };
    let canonical = name.as_str();

    assert!(!canonical.starts_with('/'), "leading slash: {canonical:?}");
    assert!(!canonical.ends_with('/'), "trailing slash: {canonical:?}");
    assert!(!canonical.contains('\\'), "backslash: {canonical:?}");
    assert!(!canonical.contains('\0'), "NUL byte: {canonical:?}");
    assert!(
        canonical
            .split('/')
            .all(|seg| !seg.is_empty() && seg != "." && seg != ".."),
        "bad segment: {canonical:?}"
    );

    let again = EntryName::new(canonical).expect("canonical name is valid");
    assert_eq!(again.as_str(), canonical);
});
