//! Round-trip tests: write an archive, read it back, compare.

mod common;

use std::io::Cursor;

use common::{compressible_bytes, create_archive, create_archive_with_result, open, random_bytes};
use mparc::codec::{CodecRegistry, method};
use mparc::format::{MAGIC, TRAILER_SIZE};
use mparc::{Archive, EntryFlags, Error, ReadOptions, WriteOptions, Writer};

#[test]
fn test_empty_archive_roundtrip() {
    let bytes = create_archive(&[]).unwrap();
    assert_eq!(bytes.len() as u64, 4 + TRAILER_SIZE);
    assert_eq!(&bytes[..4], &[0, 0, 0, 0]);
    assert_eq!(&bytes[4..29], MAGIC);

    let mut archive = open(bytes).unwrap();
    assert!(archive.is_empty());
    assert!(archive.list_entries().is_empty());
    assert!(archive.verify().unwrap().is_ok());
}

#[test]
fn test_single_entry_roundtrip() {
    let bytes = create_archive(&[("hello.txt", b"Hello, World!")]).unwrap();
    let mut archive = open(bytes).unwrap();
    assert_eq!(archive.len(), 1);

    let entry = archive.entry("hello.txt").unwrap();
    assert_eq!(entry.uncompressed_size, 13);
    assert_eq!(entry.compressed_size, 13);
    assert_eq!(entry.offset, 0);
    assert_eq!(entry.method, method::STORE);
    assert_eq!(entry.flags, EntryFlags::empty());

    assert_eq!(archive.extract("hello.txt").unwrap(), b"Hello, World!");
}

#[test]
fn test_empty_payload_roundtrip() {
    let bytes = create_archive(&[("empty", b""), ("after", b"x")]).unwrap();
    let mut archive = open(bytes).unwrap();
    assert_eq!(archive.extract("empty").unwrap(), b"");
    assert_eq!(archive.extract("after").unwrap(), b"x");
}

#[test]
fn test_many_entries_preserve_order() {
    let payloads: Vec<(String, Vec<u8>)> = (0..200)
        .map(|i| (format!("dir{}/file{:03}.bin", i % 7, i), random_bytes(i, i as usize * 13)))
        .collect();
    let entries: Vec<(&str, &[u8])> = payloads
        .iter()
        .map(|(n, d)| (n.as_str(), d.as_slice()))
        .collect();

    let bytes = create_archive(&entries).unwrap();
    let mut archive = open(bytes).unwrap();

    let names: Vec<&str> = archive.names().collect();
    let expected: Vec<&str> = payloads.iter().map(|(n, _)| n.as_str()).collect();
    assert_eq!(names, expected);

    for (name, data) in &payloads {
        assert_eq!(&archive.extract(name).unwrap(), data, "entry {name}");
    }
}

#[test]
fn test_payloads_are_contiguous() {
    let bytes = create_archive(&[("a", b"123"), ("b", b""), ("c", b"4567")]).unwrap();
    let archive = open(bytes).unwrap();
    let mut expected_offset = 0;
    for entry in archive.entries() {
        assert_eq!(entry.offset, expected_offset);
        expected_offset += entry.compressed_size;
    }
    assert_eq!(archive.info().directory_offset, expected_offset);
}

#[test]
fn test_random_access_in_any_order() {
    let bytes = create_archive(&[("a", b"alpha"), ("b", b"beta"), ("c", b"gamma")]).unwrap();
    let mut archive = open(bytes).unwrap();
    assert_eq!(archive.extract("c").unwrap(), b"gamma");
    assert_eq!(archive.extract("a").unwrap(), b"alpha");
    assert_eq!(archive.extract("c").unwrap(), b"gamma");
    assert_eq!(archive.extract("b").unwrap(), b"beta");
}

#[test]
fn test_large_streamed_entry() {
    let data = random_bytes(42, 1 << 20);
    let mut writer = Writer::new(Vec::new()).options(WriteOptions::new().buffer_size(1000));
    writer
        .add_entry("large.bin", &mut Cursor::new(&data), method::STORE)
        .unwrap();
    let (result, bytes) = writer.finish().unwrap();
    assert_eq!(result.total_size, data.len() as u64);

    let mut archive = open(bytes).unwrap();
    let mut out = Vec::new();
    let n = archive.extract_to("large.bin", &mut out).unwrap();
    assert_eq!(n, data.len() as u64);
    assert_eq!(out, data);
}

#[test]
fn test_write_result_accounting() {
    let (bytes, result) = create_archive_with_result(
        None,
        &[("a", b"12345"), ("b", b"678")],
        method::STORE,
    )
    .unwrap();
    assert_eq!(result.entries_written, 2);
    assert_eq!(result.total_size, 8);
    assert_eq!(result.compressed_size, 8);
    assert_eq!(result.archive_size, bytes.len() as u64);
    assert_eq!(
        result.archive_size,
        result.compressed_size + result.directory_size + TRAILER_SIZE
    );
}

#[test]
fn test_strip_directories() {
    let (bytes, _) = create_archive_with_result(
        Some(WriteOptions::new().strip_directories(true)),
        &[("deep/nested/file.txt", b"data")],
        method::STORE,
    )
    .unwrap();
    let mut archive = open(bytes).unwrap();
    assert_eq!(archive.names().collect::<Vec<_>>(), ["file.txt"]);
    assert_eq!(archive.extract("file.txt").unwrap(), b"data");
}

#[test]
fn test_strip_directories_collision_is_duplicate() {
    let mut writer = Writer::new(Vec::new()).options(WriteOptions::new().strip_directories(true));
    writer.add_bytes("a/x.txt", b"1", method::STORE).unwrap();
    let err = writer.add_bytes("b/x.txt", b"2", method::STORE).unwrap_err();
    assert!(matches!(err, Error::DuplicateName { ref name } if name == "x.txt"));
}

#[test]
fn test_names_are_case_sensitive() {
    let bytes = create_archive(&[("Readme", b"upper"), ("readme", b"lower")]).unwrap();
    let mut archive = open(bytes).unwrap();
    assert_eq!(archive.extract("Readme").unwrap(), b"upper");
    assert_eq!(archive.extract("readme").unwrap(), b"lower");
    assert!(matches!(
        archive.extract("README"),
        Err(Error::EntryNotFound { .. })
    ));
}

#[test]
fn test_backslash_names_are_canonicalized() {
    let bytes = create_archive(&[("dir\\file.txt", b"data")]).unwrap();
    let mut archive = open(bytes).unwrap();
    assert_eq!(archive.names().collect::<Vec<_>>(), ["dir/file.txt"]);
    assert_eq!(archive.extract("dir/file.txt").unwrap(), b"data");
}

#[test]
fn test_unicode_names() {
    let bytes = create_archive(&[("données/résumé.txt", b"cv"), ("日本語.md", b"jp")]).unwrap();
    let mut archive = open(bytes).unwrap();
    assert_eq!(archive.extract("données/résumé.txt").unwrap(), b"cv");
    assert_eq!(archive.extract("日本語.md").unwrap(), b"jp");
}

#[test]
fn test_open_with_store_only_registry() {
    let bytes = create_archive(&[("a", b"stored")]).unwrap();
    let options = ReadOptions::new().registry(CodecRegistry::new());
    let mut archive = Archive::open_with_options(Cursor::new(bytes), options).unwrap();
    assert_eq!(archive.extract("a").unwrap(), b"stored");
}

#[cfg(feature = "deflate")]
#[test]
fn test_deflate_roundtrip() {
    let data = compressible_bytes(64 * 1024);
    let (bytes, result) =
        create_archive_with_result(None, &[("text.txt", &data)], method::DEFLATE).unwrap();
    assert!(result.compressed_size < result.total_size / 4);

    let mut archive = open(bytes).unwrap();
    let entry = archive.entry("text.txt").unwrap();
    assert_eq!(entry.method, method::DEFLATE);
    assert!(entry.compression_ratio() < 0.25);
    assert_eq!(archive.extract("text.txt").unwrap(), data);
}

#[cfg(feature = "deflate")]
#[test]
fn test_mixed_methods() {
    let text = compressible_bytes(10_000);
    let noise = random_bytes(7, 10_000);
    let mut writer = Writer::new(Vec::new());
    writer.add_bytes("text", &text, method::DEFLATE).unwrap();
    writer.add_bytes("noise", &noise, method::STORE).unwrap();
    let (_, bytes) = writer.finish().unwrap();

    let mut archive = open(bytes).unwrap();
    assert_eq!(archive.info().methods, [method::STORE, method::DEFLATE]);
    assert_eq!(archive.extract("text").unwrap(), text);
    assert_eq!(archive.extract("noise").unwrap(), noise);
}

#[cfg(feature = "bzip2")]
#[test]
fn test_bzip2_roundtrip() {
    let data = compressible_bytes(32 * 1024);
    let (bytes, _) =
        create_archive_with_result(None, &[("b.txt", &data)], method::BZIP2).unwrap();
    let mut archive = open(bytes).unwrap();
    assert_eq!(archive.extract("b.txt").unwrap(), data);
}

#[cfg(feature = "zstd")]
#[test]
fn test_zstd_roundtrip() {
    let data = compressible_bytes(32 * 1024);
    let (bytes, _) = create_archive_with_result(None, &[("z.txt", &data)], method::ZSTD).unwrap();
    let mut archive = open(bytes).unwrap();
    assert_eq!(archive.extract("z.txt").unwrap(), data);
}

#[cfg(feature = "deflate")]
#[test]
fn test_prepared_entries_roundtrip() {
    use mparc::{PreparedEntry, prepare_parallel};

    let registry = CodecRegistry::default();
    let items: Vec<(String, Vec<u8>)> = (0..16)
        .map(|i| (format!("part{i:02}.txt"), compressible_bytes(1000 + i * 100)))
        .collect();
    let prepared = prepare_parallel(&registry, &items, method::DEFLATE).unwrap();

    let mut writer = Writer::new(Vec::new());
    for entry in prepared {
        writer.append_prepared(entry).unwrap();
    }
    let single = PreparedEntry::prepare(&registry, "single.bin", b"one", method::STORE).unwrap();
    writer.append_prepared(single).unwrap();
    let (_, bytes) = writer.finish().unwrap();

    let mut archive = open(bytes).unwrap();
    assert_eq!(archive.len(), 17);
    for (name, data) in &items {
        assert_eq!(&archive.extract(name).unwrap(), data);
    }
    assert_eq!(archive.extract("single.bin").unwrap(), b"one");
    assert!(archive.verify().unwrap().is_ok());
}
