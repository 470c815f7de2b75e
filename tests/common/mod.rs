//! Shared test utilities for integration tests.
//!
//! Note: `#![allow(dead_code)]` is required because each integration test file
//! compiles as a separate crate and may only use a subset of these helpers.

#![allow(dead_code)]

use std::io::Cursor;

use mparc::checksum::{Checksum, Crc32};
use mparc::codec::{MethodId, method};
use mparc::format::TRAILER_SIZE;
use mparc::format::directory::{Directory, EntryFlags, EntryMetadata, Placement};
use mparc::format::trailer::Trailer;
use mparc::{Archive, EntryName, WriteOptions, WriteResult, Writer};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Creates an in-memory archive with optional configuration.
///
/// Every entry is written with `method`. Returns the archive bytes and the
/// writer's summary.
pub fn create_archive_with_result(
    options: Option<WriteOptions>,
    entries: &[(&str, &[u8])],
    method: MethodId,
) -> mparc::Result<(Vec<u8>, WriteResult)> {
    let writer = Writer::new(Vec::new());
    let mut writer = match options {
        Some(opts) => writer.options(opts),
        None => writer,
    };

    for (name, data) in entries {
        writer.add_bytes(name, data, method)?;
    }

    let (result, bytes) = writer.finish()?;
    Ok((bytes, result))
}

/// Creates an in-memory archive of stored entries.
pub fn create_archive(entries: &[(&str, &[u8])]) -> mparc::Result<Vec<u8>> {
    create_archive_with_result(None, entries, method::STORE).map(|(bytes, _)| bytes)
}

/// Opens archive bytes with default options.
pub fn open(bytes: Vec<u8>) -> mparc::Result<Archive<Cursor<Vec<u8>>>> {
    Archive::open(Cursor::new(bytes))
}

/// Returns `len` pseudo-random bytes derived from `seed`.
pub fn random_bytes(seed: u64, len: usize) -> Vec<u8> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut data = vec![0u8; len];
    rng.fill(&mut data[..]);
    data
}

/// Returns `len` bytes of repetitive, highly compressible text.
pub fn compressible_bytes(len: usize) -> Vec<u8> {
    b"The quick brown fox jumps over the lazy dog. "
        .iter()
        .copied()
        .cycle()
        .take(len)
        .collect()
}

/// Decodes the trailer at the end of `bytes`.
pub fn read_trailer(bytes: &[u8]) -> Trailer {
    let start = bytes.len() - TRAILER_SIZE as usize;
    Trailer::parse(&bytes[start..]).expect("valid trailer")
}

/// Overwrites the trailer with `trailer`, recomputing its checksum.
pub fn rewrite_trailer(bytes: &mut [u8], trailer: &Trailer) {
    let start = bytes.len() - TRAILER_SIZE as usize;
    bytes[start..].copy_from_slice(&trailer.encode());
}

/// Builds a container by hand from raw payload bytes, a directory and an
/// optional region placed between the directory and the trailer.
///
/// The trailer is derived from the directory as a writer would derive it.
pub fn assemble(payloads: &[u8], directory: &Directory, after_directory: &[u8]) -> Vec<u8> {
    let serialized = directory.serialize().expect("serializable directory");
    let trailer = Trailer::new(
        directory.len() as u32,
        payloads.len() as u64,
        serialized.len() as u64,
        Crc32::compute(&serialized),
    );
    let mut bytes = payloads.to_vec();
    bytes.extend_from_slice(&serialized);
    bytes.extend_from_slice(after_directory);
    bytes.extend_from_slice(&trailer.encode());
    bytes
}

/// Adds a fully placed record to `directory`.
pub fn add_record(
    directory: &mut Directory,
    name: &str,
    method: MethodId,
    flags: EntryFlags,
    placement: Placement,
) {
    let handle = directory
        .add_entry(EntryName::new(name).unwrap(), EntryMetadata { method, flags })
        .unwrap();
    directory.patch(handle, placement).unwrap();
}

/// Returns the placement of a stored (uncompressed) payload.
pub fn stored_placement(offset: u64, data: &[u8]) -> Placement {
    Placement {
        offset,
        compressed_size: data.len() as u64,
        uncompressed_size: data.len() as u64,
        checksum: Crc32::compute(data),
    }
}

/// Recomputes the trailer checksum after the trailer bytes were edited by
/// hand.
pub fn reseal_trailer(bytes: &mut [u8]) {
    let start = bytes.len() - TRAILER_SIZE as usize;
    let body_end = bytes.len() - 4;
    let crc = Crc32::compute(&bytes[start..body_end]);
    bytes[body_end..].copy_from_slice(&crc.to_le_bytes());
}
