//! Selecting entries by size or extension.

use std::io::{Read, Seek};

use crate::format::directory::EntryRecord;
use crate::read::Archive;

/// A predicate over directory records.
///
/// Size predicates compare the uncompressed size. Extension predicates
/// compare case-sensitively against the last name segment:
/// [`Extension`](Query::Extension) takes everything after its first dot and
/// [`LastExtension`](Query::LastExtension) everything after its last dot, so
/// `backup.tar.gz` has extension `tar.gz` and last extension `gz`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Query<'a> {
    /// Uncompressed size strictly greater than the value.
    LargerThan(u64),
    /// Uncompressed size equal to the value.
    SizeEquals(u64),
    /// Uncompressed size strictly smaller than the value.
    SmallerThan(u64),
    /// Full extension equal to the value.
    Extension(&'a str),
    /// Final extension equal to the value.
    LastExtension(&'a str),
}

impl Query<'_> {
    /// Returns `true` if the record satisfies this query.
    pub fn matches(&self, record: &EntryRecord) -> bool {
        match *self {
            Query::LargerThan(size) => record.uncompressed_size > size,
            Query::SizeEquals(size) => record.uncompressed_size == size,
            Query::SmallerThan(size) => record.uncompressed_size < size,
            Query::Extension(ext) => record.name.extension() == Some(ext),
            Query::LastExtension(ext) => record.name.last_extension() == Some(ext),
        }
    }
}

impl<R: Read + Seek> Archive<R> {
    /// Returns the records matching `query`, in directory order.
    ///
    /// # Example
    ///
    /// ```rust
    /// use mparc::{Archive, Query, Writer};
    /// use mparc::codec::method;
    /// use std::io::Cursor;
    ///
    /// let mut writer = Writer::new(Vec::new());
    /// writer.add_bytes("notes.txt", b"short", method::STORE)?;
    /// writer.add_bytes("backup.tar.gz", &[0u8; 100], method::STORE)?;
    /// let (_, bytes) = writer.finish()?;
    ///
    /// let archive = Archive::open(Cursor::new(bytes))?;
    /// let big: Vec<_> = archive
    ///     .query(Query::LargerThan(10))
    ///     .iter()
    ///     .map(|r| r.name.as_str())
    ///     .collect();
    /// assert_eq!(big, ["backup.tar.gz"]);
    /// assert_eq!(archive.query(Query::LastExtension("gz")).len(), 1);
    /// # Ok::<(), mparc::Error>(())
    /// ```
    pub fn query(&self, query: Query<'_>) -> Vec<&EntryRecord> {
        self.entries().iter().filter(|r| query.matches(r)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Writer;
    use crate::codec::method;
    use std::io::Cursor;

    fn archive() -> Archive<Cursor<Vec<u8>>> {
        let mut writer = Writer::new(Vec::new());
        writer.add_bytes("a.txt", &[0; 10], method::STORE).unwrap();
        writer.add_bytes("dir/b.tar.gz", &[0; 20], method::STORE).unwrap();
        writer.add_bytes("c.gz", &[0; 30], method::STORE).unwrap();
        writer.add_bytes("Makefile", &[0; 20], method::STORE).unwrap();
        let (_, bytes) = writer.finish().unwrap();
        Archive::open(Cursor::new(bytes)).unwrap()
    }

    fn names(records: Vec<&EntryRecord>) -> Vec<&str> {
        records.into_iter().map(|r| r.name.as_str()).collect()
    }

    #[test]
    fn test_size_queries() {
        let archive = archive();
        assert_eq!(
            names(archive.query(Query::LargerThan(10))),
            ["dir/b.tar.gz", "c.gz", "Makefile"]
        );
        assert_eq!(
            names(archive.query(Query::SizeEquals(20))),
            ["dir/b.tar.gz", "Makefile"]
        );
        assert_eq!(names(archive.query(Query::SmallerThan(20))), ["a.txt"]);
        assert!(archive.query(Query::LargerThan(30)).is_empty());
    }

    #[test]
    fn test_extension_queries() {
        let archive = archive();
        assert_eq!(names(archive.query(Query::Extension("gz"))), ["c.gz"]);
        assert_eq!(
            names(archive.query(Query::Extension("tar.gz"))),
            ["dir/b.tar.gz"]
        );
        assert_eq!(
            names(archive.query(Query::LastExtension("gz"))),
            ["dir/b.tar.gz", "c.gz"]
        );
        assert!(archive.query(Query::Extension("TXT")).is_empty());
    }
}
