//! Validated entry names.

use crate::{Error, Result};
use std::borrow::Borrow;
use std::fmt;

/// Maximum length of an entry name in bytes.
///
/// Names are stored behind a `u16` length prefix.
pub const MAX_NAME_LENGTH: usize = u16::MAX as usize;

/// A validated entry name.
///
/// Entry names are UTF-8 and use `/` as their only separator. A valid name:
/// - is non-empty and at most [`MAX_NAME_LENGTH`] bytes
/// - contains no NUL bytes
/// - does not start or end with `/`
/// - has no empty, `.` or `..` segments
///
/// Names compare byte-wise, so `a.txt` and `A.txt` are different entries.
///
/// # Examples
///
/// ```
/// use mparc::EntryName;
///
/// let name = EntryName::new("docs\\guide.md").unwrap();
/// assert_eq!(name.as_str(), "docs/guide.md");
/// assert_eq!(name.file_name(), "guide.md");
///
/// assert!(EntryName::new("../secret").is_err());
/// assert!(EntryName::new("/absolute").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntryName(String);

impl EntryName {
    /// Creates an entry name from caller input.
    ///
    /// Backslashes are rewritten to `/` before validation, so `dir\a.txt`
    /// and `dir/a.txt` name the same entry.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidEntryName`] if the canonical form breaks any
    /// naming rule.
    pub fn new(s: &str) -> Result<Self> {
        let canonical = if s.contains('\\') {
            s.replace('\\', "/")
        } else {
            s.to_string()
        };
        Self::validate(&canonical)?;
        Ok(Self(canonical))
    }

    /// Creates an entry name from bytes stored in an archive directory.
    ///
    /// No canonicalization is applied; a stored name containing `\` is
    /// rejected.
    pub(crate) fn from_stored(bytes: Vec<u8>) -> Result<Self> {
        let s = String::from_utf8(bytes)
            .map_err(|_| Error::InvalidEntryName("name is not valid UTF-8".into()))?;
        if s.contains('\\') {
            return Err(Error::InvalidEntryName(
                "stored name contains a backslash".into(),
            ));
        }
        Self::validate(&s)?;
        Ok(Self(s))
    }

    fn validate(s: &str) -> Result<()> {
        if s.is_empty() {
            return Err(Error::InvalidEntryName("empty name".into()));
        }

        if s.len() > MAX_NAME_LENGTH {
            return Err(Error::InvalidEntryName(format!(
                "name exceeds maximum length of {} bytes",
                MAX_NAME_LENGTH
            )));
        }

        if s.contains('\0') {
            return Err(Error::InvalidEntryName("contains NUL byte".into()));
        }

        if s.starts_with('/') {
            return Err(Error::InvalidEntryName("leading slash not allowed".into()));
        }

        if s.ends_with('/') {
            return Err(Error::InvalidEntryName("trailing slash not allowed".into()));
        }

        for segment in s.split('/') {
            match segment {
                "" => {
                    return Err(Error::InvalidEntryName(
                        "empty segment (consecutive slashes)".into(),
                    ));
                }
                "." => return Err(Error::InvalidEntryName("'.' segment not allowed".into())),
                ".." => {
                    return Err(Error::InvalidEntryName("'..' segment not allowed".into()));
                }
                _ => {}
            }
        }

        Ok(())
    }

    /// Returns the name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the last segment of the name.
    pub fn file_name(&self) -> &str {
        match self.0.rfind('/') {
            Some(pos) => &self.0[pos + 1..],
            None => &self.0,
        }
    }

    /// Returns a name consisting of the last segment only.
    ///
    /// The last segment of a valid name is itself a valid name.
    pub fn basename(&self) -> Self {
        Self(self.file_name().to_string())
    }

    /// Returns everything after the first `.` of the file name.
    ///
    /// `archive.tar.gz` yields `tar.gz`. A leading dot does not start an
    /// extension, so `.profile` has none.
    pub fn extension(&self) -> Option<&str> {
        let file_name = self.file_name();
        let body = file_name.strip_prefix('.').unwrap_or(file_name);
        body.find('.').map(|pos| &body[pos + 1..])
    }

    /// Returns everything after the last `.` of the file name.
    ///
    /// `archive.tar.gz` yields `gz`.
    pub fn last_extension(&self) -> Option<&str> {
        let file_name = self.file_name();
        let body = file_name.strip_prefix('.').unwrap_or(file_name);
        body.rfind('.').map(|pos| &body[pos + 1..])
    }

    /// Returns the length of the name in bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always `false`; valid names are never empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Consumes the name and returns the inner string.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl AsRef<str> for EntryName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for EntryName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntryName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<&str> for EntryName {
    type Error = Error;

    fn try_from(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl TryFrom<String> for EntryName {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        Self::new(&s)
    }
}
