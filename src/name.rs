//! Entry names and their on-disk encoding.
//!
//! Names inside a package use `\` as the separator, never start or end with
//! a separator or whitespace, and never contain repeated separators. They
//! keep their case but compare case-insensitively. On disk they are stored
//! in the GBK code page.

use std::fmt;

use encoding_rs::GBK;

use crate::format::MAX_NAME_LENGTH;
use crate::{Error, Result};

/// The separator used inside entry names.
pub const SEPARATOR: char = '\\';

/// Characters stripped from both ends of a name.
const TRIMMED: &[char] = &[' ', '\r', '\n', '\t', '\\'];

/// Normalizes a name into its stored form.
///
/// Forward slashes become backslashes, runs of backslashes collapse into
/// one, and leading or trailing whitespace and separators are removed.
/// Normalization is idempotent.
///
/// ```
/// assert_eq!(pck::name::normalize("//abc\\\\//123.txt"), "abc\\123.txt");
/// ```
pub fn normalize(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut last_was_separator = false;
    for c in name.chars() {
        let c = if c == '/' { SEPARATOR } else { c };
        if c == SEPARATOR {
            if last_was_separator {
                continue;
            }
            last_was_separator = true;
        } else {
            last_was_separator = false;
        }
        out.push(c);
    }
    out.trim_matches(TRIMMED).to_string()
}

/// Compares two stored names, ignoring ASCII case.
#[inline]
pub fn names_equal(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b)
}

/// Orders two stored names, ignoring ASCII case.
pub fn compare_names(a: &str, b: &str) -> std::cmp::Ordering {
    let a = a.bytes().map(|b| b.to_ascii_lowercase());
    let b = b.bytes().map(|b| b.to_ascii_lowercase());
    a.cmp(b)
}

/// Encodes a name into the on-disk code page.
///
/// # Errors
///
/// Returns [`Error::InvalidName`] if the name contains characters GBK cannot
/// represent or a NUL character.
pub fn encode(name: &str) -> Result<Vec<u8>> {
    if name.contains('\0') {
        return Err(Error::invalid_name(name, "contains NUL character"));
    }
    let (bytes, _, had_errors) = GBK.encode(name);
    if had_errors {
        return Err(Error::invalid_name(
            name,
            "not representable in the GBK code page",
        ));
    }
    Ok(bytes.into_owned())
}

/// Decodes a name from the on-disk code page.
///
/// Returns the decoded text and whether any bytes had to be replaced.
pub fn decode(bytes: &[u8]) -> (String, bool) {
    let (text, _, had_errors) = GBK.decode(bytes);
    (text.into_owned(), had_errors)
}

/// A validated, normalized entry name.
///
/// # Examples
///
/// ```
/// use pck::EntryName;
///
/// let name = EntryName::new("data/textures//stone.dds").unwrap();
/// assert_eq!(name.as_str(), "data\\textures\\stone.dds");
/// assert_eq!(name.file_name(), "stone.dds");
/// assert!(name.matches("DATA\\TEXTURES\\STONE.DDS"));
///
/// assert!(EntryName::new("  //  ").is_err());
/// ```
///
/// A name read from a package whose bytes are not valid GBK keeps those
/// bytes and writes them back unchanged; its text form carries U+FFFD in
/// place of the undecodable bytes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntryName {
    text: String,
    undecodable: Option<Box<[u8]>>,
}

impl EntryName {
    /// Normalizes and validates a name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidName`] if the name is empty after
    /// normalization, cannot be encoded, or its encoded form is longer than
    /// [`MAX_NAME_LENGTH`] bytes.
    pub fn new(name: &str) -> Result<Self> {
        let normalized = normalize(name);
        if normalized.is_empty() {
            return Err(Error::invalid_name(name, "empty name"));
        }
        let encoded = encode(&normalized)?;
        if encoded.len() > MAX_NAME_LENGTH {
            return Err(Error::invalid_name(
                name,
                format!(
                    "encoded name is {} bytes, limit is {}",
                    encoded.len(),
                    MAX_NAME_LENGTH
                ),
            ));
        }
        Ok(Self {
            text: normalized,
            undecodable: None,
        })
    }

    /// Wraps name bytes read from an index record, normalizing the decoded
    /// text without validation.
    ///
    /// Returns the name and whether the bytes failed to decode.
    pub(crate) fn from_stored(bytes: &[u8]) -> (Self, bool) {
        let (decoded, lossy) = decode(bytes);
        let name = Self {
            text: normalize(&decoded),
            undecodable: lossy.then(|| bytes.into()),
        };
        (name, lossy)
    }

    /// Wraps text without normalizing or validating it.
    #[cfg(test)]
    pub(crate) fn unchecked(text: &str) -> Self {
        Self {
            text: text.to_string(),
            undecodable: None,
        }
    }

    /// Returns `true` if the name was read from bytes that are not valid GBK.
    pub fn is_undecodable(&self) -> bool {
        self.undecodable.is_some()
    }

    /// Returns the name as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Returns `true` if `other` names the same entry.
    ///
    /// `other` is normalized first, so separators and case do not matter.
    pub fn matches(&self, other: &str) -> bool {
        names_equal(&self.text, &normalize(other))
    }

    /// Returns `true` if this name lies under the directory `dir`.
    ///
    /// `dir` must already be normalized.
    pub fn is_under(&self, dir: &str) -> bool {
        let bytes = self.text.as_bytes();
        bytes.len() > dir.len()
            && bytes[dir.len()] == b'\\'
            && bytes[..dir.len()].eq_ignore_ascii_case(dir.as_bytes())
    }

    /// Returns the last component of the name.
    pub fn file_name(&self) -> &str {
        self.text.rsplit(SEPARATOR).next().unwrap_or(&self.text)
    }

    /// Returns the directory part of the name, if any.
    pub fn parent(&self) -> Option<&str> {
        self.text.rfind(SEPARATOR).map(|idx| &self.text[..idx])
    }

    /// Iterates over the components of the name.
    pub fn components(&self) -> impl Iterator<Item = &str> {
        self.text.split(SEPARATOR)
    }

    /// Encodes the name into the on-disk code page.
    ///
    /// Names read from undecodable bytes return those bytes as they were.
    pub fn to_stored_bytes(&self) -> Result<Vec<u8>> {
        match &self.undecodable {
            Some(bytes) => Ok(bytes.to_vec()),
            None => encode(&self.text),
        }
    }

    /// Consumes the name, returning the inner string.
    pub fn into_string(self) -> String {
        self.text
    }
}

impl fmt::Display for EntryName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl AsRef<str> for EntryName {
    fn as_ref(&self) -> &str {
        &self.text
    }
}

impl TryFrom<&str> for EntryName {
    type Error = Error;

    fn try_from(s: &str) -> Result<Self> {
        Self::new(s)
    }
}
