//! Path representation for addressing fields inside a form document.
//!
//! A path is the only thing a rendered control knows about its location: a
//! sequence of object keys and array indices, starting at the document root.

use crate::{StateError, StateResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Peekable;
use std::str::{Chars, FromStr};

/// One step of a [`Path`].
///
/// Serialized untagged, so a path is written as `["items", 0, "title"]`.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Seg {
    Key(String),
    Index(usize),
}

/// Keys that are written bare in the dotted form. Anything else is written
/// as a bracketed JSON string, e.g. `["a.b"]`.
fn is_plain_key(key: &str) -> bool {
    !key.is_empty()
        && !key.starts_with('$')
        && !key.chars().any(|c| matches!(c, '.' | '[' | ']' | '"' | '\\'))
}

impl fmt::Display for Seg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Seg::Key(k) if is_plain_key(k) => f.write_str(k),
            Seg::Key(k) => {
                let quoted = serde_json::to_string(k).map_err(|_| fmt::Error)?;
                write!(f, "[{quoted}]")
            }
            Seg::Index(i) => write!(f, "[{i}]"),
        }
    }
}

impl From<String> for Seg {
    fn from(key: String) -> Self {
        Seg::Key(key)
    }
}

impl From<&str> for Seg {
    fn from(key: &str) -> Self {
        Seg::Key(key.to_owned())
    }
}

impl From<usize> for Seg {
    fn from(index: usize) -> Self {
        Seg::Index(index)
    }
}

/// A location inside a form document.
///
/// Paths are values: controls copy them around freely and never hold a
/// reference into the document itself.
///
/// # Examples
///
/// ```
/// use schemaform_state::Path;
///
/// let path = Path::root().key("users").index(0).key("name");
/// assert_eq!(path.len(), 3);
/// assert_eq!(path.to_string(), "users[0].name");
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Path(Vec<Seg>);

impl Path {
    #[inline]
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// `self` extended by an object key.
    #[inline]
    #[must_use]
    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.push_key(key);
        self
    }

    /// `self` extended by an array index.
    #[inline]
    #[must_use]
    pub fn index(mut self, index: usize) -> Self {
        self.0.push(Seg::Index(index));
        self
    }

    #[inline]
    pub fn push(&mut self, seg: Seg) {
        self.0.push(seg);
    }

    #[inline]
    pub fn push_key(&mut self, key: impl Into<String>) {
        self.0.push(Seg::Key(key.into()));
    }

    #[inline]
    pub fn segments(&self) -> &[Seg] {
        &self.0
    }

    /// True for the root path.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn last(&self) -> Option<&Seg> {
        self.0.last()
    }

    /// A child of this path; `self` is left as is.
    pub fn with_segment(&self, seg: impl Into<Seg>) -> Path {
        let mut child = Vec::with_capacity(self.0.len() + 1);
        child.extend_from_slice(&self.0);
        child.push(seg.into());
        Path(child)
    }

    /// The path without its last segment.
    ///
    /// Paths of length 0 or 1 have the root as parent.
    pub fn parent_path(&self) -> Path {
        match self.0.split_last() {
            Some((_, rest)) => Path(rest.to_vec()),
            None => Path::root(),
        }
    }

    /// Prefix test on whole segments. Every path starts with the root.
    #[inline]
    pub fn starts_with(&self, prefix: &Path) -> bool {
        self.0.starts_with(&prefix.0)
    }

    /// The first `len` segments, or the whole path if it is shorter.
    pub fn prefix(&self, len: usize) -> Path {
        Path(self.0[..len.min(self.0.len())].to_vec())
    }

    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, Seg> {
        self.0.iter()
    }
}

/// Dotted form: `user.name`, `items[0].title`, `meta["a.b"]`. The root
/// renders as `""`. Parsing the output gives back the same path.
impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, seg) in self.0.iter().enumerate() {
            if i > 0 && matches!(seg, Seg::Key(k) if is_plain_key(k)) {
                f.write_str(".")?;
            }
            write!(f, "{seg}")?;
        }
        Ok(())
    }
}

/// Parse the dotted form produced by `Display`.
///
/// A leading `.` or `$` is accepted so validator-style (`.user.name`) and
/// root-anchored (`$.user.name`) spellings parse to the same path.
impl FromStr for Path {
    type Err = StateError;

    fn from_str(s: &str) -> StateResult<Self> {
        let rest = s.strip_prefix('$').unwrap_or(s);
        let mut path = Path::root();
        let mut key = String::new();
        let mut chars = rest.chars().peekable();

        while let Some(c) = chars.next() {
            match c {
                '.' => {
                    if !key.is_empty() {
                        path.push(Seg::Key(std::mem::take(&mut key)));
                    }
                }
                '[' => {
                    if !key.is_empty() {
                        path.push(Seg::Key(std::mem::take(&mut key)));
                    }
                    if chars.peek() == Some(&'"') {
                        path.push(Seg::Key(parse_quoted_key(s, &mut chars)?));
                        continue;
                    }
                    let mut digits = String::new();
                    loop {
                        match chars.next() {
                            Some(']') => break,
                            Some(d) => digits.push(d),
                            None => {
                                return Err(StateError::invalid_path(s, "unterminated index"));
                            }
                        }
                    }
                    let index = digits
                        .trim()
                        .parse::<usize>()
                        .map_err(|_| StateError::invalid_path(s, "index is not a number"))?;
                    path.push(Seg::Index(index));
                }
                ']' => return Err(StateError::invalid_path(s, "unexpected `]`")),
                other => key.push(other),
            }
        }
        if !key.is_empty() {
            path.push(Seg::Key(key));
        }
        Ok(path)
    }
}

/// Read a `"..."]` tail: a JSON string literal followed by the closing
/// bracket.
fn parse_quoted_key(input: &str, chars: &mut Peekable<Chars<'_>>) -> StateResult<String> {
    let mut literal = String::new();
    let mut escaped = false;
    let mut closed = false;
    // opening quote
    if let Some(c) = chars.next() {
        literal.push(c);
    }
    for c in chars.by_ref() {
        literal.push(c);
        match c {
            _ if escaped => escaped = false,
            '\\' => escaped = true,
            '"' => {
                closed = true;
                break;
            }
            _ => {}
        }
    }
    if !closed || chars.next() != Some(']') {
        return Err(StateError::invalid_path(input, "unterminated quoted key"));
    }
    serde_json::from_str(&literal).map_err(|_| StateError::invalid_path(input, "malformed quoted key"))
}

impl FromIterator<Seg> for Path {
    fn from_iter<I: IntoIterator<Item = Seg>>(iter: I) -> Self {
        Path(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Path {
    type Item = &'a Seg;
    type IntoIter = std::slice::Iter<'a, Seg>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl std::ops::Index<usize> for Path {
    type Output = Seg;

    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}

/// Build a [`Path`] from literals: strings are keys, integers are indices.
///
/// ```
/// use schemaform_state::path;
///
/// assert_eq!(path!("items", 0, "name").to_string(), "items[0].name");
/// assert!(path!().is_empty());
/// ```
#[macro_export]
macro_rules! path {
    () => {
        $crate::Path::root()
    };
    ($($seg:expr),+ $(,)?) => {{
        let mut path = $crate::Path::root();
        $(
            path.push($crate::Seg::from($seg));
        )+
        path
    }};
}
