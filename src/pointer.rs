//! JSON pointers addressing fields inside an event.
//!
//! A pointer is written either bare (`/status/code`) or quoted
//! (`"/people are\// here"`). The quoted form allows any character in a
//! segment: `\/` is a slash that belongs to the segment, `\\` is a backslash
//! and `\"` a quote. Both forms normalize to the same list of segments, and
//! [`JsonPointer`]'s `Display` always picks the shortest form that reads back
//! to those segments, so normalization is idempotent.

use std::fmt;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PointerError {
    #[error("JSON pointer must start with '/', got {0:?}")]
    MissingLeadingSlash(String),
}

/// A normalized JSON pointer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JsonPointer {
    segments: Vec<String>,
}

impl JsonPointer {
    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        JsonPointer {
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }

    /// Parse pointer text in either the bare or the quoted form.
    pub fn parse(text: &str) -> Result<Self, PointerError> {
        let inner = match text.strip_prefix('"').and_then(|t| t.strip_suffix('"')) {
            Some(inner) => inner,
            None => text,
        };
        Self::from_escaped(inner)
    }

    /// Build a pointer from its unquoted body, resolving backslash escapes.
    pub(crate) fn from_escaped(body: &str) -> Result<Self, PointerError> {
        let mut chars = body.chars();
        if chars.next() != Some('/') {
            return Err(PointerError::MissingLeadingSlash(body.to_string()));
        }

        let mut segments = vec![];
        let mut current = String::new();

        while let Some(ch) = chars.next() {
            match ch {
                '/' => segments.push(std::mem::take(&mut current)),
                '\\' => match chars.next() {
                    Some(esc @ ('/' | '\\' | '"')) => current.push(esc),
                    Some(other) => {
                        current.push('\\');
                        current.push(other);
                    }
                    None => current.push('\\'),
                },
                _ => current.push(ch),
            }
        }
        segments.push(current);

        Ok(JsonPointer { segments })
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// True when the pointer can be written without quotes.
    pub fn is_bare(&self) -> bool {
        self.segments
            .iter()
            .all(|segment| segment.chars().all(is_bare_char))
    }
}

/// Normalize pointer text: strip quotes, collapse escapes, re-render.
///
/// ```
/// use prepper_expression::pointer::normalize;
///
/// assert_eq!(normalize("\"/a/b\"").unwrap(), "/a/b");
/// assert_eq!(normalize("/a/b").unwrap(), "/a/b");
/// ```
pub fn normalize(text: &str) -> Result<String, PointerError> {
    JsonPointer::parse(text).map(|p| p.to_string())
}

/// Characters allowed in a bare pointer segment.
pub(crate) fn is_bare_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || matches!(ch, '_' | '-' | '.' | '@' | '~')
}

impl fmt::Display for JsonPointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_bare() {
            for segment in &self.segments {
                write!(f, "/{}", segment)?;
            }
            return Ok(());
        }

        f.write_str("\"")?;
        for segment in &self.segments {
            f.write_str("/")?;
            for ch in segment.chars() {
                match ch {
                    '/' => f.write_str("\\/")?,
                    '\\' => f.write_str("\\\\")?,
                    '"' => f.write_str("\\\"")?,
                    _ => write!(f, "{}", ch)?,
                }
            }
        }
        f.write_str("\"")
    }
}
