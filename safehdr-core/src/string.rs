//! String literal validation.
//!
//! Literals are checked for a well-formed escape grammar and returned as a
//! view over their interior bytes exactly as written. Escapes are never
//! decoded, so nothing is allocated and names compare as raw bytes.

use std::borrow::Cow;
use std::fmt;

use crate::error::Result;
use crate::lexer::Lexer;

/// Zero-copy view of a validated string literal's interior.
///
/// Escape sequences are left intact: the literal `"a\nb"` yields the four
/// bytes `a`, `\`, `n`, `b`.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StrView<'a> {
    bytes: &'a [u8],
}

impl<'a> StrView<'a> {
    pub const fn new(bytes: &'a [u8]) -> Self {
        Self { bytes }
    }

    pub fn as_bytes(&self) -> &'a [u8] {
        self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// The raw bytes as `&str`, if they are valid UTF-8.
    pub fn to_str(&self) -> Option<&'a str> {
        std::str::from_utf8(self.bytes).ok()
    }

    pub fn to_string_lossy(&self) -> Cow<'a, str> {
        String::from_utf8_lossy(self.bytes)
    }

    /// Whether the literal contained any backslash escape.
    pub fn has_escapes(&self) -> bool {
        self.bytes.contains(&b'\\')
    }
}

impl fmt::Debug for StrView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.to_string_lossy())
    }
}

impl fmt::Display for StrView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_string_lossy())
    }
}

impl PartialEq<str> for StrView<'_> {
    fn eq(&self, other: &str) -> bool {
        self.bytes == other.as_bytes()
    }
}

impl PartialEq<&str> for StrView<'_> {
    fn eq(&self, other: &&str) -> bool {
        self.bytes == other.as_bytes()
    }
}

impl PartialEq<[u8]> for StrView<'_> {
    fn eq(&self, other: &[u8]) -> bool {
        self.bytes == other
    }
}

impl PartialEq<&[u8]> for StrView<'_> {
    fn eq(&self, other: &&[u8]) -> bool {
        self.bytes == *other
    }
}

impl AsRef<[u8]> for StrView<'_> {
    fn as_ref(&self) -> &[u8] {
        self.bytes
    }
}

impl<'a> Lexer<'a> {
    /// Validate the string literal starting at the current `"` and return its
    /// interior. The cursor ends just past the closing quote.
    pub fn tokenize_string(&mut self) -> Result<StrView<'a>> {
        if self.peek_byte() != Some(b'"') {
            return Err(self.lexical_error("expected '\"' to open string".into()));
        }
        self.pos += 1;
        let start = self.pos;

        loop {
            let Some(c) = self.peek_byte() else {
                return Err(self.lexical_error("unterminated string".into()));
            };
            self.pos += 1;

            match c {
                b'"' => break,
                b'\\' => self.validate_escape()?,
                c if c.is_ascii_control() => {
                    return Err(self.lexical_error(format!(
                        "raw control byte 0x{c:02x} in string at offset {}",
                        self.offset() - 1
                    )));
                }
                _ => {}
            }
        }

        Ok(StrView::new(&self.src[start..self.pos - 1]))
    }

    /// Called with the cursor just past a backslash.
    fn validate_escape(&mut self) -> Result<()> {
        let Some(c) = self.peek_byte() else {
            return Err(self.lexical_error("trailing backslash in string".into()));
        };
        self.pos += 1;

        match c {
            b'"' | b'\\' | b'/' | b'b' | b'f' | b'n' | b'r' | b't' => Ok(()),
            b'u' => {
                for _ in 0..4 {
                    match self.peek_byte() {
                        Some(h) if h.is_ascii_hexdigit() => self.pos += 1,
                        Some(_) => {
                            return Err(self.lexical_error(
                                "\\u escape needs exactly four hex digits".into(),
                            ));
                        }
                        None => {
                            return Err(self.lexical_error("truncated \\u escape".into()));
                        }
                    }
                }
                Ok(())
            }
            other => Err(self.lexical_error(format!(
                "invalid escape '\\{}'",
                std::ascii::escape_default(other)
            ))),
        }
    }
}
