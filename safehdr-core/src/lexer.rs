use crate::error::{Result, SafehdrError};
use crate::string::StrView;

/// One lexical token of the header grammar.
///
/// Strings are zero-copy views into the input; there are no float, boolean or
/// null tokens because the header format never uses them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'a> {
    OpenBrace,
    CloseBrace,
    OpenBracket,
    CloseBracket,
    Colon,
    Comma,
    Integer(u64),
    String(StrView<'a>),
    /// Only whitespace (or nothing) remains.
    EndOfInput,
}

impl Token<'_> {
    /// Short human-readable rendering for error messages.
    pub fn describe(&self) -> String {
        match self {
            Token::OpenBrace => "'{'".into(),
            Token::CloseBrace => "'}'".into(),
            Token::OpenBracket => "'['".into(),
            Token::CloseBracket => "']'".into(),
            Token::Colon => "':'".into(),
            Token::Comma => "','".into(),
            Token::Integer(v) => format!("integer {v}"),
            Token::String(s) => format!("string {s:?}"),
            Token::EndOfInput => "end of header".into(),
        }
    }
}

/// Bounds-checked cursor over the header bytes.
///
/// Offsets reported in errors are absolute: `base` is the position of `src`
/// inside the whole file, so a header lexer built by the loader uses `base = 8`.
#[derive(Debug, Clone)]
pub struct Lexer<'a> {
    pub(crate) src: &'a [u8],
    pub(crate) pos: usize,
    base: usize,
    token_start: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(src: &'a [u8]) -> Self {
        Self::with_base(src, 0)
    }

    pub fn with_base(src: &'a [u8], base: usize) -> Self {
        Self {
            src,
            pos: 0,
            base,
            token_start: 0,
        }
    }

    /// Absolute offset of the next unread byte.
    pub fn offset(&self) -> usize {
        self.base + self.pos
    }

    /// Absolute offset where the most recently returned token began.
    pub fn token_offset(&self) -> usize {
        self.base + self.token_start
    }

    pub(crate) fn position(&self) -> usize {
        self.pos
    }

    pub(crate) fn restore(&mut self, pos: usize) {
        self.pos = pos;
    }

    pub(crate) fn peek_byte(&self) -> Option<u8> {
        self.src.get(self.pos).copied()
    }

    fn skip_whitespace(&mut self) {
        while let Some(b' ' | b'\n' | b'\r' | b'\t') = self.peek_byte() {
            self.pos += 1;
        }
    }

    /// Produce the next token, or [`Token::EndOfInput`] once only whitespace
    /// remains. Calling again after end of input keeps returning it.
    pub fn next_token(&mut self) -> Result<Token<'a>> {
        self.skip_whitespace();
        self.token_start = self.pos;

        let Some(c) = self.peek_byte() else {
            return Ok(Token::EndOfInput);
        };

        let punct = match c {
            b'{' => Some(Token::OpenBrace),
            b'}' => Some(Token::CloseBrace),
            b'[' => Some(Token::OpenBracket),
            b']' => Some(Token::CloseBracket),
            b':' => Some(Token::Colon),
            b',' => Some(Token::Comma),
            _ => None,
        };
        if let Some(tok) = punct {
            self.pos += 1;
            return Ok(tok);
        }

        match c {
            b'0'..=b'9' => self.tokenize_integer().map(Token::Integer),
            b'"' => self.tokenize_string().map(Token::String),
            other => Err(self.lexical_error(format!(
                "unexpected byte '{}'",
                std::ascii::escape_default(other)
            ))),
        }
    }

    /// A `0` is a complete integer on its own; otherwise the longest digit
    /// run is taken. Values above `u64::MAX` are rejected, not wrapped.
    fn tokenize_integer(&mut self) -> Result<u64> {
        if self.peek_byte() == Some(b'0') {
            self.pos += 1;
            return Ok(0);
        }

        let mut value: u64 = 0;
        while let Some(c @ b'0'..=b'9') = self.peek_byte() {
            value = value
                .checked_mul(10)
                .and_then(|v| v.checked_add(u64::from(c - b'0')))
                .ok_or_else(|| self.lexical_error("integer overflows u64".into()))?;
            self.pos += 1;
        }
        Ok(value)
    }

    pub(crate) fn lexical_error(&self, reason: String) -> SafehdrError {
        SafehdrError::Lexical {
            offset: self.token_offset(),
            reason,
        }
    }

    pub(crate) fn unexpected(&self, expected: &'static str, found: &Token<'_>) -> SafehdrError {
        SafehdrError::UnexpectedToken {
            offset: self.token_offset(),
            expected,
            found: found.describe(),
        }
    }

    /// Consume one token and require it to equal `want`.
    pub fn expect(&mut self, want: Token<'static>, expected: &'static str) -> Result<()> {
        let tok = self.next_token()?;
        if tok == want {
            Ok(())
        } else {
            Err(self.unexpected(expected, &tok))
        }
    }

    pub fn expect_integer(&mut self) -> Result<u64> {
        match self.next_token()? {
            Token::Integer(v) => Ok(v),
            other => Err(self.unexpected("integer", &other)),
        }
    }

    pub fn expect_string(&mut self) -> Result<StrView<'a>> {
        match self.next_token()? {
            Token::String(s) => Ok(s),
            other => Err(self.unexpected("string", &other)),
        }
    }

    /// Require that nothing but whitespace is left.
    pub fn expect_end(&mut self) -> Result<()> {
        self.expect(Token::EndOfInput, "end of header")
    }
}
