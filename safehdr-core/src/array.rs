//! `[u64, u64, ...]` arrays, parsed in two passes: count, then fill.
//!
//! The count pass lets the caller size storage exactly before anything is
//! written, so shape vectors are allocated once and never grow.

use crate::error::{Result, SafehdrError};
use crate::lexer::{Lexer, Token};

/// Count the elements of the array at the cursor without keeping them.
///
/// The cursor is restored to where it was on entry, success or not, so the
/// same span can be traversed again by [`parse_array`].
pub fn array_length(lex: &mut Lexer<'_>) -> Result<usize> {
    let start = lex.position();
    let result = count_elements(lex);
    lex.restore(start);
    result
}

fn count_elements(lex: &mut Lexer<'_>) -> Result<usize> {
    lex.expect(Token::OpenBracket, "'['")?;

    let mut len = match lex.next_token()? {
        Token::CloseBracket => return Ok(0),
        Token::Integer(_) => 1,
        other => return Err(lex.unexpected("integer or ']'", &other)),
    };

    loop {
        match lex.next_token()? {
            Token::Comma => {}
            Token::CloseBracket => return Ok(len),
            other => return Err(lex.unexpected("',' or ']'", &other)),
        }
        lex.expect_integer()?;
        len += 1;
    }
}

/// Parse the array at the cursor into `out`, which must hold exactly as many
/// elements as the array has. Contents of `out` are unspecified on error.
pub fn parse_array(lex: &mut Lexer<'_>, out: &mut [u64]) -> Result<()> {
    let start = lex.position();
    lex.expect(Token::OpenBracket, "'['")?;

    for i in 0..out.len() {
        if i > 0 {
            match lex.next_token()? {
                Token::Comma => {}
                Token::CloseBracket => return Err(length_mismatch(lex, start, out.len())),
                other => return Err(lex.unexpected("','", &other)),
            }
        }
        match lex.next_token()? {
            Token::Integer(v) => out[i] = v,
            Token::CloseBracket if i == 0 => {
                return Err(length_mismatch(lex, start, out.len()));
            }
            other => return Err(lex.unexpected("integer", &other)),
        }
    }

    match lex.next_token()? {
        Token::CloseBracket => Ok(()),
        Token::Comma | Token::Integer(_) => Err(length_mismatch(lex, start, out.len())),
        other => Err(lex.unexpected("']'", &other)),
    }
}

/// Both passes back to back: returns a vector whose length is always what
/// [`array_length`] reports for the same span.
pub fn parse_array_vec(lex: &mut Lexer<'_>) -> Result<Vec<u64>> {
    let len = array_length(lex)?;
    let mut values = vec![0u64; len];
    parse_array(lex, &mut values)?;
    Ok(values)
}

/// Re-count from the array start to report the real length. If the array
/// turns out to be malformed further on, that grammar error wins.
fn length_mismatch(lex: &mut Lexer<'_>, start: usize, expected: usize) -> SafehdrError {
    lex.restore(start);
    let offset = lex.offset();
    match array_length(lex) {
        Ok(found) => SafehdrError::ArrayLengthMismatch {
            offset,
            expected,
            found,
        },
        Err(e) => e,
    }
}
