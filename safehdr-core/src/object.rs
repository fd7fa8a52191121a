use crate::error::Result;
use crate::lexer::{Lexer, Token};
use crate::string::StrView;

/// Parse `{ "key": <value>, ... }` at the cursor.
///
/// Only structure is enforced here: braces, string keys, colons, commas, no
/// trailing comma. For each key `on_value` is called with the cursor on the
/// value and must consume exactly one value; whatever it rejects aborts the
/// whole object.
pub fn parse_object<'a, F>(lex: &mut Lexer<'a>, mut on_value: F) -> Result<()>
where
    F: FnMut(StrView<'a>, &mut Lexer<'a>) -> Result<()>,
{
    lex.expect(Token::OpenBrace, "'{'")?;

    match lex.next_token()? {
        Token::CloseBrace => return Ok(()),
        Token::String(key) => parse_member(lex, key, &mut on_value)?,
        other => return Err(lex.unexpected("string key or '}'", &other)),
    }

    loop {
        match lex.next_token()? {
            Token::Comma => {}
            Token::CloseBrace => return Ok(()),
            other => return Err(lex.unexpected("',' or '}'", &other)),
        }
        let key = lex.expect_string()?;
        parse_member(lex, key, &mut on_value)?;
    }
}

fn parse_member<'a, F>(lex: &mut Lexer<'a>, key: StrView<'a>, on_value: &mut F) -> Result<()>
where
    F: FnMut(StrView<'a>, &mut Lexer<'a>) -> Result<()>,
{
    lex.expect(Token::Colon, "':'")?;
    on_value(key, lex)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ErrorKind, SafehdrError};

    fn collect_int_members(src: &[u8]) -> Result<Vec<(String, u64)>> {
        let mut lex = Lexer::new(src);
        let mut out = Vec::new();
        parse_object(&mut lex, |key, lex| {
            out.push((key.to_string(), lex.expect_integer()?));
            Ok(())
        })?;
        lex.expect_end()?;
        Ok(out)
    }

    #[test]
    fn test_empty_object() {
        assert!(collect_int_members(b"{}").unwrap().is_empty());
        assert!(collect_int_members(b" { \n } ").unwrap().is_empty());
    }

    #[test]
    fn test_members_in_order() {
        let members = collect_int_members(br#"{"b": 2, "a":1 ,"c":3}"#).unwrap();
        assert_eq!(
            members,
            vec![("b".into(), 2), ("a".into(), 1), ("c".into(), 3)]
        );
    }

    #[test]
    fn test_structural_errors() {
        let cases: [&[u8]; 9] = [
            b"{",
            b"}",
            br#"{"a" 1}"#,
            br#"{"a": 1,}"#,
            br#"{"a": 1 "b": 2}"#,
            br#"{a: 1}"#,
            br#"{1: 1}"#,
            br#"{"a": 1]"#,
            br#"["a", 1]"#,
        ];
        for src in cases {
            let err = collect_int_members(src).unwrap_err();
            assert!(
                matches!(err.kind(), ErrorKind::Structural | ErrorKind::Lexical),
                "{:?}: {err}",
                String::from_utf8_lossy(src)
            );
        }
    }

    #[test]
    fn test_handler_error_aborts() {
        let err = collect_int_members(br#"{"a": 1, "b": "two", "c": 3}"#).unwrap_err();
        assert!(matches!(err, SafehdrError::UnexpectedToken { .. }));
    }

    #[test]
    fn test_nested_objects_delegate() {
        let src = br#"{"outer": {"x": 1, "y": 2}, "z": {}}"#;
        let mut lex = Lexer::new(src);
        let mut seen = Vec::new();
        parse_object(&mut lex, |outer, lex| {
            parse_object(lex, |inner, lex| {
                seen.push(format!("{outer}.{inner}={}", lex.expect_integer()?));
                Ok(())
            })
        })
        .unwrap();
        assert_eq!(seen, vec!["outer.x=1", "outer.y=2"]);
    }

    #[test]
    fn test_trailing_content_left_to_caller() {
        let mut lex = Lexer::new(br#"{"a": 1} x"#);
        parse_object(&mut lex, |_, lex| lex.expect_integer().map(|_| ())).unwrap();
        assert!(lex.expect_end().is_err());
    }
}
