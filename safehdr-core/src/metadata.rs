use crate::error::{Result, SafehdrError};
use crate::lexer::{Lexer, Token};
use crate::object::parse_object;
use crate::string::StrView;

/// One `"key": "value"` pair from the `__metadata__` object, both undecoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetadataRecord<'a> {
    pub key: StrView<'a>,
    pub value: StrView<'a>,
}

/// Parse the value of one metadata entry. Only a string literal is accepted.
pub fn parse_metadata_entry<'a>(
    key: StrView<'a>,
    lex: &mut Lexer<'a>,
) -> Result<MetadataRecord<'a>> {
    match lex.next_token()? {
        Token::String(value) => Ok(MetadataRecord { key, value }),
        Token::EndOfInput => Err(lex.unexpected("string", &Token::EndOfInput)),
        other => Err(SafehdrError::MetadataTypeMismatch {
            key: key.to_string(),
            expected: "string",
            got: other.describe(),
        }),
    }
}

/// Parse a whole metadata object, appending entries to `out` in header order.
/// Duplicate keys are kept as separate entries.
pub fn parse_metadata<'a>(lex: &mut Lexer<'a>, out: &mut Vec<MetadataRecord<'a>>) -> Result<()> {
    parse_object(lex, |key, lex| {
        out.push(parse_metadata_entry(key, lex)?);
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn parse(src: &[u8]) -> Result<Vec<MetadataRecord<'_>>> {
        let mut lex = Lexer::new(src);
        let mut out = Vec::new();
        parse_metadata(&mut lex, &mut out)?;
        lex.expect_end()?;
        Ok(out)
    }

    fn pairs(records: &[MetadataRecord<'_>]) -> Vec<(String, String)> {
        records
            .iter()
            .map(|m| (m.key.to_string(), m.value.to_string()))
            .collect()
    }

    #[test]
    fn test_parse_metadata() {
        assert!(parse(b"{}").unwrap().is_empty());

        let records = parse(br#"{"n_layer": "256"}"#).unwrap();
        assert_eq!(pairs(&records), vec![("n_layer".into(), "256".into())]);

        let records = parse(br#"{"n_layer": "256", "d_model": "10000"}"#).unwrap();
        assert_eq!(
            pairs(&records),
            vec![
                ("n_layer".into(), "256".into()),
                ("d_model".into(), "10000".into())
            ]
        );
    }

    #[test]
    fn test_duplicate_keys_are_kept() {
        let records = parse(br#"{"k": "a", "k": "b"}"#).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].value, "a");
        assert_eq!(records[1].value, "b");
    }

    #[test]
    fn test_values_stay_undecoded() {
        let records = parse(br#"{"quote": "say \"hi\"\n"}"#).unwrap();
        assert_eq!(records[0].value, r#"say \"hi\"\n"#);
    }

    #[test]
    fn test_non_string_values_rejected() {
        let cases: [&[u8]; 3] = [
            br#"{"n_layer": 256}"#,
            br#"{"n_layer": ["256"]}"#,
            br#"{"n_layer": {"a": "b"}}"#,
        ];
        for src in cases {
            let err = parse(src).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Schema, "{err}");
            assert!(matches!(err, SafehdrError::MetadataTypeMismatch { .. }));
        }
    }

    #[test]
    fn test_malformed_metadata_rejected() {
        let cases: [&[u8]; 3] = [
            b"{",
            br#"{"n_layer": "256", d_model: "10000"}"#,
            br#"{"n_layer": }"#,
        ];
        for src in cases {
            assert!(parse(src).is_err());
        }
    }
}
