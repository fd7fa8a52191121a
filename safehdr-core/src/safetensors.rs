use crate::error::{Result, SafehdrError};
use crate::header::{Header, LEN_PREFIX};
use crate::lexer::Lexer;
use crate::metadata::parse_metadata;
use crate::object::parse_object;
use crate::tensor::parse_tensor;

pub const DEFAULT_MAX_HEADER_LEN: u64 = 100 * 1024 * 1024; // 100MB header cap

/// Reserved top-level key whose value is a string -> string object.
pub const METADATA_KEY: &[u8] = b"__metadata__";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParserConfig {
    /// Largest declared header length accepted before any parsing starts.
    pub max_header_len: u64,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            max_header_len: DEFAULT_MAX_HEADER_LEN,
        }
    }
}

pub struct SafetensorsParser {
    config: ParserConfig,
}

impl SafetensorsParser {
    pub fn new() -> Self {
        Self::with_config(ParserConfig::default())
    }

    pub fn with_config(config: ParserConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Parse and validate the header at the start of `buf`.
    ///
    /// Either every tensor and metadata entry is valid and a [`Header`] is
    /// returned, or nothing is: records parsed before a failure are dropped.
    pub fn parse_bytes<'a>(&self, buf: &'a [u8]) -> Result<Header<'a>> {
        // 1. length prefix
        if buf.len() < LEN_PREFIX {
            return Err(SafehdrError::FileTooSmall {
                len: buf.len() as u64,
            });
        }
        let mut prefix = [0u8; LEN_PREFIX];
        prefix.copy_from_slice(&buf[..LEN_PREFIX]);
        let declared = u64::from_le_bytes(prefix);

        // 2. the header must fit in the file, and under the configured cap
        let available = (buf.len() - LEN_PREFIX) as u64;
        if declared > available {
            return Err(SafehdrError::HeaderOutOfBounds {
                header_len: declared,
                available,
            });
        }
        self.validate_header_size(declared)?;

        // declared <= available, so this fits in usize
        let header_len = declared as usize;
        let data_start = LEN_PREFIX + header_len;
        let header_span = &buf[LEN_PREFIX..data_start];
        let data_section = &buf[data_start..];

        // 3. top-level object: __metadata__ or one tensor per key
        let mut tensors = Vec::new();
        let mut metadata = Vec::new();
        let mut lex = Lexer::with_base(header_span, LEN_PREFIX);
        parse_object(&mut lex, |key, lex| {
            if key == METADATA_KEY {
                parse_metadata(lex, &mut metadata)
            } else {
                tensors.push(parse_tensor(key, lex, data_section)?);
                Ok(())
            }
        })?;
        lex.expect_end()?;

        tracing::debug!(
            tensors = tensors.len(),
            metadata = metadata.len(),
            header_len,
            data_len = data_section.len(),
            "parsed safetensors header"
        );

        Ok(Header::new(buf, header_len, tensors, metadata))
    }

    fn validate_header_size(&self, size: u64) -> Result<()> {
        if size > self.config.max_header_len {
            return Err(SafehdrError::HeaderTooLarge {
                len: size,
                max: self.config.max_header_len,
            });
        }
        Ok(())
    }
}

impl Default for SafetensorsParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse `buf` with the default configuration.
pub fn open(buf: &[u8]) -> Result<Header<'_>> {
    SafetensorsParser::new().parse_bytes(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dtype::DType;
    use crate::error::ErrorKind;

    fn frame(json: &[u8], data_len: usize) -> Vec<u8> {
        let mut buf = Vec::new();
        buf.extend_from_slice(&(json.len() as u64).to_le_bytes());
        buf.extend_from_slice(json);
        buf.extend(vec![0u8; data_len]);
        buf
    }

    const TWO_TENSORS: &[u8] = br#"{"attention":{"dtype":"F32","shape":[100,256,3],"data_offsets":[0,307200]},"embedding":{"dtype":"F32","shape":[5000],"data_offsets":[307200,327200]}}"#;

    #[test]
    fn test_parse_empty_header() {
        let buf = frame(b"{}", 0);
        let header = open(&buf).unwrap();
        assert!(header.tensors().is_empty());
        assert!(header.metadata().is_empty());
        assert!(header.data().is_empty());
    }

    #[test]
    fn test_parse_two_tensors() {
        let buf = frame(TWO_TENSORS, 327200);
        let header = open(&buf).unwrap();
        let tensors = header.tensors();
        assert_eq!(tensors.len(), 2);
        assert_eq!(tensors[0].name, "attention");
        assert_eq!(tensors[0].shape, vec![100, 256, 3]);
        assert_eq!(tensors[1].name, "embedding");
        assert_eq!(tensors[1].dtype, DType::F32);
        assert_eq!(tensors[1].data_offset, 307200);
        assert_eq!(tensors[1].data_len, 20000);
        assert!(header.check_layout().is_ok());
    }

    #[test]
    fn test_parse_with_metadata_and_padding() {
        let mut json = br#"{"__metadata__":{"format":"pt"},"x":{"dtype":"BOOL","shape":[3],"data_offsets":[0,3]}}"#.to_vec();
        // writers pad the header with spaces to an 8-byte boundary
        while json.len() % 8 != 0 {
            json.push(b' ');
        }
        let buf = frame(&json, 3);
        let header = open(&buf).unwrap();
        assert_eq!(header.tensors().len(), 1);
        assert_eq!(header.metadata().len(), 1);
        assert_eq!(header.data_start() % 8, 0);
    }

    #[test]
    fn test_reject_missing_leading_brace() {
        let buf = frame(&TWO_TENSORS[1..], 327200);
        let err = open(&buf).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Structural);
    }

    #[test]
    fn test_reject_header_longer_than_file() {
        let mut buf = frame(TWO_TENSORS, 0);
        buf[..8].copy_from_slice(&10000u64.to_le_bytes());
        let err = open(&buf).unwrap_err();
        assert!(matches!(
            err,
            SafehdrError::HeaderOutOfBounds {
                header_len: 10000,
                ..
            }
        ));

        let mut buf = frame(b"{}", 0);
        buf[..8].copy_from_slice(&u64::MAX.to_le_bytes());
        assert_eq!(open(&buf).unwrap_err().kind(), ErrorKind::Truncation);
    }

    #[test]
    fn test_reject_truncated_file() {
        for len in 0..8 {
            let buf = vec![0u8; len];
            let err = open(&buf).unwrap_err();
            assert!(matches!(err, SafehdrError::FileTooSmall { .. }));
        }
    }

    #[test]
    fn test_reject_tensor_past_data_section() {
        let buf = frame(TWO_TENSORS, 327199);
        let err = open(&buf).unwrap_err();
        assert!(matches!(
            err,
            SafehdrError::TensorOutOfBounds { ref name, .. } if name == "embedding"
        ));
    }

    #[test]
    fn test_reject_trailing_garbage() {
        let buf = frame(br#"{} {}"#, 0);
        assert_eq!(open(&buf).unwrap_err().kind(), ErrorKind::Structural);
    }

    #[test]
    fn test_empty_header_span() {
        let buf = frame(b"", 0);
        assert_eq!(open(&buf).unwrap_err().kind(), ErrorKind::Structural);
    }

    #[test]
    fn test_error_offsets_are_absolute() {
        let buf = frame(br#"{"a": 1}"#, 0);
        // tensor parser wants '{' at byte 8 + 6
        let err = open(&buf).unwrap_err();
        assert!(matches!(
            err,
            SafehdrError::UnexpectedToken { offset: 14, .. }
        ));
    }

    #[test]
    fn test_header_cap() {
        let buf = frame(TWO_TENSORS, 327200);
        let parser = SafetensorsParser::with_config(ParserConfig { max_header_len: 16 });
        let err = parser.parse_bytes(&buf).unwrap_err();
        assert!(matches!(err, SafehdrError::HeaderTooLarge { max: 16, .. }));
        assert_eq!(err.kind(), ErrorKind::Limit);
        assert_eq!(parser.config().max_header_len, 16);
        assert_eq!(
            SafetensorsParser::default().config().max_header_len,
            DEFAULT_MAX_HEADER_LEN
        );
    }

    #[test]
    fn test_metadata_key_routes_only_exact_match() {
        // "__metadata__ " is an ordinary tensor name and must be a tensor object
        let buf = frame(br#"{"__metadata__ ": {"a": "b"}}"#, 0);
        assert_eq!(open(&buf).unwrap_err().kind(), ErrorKind::Schema);
    }

    #[test]
    fn test_any_failure_returns_no_header() {
        let buf = frame(
            br#"{"ok": {"dtype": "U8", "shape": [1], "data_offsets": [0, 1]}, "__metadata__": {"k": "v"}, "bad": {"dtype": "U8"}}"#,
            1,
        );
        assert!(open(&buf).is_err());
    }
}
