use thiserror::Error;

/// Where a failure originated. Every [`SafehdrError`] maps to exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Input too short, header length past end of file, or a tensor byte
    /// range past the end of the data section.
    Truncation,
    /// Unrecognized byte, malformed string literal, integer overflow.
    Lexical,
    /// Wrong delimiter, missing colon/comma, trailing comma, element-count
    /// mismatch, unexpected end of header.
    Structural,
    /// Missing/duplicate/unknown tensor field, unknown dtype, non-string
    /// metadata value.
    Schema,
    /// Tensor byte lengths that disagree with shape and dtype, or overlap.
    Layout,
    /// A declared size exceeded a configured limit.
    Limit,
    /// Opening or mapping the file failed.
    Io,
}

#[derive(Error, Debug)]
pub enum SafehdrError {
    #[error("file too small: {len} bytes, need at least 8")]
    FileTooSmall { len: u64 },

    #[error("header length {header_len} exceeds remaining file size {available}")]
    HeaderOutOfBounds { header_len: u64, available: u64 },

    #[error("header too large: {len} bytes, max {max} bytes")]
    HeaderTooLarge { len: u64, max: u64 },

    #[error(
        "tensor '{name}' data range [{start}, {end}) exceeds data section of {data_len} bytes"
    )]
    TensorOutOfBounds {
        name: String,
        start: u64,
        end: u64,
        data_len: u64,
    },

    #[error("lexical error at offset {offset}: {reason}")]
    Lexical { offset: usize, reason: String },

    #[error("unexpected {found} at offset {offset}, expected {expected}")]
    UnexpectedToken {
        offset: usize,
        expected: &'static str,
        found: String,
    },

    #[error("array at offset {offset} has {found} elements, expected {expected}")]
    ArrayLengthMismatch {
        offset: usize,
        expected: usize,
        found: usize,
    },

    #[error("tensor '{tensor}' is missing field '{field}'")]
    MissingField { tensor: String, field: &'static str },

    #[error("tensor '{tensor}' has duplicate field '{field}'")]
    DuplicateField { tensor: String, field: &'static str },

    #[error("tensor '{tensor}' has unknown field '{field}'")]
    UnknownField { tensor: String, field: String },

    #[error("tensor '{tensor}' has unknown dtype '{dtype}'")]
    UnknownDtype { tensor: String, dtype: String },

    #[error("tensor '{tensor}' has inverted data offsets [{start}, {end}]")]
    InvertedOffsets { tensor: String, start: u64, end: u64 },

    #[error("metadata key '{key}' has unexpected type: expected {expected}, got {got}")]
    MetadataTypeMismatch {
        key: String,
        expected: &'static str,
        got: String,
    },

    #[error("tensor '{name}' holds {actual} bytes, shape and dtype require {expected}")]
    TensorSizeMismatch {
        name: String,
        expected: u64,
        actual: u64,
    },

    #[error("tensor '{name}' has invalid shape: {reason}")]
    InvalidTensorShape { name: String, reason: String },

    #[error(
        "overlapping tensors: '{first}' [{first_start}..{first_end}] overlaps '{second}' [{second_start}..]"
    )]
    OverlappingTensors {
        first: String,
        first_start: usize,
        first_end: usize,
        second: String,
        second_start: usize,
    },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl SafehdrError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SafehdrError::FileTooSmall { .. }
            | SafehdrError::HeaderOutOfBounds { .. }
            | SafehdrError::TensorOutOfBounds { .. } => ErrorKind::Truncation,
            SafehdrError::HeaderTooLarge { .. } => ErrorKind::Limit,
            SafehdrError::Lexical { .. } => ErrorKind::Lexical,
            SafehdrError::UnexpectedToken { .. } | SafehdrError::ArrayLengthMismatch { .. } => {
                ErrorKind::Structural
            }
            SafehdrError::MissingField { .. }
            | SafehdrError::DuplicateField { .. }
            | SafehdrError::UnknownField { .. }
            | SafehdrError::UnknownDtype { .. }
            | SafehdrError::InvertedOffsets { .. }
            | SafehdrError::MetadataTypeMismatch { .. } => ErrorKind::Schema,
            SafehdrError::TensorSizeMismatch { .. }
            | SafehdrError::InvalidTensorShape { .. }
            | SafehdrError::OverlappingTensors { .. } => ErrorKind::Layout,
            SafehdrError::Io(_) => ErrorKind::Io,
        }
    }
}

pub type Result<T> = std::result::Result<T, SafehdrError>;
