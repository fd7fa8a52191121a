use serde::{Deserialize, Serialize};

/// Tensor element types a safetensors header may name.
///
/// Discriminants are the stable numeric codes exposed by [`DType::code`].
/// The wire representation is the exact upper-case string in [`DTYPE_TABLE`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u32)]
#[allow(non_camel_case_types)]
pub enum DType {
    #[serde(rename = "BOOL")]
    Bool = 0,
    U8 = 1,
    I8 = 2,
    F8_E5M2 = 3,
    F8_E4M3 = 4,
    I16 = 5,
    U16 = 6,
    F16 = 7,
    BF16 = 8,
    I32 = 9,
    U32 = 10,
    F32 = 11,
    F64 = 12,
    I64 = 13,
    U64 = 14,
}

/// Wire name -> dtype. Matched by exact byte equality, no case folding.
pub const DTYPE_TABLE: &[(&[u8], DType)] = &[
    (b"BOOL", DType::Bool),
    (b"U8", DType::U8),
    (b"I8", DType::I8),
    (b"F8_E5M2", DType::F8_E5M2),
    (b"F8_E4M3", DType::F8_E4M3),
    (b"I16", DType::I16),
    (b"U16", DType::U16),
    (b"F16", DType::F16),
    (b"BF16", DType::BF16),
    (b"I32", DType::I32),
    (b"U32", DType::U32),
    (b"F32", DType::F32),
    (b"F64", DType::F64),
    (b"I64", DType::I64),
    (b"U64", DType::U64),
];

impl DType {
    /// Resolve a raw (undecoded) string literal against [`DTYPE_TABLE`].
    pub fn from_name(name: &[u8]) -> Option<DType> {
        DTYPE_TABLE
            .iter()
            .find(|(wire, _)| *wire == name)
            .map(|&(_, dtype)| dtype)
    }

    pub fn name(&self) -> &'static str {
        match self {
            DType::Bool => "BOOL",
            DType::U8 => "U8",
            DType::I8 => "I8",
            DType::F8_E5M2 => "F8_E5M2",
            DType::F8_E4M3 => "F8_E4M3",
            DType::I16 => "I16",
            DType::U16 => "U16",
            DType::F16 => "F16",
            DType::BF16 => "BF16",
            DType::I32 => "I32",
            DType::U32 => "U32",
            DType::F32 => "F32",
            DType::F64 => "F64",
            DType::I64 => "I64",
            DType::U64 => "U64",
        }
    }

    pub fn code(&self) -> u32 {
        *self as u32
    }

    pub fn from_code(code: u32) -> Option<DType> {
        DTYPE_TABLE
            .iter()
            .map(|&(_, dtype)| dtype)
            .find(|dtype| dtype.code() == code)
    }

    /// Size in bytes of one element.
    pub fn size_in_bytes(&self) -> usize {
        match self {
            DType::Bool | DType::U8 | DType::I8 | DType::F8_E5M2 | DType::F8_E4M3 => 1,
            DType::I16 | DType::U16 | DType::F16 | DType::BF16 => 2,
            DType::I32 | DType::U32 | DType::F32 => 4,
            DType::I64 | DType::U64 | DType::F64 => 8,
        }
    }

    pub fn is_float(&self) -> bool {
        matches!(
            self,
            DType::F8_E5M2 | DType::F8_E4M3 | DType::F16 | DType::BF16 | DType::F32 | DType::F64
        )
    }
}

impl std::fmt::Display for DType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
