use std::ops::Range;

use crate::array::{parse_array, parse_array_vec};
use crate::dtype::DType;
use crate::error::{Result, SafehdrError};
use crate::lexer::Lexer;
use crate::object::parse_object;
use crate::string::StrView;

/// One validated tensor descriptor.
///
/// `data` is the tensor's byte range inside the data section, already bounds
/// checked; `data_offset` is relative to the start of that section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TensorRecord<'a> {
    pub name: StrView<'a>,
    pub dtype: DType,
    pub shape: Vec<u64>,
    pub data_offset: usize,
    pub data_len: usize,
    pub data: &'a [u8],
}

impl<'a> TensorRecord<'a> {
    pub fn rank(&self) -> usize {
        self.shape.len()
    }

    /// Product of the shape, `None` on overflow. A rank-0 tensor has one element.
    pub fn num_elements(&self) -> Option<u64> {
        self.shape
            .iter()
            .try_fold(1u64, |acc, &dim| acc.checked_mul(dim))
    }

    /// Byte range relative to the start of the data section.
    pub fn data_range(&self) -> Range<usize> {
        self.data_offset..self.data_offset + self.data_len
    }

    /// Check that the byte length matches what shape and dtype imply.
    pub fn validate_size(&self) -> Result<()> {
        let expected = self
            .num_elements()
            .and_then(|n| n.checked_mul(self.dtype.size_in_bytes() as u64))
            .ok_or_else(|| SafehdrError::InvalidTensorShape {
                name: self.name.to_string(),
                reason: format!("shape {:?} overflows u64 byte count", self.shape),
            })?;

        if expected != self.data_len as u64 {
            return Err(SafehdrError::TensorSizeMismatch {
                name: self.name.to_string(),
                expected,
                actual: self.data_len as u64,
            });
        }
        Ok(())
    }
}

const FIELD_SHAPE: u8 = 1 << 0;
const FIELD_DATA_OFFSETS: u8 = 1 << 1;

/// Scratch state for one tensor object: which fields have been seen and
/// their values so far. `dtype` records its own presence; the other two
/// fields are tracked in `seen`.
#[derive(Debug, Default)]
struct TensorDraft {
    seen: u8,
    dtype: Option<DType>,
    shape: Vec<u64>,
    offsets: [u64; 2],
}

impl TensorDraft {
    fn mark(&mut self, tensor: StrView<'_>, field: u8, name: &'static str) -> Result<()> {
        if self.seen & field != 0 {
            return Err(duplicate(tensor, name));
        }
        self.seen |= field;
        Ok(())
    }

    fn parse_field<'a>(
        &mut self,
        tensor: StrView<'a>,
        key: StrView<'a>,
        lex: &mut Lexer<'a>,
    ) -> Result<()> {
        match key.as_bytes() {
            b"dtype" => {
                if self.dtype.is_some() {
                    return Err(duplicate(tensor, "dtype"));
                }
                let literal = lex.expect_string()?;
                let dtype = DType::from_name(literal.as_bytes()).ok_or_else(|| {
                    SafehdrError::UnknownDtype {
                        tensor: tensor.to_string(),
                        dtype: literal.to_string(),
                    }
                })?;
                self.dtype = Some(dtype);
            }
            b"shape" => {
                self.mark(tensor, FIELD_SHAPE, "shape")?;
                self.shape = parse_array_vec(lex)?;
            }
            b"data_offsets" => {
                self.mark(tensor, FIELD_DATA_OFFSETS, "data_offsets")?;
                parse_array(lex, &mut self.offsets)?;
                let [start, end] = self.offsets;
                if start > end {
                    return Err(SafehdrError::InvertedOffsets {
                        tensor: tensor.to_string(),
                        start,
                        end,
                    });
                }
            }
            _ => {
                return Err(SafehdrError::UnknownField {
                    tensor: tensor.to_string(),
                    field: key.to_string(),
                });
            }
        }
        Ok(())
    }

    fn missing_field(&self) -> Option<&'static str> {
        [(FIELD_SHAPE, "shape"), (FIELD_DATA_OFFSETS, "data_offsets")]
            .into_iter()
            .find(|&(bit, _)| self.seen & bit == 0)
            .map(|(_, name)| name)
    }

    fn finish<'a>(self, name: StrView<'a>, data_section: &'a [u8]) -> Result<TensorRecord<'a>> {
        let missing = |field| SafehdrError::MissingField {
            tensor: name.to_string(),
            field,
        };
        let Some(dtype) = self.dtype else {
            return Err(missing("dtype"));
        };
        if let Some(field) = self.missing_field() {
            return Err(missing(field));
        }

        // end fits in usize once it is known to be within the section
        let [start, end] = self.offsets;
        let section_len = data_section.len() as u64;
        if end > section_len {
            return Err(SafehdrError::TensorOutOfBounds {
                name: name.to_string(),
                start,
                end,
                data_len: section_len,
            });
        }
        let (start, end) = (start as usize, end as usize);

        tracing::trace!(tensor = %name, %dtype, start, end, "parsed tensor");

        Ok(TensorRecord {
            name,
            dtype,
            shape: self.shape,
            data_offset: start,
            data_len: end - start,
            data: &data_section[start..end],
        })
    }
}

fn duplicate(tensor: StrView<'_>, field: &'static str) -> SafehdrError {
    SafehdrError::DuplicateField {
        tensor: tensor.to_string(),
        field,
    }
}

/// Parse one tensor descriptor object at the cursor.
///
/// The object must contain `dtype`, `shape` and `data_offsets` exactly once
/// each and nothing else; the byte range must lie inside `data_section`.
pub fn parse_tensor<'a>(
    name: StrView<'a>,
    lex: &mut Lexer<'a>,
    data_section: &'a [u8],
) -> Result<TensorRecord<'a>> {
    let mut draft = TensorDraft::default();
    parse_object(lex, |key, lex| draft.parse_field(name, key, lex))?;
    draft.finish(name, data_section)
}
