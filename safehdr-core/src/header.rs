use crate::error::{Result, SafehdrError};
use crate::metadata::MetadataRecord;
use crate::string::StrView;
use crate::tensor::TensorRecord;

/// Size of the little-endian header length prefix.
pub const LEN_PREFIX: usize = 8;

/// A fully parsed header: every tensor and metadata record, in header order,
/// borrowing from the input buffer.
///
/// Only ever constructed from a successful parse. Two independent cursors
/// walk the tensor and metadata lists; they start at the head of each list.
#[derive(Debug, Clone)]
pub struct Header<'a> {
    buf: &'a [u8],
    header_len: usize,
    tensors: Vec<TensorRecord<'a>>,
    metadata: Vec<MetadataRecord<'a>>,
    tensor_cursor: usize,
    metadata_cursor: usize,
}

impl<'a> Header<'a> {
    pub(crate) fn new(
        buf: &'a [u8],
        header_len: usize,
        tensors: Vec<TensorRecord<'a>>,
        metadata: Vec<MetadataRecord<'a>>,
    ) -> Self {
        Self {
            buf,
            header_len,
            tensors,
            metadata,
            tensor_cursor: 0,
            metadata_cursor: 0,
        }
    }

    /// The whole input buffer the header was parsed from.
    pub fn buffer(&self) -> &'a [u8] {
        self.buf
    }

    /// Length of the JSON header, excluding the 8-byte prefix.
    pub fn header_len(&self) -> usize {
        self.header_len
    }

    /// Offset of the data section from the start of the buffer.
    pub fn data_start(&self) -> usize {
        LEN_PREFIX + self.header_len
    }

    /// The raw data section following the header.
    pub fn data(&self) -> &'a [u8] {
        &self.buf[self.data_start()..]
    }

    pub fn tensors(&self) -> &[TensorRecord<'a>] {
        &self.tensors
    }

    pub fn metadata(&self) -> &[MetadataRecord<'a>] {
        &self.metadata
    }

    /// First tensor whose raw name equals `name`.
    pub fn tensor(&self, name: impl AsRef<[u8]>) -> Option<&TensorRecord<'a>> {
        let name = name.as_ref();
        self.tensors.iter().find(|t| t.name == name)
    }

    /// Value of the first metadata entry whose raw key equals `key`.
    pub fn metadata_value(&self, key: impl AsRef<[u8]>) -> Option<StrView<'a>> {
        let key = key.as_ref();
        self.metadata
            .iter()
            .find(|m| m.key == key)
            .map(|m| m.value)
    }

    pub fn rewind_tensors(&mut self) {
        self.tensor_cursor = 0;
    }

    /// Advance the tensor cursor. Returns `None` once exhausted, and keeps
    /// returning `None` until [`Header::rewind_tensors`].
    pub fn next_tensor(&mut self) -> Option<&TensorRecord<'a>> {
        let tensor = self.tensors.get(self.tensor_cursor)?;
        self.tensor_cursor += 1;
        Some(tensor)
    }

    pub fn rewind_metadata(&mut self) {
        self.metadata_cursor = 0;
    }

    pub fn next_metadata(&mut self) -> Option<&MetadataRecord<'a>> {
        let entry = self.metadata.get(self.metadata_cursor)?;
        self.metadata_cursor += 1;
        Some(entry)
    }

    /// Check that each tensor's byte length matches its shape and dtype, and
    /// that no two non-empty tensors share bytes.
    pub fn check_layout(&self) -> Result<()> {
        for tensor in &self.tensors {
            tensor.validate_size()?;
        }

        let mut ranges: Vec<&TensorRecord<'a>> =
            self.tensors.iter().filter(|t| t.data_len > 0).collect();
        ranges.sort_by_key(|t| (t.data_offset, t.data_len));

        for pair in ranges.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if a.data_range().end > b.data_offset {
                return Err(SafehdrError::OverlappingTensors {
                    first: a.name.to_string(),
                    first_start: a.data_offset,
                    first_end: a.data_range().end,
                    second: b.name.to_string(),
                    second_start: b.data_offset,
                });
            }
        }
        Ok(())
    }

    /// Release the header and every record it owns. The input buffer is
    /// untouched.
    pub fn close(self) {
        tracing::trace!(
            tensors = self.tensors.len(),
            metadata = self.metadata.len(),
            "closing header"
        );
    }
}
