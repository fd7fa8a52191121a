//! Zero-copy, bounds-checked loader for safetensors headers.
//!
//! A safetensors file is an 8-byte little-endian header length, that many
//! bytes of JSON describing each tensor (dtype, shape, byte range) plus an
//! optional `__metadata__` string map, then the raw tensor data. This crate
//! validates and indexes the header without copying anything out of the
//! input buffer and without trusting any length or offset it contains.
//!
//! ```no_run
//! let file = safehdr_core::SafetensorsFile::open("model.safetensors")?;
//! let mut header = file.header()?;
//! while let Some(tensor) = header.next_tensor() {
//!     println!("{} {} {:?}", tensor.name, tensor.dtype, tensor.shape);
//! }
//! # Ok::<(), safehdr_core::SafehdrError>(())
//! ```

pub mod array;
pub mod dtype;
pub mod error;
pub mod header;
pub mod lexer;
pub mod metadata;
pub mod mmap;
pub mod object;
pub mod safetensors;
pub mod string;
pub mod tensor;

pub use dtype::DType;
pub use error::{ErrorKind, Result, SafehdrError};
pub use header::Header;
pub use metadata::MetadataRecord;
pub use mmap::SafetensorsFile;
pub use safetensors::{ParserConfig, SafetensorsParser, open};
pub use string::StrView;
pub use tensor::TensorRecord;
