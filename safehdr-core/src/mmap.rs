use std::fs::File;
use std::path::{Path, PathBuf};

use memmap2::Mmap;

use crate::error::{Result, SafehdrError};
use crate::header::{Header, LEN_PREFIX};
use crate::safetensors::SafetensorsParser;

/// Mmap a file read-only with page pre-faulting when available, falling back to
/// a regular mapping.
pub fn mmap_file(path: &Path) -> Result<Mmap> {
    let file = File::open(path)?;

    #[cfg(any(target_os = "windows", target_os = "linux"))]
    if let Ok(m) = try_mmap_populate(&file) {
        tracing::debug!(path = %path.display(), bytes = m.len(), "mmap: pre-faulted");
        return Ok(m);
    }

    // SAFETY: the file is opened read-only and the mapping is never written.
    // If another process truncates it underneath us, reads may fault (SIGBUS);
    // every access still goes through bounds-checked slices of the mapping.
    let mmap = unsafe { Mmap::map(&file)? };
    tracing::debug!(path = %path.display(), bytes = mmap.len(), "mmap: standard pages");
    Ok(mmap)
}

#[cfg(any(target_os = "windows", target_os = "linux"))]
fn try_mmap_populate(file: &File) -> std::result::Result<Mmap, std::io::Error> {
    unsafe { memmap2::MmapOptions::new().populate().map(file) }
}

/// A safetensors file mapped into memory. Headers parsed from it borrow the
/// mapping, so the file cannot be unmapped while one is alive.
#[derive(Debug)]
pub struct SafetensorsFile {
    path: PathBuf,
    mmap: Mmap,
}

impl SafetensorsFile {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file_size = std::fs::metadata(path)?.len();

        // mapping an empty file fails on some platforms; report it as truncation
        if file_size < LEN_PREFIX as u64 {
            return Err(SafehdrError::FileTooSmall { len: file_size });
        }

        let mmap = mmap_file(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            mmap,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.mmap
    }

    pub fn len(&self) -> usize {
        self.mmap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mmap.is_empty()
    }

    /// Parse the header with the default configuration.
    pub fn header(&self) -> Result<Header<'_>> {
        self.header_with(&SafetensorsParser::new())
    }

    pub fn header_with(&self, parser: &SafetensorsParser) -> Result<Header<'_>> {
        parser.parse_bytes(&self.mmap)
    }
}
