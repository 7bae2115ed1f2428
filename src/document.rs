//! Source documents and the per-call temporary storage they are copied into.

use crate::error::OcrError;
use std::fs;
use std::io::{Read, Write};
use std::path::Path;
use tempfile::NamedTempFile;

/// Declared kind of an uploaded document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaType {
    Pdf,
    Image,
}

impl MediaType {
    /// Map a MIME type to a media type
    pub fn from_mime(mime: &str) -> Option<Self> {
        let mime = mime.trim().to_lowercase();
        if mime == "application/pdf" {
            Some(Self::Pdf)
        } else if mime.starts_with("image/") {
            Some(Self::Image)
        } else {
            None
        }
    }

    /// Guess from a file name's extension
    pub fn from_file_name(name: &str) -> Option<Self> {
        let ext = Path::new(name).extension()?.to_string_lossy().to_lowercase();
        match ext.as_str() {
            "pdf" => Some(Self::Pdf),
            "png" | "jpg" | "jpeg" | "gif" | "bmp" | "webp" | "tif" | "tiff" => Some(Self::Image),
            _ => None,
        }
    }

    /// Detect from magic bytes
    pub fn sniff(data: &[u8]) -> Option<Self> {
        if data.starts_with(b"%PDF-") {
            return Some(Self::Pdf);
        }
        image::guess_format(data).ok().map(|_| Self::Image)
    }

    /// Suffix given to the temporary copy so decoders can rely on it
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Pdf => ".pdf",
            Self::Image => ".img",
        }
    }
}

/// An uploaded document: original file name plus its bytes.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    file_name: String,
    data: Vec<u8>,
    declared_type: Option<MediaType>,
}

impl SourceDocument {
    pub fn new(file_name: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            data,
            declared_type: None,
        }
    }

    /// Read exactly `length` bytes from a stream.
    pub fn from_reader<R: Read>(
        reader: R,
        file_name: impl Into<String>,
        length: u64,
    ) -> Result<Self, OcrError> {
        let mut data = Vec::with_capacity(length as usize);
        reader.take(length).read_to_end(&mut data)?;
        if data.len() as u64 != length {
            return Err(OcrError::Validation(format!(
                "stream ended after {} of {} declared bytes",
                data.len(),
                length
            )));
        }
        Ok(Self::new(file_name, data))
    }

    /// Load a document from disk, naming it after the file.
    pub fn open(path: &Path) -> Result<Self, OcrError> {
        let data = fs::read(path)?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self::new(file_name, data))
    }

    pub fn with_media_type(mut self, media_type: MediaType) -> Self {
        self.declared_type = Some(media_type);
        self
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Declared type, else the file extension, else the magic bytes.
    pub fn media_type(&self) -> Option<MediaType> {
        self.declared_type
            .or_else(|| MediaType::from_file_name(&self.file_name))
            .or_else(|| MediaType::sniff(&self.data))
    }
}

/// Temporary on-disk copy of a document for the rasterizer.
///
/// The file is removed when this value is dropped, on success and on every
/// error path alike.
pub struct TempDocument {
    file: NamedTempFile,
}

impl TempDocument {
    pub fn write(source: &SourceDocument, media_type: MediaType) -> Result<Self, OcrError> {
        let mut file = tempfile::Builder::new()
            .prefix("docscan-")
            .suffix(media_type.extension())
            .tempfile()?;
        file.write_all(source.bytes())?;
        file.flush()?;

        tracing::debug!(
            "Acquired temporary storage {:?} ({} bytes)",
            file.path(),
            source.len()
        );
        Ok(Self { file })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }
}

impl Drop for TempDocument {
    fn drop(&mut self) {
        tracing::debug!("Releasing temporary storage {:?}", self.file.path());
    }
}
