//! Image capture and encoding.
//!
//! Files are size-checked from their metadata before any bytes are read, then
//! sniffed for a known image format and encoded as a base64 data URI.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::path::Path;
use thiserror::Error;

/// Largest file accepted for upload: 5 MiB.
pub const MAX_IMAGE_BYTES: u64 = 5 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("Image size should be less than {}", size_label(*.limit))]
    TooLarge { size: u64, limit: u64 },

    #[error("Error reading file")]
    Read(#[source] std::io::Error),

    #[error("Unsupported image format")]
    UnsupportedFormat,
}

/// Human-readable size limit, e.g. `5MB` or `512KB`, as shown on the upload page.
pub fn size_label(bytes: u64) -> String {
    const KIB: u64 = 1024;
    const MIB: u64 = 1024 * 1024;

    if bytes >= MIB && bytes % MIB == 0 {
        format!("{}MB", bytes / MIB)
    } else if bytes >= KIB {
        format!("{}KB", bytes / KIB)
    } else {
        format!("{} bytes", bytes)
    }
}

/// An image ready to be sent to the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedImage {
    pub file_name: String,
    pub mime_type: &'static str,
    pub data_uri: String,
    pub byte_len: usize,
}

#[derive(Debug, Clone, Copy)]
pub struct ImageCapture {
    max_bytes: u64,
}

impl Default for ImageCapture {
    fn default() -> Self {
        Self {
            max_bytes: MAX_IMAGE_BYTES,
        }
    }
}

impl ImageCapture {
    pub fn with_limit(max_bytes: u64) -> Self {
        Self { max_bytes }
    }

    pub fn max_bytes(&self) -> u64 {
        self.max_bytes
    }

    /// Read and encode the file at `path`.
    pub async fn capture(&self, path: impl AsRef<Path>) -> Result<CapturedImage, CaptureError> {
        let path = path.as_ref();

        let metadata = tokio::fs::metadata(path).await.map_err(CaptureError::Read)?;
        if metadata.len() > self.max_bytes {
            return Err(CaptureError::TooLarge {
                size: metadata.len(),
                limit: self.max_bytes,
            });
        }

        let bytes = tokio::fs::read(path).await.map_err(CaptureError::Read)?;

        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        self.encode(file_name, &bytes)
    }

    /// Encode bytes that are already in memory.
    pub fn encode(
        &self,
        file_name: impl Into<String>,
        bytes: &[u8],
    ) -> Result<CapturedImage, CaptureError> {
        if bytes.len() as u64 > self.max_bytes {
            return Err(CaptureError::TooLarge {
                size: bytes.len() as u64,
                limit: self.max_bytes,
            });
        }

        let format = image::guess_format(bytes).map_err(|_| CaptureError::UnsupportedFormat)?;
        let mime_type = format.to_mime_type();

        tracing::debug!(mime_type, bytes = bytes.len(), "Encoded image");

        Ok(CapturedImage {
            file_name: file_name.into(),
            mime_type,
            data_uri: format!("data:{};base64,{}", mime_type, STANDARD.encode(bytes)),
            byte_len: bytes.len(),
        })
    }
}
