use base64::{engine::general_purpose::STANDARD, Engine as _};
use thiserror::Error;

/// Prefix every accepted upload must carry.
pub const DATA_URI_IMAGE_PREFIX: &str = "data:image/";

/// MIME tag sent to the model alongside the image bytes, whatever the upload
/// declared.
pub const INLINE_IMAGE_MIME_TYPE: &str = "image/jpeg";

#[derive(Debug, Error)]
pub enum ImageError {
    #[error("image data URI has no data section")]
    MissingData,

    #[error("image data is not valid base64: {0}")]
    InvalidBase64(#[from] base64::DecodeError),
}

/// Image payload ready to be attached to a model request.
#[derive(Debug, Clone)]
pub struct InlineImage {
    pub mime_type: &'static str,
    /// Base64 text, exactly as it appeared after the data URI's comma.
    pub data: String,
    /// Size of the decoded image.
    pub byte_len: usize,
}

impl InlineImage {
    /// Cut the base64 section out of a `data:image/...;base64,<data>` URI.
    pub fn from_data_uri(uri: &str) -> Result<Self, ImageError> {
        let (_, data) = uri.split_once(',').ok_or(ImageError::MissingData)?;
        let data = data.trim();
        if data.is_empty() {
            return Err(ImageError::MissingData);
        }

        let decoded = STANDARD.decode(data)?;

        Ok(Self {
            mime_type: INLINE_IMAGE_MIME_TYPE,
            data: data.to_string(),
            byte_len: decoded.len(),
        })
    }
}

/// The MIME type a data URI declares, e.g. `image/png`.
pub fn declared_mime_type(uri: &str) -> Option<&str> {
    let header = uri.strip_prefix("data:")?.split(',').next()?;
    header.split(';').next().filter(|m| !m.is_empty())
}
