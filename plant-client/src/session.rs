//! One upload-to-result cycle at a time.

use crate::capture::{CaptureError, CapturedImage, ImageCapture};
use crate::models::PlantInfo;
use crate::transport::{IdentifyClient, TransportError};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Busy,
    Failed { message: String },
    Identified { image: CapturedImage, info: PlantInfo },
}

#[derive(Debug, Error)]
pub enum UploadError {
    #[error(transparent)]
    Capture(#[from] CaptureError),

    #[error(transparent)]
    Transport(#[from] TransportError),
}

pub struct IdentifySession {
    capture: ImageCapture,
    client: IdentifyClient,
    state: SessionState,
    preview: Option<CapturedImage>,
}

impl IdentifySession {
    pub fn new(client: IdentifyClient) -> Self {
        Self::with_capture(client, ImageCapture::default())
    }

    pub fn with_capture(client: IdentifyClient, capture: ImageCapture) -> Self {
        Self {
            capture,
            client,
            state: SessionState::Idle,
            preview: None,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Last image accepted by capture, even if identification then failed.
    pub fn preview(&self) -> Option<&CapturedImage> {
        self.preview.as_ref()
    }

    /// Capture `path`, send it, and settle in `Failed` or `Identified`.
    ///
    /// Holding `&mut self` across the await keeps one upload in flight per session.
    pub async fn upload(&mut self, path: impl AsRef<Path>) -> &SessionState {
        self.state = SessionState::Busy;

        self.state = match self.run(path.as_ref()).await {
            Ok((image, info)) => {
                tracing::info!(common_name = %info.common_name, "Plant identified");
                SessionState::Identified { image, info }
            }
            Err(e) => {
                tracing::warn!(error = %e, "Upload failed");
                SessionState::Failed {
                    message: e.to_string(),
                }
            }
        };

        &self.state
    }

    async fn run(&mut self, path: &Path) -> Result<(CapturedImage, PlantInfo), UploadError> {
        let image = self.capture.capture(path).await?;
        self.preview = Some(image.clone());

        let info = self.client.identify(&image.data_uri).await?;
        Ok((image, info))
    }
}
