use crate::startup::AppState;
use askama::Template;
use axum::{extract::State, response::IntoResponse};

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub max_image_bytes: usize,
    pub max_image_label: String,
}

pub async fn index(State(state): State<AppState>) -> impl IntoResponse {
    let max_image_bytes = state.config.upload.max_image_bytes;

    IndexTemplate {
        max_image_bytes,
        max_image_label: size_label(max_image_bytes),
    }
}

/// Human-readable size limit, e.g. `5MB` or `512KB`.
pub fn size_label(bytes: usize) -> String {
    const KIB: usize = 1024;
    const MIB: usize = 1024 * 1024;

    if bytes >= MIB && bytes % MIB == 0 {
        format!("{}MB", bytes / MIB)
    } else if bytes >= KIB {
        format!("{}KB", bytes / KIB)
    } else {
        format!("{} bytes", bytes)
    }
}
