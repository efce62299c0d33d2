//! Common test utilities for workflow tests.

use std::time::Duration;
use workflow_tests::WorkflowTestContext;

/// Default timeout for waiting on the service.
pub const SERVICE_TIMEOUT: Duration = Duration::from_secs(10);

/// Create a workflow test context with a healthy service behind it.
pub async fn setup() -> WorkflowTestContext {
    WorkflowTestContext::new(SERVICE_TIMEOUT)
        .await
        .expect("Plant service not healthy")
}

/// Smallest JPEG-looking file: SOI marker and a JFIF APP0 header.
pub const JPEG_BYTES: &[u8] = &[
    0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F', 0x00, 0x01, 0x01, 0x00, 0x00,
    0x01, 0x00, 0x01, 0x00, 0x00, 0xFF, 0xD9,
];

pub fn jpeg_file() -> tempfile::NamedTempFile {
    use std::io::Write;

    let mut file = tempfile::Builder::new()
        .suffix(".jpg")
        .tempfile()
        .expect("Failed to create temp file");
    file.write_all(JPEG_BYTES).expect("Failed to write temp file");
    file
}
