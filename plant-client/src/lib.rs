//! Client side of the plant identification service.
//!
//! The flow mirrors the upload page: [`capture`] turns a file into a data
//! URI, [`transport`] posts it to `/api/identify`, [`session`] tracks the
//! upload state and [`display`] renders it for a terminal.

pub mod capture;
pub mod display;
pub mod models;
pub mod session;
pub mod transport;

pub use capture::{CaptureError, CapturedImage, ImageCapture};
pub use models::PlantInfo;
pub use session::{IdentifySession, SessionState};
pub use transport::{IdentifyClient, TransportError};
