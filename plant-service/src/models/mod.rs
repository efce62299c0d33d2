//! Domain models for the plant service.

pub mod image;
pub mod plant;

pub use image::{declared_mime_type, ImageError, InlineImage, DATA_URI_IMAGE_PREFIX};
pub use plant::PlantIdentification;
