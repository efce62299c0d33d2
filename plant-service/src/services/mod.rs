pub mod identifier;
pub mod metrics;
pub mod providers;

pub use identifier::{IdentifyError, PlantIdentifier};
