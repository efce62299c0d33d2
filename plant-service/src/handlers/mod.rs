//! HTTP handlers for the plant service.

pub mod app;
pub mod health;
pub mod identify;
pub mod metrics;

pub use app::index;
pub use health::{health_check, readiness_check};
pub use identify::identify_plant;
