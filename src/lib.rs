pub mod config;
pub mod error;
pub mod mime;
pub mod model;
pub mod pipeline;
pub mod routes;
pub mod telemetry;
pub mod upload;

pub use routes::{create_router, AppState};
