// Library entrypoint for the server/CLI binaries and integration tests.
pub mod api;
pub mod core;
pub mod extract;
pub mod merge;
pub mod services;
pub mod sheets;

pub use crate::api::build_router;
pub use crate::core::{config, error, shutdown, state};
