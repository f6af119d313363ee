//! HTTP surface of the tee-time forecast proxy.
//!
//! This crate focuses on:
//! - Routing `/forecast` to the core service
//! - CORS and content-type headers
//! - Mapping forecast failures to JSON error bodies

pub mod error;
pub mod routes;
pub mod server;

pub use error::{ApiError, ErrorResponse};
pub use routes::{AppState, create_router};
