//! Homework Watch library crate, used by the binary and the integration tests in `tests/`.

pub mod config;
pub mod endpoint;
pub mod errors;
pub mod jobs;
pub mod models;
pub mod notification;
