//! HTTP layer: info, health and upload-and-analyze endpoints.

pub mod app;
pub mod error;
pub mod handlers;
pub mod state;
