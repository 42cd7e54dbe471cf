//! Typed client for the dashboard's REST backend.

pub mod client;
pub mod types;

pub use client::ApiClient;
