//! HTTP collaborator: wire DTOs and the reqwest-backed client behind the
//! `BlogApi` seam.

pub mod client;
pub mod types;

pub use client::{ApiClient, BlogApi};
