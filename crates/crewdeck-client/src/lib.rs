//! HTTP client for the Crewdeck authorization service.
//!
//! Typed access to the permission endpoints consumed by the dashboard's
//! cold-start path: fetch, update, and reset permissions by user. Each call
//! returns the user's complete permission matrix.

mod api;
mod client;
mod error;

pub use api::{PermissionsApi, UpdatePermissionsRequest};
pub use client::{ClientBuilder, CrewdeckClient};
pub use error::{Error, Result};
