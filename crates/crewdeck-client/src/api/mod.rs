//! API surface modules.

mod permissions;

pub use permissions::{PermissionsApi, UpdatePermissionsRequest};
