//! Registry module for Docker Hub management API interactions
//!
//! This module provides the transport seam, login, tag listing and the wire types
//! used by the delete endpoint.

pub mod catalog;
pub mod models;
pub mod session;
pub mod transport;

pub use catalog::TagCatalog;
pub use session::{Credentials, RegistrySession};
pub use transport::{ApiResponse, HttpTransport, RegistryTransport};
