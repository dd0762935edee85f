//! Docker Image Pruner Library
//!
//! Enforces an age-based retention policy on the tags of a Docker Hub
//! repository: log in, list every tag, group the expired ones by digest and
//! delete them while tolerating rate limiting and partial failure.

pub mod cli;
pub mod error;
pub mod logging;
pub mod prune;
pub mod registry;

pub use error::{PrunerError, Result};
pub use logging::Logger;
pub use prune::{Orchestrator, Pruner, RunSummary};
