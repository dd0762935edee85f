//! Retention decision and deletion engine
//!
//! [`orchestrator::Orchestrator`] drives a [`pruner::Pruner`] through login, tag
//! enumeration, [`policy::RetentionPolicy`] selection and
//! [`executor::DeletionExecutor`] submission.

pub mod executor;
pub mod orchestrator;
pub mod policy;
pub mod pruner;
pub mod tag;

pub use executor::{DeletionFailure, DeletionReport, FailureKind};
pub use orchestrator::{Orchestrator, RunSummary};
pub use policy::{DeletionGroup, DeletionPlan, RetentionPolicy, RetentionWindow};
pub use pruner::{DockerHubPruner, DockerHubTarget, Pruner};
pub use tag::TagRecord;
