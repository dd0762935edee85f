//! CLI module - argument parsing, configuration resolution and the runner

pub mod args;
pub mod config;
pub mod runner;

pub use args::Args;
pub use config::PrunerConfig;
pub use runner::Runner;
