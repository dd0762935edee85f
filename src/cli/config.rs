//! Configuration resolution
//!
//! Flags and environment variables are merged exactly once into a
//! [`PrunerConfig`]. A flag given on the command line always wins over the
//! environment; the environment wins over built-in defaults.

use crate::cli::args::Args;
use crate::error::{PrunerError, Result};
use crate::prune::policy::RetentionWindow;
use crate::prune::pruner::DockerHubTarget;
use crate::registry::session::Credentials;
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "https://hub.docker.com/v2/";

/// Everything a run needs, validated before the pruner starts
#[derive(Debug, Clone)]
pub struct PrunerConfig {
    pub namespace: String,
    pub repository: String,
    pub credentials: Credentials,
    pub dry_run: bool,
    pub debug: bool,
    pub quiet: bool,
    pub retention: RetentionWindow,
    pub api_url: String,
    pub timeout: Duration,
    pub skip_tls: bool,
    pub max_rate_limit_wait: Duration,
}

impl PrunerConfig {
    /// Resolve against the process environment
    pub fn from_args(args: &Args) -> Result<Self> {
        Self::resolve(args, |key| std::env::var(key).ok())
    }

    /// Resolve with an explicit environment lookup
    pub fn resolve<F>(args: &Args, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let option = |flag: &Option<String>, key: &str| -> Option<String> {
            flag.clone()
                .or_else(|| env(key))
                .filter(|value| !value.trim().is_empty())
        };
        let switch = |flag: bool, key: &str| -> bool {
            flag || env(key).is_some_and(|value| {
                !matches!(value.trim().to_ascii_lowercase().as_str(), "0" | "false" | "no")
            })
        };

        let (Some(namespace), Some(repository)) = (
            option(&args.namespace, "NAMESPACE"),
            option(&args.repository, "REPOSITORY"),
        ) else {
            return Err(PrunerError::Validation(
                "You must provide \"namespace\" and \"repository\" flags.".to_string(),
            ));
        };

        let (Some(username), Some(pat)) = (
            option(&args.username, "USERNAME"),
            option(&args.pat, "PAT"),
        ) else {
            return Err(PrunerError::Validation(
                "You must provide \"username\" and \"pat\" to log in.".to_string(),
            ));
        };

        let retention = match option(&args.retention, "RETENTION") {
            Some(window) => window.parse()?,
            None => RetentionWindow::default(),
        };

        let config = Self {
            namespace,
            repository,
            credentials: Credentials::new(username, pat),
            dry_run: switch(args.dry_run, "DRY_RUN"),
            debug: switch(args.debug, "DEBUG"),
            quiet: args.quiet,
            retention,
            api_url: option(&args.api_url, "API_URL")
                .unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            timeout: Duration::from_secs(args.timeout),
            skip_tls: args.skip_tls,
            max_rate_limit_wait: Duration::from_secs(args.max_rate_limit_wait),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.namespace.contains('/') || self.repository.contains('/') {
            return Err(PrunerError::Validation(
                "Namespace and repository must not contain '/'".to_string(),
            ));
        }

        if !self.api_url.starts_with("http://") && !self.api_url.starts_with("https://") {
            return Err(PrunerError::Validation(format!(
                "Invalid API URL: {}. Must start with http:// or https://",
                self.api_url
            )));
        }

        if self.timeout.is_zero() {
            return Err(PrunerError::Validation(
                "Timeout must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    pub fn target(&self) -> DockerHubTarget {
        DockerHubTarget {
            namespace: self.namespace.clone(),
            repository: self.repository.clone(),
            credentials: self.credentials.clone(),
            dry_run: self.dry_run,
            max_rate_limit_wait: self.max_rate_limit_wait,
        }
    }
}
