//! Command-line argument parsing

use crate::prune::executor::DEFAULT_MAX_RATE_LIMIT_WAIT;
use clap::Parser;

#[derive(Parser, Debug, Default, Clone)]
#[command(name = "docker-image-pruner")]
#[command(about = "Delete Docker Hub tags that fall outside a retention window")]
#[command(version)]
pub struct Args {
    /// Docker Hub namespace (user or organisation)
    #[arg(long = "namespace", short = 'n', help = "Namespace that owns the repository [env: NAMESPACE]")]
    pub namespace: Option<String>,

    /// Repository inside the namespace
    #[arg(long = "repository", short = 'r', help = "Repository to prune [env: REPOSITORY]")]
    pub repository: Option<String>,

    /// Registry username
    #[arg(long = "username", short = 'u', help = "Username for registry login [env: USERNAME]")]
    pub username: Option<String>,

    /// Personal access token or password
    #[arg(long = "pat", short = 'p', help = "Personal access token or password [env: PAT]")]
    pub pat: Option<String>,

    /// Ask the registry to simulate deletions only
    #[arg(long = "dry-run", help = "Do not actually prune things [env: DRY_RUN]")]
    pub dry_run: bool,

    /// Debug output
    #[arg(long = "debug", help = "Enable debugging output [env: DEBUG]")]
    pub debug: bool,

    /// Only print fatal errors
    #[arg(long = "quiet", short = 'q', help = "Suppress all output except fatal errors")]
    pub quiet: bool,

    /// Retention window
    #[arg(
        long = "retention",
        help = "Keep tags updated within this window, e.g. 1month, 4weeks, 30days [env: RETENTION] [default: 1month]"
    )]
    pub retention: Option<String>,

    /// Management API base URL
    #[arg(
        long = "api-url",
        help = "Registry management API base URL [env: API_URL] [default: https://hub.docker.com/v2/]"
    )]
    pub api_url: Option<String>,

    /// Timeout in seconds for network operations
    #[arg(
        long = "timeout",
        short = 't',
        default_value = "30",
        help = "Timeout for network operations in seconds"
    )]
    pub timeout: u64,

    /// Skip TLS verification
    #[arg(long = "skip-tls", short = 'k', help = "Skip TLS certificate verification")]
    pub skip_tls: bool,

    /// Longest acceptable rate-limit wait
    #[arg(
        long = "max-rate-limit-wait",
        default_value_t = DEFAULT_MAX_RATE_LIMIT_WAIT.as_secs(),
        help = "Give up on a rate-limited deletion if the reset is further away than this many seconds"
    )]
    pub max_rate_limit_wait: u64,
}

impl Args {
    pub fn parse_args() -> Self {
        Args::parse()
    }
}
