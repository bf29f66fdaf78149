/*!
 * Error kinds raised at the external-call boundaries
 *
 * None of the attempt errors ever reach the orchestrator: each boundary logs
 * them and folds them into the boolean outcome of the step that issued the call.
 */

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Failures of a single attempt's external calls
#[derive(Debug, Error)]
pub enum AttemptError {
    /// Writing or registering the ephemeral profile failed
    #[error("failed to provision profile: {0}")]
    Provisioning(String),

    /// The association command failed or could not be started
    #[error("association failed: {0}")]
    Association(String),

    /// The reachability check did not finish in time
    #[error("reachability check timed out after {0:?}")]
    ReachabilityTimeout(Duration),

    /// The reachability check ran but reported no connectivity
    #[error("host unreachable: {0}")]
    Unreachable(String),

    /// Removing the ephemeral profile failed
    #[error("failed to remove profile {path:?}: {source}")]
    Cleanup {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("platform not supported")]
    Unsupported,
}

/// Failures while building a candidate source
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("no usable candidates in {origin}")]
    Empty { origin: String },

    #[error("charset must contain at least one symbol")]
    EmptyCharset,

    #[error("invalid length range {min}..={max}")]
    InvalidRange { min: usize, max: usize },

    #[error("failed to read candidate list {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Failures while loading the run configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
