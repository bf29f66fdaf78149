/*!
 * Run configuration
 *
 * Values come from defaults, then an optional JSON file, then CLI flags.
 */

use crate::core::password_gen::SourceKind;
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

const DEFAULT_SETTLE_SECS: u64 = 5;
const DEFAULT_PROBE_TIMEOUT_SECS: u64 = 10;
const DEFAULT_PROBE_HOST: &str = "google.com";
const EXHAUSTIVE_DELAY_MS: u64 = 500;
const DICTIONARY_DELAY_MS: u64 = 1000;

/// Tunables of a trial run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TrialConfig {
    /// Wait after association before checking reachability
    pub settle_secs: u64,
    pub probe_timeout_secs: u64,
    pub probe_host: String,
    /// Pause between failed attempts; mode default when unset
    pub inter_attempt_delay_ms: Option<u64>,
    /// WiFi interface (Linux only, e.g. wlan0)
    pub interface: Option<String>,
}

impl Default for TrialConfig {
    fn default() -> Self {
        Self {
            settle_secs: DEFAULT_SETTLE_SECS,
            probe_timeout_secs: DEFAULT_PROBE_TIMEOUT_SECS,
            probe_host: DEFAULT_PROBE_HOST.to_string(),
            inter_attempt_delay_ms: None,
            interface: None,
        }
    }
}

impl TrialConfig {
    /// Load config from a JSON file; missing keys take their defaults
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&json).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Delays the orchestrator runs with for a given source kind
    pub fn timing(&self, kind: SourceKind) -> Timing {
        let delay_ms = self.inter_attempt_delay_ms.unwrap_or(match kind {
            SourceKind::Exhaustive => EXHAUSTIVE_DELAY_MS,
            SourceKind::Dictionary => DICTIONARY_DELAY_MS,
        });

        Timing {
            settle: Duration::from_secs(self.settle_secs),
            probe_timeout: Duration::from_secs(self.probe_timeout_secs),
            inter_attempt_delay: Duration::from_millis(delay_ms),
        }
    }
}

/// Fixed delays of one run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    pub settle: Duration,
    pub probe_timeout: Duration,
    pub inter_attempt_delay: Duration,
}

impl Timing {
    /// No waiting at all
    pub const ZERO: Timing = Timing {
        settle: Duration::ZERO,
        probe_timeout: Duration::ZERO,
        inter_attempt_delay: Duration::ZERO,
    };
}
