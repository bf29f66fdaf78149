// Public exports for the binary and testing
pub mod attempt;
pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod platform;
pub mod probe;
pub mod profile;
pub mod report;

#[cfg(test)]
mod testing;

pub use attempt::{AttemptResult, ConnectionAttempt, ConnectionController};
pub use config::{Timing, TrialConfig};
pub use crate::core::orchestrator::{
    AttemptOrchestrator, AttemptOutcome, Event, Reporter, Session, Terminal,
};
pub use crate::core::password_gen::{
    Candidate, CandidateSource, DictionaryList, ExhaustiveGenerator,
};
pub use error::{AttemptError, ConfigError, SourceError};
pub use platform::{PingChecker, SystemController};
pub use probe::{ReachabilityChecker, ReachabilityProbe};
pub use profile::{EphemeralProfile, ProfileDescriptor, ProfileSlot};
