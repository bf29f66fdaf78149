//! Deterministic doubles for the network capabilities

use crate::attempt::ConnectionController;
use crate::core::orchestrator::{Event, Reporter};
use crate::error::AttemptError;
use crate::probe::ReachabilityChecker;
use crate::profile::ProfileDescriptor;
use std::collections::{HashSet, VecDeque};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Associates only for the listed secrets
#[derive(Debug, Default)]
pub struct ScriptedController {
    accepted: HashSet<String>,
    pending: Option<String>,
    pub fail_registration: bool,
    /// Replace each profile file with a non-empty directory so removal fails
    pub block_cleanup: bool,
    /// Key material of every registered profile, in order
    pub registered: Vec<String>,
    pub associations: u32,
    /// Whether the profile file existed when it was registered
    pub files_present: Vec<bool>,
}

impl ScriptedController {
    pub fn accepting(secrets: &[&str]) -> Self {
        Self {
            accepted: secrets.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }
}

impl ConnectionController for ScriptedController {
    fn register_profile(
        &mut self,
        descriptor: &ProfileDescriptor,
        file: &Path,
    ) -> Result<(), AttemptError> {
        self.registered.push(descriptor.key_material.clone());
        self.files_present.push(file.exists());
        if self.block_cleanup {
            fs::remove_file(file).map_err(|e| AttemptError::Provisioning(e.to_string()))?;
            fs::create_dir(file).map_err(|e| AttemptError::Provisioning(e.to_string()))?;
            fs::write(file.join("pinned"), b"x")
                .map_err(|e| AttemptError::Provisioning(e.to_string()))?;
        }
        if self.fail_registration {
            return Err(AttemptError::Provisioning("scripted failure".into()));
        }
        self.pending = Some(descriptor.key_material.clone());
        Ok(())
    }

    fn associate(&mut self, _network_id: &str) -> Result<(), AttemptError> {
        self.associations += 1;
        match self.pending.take() {
            Some(secret) if self.accepted.contains(&secret) => Ok(()),
            _ => Err(AttemptError::Association("scripted rejection".into())),
        }
    }
}

/// Answers reachability checks from a queue, then with a fixed default
#[derive(Debug, Default)]
pub struct ScriptedChecker {
    answers: VecDeque<bool>,
    default: bool,
    pub checks: u32,
}

impl ScriptedChecker {
    pub fn always(reachable: bool) -> Self {
        Self {
            default: reachable,
            ..Default::default()
        }
    }

    pub fn sequence(answers: &[bool], then: bool) -> Self {
        Self {
            answers: answers.iter().copied().collect(),
            default: then,
            checks: 0,
        }
    }
}

impl ReachabilityChecker for ScriptedChecker {
    fn check(&mut self, host: &str, timeout: Duration) -> Result<(), AttemptError> {
        self.checks += 1;
        if self.answers.pop_front().unwrap_or(self.default) {
            Ok(())
        } else if timeout.is_zero() {
            Err(AttemptError::ReachabilityTimeout(timeout))
        } else {
            Err(AttemptError::Unreachable(host.to_string()))
        }
    }
}

/// Flattens events into short tags for assertions
#[derive(Debug, Default)]
pub struct RecordingReporter {
    pub tags: Vec<String>,
}

impl RecordingReporter {
    pub fn count(&self, prefix: &str) -> usize {
        self.tags.iter().filter(|t| t.starts_with(prefix)).count()
    }
}

impl Reporter for RecordingReporter {
    fn report(&mut self, event: &Event<'_>) {
        let tag = match event {
            Event::Started { .. } => "started".to_string(),
            Event::AttemptStarted {
                candidate,
                fallback,
                ..
            } => {
                if *fallback {
                    format!("retry:{candidate}")
                } else {
                    format!("attempt:{candidate}")
                }
            }
            Event::Associated { candidate } => format!("associated:{candidate}"),
            Event::AssociationFailed { candidate } => format!("assoc-failed:{candidate}"),
            Event::ReachabilityFailed { candidate } => format!("unreachable:{candidate}"),
            Event::Succeeded { candidate } => format!("found:{candidate}"),
            Event::CleanedUp { vacant } => format!("cleanup:{vacant}"),
            Event::CleanupFailed { .. } => "cleanup-failed".to_string(),
            Event::Finished { terminal, .. } => format!("finished:{terminal:?}"),
        };
        self.tags.push(tag);
    }
}
