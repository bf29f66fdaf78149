/*!
 * Attempt orchestration
 *
 * Drives a candidate source through association and reachability checks one
 * candidate at a time:
 *
 * Idle -> Attempting -> {AssociationFailed | ReachabilityFailed | Succeeded}
 *      -> Cleanup -> {next candidate | Found | Exhausted}
 *
 * Cleanup runs after every attempt. A dictionary run that exhausts its list
 * replays the last candidate once before finishing as `Exhausted`.
 */

use crate::attempt::{AttemptResult, ConnectionAttempt, ConnectionController};
use crate::config::Timing;
use crate::core::password_gen::{Candidate, CandidateSource, SourceKind};
use crate::error::AttemptError;
use crate::probe::{ReachabilityChecker, ReachabilityProbe};
use crate::profile::{EphemeralProfile, ProfileSlot};
use log::{debug, info, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Result of one attempt cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttemptOutcome {
    pub associated: bool,
    /// Only meaningful when `associated` is true
    pub reachable: bool,
}

impl AttemptOutcome {
    pub fn succeeded(&self) -> bool {
        self.associated && self.reachable
    }
}

/// How a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Terminal {
    /// A candidate associated and reached the internet
    Found,
    /// Every candidate failed
    Exhausted,
    /// Stopped on request between attempts
    Interrupted,
}

/// State of a run, owned and mutated only by the orchestrator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub network_id: String,
    pub source_kind: SourceKind,
    pub total: u128,
    pub attempts_made: u64,
    pub last_candidate: Option<Candidate>,
    pub terminal: Option<Terminal>,
}

impl Session {
    fn new(network_id: &str, source: &CandidateSource) -> Self {
        Self {
            network_id: network_id.to_string(),
            source_kind: source.kind(),
            total: source.total(),
            attempts_made: 0,
            last_candidate: None,
            terminal: None,
        }
    }

    /// The working secret, if the run ended in `Found`
    pub fn found_secret(&self) -> Option<&str> {
        match self.terminal {
            Some(Terminal::Found) => self.last_candidate.as_deref(),
            _ => None,
        }
    }
}

/// Progress notifications emitted while a run advances
#[derive(Debug)]
pub enum Event<'a> {
    Started {
        network_id: &'a str,
        kind: SourceKind,
        total: u128,
    },
    AttemptStarted {
        number: u64,
        total: u128,
        candidate: &'a str,
        /// True for the replay of the last dictionary candidate
        fallback: bool,
    },
    Associated {
        candidate: &'a str,
    },
    AssociationFailed {
        candidate: &'a str,
    },
    ReachabilityFailed {
        candidate: &'a str,
    },
    Succeeded {
        candidate: &'a str,
    },
    CleanedUp {
        /// Whether the profile slot is empty after cleanup
        vacant: bool,
    },
    CleanupFailed {
        error: &'a AttemptError,
    },
    Finished {
        terminal: Terminal,
        attempts: u64,
    },
}

/// Receives run progress
pub trait Reporter {
    fn report(&mut self, event: &Event<'_>);
}

/// Reporter that drops every event
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentReporter;

impl Reporter for SilentReporter {
    fn report(&mut self, _event: &Event<'_>) {}
}

/// Runs candidates through attempt, probe and cleanup until one works
#[derive(Debug)]
pub struct AttemptOrchestrator<C, R> {
    attempt: ConnectionAttempt<C>,
    probe: ReachabilityProbe<R>,
    timing: Timing,
    slot: ProfileSlot,
    stop: Option<Arc<AtomicBool>>,
}

impl<C, R> AttemptOrchestrator<C, R>
where
    C: ConnectionController,
    R: ReachabilityChecker,
{
    /// Create an orchestrator with its own profile slot
    ///
    /// # Arguments
    /// * `controller` - Network configuration service
    /// * `probe` - Reachability probe bound to its target host
    /// * `timing` - Settle, probe timeout and inter-attempt delays
    pub fn new(
        controller: C,
        probe: ReachabilityProbe<R>,
        timing: Timing,
    ) -> std::io::Result<Self> {
        Ok(Self {
            attempt: ConnectionAttempt::new(controller),
            probe,
            timing,
            slot: ProfileSlot::new()?,
            stop: None,
        })
    }

    /// Stop pulling candidates once `flag` is set
    ///
    /// An attempt already in flight still runs to completion, cleanup included.
    pub fn with_stop_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.stop = Some(flag);
        self
    }

    pub fn controller(&self) -> &C {
        self.attempt.controller()
    }

    pub fn checker(&self) -> &R {
        self.probe.checker()
    }

    pub fn slot(&self) -> &ProfileSlot {
        &self.slot
    }

    /// Try candidates from `source` against `network_id` until one works or none are left
    ///
    /// # Returns
    /// Final session snapshot; `terminal` is always set
    pub fn run(
        &mut self,
        network_id: &str,
        mut source: CandidateSource,
        reporter: &mut dyn Reporter,
    ) -> Session {
        let mut session = Session::new(network_id, &source);
        reporter.report(&Event::Started {
            network_id,
            kind: session.source_kind,
            total: session.total,
        });
        info!(
            "starting {:?} run against {network_id:?} ({} candidates)",
            session.source_kind, session.total
        );

        let terminal = loop {
            if self.stop_requested() {
                info!("stop requested, ending run");
                break Terminal::Interrupted;
            }

            let Some(candidate) = source.next() else {
                if session.source_kind == SourceKind::Dictionary {
                    self.fallback_retry(&mut session, reporter);
                }
                break Terminal::Exhausted;
            };

            session.attempts_made += 1;
            reporter.report(&Event::AttemptStarted {
                number: session.attempts_made,
                total: session.total,
                candidate: &candidate,
                fallback: false,
            });

            let outcome = self.cycle(network_id, &candidate, reporter);
            session.last_candidate = Some(candidate);

            if outcome.succeeded() {
                break Terminal::Found;
            }
            self.pause();
        };

        session.terminal = Some(terminal);
        reporter.report(&Event::Finished {
            terminal,
            attempts: session.attempts_made,
        });
        info!(
            "run ended {terminal:?} after {} attempts",
            session.attempts_made
        );
        session
    }

    // Replays the last candidate once; its outcome does not change the verdict.
    // This duplicates an attempt already known to have failed and is kept as
    // observed behaviour of dictionary runs.
    fn fallback_retry(&mut self, session: &mut Session, reporter: &mut dyn Reporter) {
        let Some(last) = session.last_candidate.clone() else {
            return;
        };

        warn!("dictionary exhausted, retrying last candidate once (result is ignored)");
        session.attempts_made += 1;
        reporter.report(&Event::AttemptStarted {
            number: session.attempts_made,
            total: session.total,
            candidate: &last,
            fallback: true,
        });

        let outcome = self.cycle(&session.network_id, &last, reporter);
        debug!("fallback retry outcome: {outcome:?}");
    }

    /// One Attempting -> Cleanup pass
    fn cycle(
        &mut self,
        network_id: &str,
        candidate: &str,
        reporter: &mut dyn Reporter,
    ) -> AttemptOutcome {
        let AttemptResult {
            associated,
            profile,
        } = self.attempt.attempt(&mut self.slot, network_id, candidate);

        let outcome = if !associated {
            reporter.report(&Event::AssociationFailed { candidate });
            AttemptOutcome {
                associated: false,
                reachable: false,
            }
        } else {
            reporter.report(&Event::Associated { candidate });
            let reachable = self
                .probe
                .probe(self.timing.settle, self.timing.probe_timeout);
            if reachable {
                reporter.report(&Event::Succeeded { candidate });
            } else {
                reporter.report(&Event::ReachabilityFailed { candidate });
            }
            AttemptOutcome {
                associated: true,
                reachable,
            }
        };

        if let Some(Err(e)) = profile.map(EphemeralProfile::release) {
            warn!("{e}");
            reporter.report(&Event::CleanupFailed { error: &e });
        }
        reporter.report(&Event::CleanedUp {
            vacant: self.slot.is_vacant(),
        });

        outcome
    }

    fn stop_requested(&self) -> bool {
        self.stop
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::SeqCst))
    }

    fn pause(&self) {
        if !self.timing.inter_attempt_delay.is_zero() {
            std::thread::sleep(self.timing.inter_attempt_delay);
        }
    }
}
