/*!
 * One association attempt with a candidate secret
 */

use crate::error::AttemptError;
use crate::profile::{EphemeralProfile, ProfileDescriptor, ProfileSlot};
use log::{debug, info};
use std::path::Path;

#[cfg(test)]
use mockall::automock;

/// Platform network configuration service
#[cfg_attr(test, automock)]
pub trait ConnectionController {
    /// Register the profile stored at `file` with the platform
    fn register_profile(
        &mut self,
        descriptor: &ProfileDescriptor,
        file: &Path,
    ) -> Result<(), AttemptError>;

    /// Ask the platform to join `network_id`; `Ok` means the command reported success
    fn associate(&mut self, network_id: &str) -> Result<(), AttemptError>;
}

/// Outcome of one attempt, carrying the profile it provisioned
///
/// The caller owns the profile until its cleanup step releases it.
#[derive(Debug)]
pub struct AttemptResult<'slot> {
    pub associated: bool,
    pub profile: Option<EphemeralProfile<'slot>>,
}

/// Provisions a profile per candidate and requests association
#[derive(Debug)]
pub struct ConnectionAttempt<C> {
    controller: C,
}

impl<C: ConnectionController> ConnectionAttempt<C> {
    pub fn new(controller: C) -> Self {
        Self { controller }
    }

    pub fn controller(&self) -> &C {
        &self.controller
    }

    /// Try to associate with `network_id` using `candidate`
    ///
    /// Provisioning, registration and association errors are logged and
    /// reported as `associated = false`; nothing propagates.
    ///
    /// # Arguments
    /// * `slot` - Slot the ephemeral profile is written into
    /// * `network_id` - SSID, also used as the profile name
    /// * `candidate` - Secret to try
    pub fn attempt<'slot>(
        &mut self,
        slot: &'slot mut ProfileSlot,
        network_id: &str,
        candidate: &str,
    ) -> AttemptResult<'slot> {
        let descriptor = ProfileDescriptor::for_candidate(network_id, candidate);
        let profile = match slot.provision(descriptor) {
            Ok(profile) => profile,
            Err(e) => {
                info!("{e}");
                return AttemptResult {
                    associated: false,
                    profile: None,
                };
            }
        };

        let associated = match self.join(&profile, network_id) {
            Ok(()) => true,
            Err(e) => {
                debug!("attempt on {network_id:?} not associated: {e}");
                false
            }
        };

        AttemptResult {
            associated,
            profile: Some(profile),
        }
    }

    fn join(
        &mut self,
        profile: &EphemeralProfile<'_>,
        network_id: &str,
    ) -> Result<(), AttemptError> {
        self.controller
            .register_profile(profile.descriptor(), profile.path())?;
        self.controller.associate(network_id)
    }
}
