/*!
 * Ephemeral WLAN profiles
 *
 * Every attempt writes a fresh profile descriptor carrying the candidate as
 * its key material. The file lives in a private directory owned by a
 * `ProfileSlot`; a slot hands out at most one `EphemeralProfile` at a time
 * (the handle mutably borrows it) and the handle deletes its file when
 * released or dropped.
 */

use crate::error::AttemptError;
use log::{debug, warn};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Logical fields of a WPA2-PSK infrastructure profile
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileDescriptor {
    pub name: String,
    pub ssid: String,
    pub connection_type: &'static str,
    pub connection_mode: &'static str,
    pub authentication: &'static str,
    pub encryption: &'static str,
    pub key_type: &'static str,
    /// Always false: the key material is stored in plaintext
    pub protected: bool,
    pub key_material: String,
}

impl ProfileDescriptor {
    /// Descriptor for one trial of `candidate` against `network_id`
    pub fn for_candidate(network_id: &str, candidate: &str) -> Self {
        Self {
            name: network_id.to_string(),
            ssid: network_id.to_string(),
            connection_type: "ESS",
            connection_mode: "auto",
            authentication: "WPA2PSK",
            encryption: "AES",
            key_type: "passPhrase",
            protected: false,
            key_material: candidate.to_string(),
        }
    }

    /// Render as a Windows WLAN profile document
    pub fn to_wlan_xml(&self) -> String {
        format!(
            r#"<?xml version="1.0"?>
<WLANProfile xmlns="http://www.microsoft.com/networking/WLAN/profile/v1">
    <name>{name}</name>
    <SSIDConfig>
        <SSID>
            <name>{ssid}</name>
        </SSID>
    </SSIDConfig>
    <connectionType>{connection_type}</connectionType>
    <connectionMode>{connection_mode}</connectionMode>
    <MSM>
        <security>
            <authEncryption>
                <authentication>{authentication}</authentication>
                <encryption>{encryption}</encryption>
                <useOneX>false</useOneX>
            </authEncryption>
            <sharedKey>
                <keyType>{key_type}</keyType>
                <protected>{protected}</protected>
                <keyMaterial>{key_material}</keyMaterial>
            </sharedKey>
        </security>
    </MSM>
</WLANProfile>
"#,
            name = xml_escape(&self.name),
            ssid = xml_escape(&self.ssid),
            connection_type = self.connection_type,
            connection_mode = self.connection_mode,
            authentication = self.authentication,
            encryption = self.encryption,
            key_type = self.key_type,
            protected = self.protected,
            key_material = xml_escape(&self.key_material),
        )
    }
}

fn xml_escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

/// Arena of one for ephemeral profiles
#[derive(Debug)]
pub struct ProfileSlot {
    dir: tempfile::TempDir,
    serial: u64,
    provisioned: u64,
    released: u64,
}

impl ProfileSlot {
    /// Create a slot backed by a fresh private temp directory
    pub fn new() -> std::io::Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix("wifi-profile-")
            .tempdir()?;
        Ok(Self {
            dir,
            serial: 0,
            provisioned: 0,
            released: 0,
        })
    }

    /// Write `descriptor` to disk and hand out the handle owning that file
    ///
    /// # Errors
    /// * `AttemptError::Provisioning` - the descriptor file could not be written
    pub fn provision(
        &mut self,
        descriptor: ProfileDescriptor,
    ) -> Result<EphemeralProfile<'_>, AttemptError> {
        self.serial += 1;
        let path = self.dir.path().join(format!("profile-{}.xml", self.serial));

        fs::write(&path, descriptor.to_wlan_xml())
            .map_err(|e| AttemptError::Provisioning(format!("write {path:?}: {e}")))?;

        self.provisioned += 1;
        debug!("provisioned profile {path:?}");

        Ok(EphemeralProfile {
            slot: self,
            descriptor,
            path,
            released: false,
        })
    }

    /// True when no profile file exists in the slot
    pub fn is_vacant(&self) -> bool {
        fs::read_dir(self.dir.path())
            .map(|mut entries| entries.next().is_none())
            .unwrap_or(true)
    }

    /// Number of profiles handed out so far
    pub fn provisioned(&self) -> u64 {
        self.provisioned
    }

    /// Number of profiles released so far, whether or not deletion succeeded
    pub fn released(&self) -> u64 {
        self.released
    }
}

/// A profile descriptor on disk, scoped to one attempt
#[derive(Debug)]
pub struct EphemeralProfile<'slot> {
    slot: &'slot mut ProfileSlot,
    descriptor: ProfileDescriptor,
    path: PathBuf,
    released: bool,
}

impl EphemeralProfile<'_> {
    pub fn descriptor(&self) -> &ProfileDescriptor {
        &self.descriptor
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Delete the profile file
    ///
    /// A file that is already gone counts as removed.
    pub fn release(mut self) -> Result<(), AttemptError> {
        self.remove()
    }

    fn remove(&mut self) -> Result<(), AttemptError> {
        if self.released {
            return Ok(());
        }
        self.released = true;
        self.slot.released += 1;

        match fs::remove_file(&self.path) {
            Ok(()) => {
                debug!("removed profile {:?}", self.path);
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(source) => Err(AttemptError::Cleanup {
                path: self.path.clone(),
                source,
            }),
        }
    }
}

impl Drop for EphemeralProfile<'_> {
    fn drop(&mut self) {
        if let Err(e) = self.remove() {
            warn!("{e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptor_fields() {
        let d = ProfileDescriptor::for_candidate("HomeNet", "hunter22");
        assert_eq!(d.name, "HomeNet");
        assert_eq!(d.ssid, "HomeNet");
        assert_eq!(d.connection_type, "ESS");
        assert_eq!(d.connection_mode, "auto");
        assert_eq!(d.authentication, "WPA2PSK");
        assert_eq!(d.encryption, "AES");
        assert_eq!(d.key_type, "passPhrase");
        assert!(!d.protected);
        assert_eq!(d.key_material, "hunter22");
    }

    #[test]
    fn test_wlan_xml_contains_all_fields() {
        let xml = ProfileDescriptor::for_candidate("HomeNet", "hunter22").to_wlan_xml();
        assert!(xml.contains("<name>HomeNet</name>"));
        assert!(xml.contains("<connectionType>ESS</connectionType>"));
        assert!(xml.contains("<connectionMode>auto</connectionMode>"));
        assert!(xml.contains("<authentication>WPA2PSK</authentication>"));
        assert!(xml.contains("<encryption>AES</encryption>"));
        assert!(xml.contains("<keyType>passPhrase</keyType>"));
        assert!(xml.contains("<protected>false</protected>"));
        assert!(xml.contains("<keyMaterial>hunter22</keyMaterial>"));
        assert_eq!(xml.matches("<name>HomeNet</name>").count(), 2);
    }

    #[test]
    fn test_wlan_xml_escapes_markup() {
        let xml = ProfileDescriptor::for_candidate("Cafe <5G>", "a&b\"c'").to_wlan_xml();
        assert!(xml.contains("<name>Cafe &lt;5G&gt;</name>"));
        assert!(xml.contains("<keyMaterial>a&amp;b&quot;c&apos;</keyMaterial>"));
    }

    #[test]
    fn test_release_removes_file() {
        let mut slot = ProfileSlot::new().unwrap();
        let profile = slot
            .provision(ProfileDescriptor::for_candidate("net", "pw"))
            .unwrap();
        let path = profile.path().to_path_buf();
        assert!(path.exists());
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            profile.descriptor().to_wlan_xml()
        );

        profile.release().unwrap();
        assert!(!path.exists());
        assert!(slot.is_vacant());
        assert_eq!(slot.provisioned(), 1);
        assert_eq!(slot.released(), 1);
    }

    #[test]
    fn test_drop_releases_file() {
        let mut slot = ProfileSlot::new().unwrap();
        {
            let _profile = slot
                .provision(ProfileDescriptor::for_candidate("net", "pw"))
                .unwrap();
        }
        assert!(slot.is_vacant());
        assert_eq!(slot.released(), 1);
    }

    #[test]
    fn test_release_tolerates_missing_file() {
        let mut slot = ProfileSlot::new().unwrap();
        let profile = slot
            .provision(ProfileDescriptor::for_candidate("net", "pw"))
            .unwrap();
        fs::remove_file(profile.path()).unwrap();
        assert!(profile.release().is_ok());
        assert_eq!(slot.released(), 1);
    }

    #[test]
    fn test_each_attempt_gets_fresh_file() {
        let mut slot = ProfileSlot::new().unwrap();
        let first = slot
            .provision(ProfileDescriptor::for_candidate("net", "one"))
            .unwrap();
        let first_path = first.path().to_path_buf();
        first.release().unwrap();

        let second = slot
            .provision(ProfileDescriptor::for_candidate("net", "two"))
            .unwrap();
        assert_ne!(second.path(), first_path.as_path());
        assert!(fs::read_to_string(second.path())
            .unwrap()
            .contains("<keyMaterial>two</keyMaterial>"));
        second.release().unwrap();
        assert!(slot.is_vacant());
    }
}
