/*!
 * Platform-specific network commands
 *
 * Windows registers the profile document with `netsh`; Linux turns the same
 * descriptor into a NetworkManager connection with `nmcli`. macOS has no
 * profile import, so the key is held until `networksetup` joins the network.
 * Reachability is a single `ping` with the platform's count and timeout flags.
 */

use crate::attempt::ConnectionController;
use crate::error::AttemptError;
use crate::probe::ReachabilityChecker;
use crate::profile::ProfileDescriptor;
use log::debug;
use std::path::Path;
use std::process::{Command, Output, Stdio};
use std::time::{Duration, Instant};

const PING_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Airport interface used by `networksetup` when none is configured
#[cfg_attr(not(target_os = "macos"), allow(dead_code))]
const MACOS_DEFAULT_INTERFACE: &str = "en0";

/// Network configuration service backed by the OS tools
#[derive(Debug, Clone, Default)]
pub struct SystemController {
    interface: Option<String>,
    /// Key registered for the next `networksetup` join
    #[cfg_attr(not(target_os = "macos"), allow(dead_code))]
    pending_key: Option<String>,
}

impl SystemController {
    /// # Arguments
    /// * `interface` - WiFi interface (wlan0, "Wi-Fi", en0); platform default when `None`
    pub fn new(interface: Option<String>) -> Self {
        Self {
            interface,
            pending_key: None,
        }
    }
}

impl ConnectionController for SystemController {
    #[allow(unused_variables)]
    fn register_profile(
        &mut self,
        descriptor: &ProfileDescriptor,
        file: &Path,
    ) -> Result<(), AttemptError> {
        #[cfg(target_os = "windows")]
        {
            use std::os::windows::process::CommandExt;

            let mut cmd = Command::new("netsh");
            cmd.args(["wlan", "add", "profile"])
                .raw_arg(format!("filename=\"{}\"", file.display()));
            if let Some(iface) = &self.interface {
                cmd.raw_arg(format!("interface=\"{iface}\""));
            }
            run(cmd, "netsh").map_err(AttemptError::Provisioning)
        }

        #[cfg(target_os = "linux")]
        {
            // A stale connection with the same name would shadow the new key
            let mut delete = Command::new("nmcli");
            delete.args(["connection", "delete", "id", &descriptor.name]);
            if let Err(e) = run(delete, "nmcli") {
                debug!("no previous connection removed: {e}");
            }

            let mut add = Command::new("nmcli");
            add.args(nmcli_add_args(descriptor, self.interface.as_deref()));
            run(add, "nmcli").map_err(AttemptError::Provisioning)
        }

        #[cfg(target_os = "macos")]
        {
            self.pending_key = Some(descriptor.key_material.clone());
            Ok(())
        }

        #[cfg(not(any(target_os = "linux", target_os = "windows", target_os = "macos")))]
        {
            Err(AttemptError::Unsupported)
        }
    }

    #[allow(unused_variables)]
    fn associate(&mut self, network_id: &str) -> Result<(), AttemptError> {
        #[cfg(target_os = "windows")]
        {
            use std::os::windows::process::CommandExt;

            let mut cmd = Command::new("netsh");
            cmd.args(["wlan", "connect"])
                .raw_arg(format!("name=\"{network_id}\""));
            if let Some(iface) = &self.interface {
                cmd.raw_arg(format!("interface=\"{iface}\""));
            }
            run(cmd, "netsh").map_err(AttemptError::Association)
        }

        #[cfg(target_os = "linux")]
        {
            let mut cmd = Command::new("nmcli");
            cmd.args(["connection", "up", "id", network_id]);
            run(cmd, "nmcli").map_err(AttemptError::Association)
        }

        #[cfg(target_os = "macos")]
        {
            let key = self.pending_key.take().ok_or_else(|| {
                AttemptError::Association("no profile registered before joining".into())
            })?;
            let interface = self.interface.as_deref().unwrap_or(MACOS_DEFAULT_INTERFACE);

            let mut cmd = Command::new("networksetup");
            cmd.args(networksetup_join_args(interface, network_id, &key));
            let output = cmd
                .stdin(Stdio::null())
                .output()
                .map_err(|e| {
                    AttemptError::Association(format!("failed to execute networksetup: {e}"))
                })?;

            // Exit status stays 0 on a rejected key
            let text = format!(
                "{}{}",
                String::from_utf8_lossy(&output.stdout),
                String::from_utf8_lossy(&output.stderr)
            );
            if !output.status.success() || networksetup_join_failed(&text) {
                return Err(AttemptError::Association(format!(
                    "networksetup: {}",
                    text.trim()
                )));
            }
            Ok(())
        }

        #[cfg(not(any(target_os = "linux", target_os = "windows", target_os = "macos")))]
        {
            Err(AttemptError::Unsupported)
        }
    }
}

/// NetworkManager properties equivalent to the WLAN profile document
#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
fn nmcli_add_args(descriptor: &ProfileDescriptor, interface: Option<&str>) -> Vec<String> {
    let autoconnect = if descriptor.connection_mode == "auto" {
        "yes"
    } else {
        "no"
    };

    [
        "connection",
        "add",
        "type",
        "wifi",
        "con-name",
        descriptor.name.as_str(),
        "ifname",
        interface.unwrap_or("*"),
        "ssid",
        descriptor.ssid.as_str(),
        "802-11-wireless.mode",
        "infrastructure",
        "connection.autoconnect",
        autoconnect,
        "wifi-sec.key-mgmt",
        "wpa-psk",
        "wifi-sec.proto",
        "rsn",
        "wifi-sec.pairwise",
        "ccmp",
        "wifi-sec.psk",
        descriptor.key_material.as_str(),
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

#[cfg_attr(not(target_os = "macos"), allow(dead_code))]
fn networksetup_join_args(interface: &str, network_id: &str, key: &str) -> Vec<String> {
    ["-setairportnetwork", interface, network_id, key]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

/// True when `networksetup` printed one of its join failure messages
#[cfg_attr(not(target_os = "macos"), allow(dead_code))]
fn networksetup_join_failed(output: &str) -> bool {
    ["Failed to join network", "Error:", "could not be completed"]
        .iter()
        .any(|marker| output.contains(marker))
}

/// Run a command to completion; `Err` carries stderr or the spawn failure
#[cfg_attr(not(any(target_os = "linux", target_os = "windows")), allow(dead_code))]
fn run(mut cmd: Command, program: &str) -> Result<(), String> {
    debug!("running {program} {:?}", cmd.get_args().collect::<Vec<_>>());
    let output: Output = cmd
        .stdin(Stdio::null())
        .output()
        .map_err(|e| format!("failed to execute {program}: {e}"))?;

    if output.status.success() {
        Ok(())
    } else {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let stdout = String::from_utf8_lossy(&output.stdout);
        let detail = if stderr.trim().is_empty() {
            stdout.trim().to_string()
        } else {
            stderr.trim().to_string()
        };
        Err(format!("{program} exited with {}: {detail}", output.status))
    }
}

/// Reachability via one ICMP echo
#[derive(Debug, Clone, Copy, Default)]
pub struct PingChecker;

impl PingChecker {
    fn ping_args(host: &str, timeout: Duration) -> Vec<String> {
        #[cfg(target_os = "windows")]
        {
            vec![
                "-n".into(),
                "1".into(),
                "-w".into(),
                timeout.as_millis().max(1).to_string(),
                host.into(),
            ]
        }

        #[cfg(target_os = "linux")]
        {
            vec![
                "-c".into(),
                "1".into(),
                "-W".into(),
                timeout.as_secs().max(1).to_string(),
                host.into(),
            ]
        }

        #[cfg(not(any(target_os = "linux", target_os = "windows")))]
        {
            // BSD ping: -t is the overall timeout in seconds
            vec![
                "-c".into(),
                "1".into(),
                "-t".into(),
                timeout.as_secs().max(1).to_string(),
                host.into(),
            ]
        }
    }
}

impl ReachabilityChecker for PingChecker {
    fn check(&mut self, host: &str, timeout: Duration) -> Result<(), AttemptError> {
        let mut child = Command::new("ping")
            .args(Self::ping_args(host, timeout))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| AttemptError::Unreachable(format!("failed to execute ping: {e}")))?;

        let deadline = Instant::now() + timeout;
        loop {
            match child.try_wait() {
                Ok(Some(status)) if status.success() => return Ok(()),
                Ok(Some(status)) => {
                    return Err(AttemptError::Unreachable(format!("{host}: ping {status}")))
                }
                Ok(None) if Instant::now() >= deadline => {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(AttemptError::ReachabilityTimeout(timeout));
                }
                Ok(None) => std::thread::sleep(PING_POLL_INTERVAL),
                Err(e) => {
                    let _ = child.kill();
                    return Err(AttemptError::Unreachable(format!("{host}: {e}")));
                }
            }
        }
    }
}
