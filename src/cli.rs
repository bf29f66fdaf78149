use crate::config::TrialConfig;
use crate::core::password_gen::{
    CandidateSource, DictionaryList, ExhaustiveGenerator, DEFAULT_CHARSET,
};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use dialoguer::Input;
use std::path::PathBuf;

/// Lengths used when the requested range is unusable
pub const FALLBACK_LENGTHS: (usize, usize) = (1, 4);

/// Dictionary file looked up next to the executable
pub const DEFAULT_WORDLIST: &str = "passwords.txt";

#[derive(Parser)]
#[command(name = "bruteforce-wifi-online")]
#[command(author = "maxgfr")]
#[command(version)]
#[command(about = "Online WPA2-PSK password trials against one network - Educational use only", long_about = None)]
pub struct Args {
    /// Target network SSID (prompted when omitted)
    #[arg(short, long, global = true)]
    pub ssid: Option<String>,

    /// JSON file with run settings
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Seconds to wait after association before checking connectivity
    #[arg(long, global = true)]
    pub settle: Option<u64>,

    /// Seconds allowed for the connectivity check
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// Host pinged to confirm internet access
    #[arg(long, global = true)]
    pub host: Option<String>,

    /// Pause between failed attempts, in milliseconds
    #[arg(long, global = true)]
    pub delay_ms: Option<u64>,

    /// WiFi interface to use (e.g., wlan0, "Wi-Fi")
    #[arg(short, long, global = true)]
    pub interface: Option<String>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Candidate source
    #[command(subcommand)]
    pub mode: Mode,
}

#[derive(Subcommand)]
pub enum Mode {
    /// Try every combination of a charset, shortest first
    ///
    /// Example: bruteforce-wifi-online exhaustive --ssid HomeNet --charset 0123456789 --min 8 --max 8
    Exhaustive {
        /// Symbols to combine (prompted when omitted)
        #[arg(long)]
        charset: Option<String>,

        /// Minimum password length (prompted when omitted)
        #[arg(long)]
        min: Option<usize>,

        /// Maximum password length (prompted when omitted)
        #[arg(long)]
        max: Option<usize>,
    },

    /// Try each line of a password list in order
    ///
    /// Example: bruteforce-wifi-online dictionary --ssid HomeNet passwords.txt
    Dictionary {
        /// Password list, one per line (prompted when omitted)
        #[arg(value_name = "WORDLIST")]
        wordlist: Option<PathBuf>,
    },
}

impl Args {
    /// Defaults, then the config file, then command-line overrides
    pub fn trial_config(&self) -> Result<TrialConfig> {
        let mut config = match &self.config {
            Some(path) => TrialConfig::load_from_file(path)?,
            None => TrialConfig::default(),
        };

        if let Some(settle) = self.settle {
            config.settle_secs = settle;
        }
        if let Some(timeout) = self.timeout {
            config.probe_timeout_secs = timeout;
        }
        if let Some(host) = &self.host {
            config.probe_host = host.clone();
        }
        if self.delay_ms.is_some() {
            config.inter_attempt_delay_ms = self.delay_ms;
        }
        if self.interface.is_some() {
            config.interface = self.interface.clone();
        }
        Ok(config)
    }

    pub fn network_id(&self) -> Result<String> {
        match &self.ssid {
            Some(ssid) if !ssid.trim().is_empty() => Ok(ssid.clone()),
            _ => {
                let ssid: String = Input::new()
                    .with_prompt("Enter Wi-Fi network name (SSID)")
                    .interact_text()
                    .context("Failed to read network name")?;
                Ok(ssid)
            }
        }
    }

    /// Build the candidate source, prompting for anything left out
    pub fn candidate_source(&self) -> Result<CandidateSource> {
        match &self.mode {
            Mode::Exhaustive { charset, min, max } => {
                let charset = match charset {
                    Some(c) => c.clone(),
                    None => prompt_or_default("Charset", DEFAULT_CHARSET)?,
                };
                let charset = charset.trim();
                let charset = if charset.is_empty() {
                    DEFAULT_CHARSET
                } else {
                    charset
                };

                let (min, max) = match (min, max) {
                    (Some(min), Some(max)) => (Some(*min), Some(*max)),
                    _ => (
                        prompt_or_default("Minimum password length", "")?.trim().parse().ok(),
                        prompt_or_default("Maximum password length", "")?.trim().parse().ok(),
                    ),
                };
                let (min, max) = lengths_or_fallback(min, max);

                println!("Charset: {}", charset.cyan());
                println!("Length: {min}-{max}");

                let gen = ExhaustiveGenerator::new(charset, min, max)?;
                Ok(CandidateSource::Exhaustive(gen))
            }
            Mode::Dictionary { wordlist } => {
                let path = match wordlist {
                    Some(path) => path.clone(),
                    None => {
                        let default = default_wordlist_path()?;
                        let raw = prompt_or_default(
                            "Password list",
                            &default.display().to_string(),
                        )?;
                        PathBuf::from(raw.trim())
                    }
                };

                if !path.exists() {
                    anyhow::bail!("'{}' not found", path.display());
                }
                let list = DictionaryList::open(&path)?;
                Ok(CandidateSource::Dictionary(list))
            }
        }
    }
}

/// Accept `min..=max` only when both parse, `min >= 1` and `min <= max`
pub fn lengths_or_fallback(min: Option<usize>, max: Option<usize>) -> (usize, usize) {
    match (min, max) {
        (Some(min), Some(max)) if min >= 1 && min <= max => (min, max),
        _ => {
            println!(
                "{}",
                "Invalid length values, using default settings".yellow()
            );
            FALLBACK_LENGTHS
        }
    }
}

/// `passwords.txt` in the directory holding the executable
pub fn default_wordlist_path() -> Result<PathBuf> {
    let exe = std::env::current_exe().context("Failed to locate executable")?;
    let dir = exe
        .parent()
        .context("Executable has no parent directory")?;
    Ok(dir.join(DEFAULT_WORDLIST))
}

fn prompt_or_default(prompt: &str, default: &str) -> Result<String> {
    let mut input = Input::<String>::new().with_prompt(prompt).allow_empty(true);
    if !default.is_empty() {
        input = input.default(default.to_string());
    }
    input
        .interact_text()
        .with_context(|| format!("Failed to read {}", prompt.to_lowercase()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_lengths_or_fallback() {
        assert_eq!(lengths_or_fallback(Some(2), Some(6)), (2, 6));
        assert_eq!(lengths_or_fallback(Some(3), Some(3)), (3, 3));
        assert_eq!(lengths_or_fallback(None, Some(6)), FALLBACK_LENGTHS);
        assert_eq!(lengths_or_fallback(Some(5), Some(2)), FALLBACK_LENGTHS);
        assert_eq!(lengths_or_fallback(Some(0), Some(2)), FALLBACK_LENGTHS);
    }

    #[test]
    fn test_parse_exhaustive_args() {
        let args = Args::try_parse_from([
            "bruteforce-wifi-online",
            "exhaustive",
            "--ssid",
            "HomeNet",
            "--charset",
            "ab",
            "--min",
            "1",
            "--max",
            "2",
            "--delay-ms",
            "0",
        ])
        .unwrap();

        assert_eq!(args.network_id().unwrap(), "HomeNet");
        let source = args.candidate_source().unwrap();
        assert_eq!(source.total(), 6);
        assert_eq!(
            args.trial_config().unwrap().inter_attempt_delay_ms,
            Some(0)
        );
    }

    #[test]
    fn test_invalid_range_on_command_line_falls_back() {
        let args = Args::try_parse_from([
            "bruteforce-wifi-online",
            "exhaustive",
            "--charset",
            "ab",
            "--min",
            "4",
            "--max",
            "1",
        ])
        .unwrap();

        let source = args.candidate_source().unwrap();
        assert_eq!(source.total(), 2 + 4 + 8 + 16);
    }

    #[test]
    fn test_dictionary_args() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "pass1\n\n  pass2  ").unwrap();

        let path = file.path().to_str().unwrap().to_string();
        let args =
            Args::try_parse_from(["bruteforce-wifi-online", "dictionary", path.as_str()]).unwrap();

        let source = args.candidate_source().unwrap();
        assert_eq!(source.collect::<Vec<_>>(), vec!["pass1", "pass2"]);
    }

    #[test]
    fn test_dictionary_empty_file_is_fatal() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let path = file.path().to_str().unwrap().to_string();
        let args =
            Args::try_parse_from(["bruteforce-wifi-online", "dictionary", path.as_str()]).unwrap();

        assert!(args.candidate_source().is_err());
    }

    #[test]
    fn test_overrides_apply_over_config_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"settle_secs": 9, "probe_host": "10.0.0.1"}}"#).unwrap();
        let path = file.path().to_str().unwrap().to_string();

        let args = Args::try_parse_from([
            "bruteforce-wifi-online",
            "--config",
            path.as_str(),
            "--host",
            "1.1.1.1",
            "dictionary",
            "list.txt",
        ])
        .unwrap();

        let config = args.trial_config().unwrap();
        assert_eq!(config.settle_secs, 9);
        assert_eq!(config.probe_host, "1.1.1.1");
    }

    #[test]
    fn test_default_wordlist_next_to_executable() {
        let path = default_wordlist_path().unwrap();
        assert_eq!(path.file_name().unwrap(), DEFAULT_WORDLIST);
    }
}
