//! Configuration file support
//!
//! TOML configuration with environment variable overrides. The `[ap]`
//! section stands in for the values the hosting engine would otherwise
//! hand over: the rogue AP's MAC and the channel it serves on.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{KnownBeaconsError, Result};
use crate::wireless::radiotap::channel_to_freq;
use crate::wireless::MacAddr;

/// Root configuration structure
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Known beacons generation
    pub known_beacons: KnownBeaconsSettings,

    /// Impersonating access point
    pub ap: ApSettings,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// What to do with an SSID too long for an SSID element
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OversizePolicy {
    /// Drop the entry and log a warning
    #[default]
    Skip,
    /// Keep the longest prefix that fits on a character boundary
    Truncate,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct KnownBeaconsSettings {
    /// Broadcast known beacons
    pub enabled: bool,
    /// Line-oriented list of popular open network names
    pub ssid_file: PathBuf,
    /// Handling of SSIDs longer than 32 bytes
    pub oversize: OversizePolicy,
}

impl Default for KnownBeaconsSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            ssid_file: PathBuf::from(DEFAULT_SSID_FILE),
            oversize: OversizePolicy::default(),
        }
    }
}

pub const DEFAULT_SSID_FILE: &str = "data/known-open-wlans";

pub const DEFAULT_CONFIG_FILE: &str = "known-beacons.toml";

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ApSettings {
    /// Source address and BSSID of every generated beacon
    pub rogue_ap_mac: MacAddr,
    /// Channel the rogue AP operates on
    pub target_channel: u8,
}

impl Default for ApSettings {
    fn default() -> Self {
        Self {
            rogue_ap_mac: MacAddr::new([0x02, 0x00, 0x00, 0x00, 0x00, 0x01]),
            target_channel: 6,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter when RUST_LOG is unset
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            KnownBeaconsError::Config(format!(
                "Failed to read config file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        let mut config = Self::from_str(&content)?;
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Load `known-beacons.toml` from the working directory if present,
    /// otherwise defaults with environment overrides
    pub fn load_or_default() -> Result<Self> {
        if Path::new(DEFAULT_CONFIG_FILE).exists() {
            return Self::from_file(DEFAULT_CONFIG_FILE);
        }
        let mut config = Self::default();
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from a TOML string
    pub fn from_str(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| KnownBeaconsError::Config(format!("Failed to parse config: {}", e)))
    }

    /// Serialize configuration to a TOML string
    pub fn to_string(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| KnownBeaconsError::Config(format!("Failed to serialize config: {}", e)))
    }

    /// Apply environment variable overrides.
    ///
    /// Supported environment variables:
    /// - KNOWN_BEACONS_ENABLED
    /// - KNOWN_BEACONS_SSID_FILE
    /// - KNOWN_BEACONS_AP_MAC
    /// - KNOWN_BEACONS_CHANNEL
    ///
    /// A variable that is set but cannot be parsed is an error.
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    fn apply_overrides<F>(&mut self, var: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let invalid = |key: &str, value: &str, e: &dyn std::fmt::Display| {
            KnownBeaconsError::Config(format!("Invalid {}={:?}: {}", key, value, e))
        };

        if let Some(v) = var("KNOWN_BEACONS_ENABLED") {
            self.known_beacons.enabled = v
                .parse()
                .map_err(|e| invalid("KNOWN_BEACONS_ENABLED", &v, &e))?;
        }
        if let Some(v) = var("KNOWN_BEACONS_SSID_FILE") {
            self.known_beacons.ssid_file = PathBuf::from(v);
        }
        if let Some(v) = var("KNOWN_BEACONS_AP_MAC") {
            self.ap.rogue_ap_mac = v
                .parse()
                .map_err(|e| invalid("KNOWN_BEACONS_AP_MAC", &v, &e))?;
        }
        if let Some(v) = var("KNOWN_BEACONS_CHANNEL") {
            self.ap.target_channel = v
                .parse()
                .map_err(|e| invalid("KNOWN_BEACONS_CHANNEL", &v, &e))?;
        }
        Ok(())
    }

    /// Reject values no beacon could carry
    pub fn validate(&self) -> Result<()> {
        if channel_to_freq(self.ap.target_channel).is_none() {
            return Err(KnownBeaconsError::Config(format!(
                "target_channel {} is not a 2.4 GHz or 5 GHz channel",
                self.ap.target_channel
            )));
        }
        if self.ap.rogue_ap_mac.is_multicast() {
            return Err(KnownBeaconsError::Config(format!(
                "rogue_ap_mac {} is a group address",
                self.ap.rogue_ap_mac
            )));
        }
        Ok(())
    }

    /// Generate default config file content with comments
    pub fn default_with_comments() -> &'static str {
        DEFAULT_CONFIG
    }
}

const DEFAULT_CONFIG: &str = r#"# known-beacons configuration

[known_beacons]
# Broadcast beacons for popular open networks
enabled = true
# One SSID per line; '#' starts a comment line
ssid_file = "data/known-open-wlans"
# SSIDs over 32 bytes: "skip" or "truncate"
oversize = "skip"

[ap]
rogue_ap_mac = "02:00:00:00:00:01"
target_channel = 6

[logging]
level = "info"
"#;
