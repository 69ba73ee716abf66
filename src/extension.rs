//! Extension Interface
//!
//! The contract between the frame-broadcasting engine and the frame
//! generators it hosts. The engine calls `get_packet` once per received
//! frame and transmits whatever the returned queue holds; `status_message`
//! and `interesting_channels` are polled alongside.

use std::collections::HashMap;
use std::fmt;

use crate::config::Config;
use crate::wireless::MacAddr;

/// Which channel a queued frame is meant for.
///
/// The engine sends `Channel(n)` frames only while its radio sits on
/// channel `n`. Known beacons are channel-agnostic and queue under `All`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ChannelKey {
    /// Send on whatever channel the radio is on
    All,
    /// Send only while the radio is tuned to this channel
    Channel(u8),
}

impl fmt::Display for ChannelKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChannelKey::All => write!(f, "*"),
            ChannelKey::Channel(c) => write!(f, "{}", c),
        }
    }
}

/// Encoded frames (radiotap + 802.11), in transmission order, per channel
pub type FrameQueue = HashMap<ChannelKey, Vec<Vec<u8>>>;

/// Engine state shared read-only with every extension
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SharedData {
    /// Address the rogue AP transmits from
    pub rogue_ap_mac: MacAddr,
    /// Known beacons feature switch
    pub known_beacons: bool,
    /// Channel of the AP being impersonated
    pub target_ap_channel: u8,
}

impl From<&Config> for SharedData {
    fn from(config: &Config) -> Self {
        Self {
            rogue_ap_mac: config.ap.rogue_ap_mac,
            known_beacons: config.known_beacons.enabled,
            target_ap_channel: config.ap.target_channel,
        }
    }
}

/// A frame generator the engine can host
pub trait Extension {
    /// Short identifier used in logs
    fn name(&self) -> &'static str;

    /// Called for every frame the engine receives. Returns the frames to
    /// transmit, keyed by channel.
    fn get_packet(&mut self, received: &[u8]) -> &FrameQueue;

    /// Notifications for the operator. A query: the engine decides whether
    /// to show a repeated message again.
    fn status_message(&self) -> Vec<String>;

    /// Channels the engine should stay on for this extension
    fn interesting_channels(&self) -> Vec<u8>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_key_display() {
        assert_eq!(ChannelKey::All.to_string(), "*");
        assert_eq!(ChannelKey::Channel(11).to_string(), "11");
    }

    #[test]
    fn test_shared_data_from_config() {
        let mut config = Config::default();
        config.known_beacons.enabled = true;
        config.ap.target_channel = 1;

        let shared = SharedData::from(&config);
        assert!(shared.known_beacons);
        assert_eq!(shared.target_ap_channel, 1);
        assert_eq!(shared.rogue_ap_mac, config.ap.rogue_ap_mac);
    }
}
