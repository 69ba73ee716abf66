//! Known beacons generator
//!
//! Builds 802.11 beacons for popular open network names, sent from a rogue
//! access point's address, and hands them to a frame-broadcasting engine
//! through the [`Extension`] interface.

pub mod config;
pub mod error;
pub mod extension;
pub mod known_beacons;
pub mod wireless;

pub use config::{Config, OversizePolicy};
pub use error::{KnownBeaconsError, Result};
pub use extension::{ChannelKey, Extension, FrameQueue, SharedData};
pub use known_beacons::{BeaconBuilder, BuildOutcome, KnownBeacon, KnownBeacons, TriggerState};
