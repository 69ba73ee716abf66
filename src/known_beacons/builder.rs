//! Beacon Frame Builder
//!
//! One beacon per SSID, sent from the rogue AP's address and advertising
//! the fixed capability and rate set of a typical open hotspot.

use tracing::{debug, warn};

use super::source::SsidSource;
use crate::config::OversizePolicy;
use crate::error::{KnownBeaconsError, Result};
use crate::wireless::ieee80211::{
    capability, BeaconFrame, FrameControl, FrameSubtype, InformationElement, MacAddr, MgmtHeader,
    DEFAULT_BEACON_INTERVAL, MAX_SSID_LEN, MGMT_HEADER_LEN,
};
use crate::wireless::radiotap::RadiotapHeader;

/// Capability information of every known beacon (0x2105)
pub const KNOWN_BEACON_CAPABILITY: u16 =
    capability::DSSS_OFDM | capability::SPECTRUM_MGMT | capability::CF_POLLABLE | capability::ESS;

/// 6, 9, 12, 18, 24, 36, 48 and 54 Mbps in 500 kbps units
pub const AP_RATES: [u8; 8] = [0x0c, 0x12, 0x18, 0x24, 0x30, 0x48, 0x60, 0x6c];

/// A fully assembled beacon, ready to be handed to the injector
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KnownBeacon {
    pub radiotap: RadiotapHeader,
    pub header: MgmtHeader,
    pub body: BeaconFrame,
}

impl KnownBeacon {
    pub fn ssid(&self) -> &str {
        &self.body.ssid
    }

    /// Radiotap header, 802.11 header and beacon body
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out =
            Vec::with_capacity(self.radiotap.length as usize + MGMT_HEADER_LEN + self.body.body_len());
        self.radiotap.write_to(&mut out);
        self.header.write_to(&mut out);
        self.body.write_body(&mut out);
        out
    }
}

/// Builds known beacons for one impersonating AP
#[derive(Debug, Clone)]
pub struct BeaconBuilder {
    bssid: MacAddr,
    channel: u8,
    oversize: OversizePolicy,
}

impl BeaconBuilder {
    /// `channel` goes into the DS Parameter Set element
    pub fn new(bssid: MacAddr, channel: u8) -> Self {
        Self {
            bssid,
            channel,
            oversize: OversizePolicy::default(),
        }
    }

    pub fn with_oversize_policy(mut self, oversize: OversizePolicy) -> Self {
        self.oversize = oversize;
        self
    }

    /// Assemble the beacon for one SSID. SSIDs over 32 bytes are refused.
    pub fn beacon(&self, ssid: &str) -> Result<KnownBeacon> {
        let ies = vec![
            InformationElement::ssid(ssid)?,
            InformationElement::supported_rates(&AP_RATES)?,
            InformationElement::ds_parameter(self.channel),
        ];

        Ok(KnownBeacon {
            radiotap: RadiotapHeader::minimal(),
            header: MgmtHeader {
                frame_control: FrameControl::management(FrameSubtype::Beacon),
                duration: 0,
                addr1: MacAddr::BROADCAST,
                addr2: self.bssid,
                addr3: self.bssid,
                seq_control: 0,
            },
            body: BeaconFrame {
                timestamp: 0,
                interval: DEFAULT_BEACON_INTERVAL,
                capability: KNOWN_BEACON_CAPABILITY,
                ssid: ssid.to_string(),
                channel: Some(self.channel),
                rates: AP_RATES.to_vec(),
                ies,
            },
        })
    }

    /// Read the source once and build one beacon per SSID, in source order.
    ///
    /// Only an unreadable source is an error; oversized SSIDs are handled
    /// by the oversize policy.
    pub fn build<S: SsidSource + ?Sized>(&self, source: &S) -> Result<Vec<KnownBeacon>> {
        let ssids = source.read_ssids()?;
        let mut beacons = Vec::with_capacity(ssids.len());

        for ssid in &ssids {
            match self.beacon(ssid) {
                Ok(beacon) => beacons.push(beacon),
                Err(KnownBeaconsError::FrameConstruction(reason)) => match self.oversize {
                    OversizePolicy::Skip => {
                        warn!("Skipping known beacon: {}", reason);
                    }
                    OversizePolicy::Truncate => {
                        let cut = truncate_ssid(ssid);
                        debug!("Truncated SSID {:?} to {:?}", ssid, cut);
                        beacons.push(self.beacon(cut)?);
                    }
                },
                Err(e) => return Err(e),
            }
        }

        debug!(
            "Built {} beacons from {} SSIDs in {}",
            beacons.len(),
            ssids.len(),
            source.describe()
        );
        Ok(beacons)
    }
}

/// Longest prefix of at most 32 bytes that ends on a character boundary
pub fn truncate_ssid(ssid: &str) -> &str {
    if ssid.len() <= MAX_SSID_LEN {
        return ssid;
    }
    let mut end = MAX_SSID_LEN;
    while !ssid.is_char_boundary(end) {
        end -= 1;
    }
    &ssid[..end]
}
