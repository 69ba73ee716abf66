//! 802.11 Management Frame Types
//!
//! Beacon bodies: fixed parameters followed by information elements.
//! Bodies can be parsed and written.

use super::frame::FrameSubtype;
use crate::error::{KnownBeaconsError, Result};

/// Longest SSID an SSID element may carry
pub const MAX_SSID_LEN: usize = 32;

/// Longest payload of any information element
pub const MAX_IE_LEN: usize = 255;

/// Default beacon interval in TUs (1 TU = 1024 microseconds)
pub const DEFAULT_BEACON_INTERVAL: u16 = 100;

/// Management frame variants
#[derive(Debug, Clone)]
pub enum ManagementFrame {
    Beacon(BeaconFrame),
    Unknown(Vec<u8>),
}

impl ManagementFrame {
    pub fn parse(subtype: FrameSubtype, data: &[u8]) -> Option<Self> {
        match subtype {
            FrameSubtype::Beacon => BeaconFrame::parse(data).map(ManagementFrame::Beacon),
            _ => Some(ManagementFrame::Unknown(data.to_vec())),
        }
    }
}

/// Information Element (IE) types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ElementId {
    Ssid = 0,
    SupportedRates = 1,
    DsParameter = 3,
    /// Any element a known beacon does not carry
    Unknown = 255,
}

impl From<u8> for ElementId {
    fn from(val: u8) -> Self {
        match val {
            0 => ElementId::Ssid,
            1 => ElementId::SupportedRates,
            3 => ElementId::DsParameter,
            _ => ElementId::Unknown,
        }
    }
}

/// Information element: id, length byte, payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InformationElement {
    pub id: ElementId,
    pub raw_id: u8,
    pub data: Vec<u8>,
}

impl InformationElement {
    /// Build an element, refusing payloads the length byte cannot describe
    pub fn new(id: ElementId, data: &[u8]) -> Result<Self> {
        if data.len() > MAX_IE_LEN {
            return Err(KnownBeaconsError::FrameConstruction(format!(
                "{:?} element payload is {} bytes, limit is {}",
                id,
                data.len(),
                MAX_IE_LEN
            )));
        }

        Ok(Self {
            id,
            raw_id: id as u8,
            data: data.to_vec(),
        })
    }

    /// SSID element; the SSID must fit in 32 bytes
    pub fn ssid(ssid: &str) -> Result<Self> {
        if ssid.len() > MAX_SSID_LEN {
            return Err(KnownBeaconsError::FrameConstruction(format!(
                "SSID {:?} is {} bytes, limit is {}",
                ssid,
                ssid.len(),
                MAX_SSID_LEN
            )));
        }
        Self::new(ElementId::Ssid, ssid.as_bytes())
    }

    pub fn supported_rates(rates: &[u8]) -> Result<Self> {
        Self::new(ElementId::SupportedRates, rates)
    }

    pub fn ds_parameter(channel: u8) -> Self {
        Self {
            id: ElementId::DsParameter,
            raw_id: ElementId::DsParameter as u8,
            data: vec![channel],
        }
    }

    /// Encoded size including the two header bytes
    pub fn encoded_len(&self) -> usize {
        2 + self.data.len()
    }

    pub fn write_to(&self, out: &mut Vec<u8>) {
        out.push(self.raw_id);
        out.push(self.data.len() as u8);
        out.extend_from_slice(&self.data);
    }
}

/// Parse information elements from management frame body
pub fn parse_ies(data: &[u8]) -> Vec<InformationElement> {
    let mut ies = Vec::new();
    let mut pos = 0;

    while pos + 2 <= data.len() {
        let id = data[pos];
        let len = data[pos + 1] as usize;
        pos += 2;

        if pos + len > data.len() {
            break;
        }

        ies.push(InformationElement {
            id: ElementId::from(id),
            raw_id: id,
            data: data[pos..pos + len].to_vec(),
        });

        pos += len;
    }

    ies
}

/// Capability information bits advertised by known beacons
pub mod capability {
    pub const ESS: u16 = 0x0001;
    pub const CF_POLLABLE: u16 = 0x0004;
    pub const SPECTRUM_MGMT: u16 = 0x0100;
    pub const DSSS_OFDM: u16 = 0x2000;
}

/// Beacon frame body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BeaconFrame {
    /// Timestamp (microseconds)
    pub timestamp: u64,
    /// Beacon interval (TUs)
    pub interval: u16,
    /// Capability information
    pub capability: u16,
    /// SSID
    pub ssid: String,
    /// Current channel
    pub channel: Option<u8>,
    /// Supported rates
    pub rates: Vec<u8>,
    /// Information elements in frame order
    pub ies: Vec<InformationElement>,
}

impl BeaconFrame {
    pub fn parse(data: &[u8]) -> Option<Self> {
        if data.len() < 12 {
            return None;
        }

        let timestamp = u64::from_le_bytes([
            data[0], data[1], data[2], data[3],
            data[4], data[5], data[6], data[7],
        ]);
        let interval = u16::from_le_bytes([data[8], data[9]]);
        let capability = u16::from_le_bytes([data[10], data[11]]);

        let ies = parse_ies(&data[12..]);

        let mut beacon = BeaconFrame {
            timestamp,
            interval,
            capability,
            ssid: String::new(),
            channel: None,
            rates: Vec::new(),
            ies: Vec::new(),
        };

        // Extract common IEs
        for ie in &ies {
            match ie.id {
                ElementId::Ssid => {
                    beacon.ssid = String::from_utf8_lossy(&ie.data).to_string();
                }
                ElementId::DsParameter if !ie.data.is_empty() => {
                    beacon.channel = Some(ie.data[0]);
                }
                ElementId::SupportedRates => {
                    beacon.rates.extend(&ie.data);
                }
                _ => {}
            }
        }
        beacon.ies = ies;

        Some(beacon)
    }

    /// Write fixed parameters and elements, in that order
    pub fn write_body(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.timestamp.to_le_bytes());
        out.extend_from_slice(&self.interval.to_le_bytes());
        out.extend_from_slice(&self.capability.to_le_bytes());
        for ie in &self.ies {
            ie.write_to(out);
        }
    }

    /// Size of the encoded body
    pub fn body_len(&self) -> usize {
        12 + self.ies.iter().map(InformationElement::encoded_len).sum::<usize>()
    }

    /// Check if this is an ESS (infrastructure) BSS
    pub fn is_ess(&self) -> bool {
        self.capability & capability::ESS != 0
    }

    pub fn element(&self, id: ElementId) -> Option<&InformationElement> {
        self.ies.iter().find(|ie| ie.id == id)
    }
}
