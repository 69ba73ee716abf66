//! 802.11 Frame Structure
//!
//! Frame control field and the three-address management header, in both
//! directions: encoding for frames we build and parsing for frames we read
//! back.

use std::str::FromStr;

use crate::error::KnownBeaconsError;

use super::management::ManagementFrame;

/// Length of a management frame header (FC, duration, 3 addresses, seq ctl)
pub const MGMT_HEADER_LEN: usize = 24;

/// MAC address (6 bytes)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MacAddr([u8; 6]);

impl MacAddr {
    pub const BROADCAST: MacAddr = MacAddr([0xff, 0xff, 0xff, 0xff, 0xff, 0xff]);
    pub const ZERO: MacAddr = MacAddr([0, 0, 0, 0, 0, 0]);

    pub fn new(bytes: [u8; 6]) -> Self {
        Self(bytes)
    }

    pub fn from_slice(data: &[u8]) -> Option<Self> {
        if data.len() >= 6 {
            let mut bytes = [0u8; 6];
            bytes.copy_from_slice(&data[..6]);
            Some(Self(bytes))
        } else {
            None
        }
    }

    pub fn as_bytes(&self) -> &[u8; 6] {
        &self.0
    }

    pub fn is_broadcast(&self) -> bool {
        self.0 == [0xff, 0xff, 0xff, 0xff, 0xff, 0xff]
    }

    pub fn is_multicast(&self) -> bool {
        self.0[0] & 0x01 != 0
    }

    pub fn is_locally_administered(&self) -> bool {
        self.0[0] & 0x02 != 0
    }
}

impl std::fmt::Display for MacAddr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
            self.0[0], self.0[1], self.0[2],
            self.0[3], self.0[4], self.0[5])
    }
}

/// Accepts `aa:bb:cc:dd:ee:ff` and `aa-bb-cc-dd-ee-ff`, any case
impl FromStr for MacAddr {
    type Err = KnownBeaconsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || KnownBeaconsError::InvalidMac(s.to_string());

        let mut bytes = [0u8; 6];
        let mut parts = s.trim().split(|c: char| c == ':' || c == '-');

        for byte in bytes.iter_mut() {
            let part = parts.next().ok_or_else(invalid)?;
            if part.len() != 2 {
                return Err(invalid());
            }
            *byte = u8::from_str_radix(part, 16).map_err(|_| invalid())?;
        }

        if parts.next().is_some() {
            return Err(invalid());
        }

        Ok(Self(bytes))
    }
}

impl<'de> serde::Deserialize<'de> for MacAddr {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

impl serde::Serialize for MacAddr {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Frame type (2 bits)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameType {
    Management = 0,
    Control = 1,
    Data = 2,
    Extension = 3,
}

impl From<u8> for FrameType {
    fn from(val: u8) -> Self {
        match val & 0x03 {
            0 => FrameType::Management,
            1 => FrameType::Control,
            2 => FrameType::Data,
            _ => FrameType::Extension,
        }
    }
}

/// Management frame subtype (4 bits)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameSubtype {
    AssocRequest = 0x00,
    AssocResponse = 0x01,
    ReassocRequest = 0x02,
    ReassocResponse = 0x03,
    ProbeRequest = 0x04,
    ProbeResponse = 0x05,
    TimingAdvertisement = 0x06,
    Beacon = 0x08,
    Atim = 0x09,
    Disassociation = 0x0a,
    Authentication = 0x0b,
    Deauthentication = 0x0c,
    Action = 0x0d,
    ActionNoAck = 0x0e,

    /// Control/data subtypes and reserved values; we never build those
    Unknown = 0xff,
}

impl FrameSubtype {
    pub fn from_raw(frame_type: FrameType, subtype: u8) -> Self {
        if frame_type != FrameType::Management {
            return FrameSubtype::Unknown;
        }

        match subtype & 0x0f {
            0 => FrameSubtype::AssocRequest,
            1 => FrameSubtype::AssocResponse,
            2 => FrameSubtype::ReassocRequest,
            3 => FrameSubtype::ReassocResponse,
            4 => FrameSubtype::ProbeRequest,
            5 => FrameSubtype::ProbeResponse,
            6 => FrameSubtype::TimingAdvertisement,
            8 => FrameSubtype::Beacon,
            9 => FrameSubtype::Atim,
            10 => FrameSubtype::Disassociation,
            11 => FrameSubtype::Authentication,
            12 => FrameSubtype::Deauthentication,
            13 => FrameSubtype::Action,
            14 => FrameSubtype::ActionNoAck,
            _ => FrameSubtype::Unknown,
        }
    }
}

/// Frame control field (2 bytes)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameControl {
    /// Protocol version (should be 0)
    pub protocol_version: u8,
    /// Frame type
    pub frame_type: FrameType,
    /// Frame subtype
    pub subtype: FrameSubtype,
    /// To DS flag
    pub to_ds: bool,
    /// From DS flag
    pub from_ds: bool,
    /// More fragments flag
    pub more_fragments: bool,
    /// Retry flag
    pub retry: bool,
    /// Power management flag
    pub power_management: bool,
    /// More data flag
    pub more_data: bool,
    /// Protected frame flag (WEP/WPA)
    pub protected: bool,
    /// HT/VHT order flag
    pub order: bool,
}

impl FrameControl {
    /// Plain management frame control: version 0, no flags set
    pub fn management(subtype: FrameSubtype) -> Self {
        Self {
            protocol_version: 0,
            frame_type: FrameType::Management,
            subtype,
            to_ds: false,
            from_ds: false,
            more_fragments: false,
            retry: false,
            power_management: false,
            more_data: false,
            protected: false,
            order: false,
        }
    }

    pub fn parse(data: &[u8]) -> Option<Self> {
        if data.len() < 2 {
            return None;
        }

        let fc0 = data[0];
        let fc1 = data[1];

        let protocol_version = fc0 & 0x03;
        let frame_type = FrameType::from((fc0 >> 2) & 0x03);
        let subtype_raw = (fc0 >> 4) & 0x0f;
        let subtype = FrameSubtype::from_raw(frame_type, subtype_raw);

        Some(Self {
            protocol_version,
            frame_type,
            subtype,
            to_ds: fc1 & 0x01 != 0,
            from_ds: fc1 & 0x02 != 0,
            more_fragments: fc1 & 0x04 != 0,
            retry: fc1 & 0x08 != 0,
            power_management: fc1 & 0x10 != 0,
            more_data: fc1 & 0x20 != 0,
            protected: fc1 & 0x40 != 0,
            order: fc1 & 0x80 != 0,
        })
    }

    pub fn to_bytes(&self) -> [u8; 2] {
        let fc0 = (self.protocol_version & 0x03)
            | ((self.frame_type as u8) << 2)
            | (((self.subtype as u8) & 0x0f) << 4);

        let flags = [
            self.to_ds,
            self.from_ds,
            self.more_fragments,
            self.retry,
            self.power_management,
            self.more_data,
            self.protected,
            self.order,
        ];
        let fc1 = flags
            .iter()
            .enumerate()
            .fold(0u8, |acc, (bit, set)| if *set { acc | (1 << bit) } else { acc });

        [fc0, fc1]
    }
}

/// Three-address management header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MgmtHeader {
    pub frame_control: FrameControl,
    pub duration: u16,
    /// Receiver/Destination
    pub addr1: MacAddr,
    /// Transmitter/Source
    pub addr2: MacAddr,
    /// BSSID
    pub addr3: MacAddr,
    pub seq_control: u16,
}

impl MgmtHeader {
    pub fn parse(data: &[u8]) -> Option<Self> {
        if data.len() < MGMT_HEADER_LEN {
            return None;
        }

        let frame_control = FrameControl::parse(data)?;
        if frame_control.frame_type != FrameType::Management {
            return None;
        }

        Some(Self {
            frame_control,
            duration: u16::from_le_bytes([data[2], data[3]]),
            addr1: MacAddr::from_slice(&data[4..])?,
            addr2: MacAddr::from_slice(&data[10..])?,
            addr3: MacAddr::from_slice(&data[16..])?,
            seq_control: u16::from_le_bytes([data[22], data[23]]),
        })
    }

    pub fn write_to(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.frame_control.to_bytes());
        out.extend_from_slice(&self.duration.to_le_bytes());
        out.extend_from_slice(self.addr1.as_bytes());
        out.extend_from_slice(self.addr2.as_bytes());
        out.extend_from_slice(self.addr3.as_bytes());
        out.extend_from_slice(&self.seq_control.to_le_bytes());
    }
}

/// Parsed 802.11 management frame
#[derive(Debug, Clone)]
pub struct Ieee80211Frame {
    pub header: MgmtHeader,
    pub body: ManagementFrame,
}

impl Ieee80211Frame {
    /// Parse a management frame (no radiotap prefix)
    pub fn parse(data: &[u8]) -> Option<Self> {
        let header = MgmtHeader::parse(data)?;
        let body = ManagementFrame::parse(header.frame_control.subtype, &data[MGMT_HEADER_LEN..])?;
        Some(Self { header, body })
    }

    /// BSSID of a frame with neither DS bit set
    pub fn bssid(&self) -> MacAddr {
        self.header.addr3
    }

    pub fn source(&self) -> MacAddr {
        self.header.addr2
    }

    pub fn destination(&self) -> MacAddr {
        self.header.addr1
    }
}
