//! Radiotap Header
//!
//! Injected frames carry an empty radiotap header: the driver fills in rate,
//! power and channel. Reading a frame back only needs the header length.
//!
//! Reference: https://www.radiotap.org/

/// Length of a radiotap header with no present fields
pub const MIN_RADIOTAP_LEN: usize = 8;

/// Radiotap fixed header
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RadiotapHeader {
    /// Header version (always 0)
    pub version: u8,
    /// Total header length including fields
    pub length: u16,
    /// Present flags indicating which fields follow
    pub present_flags: u32,
}

impl RadiotapHeader {
    /// Header with no fields, left for the transmitting layer to fill
    pub fn minimal() -> Self {
        Self {
            version: 0,
            length: MIN_RADIOTAP_LEN as u16,
            present_flags: 0,
        }
    }

    pub fn write_to(&self, out: &mut Vec<u8>) {
        out.push(self.version);
        out.push(0); // pad
        out.extend_from_slice(&self.length.to_le_bytes());
        out.extend_from_slice(&self.present_flags.to_le_bytes());
    }
}

/// Convert channel number to centre frequency; `None` for numbers outside
/// the 2.4 GHz and 5 GHz plans
pub fn channel_to_freq(channel: u8) -> Option<u16> {
    match channel {
        1..=13 => Some(2407 + channel as u16 * 5),
        14 => Some(2484),
        32..=177 => Some(5000 + channel as u16 * 5),
        _ => None,
    }
}

/// Parse radiotap header; returns the header and the offset of the 802.11
/// frame. Present fields are skipped, not decoded.
pub fn parse_radiotap(data: &[u8]) -> Option<(RadiotapHeader, usize)> {
    if data.len() < MIN_RADIOTAP_LEN {
        return None;
    }

    let version = data[0];
    if version != 0 {
        return None;
    }

    let length = u16::from_le_bytes([data[2], data[3]]);
    let present_flags = u32::from_le_bytes([data[4], data[5], data[6], data[7]]);

    if (length as usize) < MIN_RADIOTAP_LEN || data.len() < length as usize {
        return None;
    }

    let header = RadiotapHeader {
        version,
        length,
        present_flags,
    };

    Some((header, length as usize))
}
