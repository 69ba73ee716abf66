//! 802.11 Frame Encoding and Parsing
//!
//! Management frames only: the header, beacon bodies and their information
//! elements.

mod frame;
mod management;

pub use frame::*;
pub use management::*;

/// Parse an 802.11 management frame from bytes
pub fn parse_ieee80211(data: &[u8]) -> Option<Ieee80211Frame> {
    Ieee80211Frame::parse(data)
}
