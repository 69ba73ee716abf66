//! 802.11 Wire Formats
//!
//! Radiotap and management frame encoding used to build injectable
//! beacons, plus the parsers used to read them back.

pub mod radiotap;
pub mod ieee80211;

pub use radiotap::{RadiotapHeader, parse_radiotap};
pub use ieee80211::{
    Ieee80211Frame, FrameControl, FrameType, FrameSubtype, MgmtHeader,
    ManagementFrame, BeaconFrame, ElementId, InformationElement,
    MacAddr, parse_ieee80211,
};
