//! Frame decoding: raw captured bytes to structured DHCP request records.
//!
//! This module is pure and stateless so it can be tested against literal
//! byte sequences without any capture machinery:
//! - [`record`]: the value types handed to subscribers
//! - [`decode`]: the Ethernet/IPv4/UDP/BOOTP walk

pub mod decode;
pub mod record;

pub use decode::{decode_frame, DecodeError};
pub use record::{DhcpRequestRecord, MacAddr};
