//! # Dhcpwatch - Passive DHCP Request Watcher
//!
//! Dhcpwatch observes link-layer traffic on a network interface,
//! decodes DHCP request packets into structured records (MAC address,
//! requested IP, hostname), suppresses repeated sightings of the same
//! client, and fans novel records out to subscriber callbacks on a
//! tokio runtime. It is built for passive network-presence detection:
//! it never participates in the DHCP protocol and never answers a
//! request.
//!
//! ## Features
//!
//! - Raw capture via pcap with a BPF filter restricted to DHCP traffic
//! - Hand-validated Ethernet/IPv4/UDP/BOOTP decoding, robust against
//!   truncated and malformed frames
//! - Session-scoped deduplication on the (MAC, IP, hostname) triple
//! - Dynamic subscriber registration with panic isolation
//! - Prompt, idempotent cancellation bounded by the capture read timeout
//!
//! ## Example
//!
//! ```rust,no_run
//! use dhcpwatch::{DhcpWatcher, WatcherConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = WatcherConfig::new("eth0".to_string());
//!     let mut handle = DhcpWatcher::start(config, |record| {
//!         println!("device seen: {record}");
//!     })?;
//!     tokio::signal::ctrl_c().await?;
//!     handle.cancel().await;
//!     Ok(())
//! }
//! ```

pub mod capture;
pub mod config;
pub mod dedup;
pub mod dispatch;
pub mod error;
pub mod frame;
pub mod watcher;

#[cfg(test)]
mod testutil;

pub use config::{Args, WatcherConfig};
pub use dispatch::SubscriberToken;
pub use error::WatchError;
pub use frame::{DhcpRequestRecord, MacAddr};
pub use watcher::{DhcpWatcher, WatcherHandle};
