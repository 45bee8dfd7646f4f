//! Capture facility: the narrow seam between the watcher and whatever
//! actually produces raw frames.
//!
//! The pipeline depends only on [`CaptureSource`]; the one production
//! implementation wraps a pcap handle. Tests substitute scripted
//! sources to drive the pipeline without privileges or real traffic.

use pcap::{Active, Capture};
use tracing::debug;

use crate::config::WatcherConfig;
use crate::error::WatchError;

/// Result of one bounded blocking read from a capture source.
#[derive(Debug)]
pub enum ReadOutcome {
    /// A raw link-layer frame, as captured.
    Frame(Vec<u8>),
    /// The read timeout elapsed without traffic. Normal; the capture
    /// loop uses these wakeups to observe cancellation.
    TimedOut,
}

/// A non-fatal failure of a single read.
///
/// The capture loop logs these and keeps reading; only failure to open
/// the handle in the first place is fatal.
#[derive(Debug, thiserror::Error)]
#[error("capture read failed: {0}")]
pub struct CaptureReadError(pub String);

/// Blocking source of raw frames.
///
/// `read_next` must return within the session's configured read timeout
/// so cancellation stays bounded.
pub trait CaptureSource: Send {
    fn read_next(&mut self) -> Result<ReadOutcome, CaptureReadError>;
}

/// Production capture source backed by a live pcap handle.
pub struct PcapSource {
    capture: Capture<Active>,
}

impl PcapSource {
    /// Opens a capture handle on the configured interface with the
    /// configured BPF filter compiled in.
    ///
    /// Any failure here (missing interface, missing privileges, no
    /// capture facility) maps to [`WatchError::CaptureUnavailable`] and
    /// is surfaced synchronously to the caller of `start`.
    pub fn open(config: &WatcherConfig) -> Result<Self, WatchError> {
        let unavailable = |source: pcap::Error| {
            // CAP_NET_RAW (or root) is the usual missing piece; say so
            // instead of leaving the user with a bare pcap error.
            if unsafe { libc::geteuid() } != 0 {
                tracing::warn!(
                    interface = %config.interface,
                    "Capture open failed without root; CAP_NET_RAW may be required"
                );
            }
            WatchError::CaptureUnavailable {
                interface: config.interface.clone(),
                source,
            }
        };

        let timeout_ms = i32::try_from(config.read_timeout.as_millis()).unwrap_or(1000);
        let mut capture = Capture::from_device(config.interface.as_str())
            .map_err(unavailable)?
            .promisc(config.promiscuous)
            .snaplen(config.snaplen)
            .timeout(timeout_ms)
            .immediate_mode(true)
            .open()
            .map_err(unavailable)?;

        capture.filter(&config.filter, true).map_err(unavailable)?;
        debug!(
            interface = %config.interface,
            filter = %config.filter,
            "Capture handle opened"
        );

        Ok(Self { capture })
    }
}

impl CaptureSource for PcapSource {
    fn read_next(&mut self) -> Result<ReadOutcome, CaptureReadError> {
        match self.capture.next_packet() {
            Ok(packet) => Ok(ReadOutcome::Frame(packet.data.to_vec())),
            Err(pcap::Error::TimeoutExpired) => Ok(ReadOutcome::TimedOut),
            Err(e) => Err(CaptureReadError(e.to_string())),
        }
    }
}
