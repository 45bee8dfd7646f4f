use clap::Parser;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// The network interface to watch (e.g., 'eth0', 'wlan0')
    #[arg(short, long)]
    pub interface: String,
}

/// Capture-session configuration.
///
/// `new` supplies defaults that work for LAN-scale DHCP watching; the
/// fields are public so callers can tune the read timeout or the BPF
/// filter before starting a session.
#[derive(Debug, Clone)]
pub struct WatcherConfig {
    pub interface: String,
    /// BPF filter compiled into the capture handle. The default keeps
    /// everything but DHCP/BOOTP traffic away from the decoder.
    pub filter: String,
    /// Upper bound on each blocking capture read. Cancellation latency
    /// is bounded by this value.
    pub read_timeout: Duration,
    /// Maximum bytes captured per frame. DHCP requests fit comfortably
    /// within the 576-byte minimum IP datagram.
    pub snaplen: i32,
    pub promiscuous: bool,
    /// How long `cancel` waits for the capture thread beyond the read
    /// timeout before abandoning the join.
    pub cancel_grace: Duration,
}

impl WatcherConfig {
    pub fn new(interface: String) -> Self {
        Self {
            interface,
            filter: "udp and (port 67 or port 68)".to_string(),
            read_timeout: Duration::from_secs(1),
            snaplen: 1024,
            promiscuous: true,
            cancel_grace: Duration::from_secs(2),
        }
    }
}
