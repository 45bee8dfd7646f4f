use thiserror::Error;

#[derive(Error, Debug)]
pub enum WatchError {
    /// The capture handle could not be opened at all. This is the only
    /// failure a caller of `start` ever sees; everything past open is
    /// recovered inside the capture loop.
    #[error("Cannot capture DHCP packets on interface '{interface}'")]
    CaptureUnavailable {
        interface: String,
        #[source]
        source: pcap::Error,
    },

    /// A capture session is already running on this interface. Attach
    /// to the running session with `WatcherHandle::subscribe` instead
    /// of opening a competing capture handle.
    #[error("A DHCP watcher is already running on interface '{0}'")]
    AlreadyWatching(String),

    #[error("Failed to parse MAC address: {0}")]
    MacParse(String),
}
