//! Capture session lifecycle: start, subscription, cancellation.
//!
//! A session bridges two execution contexts. The capture loop runs on a
//! blocking worker via `spawn_blocking`, owning the capture handle and
//! the deduplication history. Novel records cross into the async world
//! through an unbounded channel; a delivery task on the runtime invokes
//! the subscriber callbacks. Subscriber code therefore never runs on the
//! capture thread, and the capture thread never waits on a subscriber.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, OnceLock};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::{self, JoinHandle};
use tracing::{debug, error, trace, warn};

use crate::capture::{CaptureSource, PcapSource, ReadOutcome};
use crate::config::WatcherConfig;
use crate::dedup::Deduplicator;
use crate::dispatch::{Dispatcher, SubscriberToken};
use crate::error::WatchError;
use crate::frame::{decode_frame, DhcpRequestRecord};

/// Entry point for starting capture sessions.
pub struct DhcpWatcher;

impl DhcpWatcher {
    /// Opens a capture handle on the configured interface and starts
    /// watching for DHCP requests.
    ///
    /// `callback` is invoked on the tokio runtime with every novel
    /// record. Failure to open the handle is reported synchronously;
    /// once this returns `Ok`, only cancellation ends the session.
    ///
    /// One session per interface: a second `start` while a session is
    /// active on the same interface returns
    /// [`WatchError::AlreadyWatching`]. Additional consumers should
    /// attach to the running session with [`WatcherHandle::subscribe`].
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(
        config: WatcherConfig,
        callback: impl Fn(&DhcpRequestRecord) + Send + Sync + 'static,
    ) -> Result<WatcherHandle, WatchError> {
        let guard = InterfaceGuard::claim(&config.interface)?;
        let source = PcapSource::open(&config)?;
        Ok(spawn_session(source, &config, guard, callback))
    }
}

/// Starts the capture and delivery tasks over an already-open source.
fn spawn_session(
    source: impl CaptureSource + 'static,
    config: &WatcherConfig,
    guard: InterfaceGuard,
    callback: impl Fn(&DhcpRequestRecord) + Send + Sync + 'static,
) -> WatcherHandle {
    let dispatcher = Dispatcher::new();
    // The initial subscriber lives for the whole session; its token is
    // intentionally dropped (drop does not unregister).
    drop(dispatcher.register(callback));

    let stop = Arc::new(AtomicBool::new(false));
    let (tx, mut rx) = mpsc::unbounded_channel();

    let capture_stop = stop.clone();
    let interface = config.interface.clone();
    // The guard rides with the capture thread: the interface frees up
    // only once the thread has exited and the pcap handle is closed,
    // never while a stale handle could still be reading.
    let capture_task = task::spawn_blocking(move || {
        capture_loop(source, &interface, &capture_stop, &tx);
        drop(guard);
    });

    let delivery_dispatcher = dispatcher.clone();
    let delivery_task = tokio::spawn(async move {
        while let Some(record) = rx.recv().await {
            delivery_dispatcher.deliver(&record);
        }
    });

    WatcherHandle {
        dispatcher,
        stop,
        capture_task: Some(capture_task),
        delivery_task: Some(delivery_task),
        join_cap: config.read_timeout + config.cancel_grace,
    }
}

/// Read-decode-dedup loop. Runs on the blocking worker until the stop
/// flag is observed at a read wakeup; drops the capture source (and
/// with it the handle) on the way out.
fn capture_loop(
    mut source: impl CaptureSource,
    interface: &str,
    stop: &AtomicBool,
    tx: &mpsc::UnboundedSender<DhcpRequestRecord>,
) {
    let mut dedup = Deduplicator::new();
    let mut decode_failures: u64 = 0;

    while !stop.load(Ordering::Acquire) {
        match source.read_next() {
            Ok(ReadOutcome::Frame(frame)) => match decode_frame(&frame) {
                Ok(record) => {
                    if !dedup.is_novel(&record) {
                        continue;
                    }
                    debug!(interface, %record, "Observed DHCP request");
                    if tx.send(record).is_err() {
                        // Delivery side is gone; nobody left to tell.
                        break;
                    }
                }
                Err(err) => {
                    decode_failures += 1;
                    trace!(interface, %err, len = frame.len(), "Skipping frame");
                }
            },
            Ok(ReadOutcome::TimedOut) => continue,
            Err(err) => {
                warn!(interface, %err, "Capture read failed; continuing");
            }
        }
    }

    debug!(
        interface,
        identities = dedup.len(),
        decode_failures,
        "Capture loop exiting"
    );
}

/// Controls one running capture session.
///
/// Obtained from [`DhcpWatcher::start`]. Dropping the handle without
/// calling [`cancel`](Self::cancel) signals the capture loop to stop but
/// cannot wait for it; the interface stays claimed until the capture
/// thread has actually exited. Call `cancel` to observe an orderly
/// shutdown.
pub struct WatcherHandle {
    dispatcher: Arc<Dispatcher>,
    stop: Arc<AtomicBool>,
    capture_task: Option<JoinHandle<()>>,
    delivery_task: Option<JoinHandle<()>>,
    join_cap: Duration,
}

impl WatcherHandle {
    /// Registers an additional callback on the running session.
    ///
    /// The callback receives every record delivered after this call and
    /// none delivered before it.
    pub fn subscribe(
        &self,
        callback: impl Fn(&DhcpRequestRecord) + Send + Sync + 'static,
    ) -> SubscriberToken {
        self.dispatcher.register(callback)
    }

    /// Stops the session: signals the capture loop, waits for the
    /// capture thread to release its handle, then waits for delivery of
    /// every record accepted before the stop.
    ///
    /// Idempotent; later calls return immediately. The wait for the
    /// capture thread is capped at the read timeout plus the configured
    /// grace period, so a wedged capture facility cannot hang the
    /// caller.
    pub async fn cancel(&mut self) {
        let Some(capture_task) = self.capture_task.take() else {
            return;
        };
        self.stop.store(true, Ordering::Release);

        match tokio::time::timeout(self.join_cap, capture_task).await {
            Ok(Ok(())) => {}
            Ok(Err(join_err)) => error!(%join_err, "Capture task failed"),
            // Forced completion: the thread still holds the capture
            // handle and the interface claim until it wakes from its
            // current read, whenever that is.
            Err(_) => error!(
                cap = ?self.join_cap,
                "Capture thread did not stop in time; abandoning join"
            ),
        }

        if let Some(delivery_task) = self.delivery_task.take() {
            let abort = delivery_task.abort_handle();
            if tokio::time::timeout(self.join_cap, delivery_task)
                .await
                .is_err()
            {
                abort.abort();
            }
        }
    }

    /// Number of callbacks currently registered on the session.
    pub fn subscriber_count(&self) -> usize {
        self.dispatcher.subscriber_count()
    }
}

impl Drop for WatcherHandle {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Release);
    }
}

static ACTIVE_INTERFACES: OnceLock<Mutex<HashSet<String>>> = OnceLock::new();

fn active_interfaces() -> &'static Mutex<HashSet<String>> {
    ACTIVE_INTERFACES.get_or_init(|| Mutex::new(HashSet::new()))
}

/// Process-wide claim on an interface name, enforcing the one-session-
/// per-interface policy. Released on drop.
struct InterfaceGuard {
    interface: String,
}

impl InterfaceGuard {
    fn claim(interface: &str) -> Result<Self, WatchError> {
        let mut active = active_interfaces()
            .lock()
            .unwrap_or_else(|e| e.into_inner());
        if !active.insert(interface.to_string()) {
            return Err(WatchError::AlreadyWatching(interface.to_string()));
        }
        Ok(Self {
            interface: interface.to_string(),
        })
    }
}

impl Drop for InterfaceGuard {
    fn drop(&mut self) {
        let mut active = active_interfaces()
            .lock()
            .unwrap_or_else(|e| e.into_inner());
        active.remove(&self.interface);
    }
}
