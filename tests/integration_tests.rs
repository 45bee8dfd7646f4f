use dhcpwatch::{DhcpWatcher, WatchError, WatcherConfig};
use std::time::Duration;

#[tokio::test]
async fn start_on_nonexistent_interface_fails_synchronously() {
    let config = WatcherConfig::new("definitely-not-a-real-interface-0".to_string());

    let result = DhcpWatcher::start(config, |_| {});

    match result {
        Err(WatchError::CaptureUnavailable { interface, .. }) => {
            assert_eq!(interface, "definitely-not-a-real-interface-0");
        }
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("start succeeded on a nonexistent interface"),
    }
}

#[tokio::test]
async fn start_on_loopback_does_not_panic() {
    let config = WatcherConfig::new("lo".to_string());

    // Opening a real capture needs CAP_NET_RAW; in CI this is expected
    // to fail, but it must fail cleanly through the error path.
    match DhcpWatcher::start(config, |_| {}) {
        Ok(mut handle) => {
            handle.cancel().await;
            handle.cancel().await;
        }
        Err(e) => {
            println!("Expected error in unprivileged test environment: {e}");
        }
    }
}

#[test]
fn config_defaults() {
    let config = WatcherConfig::new("eth0".to_string());

    assert_eq!(config.interface, "eth0");
    assert_eq!(config.filter, "udp and (port 67 or port 68)");
    assert_eq!(config.read_timeout, Duration::from_secs(1));
    assert!(config.promiscuous);
    assert!(config.snaplen >= 576);
}

#[test]
fn mac_address_parsing() {
    let mac: dhcpwatch::MacAddr = "AA:bb:0C:dd:EE:ff".parse().unwrap();
    assert_eq!(mac.to_string(), "aa:bb:0c:dd:ee:ff");
    assert_eq!(mac.octets(), [0xaa, 0xbb, 0x0c, 0xdd, 0xee, 0xff]);
}
