use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

use crate::error::WatchError;

/// A 6-byte Ethernet hardware address.
///
/// The canonical textual form is lower-case, colon-separated
/// (e.g. `aa:bb:cc:dd:ee:ff`); that is what [`fmt::Display`] produces
/// and what comparisons should go through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MacAddr(pub [u8; 6]);

impl MacAddr {
    pub fn octets(&self) -> [u8; 6] {
        self.0
    }
}

impl fmt::Display for MacAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{a:02x}:{b:02x}:{c:02x}:{d:02x}:{e:02x}:{g:02x}")
    }
}

impl FromStr for MacAddr {
    type Err = WatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut octets = [0u8; 6];
        let mut parts = s.split(':');
        for octet in octets.iter_mut() {
            let part = parts
                .next()
                .ok_or_else(|| WatchError::MacParse(s.to_string()))?;
            *octet = u8::from_str_radix(part, 16)
                .map_err(|_| WatchError::MacParse(s.to_string()))?;
        }
        if parts.next().is_some() {
            return Err(WatchError::MacParse(s.to_string()));
        }
        Ok(MacAddr(octets))
    }
}

/// One observed DHCP request, as reported to subscribers.
///
/// The hardware address is always present; the requested IP address and
/// client hostname are carried only when the packet supplied them.
/// `None` is deliberately distinct from an empty string or `0.0.0.0`,
/// and all three fields participate in equality, which is what the
/// deduplication history keys on.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DhcpRequestRecord {
    pub mac_address: MacAddr,
    pub ip_address: Option<Ipv4Addr>,
    pub hostname: Option<String>,
}

impl fmt::Display for DhcpRequestRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.mac_address)?;
        if let Some(ip) = self.ip_address {
            write!(f, " {ip}")?;
        }
        if let Some(hostname) = &self.hostname {
            write!(f, " ({hostname})")?;
        }
        Ok(())
    }
}
