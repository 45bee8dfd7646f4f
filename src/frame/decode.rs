//! Pure decoding of captured link-layer frames into DHCP request records.
//!
//! The decoder walks the Ethernet, IPv4, UDP and BOOTP layers of a raw
//! frame by hand, length-checking each layer before touching its fields.
//! It never reads out of bounds and never allocates until a record is
//! actually produced, since the capture loop feeds it every frame that
//! passes the BPF filter.
//!
//! # References
//!
//! - RFC 2131: Dynamic Host Configuration Protocol
//! - RFC 2132: DHCP Options and BOOTP Vendor Extensions

use std::net::Ipv4Addr;

use super::record::{DhcpRequestRecord, MacAddr};

const ETHERNET_HEADER_LEN: usize = 14;
const ETHERTYPE_IPV4: [u8; 2] = [0x08, 0x00];

const IPV4_MIN_HEADER_LEN: usize = 20;
const IPPROTO_UDP: u8 = 17;

const UDP_HEADER_LEN: usize = 8;
const DHCP_SERVER_PORT: u16 = 67;

/// Fixed BOOTP header size per RFC 2131, excluding the magic cookie.
const BOOTP_FIXED_LEN: usize = 236;
const BOOTP_CIADDR_OFFSET: usize = 12;
const BOOTP_CHADDR_OFFSET: usize = 28;

const BOOTREQUEST: u8 = 1;

/// Magic cookie that marks the start of the DHCP options area (99.130.83.99).
const DHCP_MAGIC_COOKIE: [u8; 4] = [99, 130, 83, 99];

const OPT_PAD: u8 = 0;
const OPT_HOSTNAME: u8 = 12;
const OPT_REQUESTED_IP: u8 = 50;
const OPT_END: u8 = 255;

/// Why a captured frame did not yield a [`DhcpRequestRecord`].
///
/// These are expected background noise on a busy capture, not faults.
/// The capture loop counts them and moves on; they are never surfaced
/// to subscribers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// The frame is well-formed but is not a DHCP request (wrong
    /// ethertype, protocol, port, opcode or magic cookie).
    #[error("frame is not a DHCP request")]
    NotDhcp,

    /// The frame ends before the headers it claims to carry.
    #[error("frame truncated before end of headers")]
    Truncated,

    /// An option's declared length runs past the end of the buffer,
    /// or an option carries an impossible value length.
    #[error("malformed DHCP option")]
    MalformedOption,
}

/// Decodes a raw Ethernet frame into a [`DhcpRequestRecord`].
///
/// Validation is layered: each header is length-checked before any of
/// its fields are read, and the UDP port check happens before the BOOTP
/// length check so that short non-DHCP datagrams (DNS and friends)
/// classify as [`DecodeError::NotDhcp`] rather than truncated.
pub fn decode_frame(frame: &[u8]) -> Result<DhcpRequestRecord, DecodeError> {
    // Ethernet
    if frame.len() < ETHERNET_HEADER_LEN {
        return Err(DecodeError::Truncated);
    }
    if frame[12..14] != ETHERTYPE_IPV4 {
        return Err(DecodeError::NotDhcp);
    }

    // IPv4
    if frame.len() < ETHERNET_HEADER_LEN + IPV4_MIN_HEADER_LEN {
        return Err(DecodeError::Truncated);
    }
    let version_ihl = frame[ETHERNET_HEADER_LEN];
    if version_ihl >> 4 != 4 || version_ihl & 0x0f < 5 {
        return Err(DecodeError::NotDhcp);
    }
    let ip_header_len = usize::from(version_ihl & 0x0f) * 4;
    if frame[ETHERNET_HEADER_LEN + 9] != IPPROTO_UDP {
        return Err(DecodeError::NotDhcp);
    }

    // UDP
    let udp_offset = ETHERNET_HEADER_LEN + ip_header_len;
    if frame.len() < udp_offset + UDP_HEADER_LEN {
        return Err(DecodeError::Truncated);
    }
    let dst_port = u16::from_be_bytes([frame[udp_offset + 2], frame[udp_offset + 3]]);
    if dst_port != DHCP_SERVER_PORT {
        return Err(DecodeError::NotDhcp);
    }

    // BOOTP fixed header + magic cookie
    let bootp = udp_offset + UDP_HEADER_LEN;
    if frame.len() < bootp + BOOTP_FIXED_LEN + DHCP_MAGIC_COOKIE.len() {
        return Err(DecodeError::Truncated);
    }
    if frame[bootp] != BOOTREQUEST {
        return Err(DecodeError::NotDhcp);
    }
    if frame[bootp + BOOTP_FIXED_LEN..bootp + BOOTP_FIXED_LEN + 4] != DHCP_MAGIC_COOKIE {
        return Err(DecodeError::NotDhcp);
    }

    let mut chaddr = [0u8; 6];
    chaddr.copy_from_slice(&frame[bootp + BOOTP_CHADDR_OFFSET..bootp + BOOTP_CHADDR_OFFSET + 6]);

    let mut ciaddr = [0u8; 4];
    ciaddr.copy_from_slice(&frame[bootp + BOOTP_CIADDR_OFFSET..bootp + BOOTP_CIADDR_OFFSET + 4]);

    let options = &frame[bootp + BOOTP_FIXED_LEN + DHCP_MAGIC_COOKIE.len()..];
    let (requested_ip, hostname) = scan_options(options)?;

    // Option 50 wins; a renewing client carries its address in ciaddr
    // instead. All-zero means the packet named no address at all.
    let ip_address = requested_ip
        .or_else(|| {
            let ip = Ipv4Addr::from(ciaddr);
            (!ip.is_unspecified()).then_some(ip)
        });

    Ok(DhcpRequestRecord {
        mac_address: MacAddr(chaddr),
        ip_address,
        hostname,
    })
}

/// Single length-prefixed scan over the options area, extracting the
/// requested IP address (option 50) and hostname (option 12).
///
/// Unknown tags are skipped by their declared length. The scan stops at
/// the End tag or at the end of the buffer, whichever comes first.
fn scan_options(options: &[u8]) -> Result<(Option<Ipv4Addr>, Option<String>), DecodeError> {
    let mut requested_ip = None;
    let mut hostname = None;

    let mut pos = 0;
    while pos < options.len() {
        let tag = options[pos];
        if tag == OPT_END {
            break;
        }
        if tag == OPT_PAD {
            pos += 1;
            continue;
        }
        let len = usize::from(*options.get(pos + 1).ok_or(DecodeError::MalformedOption)?);
        let value = options
            .get(pos + 2..pos + 2 + len)
            .ok_or(DecodeError::MalformedOption)?;
        match tag {
            OPT_REQUESTED_IP => {
                let octets: [u8; 4] = value
                    .try_into()
                    .map_err(|_| DecodeError::MalformedOption)?;
                requested_ip = Some(Ipv4Addr::from(octets));
            }
            OPT_HOSTNAME => {
                hostname = Some(decode_hostname(value));
            }
            _ => {}
        }
        pos += 2 + len;
    }

    Ok((requested_ip, hostname))
}

/// Decodes an option-12 hostname value.
///
/// Clients that internationalize their hostname send it ACE-encoded
/// (RFC 3490, `xn--` labels), so each such label is punycode-decoded
/// back to Unicode; any other label is kept verbatim, case included.
/// Hostnames in the wild are not reliably UTF-8 either, so invalid
/// bytes decode lossily rather than dropping the sighting.
fn decode_hostname(raw: &[u8]) -> String {
    match std::str::from_utf8(raw) {
        Ok(name) => ace_to_unicode(name).unwrap_or_else(|| name.to_string()),
        Err(_) => String::from_utf8_lossy(raw).into_owned(),
    }
}

/// Per-label ACE decoding. `None` means some `xn--` label does not
/// carry valid punycode; the caller keeps the raw name in that case.
fn ace_to_unicode(name: &str) -> Option<String> {
    if !name.contains("xn--") {
        return Some(name.to_string());
    }
    let mut labels = Vec::new();
    for label in name.split('.') {
        match label.strip_prefix("xn--") {
            Some(ace) => labels.push(idna::punycode::decode_to_string(ace)?),
            None => labels.push(label.to_string()),
        }
    }
    Some(labels.join("."))
}
