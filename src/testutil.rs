//! Test-only construction of synthetic Ethernet/IPv4/UDP/BOOTP frames.

use std::net::Ipv4Addr;

/// Builds a broadcast DHCP request frame byte-for-byte, with knobs for
/// producing the almost-right frames the decoder must reject.
pub(crate) struct FrameBuilder {
    chaddr: [u8; 6],
    dst_port: u16,
    opcode: u8,
    ciaddr: [u8; 4],
    cookie: [u8; 4],
    options: Vec<u8>,
}

impl FrameBuilder {
    pub(crate) fn new(chaddr: [u8; 6]) -> Self {
        Self {
            chaddr,
            dst_port: 67,
            opcode: 1,
            ciaddr: [0; 4],
            cookie: [99, 130, 83, 99],
            options: Vec::new(),
        }
    }

    pub(crate) fn dst_port(mut self, port: u16) -> Self {
        self.dst_port = port;
        self
    }

    pub(crate) fn opcode(mut self, opcode: u8) -> Self {
        self.opcode = opcode;
        self
    }

    pub(crate) fn ciaddr(mut self, ip: Ipv4Addr) -> Self {
        self.ciaddr = ip.octets();
        self
    }

    pub(crate) fn cookie(mut self, cookie: [u8; 4]) -> Self {
        self.cookie = cookie;
        self
    }

    pub(crate) fn option(mut self, tag: u8, value: &[u8]) -> Self {
        self.options.push(tag);
        self.options.push(value.len() as u8);
        self.options.extend_from_slice(value);
        self
    }

    /// Appends raw bytes to the options area without length framing,
    /// for malformed-option cases.
    pub(crate) fn raw_option_bytes(mut self, bytes: &[u8]) -> Self {
        self.options.extend_from_slice(bytes);
        self
    }

    pub(crate) fn requested_ip(self, ip: Ipv4Addr) -> Self {
        self.option(50, &ip.octets())
    }

    pub(crate) fn hostname(self, name: &str) -> Self {
        self.option(12, name.as_bytes())
    }

    pub(crate) fn build(self) -> Vec<u8> {
        let mut frame = Vec::with_capacity(350);

        // Ethernet: broadcast destination, client source, IPv4.
        frame.extend_from_slice(&[0xff; 6]);
        frame.extend_from_slice(&self.chaddr);
        frame.extend_from_slice(&[0x08, 0x00]);

        // IPv4, minimal 20-byte header, checksum left zero (the decoder
        // does not verify it).
        let ip_total_len = (20 + 8 + 236 + 4 + self.options.len() + 1) as u16;
        frame.push(0x45);
        frame.push(0x00);
        frame.extend_from_slice(&ip_total_len.to_be_bytes());
        frame.extend_from_slice(&[0x00, 0x00, 0x00, 0x00]); // id, flags/frag
        frame.push(64); // ttl
        frame.push(17); // UDP
        frame.extend_from_slice(&[0x00, 0x00]); // checksum
        frame.extend_from_slice(&[0, 0, 0, 0]); // src 0.0.0.0
        frame.extend_from_slice(&[255, 255, 255, 255]); // dst broadcast

        // UDP
        let udp_len = (8 + 236 + 4 + self.options.len() + 1) as u16;
        frame.extend_from_slice(&68u16.to_be_bytes());
        frame.extend_from_slice(&self.dst_port.to_be_bytes());
        frame.extend_from_slice(&udp_len.to_be_bytes());
        frame.extend_from_slice(&[0x00, 0x00]); // checksum

        // BOOTP fixed header (236 bytes)
        frame.push(self.opcode);
        frame.push(1); // htype ethernet
        frame.push(6); // hlen
        frame.push(0); // hops
        frame.extend_from_slice(&0x3903f326u32.to_be_bytes()); // xid
        frame.extend_from_slice(&[0x00, 0x00]); // secs
        frame.extend_from_slice(&[0x80, 0x00]); // broadcast flag
        frame.extend_from_slice(&self.ciaddr);
        frame.extend_from_slice(&[0; 4]); // yiaddr
        frame.extend_from_slice(&[0; 4]); // siaddr
        frame.extend_from_slice(&[0; 4]); // giaddr
        frame.extend_from_slice(&self.chaddr);
        frame.extend_from_slice(&[0; 10]); // chaddr padding
        frame.extend_from_slice(&[0; 64]); // sname
        frame.extend_from_slice(&[0; 128]); // file

        frame.extend_from_slice(&self.cookie);
        frame.extend_from_slice(&self.options);
        frame.push(255); // End

        frame
    }
}
