//! IPv4 and IPv6 headers, as far as locating the transport segment needs them.
use core::fmt;
use byteorder::{ByteOrder, NetworkEndian};

use super::{Error, Result};

enum_with_unknown! {
    /// IP datagram encapsulated protocol.
    pub enum Protocol(u8) {
        HopByHop  = 0x00,
        Icmp      = 0x01,
        Tcp       = 0x06,
        Udp       = 0x11,
        Ipv6Route = 0x2b,
        Ipv6Frag  = 0x2c,
        Esp       = 0x32,
        Ah        = 0x33,
        Icmpv6    = 0x3a,
        Ipv6NoNxt = 0x3b,
        Ipv6Opts  = 0x3c,
    }
}

/// The address pair of a datagram, both of the same family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Addresses {
    /// Source and destination of an IPv4 datagram.
    Ipv4 {
        /// The source address.
        src: [u8; 4],
        /// The destination address.
        dst: [u8; 4],
    },
    /// Source and destination of an IPv6 datagram.
    Ipv6 {
        /// The source address.
        src: [u8; 16],
        /// The destination address.
        dst: [u8; 16],
    },
}

/// The summary of an IP header that the fallback needs to find and checksum the segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Repr {
    /// Source and destination address.
    pub addresses: Addresses,
    /// The protocol of the payload.
    pub protocol: Protocol,
    /// Length of the IP header, including options.
    pub header_len: usize,
    /// Length of the IP payload, i.e. the transport segment.
    pub payload_len: usize,
}

byte_wrapper! {
    /// A byte sequence representing an IPv4 header and its payload.
    pub struct ipv4([u8]);
}

byte_wrapper! {
    /// A byte sequence representing an IPv6 header and its payload.
    pub struct ipv6([u8]);
}

mod field_v4 {
    use crate::wire::field::Field;

    pub(crate) const VER_IHL:  usize = 0;
    pub(crate) const LENGTH:   Field = 2..4;
    pub(crate) const PROTOCOL: usize = 9;
    pub(crate) const SRC_ADDR: Field = 12..16;
    pub(crate) const DST_ADDR: Field = 16..20;
}

mod field_v6 {
    use crate::wire::field::Field;

    pub(crate) const VER_TC_FLOW: Field = 0..4;
    pub(crate) const LENGTH:      Field = 4..6;
    pub(crate) const NXT_HDR:     usize = 6;
    pub(crate) const SRC_ADDR:    Field = 8..24;
    pub(crate) const DST_ADDR:    Field = 24..40;
}

impl ipv4 {
    /// Imbue a raw octet buffer with IPv4 packet structure.
    pub fn new_unchecked(buffer: &[u8]) -> &ipv4 {
        Self::__from_macro_new_unchecked(buffer)
    }

    /// Shorthand for a combination of [new_unchecked] and [check_len].
    ///
    /// [new_unchecked]: #method.new_unchecked
    /// [check_len]: #method.check_len
    pub fn new_checked(data: &[u8]) -> Result<&ipv4> {
        let packet = Self::new_unchecked(data);
        packet.check_len()?;
        Ok(packet)
    }

    /// Ensure that no accessor method will panic if called.
    ///
    /// Returns `Err(Error::Truncated)` if the buffer is too short and `Err(Error::Malformed)` if
    /// the header length is smaller than the minimum or greater than the total length.
    pub fn check_len(&self) -> Result<()> {
        let len = self.0.len();
        if len < field_v4::DST_ADDR.end {
            Err(Error::Truncated)
        } else if self.header_len() < field_v4::DST_ADDR.end {
            Err(Error::Malformed)
        } else if len < self.header_len() {
            Err(Error::Truncated)
        } else if self.header_len() > usize::from(self.total_len()) {
            Err(Error::Malformed)
        } else if len < usize::from(self.total_len()) {
            Err(Error::Truncated)
        } else {
            Ok(())
        }
    }

    /// Return the version field.
    #[inline]
    pub fn version(&self) -> u8 {
        self.0[field_v4::VER_IHL] >> 4
    }

    /// Return the header length, in octets.
    #[inline]
    pub fn header_len(&self) -> usize {
        usize::from(self.0[field_v4::VER_IHL] & 0x0f) * 4
    }

    /// Return the total length field.
    #[inline]
    pub fn total_len(&self) -> u16 {
        NetworkEndian::read_u16(&self.0[field_v4::LENGTH])
    }

    /// Return the protocol field.
    #[inline]
    pub fn protocol(&self) -> Protocol {
        Protocol::from(self.0[field_v4::PROTOCOL])
    }

    /// Return the source address field.
    pub fn src_addr(&self) -> [u8; 4] {
        let mut addr = [0; 4];
        addr.copy_from_slice(&self.0[field_v4::SRC_ADDR]);
        addr
    }

    /// Return the destination address field.
    pub fn dst_addr(&self) -> [u8; 4] {
        let mut addr = [0; 4];
        addr.copy_from_slice(&self.0[field_v4::DST_ADDR]);
        addr
    }
}

impl ipv6 {
    /// The length of the fixed header.
    pub const HEADER_LEN: usize = field_v6::DST_ADDR.end;

    /// Imbue a raw octet buffer with IPv6 packet structure.
    pub fn new_unchecked(buffer: &[u8]) -> &ipv6 {
        Self::__from_macro_new_unchecked(buffer)
    }

    /// Shorthand for a combination of [new_unchecked] and [check_len].
    ///
    /// [new_unchecked]: #method.new_unchecked
    /// [check_len]: #method.check_len
    pub fn new_checked(data: &[u8]) -> Result<&ipv6> {
        let packet = Self::new_unchecked(data);
        packet.check_len()?;
        Ok(packet)
    }

    /// Ensure that no accessor method will panic if called.
    ///
    /// Returns `Err(Error::Truncated)` if the buffer is shorter than the fixed header plus the
    /// payload length. A zero payload length announces a jumbogram which is `Unsupported`.
    pub fn check_len(&self) -> Result<()> {
        let len = self.0.len();
        if len < Self::HEADER_LEN {
            Err(Error::Truncated)
        } else if self.payload_len() == 0 {
            Err(Error::Unsupported)
        } else if len < Self::HEADER_LEN + usize::from(self.payload_len()) {
            Err(Error::Truncated)
        } else {
            Ok(())
        }
    }

    /// Return the version field.
    #[inline]
    pub fn version(&self) -> u8 {
        (NetworkEndian::read_u32(&self.0[field_v6::VER_TC_FLOW]) >> 28) as u8
    }

    /// Return the payload length field.
    #[inline]
    pub fn payload_len(&self) -> u16 {
        NetworkEndian::read_u16(&self.0[field_v6::LENGTH])
    }

    /// Return the next header field.
    #[inline]
    pub fn next_header(&self) -> Protocol {
        Protocol::from(self.0[field_v6::NXT_HDR])
    }

    /// Return the source address field.
    pub fn src_addr(&self) -> [u8; 16] {
        let mut addr = [0; 16];
        addr.copy_from_slice(&self.0[field_v6::SRC_ADDR]);
        addr
    }

    /// Return the destination address field.
    pub fn dst_addr(&self) -> [u8; 16] {
        let mut addr = [0; 16];
        addr.copy_from_slice(&self.0[field_v6::DST_ADDR]);
        addr
    }
}

impl Repr {
    /// Parse the IP header at the start of `data`.
    ///
    /// The datagram must extend exactly to the end of `data`, an outgoing frame carries no
    /// padding after the IP payload.
    pub fn parse(data: &[u8]) -> Result<Repr> {
        let version = data.first().ok_or(Error::Truncated)? >> 4;
        let repr = match version {
            4 => {
                let packet = ipv4::new_checked(data)?;
                Repr {
                    addresses: Addresses::Ipv4 {
                        src: packet.src_addr(),
                        dst: packet.dst_addr(),
                    },
                    protocol: packet.protocol(),
                    header_len: packet.header_len(),
                    payload_len: usize::from(packet.total_len()) - packet.header_len(),
                }
            },
            6 => {
                let packet = ipv6::new_checked(data)?;
                match packet.next_header() {
                    Protocol::HopByHop | Protocol::Ipv6Route | Protocol::Ipv6Frag
                        | Protocol::Ipv6Opts | Protocol::Esp | Protocol::Ah
                        => return Err(Error::Unsupported),
                    _ => (),
                }
                Repr {
                    addresses: Addresses::Ipv6 {
                        src: packet.src_addr(),
                        dst: packet.dst_addr(),
                    },
                    protocol: packet.next_header(),
                    header_len: ipv6::HEADER_LEN,
                    payload_len: usize::from(packet.payload_len()),
                }
            },
            _ => return Err(Error::Unrecognized),
        };

        if repr.header_len + repr.payload_len != data.len() {
            return Err(Error::Malformed);
        }

        Ok(repr)
    }
}

impl fmt::Display for Addresses {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Addresses::Ipv4 { src, dst } => write!(f,
                "{}.{}.{}.{} -> {}.{}.{}.{}",
                src[0], src[1], src[2], src[3],
                dst[0], dst[1], dst[2], dst[3]),
            Addresses::Ipv6 { src, dst } => {
                let word = |bytes: &[u8; 16], i: usize| NetworkEndian::read_u16(&bytes[2*i..]);
                for i in 0..8 {
                    if i > 0 { write!(f, ":")?; }
                    write!(f, "{:x}", word(src, i))?;
                }
                write!(f, " -> ")?;
                for i in 0..8 {
                    if i > 0 { write!(f, ":")?; }
                    write!(f, "{:x}", word(dst, i))?;
                }
                Ok(())
            },
        }
    }
}
