//! TCP segment headers and sequence numbers.
use core::{cmp, fmt, ops};
use byteorder::{ByteOrder, NetworkEndian};

use super::{Error, Result};
use super::checksum;
use super::ip::{Addresses, Protocol};

/// A TCP sequence number.
///
/// A sequence number is a monotonically advancing integer modulo 2<sup>32</sup>.
/// Sequence numbers do not have a discontiguity when compared pairwise across a signed overflow.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Default, Hash)]
pub struct SeqNumber(pub i32);

impl SeqNumber {
    /// The signed distance from `other` to `self`, wrapping around the sequence space.
    pub fn distance(self, other: SeqNumber) -> i32 {
        self.0.wrapping_sub(other.0)
    }
}

impl fmt::Display for SeqNumber {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0 as u32)
    }
}

impl From<u32> for SeqNumber {
    fn from(seq: u32) -> Self {
        SeqNumber(seq as i32)
    }
}

impl ops::Add<usize> for SeqNumber {
    type Output = SeqNumber;

    fn add(self, rhs: usize) -> SeqNumber {
        SeqNumber(self.0.wrapping_add(rhs as i32))
    }
}

impl cmp::PartialOrd for SeqNumber {
    fn partial_cmp(&self, other: &SeqNumber) -> Option<cmp::Ordering> {
        self.distance(*other).partial_cmp(&0)
    }
}

byte_wrapper! {
    /// A byte sequence representing a TCP segment, header followed by payload.
    pub struct tcp([u8]);
}

mod field {
    use crate::wire::field::Field;

    pub(crate) const SRC_PORT: Field = 0..2;
    pub(crate) const DST_PORT: Field = 2..4;
    pub(crate) const SEQ_NUM:  Field = 4..8;
    pub(crate) const FLAGS:    Field = 12..14;
    pub(crate) const CHECKSUM: Field = 16..18;
    pub(crate) const URGENT:   Field = 18..20;
}

impl tcp {
    /// The offset of the checksum field within the header.
    pub const CHECKSUM_OFFSET: usize = field::CHECKSUM.start;

    /// Imbue a raw octet buffer with TCP segment structure.
    pub fn new_unchecked(buffer: &[u8]) -> &tcp {
        Self::__from_macro_new_unchecked(buffer)
    }

    /// Imbue a mutable octet buffer with TCP segment structure.
    pub fn new_unchecked_mut(buffer: &mut [u8]) -> &mut tcp {
        Self::__from_macro_new_unchecked_mut(buffer)
    }

    /// Shorthand for a combination of [new_unchecked] and [check_len].
    ///
    /// [new_unchecked]: #method.new_unchecked
    /// [check_len]: #method.check_len
    pub fn new_checked(data: &[u8]) -> Result<&tcp> {
        let packet = Self::new_unchecked(data);
        packet.check_len()?;
        Ok(packet)
    }

    /// Mutable variant of [new_checked].
    ///
    /// [new_checked]: #method.new_checked
    pub fn new_checked_mut(data: &mut [u8]) -> Result<&mut tcp> {
        let packet = Self::new_unchecked_mut(data);
        packet.check_len()?;
        Ok(packet)
    }

    /// Ensure that no header accessor method will panic if called.
    ///
    /// Returns `Err(Error::Truncated)` if the buffer is too short.
    /// Returns `Err(Error::Malformed)` if the header length field has a value smaller
    /// than the minimal header length.
    pub fn check_len(&self) -> Result<()> {
        let len = self.0.len();
        if len < field::URGENT.end {
            Err(Error::Truncated)
        } else {
            let header_len = self.header_len();
            if len < header_len {
                Err(Error::Truncated)
            } else if header_len < field::URGENT.end {
                Err(Error::Malformed)
            } else {
                Ok(())
            }
        }
    }

    /// Return the source port field.
    #[inline]
    pub fn src_port(&self) -> u16 {
        NetworkEndian::read_u16(&self.0[field::SRC_PORT])
    }

    /// Return the destination port field.
    #[inline]
    pub fn dst_port(&self) -> u16 {
        NetworkEndian::read_u16(&self.0[field::DST_PORT])
    }

    /// Return the sequence number field.
    #[inline]
    pub fn seq_number(&self) -> SeqNumber {
        SeqNumber(NetworkEndian::read_i32(&self.0[field::SEQ_NUM]))
    }

    /// Return the header length, in octets.
    #[inline]
    pub fn header_len(&self) -> usize {
        let raw = NetworkEndian::read_u16(&self.0[field::FLAGS]);
        usize::from((raw >> 12) * 4)
    }

    /// Return the checksum field.
    #[inline]
    pub fn checksum(&self) -> u16 {
        NetworkEndian::read_u16(&self.0[field::CHECKSUM])
    }

    /// Return the payload after the header.
    pub fn payload(&self) -> &[u8] {
        &self.0[self.header_len()..]
    }

    /// Set the checksum field.
    #[inline]
    pub fn set_checksum(&mut self, value: u16) {
        NetworkEndian::write_u16(&mut self.0[field::CHECKSUM], value)
    }

    /// Validate the checksum over header and payload.
    pub fn verify_checksum(&self, addresses: &Addresses) -> bool {
        checksum::combine(&[
            checksum::pseudo_header(addresses, Protocol::Tcp, self.0.len() as u32),
            checksum::data(&self.0),
        ]) == !0
    }

    /// Compute and fill in the full checksum in software.
    pub fn fill_checksum(&mut self, addresses: &Addresses) {
        self.set_checksum(0);
        let checksum = !checksum::combine(&[
            checksum::pseudo_header(addresses, Protocol::Tcp, self.0.len() as u32),
            checksum::data(&self.0),
        ]);
        self.set_checksum(checksum)
    }

    /// Prepare the checksum field for completion by the network card.
    ///
    /// The field is seeded with the pseudo header sum, the device adds the segment itself. This
    /// is the usual contract of partial checksum offload.
    pub fn seed_checksum(&mut self, addresses: &Addresses) {
        let seed = checksum::pseudo_header(addresses, Protocol::Tcp, self.0.len() as u32);
        self.set_checksum(seed)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    static SEGMENT: [u8; 24] = [
        0xbf, 0x00, 0x00, 0x50,
        0x01, 0x23, 0x45, 0x67,
        0x89, 0xab, 0xcd, 0xef,
        0x50, 0x18, 0x01, 0x23,
        0x00, 0x00, 0x00, 0x00,
        0xaa, 0x00, 0x00, 0xff,
    ];

    const ADDRESSES: Addresses = Addresses::Ipv4 {
        src: [192, 168, 1, 1],
        dst: [192, 168, 1, 2],
    };

    #[test]
    fn deconstruct() {
        let packet = tcp::new_checked(&SEGMENT[..]).expect("valid segment");
        assert_eq!(packet.src_port(), 48896);
        assert_eq!(packet.dst_port(), 80);
        assert_eq!(packet.seq_number(), SeqNumber(0x01234567));
        assert_eq!(packet.header_len(), 20);
        assert_eq!(packet.payload(), &[0xaa, 0x00, 0x00, 0xff]);
    }

    #[test]
    fn checksum_roundtrip() {
        let mut bytes = SEGMENT;
        let packet = tcp::new_checked_mut(&mut bytes[..]).expect("valid segment");
        assert!(!packet.verify_checksum(&ADDRESSES));
        packet.fill_checksum(&ADDRESSES);
        assert!(packet.verify_checksum(&ADDRESSES));
    }

    #[test]
    fn truncated_options() {
        let mut bytes = SEGMENT;
        // A 28 byte header does not fit the 24 byte segment.
        bytes[12] = 0x70;
        assert_eq!(tcp::new_checked(&bytes[..]).err(), Some(Error::Truncated));
        bytes[12] = 0x40;
        assert_eq!(tcp::new_checked(&bytes[..]).err(), Some(Error::Malformed));
    }

    #[test]
    fn sequence_wraps() {
        let late = SeqNumber::from(5u32);
        let early = SeqNumber::from(u32::max_value() - 5);
        assert!(early < late);
        assert_eq!(late.distance(early), 11);
        assert_eq!(early + 11, late);
    }
}
