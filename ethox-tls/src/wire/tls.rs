//! TLS record framing, as far as the transmit path needs it.
//!
//! Every record on the wire is laid out as
//!
//! ```text
//! +------+---------+--------+-------------+------------+-----+
//! | type | version | length | explicit IV | ciphertext | tag |
//! |  1   |    2    |   2    |   iv_len    |    ...     | ... |
//! +------+---------+--------+-------------+------------+-----+
//! ```
//!
//! where `length` counts everything after the five byte header. The explicit IV and the header
//! are never encrypted.
use byteorder::{ByteOrder, NetworkEndian};

use super::{Error, Result};

enum_with_unknown! {
    /// The content type of a TLS record.
    pub enum ContentType(u8) {
        ChangeCipherSpec = 20,
        Alert = 21,
        Handshake = 22,
        ApplicationData = 23,
    }
}

enum_with_unknown! {
    /// The legacy protocol version field.
    pub enum ProtocolVersion(u16) {
        Tls12 = 0x0303,
        Tls13 = 0x0304,
    }
}

/// The length of the record header before the explicit IV.
pub const HEADER_LEN: usize = 5;

/// The length of the additional authenticated data of a TLS 1.2 record.
pub const AAD_LEN: usize = 13;

/// The largest plaintext a single record may carry.
pub const MAX_PLAINTEXT_LEN: usize = 1 << 14;

byte_wrapper! {
    /// A byte sequence starting with a TLS record header.
    pub struct tls_record([u8]);
}

mod field {
    use crate::wire::field::{Field, Rest};

    pub(crate) const CONTENT_TYPE: usize = 0;
    pub(crate) const VERSION: Field = 1..3;
    pub(crate) const LENGTH: Field = 3..5;
    pub(crate) const IV: Rest = 5..;
}

impl tls_record {
    /// Imbue a raw octet buffer with the structure of a record header.
    pub fn new_unchecked(buffer: &[u8]) -> &tls_record {
        Self::__from_macro_new_unchecked(buffer)
    }

    /// Shorthand for a combination of [new_unchecked] and [check_len].
    ///
    /// [new_unchecked]: #method.new_unchecked
    /// [check_len]: #method.check_len
    pub fn new_checked(data: &[u8], iv_len: usize) -> Result<&tls_record> {
        let record = Self::new_unchecked(data);
        record.check_len(iv_len)?;
        Ok(record)
    }

    /// Ensure that the header and an explicit IV of `iv_len` bytes are present.
    ///
    /// Returns `Err(Error::Truncated)` if the buffer is too short.
    pub fn check_len(&self, iv_len: usize) -> Result<()> {
        if self.0.len() < HEADER_LEN + iv_len {
            Err(Error::Truncated)
        } else {
            Ok(())
        }
    }

    /// Return the content type field.
    #[inline]
    pub fn content_type(&self) -> ContentType {
        ContentType::from(self.0[field::CONTENT_TYPE])
    }

    /// Return the legacy version field.
    #[inline]
    pub fn version(&self) -> ProtocolVersion {
        ProtocolVersion::from(NetworkEndian::read_u16(&self.0[field::VERSION]))
    }

    /// Return the length field, counting everything after the header.
    #[inline]
    pub fn length(&self) -> u16 {
        NetworkEndian::read_u16(&self.0[field::LENGTH])
    }

    /// Return the explicit IV following the header.
    pub fn explicit_iv(&self, iv_len: usize) -> &[u8] {
        &self.0[field::IV][..iv_len]
    }
}

/// The lengths derived from a record header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    /// The bytes after the header and explicit IV, ciphertext and tag.
    pub body_len: usize,
    /// The bytes of plaintext, equal to those of ciphertext.
    pub plaintext_len: usize,
}

impl Layout {
    /// Derive the layout from the declared record length.
    ///
    /// Returns `Err(Error::Malformed)` if the length can not hold the IV and tag, or exceeds the
    /// record size limit `max_len`.
    pub fn new(declared: u16, iv_len: usize, tag_len: usize, max_len: usize) -> Result<Self> {
        let declared = usize::from(declared);
        if declared > max_len {
            return Err(Error::Malformed);
        }

        let body_len = declared.checked_sub(iv_len).ok_or(Error::Malformed)?;
        let plaintext_len = body_len.checked_sub(tag_len).ok_or(Error::Malformed)?;
        Ok(Layout { body_len, plaintext_len })
    }
}

/// The additional authenticated data of a TLS 1.2 record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Aad([u8; AAD_LEN]);

impl Aad {
    /// Assemble the data bound into the tag of record number `record_sn`.
    pub fn new(
        record_sn: u64,
        content_type: ContentType,
        version: ProtocolVersion,
        plaintext_len: u16,
    ) -> Self {
        let mut aad = [0; AAD_LEN];
        NetworkEndian::write_u64(&mut aad[0..8], record_sn);
        aad[8] = content_type.into();
        NetworkEndian::write_u16(&mut aad[9..11], version.into());
        NetworkEndian::write_u16(&mut aad[11..13], plaintext_len);
        Aad(aad)
    }

    /// The bytes to pass to the AEAD.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn header_fields() {
        let bytes = hex::decode("1703030020000000000000002a").unwrap();
        let record = tls_record::new_checked(&bytes, 8).expect("header and iv present");
        assert_eq!(record.content_type(), ContentType::ApplicationData);
        assert_eq!(record.version(), ProtocolVersion::Tls12);
        assert_eq!(record.length(), 0x20);
        assert_eq!(record.explicit_iv(8), &[0, 0, 0, 0, 0, 0, 0, 0x2a]);
        assert!(tls_record::new_checked(&bytes[..12], 8).is_err());
    }

    #[test]
    fn layout_bounds() {
        assert_eq!(Layout::new(40, 8, 16, 1 << 15), Ok(Layout { body_len: 32, plaintext_len: 16 }));
        assert_eq!(Layout::new(24, 8, 16, 1 << 15), Ok(Layout { body_len: 16, plaintext_len: 0 }));
        assert_eq!(Layout::new(23, 8, 16, 1 << 15), Err(Error::Malformed));
        assert_eq!(Layout::new(4, 8, 16, 1 << 15), Err(Error::Malformed));
        assert_eq!(Layout::new(1000, 8, 16, 512), Err(Error::Malformed));
    }

    #[test]
    fn aad_layout() {
        let aad = Aad::new(0x0102030405060708, ContentType::ApplicationData, ProtocolVersion::Tls12, 0x1234);
        assert_eq!(aad.as_bytes(), &hex::decode("01020304050607081703031234").unwrap()[..]);
    }
}
