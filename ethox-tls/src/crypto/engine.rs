//! Re-encryption of a run of records in software.
//!
//! The engine works on one contiguous scratch area split into three segments:
//!
//! ```text
//! +---------------+--------------+-------------+
//! | resync bytes  | live payload | tag trailer |
//! +---------------+--------------+-------------+
//!  ^ start of the covering record               ^ never emitted
//! ```
//!
//! The resync bytes are the plaintext of the covering record in front of the retransmitted range.
//! They are only encrypted to bring the cipher stream into the right position, only the live
//! segment ever leaves the scratch area. A record cut short by the end of the live payload still
//! has its tag computed, which lands in the trailer.
use core::cmp;

use super::{CryptoContext, MAX_IV_LEN};
use crate::wire::{tls_record, TlsAad, TlsVersion};
use crate::wire::tls::Layout;
use crate::{Error, Result};

/// The scratch area of one reconstruction.
pub struct Segments {
    area: Vec<u8>,
    resync_len: usize,
    live_len: usize,
}

impl Segments {
    /// Split a scratch area of exactly `resync_len + live_len + tag_len` bytes.
    ///
    /// Returns `Err(Error::Exhausted)` if the area has any other length.
    pub fn new(area: Vec<u8>, resync_len: usize, live_len: usize, tag_len: usize) -> Result<Self> {
        let expected = resync_len
            .checked_add(live_len)
            .and_then(|len| len.checked_add(tag_len))
            .ok_or(Error::Exhausted)?;
        if area.len() != expected {
            return Err(Error::Exhausted);
        }

        Ok(Segments {
            area,
            resync_len,
            live_len,
        })
    }

    /// The segment holding the resync bytes.
    pub fn resync_mut(&mut self) -> &mut [u8] {
        &mut self.area[..self.resync_len]
    }

    /// The segment holding the live payload.
    pub fn live(&self) -> &[u8] {
        &self.area[self.resync_len..self.input_len()]
    }

    /// The segment holding the live payload, mutably.
    pub fn live_mut(&mut self) -> &mut [u8] {
        let end = self.input_len();
        &mut self.area[self.resync_len..end]
    }

    /// The trailer receiving the tag of a record cut short.
    pub fn trailer(&self) -> &[u8] {
        &self.area[self.input_len()..]
    }

    /// The number of bytes of record stream, resync and live.
    pub fn input_len(&self) -> usize {
        self.resync_len + self.live_len
    }

    fn area_mut(&mut self) -> &mut [u8] {
        &mut self.area
    }
}

/// Encrypts the records of one connection.
pub struct Engine<'a> {
    context: &'a CryptoContext,
    version: TlsVersion,
    max_record_len: usize,
}

impl<'a> Engine<'a> {
    /// Create an engine for a connection that negotiated `version`.
    ///
    /// Any record declaring a length above `max_record_len` is rejected as malformed.
    pub fn new(context: &'a CryptoContext, version: TlsVersion, max_record_len: usize) -> Self {
        Engine {
            context,
            version,
            max_record_len,
        }
    }

    /// Encrypt all records in the segments in place.
    ///
    /// The first record starts at the beginning of the resync segment and has the number
    /// `record_sn`, each following record the next number. Returns the number of records sealed.
    ///
    /// A stream ending inside or right after a record preamble is not an error, the preamble is
    /// left as is. On error the segments contain partial output and must be discarded.
    pub fn encrypt(&self, segments: &mut Segments, mut record_sn: u64) -> Result<usize> {
        let desc = self.context.desc();
        let preamble_len = desc.preamble_len();
        let input_len = segments.input_len();
        let area = segments.area_mut();

        let mut offset = 0;
        let mut sealed = 0;

        while offset < input_len {
            let remaining = input_len - offset;
            if remaining <= preamble_len {
                net_trace!("tls fallback: stream ends in preamble of record {}", record_sn);
                break;
            }

            let record = tls_record::new_checked(&area[offset..input_len], desc.iv)?;
            let layout = Layout::new(record.length(), desc.iv, desc.tag, self.max_record_len)?;
            let aad = TlsAad::new(
                record_sn,
                record.content_type(),
                self.version,
                layout.plaintext_len as u16);
            let mut iv = [0u8; MAX_IV_LEN];
            iv[..desc.iv].copy_from_slice(record.explicit_iv(desc.iv));

            let text_start = offset + preamble_len;
            let text_len = cmp::min(remaining - preamble_len, layout.plaintext_len);
            let (text, rest) = area[text_start..].split_at_mut(text_len);
            // A cut record spills its tag into the trailer.
            let tag = rest.get_mut(..desc.tag).ok_or(Error::Exhausted)?;
            self.context.seal(&iv[..desc.iv], &aad, text, tag)?;

            net_trace!("tls fallback: sealed record {} ({} of {} bytes)",
                record_sn, text_len, layout.plaintext_len);

            record_sn = record_sn.wrapping_add(1);
            sealed += 1;
            offset = text_start + layout.body_len;
        }

        Ok(sealed)
    }
}

