//! Replay a retransmission of an offloaded TLS stream through the software fallback.
//!
//! A stream of records is framed and sealed the way a card would, then tracked with a connection
//! as the offload bookkeeping does. One byte range of it is retransmitted over a device without
//! the keys and the replacement compared byte by byte against the card's ciphertext.
use core::fmt;

use aes_gcm::{Aes128Gcm, Aes256Gcm};
use aes_gcm::aead::{AeadInPlace, KeyInit, Nonce};

use ethox_tls::{Buffer, Connection, DeviceId, Egress};
use ethox_tls::Config as FallbackConfig;
use ethox_tls::crypto::{CipherSuite, KeyMaterial};
use ethox_tls::ledger::{Fragment, Page};
use ethox_tls::nic::{Personality, Tcp};
use ethox_tls::wire::{Addresses, Checksum, TcpSeqNumber, TlsAad, TlsContentType, TlsVersion};
use ethox_tls::wire::tcp_segment;

pub mod config;

use config::{Cipher, Config};

const OFFLOAD_DEVICE: DeviceId = DeviceId(1);
const ROUTED_DEVICE: DeviceId = DeviceId(2);
const LINK_LEN: usize = 14;
const FIRST_SN: u64 = 1;
const SALT: [u8; 4] = [0x5a, 0x17, 0x00, 0x01];

const HEADER_LEN: usize = 5;
const IV_LEN: usize = 8;
const TAG_LEN: usize = 16;
const MAX_TEXT_LEN: usize = 1 << 14;
const MAX_SEGMENT_LEN: usize = 0xffff - 40;

const V4: Addresses = Addresses::Ipv4 {
    src: [10, 0, 0, 1],
    dst: [10, 0, 0, 2],
};

const V6: Addresses = Addresses::Ipv6 {
    src: [0xfd, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1],
    dst: [0xfd, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 2],
};

/// The outcome of a successful replay.
pub struct Report {
    cipher: Cipher,
    records: usize,
    stream_len: usize,
    offset: usize,
    len: usize,
    oldest_record_sn: u64,
    checksum: Checksum,
}

/// Why a replay did not produce the card's ciphertext.
#[derive(Debug)]
pub enum Error {
    /// The options describe no valid stream or range.
    Config(&'static str),
    /// The fallback refused the retransmission.
    Fallback(ethox_tls::Error),
    /// The replacement differs from the card's ciphertext at this stream offset.
    Mismatch(usize),
    /// The software checksum of the replacement is wrong.
    Checksum,
}

/// The records as the stack framed them and as the card sealed them.
struct Stream {
    plain: Vec<u8>,
    sealed: Vec<u8>,
}

pub fn replay(config: &Config) -> Result<Report, Error> {
    let stream_len = check(config)?;
    let cipher = config.cipher();
    let (suite, key) = match cipher {
        Cipher::Aes128 => (CipherSuite::AesGcm128, vec![0x42; 16]),
        Cipher::Aes256 => (CipherSuite::AesGcm256, vec![0x42; 32]),
    };

    let stream = match cipher {
        Cipher::Aes128 => Stream::seal::<Aes128Gcm>(&key, config)?,
        Cipher::Aes256 => Stream::seal::<Aes256Gcm>(&key, config)?,
    };

    let material = KeyMaterial {
        suite,
        version: TlsVersion::Tls12,
        key,
        iv: vec![0; IV_LEN],
        salt: SALT.to_vec(),
        rec_seq: FIRST_SN.to_be_bytes(),
    };

    let start = TcpSeqNumber::from(config.start);
    let connection = Connection::new(OFFLOAD_DEVICE, material, start, FallbackConfig::default());
    connection.init_fallback_crypto()?;

    let page = Page::new(stream.plain.clone());
    for index in 0..config.records {
        let frag = Fragment::new(&page, index * config.record_len, config.record_len)
            .ok_or(Error::Config("record outside of the stream"))?;
        connection.ledger().push_record(vec![frag])?;
    }

    let acked = TcpSeqNumber::from(config.start.wrapping_add(config.acked as u32));
    connection.ledger().acknowledge(acked);
    let oldest_record_sn = connection.ledger().unacked_record_sn();

    let addresses = if config.ipv6 { V6 } else { V4 };
    let range = config.offset..config.offset + config.len;
    let seq = config.start.wrapping_add(config.offset as u32);
    let buffer = Buffer::new(frame(addresses, seq, &stream.plain[range.clone()]), LINK_LEN);

    let mut personality = Personality::baseline();
    *personality.capabilities_mut().tcp_mut() = if config.checksum_offload {
        Tcp::offloaded()
    } else {
        Tcp::no_support()
    };
    let egress = Egress::physical(ROUTED_DEVICE, personality);

    let replacement = connection.maybe_fallback_encrypt(buffer, &egress)?;
    let headers = replacement.headers()?;
    let payload = &replacement.data()[headers.payload..];

    if let Some(at) = payload.iter().zip(&stream.sealed[range]).position(|(a, b)| a != b) {
        return Err(Error::Mismatch(config.offset + at));
    }

    let checksum = replacement.checksum();
    if checksum == Checksum::Manual {
        let segment = tcp_segment::new_checked(&replacement.data()[headers.transport..])
            .map_err(ethox_tls::Error::from)?;
        if !segment.verify_checksum(&headers.addresses) {
            return Err(Error::Checksum);
        }
    }

    Ok(Report {
        cipher,
        records: config.records,
        stream_len,
        offset: config.offset,
        len: config.len,
        oldest_record_sn,
        checksum,
    })
}

fn check(config: &Config) -> Result<usize, Error> {
    let overhead = HEADER_LEN + IV_LEN + TAG_LEN;
    if config.record_len <= overhead || config.record_len > overhead + MAX_TEXT_LEN {
        return Err(Error::Config("record length out of range"));
    }

    let stream_len = config.record_len
        .checked_mul(config.records)
        .ok_or(Error::Config("stream too long"))?;
    if config.len == 0 || config.len > MAX_SEGMENT_LEN {
        return Err(Error::Config("retransmission does not fit a segment"));
    }

    if config.acked > config.offset {
        return Err(Error::Config("retransmission of acknowledged data"));
    }

    match config.offset.checked_add(config.len) {
        Some(end) if end <= stream_len => Ok(stream_len),
        _ => Err(Error::Config("retransmission beyond the stream")),
    }
}

impl Stream {
    fn seal<A: AeadInPlace + KeyInit>(key: &[u8], config: &Config) -> Result<Self, Error> {
        let aead = A::new_from_slice(key).map_err(|_| Error::Config("invalid key length"))?;
        let text_len = config.record_len - HEADER_LEN - IV_LEN - TAG_LEN;
        let mut plain = Vec::with_capacity(config.record_len * config.records);
        let mut sealed = Vec::with_capacity(config.record_len * config.records);

        for index in 0..config.records {
            let explicit_iv = (index as u64).to_be_bytes();
            let mut record = vec![u8::from(TlsContentType::ApplicationData), 0x03, 0x03];
            record.extend_from_slice(&((config.record_len - HEADER_LEN) as u16).to_be_bytes());
            record.extend_from_slice(&explicit_iv);
            record.extend((0..text_len).map(|i| (index * 7 + i) as u8));
            record.extend_from_slice(&[0; TAG_LEN]);
            plain.extend_from_slice(&record);

            let aad = TlsAad::new(
                FIRST_SN + index as u64,
                TlsContentType::ApplicationData,
                TlsVersion::Tls12,
                text_len as u16);
            let mut nonce = SALT.to_vec();
            nonce.extend_from_slice(&explicit_iv);

            let body = &mut record[HEADER_LEN + IV_LEN..];
            let (text, tag) = body.split_at_mut(text_len);
            let computed = aead
                .encrypt_in_place_detached(Nonce::<A>::from_slice(&nonce), aad.as_bytes(), text)
                .map_err(|_| Error::Fallback(ethox_tls::Error::Crypto))?;
            tag.copy_from_slice(&computed);
            sealed.extend_from_slice(&record);
        }

        Ok(Stream { plain, sealed })
    }
}

/// A frame carrying `payload` at sequence number `seq`, with a stale TCP checksum.
fn frame(addresses: Addresses, seq: u32, payload: &[u8]) -> Vec<u8> {
    let mut frame = vec![0; LINK_LEN];
    frame[12..14].copy_from_slice(&[0x08, 0x00]);
    let tcp_len = 20 + payload.len();
    match addresses {
        Addresses::Ipv4 { src, dst } => {
            frame.extend_from_slice(&[0x45, 0x00]);
            frame.extend_from_slice(&((20 + tcp_len) as u16).to_be_bytes());
            frame.extend_from_slice(&[0x00, 0x01, 0x40, 0x00, 0x40, 0x06, 0x00, 0x00]);
            frame.extend_from_slice(&src);
            frame.extend_from_slice(&dst);
        },
        Addresses::Ipv6 { src, dst } => {
            frame[12..14].copy_from_slice(&[0x86, 0xdd]);
            frame.extend_from_slice(&[0x60, 0x00, 0x00, 0x00]);
            frame.extend_from_slice(&(tcp_len as u16).to_be_bytes());
            frame.extend_from_slice(&[0x06, 0x40]);
            frame.extend_from_slice(&src);
            frame.extend_from_slice(&dst);
        },
    }

    frame.extend_from_slice(&[0xc3, 0x50, 0x01, 0xbb]);
    frame.extend_from_slice(&seq.to_be_bytes());
    frame.extend_from_slice(&[0, 0, 0, 0, 0x50, 0x18, 0x01, 0x00, 0xff, 0xff, 0x00, 0x00]);
    frame.extend_from_slice(payload);
    frame
}

impl From<ethox_tls::Error> for Error {
    fn from(err: ethox_tls::Error) -> Self {
        Error::Fallback(err)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Config(reason) => write!(f, "invalid options: {}", reason),
            Error::Fallback(err) => write!(f, "fallback failed: {}", err),
            Error::Mismatch(offset) => write!(f, "ciphertext differs at stream offset {}", offset),
            Error::Checksum => write!(f, "replacement carries a wrong checksum"),
        }
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let cipher = match self.cipher {
            Cipher::Aes128 => "AES-GCM-128",
            Cipher::Aes256 => "AES-GCM-256",
        };
        let checksum = match self.checksum {
            Checksum::Manual => "computed in software",
            Checksum::Ignored => "delegated to the device",
        };
        writeln!(f, "Cipher:     {}", cipher)?;
        writeln!(f, "Stream:     {} records, {} B", self.records, self.stream_len)?;
        writeln!(f, "Replayed:   {} B at offset {}", self.len, self.offset)?;
        writeln!(f, "Oldest:     record {}", self.oldest_record_sn)?;
        write!(f, "Checksum:   {}", checksum)
    }
}

#[cfg(test)]
mod tests;
