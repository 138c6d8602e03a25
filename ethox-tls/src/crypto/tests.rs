use aes_gcm::{Aes128Gcm, Nonce};
use aes_gcm::aead::{AeadInPlace, KeyInit};

use super::*;
use crate::Error;
use crate::wire::{TlsAad, TlsContentType, TlsVersion};
use crate::wire::tls::MAX_PLAINTEXT_LEN;

const KEY: [u8; 16] = [0x11; 16];
const SALT: [u8; 4] = [0xca, 0xfe, 0xba, 0xbe];
const MAX_RECORD: usize = MAX_PLAINTEXT_LEN + 2048;

fn key_material() -> KeyMaterial {
    KeyMaterial {
        suite: CipherSuite::AesGcm128,
        version: TlsVersion::Tls12,
        key: KEY.to_vec(),
        iv: vec![0; 8],
        salt: SALT.to_vec(),
        rec_seq: [0; REC_SEQ_LEN],
    }
}

fn context() -> CryptoContext {
    let desc = cipher_desc(CipherSuite::AesGcm128).unwrap();
    CryptoContext::new(desc, &key_material()).unwrap()
}

/// A record as the stack hands it to the card, plaintext and room for the tag.
fn plain_record(iv: u64, plaintext: &[u8]) -> Vec<u8> {
    let declared = (8 + plaintext.len() + 16) as u16;
    let mut record = vec![23, 0x03, 0x03];
    record.extend_from_slice(&declared.to_be_bytes());
    record.extend_from_slice(&iv.to_be_bytes());
    record.extend_from_slice(plaintext);
    record.extend_from_slice(&[0; 16]);
    record
}

/// The record as the card would have put it on the wire.
fn sealed_record(record_sn: u64, plain: &[u8]) -> Vec<u8> {
    let mut record = plain.to_vec();
    let text_len = record.len() - 13 - 16;
    let aad = TlsAad::new(record_sn, TlsContentType::ApplicationData, TlsVersion::Tls12, text_len as u16);
    let mut nonce = SALT.to_vec();
    nonce.extend_from_slice(&record[5..13]);

    let aead = Aes128Gcm::new_from_slice(&KEY).unwrap();
    let (text, tag) = record[13..].split_at_mut(text_len);
    let sealed = aead
        .encrypt_in_place_detached(Nonce::from_slice(&nonce), aad.as_bytes(), text)
        .unwrap();
    tag.copy_from_slice(&sealed);
    record
}

fn segments(stream: &[u8], resync_len: usize) -> Segments {
    let area = vec![0; stream.len() + 16];
    let mut segments = Segments::new(area, resync_len, stream.len() - resync_len, 16).unwrap();
    segments.resync_mut().copy_from_slice(&stream[..resync_len]);
    segments.live_mut().copy_from_slice(&stream[resync_len..]);
    segments
}

fn payload(len: usize) -> Vec<u8> {
    (0..len).map(|i| i as u8).collect()
}

#[test]
fn cipher_table() {
    let gcm = cipher_desc(CipherSuite::from(52)).expect("AES-GCM-256 is known");
    assert_eq!(gcm.suite, CipherSuite::AesGcm256);
    assert_eq!((gcm.key, gcm.iv, gcm.salt, gcm.tag, gcm.rec_seq), (32, 8, 4, 16, 8));
    assert!(gcm.offloadable);

    let chacha = cipher_desc(CipherSuite::ChaCha20Poly1305).unwrap();
    assert_eq!((chacha.iv, chacha.salt), (12, 0));
    assert!(!chacha.offloadable);

    let offloadable = (51..=58)
        .filter_map(|id| cipher_desc(CipherSuite::from(id)))
        .filter(|desc| desc.offloadable)
        .count();
    assert_eq!(offloadable, 2);
    assert!(cipher_desc(CipherSuite::Unknown(99)).is_none());
}

#[test]
fn rejects_ineligible() {
    let ccm = cipher_desc(CipherSuite::AesCcm128).unwrap();
    let mut key = key_material();
    key.suite = CipherSuite::AesCcm128;
    assert_eq!(CryptoContext::new(ccm, &key).err(), Some(Error::Unsupported));

    let gcm = cipher_desc(CipherSuite::AesGcm128).unwrap();
    let mut key = key_material();
    key.key.truncate(15);
    assert_eq!(CryptoContext::new(gcm, &key).err(), Some(Error::Illegal));

    let mut key = key_material();
    key.suite = CipherSuite::AesGcm256;
    assert_eq!(CryptoContext::new(gcm, &key).err(), Some(Error::Illegal));

    for &version in &[TlsVersion::Tls13, TlsVersion::Unknown(0x1234)] {
        let mut key = key_material();
        key.version = version;
        assert_eq!(CryptoContext::new(gcm, &key).err(), Some(Error::Unsupported));
    }
}

#[test]
fn whole_record() {
    let context = context();
    let engine = Engine::new(&context, TlsVersion::Tls12, MAX_RECORD);
    let plain = plain_record(1, &payload(100));

    let mut segments = segments(&plain, 0);
    assert_eq!(engine.encrypt(&mut segments, 4), Ok(1));
    assert_eq!(segments.live(), &sealed_record(4, &plain)[..]);
}

#[test]
fn resync_positions_stream() {
    let context = context();
    let engine = Engine::new(&context, TlsVersion::Tls12, MAX_RECORD);
    let plain = plain_record(2, &payload(200));
    let sealed = sealed_record(9, &plain);

    for &resync in &[1, 13, 14, 100, 212] {
        let mut segments = segments(&plain, resync);
        assert_eq!(engine.encrypt(&mut segments, 9), Ok(1));
        assert_eq!(segments.live(), &sealed[resync..]);
    }
}

#[test]
fn consecutive_counters() {
    let context = context();
    let engine = Engine::new(&context, TlsVersion::Tls12, MAX_RECORD);
    let first = plain_record(7, &payload(64));
    let second = plain_record(8, &payload(33));

    let mut stream = first.clone();
    stream.extend_from_slice(&second);
    let mut expected = sealed_record(7, &first);
    expected.extend_from_slice(&sealed_record(8, &second));

    let mut segments = segments(&stream, 40);
    assert_eq!(engine.encrypt(&mut segments, 7), Ok(2));
    assert_eq!(segments.live(), &expected[40..]);
}

#[test]
fn cut_in_plaintext() {
    let context = context();
    let engine = Engine::new(&context, TlsVersion::Tls12, MAX_RECORD);
    let plain = plain_record(3, &payload(150));
    let sealed = sealed_record(0, &plain);

    // Stream ends 50 bytes into the plaintext.
    let mut segments = segments(&plain[..13 + 50], 20);
    assert_eq!(engine.encrypt(&mut segments, 0), Ok(1));
    assert_eq!(segments.live(), &sealed[20..63]);
}

#[test]
fn cut_in_tag() {
    let context = context();
    let engine = Engine::new(&context, TlsVersion::Tls12, MAX_RECORD);
    let plain = plain_record(3, &payload(150));
    let sealed = sealed_record(0, &plain);
    let cut = plain.len() - 11;

    let mut segments = segments(&plain[..cut], 0);
    assert_eq!(engine.encrypt(&mut segments, 0), Ok(1));
    assert_eq!(segments.live(), &sealed[..cut]);
    // The tag spills over, completely valid.
    assert_eq!(&segments.trailer()[..11], &sealed[cut..]);
}

#[test]
fn header_only_tail() {
    let context = context();
    let engine = Engine::new(&context, TlsVersion::Tls12, MAX_RECORD);
    let first = plain_record(5, &payload(32));
    let second = plain_record(6, &payload(32));

    for &tail in &[1, 5, 13] {
        let mut stream = first.clone();
        stream.extend_from_slice(&second[..tail]);
        let mut segments = segments(&stream, 0);
        assert_eq!(engine.encrypt(&mut segments, 0), Ok(1));
        assert_eq!(&segments.live()[..first.len()], &sealed_record(0, &first)[..]);
        assert_eq!(&segments.live()[first.len()..], &second[..tail]);
    }
}

#[test]
fn malformed_length() {
    let context = context();
    let plain = plain_record(0, &payload(16));

    let mut short = plain.clone();
    short[3..5].copy_from_slice(&20u16.to_be_bytes());
    let engine = Engine::new(&context, TlsVersion::Tls12, MAX_RECORD);
    assert_eq!(engine.encrypt(&mut segments(&short, 0), 0), Err(Error::Malformed));

    let engine = Engine::new(&context, TlsVersion::Tls12, 32);
    assert_eq!(engine.encrypt(&mut segments(&plain, 0), 0), Err(Error::Malformed));
}

#[test]
fn segment_lengths() {
    assert!(Segments::new(vec![0; 10], 2, 4, 4).is_ok());
    assert_eq!(Segments::new(vec![0; 10], 2, 4, 16).err(), Some(Error::Exhausted));
}
