//! Encrypt retransmissions in software when the card can not.
//!
//! A connection with offloaded encryption hands plaintext records to the card. When a segment of
//! such a connection is routed through another device, for example after a bond failed over, the
//! bytes would leave in plaintext. The fallback intercepts those segments and encrypts their payload
//! exactly as the card would have.
//!
//! The retransmitted range rarely starts at a record boundary. Since a record's ciphertext can
//! only be produced from its start, the plaintext in front of the range is fetched from the
//! ledger and encrypted along, then discarded. The decision for one buffer runs through these
//! steps:
//!
//! ```text
//! PASSTHROUGH <- egress is the offload device, or an aggregate, or no payload
//! RESOLVE     -> find the covering record; stale and fully before the offload start: PASSTHROUGH
//! ENCRYPT     -> resync and live payload in one scratch area
//! ASSEMBLE    -> replacement with verbatim headers, fresh checksum, moved owner
//! DROP        <- any failure, the original is released and the error returned
//! ```
//!
//! No step blocks. The ledger is locked only while resolving.
use spin::Once;

use crate::buffer::{Allocator, Buffer, Headers, Heap};
use crate::config::Config;
use crate::crypto::{cipher_desc, CryptoContext, Engine, KeyMaterial, Segments};
use crate::ledger::{Ledger, Resolution, Resync};
use crate::nic::{DeviceId, Egress};
use crate::ratelimit::RateLimit;
use crate::wire::TcpSeqNumber;
use crate::{Error, Result};

mod assemble;

/// The transmit side of a connection with offloaded encryption.
pub struct Connection {
    config: Config,
    device: DeviceId,
    key: KeyMaterial,
    crypto: Once<CryptoContext>,
    ledger: Ledger,
    alloc: Box<dyn Allocator>,
    limit: RateLimit,
}

enum Outcome {
    Passthrough,
    Replaced(Buffer),
}

impl Connection {
    /// Set up offload of the connection to `device`.
    ///
    /// `start` is the sequence number of the first byte encrypted by the card, the key material
    /// holds the number of the first record.
    pub fn new(device: DeviceId, key: KeyMaterial, start: TcpSeqNumber, config: Config) -> Self {
        Connection::with_allocator(device, key, start, config, Box::new(Heap))
    }

    /// Set up offload with a custom memory source for the transmit path.
    pub fn with_allocator(
        device: DeviceId,
        key: KeyMaterial,
        start: TcpSeqNumber,
        config: Config,
        alloc: Box<dyn Allocator>,
    ) -> Self {
        let ledger = Ledger::new(start, key.record_sn(), config.max_record_frags);
        Connection {
            config,
            device,
            key,
            crypto: Once::new(),
            ledger,
            alloc,
            limit: RateLimit::new(config.log_interval, config.log_burst),
        }
    }

    /// The records of the connection, filled by the offload bookkeeping.
    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// The device the encryption is offloaded to.
    pub fn device(&self) -> DeviceId {
        self.device
    }

    /// Create the software cipher now instead of on first use.
    ///
    /// Fails with `Unsupported` if the suite can not be offloaded and `Illegal` if the key material
    /// does not fit it. A context that was created once is kept.
    pub fn init_fallback_crypto(&self) -> Result<()> {
        self.crypto().map(|_| ())
    }

    /// Make `buffer` fit to egress through `egress`.
    ///
    /// Segments leaving through the offload device, or an aggregate that will dispatch them to a
    /// member device, are returned unchanged. All others are encrypted in software.
    pub fn maybe_fallback_encrypt(&self, buffer: Buffer, egress: &Egress) -> Result<Buffer> {
        if egress.device() == self.device || egress.is_aggregate() {
            return Ok(buffer);
        }

        self.fallback(buffer, Some(egress))
    }

    /// Encrypt the payload of `buffer` in software.
    ///
    /// The egress device is not known so a checksum not already delegated is computed in full.
    pub fn force_fallback_encrypt(&self, buffer: Buffer) -> Result<Buffer> {
        self.fallback(buffer, None)
    }

    fn crypto(&self) -> Result<&CryptoContext> {
        self.crypto.try_call_once(|| {
            let desc = cipher_desc(self.key.suite).ok_or(Error::Unsupported)?;
            CryptoContext::new(desc, &self.key)
        }).map_err(|err| {
            net_warn_ratelimited!(self.limit, "tls fallback: cipher setup failed: {}", err);
            err
        })
    }

    fn fallback(&self, mut buffer: Buffer, egress: Option<&Egress>) -> Result<Buffer> {
        let headers = buffer.headers()?;
        if buffer.len() == headers.payload {
            return Ok(buffer);
        }

        let mut resync = Resync::with_capacity(&*self.alloc, self.ledger.max_record_frags())?;
        let outcome = self.reconstruct(&mut buffer, &headers, &mut resync, egress);
        resync.release();

        // The original is dropped on every path but passthrough.
        match outcome {
            Ok(Outcome::Passthrough) => Ok(buffer),
            Ok(Outcome::Replaced(replacement)) => Ok(replacement),
            Err(err) => {
                net_debug!("tls fallback: dropping segment at {}: {}", headers.seq, err);
                Err(err)
            },
        }
    }

    fn reconstruct(
        &self,
        original: &mut Buffer,
        headers: &Headers,
        resync: &mut Resync,
        egress: Option<&Egress>,
    ) -> Result<Outcome> {
        let payload_len = original.len() - headers.payload;

        let (record_sn, sync_size) = match self.ledger.resolve(headers.seq, resync)? {
            Resolution::Covered { record_sn, sync_size } => (record_sn, sync_size),
            // Data sent before offload started, it never was encrypted by the card.
            Resolution::Stale { behind } if payload_len as u64 <= behind => {
                return Ok(Outcome::Passthrough);
            },
            Resolution::Stale { .. } => return Err(Error::Unresolved),
        };

        let context = self.crypto()?;
        let tag_len = context.desc().tag;
        let area_len = sync_size
            .checked_add(payload_len)
            .and_then(|len| len.checked_add(tag_len))
            .ok_or(Error::Exhausted)?;

        let mut segments = Segments::new(self.alloc.bytes(area_len)?, sync_size, payload_len, tag_len)?;
        debug_assert_eq!(resync.len(), sync_size);
        if !resync.is_empty() {
            resync.copy_to(segments.resync_mut());
        }
        segments.live_mut().copy_from_slice(&original.data()[headers.payload..]);
        let frame = self.alloc.bytes(original.len())?;

        Engine::new(context, self.key.version, self.config.max_record_len)
            .encrypt(&mut segments, record_sn)
            .map_err(|err| {
                if err == Error::Crypto {
                    net_warn_ratelimited!(self.limit,
                        "tls fallback: encryption failed for record {}", record_sn);
                }
                err
            })?;

        let replacement = assemble::assemble(original, frame, headers, segments.live(), egress)?;
        Ok(Outcome::Replaced(replacement))
    }
}
