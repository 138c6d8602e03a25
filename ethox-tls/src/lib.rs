//! Software fallback for TLS records whose encryption was offloaded to a network card.
//!
//! ## Table of contents
//!
//! 1. [Overview](#overview)
//! 2. [The wire module](wire/index.html)
//! 3. [Tracked records](ledger/index.html)
//! 4. [Record encryption](crypto/index.html)
//! 5. [The fallback](fallback/index.html)
//!
//! ## Overview
//!
//! With kernel style TLS offload the stack frames records in plaintext and the card encrypts them
//! on the way out. This stops working as soon as a segment takes another route: a retransmission
//! after a bond failover, or a route change to a device without the connection's keys. The card
//! of the new route sends whatever bytes it is given.
//!
//! This crate rebuilds the exact ciphertext the card would have produced for any retransmitted
//! byte range. It finds the record that covers the range, encrypts that record from its start
//! in software and keeps only the bytes of the range, then patches the result into a copy of the
//! original frame.
//!
//! Everything runs on the transmit path. Nothing in here sleeps, and every call either returns a
//! complete replacement or releases the original and fails.
//!
//! ```
//! use ethox_tls::{Buffer, Config, Connection, DeviceId};
//! use ethox_tls::crypto::{CipherSuite, KeyMaterial};
//! use ethox_tls::wire::{TcpSeqNumber, TlsVersion};
//!
//! let key = KeyMaterial {
//!     suite: CipherSuite::AesGcm128,
//!     version: TlsVersion::Tls12,
//!     key: vec![0; 16],
//!     iv: vec![0; 8],
//!     salt: vec![0; 4],
//!     rec_seq: [0; 8],
//! };
//!
//! let connection = Connection::new(DeviceId(1), key, TcpSeqNumber(1000), Config::default());
//! connection.init_fallback_crypto().expect("AES-GCM can be offloaded");
//! ```
#![warn(missing_docs)]
#![warn(unreachable_pub)]

#[macro_use] mod macros;
mod error;

pub mod buffer;
pub mod config;
pub mod crypto;
pub mod fallback;
pub mod ledger;
pub mod nic;
pub mod ratelimit;
pub mod wire;

pub use self::buffer::Buffer;
pub use self::config::Config;
pub use self::error::{Error, Result};
pub use self::fallback::Connection;
pub use self::nic::{DeviceId, Egress};
