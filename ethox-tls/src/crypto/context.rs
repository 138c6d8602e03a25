use core::fmt;

use aes_gcm::{Aes128Gcm, Aes256Gcm, Nonce};
use aes_gcm::aead::{AeadInPlace, KeyInit};
use zeroize::Zeroize;

use super::{CipherDesc, CipherSuite, Algorithm, MAX_SALT_LEN, REC_SEQ_LEN};
use crate::wire::{TlsAad, TlsVersion};
use crate::{Error, Result};

/// The nonce length of every eligible suite, salt and explicit IV.
const NONCE_LEN: usize = 12;

/// The transmit key material of one connection, as handed over when offload was set up.
///
/// The secret parts are overwritten when the value is dropped.
#[derive(Clone, Zeroize)]
pub struct KeyMaterial {
    /// The negotiated suite.
    #[zeroize(skip)]
    pub suite: CipherSuite,
    /// The negotiated protocol version, bound into every record tag.
    #[zeroize(skip)]
    pub version: TlsVersion,
    /// The symmetric key.
    pub key: Vec<u8>,
    /// The initial explicit IV.
    pub iv: Vec<u8>,
    /// The implicit salt.
    pub salt: Vec<u8>,
    /// The big endian number of the first offloaded record.
    pub rec_seq: [u8; REC_SEQ_LEN],
}

impl KeyMaterial {
    /// The number of the first offloaded record.
    pub fn record_sn(&self) -> u64 {
        u64::from_be_bytes(self.rec_seq)
    }
}

impl Drop for KeyMaterial {
    fn drop(&mut self) {
        self.zeroize();
    }
}

impl fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("KeyMaterial")
            .field("suite", &self.suite)
            .field("version", &self.version)
            .finish()
    }
}

enum Cipher {
    Aes128(Aes128Gcm),
    Aes256(Aes256Gcm),
}

/// The software AEAD state of a connection.
pub struct CryptoContext {
    desc: &'static CipherDesc,
    cipher: Cipher,
    salt: [u8; MAX_SALT_LEN],
}

impl CryptoContext {
    /// Instantiate the primitive of `desc` with the connection's key.
    ///
    /// Fails with `Unsupported` for suites a card never encrypts or a version other than TLS 1.2,
    /// and with `Illegal` when the key material does not have the lengths the suite prescribes.
    pub fn new(desc: &'static CipherDesc, key: &KeyMaterial) -> Result<Self> {
        if !desc.offloadable || desc.algorithm != Algorithm::AesGcm {
            return Err(Error::Unsupported);
        }

        if desc.nonce_len() != NONCE_LEN || desc.salt > MAX_SALT_LEN {
            return Err(Error::Unsupported);
        }

        // Records are framed with an explicit IV and the 13 byte additional data of TLS 1.2.
        if key.version != TlsVersion::Tls12 {
            return Err(Error::Unsupported);
        }

        if key.suite != desc.suite
            || key.key.len() != desc.key
            || key.salt.len() != desc.salt
            || key.iv.len() != desc.iv
        {
            return Err(Error::Illegal);
        }

        let cipher = match desc.key {
            16 => Aes128Gcm::new_from_slice(&key.key).map(Cipher::Aes128),
            32 => Aes256Gcm::new_from_slice(&key.key).map(Cipher::Aes256),
            _ => return Err(Error::Unsupported),
        }.map_err(|_| Error::Illegal)?;

        let mut salt = [0; MAX_SALT_LEN];
        salt[..desc.salt].copy_from_slice(&key.salt);

        Ok(CryptoContext {
            desc,
            cipher,
            salt,
        })
    }

    /// The suite this context encrypts.
    pub fn desc(&self) -> &'static CipherDesc {
        self.desc
    }

    /// Encrypt `text` in place and write its authentication tag into `tag`.
    ///
    /// The nonce is the connection salt followed by the record's `explicit_iv`.
    pub fn seal(
        &self,
        explicit_iv: &[u8],
        aad: &TlsAad,
        text: &mut [u8],
        tag: &mut [u8],
    ) -> Result<()> {
        if explicit_iv.len() != self.desc.iv || tag.len() != self.desc.tag {
            return Err(Error::Crypto);
        }

        let mut nonce = [0u8; NONCE_LEN];
        let (salt, iv) = nonce.split_at_mut(self.desc.salt);
        salt.copy_from_slice(&self.salt[..self.desc.salt]);
        iv.copy_from_slice(explicit_iv);
        let nonce = Nonce::from_slice(&nonce);

        let sealed = match &self.cipher {
            Cipher::Aes128(aead) => aead.encrypt_in_place_detached(nonce, aad.as_bytes(), text),
            Cipher::Aes256(aead) => aead.encrypt_in_place_detached(nonce, aad.as_bytes(), text),
        }.map_err(|_| Error::Crypto)?;

        tag.copy_from_slice(sealed.as_slice());
        Ok(())
    }
}

impl Drop for CryptoContext {
    fn drop(&mut self) {
        self.salt.zeroize();
    }
}

impl fmt::Debug for CryptoContext {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("CryptoContext")
            .field("suite", &self.desc.suite)
            .finish()
    }
}
