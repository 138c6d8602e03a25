//! Cipher suites and the software record encryption.
//!
//! The table in this module describes every suite a connection may have negotiated, only some of
//! which a network card can encrypt. Exactly those are eligible for the software fallback, the
//! fallback must produce the bytes the card would have produced and no card offloads the others.
mod context;
mod engine;

pub use self::context::{CryptoContext, KeyMaterial};
pub use self::engine::{Engine, Segments};

/// The longest explicit IV of any suite.
pub const MAX_IV_LEN: usize = 16;

/// The longest implicit salt of any suite.
pub const MAX_SALT_LEN: usize = 4;

/// The length of the record sequence number.
pub const REC_SEQ_LEN: usize = 8;

enum_with_unknown! {
    /// Numbering of the TLS cipher suites as used by kernel TLS.
    pub doc enum CipherSuite(u16) {
        /// AES in Galois counter mode with a 128-bit key.
        AesGcm128 = 51,
        /// AES in Galois counter mode with a 256-bit key.
        AesGcm256 = 52,
        /// AES in counter with CBC-MAC mode with a 128-bit key.
        AesCcm128 = 53,
        /// ChaCha20 stream cipher with a Poly1305 authenticator.
        ChaCha20Poly1305 = 54,
        /// SM4 in Galois counter mode.
        Sm4Gcm = 55,
        /// SM4 in counter with CBC-MAC mode.
        Sm4Ccm = 56,
        /// ARIA in Galois counter mode with a 128-bit key.
        AriaGcm128 = 57,
        /// ARIA in Galois counter mode with a 256-bit key.
        AriaGcm256 = 58,
    }
}

/// The authenticated encryption primitive underlying a suite.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Algorithm {
    /// `gcm(aes)`
    AesGcm,
    /// `ccm(aes)`
    AesCcm,
    /// `rfc7539(chacha20,poly1305)`
    ChaCha20Poly1305,
    /// `gcm(sm4)`
    Sm4Gcm,
    /// `ccm(sm4)`
    Sm4Ccm,
    /// `gcm(aria)`
    AriaGcm,
}

/// Static description of a cipher suite.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CipherDesc {
    /// The suite described.
    pub suite: CipherSuite,
    /// Length of the explicit, per-record IV in the record preamble.
    pub iv: usize,
    /// Length of the key.
    pub key: usize,
    /// Length of the implicit salt prepended to the explicit IV to form the nonce.
    pub salt: usize,
    /// Length of the authentication tag.
    pub tag: usize,
    /// Length of the record sequence number.
    pub rec_seq: usize,
    /// The primitive.
    pub algorithm: Algorithm,
    /// Whether a network card may encrypt records of this suite.
    ///
    /// This is also the eligibility for the software fallback.
    pub offloadable: bool,
}

const fn desc(
    suite: CipherSuite,
    iv: usize,
    key: usize,
    salt: usize,
    algorithm: Algorithm,
    offloadable: bool,
) -> CipherDesc {
    CipherDesc {
        suite,
        iv,
        key,
        salt,
        tag: 16,
        rec_seq: REC_SEQ_LEN,
        algorithm,
        offloadable,
    }
}

static CIPHERS: [CipherDesc; 8] = [
    desc(CipherSuite::AesGcm128, 8, 16, 4, Algorithm::AesGcm, true),
    desc(CipherSuite::AesGcm256, 8, 32, 4, Algorithm::AesGcm, true),
    desc(CipherSuite::AesCcm128, 8, 16, 4, Algorithm::AesCcm, false),
    desc(CipherSuite::ChaCha20Poly1305, 12, 32, 0, Algorithm::ChaCha20Poly1305, false),
    desc(CipherSuite::Sm4Gcm, 8, 16, 4, Algorithm::Sm4Gcm, false),
    desc(CipherSuite::Sm4Ccm, 8, 16, 4, Algorithm::Sm4Ccm, false),
    desc(CipherSuite::AriaGcm128, 8, 16, 4, Algorithm::AriaGcm, false),
    desc(CipherSuite::AriaGcm256, 8, 32, 4, Algorithm::AriaGcm, false),
];

/// Look up the description of a cipher suite.
pub fn cipher_desc(suite: CipherSuite) -> Option<&'static CipherDesc> {
    CIPHERS.iter().find(|desc| desc.suite == suite)
}

impl CipherDesc {
    /// The length of the full nonce, salt followed by explicit IV.
    pub fn nonce_len(&self) -> usize {
        self.salt + self.iv
    }

    /// The length of the preamble of every record, header and explicit IV.
    pub fn preamble_len(&self) -> usize {
        crate::wire::tls::HEADER_LEN + self.iv
    }

    /// Bytes a record adds around its plaintext.
    pub fn overhead(&self) -> usize {
        self.preamble_len() + self.tag
    }
}

#[cfg(test)]
mod tests;
