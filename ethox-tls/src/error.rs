use core::fmt;

use crate::wire;

/// The error type of the fallback.
///
/// Every error is terminal for the one buffer it occurred with. The caller must not retry with the
/// same buffer, it has already been released.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// An allocation for the replacement or scratch memory failed.
    Exhausted,

    /// No tracked record covers the sequence number of the retransmission.
    ///
    /// This is an expected race with the acknowledgment path, not a bug.
    Unresolved,

    /// The frame or one of the records it covers could not be parsed.
    Malformed,

    /// The authenticated encryption primitive failed.
    Crypto,

    /// The cipher suite or frame layout is not supported by the fallback.
    Unsupported,

    /// The key material does not fit the cipher suite.
    Illegal,
}

/// The result type of the fallback.
pub type Result<T> = core::result::Result<T, Error>;

impl From<wire::Error> for Error {
    fn from(err: wire::Error) -> Self {
        match err {
            wire::Error::Unsupported => Error::Unsupported,
            wire::Error::Truncated
            | wire::Error::Malformed
            | wire::Error::Unrecognized => Error::Malformed,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Exhausted   => write!(f, "out of memory for the replacement buffer"),
            Error::Unresolved  => write!(f, "no tracked record covers the retransmission"),
            Error::Malformed   => write!(f, "malformed frame or record"),
            Error::Crypto      => write!(f, "authenticated encryption failed"),
            Error::Unsupported => write!(f, "unsupported cipher or frame"),
            Error::Illegal     => write!(f, "key material does not match the cipher"),
        }
    }
}

impl std::error::Error for Error {}
