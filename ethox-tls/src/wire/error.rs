use core::fmt;

/// The error type for parsing headers of an outgoing frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A header could not be parsed because the buffer was shorter than assumed.
    ///
    /// The buffer may be shorter than the minimum length of the header, or a length field may
    /// point beyond the end of the data.
    Truncated,

    /// A header was recognized but was self-contradictory.
    ///
    /// Examples: an IPv4 header length smaller than 20 bytes; a TLS record whose declared length
    /// can not even hold the explicit nonce and authentication tag.
    Malformed,

    /// A header could not be recognized.
    ///
    /// E.g. an IP version other than 4 or 6, or a transport protocol other than TCP.
    Unrecognized,

    /// Parsing depends on a feature that is not implemented.
    ///
    /// An example is an IPv6 header followed by extension headers before the TCP header.
    Unsupported,
}

/// The result type for header parsing.
pub type Result<T> = core::result::Result<T, Error>;

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Truncated    => write!(f, "truncated header"),
            Error::Malformed    => write!(f, "malformed header"),
            Error::Unrecognized => write!(f, "unrecognized header"),
            Error::Unsupported  => write!(f, "unsupported header option"),
        }
    }
}

impl std::error::Error for Error {}
