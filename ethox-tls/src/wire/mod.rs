/*! Low-level access to the headers of an outgoing frame.

The fallback never builds a frame from scratch: it finds the transport segment inside a frame
handed to it by the transmit path, reads the TCP sequence number, walks the TLS records in the
payload and finally refreshes the TCP checksum. The types here follow one pattern.

 * Lowercase, dynamically sized wrappers around `[u8]` such as [`ipv4`], [`tcp`] or
   [`tls_record`] provide field accessors. Their `new_checked` constructor validates that no
   accessor will panic, `new_unchecked` skips this check.
 * Small `Repr`-like summaries such as [`ip::Repr`] or [`tls::Layout`] are parsed from those
   wrappers and carry only what later stages need.

[`ipv4`]: ip/struct.ipv4.html
[`tcp`]: tcp/struct.tcp.html
[`tls_record`]: tls/struct.tls_record.html
[`ip::Repr`]: ip/struct.Repr.html
[`tls::Layout`]: tls/struct.Layout.html
*/
// Copyright (C) 2016 whitequark@whitequark.org
// Copyright (C) 2019 Andreas Molzer <andreas.molzer@tum.de>
//
// The ip, tcp and checksum parts originally distributed under 0-clause BSD as part of `smoltcp`.

mod field {
    pub(crate) type Field = ::core::ops::Range<usize>;
    pub(crate) type Rest  = ::core::ops::RangeFrom<usize>;
}

mod error;
pub mod checksum;
pub mod ip;
pub mod tcp;
pub mod tls;

/// Describes how to handle checksums.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Checksum {
    /// Checksum must be computed manually.
    Manual,

    /// The checksum field is filled by the NIC.
    Ignored,
}

pub use self::error::{Error, Result};
pub use self::ip::{Addresses, Protocol as IpProtocol, Repr as IpRepr};
pub use self::tcp::{tcp as tcp_segment, SeqNumber as TcpSeqNumber};
pub use self::tls::{tls_record, Aad as TlsAad, ContentType as TlsContentType, ProtocolVersion as TlsVersion};
