//! RFC 1071 internet checksums.
use byteorder::{ByteOrder, NetworkEndian};

use super::ip::{Addresses, Protocol};

fn propagate_carries(word: u32) -> u16 {
    let sum = (word >> 16) + (word & 0xffff);
    ((sum >> 16) as u16) + (sum as u16)
}

/// Compute an RFC 1071 compliant checksum (without the final complement).
pub fn data(mut data: &[u8]) -> u16 {
    let mut accum = 0;

    // For each 32-byte chunk...
    const CHUNK_SIZE: usize = 32;
    while data.len() >= CHUNK_SIZE {
        let mut d = &data[..CHUNK_SIZE];
        // ... take by 2 bytes and sum them.
        while d.len() >= 2 {
            accum += NetworkEndian::read_u16(d) as u32;
            d = &d[2..];
        }

        data = &data[CHUNK_SIZE..];
    }

    while data.len() >= 2 {
        accum += NetworkEndian::read_u16(data) as u32;
        data = &data[2..];
    }

    // Add the last remaining odd byte, if any.
    if let Some(&value) = data.first() {
        accum += (value as u32) << 8;
    }

    propagate_carries(accum)
}

/// Combine several RFC 1071 compliant checksums.
pub fn combine(checksums: &[u16]) -> u16 {
    let mut accum: u32 = 0;
    for &word in checksums {
        accum += word as u32;
    }
    propagate_carries(accum)
}

/// Compute the pseudo header checksum of a transport segment.
///
/// The family of the pseudo header follows the addresses, `length` is the length of the transport
/// header and payload.
pub fn pseudo_header(addresses: &Addresses, protocol: Protocol, length: u32) -> u16 {
    match addresses {
        Addresses::Ipv4 { src, dst } => {
            let mut proto_len = [0u8; 4];
            proto_len[1] = protocol.into();
            NetworkEndian::write_u16(&mut proto_len[2..4], length as u16);

            combine(&[
                data(&src[..]),
                data(&dst[..]),
                data(&proto_len[..]),
            ])
        },
        Addresses::Ipv6 { src, dst } => {
            let mut proto_len = [0u8; 8];
            proto_len[7] = protocol.into();
            NetworkEndian::write_u32(&mut proto_len[0..4], length);

            combine(&[
                data(&src[..]),
                data(&dst[..]),
                data(&proto_len[..]),
            ])
        },
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn odd_trailing_byte() {
        assert_eq!(data(&[0x12, 0x34, 0x56]), 0x1234 + 0x5600);
    }

    #[test]
    fn carries_wrap_around() {
        assert_eq!(data(&[0xff, 0xff, 0x00, 0x02]), 0x0002);
        assert_eq!(combine(&[0xffff, 0x0001]), 0x0001);
    }

    #[test]
    fn ipv4_pseudo_header() {
        let addresses = Addresses::Ipv4 {
            src: [192, 168, 0, 1],
            dst: [192, 168, 0, 2],
        };
        // 0xc0a8 + 0x0001 + 0xc0a8 + 0x0002 + 0x0006 + 0x0014
        let expected = propagate_carries(0xc0a8 + 0x0001 + 0xc0a8 + 0x0002 + 0x0006 + 0x0014);
        assert_eq!(pseudo_header(&addresses, Protocol::Tcp, 20), expected);
    }
}
