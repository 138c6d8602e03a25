//! The frames passed down the transmit path.
//!
//! A [`Buffer`] holds one complete outgoing frame, possibly led by a link layer header, together
//! with the state the stack attaches to it: how the TCP checksum is to be completed and which
//! socket the memory is charged to. Dropping a buffer gives its charge back.
//!
//! [`Buffer`]: struct.Buffer.html
use core::mem;

use crate::wire::{Checksum, IpProtocol, IpRepr, Addresses, TcpSeqNumber, tcp_segment};
use crate::{Error, Result};

mod account;
mod alloc;

pub use self::account::{Owner, Ownership, SendAccount};
pub use self::alloc::{Allocator, Heap};

/// An outgoing frame.
#[derive(Debug)]
pub struct Buffer {
    data: Vec<u8>,
    network: usize,
    checksum: Checksum,
    owner: Option<Owner>,
}

/// Where the headers of a TCP frame end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Headers {
    /// The address pair of the IP header.
    pub addresses: Addresses,
    /// The offset of the TCP header.
    pub transport: usize,
    /// The offset of the TCP payload, after all headers.
    pub payload: usize,
    /// The sequence number of the first payload byte.
    pub seq: TcpSeqNumber,
}

impl Buffer {
    /// Wrap a frame whose IP header starts at `network`.
    ///
    /// The checksum is to be computed in software and nothing is charged.
    pub fn new(data: Vec<u8>, network: usize) -> Self {
        Buffer {
            data,
            network,
            checksum: Checksum::Manual,
            owner: None,
        }
    }

    /// Attach the buffer to an owner, charging its true size.
    ///
    /// A previous owner is given its charge back.
    pub fn set_owner(&mut self, owner: Owner) {
        self.orphan();
        if owner.ownership() == Ownership::Charged {
            owner.account().charge(self.truesize());
        }
        self.owner = Some(owner);
    }

    /// Detach the buffer from its owner.
    pub fn orphan(&mut self) {
        if let Some(owner) = self.owner.take() {
            if owner.ownership() == Ownership::Charged {
                owner.account().uncharge(self.truesize());
            }
        }
    }

    /// Move the owner of `from` to this buffer.
    ///
    /// The charge is adjusted by the difference in true size in one step, unless the buffer was
    /// orphaned. Afterwards `from` has no owner.
    pub fn take_owner(&mut self, from: &mut Buffer) {
        debug_assert!(self.owner.is_none());
        if let Some(owner) = from.owner.take() {
            if owner.ownership() == Ownership::Charged {
                owner.account().adjust(from.truesize(), self.truesize());
            }
            self.owner = Some(owner);
        }
    }

    /// The owner of the buffer, if any.
    pub fn owner(&self) -> Option<&Owner> {
        self.owner.as_ref()
    }

    /// The memory footprint charged for this buffer.
    pub fn truesize(&self) -> usize {
        self.data.capacity() + mem::size_of::<Buffer>()
    }

    /// The complete frame.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// The complete frame, mutably.
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// The length of the frame.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if the frame is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The offset of the IP header.
    pub fn network_offset(&self) -> usize {
        self.network
    }

    /// How the TCP checksum of the frame is completed.
    pub fn checksum(&self) -> Checksum {
        self.checksum
    }

    /// Set how the TCP checksum is completed.
    ///
    /// `Checksum::Ignored` means the checksum field holds the pseudo header sum and the device
    /// adds the segment.
    pub fn set_checksum(&mut self, checksum: Checksum) {
        self.checksum = checksum;
    }

    /// Find the TCP segment in the frame.
    pub fn headers(&self) -> Result<Headers> {
        let ip_bytes = self.data.get(self.network..).ok_or(Error::Malformed)?;
        let ip = IpRepr::parse(ip_bytes)?;
        if ip.protocol != IpProtocol::Tcp {
            return Err(Error::Malformed);
        }

        let transport = self.network + ip.header_len;
        let segment = tcp_segment::new_checked(&self.data[transport..])?;
        Ok(Headers {
            addresses: ip.addresses,
            transport,
            payload: transport + segment.header_len(),
            seq: segment.seq_number(),
        })
    }
}

impl Drop for Buffer {
    fn drop(&mut self) {
        self.orphan()
    }
}

#[cfg(test)]
mod tests;
