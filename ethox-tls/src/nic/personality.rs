use crate::wire::Checksum;

/// A general description of a device.
///
/// The interaction with these happens purely via methods. This leaves the implementation open to
/// additions in the future, primarily concerning further offloads of significant network cards.
#[derive(Clone, Debug)]
pub struct Personality {
    capabilities: Capabilities,
}

/// Operations supported natively by the card.
///
/// The usage for a device is simply to instantiate a baseline with no support for any upper layer
/// and then adjust those for which support can be provided.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Capabilities {
    tcp: Tcp,
}

/// The extent of TCP support.
///
/// Only the transmit direction matters to software encryption. Receive offloads are of no concern
/// here.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Tcp {
    send: Checksum,
}

impl Personality {
    /// A personality with no extras.
    ///
    /// Indicates no support for any upper layer protocols. Populate this with your own details as
    /// you see fit.
    pub fn baseline() -> Self {
        Personality {
            capabilities: Capabilities::no_support(),
        }
    }

    /// Check the capabilities of the interface.
    pub fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    /// Mutably get the capabilities which allows for modifications.
    pub fn capabilities_mut(&mut self) -> &mut Capabilities {
        &mut self.capabilities
    }
}

impl Capabilities {
    /// Instantiates capabilities that are completely oblivious to the upper protocol layers.
    pub fn no_support() -> Self {
        Capabilities {
            tcp: Tcp::no_support(),
        }
    }

    /// Check TCP support descriptor.
    pub fn tcp(&self) -> &Tcp {
        &self.tcp
    }

    /// Mutably get TCP support descriptor.
    pub fn tcp_mut(&mut self) -> &mut Tcp {
        &mut self.tcp
    }
}

impl Tcp {
    /// Create a TCP descriptor without any supported feature.
    ///
    /// This means that the stack needs to perform all checksums manually.
    pub fn no_support() -> Self {
        Tcp {
            send: Checksum::Manual,
        }
    }

    /// Expect the card to complete checksums from a pseudo header seed.
    pub fn offloaded() -> Self {
        Tcp {
            send: Checksum::Ignored,
        }
    }

    /// Get the transmit checksum descriptor.
    pub fn tx_checksum(&self) -> Checksum {
        self.send
    }

    /// Mutably get the transmit checksum descriptor.
    pub fn tx_checksum_mut(&mut self) -> &mut Checksum {
        &mut self.send
    }
}
