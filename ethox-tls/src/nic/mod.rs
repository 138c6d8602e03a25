//! Description of the devices a segment may egress through.
//!
//! The fallback does not drive devices itself. It only needs to decide whether the device chosen
//! by routing is the one the connection's encryption was programmed into, and what checksum work
//! that device will do for it.
mod personality;

pub use self::personality::{Capabilities, Personality, Tcp};

/// Identifies a network device, e.g. by its interface index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeviceId(pub u32);

/// The device a segment is about to be transmitted on.
#[derive(Clone, Debug)]
pub struct Egress {
    device: DeviceId,
    kind: Kind,
    personality: Personality,
}

/// Whether a device puts frames on the wire itself.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Kind {
    /// A device with its own link.
    Physical,

    /// A logical aggregation of other devices, such as a bond master.
    ///
    /// Frames passing an aggregate are dispatched again to one of its members, where the
    /// decision is made anew.
    Aggregate,
}

impl Egress {
    /// A physical device with the given features.
    pub fn physical(device: DeviceId, personality: Personality) -> Self {
        Egress {
            device,
            kind: Kind::Physical,
            personality,
        }
    }

    /// An aggregating device.
    pub fn aggregate(device: DeviceId) -> Self {
        Egress {
            device,
            kind: Kind::Aggregate,
            personality: Personality::baseline(),
        }
    }

    /// The identity of the device.
    pub fn device(&self) -> DeviceId {
        self.device
    }

    /// Check if the device aggregates others.
    pub fn is_aggregate(&self) -> bool {
        self.kind == Kind::Aggregate
    }

    /// Check the capabilities of the device.
    pub fn capabilities(&self) -> &Capabilities {
        self.personality.capabilities()
    }
}
