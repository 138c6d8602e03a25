use crate::ledger::Fragment;
use crate::{Error, Result};

/// The memory source of the transmit path.
///
/// Allocation must not block. Any failure is reported as `Error::Exhausted` and the caller gives up
/// on the buffer without retrying.
pub trait Allocator: Send + Sync {
    /// Allocate `len` zeroed bytes.
    fn bytes(&self, len: usize) -> Result<Vec<u8>>;

    /// Allocate an empty list with room for `capacity` fragments.
    fn fragment_list(&self, capacity: usize) -> Result<Vec<Fragment>>;
}

/// The global heap, without aborting on exhaustion.
#[derive(Clone, Copy, Debug, Default)]
pub struct Heap;

impl Allocator for Heap {
    fn bytes(&self, len: usize) -> Result<Vec<u8>> {
        let mut bytes = Vec::new();
        bytes.try_reserve_exact(len).map_err(|_| Error::Exhausted)?;
        bytes.resize(len, 0);
        Ok(bytes)
    }

    fn fragment_list(&self, capacity: usize) -> Result<Vec<Fragment>> {
        let mut list = Vec::new();
        list.try_reserve_exact(capacity).map_err(|_| Error::Exhausted)?;
        Ok(list)
    }
}
