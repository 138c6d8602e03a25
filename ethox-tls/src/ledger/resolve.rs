use super::{Fragment, Ledger};
use crate::buffer::Allocator;
use crate::wire::TcpSeqNumber;
use crate::{Error, Result};

/// The plaintext of a record in front of a retransmitted range.
///
/// The fragments are retained from the ledger and must be given back with [`release`] however the
/// reconstruction ends. The list is reserved up front so that collecting never allocates while
/// the ledger is locked.
///
/// [`release`]: #method.release
#[derive(Debug)]
pub struct Resync {
    frags: Vec<Fragment>,
    capacity: usize,
}

/// How a retransmitted sequence number relates to the tracked records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// A record covers the sequence number.
    Covered {
        /// The number of the covering record.
        record_sn: u64,
        /// The bytes of the record in front of the sequence number, now in the resync list.
        sync_size: usize,
    },

    /// The sequence number lies before the offload start.
    Stale {
        /// The distance to the offload start.
        behind: u64,
    },
}

impl Resync {
    /// Reserve room for the fragments of one record.
    pub fn with_capacity(alloc: &dyn Allocator, capacity: usize) -> Result<Self> {
        Ok(Resync {
            frags: alloc.fragment_list(capacity)?,
            capacity,
        })
    }

    /// The total number of resync bytes.
    pub fn len(&self) -> usize {
        self.frags.iter().map(Fragment::len).sum()
    }

    /// Check if there are no resync bytes.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[cfg(test)]
    pub(crate) fn fragments(&self) -> &[Fragment] {
        &self.frags
    }

    /// Copy the resync bytes into `out`, which must be exactly as long.
    pub fn copy_to(&self, out: &mut [u8]) {
        let mut out = out;
        for frag in &self.frags {
            let (head, tail) = out.split_at_mut(frag.len());
            head.copy_from_slice(frag.bytes());
            out = tail;
        }
    }

    /// Give back every retained fragment.
    pub fn release(&mut self) {
        self.frags.drain(..).for_each(Fragment::release)
    }

    fn push(&mut self, frag: Fragment) -> Result<()> {
        if self.frags.len() >= self.capacity {
            frag.release();
            return Err(Error::Exhausted);
        }

        self.frags.push(frag);
        Ok(())
    }
}

impl Ledger {
    /// Resolve the record covering `seq` and retain its bytes in front of `seq`.
    ///
    /// The lock is held for the lookup and the retention only. Fails with `Unresolved` if no record
    /// covers `seq`, which is an expected race with acknowledgments.
    pub fn resolve(&self, seq: TcpSeqNumber, resync: &mut Resync) -> Result<Resolution> {
        let mut inner = self.inner.lock();
        let wide = inner.widen(seq);
        let (index, record_sn) = inner.locate(wide).ok_or(Error::Unresolved)?;
        let record = &inner.records[index];

        let sync_size = wide - record.start() as i64;
        if sync_size < 0 {
            if record.is_start_marker() {
                return Ok(Resolution::Stale { behind: sync_size.unsigned_abs() });
            }
            return Err(Error::Unresolved);
        }

        let sync_size = sync_size as usize;
        let mut remaining = sync_size;
        for frag in record.fragments() {
            if remaining == 0 {
                break;
            }
            let retained = frag.retain_prefix(remaining);
            remaining -= retained.len();
            resync.push(retained)?;
        }

        if remaining > 0 {
            return Err(Error::Unresolved);
        }

        Ok(Resolution::Covered { record_sn, sync_size })
    }
}
