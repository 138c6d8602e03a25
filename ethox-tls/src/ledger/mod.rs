//! The records handed to the card for encryption, and not yet acknowledged.
//!
//! The ledger of a connection is filled by the offload bookkeeping as records are sent and trimmed
//! as the peer acknowledges them. The fallback only ever reads it: it asks which record covers a
//! retransmitted sequence number and retains the plaintext in front of it.
//!
//! Positions in the ledger are 64-bit stream offsets whose low 32 bits equal the TCP sequence
//! number. A TCP sequence number is widened to the candidate closest to the oldest tracked record.
//!
//! All state is behind a spin lock that is held for the lookup and the retention of fragments, never
//! across encryption.
use std::collections::VecDeque;

use spin::Mutex;

use crate::wire::TcpSeqNumber;
use crate::{Error, Result};

mod page;
mod resolve;

pub use self::page::{Fragment, Page};
pub use self::resolve::{Resolution, Resync};

/// A record as tracked for retransmission.
#[derive(Debug)]
pub struct Record {
    start: u64,
    len: u64,
    frags: Vec<Fragment>,
}

/// A copy of the position of a tracked record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Located {
    /// The stream offset of the first byte.
    pub start: u64,
    /// The stream offset after the last byte.
    pub end: u64,
    /// The number of the record, as bound into its nonce and tag.
    pub record_sn: u64,
    /// Whether this is the zero-length marker of the offload start.
    pub is_start_marker: bool,
}

/// The tracked records of one connection.
#[derive(Debug)]
pub struct Ledger {
    inner: Mutex<Inner>,
    max_record_frags: usize,
}

#[derive(Debug)]
struct Inner {
    records: VecDeque<Record>,
    /// The stream offset after the last record ever tracked.
    end: u64,
    /// The number of the oldest record still tracked.
    unacked_record_sn: u64,
    /// The number of the record last found for a retransmission.
    hint_record_sn: Option<u64>,
}

impl Record {
    fn start_marker(start: u64) -> Self {
        Record {
            start,
            len: 0,
            frags: Vec::new(),
        }
    }

    /// The stream offset of the first byte.
    pub fn start(&self) -> u64 {
        self.start
    }

    /// The stream offset after the last byte.
    pub fn end(&self) -> u64 {
        self.start + self.len
    }

    /// The fragments holding the record, in stream order.
    pub fn fragments(&self) -> &[Fragment] {
        &self.frags
    }

    /// Whether nothing before this point is tracked any more.
    pub fn is_start_marker(&self) -> bool {
        self.len == 0
    }

    fn release(self) {
        self.frags.into_iter().for_each(Fragment::release)
    }
}

impl Ledger {
    /// Start tracking at the offload start.
    ///
    /// `start` is the sequence number of the first offloaded byte and `record_sn` the number of the
    /// first offloaded record. A start marker at `start` stands for everything sent earlier.
    pub fn new(start: TcpSeqNumber, record_sn: u64, max_record_frags: usize) -> Self {
        let start = u64::from(start.0 as u32);
        let mut records = VecDeque::new();
        records.push_back(Record::start_marker(start));

        Ledger {
            inner: Mutex::new(Inner {
                records,
                end: start,
                unacked_record_sn: record_sn.wrapping_sub(1),
                hint_record_sn: None,
            }),
            max_record_frags,
        }
    }

    /// Track the next record, directly following the last one.
    ///
    /// The ledger takes over the page references of `frags`. Returns the stream offset of the new
    /// record.
    pub fn push_record(&self, frags: Vec<Fragment>) -> Result<u64> {
        let len = frags.iter().map(|frag| frag.len() as u64).sum::<u64>();
        if len == 0 || frags.len() > self.max_record_frags {
            frags.into_iter().for_each(Fragment::release);
            return Err(Error::Illegal);
        }

        let mut inner = self.inner.lock();
        let start = inner.end;
        inner.records.push_back(Record { start, len, frags });
        inner.end = start + len;
        net_trace!("tls ledger: tracking record at {} of {} bytes", start, len);
        Ok(start)
    }

    /// Forget all records fully acknowledged by `acked`.
    ///
    /// Returns the number of records removed. Their fragments are released.
    pub fn acknowledge(&self, acked: TcpSeqNumber) -> usize {
        let mut inner = self.inner.lock();
        let acked = inner.widen(acked);

        let mut removed = 0;
        while let Some(first) = inner.records.front() {
            if acked < first.end() as i64 {
                break;
            }
            if let Some(record) = inner.records.pop_front() {
                record.release();
            }
            removed += 1;
        }

        inner.unacked_record_sn = inner.unacked_record_sn.wrapping_add(removed as u64);
        if let Some(hint) = inner.hint_record_sn {
            if inner.index_of(hint).is_none() {
                inner.hint_record_sn = None;
            }
        }

        removed
    }

    /// Find the record covering `seq`.
    ///
    /// This is the first record that ends after `seq`. A sequence number before the oldest record
    /// is only covered if that is the start marker.
    pub fn locate(&self, seq: TcpSeqNumber) -> Option<Located> {
        let mut inner = self.inner.lock();
        let seq = inner.widen(seq);
        let (index, record_sn) = inner.locate(seq)?;
        let record = &inner.records[index];
        Some(Located {
            start: record.start(),
            end: record.end(),
            record_sn,
            is_start_marker: record.is_start_marker(),
        })
    }

    /// The number of tracked records, including a start marker.
    pub fn len(&self) -> usize {
        self.inner.lock().records.len()
    }

    /// Check if no record is tracked at all.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().records.is_empty()
    }

    /// The number of the oldest tracked record.
    pub fn unacked_record_sn(&self) -> u64 {
        self.inner.lock().unacked_record_sn
    }

    /// The most fragments a record may have.
    pub fn max_record_frags(&self) -> usize {
        self.max_record_frags
    }
}

impl Inner {
    /// Widen a TCP sequence number to a stream offset.
    ///
    /// Picks the offset with matching low bits closest to the start of the oldest record, or the
    /// end of the stream when nothing is tracked. The result is negative for sequence numbers
    /// before the very first byte of the stream.
    fn widen(&self, seq: TcpSeqNumber) -> i64 {
        let base = self.records.front().map_or(self.end, Record::start);
        let delta = seq.distance(TcpSeqNumber(base as u32 as i32));
        base as i64 + i64::from(delta)
    }

    fn index_of(&self, record_sn: u64) -> Option<usize> {
        let index = record_sn.wrapping_sub(self.unacked_record_sn);
        if index < self.records.len() as u64 {
            Some(index as usize)
        } else {
            None
        }
    }

    fn locate(&mut self, seq: i64) -> Option<(usize, u64)> {
        let first = self.records.front()?;
        let last = self.records.back()?;

        if !first.is_start_marker() && (seq < first.start() as i64 || seq >= last.end() as i64) {
            return None;
        }

        let hinted = self.hint_record_sn
            .and_then(|sn| self.index_of(sn))
            .filter(|&index| seq >= self.records[index].start() as i64);
        let mut index = hinted.unwrap_or(0);

        while let Some(record) = self.records.get(index) {
            if seq < record.end() as i64 {
                let record_sn = self.unacked_record_sn.wrapping_add(index as u64);
                let later = self.hint_record_sn
                    .and_then(|sn| self.index_of(sn))
                    .map_or(true, |hint| index > hint);
                if later {
                    self.hint_record_sn = Some(record_sn);
                }
                return Some((index, record_sn));
            }
            index += 1;
        }

        None
    }
}
