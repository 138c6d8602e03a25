use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// The transmit memory charged to one socket.
#[derive(Debug, Default)]
pub struct SendAccount {
    charged: AtomicUsize,
    buffers: AtomicUsize,
}

/// Who a buffer is accounted to.
#[derive(Debug, Clone)]
pub struct Owner {
    account: Arc<SendAccount>,
    ownership: Ownership,
}

/// How a buffer is accounted to its owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Ownership {
    /// The buffer's true size is charged to the account.
    Charged,

    /// The buffer was orphaned by the stack, it only keeps the socket alive.
    ///
    /// Nothing is charged and transfers don't adjust the account.
    Orphaned,
}

impl SendAccount {
    /// An account with nothing charged.
    pub fn new() -> Arc<Self> {
        Arc::new(SendAccount::default())
    }

    /// The bytes currently charged.
    pub fn charged(&self) -> usize {
        self.charged.load(Ordering::Acquire)
    }

    /// The number of charged buffers alive.
    pub fn buffers(&self) -> usize {
        self.buffers.load(Ordering::Acquire)
    }

    pub(crate) fn charge(&self, bytes: usize) {
        self.charged.fetch_add(bytes, Ordering::AcqRel);
        self.buffers.fetch_add(1, Ordering::AcqRel);
    }

    pub(crate) fn uncharge(&self, bytes: usize) {
        self.charged.fetch_sub(bytes, Ordering::AcqRel);
        self.buffers.fetch_sub(1, Ordering::AcqRel);
    }

    /// Move the charge of one buffer to another of a different size.
    pub(crate) fn adjust(&self, from: usize, to: usize) {
        if to > from {
            self.charged.fetch_add(to - from, Ordering::AcqRel);
        } else if from > to {
            self.charged.fetch_sub(from - to, Ordering::AcqRel);
        }
    }
}

impl Owner {
    /// Charge buffers to `account`.
    pub fn charged(account: &Arc<SendAccount>) -> Self {
        Owner {
            account: Arc::clone(account),
            ownership: Ownership::Charged,
        }
    }

    /// Attach buffers to `account` without charging them.
    pub fn orphaned(account: &Arc<SendAccount>) -> Self {
        Owner {
            account: Arc::clone(account),
            ownership: Ownership::Orphaned,
        }
    }

    /// The account of the owner.
    pub fn account(&self) -> &Arc<SendAccount> {
        &self.account
    }

    /// How buffers are accounted.
    pub fn ownership(&self) -> Ownership {
        self.ownership
    }
}
