//! Per connection limits of the fallback.
use std::time::Duration;

use crate::wire::tls::MAX_PLAINTEXT_LEN;

/// Tunables of the fallback for one connection.
///
/// All limits are fixed when the connection is created. The transmit path itself never reads any
/// global state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    /// The most fragments a single tracked record may consist of.
    ///
    /// This bounds the resync list reserved before the ledger is locked.
    pub max_record_frags: usize,

    /// The largest declared length of a record, counting IV, ciphertext and tag.
    pub max_record_len: usize,

    /// The interval of the diagnostics rate limit.
    pub log_interval: Duration,

    /// The diagnostics emitted at most in each interval.
    pub log_burst: u32,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            max_record_frags: 17,
            max_record_len: MAX_PLAINTEXT_LEN + 2048,
            log_interval: Duration::from_secs(5),
            log_burst: 10,
        }
    }
}
