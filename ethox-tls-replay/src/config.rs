use structopt::StructOpt;

/// The key size of the AES-GCM suite to replay with.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Cipher {
    Aes128,
    Aes256,
}

#[derive(Clone, Debug, StructOpt)]
pub struct Config {
    /// Use AES-GCM-256 instead of AES-GCM-128.
    #[structopt(long = "aes256")]
    pub aes256: bool,
    /// Total length of each record on the wire, header and tag included.
    #[structopt(short = "l", default_value = "1024")]
    pub record_len: usize,
    /// Number of records in the stream.
    #[structopt(short = "n", default_value = "8")]
    pub records: usize,
    /// Sequence number of the first offloaded byte.
    #[structopt(long = "start", default_value = "1000")]
    pub start: u32,
    /// Stream bytes acknowledged by the peer before the retransmission.
    #[structopt(long = "acked", default_value = "0")]
    pub acked: usize,
    /// Stream offset of the retransmitted range.
    pub offset: usize,
    /// Length of the retransmitted range.
    pub len: usize,
    /// Send the retransmission over IPv6.
    #[structopt(short = "6")]
    pub ipv6: bool,
    /// Let the egress device complete the checksum.
    #[structopt(long = "csum-offload")]
    pub checksum_offload: bool,
}

impl Config {
    pub fn from_args() -> Self {
        StructOpt::from_args()
    }

    pub fn cipher(&self) -> Cipher {
        if self.aes256 {
            Cipher::Aes256
        } else {
            Cipher::Aes128
        }
    }
}
