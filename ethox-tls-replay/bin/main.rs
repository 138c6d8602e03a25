//! Replays a retransmission through the TLS software fallback.
//!
//! Frames a stream of records, seals it as an offloading card would, and retransmits one byte
//! range of it over a device without the connection's keys. The replacement must match the
//! card's ciphertext exactly. Call example:
//!
//! * `ethox-tls-replay -l 1400 -n 16 --aes256 2000 5000`
use ethox_tls_replay::config;

fn main() {
    let config = config::Config::from_args();

    println!("[+] Sealing {} records of {} B", config.records, config.record_len);

    let report = match ethox_tls_replay::replay(&config) {
        Ok(report) => report,
        Err(err) => {
            eprintln!("[-] {}", err);
            std::process::exit(1);
        },
    };

    println!("[+] Done\n");
    println!("{}", report);
}
