use super::*;

fn config(offset: usize, len: usize) -> Config {
    Config {
        aes256: false,
        record_len: 300,
        records: 4,
        start: 1000,
        acked: 0,
        offset,
        len,
        ipv6: false,
        checksum_offload: false,
    }
}

#[test]
fn mid_record_range() {
    let report = replay(&config(450, 500)).expect("replays");
    assert_eq!(report.stream_len, 1200);
    assert_eq!(report.oldest_record_sn, FIRST_SN);
    assert_eq!(report.checksum, Checksum::Manual);
}

#[test]
fn acknowledged_prefix() {
    let mut config = config(450, 500);
    config.acked = 450;
    let report = replay(&config).expect("replays");
    // The first record is gone, the covering one is still tracked.
    assert_eq!(report.oldest_record_sn, FIRST_SN + 1);

    config.acked = 451;
    assert!(matches!(replay(&config), Err(Error::Config(_))));
}

#[test]
fn aes256_over_ipv6() {
    let mut config = config(0, 1200);
    config.aes256 = true;
    config.ipv6 = true;
    config.checksum_offload = true;
    let report = replay(&config).expect("replays");
    assert_eq!(report.cipher, Cipher::Aes256);
    assert_eq!(report.checksum, Checksum::Ignored);
}

#[test]
fn sequence_wraps() {
    let mut config = config(100, 900);
    config.start = u32::max_value() - 300;
    assert!(replay(&config).is_ok());
}

#[test]
fn rejects_bad_options() {
    assert!(matches!(replay(&config(1000, 201)), Err(Error::Config(_))));
    assert!(matches!(replay(&config(0, 0)), Err(Error::Config(_))));

    let mut short = config(0, 10);
    short.record_len = 29;
    assert!(matches!(replay(&short), Err(Error::Config(_))));
}
