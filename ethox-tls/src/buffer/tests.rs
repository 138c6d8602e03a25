use super::*;

/// An IPv4/TCP frame with a four byte link layer header and four payload bytes.
fn frame() -> Vec<u8> {
    let mut frame = vec![0xee; 4];
    frame.extend_from_slice(&[
        0x45, 0x00, 0x00, 0x2c,
        0x00, 0x01, 0x40, 0x00,
        0x40, 0x06, 0x00, 0x00,
        0x0a, 0x00, 0x00, 0x01,
        0x0a, 0x00, 0x00, 0x02,
    ]);
    frame.extend_from_slice(&[
        0x30, 0x39, 0x01, 0xbb,
        0x00, 0x00, 0x03, 0xe8,
        0x00, 0x00, 0x00, 0x00,
        0x50, 0x18, 0x01, 0x00,
        0x00, 0x00, 0x00, 0x00,
    ]);
    frame.extend_from_slice(&[1, 2, 3, 4]);
    frame
}

#[test]
fn find_segment() {
    let buffer = Buffer::new(frame(), 4);
    let headers = buffer.headers().expect("valid frame");
    assert_eq!(headers.transport, 24);
    assert_eq!(headers.payload, 44);
    assert_eq!(headers.seq, TcpSeqNumber(1000));
    assert_eq!(headers.addresses, Addresses::Ipv4 {
        src: [10, 0, 0, 1],
        dst: [10, 0, 0, 2],
    });
}

#[test]
fn reject_other_protocol() {
    let mut data = frame();
    data[4 + 9] = 0x11;
    assert_eq!(Buffer::new(data, 4).headers(), Err(Error::Malformed));
    assert_eq!(Buffer::new(frame(), 60).headers(), Err(Error::Malformed));
}

#[test]
fn charge_and_release() {
    let account = SendAccount::new();
    let mut buffer = Buffer::new(frame(), 4);
    buffer.set_owner(Owner::charged(&account));
    assert_eq!(account.charged(), buffer.truesize());
    assert_eq!(account.buffers(), 1);

    drop(buffer);
    assert_eq!(account.charged(), 0);
    assert_eq!(account.buffers(), 0);
}

#[test]
fn transfer_adjusts_delta() {
    let account = SendAccount::new();
    let mut old = Buffer::new(frame(), 4);
    old.set_owner(Owner::charged(&account));

    let mut larger = Vec::with_capacity(4096);
    larger.extend_from_slice(&frame());
    let mut new = Buffer::new(larger, 4);
    new.take_owner(&mut old);
    assert!(old.owner().is_none());
    assert_eq!(account.charged(), new.truesize());

    drop(old);
    assert_eq!(account.charged(), new.truesize());
    assert_eq!(account.buffers(), 1);
    drop(new);
    assert_eq!(account.charged(), 0);
    assert_eq!(account.buffers(), 0);
}

#[test]
fn orphaned_transfer() {
    let account = SendAccount::new();
    let mut old = Buffer::new(frame(), 4);
    old.set_owner(Owner::orphaned(&account));
    assert_eq!(account.charged(), 0);

    let mut new = Buffer::new(frame(), 4);
    new.take_owner(&mut old);
    assert_eq!(new.owner().map(Owner::ownership), Some(Ownership::Orphaned));
    drop(old);
    drop(new);
    assert_eq!(account.charged(), 0);
}

#[test]
fn heap_allocates_zeroed() {
    let bytes = Heap.bytes(32).unwrap();
    assert_eq!(bytes, vec![0; 32]);
    assert!(Heap.fragment_list(17).unwrap().capacity() >= 17);
}
