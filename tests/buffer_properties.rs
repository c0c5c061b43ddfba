use bsontree::buffer::DataBuffer;

#[test]
fn ten_thousand_pushes_from_capacity_one() {
    let mut buf = DataBuffer::with_capacity(1);
    let mut growths = 0;
    let mut last_cap = buf.capacity();
    for i in 0..10_000u32 {
        buf.push(i as u8).unwrap();
        if buf.capacity() != last_cap {
            assert_eq!(buf.capacity(), last_cap * 2);
            last_cap = buf.capacity();
            growths += 1;
        }
    }
    assert_eq!(buf.len(), 10_000);
    assert_eq!(buf.capacity(), 16_384);
    assert_eq!(growths, 14);
    assert!(buf.as_slice().iter().enumerate().all(|(i, &b)| b == i as u8));
}

#[test]
fn push_on_zero_capacity_allocates_one() {
    let mut buf = DataBuffer::with_capacity(0);
    buf.push(7).unwrap();
    assert_eq!(buf.capacity(), 1);
    assert_eq!(buf.as_slice(), &[7]);
}

#[test]
fn bulk_append_grows_to_exact_fit() {
    let mut buf = DataBuffer::with_capacity(4);
    buf.append(b"abc").unwrap();
    assert_eq!(buf.capacity(), 4);

    buf.append(b"defghij").unwrap();
    assert_eq!(buf.capacity(), 10);
    assert_eq!(buf.as_slice(), b"abcdefghij");

    // Fits without growth.
    buf.cut(5);
    buf.append(b"XY").unwrap();
    assert_eq!(buf.capacity(), 10);
    assert_eq!(buf.as_slice(), b"abcdeXY");
}

#[test]
fn chained_appends_and_search() {
    let mut other = DataBuffer::with_capacity(8);
    other.assign_str("tail").unwrap();

    let mut buf = DataBuffer::with_capacity(2);
    buf.append_str("key")
        .unwrap()
        .push(0)
        .unwrap()
        .append_buffer(&other)
        .unwrap();
    assert_eq!(buf.as_slice(), b"key\0tail");
    assert_eq!(buf.find(0, 0), Some(3));
    assert_eq!(buf.find(0, 4), None);
    assert_eq!(buf.data(4), b"tail");
}

#[test]
fn set_size_respects_capacity() {
    let mut buf = DataBuffer::with_capacity(16);
    assert_eq!(buf.set_size(16), Some(16));
    assert_eq!(buf.len(), 16);
    assert_eq!(buf.set_size(17), None);
    assert_eq!(buf.len(), 16);
    buf.clear();
    assert!(buf.is_empty());
    assert_eq!(buf.capacity(), 16);
}

#[test]
fn reserve_never_shrinks() {
    let mut buf = DataBuffer::with_capacity(32);
    buf.reserve(8).unwrap();
    assert_eq!(buf.capacity(), 32);
    buf.reserve(100).unwrap();
    assert_eq!(buf.capacity(), 100);
    assert!(buf.is_empty());
}

#[test]
fn buffers_move_between_owners() {
    let mut buf = DataBuffer::with_capacity(4);
    buf.append(b"owned").unwrap();
    let moved = buf;
    let holder = vec![moved];
    assert_eq!(holder[0].as_slice(), b"owned");
}
