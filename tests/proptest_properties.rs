use bsontree::bson::{self, Cursor, DecodeOptions, RootContext};
use bsontree::buffer::DataBuffer;
use bsontree::value::{Map, Value};
use proptest::prelude::*;

fn map_opts() -> DecodeOptions {
    DecodeOptions {
        root: RootContext::Map,
        ..Default::default()
    }
}

fn scalar() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Undef),
        any::<i64>().prop_map(Value::Int),
        (-1.0e12f64..1.0e12).prop_map(Value::Float),
        proptest::collection::vec(any::<u8>(), 0..32).prop_map(Value::Bytes),
    ]
}

fn key() -> impl Strategy<Value = String> {
    "[a-z0-9_]{1,8}"
}

fn tree() -> impl Strategy<Value = Value> {
    scalar().prop_recursive(4, 64, 6, |inner| {
        prop_oneof![
            proptest::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
            proptest::collection::vec((key(), inner), 0..6)
                .prop_map(|entries| Value::Map(entries.into_iter().collect::<Map>())),
        ]
    })
}

fn map_root() -> impl Strategy<Value = Value> {
    proptest::collection::vec((key(), tree()), 0..8)
        .prop_map(|entries| Value::Map(entries.into_iter().collect::<Map>()))
}

proptest! {
    #[test]
    fn prop_encode_decode_roundtrip(root in map_root()) {
        let bytes = bson::encode(&root).unwrap();
        let opts = DecodeOptions { verify_length: true, ..map_opts() };
        let mut decoded = Value::Undef;
        let stats = bson::decode_with_options(&bytes, &mut decoded, &opts).unwrap();
        prop_assert_eq!(stats.bytes_consumed, bytes.len());
        // An empty root map decodes to an untouched target.
        if root.is_empty() {
            prop_assert!(decoded.is_undef());
        } else {
            prop_assert_eq!(decoded, root);
        }
    }

    #[test]
    fn prop_decode_never_panics(data in proptest::collection::vec(any::<u8>(), 0..512)) {
        let _ = bson::decode_to_value(&data, &DecodeOptions::default());
        let _ = bson::decode_to_value(&data, &map_opts());
    }

    #[test]
    fn prop_truncated_encoding_fails(root in map_root(), cut in 1usize..64) {
        let bytes = bson::encode(&root).unwrap();
        let keep = bytes.len().saturating_sub(cut);
        prop_assert!(bson::decode_to_value(&bytes[..keep], &map_opts()).is_err());
    }

    #[test]
    fn prop_cursor_remaining_is_monotonic(
        data in proptest::collection::vec(any::<u8>(), 0..256),
        ops in proptest::collection::vec(0u8..6, 0..64)
    ) {
        let mut cursor = Cursor::new(&data);
        let mut last = cursor.remaining();
        for op in ops {
            let _ = match op {
                0 => cursor.read_u8().map(drop),
                1 => cursor.read_u32().map(drop),
                2 => cursor.read_u64().map(drop),
                3 => cursor.read_f64().map(drop),
                4 => cursor.read_cstring().map(drop),
                _ => cursor.read_string().map(drop),
            };
            prop_assert!(cursor.remaining() <= last);
            prop_assert_eq!(cursor.position() + cursor.remaining(), data.len());
            last = cursor.remaining();
        }
    }

    #[test]
    fn prop_buffer_append_then_clear(
        chunks in proptest::collection::vec(proptest::collection::vec(any::<u8>(), 0..64), 0..16),
        initial in 0usize..32
    ) {
        let mut buf = DataBuffer::with_capacity(initial);
        let mut expected = Vec::new();
        for chunk in &chunks {
            buf.append(chunk).unwrap();
            expected.extend_from_slice(chunk);
            prop_assert!(buf.capacity() >= buf.len());
        }
        prop_assert_eq!(buf.as_slice(), expected.as_slice());
        prop_assert_eq!(buf.capacity(), initial.max(expected.len()));

        let cap = buf.capacity();
        buf.clear();
        prop_assert!(buf.is_empty());
        prop_assert_eq!(buf.capacity(), cap);
    }

    #[test]
    fn prop_push_matches_vec(bytes in proptest::collection::vec(any::<u8>(), 0..2048)) {
        let mut buf = DataBuffer::with_capacity(1);
        buf.append_iter(bytes.iter().copied()).unwrap();
        prop_assert_eq!(buf.as_slice(), bytes.as_slice());
        prop_assert!(buf.capacity().is_power_of_two());
    }
}
