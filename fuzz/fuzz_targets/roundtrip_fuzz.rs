#![no_main]
use bsontree::bson::{self, DecodeOptions, RootContext};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Anything that decodes must re-encode, and the re-encoded bytes must
    // decode to the same tree.
    let opts = DecodeOptions {
        root: RootContext::Map,
        ..Default::default()
    };
    let Ok(tree) = bson::decode_to_value(data, &opts) else {
        return;
    };
    // A root with no elements stays undefined and has no encoding.
    let Ok(bytes) = bson::encode(&tree) else {
        return;
    };
    let again = bson::decode_to_value(&bytes, &opts).unwrap();
    // NaN payloads compare unequal; compare the canonical encodings.
    assert_eq!(bson::encode(&again).unwrap(), bytes);
});
