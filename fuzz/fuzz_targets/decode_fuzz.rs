#![no_main]
use bsontree::bson::{CodeWithScope, DecodeOptions, Decoder, RootContext};
use bsontree::value::Value;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Arbitrary bytes must only ever produce errors, never panics.
    let mut root = Value::Undef;
    let _ = Decoder::new(data, &DecodeOptions::default()).decode(&mut root);

    // Same input under the permissive settings, with a listing.
    let opts = DecodeOptions {
        root: RootContext::Map,
        code_with_scope: CodeWithScope::Skip,
        verify_length: true,
        max_depth: 16,
        ..Default::default()
    };
    let mut root = Value::Undef;
    if let Ok((stats, listing)) = Decoder::new(data, &opts).decode_listing(&mut root) {
        assert!(stats.bytes_consumed <= data.len());
        assert_eq!(listing.len() as u64, stats.elements);
        assert!(stats.max_depth <= 16);
    }
});
