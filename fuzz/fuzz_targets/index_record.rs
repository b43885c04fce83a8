//! Fuzz target for decoding framed index records.
//!
//! Run with: cargo +nightly fuzz run index_record
//!
//! Any input must either decode or fail with an error; a decoded record
//! must report a consumed length inside the input and survive re-encoding.

#![no_main]

use libfuzzer_sys::fuzz_target;
use pck::format::IndexRecord;

fuzz_target!(|data: &[u8]| {
    if let Ok((record, used)) = IndexRecord::decode(data, 0) {
        assert!(used <= data.len());
        let encoded = record.encode(6).expect("re-encode decoded record");
        let (again, _) = IndexRecord::decode(&encoded, 0).expect("decode re-encoded record");
        assert_eq!(again, record);
    }
});
