//! Fuzz target for entry name normalization and validation.
//!
//! Run with: cargo +nightly fuzz run entry_name
//!
//! Properties checked:
//! - Normalization is idempotent
//! - Accepted names encode within the name field
//! - Output paths never escape the destination

#![no_main]

use std::path::Path;

use libfuzzer_sys::fuzz_target;
use pck::EntryName;
use pck::format::MAX_NAME_LENGTH;
use pck::name::normalize;

fuzz_target!(|data: &[u8]| {
    let Ok(raw) = std::str::from_utf8(data) else {
        return;
    };

    let once = normalize(raw);
    assert_eq!(normalize(&once), once);

    if let Ok(name) = EntryName::new(raw) {
        let stored = name.to_stored_bytes().expect("accepted name encodes");
        assert!(stored.len() <= MAX_NAME_LENGTH);
        assert!(name.matches(raw));

        let dest = Path::new("/fuzz/out");
        if let Ok(path) = pck::read::output_path(dest, name.as_str()) {
            assert!(path.starts_with(dest));
        }
    }
});
