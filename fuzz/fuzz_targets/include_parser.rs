//! Fuzz target for the include selector parser.
//!
//! The grammar is lenient, so every input must produce an include set whose
//! keys all have their ancestors present, and splicing must never panic.
//!
//! Run with:
//! ```bash
//! cargo +nightly fuzz run fuzz_include_parser
//! ```

#![no_main]

use libfuzzer_sys::fuzz_target;
use smokescreen_schema::parse_includes;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        let includes = parse_includes(input);

        for key in includes.keys() {
            if let Some((parent, _)) = key.rsplit_once('.') {
                assert!(includes.has(parent), "missing ancestor {parent} of {key}");
            }
        }

        for key in includes.base_keys() {
            let _ = includes.splice(&key);
        }
    }
});
