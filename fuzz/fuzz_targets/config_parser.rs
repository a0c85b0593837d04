//! Fuzz target for the Smokescreen config parser.
//!
//! This target feeds arbitrary TOML strings to the config parser
//! to find crashes and panics.
//!
//! Run with:
//! ```bash
//! cargo +nightly fuzz run fuzz_config_parser
//! ```

#![no_main]

use libfuzzer_sys::fuzz_target;
use smokescreen_schema::SmokescreenConfig;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        // The parser should never panic, only return errors
        if let Ok(config) = SmokescreenConfig::from_str(input) {
            let config = config.with_environment("development");
            let _ = smokescreen_transform::Smokescreen::from_config(&config);
        }
    }
});
