//! Fuzz target for the definition mini-language.
//!
//! Feeds arbitrary definition strings through include map computation and
//! prop definition parsing. Both should only ever return errors.
//!
//! Run with:
//! ```bash
//! cargo +nightly fuzz run fuzz_definition_parser
//! ```

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use smokescreen_schema::{IncludeDeclarations, IncludeMap, PropDefinition};

#[derive(Debug, Arbitrary)]
struct FuzzDeclaration {
    key: String,
    definition: Option<String>,
}

fuzz_target!(|declarations: Vec<FuzzDeclaration>| {
    let mut decls = IncludeDeclarations::new();
    for declaration in &declarations {
        decls = match &declaration.definition {
            Some(definition) => decls.with(declaration.key.as_str(), definition.as_str()),
            None => decls.key(declaration.key.as_str()),
        };

        if let Some(definition) = &declaration.definition {
            let _ = PropDefinition::parse(declaration.key.as_str(), definition);
        }
    }

    if let Ok(map) = IncludeMap::compute(&decls) {
        let _ = map.relations_for(map.available());
    }
});
