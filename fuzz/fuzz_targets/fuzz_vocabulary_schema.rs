// SPDX-License-Identifier: PMPL-1.0-or-later
// Fuzz target for vocabulary schema loading

#![no_main]

use libfuzzer_sys::fuzz_target;
use ngsi_semantic::VocabularySchema;

fuzz_target!(|data: &[u8]| {
    if let Ok(schema) = VocabularySchema::from_reader(data) {
        // Unknown classes, cycles and bad statements are errors, not panics
        if let Ok(registry) = schema.build_registry() {
            for class in registry.class_names() {
                let _ = registry.relationships_of(class);
            }
        }
    }
});
