// SPDX-License-Identifier: PMPL-1.0-or-later
// Fuzz target for cardinality statement token parsing

#![no_main]

use libfuzzer_sys::fuzz_target;
use ngsi_semantic::{SemanticConfig, StatementKind};

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        // Malformed tokens must be reported, never panic
        let _ = StatementKind::parse(s);
        let _ = StatementKind::parse_with(s, &SemanticConfig::lenient());

        // Anything accepted must render back to a token that parses the same way
        if let Ok(kind) = StatementKind::parse(s) {
            let token = kind.to_token(&SemanticConfig::default());
            assert_eq!(StatementKind::parse(&token).ok(), Some(kind));
        }
    }
});
