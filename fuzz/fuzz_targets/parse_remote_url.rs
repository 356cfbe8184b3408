// SPDX-License-Identifier: Apache-2.0
// SPDX-FileCopyrightText: 2026 Techdebt Contributors

#![no_main]

use libfuzzer_sys::fuzz_target;
use techdebt_core::parse_github_url;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data)
        && let Ok(identity) = parse_github_url(s)
    {
        assert!(!identity.owner().is_empty());
        assert!(!identity.name().is_empty());
        assert!(!identity.owner().contains(['/', '.', '\\']));
        assert!(!identity.name().contains(['/', '.', '\\']));
    }
});
