// SPDX-License-Identifier: Apache-2.0
// SPDX-FileCopyrightText: 2026 Techdebt Contributors

#![no_main]

use libfuzzer_sys::fuzz_target;
use techdebt_core::sanitize_path_component;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data)
        && let Ok(once) = sanitize_path_component("owner", s)
    {
        let twice = sanitize_path_component("owner", &once).expect("sanitized value stays valid");
        assert_eq!(once, twice);
    }
});
