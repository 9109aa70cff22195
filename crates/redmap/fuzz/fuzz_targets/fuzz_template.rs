//! Fuzz target for template YAML decoding.

#![no_main]

use libfuzzer_sys::fuzz_target;
use redmap::Template;

fuzz_target!(|data: &[u8]| {
    if let Ok(text) = std::str::from_utf8(data) {
        if let Ok(template) = Template::from_yaml_str(text) {
            // Anything that decodes must encode again
            let _ = template.to_yaml_string();
            let _ = template.summary();
        }
    }
});
