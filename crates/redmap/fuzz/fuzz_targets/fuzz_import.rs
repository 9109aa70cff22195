//! Fuzz target for whole-file dictionary import.
//!
//! Malformed exports must produce an error, never a panic.

#![no_main]

use libfuzzer_sys::fuzz_target;
use redmap::DictionaryImporter;
use std::io::Write;

fuzz_target!(|data: &[u8]| {
    // Only process reasonable-sized inputs to avoid OOM
    if data.len() > 100_000 {
        return;
    }

    if let Ok(mut temp_file) = tempfile::NamedTempFile::new() {
        if temp_file.write_all(data).is_ok() {
            let importer = DictionaryImporter::new();
            if let Ok(dict) = importer.import(temp_file.path()) {
                let _ = dict.fingerprint();
            }
        }
    }
});
