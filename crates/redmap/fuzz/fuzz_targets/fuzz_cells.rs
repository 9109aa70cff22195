//! Fuzz target for the dictionary cell parsers.
//!
//! Every parser must accept any text without panicking.

#![no_main]

use libfuzzer_sys::fuzz_target;
use redmap::dictionary::parsers::{
    parse_branching_logic, parse_calculation, parse_choices, parse_flag, parse_validation_limit,
    parse_validation_type,
};

fuzz_target!(|data: &[u8]| {
    let input = String::from_utf8_lossy(data);

    let _ = parse_choices(&input);
    let _ = parse_calculation(&input);
    let _ = parse_validation_limit(&input);
    let _ = parse_validation_type(&input);
    let _ = parse_flag(&input);

    if let Some(conditions) = parse_branching_logic(&input) {
        for condition in conditions {
            let _ = condition.operator.as_str();
        }
    }
});
