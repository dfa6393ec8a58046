#![no_main]

use libfuzzer_sys::fuzz_target;
use tplink_gelf_forwarder::prival::{MAX_FACILITY, decode_prival};

fuzz_target!(|data: &str| {
    let priority = decode_prival(data);
    if let Some(facility) = priority.facility {
        assert!(facility <= MAX_FACILITY);
        assert!(priority.severity.is_some());
    }
    if let Some(severity) = priority.severity {
        assert!(severity <= 7);
    }
});
