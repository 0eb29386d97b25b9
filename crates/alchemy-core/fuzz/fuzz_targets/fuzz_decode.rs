#![no_main]
use alchemy_core::serialize::{decode_stack, decode_vessels};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Must not panic -- returning Err is fine.
    let _ = decode_stack(data);
    let _ = decode_vessels(data);
});
