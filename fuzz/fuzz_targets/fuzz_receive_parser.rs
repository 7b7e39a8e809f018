//! Fuzz the receive-side parsers: arbitrary collected bytes must never
//! panic or slice out of bounds, whatever the modem hands us.

#![no_main]

use itemhub::modem::response::{framed_body, receive_frame, status_code};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(frame) = receive_frame(data) {
        assert_eq!(frame.payload.len(), frame.declared_len);
        let _ = status_code(frame.payload);
        let _ = framed_body(frame.payload);
    }
    let _ = status_code(data);
    let _ = framed_body(data);
});
