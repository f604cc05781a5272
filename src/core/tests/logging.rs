//! Testes do formatador de log.

use std::sync::Mutex;

use crate::core::logging::{emit_hex, set_sink};

static CAPTURED: Mutex<String> = Mutex::new(String::new());

fn capture(s: &str) {
    CAPTURED.lock().unwrap().push_str(s);
}

#[test]
fn test_emit_hex_formats_zero_and_value() {
    set_sink(capture);
    emit_hex(0);
    emit_hex(0xdead_beef);
    // o sink é global; outros testes podem intercalar fragmentos
    let out = CAPTURED.lock().unwrap().clone();
    assert!(out.contains("0x0"));
    assert!(out.contains("0xdeadbeef"));
}
