#![no_main]

use libfuzzer_sys::fuzz_target;
use std::rc::Rc;
use subwrap::host::{MemoryModules, Runtime};

fuzz_target!(|data: &[u8]| {
    if let Ok(text) = std::str::from_utf8(data) {
        let mut rt = Runtime::new();
        rt.append_hook(Rc::new(MemoryModules::new().with_module("Fuzz::Target", text)));
        // Evaluation may fail; it must not panic.
        let _ = rt.require("Fuzz::Target");
    }
});
