#![no_main]

use libfuzzer_sys::fuzz_target;
use subwrap::wrap::PackageTargets;

fuzz_target!(|data: &[u8]| {
    if let Ok(text) = std::str::from_utf8(data) {
        let mut parts = text.splitn(2, '\n');
        let entries = parts.next().unwrap_or_default().split(',');
        let probe = parts.next().unwrap_or_default();
        if let Ok(targets) = PackageTargets::parse(entries) {
            let _ = targets.matches(probe);
        }
    }
});
