// Shared helpers for the integration test crates in `tests/`.
#![allow(dead_code)]

pub mod fixtures;

use std::sync::Once;

static LOGGER: Once = Once::new();

/// Route `log` output through env_logger once per test binary.
pub fn init_logging() {
    LOGGER.call_once(|| {
        let _ = env_logger::builder().is_test(true).try_init();
    });
}
