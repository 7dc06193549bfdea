//! Common test infrastructure for Folio integration tests.
//!
//! Each test file compiles its own copy of this module, so items may appear
//! unused from the perspective of a single test file even though they're
//! used elsewhere.

#![allow(dead_code)]
#![allow(unused_imports)]

pub mod fixtures;
pub mod mock_server;

use std::sync::{Mutex, MutexGuard, OnceLock};

/// Serializes tests that assert on the process-wide surface registry, so a
/// concurrent test's in-flight render can't show up in the count.
pub fn surface_check_lock() -> MutexGuard<'static, ()> {
    static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    LOCK.get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}
