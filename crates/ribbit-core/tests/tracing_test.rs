//! Tests for tracing initialization.

use std::sync::Mutex;

use ribbit_core::tracing::setup::{init_tracing, LOG_ENV_VAR};

/// Global mutex to serialize tracing tests (env var manipulation).
static TRACING_MUTEX: Mutex<()> = Mutex::new(());

#[test]
fn per_subsystem_filter_is_accepted() {
    let _lock = TRACING_MUTEX.lock().unwrap();
    std::env::set_var(
        LOG_ENV_VAR,
        "ribbit_analysis::extraction=debug,ribbit_analysis::pipeline=info",
    );
    init_tracing();
    tracing::info!(files = 3, "tracing initialised");
    std::env::remove_var(LOG_ENV_VAR);
}

#[test]
fn init_is_idempotent() {
    let _lock = TRACING_MUTEX.lock().unwrap();
    init_tracing();
    init_tracing();
    init_tracing();
}

#[test]
fn invalid_filter_falls_back() {
    let _lock = TRACING_MUTEX.lock().unwrap();
    std::env::set_var(LOG_ENV_VAR, "[[[not a filter");
    init_tracing();
    std::env::remove_var(LOG_ENV_VAR);
}
