//! # crossoff testing
//!
//! Testing utilities for reducers and stores:
//!
//! - [`ReducerTest`]: Given/When/Then harness for a single reducer call
//! - [`assertions`]: helpers for inspecting returned effects
//! - [`init_test_tracing`]: opt-in log output for a test run
//!
//! ## Example
//!
//! ```ignore
//! use crossoff_testing::{assertions, ReducerTest};
//!
//! ReducerTest::new(TodoReducer::new())
//!     .with_env(TodoEnvironment::default())
//!     .given_state(TodoState::new())
//!     .when_action(TodoAction::AddItem { command_id, text: "Buy milk".into() })
//!     .then_effects(|effects| assertions::assert_effects_count(effects, 1))
//!     .then_sent(|sent| assert!(matches!(sent, [TodoAction::ItemAdded { .. }])))
//!     .run();
//! ```


pub use reducer_test::{assertions, ReducerTest};

use std::sync::Once;

static TRACING: Once = Once::new();

/// Install a `tracing` subscriber for tests, once per process.
///
/// Honours `RUST_LOG`; output goes through the test writer so it is only
/// shown for failing tests (or with `--nocapture`).
pub fn init_test_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .try_init();
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracing_init_is_idempotent() {
        init_test_tracing();
        init_test_tracing();
    }
}
