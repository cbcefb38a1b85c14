//! Test Utilities Crate
//!
//! Shared fixtures and builders for the account engine test suite.
//!
//! # Modules
//!
//! - `fixtures`: pre-wired store/factory/calculator environments
//! - `builders`: builder patterns for payloads and entities

pub mod builders;
pub mod fixtures;

pub use builders::*;
pub use fixtures::*;

use std::sync::Once;

static TRACING: Once = Once::new();

/// Installs a test tracing subscriber once per process
pub fn init_test_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug")),
            )
            .with_test_writer()
            .try_init();
    });
}
