//! Test utility functions for integration tests
//!
//! Provides common utilities for test setup, logging, and assertions.

use tracing_subscriber::{fmt, EnvFilter};

/// Result type for integration tests
pub type TestResult<T = ()> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Initialize logging for tests with optional filter
///
/// Uses RUST_LOG environment variable if set, otherwise defaults to "info"
pub fn init_test_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logging_init_is_idempotent() {
        init_test_logging();
        init_test_logging();
    }

    #[test]
    fn test_result_propagates() {
        fn parse(input: &str) -> TestResult<i32> {
            Ok(input.parse()?)
        }
        assert_eq!(parse("17").unwrap(), 17);
        assert!(parse("not a number").is_err());
    }
}
