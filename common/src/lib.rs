pub mod config;
pub mod yaml_include;

/// Shared pieces of the storefront workspace:
///
/// - configuration model and loading
/// - build-time YAML composition
/// - test helpers used by the `commerce` and `storefront` test suites

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;

#[cfg(any(test, feature = "test-helpers"))]
pub use test_helpers::{
    create_test_connection, generate_unique_email, generate_unique_id, get_test_database_url,
    truncate_tables,
};
