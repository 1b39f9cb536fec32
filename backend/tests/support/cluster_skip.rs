//! `SKIP_TEST_CLUSTER` policy for suites that need embedded PostgreSQL.
//!
//! Environments that cannot start the cluster (no network for the binary
//! download, restricted sandboxes) set `SKIP_TEST_CLUSTER=1`; everywhere else
//! a setup failure is a test failure.

/// Whether `SKIP_TEST_CLUSTER` is set to `1`, `true` or `yes`
/// (case-insensitive).
pub fn should_skip_test_cluster() -> bool {
    std::env::var("SKIP_TEST_CLUSTER")
        .map(|value| matches!(value.to_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

/// Skip with a marker line when allowed, otherwise panic with `reason`.
pub fn handle_cluster_setup_failure<T>(reason: impl std::fmt::Display) -> Option<T> {
    if should_skip_test_cluster() {
        eprintln!("SKIP-TEST-CLUSTER: {reason}");
        None
    } else {
        panic!("Test cluster setup failed: {reason}. Set SKIP_TEST_CLUSTER=1 to skip.");
    }
}
