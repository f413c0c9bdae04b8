//! Skip policy for suites that need the embedded PostgreSQL cluster.
//!
//! Environments that cannot start the cluster set `SKIP_TEST_CLUSTER`; every
//! other failure to bootstrap is a test failure.

/// Returns true when `SKIP_TEST_CLUSTER` is "1", "true" or "yes"
/// (case-insensitive).
pub fn should_skip_test_cluster() -> bool {
    std::env::var("SKIP_TEST_CLUSTER")
        .map(|value| matches!(value.to_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

/// Turn a cluster setup failure into a skip or a panic.
///
/// Returns `None` after printing a skip marker when skipping is allowed, so
/// fixtures can hand tests an `Option` context.
pub fn handle_cluster_setup_failure<T>(reason: impl std::fmt::Display) -> Option<T> {
    if should_skip_test_cluster() {
        eprintln!("SKIP-TEST-CLUSTER: {reason}");
        None
    } else {
        panic!("Test cluster setup failed: {reason}. Set SKIP_TEST_CLUSTER=1 to skip.");
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(Some("1"), true)]
    #[case(Some("YES"), true)]
    #[case(Some("true"), true)]
    #[case(Some("0"), false)]
    #[case(None, false)]
    fn skip_flag_accepts_truthy_values(#[case] value: Option<&str>, #[case] expected: bool) {
        let _guard = env_lock::lock_env([("SKIP_TEST_CLUSTER", value)]);
        assert_eq!(should_skip_test_cluster(), expected);
    }
}
