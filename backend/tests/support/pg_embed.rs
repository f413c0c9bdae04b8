//! Bootstrap for the embedded PostgreSQL cluster shared by a test binary.
//!
//! `pg-embed-setup-unpriv` installs binaries and data under `/var/tmp` unless
//! told otherwise. When `PG_RUNTIME_DIR` or `PG_DATA_DIR` is missing, both are
//! pointed at unique directories under the target directory for the duration
//! of the bootstrap, with environment mutation serialised through `env-lock`.

use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};
use std::time::Duration;

use pg_embedded_setup_unpriv::ClusterHandle;
use uuid::Uuid;

static PG_EMBED_BOOTSTRAP_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

/// Retries for transient download failures.
const MAX_RETRIES: u32 = 3;

/// First retry delay; doubles on each further attempt.
const RETRY_DELAY_MS: u64 = 500;

const TEST_PASSWORD: &str = "study_assistant_embedded_test";

fn pg_embed_target_dir() -> PathBuf {
    if let Some(target_dir) = std::env::var_os("CARGO_TARGET_DIR") {
        return PathBuf::from(target_dir).join("pg-embed");
    }
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("target")
        .join("pg-embed")
}

fn create_unique_pg_embed_dirs() -> Result<(PathBuf, PathBuf), std::io::Error> {
    let unique = format!("bootstrap-{}-{}", std::process::id(), Uuid::new_v4());
    let base = pg_embed_target_dir().join(unique);
    let runtime_dir = base.join("install");
    let data_dir = base.join("data");

    std::fs::create_dir_all(&runtime_dir)?;
    std::fs::create_dir_all(&data_dir)?;

    Ok((runtime_dir, data_dir))
}

fn is_transient_error(err: &str) -> bool {
    let transient_patterns = [
        "error decoding response body",
        "connection reset",
        "connection refused",
        "timed out",
        "timeout",
        "temporarily unavailable",
        "network unreachable",
        "dns error",
        "failed to lookup",
    ];

    let err_lower = err.to_lowercase();
    transient_patterns
        .iter()
        .any(|pattern| err_lower.contains(pattern))
}

/// Environment the bootstrap runs under.
///
/// Existing directory overrides are left alone. `PG_PASSWORD` is pinned so a
/// reused data directory keeps accepting the password it was created with.
fn bootstrap_env() -> Result<Vec<(&'static str, Option<String>)>, String> {
    let mut vars = Vec::new();
    let needs_dirs =
        std::env::var_os("PG_RUNTIME_DIR").is_none() || std::env::var_os("PG_DATA_DIR").is_none();
    if needs_dirs {
        let (runtime_dir, data_dir) =
            create_unique_pg_embed_dirs().map_err(|err| err.to_string())?;
        vars.push((
            "PG_RUNTIME_DIR",
            Some(runtime_dir.to_string_lossy().into_owned()),
        ));
        vars.push(("PG_DATA_DIR", Some(data_dir.to_string_lossy().into_owned())));
    }
    if std::env::var_os("PG_PASSWORD").is_none() {
        vars.push(("PG_PASSWORD", Some(TEST_PASSWORD.to_owned())));
    }
    Ok(vars)
}

/// The cluster shared by every test in this binary, started on first use.
///
/// Retries up to [`MAX_RETRIES`] times when the failure looks like a flaky
/// binary download.
pub fn shared_cluster() -> Result<&'static ClusterHandle, String> {
    let _bootstrap_guard = PG_EMBED_BOOTSTRAP_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|err| err.into_inner());

    let vars = bootstrap_env()?;
    let _env_guard = (!vars.is_empty()).then(|| env_lock::lock_env(vars));

    let mut last_error = String::new();
    for attempt in 0..=MAX_RETRIES {
        match pg_embedded_setup_unpriv::test_support::shared_cluster_handle() {
            Ok(handle) => return Ok(handle),
            Err(err) => {
                last_error = format!("{err:?}");
                if attempt < MAX_RETRIES && is_transient_error(&last_error) {
                    let delay = Duration::from_millis(RETRY_DELAY_MS * (1 << attempt));
                    eprintln!(
                        "pg-embed: transient error on attempt {}/{}, retrying in {:?}: {last_error}",
                        attempt + 1,
                        MAX_RETRIES + 1,
                        delay
                    );
                    std::thread::sleep(delay);
                } else {
                    break;
                }
            }
        }
    }

    Err(last_error)
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::is_transient_error;

    #[rstest]
    #[case("error decoding response body: unexpected EOF", true)]
    #[case("DNS error: failed to lookup address", true)]
    #[case("Operation Timed Out", true)]
    #[case("initdb: permission denied", false)]
    fn transient_errors_are_recognised(#[case] message: &str, #[case] expected: bool) {
        assert_eq!(is_transient_error(message), expected);
    }
}
