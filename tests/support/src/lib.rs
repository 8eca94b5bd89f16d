//! test-support: helpers shared by the impediment-report test binaries.
//!
//! Add as a dev-dependency in your top-level `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! test_support = { path = "tests/support", features = ["serde"] }
//! ```
//!
//! Then in tests:
//! ```rust,ignore
//! use test_support::{init_tracing, fixtures_dir, read_fixture_json};
//!
//! #[test]
//! fn example() {
//!     init_tracing();
//!     let _root = fixtures_dir();
//! }
//! ```

use once_cell::sync::Lazy;
use tracing_subscriber::{fmt, EnvFilter};

use std::path::{Path, PathBuf};

/// Initialize `tracing` once, honoring `RUST_LOG` and writing via the test writer.
///
/// Safe to call from multiple tests; only the first call configures the global subscriber.
pub fn init_tracing() {
    static INIT: Lazy<()> = Lazy::new(|| {
        let filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new("warn,test=info"))
            .unwrap();
        // with_test_writer() causes logs to appear alongside failing tests only (cargo/nextest)
        let _ = fmt().with_env_filter(filter).with_test_writer().try_init();
    });
    Lazy::force(&INIT);
}

/// Return the path to the repository's `tests/fixtures` directory.
///
/// This crate lives in `<repo>/tests/support`, so fixtures sit next to it.
pub fn fixtures_dir() -> PathBuf {
    let support_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    support_dir
        .parent()
        .map(|tests| tests.join("fixtures"))
        .unwrap_or_else(|| support_dir.join("fixtures"))
}

/// Return the path to the repository's `tests/schemas` directory.
pub fn schemas_dir() -> PathBuf {
    fixtures_dir().with_file_name("schemas")
}

/// Deserialize a JSON fixture into `T` (enable `serde` feature).
#[cfg(feature = "serde")]
pub fn read_fixture_json<T, P>(rel_path: P) -> T
where
    T: serde::de::DeserializeOwned,
    P: AsRef<Path>,
{
    let path = fixtures_dir().join(rel_path);
    let file = std::fs::File::open(&path)
        .unwrap_or_else(|e| panic!("failed to open fixture {}: {e}", path.display()));
    serde_json::from_reader::<_, T>(file)
        .unwrap_or_else(|e| panic!("failed to parse JSON fixture {}: {e}", path.display()))
}

/// Parse a command's stdout as JSON (enable `serde` feature).
#[cfg(feature = "serde")]
pub fn stdout_json(output: &std::process::Output) -> serde_json::Value {
    serde_json::from_slice(&output.stdout).unwrap_or_else(|e| {
        panic!(
            "stdout is not JSON: {e}\n--- stdout ---\n{}\n--- stderr ---\n{}",
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        )
    })
}

/// Create a temp directory that deletes on drop.
pub fn tempdir() -> tempfile::TempDir {
    tempfile::tempdir().expect("create tempdir")
}

/// Copy a fixture into `dir`, returning the destination path.
pub fn copy_fixture(rel_path: &str, dir: &Path) -> PathBuf {
    let src = fixtures_dir().join(rel_path);
    let dest = dir.join(
        Path::new(rel_path)
            .file_name()
            .unwrap_or_else(|| panic!("fixture path has no file name: {rel_path}")),
    );
    std::fs::copy(&src, &dest)
        .unwrap_or_else(|e| panic!("failed to copy fixture {}: {e}", src.display()));
    dest
}

/// Run a binary target with `assert_cmd`, returning the ready-to-run `Command`.
///
/// Example:
/// ```rust,ignore
/// use test_support::cmd_bin;
/// use predicates::prelude::*;
///
/// let mut cmd = cmd_bin("impediment-report");
/// cmd.arg("--help").assert().success().stdout(predicate::str::contains("Usage"));
/// ```
pub fn cmd_bin(bin: &str) -> assert_cmd::Command {
    init_tracing();
    assert_cmd::Command::cargo_bin(bin).expect("binary target not found")
}
