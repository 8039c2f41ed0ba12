//! CLI command builders for tests
//!
//! Commands start from a clean environment so a developer's own credentials
//! or emulator settings never leak into a test run.

use assert_cmd::Command;

/// Name of the binary under test
pub const BIN_NAME: &str = "browse-firestore";

/// Get a Command for the `browse-firestore` binary with clean environment
///
/// This command is pre-configured with:
/// - `RUST_LOG=error` to suppress WARN/DEBUG logs in tests
/// - Google credential, project and emulator variables removed
///
/// # Example
///
/// ```rust,no_run
/// use fire_test_helpers::cli::browse_command;
///
/// browse_command()
///     .arg("--version")
///     .assert()
///     .success();
/// ```
#[allow(deprecated)]
pub fn browse_command() -> Command {
    let mut cmd = Command::cargo_bin(BIN_NAME).expect("Failed to find browse-firestore binary");
    cmd.env("RUST_LOG", "error");
    cmd.env_remove("GOOGLE_APPLICATION_CREDENTIALS");
    cmd.env_remove("FIRESTORE_EMULATOR_HOST");
    cmd.env_remove("GOOGLE_CLOUD_PROJECT");
    cmd
}
