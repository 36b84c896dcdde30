// crates/testrun-config/tests/common/mod.rs
// =============================================================================
// Module: Config Test Helpers
// Description: Shared helpers for run configuration tests.
// Purpose: Reduce duplication across integration tests for testrun-config.
// =============================================================================

#![allow(dead_code, reason = "Test helpers are selectively used across suites.")]

use std::ffi::OsString;
use std::path::Path;

use tempfile::TempDir;
use testrun_config::ConfigError;
use testrun_config::ConfigResolver;
use testrun_config::RunConfigInput;
use testrun_config::RunConfiguration;
use testrun_config::RunField;

/// Result type shared by integration tests.
pub type TestResult = Result<(), String>;

/// Environment lookup with no variables set.
pub fn no_env(_: &str) -> Option<OsString> {
    None
}

/// Builds an environment lookup from fixed pairs.
pub fn env_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<OsString> + use<> {
    let owned: Vec<(String, OsString)> =
        vars.iter().map(|(key, value)| ((*key).to_string(), OsString::from(*value))).collect();
    move |name| owned.iter().find(|(key, _)| key == name).map(|(_, value)| value.clone())
}

/// Parses a TOML string into a table.
pub fn table_from_toml(toml_str: &str) -> Result<toml::Table, String> {
    toml::from_str(toml_str).map_err(|err| err.to_string())
}

/// Resolves a TOML string with the default resolver.
pub fn resolve_toml(toml_str: &str) -> Result<RunConfiguration, ConfigError> {
    let table = toml::from_str(toml_str).map_err(|err: toml::de::Error| {
        ConfigError::Parse(err.to_string())
    })?;
    ConfigResolver::new().resolve_table(&table)
}

/// Creates a scratch directory usable as a test directory.
pub fn scratch_dir() -> Result<TempDir, String> {
    tempfile::tempdir().map_err(|err| err.to_string())
}

/// Returns an input record pointing at the given directory.
pub fn input_in(dir: &Path) -> RunConfigInput {
    RunConfigInput {
        test_directory: Some(dir.to_string_lossy().into_owned()),
        ..RunConfigInput::default()
    }
}

/// Asserts that resolution failed on `field` with a message containing `needle`.
pub fn assert_invalid_field<T>(
    result: Result<T, ConfigError>,
    field: RunField,
    needle: &str,
) -> TestResult {
    match result {
        Err(error) => {
            if error.field() != Some(field) {
                return Err(format!("error {error} did not name field {field}"));
            }
            let message = error.to_string();
            if message.contains(needle) {
                Ok(())
            } else {
                Err(format!("error {message} did not contain {needle}"))
            }
        }
        Ok(_) => Err("expected invalid config".to_string()),
    }
}

/// Asserts that a result failed with a message containing `needle`.
pub fn assert_invalid<T>(result: Result<T, ConfigError>, needle: &str) -> TestResult {
    match result {
        Err(error) => {
            let message = error.to_string();
            if message.contains(needle) {
                Ok(())
            } else {
                Err(format!("error {message} did not contain {needle}"))
            }
        }
        Ok(_) => Err("expected invalid config".to_string()),
    }
}
