//! Default resolution tests for testrun-config.
// crates/testrun-config/tests/resolve_defaults.rs
// =============================================================================
// Module: Default Resolution Tests
// Description: Validate defaults, partial merges, and input round trips.
// Purpose: Ensure an empty declaration yields the documented configuration.
// =============================================================================

use std::path::Path;

use testrun_config::ConfigResolver;
use testrun_config::DEFAULT_REPORTER;
use testrun_config::DEFAULT_RETRY_COUNT;
use testrun_config::DEFAULT_TEST_DIRECTORY;
use testrun_config::DEFAULT_TIMEOUT_MS;
use testrun_config::ReporterKind;
use testrun_config::RunConfigInput;
use testrun_config::config_toml_example;

mod common;

use common::TestResult;

// Integration tests run from the package root, where `./tests` exists.

#[test]
fn empty_input_resolves_to_documented_defaults() -> TestResult {
    let config =
        ConfigResolver::new().resolve(RunConfigInput::default()).map_err(|err| err.to_string())?;
    if config.test_directory() != Path::new("./tests") {
        return Err(format!("unexpected test directory {}", config.test_directory().display()));
    }
    if config.timeout_ms() != 30_000 {
        return Err(format!("unexpected timeout {}", config.timeout_ms()));
    }
    if config.retry_count() != 1 {
        return Err(format!("unexpected retry count {}", config.retry_count()));
    }
    if config.reporter() != ReporterKind::Html {
        return Err(format!("unexpected reporter {}", config.reporter()));
    }
    Ok(())
}

#[test]
fn default_constants_match_documented_values() -> TestResult {
    if DEFAULT_TEST_DIRECTORY != "./tests"
        || DEFAULT_TIMEOUT_MS != 30_000
        || DEFAULT_RETRY_COUNT != 1
        || DEFAULT_REPORTER != ReporterKind::Html
    {
        return Err("default constants drifted from documented defaults".to_string());
    }
    Ok(())
}

#[test]
fn empty_table_matches_empty_input() -> TestResult {
    let from_table = common::resolve_toml("").map_err(|err| err.to_string())?;
    let from_input =
        ConfigResolver::new().resolve(RunConfigInput::default()).map_err(|err| err.to_string())?;
    if from_table != from_input {
        return Err(format!("{from_table} != {from_input}"));
    }
    Ok(())
}

#[test]
fn example_document_resolves_to_defaults() -> TestResult {
    let example = common::resolve_toml(&config_toml_example()).map_err(|err| err.to_string())?;
    let defaults = common::resolve_toml("").map_err(|err| err.to_string())?;
    if example != defaults {
        return Err(format!("example {example} differs from defaults {defaults}"));
    }
    Ok(())
}

#[test]
fn partial_input_keeps_remaining_defaults() -> TestResult {
    let dir = common::scratch_dir()?;
    let input = RunConfigInput {
        timeout_ms: Some(5_000),
        ..common::input_in(dir.path())
    };
    let config = ConfigResolver::new().resolve(input).map_err(|err| err.to_string())?;
    if config.test_directory() != dir.path() {
        return Err("declared test directory was not kept".to_string());
    }
    if config.timeout_ms() != 5_000 {
        return Err("declared timeout was not kept".to_string());
    }
    if config.retry_count() != DEFAULT_RETRY_COUNT || config.reporter() != DEFAULT_REPORTER {
        return Err("undeclared fields should take defaults".to_string());
    }
    Ok(())
}

#[test]
fn resolved_config_round_trips_through_input_record() -> TestResult {
    let dir = common::scratch_dir()?;
    let input = RunConfigInput {
        retry_count: Some(0),
        reporter: Some("junit".to_string()),
        ..common::input_in(dir.path())
    };
    let resolver = ConfigResolver::new();
    let first = resolver.resolve(input).map_err(|err| err.to_string())?;
    let second = resolver.resolve(first.to_input()).map_err(|err| err.to_string())?;
    if first != second {
        return Err(format!("{first} != {second}"));
    }
    Ok(())
}

#[test]
fn to_input_sets_every_field() -> TestResult {
    let config = common::resolve_toml("").map_err(|err| err.to_string())?;
    let input = config.to_input();
    if input.test_directory.is_none()
        || input.timeout_ms.is_none()
        || input.retry_count.is_none()
        || input.reporter.is_none()
    {
        return Err("input record is missing fields".to_string());
    }
    Ok(())
}

#[test]
fn toml_rendering_resolves_back_to_same_config() -> TestResult {
    let config = common::resolve_toml("reporter = \"dot\"\nretry_count = 4")
        .map_err(|err| err.to_string())?;
    let rendered = config.to_toml_string().map_err(|err| err.to_string())?;
    let reparsed = common::resolve_toml(&rendered).map_err(|err| err.to_string())?;
    if reparsed != config {
        return Err(format!("rendered TOML resolved to {reparsed}, expected {config}"));
    }
    Ok(())
}

#[test]
fn json_rendering_uses_file_keys() -> TestResult {
    let config = common::resolve_toml("").map_err(|err| err.to_string())?;
    let value = config.to_json_value().map_err(|err| err.to_string())?;
    let expected = serde_json::json!({
        "test_directory": "./tests",
        "timeout_ms": 30000,
        "retry_count": 1,
        "reporter": "html"
    });
    if value != expected {
        return Err(format!("unexpected json rendering {value}"));
    }
    Ok(())
}

#[test]
fn max_attempts_includes_initial_run() -> TestResult {
    let config = common::resolve_toml("retry_count = 0").map_err(|err| err.to_string())?;
    if config.max_attempts() != 1 {
        return Err(format!("expected a single attempt, got {}", config.max_attempts()));
    }
    Ok(())
}
