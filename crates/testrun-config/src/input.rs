// crates/testrun-config/src/input.rs
// ============================================================================
// Module: Run Configuration Input
// Description: Partial, unvalidated run configuration records.
// Purpose: Type-check table and environment sources before resolution.
// Dependencies: serde, toml
// ============================================================================

//! ## Overview
//! [`RunConfigInput`] is the declared form of a run configuration: every field
//! is optional and numeric fields are signed so that out-of-range values such
//! as `-1` reach range validation instead of failing as type errors.
//!
//! Table sources are type-checked key by key; environment sources are parsed
//! with strict UTF-8 and non-empty checks. Both report [`ConfigError::Invalid`]
//! naming the offending field.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::ffi::OsString;

use serde::Serialize;

use crate::config::ConfigError;
use crate::config::RunField;

// ============================================================================
// SECTION: Input Record
// ============================================================================

/// Partial run configuration; absent fields take their defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunConfigInput {
    /// Directory scanned for tests.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test_directory: Option<String>,
    /// Per-test timeout in milliseconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<i64>,
    /// Retries after a failing test.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_count: Option<i64>,
    /// Reporter name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reporter: Option<String>,
}

impl RunConfigInput {
    /// Builds an input record from a TOML table, type-checking recognized keys.
    ///
    /// Unrecognized keys are skipped here; the resolver decides whether they
    /// warn or fail.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when a recognized key holds a value of
    /// the wrong type.
    pub fn from_table(table: &toml::Table) -> Result<Self, ConfigError> {
        let mut input = Self::default();
        for field in RunField::ALL {
            let Some(value) = table.get(field.key()) else {
                continue;
            };
            match field {
                RunField::TestDirectory => input.test_directory = Some(expect_string(field, value)?),
                RunField::TimeoutMs => input.timeout_ms = Some(expect_integer(field, value)?),
                RunField::RetryCount => input.retry_count = Some(expect_integer(field, value)?),
                RunField::Reporter => input.reporter = Some(expect_string(field, value)?),
            }
        }
        Ok(input)
    }

    /// Reads overrides through the provided environment lookup.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when a variable is not UTF-8, is blank,
    /// or does not parse as an integer where one is required.
    pub fn from_env_with<F>(env: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<OsString>,
    {
        let test_directory = read_env_value(&env, RunField::TestDirectory)?;
        let timeout_ms = read_env_value(&env, RunField::TimeoutMs)?
            .map(|raw| parse_env_integer(RunField::TimeoutMs, &raw))
            .transpose()?;
        let retry_count = read_env_value(&env, RunField::RetryCount)?
            .map(|raw| parse_env_integer(RunField::RetryCount, &raw))
            .transpose()?;
        let reporter =
            read_env_value(&env, RunField::Reporter)?.map(|raw| raw.trim().to_string());
        Ok(Self {
            test_directory,
            timeout_ms,
            retry_count,
            reporter,
        })
    }

    /// Returns a record where every field set in `overrides` wins.
    #[must_use]
    pub fn merge(self, overrides: Self) -> Self {
        Self {
            test_directory: overrides.test_directory.or(self.test_directory),
            timeout_ms: overrides.timeout_ms.or(self.timeout_ms),
            retry_count: overrides.retry_count.or(self.retry_count),
            reporter: overrides.reporter.or(self.reporter),
        }
    }

    /// Returns true when no field is set.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.test_directory.is_none()
            && self.timeout_ms.is_none()
            && self.retry_count.is_none()
            && self.reporter.is_none()
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Returns table keys that are not recognized fields, sorted.
pub(crate) fn unknown_keys(table: &toml::Table) -> Vec<String> {
    let mut keys: Vec<String> =
        table.keys().filter(|key| RunField::from_key(key).is_none()).cloned().collect();
    keys.sort();
    keys
}

/// Requires a string value.
fn expect_string(field: RunField, value: &toml::Value) -> Result<String, ConfigError> {
    value.as_str().map(str::to_string).ok_or_else(|| type_error(field, "a string", value))
}

/// Requires an integer value.
fn expect_integer(field: RunField, value: &toml::Value) -> Result<i64, ConfigError> {
    value.as_integer().ok_or_else(|| type_error(field, "an integer", value))
}

/// Builds a type mismatch error.
fn type_error(field: RunField, expected: &str, value: &toml::Value) -> ConfigError {
    ConfigError::invalid(field, format!("must be {expected}, found {}", value.type_str()))
}

/// Reads a field override, enforcing UTF-8 and non-empty values.
fn read_env_value<F>(env: &F, field: RunField) -> Result<Option<String>, ConfigError>
where
    F: Fn(&str) -> Option<OsString>,
{
    let name = field.env_var();
    let Some(raw) = env(name) else {
        return Ok(None);
    };
    let value = raw
        .into_string()
        .map_err(|_| ConfigError::invalid(field, format!("{name} must be valid UTF-8")))?;
    if value.trim().is_empty() {
        return Err(ConfigError::invalid(field, format!("{name} must not be empty")));
    }
    Ok(Some(value))
}

/// Parses an integer override.
fn parse_env_integer(field: RunField, raw: &str) -> Result<i64, ConfigError> {
    raw.trim().parse().map_err(|_| {
        ConfigError::invalid(field, format!("{} must be an integer", field.env_var()))
    })
}

// ============================================================================
// SECTION: Tests
// ============================================================================
