// crates/testrun-config/src/config.rs
// ============================================================================
// Module: Testrun Configuration
// Description: Run configuration model, defaults, and resolution.
// Purpose: Merge declared values over defaults with strict, fail-closed checks.
// Dependencies: serde_json, thiserror, toml, tracing
// ============================================================================

//! ## Overview
//! A [`ConfigResolver`] turns a partial [`RunConfigInput`] (or a raw TOML
//! table) into a fully populated [`RunConfiguration`]. Each field is checked
//! in a fixed order: type, then range or non-emptiness, then enum membership.
//! The test directory existence check runs last because it is the only step
//! that touches the filesystem.
//!
//! Resolution is all-or-nothing. The first failing field is reported as
//! [`ConfigError::Invalid`] and no partial configuration escapes.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::ffi::OsString;
use std::fmt;
use std::fs;
use std::io;
use std::path::Path;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use crate::input;
use crate::input::RunConfigInput;
use crate::source;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default directory scanned for tests.
pub const DEFAULT_TEST_DIRECTORY: &str = "./tests";
/// Default per-test timeout in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;
/// Default number of retries after a failing test.
pub const DEFAULT_RETRY_COUNT: u32 = 1;
/// Default reporter.
pub const DEFAULT_REPORTER: ReporterKind = ReporterKind::Html;
/// Minimum per-test timeout in milliseconds.
pub const MIN_TIMEOUT_MS: u64 = 1;
/// Maximum per-test timeout in milliseconds (one day).
pub const MAX_TIMEOUT_MS: u64 = 86_400_000;
/// Maximum number of retries per test.
pub const MAX_RETRY_COUNT: u32 = 100;
/// Maximum length of a single path component.
pub(crate) const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;

// ============================================================================
// SECTION: Fields
// ============================================================================

/// Recognized run configuration fields.
///
/// # Invariants
/// - Keys and environment variable names are stable; they form the file and
///   environment contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RunField {
    /// Directory scanned for tests.
    TestDirectory,
    /// Per-test timeout in milliseconds.
    TimeoutMs,
    /// Retries after a failing test.
    RetryCount,
    /// Output reporter.
    Reporter,
}

impl RunField {
    /// All recognized fields in resolution order.
    pub const ALL: [Self; 4] = [Self::TestDirectory, Self::TimeoutMs, Self::RetryCount, Self::Reporter];

    /// Returns the TOML key for the field.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::TestDirectory => "test_directory",
            Self::TimeoutMs => "timeout_ms",
            Self::RetryCount => "retry_count",
            Self::Reporter => "reporter",
        }
    }

    /// Returns the environment variable that overrides the field.
    #[must_use]
    pub const fn env_var(self) -> &'static str {
        match self {
            Self::TestDirectory => "TESTRUN_TEST_DIRECTORY",
            Self::TimeoutMs => "TESTRUN_TIMEOUT_MS",
            Self::RetryCount => "TESTRUN_RETRY_COUNT",
            Self::Reporter => "TESTRUN_REPORTER",
        }
    }

    /// Looks up a field by its TOML key.
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.key() == key)
    }
}

impl fmt::Display for RunField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

// ============================================================================
// SECTION: Reporter
// ============================================================================

/// Output format emitted by the external test runner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReporterKind {
    /// One line per test.
    List,
    /// Single updating status line.
    Line,
    /// One character per test.
    Dot,
    /// Browsable HTML report.
    Html,
    /// Machine-readable JSON report.
    Json,
    /// `JUnit` XML report.
    Junit,
}

impl ReporterKind {
    /// All supported reporters.
    pub const ALL: [Self; 6] = [Self::List, Self::Line, Self::Dot, Self::Html, Self::Json, Self::Junit];

    /// Returns the canonical reporter name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::List => "list",
            Self::Line => "line",
            Self::Dot => "dot",
            Self::Html => "html",
            Self::Json => "json",
            Self::Junit => "junit",
        }
    }

    /// Returns the supported names joined for error messages.
    fn expected_names() -> String {
        Self::ALL.map(Self::as_str).join(", ")
    }
}

impl fmt::Display for ReporterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReporterKind {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == value).ok_or_else(|| {
            ConfigError::invalid(
                RunField::Reporter,
                format!("unsupported reporter {value:?} (expected one of {})", Self::expected_names()),
            )
        })
    }
}

// ============================================================================
// SECTION: Run Configuration
// ============================================================================

/// Resolved, immutable run configuration.
///
/// # Invariants
/// - `test_directory` is non-empty and referenced an existing directory at
///   resolution time.
/// - `timeout_ms` is within `MIN_TIMEOUT_MS..=MAX_TIMEOUT_MS`.
/// - `retry_count` is at most `MAX_RETRY_COUNT`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfiguration {
    /// Directory scanned for tests, as declared.
    test_directory: PathBuf,
    /// Per-test timeout in milliseconds.
    timeout_ms: u64,
    /// Retries after a failing test.
    retry_count: u32,
    /// Output reporter.
    reporter: ReporterKind,
}

impl RunConfiguration {
    /// Returns the directory scanned for tests.
    #[must_use]
    pub fn test_directory(&self) -> &Path {
        &self.test_directory
    }

    /// Returns the per-test timeout in milliseconds.
    #[must_use]
    pub const fn timeout_ms(&self) -> u64 {
        self.timeout_ms
    }

    /// Returns the per-test timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Returns the number of retries after a failing test.
    #[must_use]
    pub const fn retry_count(&self) -> u32 {
        self.retry_count
    }

    /// Returns the total number of attempts a failing test receives.
    #[must_use]
    pub const fn max_attempts(&self) -> u32 {
        self.retry_count + 1
    }

    /// Returns the selected reporter.
    #[must_use]
    pub const fn reporter(&self) -> ReporterKind {
        self.reporter
    }

    /// Returns an input record carrying every resolved value.
    ///
    /// Resolving the returned record yields a configuration equal to `self`.
    #[must_use]
    pub fn to_input(&self) -> RunConfigInput {
        RunConfigInput {
            test_directory: Some(self.test_directory.to_string_lossy().into_owned()),
            timeout_ms: i64::try_from(self.timeout_ms).ok(),
            retry_count: Some(i64::from(self.retry_count)),
            reporter: Some(self.reporter.as_str().to_string()),
        }
    }

    /// Renders the configuration as a `testrun.toml` document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Serialize`] when TOML encoding fails.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string(&self.to_input()).map_err(|err| ConfigError::Serialize(err.to_string()))
    }

    /// Renders the configuration as a JSON object keyed like `testrun.toml`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Serialize`] when JSON encoding fails.
    pub fn to_json_value(&self) -> Result<serde_json::Value, ConfigError> {
        serde_json::to_value(self.to_input()).map_err(|err| ConfigError::Serialize(err.to_string()))
    }
}

impl fmt::Display for RunConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "test_directory={} timeout_ms={} retry_count={} reporter={}",
            self.test_directory.display(),
            self.timeout_ms,
            self.retry_count,
            self.reporter
        )
    }
}

// ============================================================================
// SECTION: Resolver
// ============================================================================

/// Handling for keys the resolver does not recognize.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UnknownKeyPolicy {
    /// Ignore the key and emit a warning.
    #[default]
    Warn,
    /// Fail resolution with [`ConfigError::UnknownKey`].
    Reject,
}

/// Merges declared values over defaults and validates the result.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConfigResolver {
    /// Handling for unrecognized keys in table sources.
    unknown_keys: UnknownKeyPolicy,
}

impl ConfigResolver {
    /// Creates a resolver that warns on unknown keys.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            unknown_keys: UnknownKeyPolicy::Warn,
        }
    }

    /// Returns a resolver using the given unknown-key policy.
    #[must_use]
    pub const fn with_unknown_keys(self, policy: UnknownKeyPolicy) -> Self {
        Self {
            unknown_keys: policy,
        }
    }

    /// Returns the unknown-key policy.
    #[must_use]
    pub const fn unknown_keys(&self) -> UnknownKeyPolicy {
        self.unknown_keys
    }

    /// Resolves a typed partial configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first field that fails
    /// range, membership, or directory checks.
    pub fn resolve(&self, input: RunConfigInput) -> Result<RunConfiguration, ConfigError> {
        let test_directory = input.test_directory.as_deref().unwrap_or(DEFAULT_TEST_DIRECTORY);
        validate_test_directory(test_directory)?;
        let timeout_ms = resolve_timeout_ms(input.timeout_ms)?;
        let retry_count = resolve_retry_count(input.retry_count)?;
        let reporter = input.reporter.as_deref().map_or(Ok(DEFAULT_REPORTER), str::parse::<ReporterKind>)?;
        check_directory_exists(test_directory)?;

        let config = RunConfiguration {
            test_directory: PathBuf::from(test_directory),
            timeout_ms,
            retry_count,
            reporter,
        };
        tracing::debug!(
            test_directory = %config.test_directory.display(),
            timeout_ms,
            retry_count,
            reporter = %reporter,
            "resolved run configuration"
        );
        Ok(config)
    }

    /// Resolves a raw TOML table, type-checking each recognized key.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownKey`] under [`UnknownKeyPolicy::Reject`],
    /// or [`ConfigError::Invalid`] when a value has the wrong type or fails
    /// validation.
    pub fn resolve_table(&self, table: &toml::Table) -> Result<RunConfiguration, ConfigError> {
        self.check_unknown_keys(table)?;
        self.resolve(RunConfigInput::from_table(table)?)
    }

    /// Loads the config file, applies environment overrides, and resolves.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading, overrides, or validation fail.
    pub fn load(&self, path: Option<&Path>) -> Result<RunConfiguration, ConfigError> {
        self.load_with(path, |name| std::env::var_os(name))
    }

    /// Same as [`Self::load`] with an explicit environment lookup.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading, overrides, or validation fail.
    pub fn load_with<F>(&self, path: Option<&Path>, env: F) -> Result<RunConfiguration, ConfigError>
    where
        F: Fn(&str) -> Option<OsString>,
    {
        let table = source::read_config_table(path, &env)?;
        self.check_unknown_keys(&table)?;
        let declared = RunConfigInput::from_table(&table)?;
        let overrides = RunConfigInput::from_env_with(&env)?;
        self.resolve(declared.merge(overrides))
    }

    /// Applies the unknown-key policy to a table source.
    fn check_unknown_keys(&self, table: &toml::Table) -> Result<(), ConfigError> {
        for key in input::unknown_keys(table) {
            match self.unknown_keys {
                UnknownKeyPolicy::Warn => {
                    tracing::warn!(key = %key, "ignoring unrecognized config key");
                }
                UnknownKeyPolicy::Reject => return Err(ConfigError::UnknownKey { key }),
            }
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration loading and resolution errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Config source rejected before parsing (path, size, or encoding).
    #[error("invalid config source: {0}")]
    Source(String),
    /// A field failed validation.
    #[error("invalid config: {field}: {reason}")]
    Invalid {
        /// Offending field.
        field: RunField,
        /// Why the value was rejected.
        reason: String,
    },
    /// Unrecognized key under [`UnknownKeyPolicy::Reject`].
    #[error("unknown config key: {key}")]
    UnknownKey {
        /// The unrecognized key.
        key: String,
    },
    /// Rendering a resolved configuration failed.
    #[error("config serialize error: {0}")]
    Serialize(String),
}

impl ConfigError {
    /// Builds an [`ConfigError::Invalid`] for a field.
    pub(crate) fn invalid(field: RunField, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }

    /// Returns the offending field, if the error names one.
    #[must_use]
    pub const fn field(&self) -> Option<RunField> {
        match self {
            Self::Invalid {
                field, ..
            } => Some(*field),
            _ => None,
        }
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Validates the declared test directory string against length constraints.
fn validate_test_directory(value: &str) -> Result<(), ConfigError> {
    let field = RunField::TestDirectory;
    if value.trim().is_empty() {
        return Err(ConfigError::invalid(field, "must be non-empty"));
    }
    if value.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::invalid(field, "exceeds max length"));
    }
    for component in Path::new(value).components() {
        if component.as_os_str().len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::invalid(field, "path component too long"));
        }
    }
    Ok(())
}

/// Checks that the test directory exists and is a directory.
fn check_directory_exists(value: &str) -> Result<(), ConfigError> {
    let field = RunField::TestDirectory;
    match fs::metadata(value) {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(ConfigError::invalid(field, format!("{value} is not a directory"))),
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            Err(ConfigError::invalid(field, format!("directory {value} does not exist")))
        }
        Err(err) => {
            Err(ConfigError::invalid(field, format!("directory {value} cannot be inspected: {err}")))
        }
    }
}

/// Resolves the timeout, applying the default when absent.
fn resolve_timeout_ms(value: Option<i64>) -> Result<u64, ConfigError> {
    let Some(value) = value else {
        return Ok(DEFAULT_TIMEOUT_MS);
    };
    validate_range(RunField::TimeoutMs, value, MIN_TIMEOUT_MS, MAX_TIMEOUT_MS)
}

/// Resolves the retry count, applying the default when absent.
fn resolve_retry_count(value: Option<i64>) -> Result<u32, ConfigError> {
    let Some(value) = value else {
        return Ok(DEFAULT_RETRY_COUNT);
    };
    let count = validate_range(RunField::RetryCount, value, 0, u64::from(MAX_RETRY_COUNT))?;
    u32::try_from(count).map_err(|_| range_error(RunField::RetryCount, 0, MAX_RETRY_COUNT.into()))
}

/// Checks that a signed value falls within an inclusive unsigned range.
fn validate_range(field: RunField, value: i64, min: u64, max: u64) -> Result<u64, ConfigError> {
    match u64::try_from(value) {
        Ok(value) if (min..=max).contains(&value) => Ok(value),
        _ => Err(range_error(field, min, max)),
    }
}

/// Builds the error for a value outside its range.
fn range_error(field: RunField, min: u64, max: u64) -> ConfigError {
    if min == 0 {
        ConfigError::invalid(field, format!("must be between 0 and {max}"))
    } else {
        ConfigError::invalid(field, format!("must be greater than zero and at most {max}"))
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
