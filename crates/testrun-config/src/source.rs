// crates/testrun-config/src/source.rs
// ============================================================================
// Module: Config File Source
// Description: Path resolution and guarded reads for testrun.toml.
// Purpose: Provide strict, fail-closed file loading with hard limits.
// Dependencies: toml, tracing
// ============================================================================

//! ## Overview
//! The config file is selected from an explicit path, then the
//! `TESTRUN_CONFIG` environment variable, then `testrun.toml` in the working
//! directory. Reads enforce path length, file size, and UTF-8 limits before
//! TOML parsing.
//!
//! Only the implicit default file may be absent; resolution then starts from
//! an empty table so every field takes its default.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::ffi::OsString;
use std::fs;
use std::io;
use std::io::Read;
use std::path::Path;
use std::path::PathBuf;

use crate::config::ConfigError;
use crate::config::MAX_PATH_COMPONENT_LENGTH;
use crate::config::MAX_TOTAL_PATH_LENGTH;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
pub const DEFAULT_CONFIG_NAME: &str = "testrun.toml";
/// Environment variable used to override the config path.
pub const CONFIG_ENV_VAR: &str = "TESTRUN_CONFIG";
/// Maximum configuration file size in bytes.
pub(crate) const MAX_CONFIG_FILE_SIZE: u64 = 1024 * 1024;

// ============================================================================
// SECTION: Path Resolution
// ============================================================================

/// Where the config path came from.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ConfigPath {
    /// Explicit argument or `TESTRUN_CONFIG`; must be readable.
    Selected(PathBuf),
    /// Implicit default; may be absent.
    Default(PathBuf),
}

impl ConfigPath {
    /// Returns the underlying path.
    fn path(&self) -> &Path {
        match self {
            Self::Selected(path) | Self::Default(path) => path,
        }
    }
}

/// Reads and parses the config file into a raw table.
pub(crate) fn read_config_table<F>(path: Option<&Path>, env: &F) -> Result<toml::Table, ConfigError>
where
    F: Fn(&str) -> Option<OsString>,
{
    let resolved = resolve_path(path, env)?;
    let path = resolved.path();
    validate_path(path)?;
    let metadata = match fs::metadata(path) {
        Ok(metadata) => metadata,
        Err(err) if err.kind() == io::ErrorKind::NotFound && matches!(resolved, ConfigPath::Default(_)) => {
            tracing::debug!(path = %path.display(), "no config file found; using defaults");
            return Ok(toml::Table::new());
        }
        Err(err) => return Err(io_error(path, &err)),
    };
    reject_pipe(&metadata)?;
    if metadata.len() > MAX_CONFIG_FILE_SIZE {
        return Err(size_limit_error());
    }
    let bytes = read_bounded(path)?;
    let content = std::str::from_utf8(&bytes)
        .map_err(|_| ConfigError::Source("config file must be utf-8".to_string()))?;
    let table: toml::Table =
        toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
    tracing::debug!(path = %path.display(), keys = table.len(), "loaded config file");
    Ok(table)
}

/// Resolves the config path from the argument or environment defaults.
fn resolve_path<F>(path: Option<&Path>, env: &F) -> Result<ConfigPath, ConfigError>
where
    F: Fn(&str) -> Option<OsString>,
{
    if let Some(path) = path {
        return Ok(ConfigPath::Selected(path.to_path_buf()));
    }
    if let Some(raw) = env(CONFIG_ENV_VAR) {
        let env_path = raw
            .into_string()
            .map_err(|_| ConfigError::Source(format!("{CONFIG_ENV_VAR} must be valid UTF-8")))?;
        if env_path.trim().is_empty() {
            return Err(ConfigError::Source(format!("{CONFIG_ENV_VAR} must not be empty")));
        }
        return Ok(ConfigPath::Selected(PathBuf::from(env_path)));
    }
    Ok(ConfigPath::Default(PathBuf::from(DEFAULT_CONFIG_NAME)))
}

/// Validates the resolved path against length limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    if path.as_os_str().len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Source("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        if component.as_os_str().len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Source("config path component too long".to_string()));
        }
    }
    Ok(())
}

/// Reads at most one byte past the size limit, so unbounded sources fail closed.
fn read_bounded(path: &Path) -> Result<Vec<u8>, ConfigError> {
    let file = fs::File::open(path).map_err(|err| io_error(path, &err))?;
    let mut bytes = Vec::new();
    file.take(MAX_CONFIG_FILE_SIZE + 1)
        .read_to_end(&mut bytes)
        .map_err(|err| io_error(path, &err))?;
    if !u64::try_from(bytes.len()).is_ok_and(|len| len <= MAX_CONFIG_FILE_SIZE) {
        return Err(size_limit_error());
    }
    Ok(bytes)
}

/// Rejects named pipes, which would block on open.
#[cfg(unix)]
fn reject_pipe(metadata: &fs::Metadata) -> Result<(), ConfigError> {
    use std::os::unix::fs::FileTypeExt;
    if metadata.file_type().is_fifo() {
        return Err(ConfigError::Source("config path must not be a pipe".to_string()));
    }
    Ok(())
}

/// No pipe check off unix.
#[cfg(not(unix))]
fn reject_pipe(_metadata: &fs::Metadata) -> Result<(), ConfigError> {
    Ok(())
}

/// Builds the oversized-file error.
fn size_limit_error() -> ConfigError {
    ConfigError::Source("config file exceeds size limit".to_string())
}

/// Wraps an I/O failure with the offending path.
fn io_error(path: &Path, err: &io::Error) -> ConfigError {
    ConfigError::Io(format!("{}: {err}", path.display()))
}

// ============================================================================
// SECTION: Tests
// ============================================================================
