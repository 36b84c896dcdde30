// crates/testrun-config/src/schema.rs
// ============================================================================
// Module: Config Schemas
// Description: JSON schema builder for testrun.toml.
// Purpose: Provide canonical validation schema for config artifacts.
// Dependencies: serde_json
// ============================================================================

//! ## Overview
//! This module defines the JSON Schema for the run configuration file. Bounds,
//! defaults, and the reporter enumeration come from the same constants the
//! resolver enforces, so editor tooling and runtime validation agree.

use serde_json::Value;
use serde_json::json;

use crate::config::DEFAULT_REPORTER;
use crate::config::DEFAULT_RETRY_COUNT;
use crate::config::DEFAULT_TEST_DIRECTORY;
use crate::config::DEFAULT_TIMEOUT_MS;
use crate::config::MAX_RETRY_COUNT;
use crate::config::MAX_TIMEOUT_MS;
use crate::config::MAX_TOTAL_PATH_LENGTH;
use crate::config::MIN_TIMEOUT_MS;
use crate::config::ReporterKind;
use crate::config::RunField;

/// Returns the JSON schema for `testrun.toml`.
#[must_use]
pub fn config_schema() -> Value {
    let reporters: Vec<&str> = ReporterKind::ALL.iter().map(|kind| kind.as_str()).collect();
    json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "$id": "testrun://schemas/config.schema.json",
        "title": "Testrun Configuration",
        "description": "Run parameters handed to the end-to-end test runner.",
        "type": "object",
        "properties": {
            (RunField::TestDirectory.key()): {
                "type": "string",
                "description": "Directory scanned for tests. Must exist when the config is resolved.",
                "minLength": 1,
                "maxLength": MAX_TOTAL_PATH_LENGTH,
                "default": DEFAULT_TEST_DIRECTORY
            },
            (RunField::TimeoutMs.key()): {
                "type": "integer",
                "description": "Wall-clock limit for a single test, in milliseconds.",
                "minimum": MIN_TIMEOUT_MS,
                "maximum": MAX_TIMEOUT_MS,
                "default": DEFAULT_TIMEOUT_MS
            },
            (RunField::RetryCount.key()): {
                "type": "integer",
                "description": "Additional attempts after a failing test before it is marked failed.",
                "minimum": 0,
                "maximum": MAX_RETRY_COUNT,
                "default": DEFAULT_RETRY_COUNT
            },
            (RunField::Reporter.key()): {
                "type": "string",
                "description": "Output format emitted by the runner.",
                "enum": reporters,
                "default": DEFAULT_REPORTER.as_str()
            }
        },
        "additionalProperties": true
    })
}
