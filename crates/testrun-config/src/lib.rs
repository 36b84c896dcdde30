// crates/testrun-config/src/lib.rs
// ============================================================================
// Module: Testrun Config Library
// Description: Canonical run configuration model, resolution, and artifacts.
// Purpose: Single source of truth for testrun.toml semantics.
// Dependencies: serde, serde_json, thiserror, toml, tracing
// ============================================================================

//! ## Overview
//! `testrun-config` defines the run configuration handed to an external
//! end-to-end test runner: the test directory, per-test timeout, retry count,
//! and reporter. Declared values are merged over documented defaults and
//! validated fail-closed; the result is an immutable [`RunConfiguration`].
//!
//! Sources are layered as defaults, then `testrun.toml`, then `TESTRUN_*`
//! environment overrides. A JSON schema and a canonical example document are
//! generated from the same constants the resolver enforces.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;
pub mod examples;
pub mod input;
pub mod schema;
pub mod source;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
pub use examples::config_toml_example;
pub use input::RunConfigInput;
pub use schema::config_schema;
pub use source::CONFIG_ENV_VAR;
pub use source::DEFAULT_CONFIG_NAME;
