// crates/testrun-config/src/examples.rs
// ============================================================================
// Module: Config Examples
// Description: Canonical example configuration payloads.
// Purpose: Deterministic examples for docs and tooling.
// Dependencies: std
// ============================================================================

//! ## Overview
//! Canonical example for `testrun.toml`. The example spells out every field at
//! its default value and is kept in sync with the schema by tests.

/// Returns a canonical example `testrun.toml` configuration.
#[must_use]
pub fn config_toml_example() -> String {
    String::from(
        r#"# Directory scanned for tests. Relative paths resolve against the working directory.
test_directory = "./tests"

# Wall-clock limit for a single test, in milliseconds.
timeout_ms = 30000

# Additional attempts after a failing test before it is marked failed.
retry_count = 1

# Output format: list, line, dot, html, json, or junit.
reporter = "html"
"#,
    )
}
