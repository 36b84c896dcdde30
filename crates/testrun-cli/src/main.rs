// crates/testrun-cli/src/main.rs
// ============================================================================
// Module: Testrun CLI Entry Point
// Description: Command dispatcher for run configuration workflows.
// Purpose: Resolve, validate, and inspect testrun.toml from the command line.
// Dependencies: clap, serde_json, testrun-config, thiserror, tracing.
// ============================================================================

//! ## Overview
//! The Testrun CLI owns the process-scoped run configuration. Each command
//! resolves the configuration once and passes it by reference to the code that
//! renders it; there is no global configuration state. Results go to stdout,
//! errors go to stderr as a single line with a non-zero exit code.

// ============================================================================
// SECTION: Modules
// ============================================================================


// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Args;
use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;
use testrun_config::ConfigResolver;
use testrun_config::RunConfiguration;
use testrun_config::UnknownKeyPolicy;
use testrun_config::config_schema;
use testrun_config::config_toml_example;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Log filter used when `RUST_LOG` is unset or invalid.
const DEFAULT_LOG_FILTER: &str = "warn";

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "testrun", version, disable_help_subcommand = true)]
struct Cli {
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Commands,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run configuration utilities.
    Config {
        /// Selected config subcommand.
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Resolve the run configuration and report whether it is valid.
    Validate(ConfigLoadArgs),
    /// Print the fully resolved run configuration.
    Show(ConfigShowCommand),
    /// Print the JSON schema for testrun.toml.
    Schema,
    /// Print a canonical example testrun.toml.
    Example,
}

/// Arguments shared by commands that resolve the configuration.
#[derive(Args, Debug)]
struct ConfigLoadArgs {
    /// Optional config file path (defaults to testrun.toml or `TESTRUN_CONFIG`).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Reject unrecognized keys instead of warning about them.
    #[arg(long)]
    strict: bool,
}

impl ConfigLoadArgs {
    /// Returns the resolver configured by these arguments.
    const fn resolver(&self) -> ConfigResolver {
        let policy = if self.strict { UnknownKeyPolicy::Reject } else { UnknownKeyPolicy::Warn };
        ConfigResolver::new().with_unknown_keys(policy)
    }

    /// Loads and resolves the run configuration.
    fn load(&self) -> CliResult<RunConfiguration> {
        self.resolver()
            .load(self.config.as_deref())
            .map_err(|err| CliError::new(format!("failed to load config: {err}")))
    }
}

/// Arguments for config show.
#[derive(Args, Debug)]
struct ConfigShowCommand {
    /// Config selection and strictness.
    #[command(flatten)]
    load: ConfigLoadArgs,
    /// Output format.
    #[arg(long, value_enum, default_value_t = ShowFormat::Toml)]
    format: ShowFormat,
}

/// Output formats for the resolved configuration.
#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
enum ShowFormat {
    /// `testrun.toml` document.
    Toml,
    /// Pretty-printed JSON object.
    Json,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper for user-facing error messages.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`] from a message.
    const fn new(message: String) -> Self {
        Self {
            message,
        }
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
fn main() -> ExitCode {
    init_tracing();
    match run() {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher.
fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Config {
            command,
        } => command_config(command),
    }
}

/// Installs the stderr log subscriber, honoring `RUST_LOG`.
fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).try_init();
}

// ============================================================================
// SECTION: Config Commands
// ============================================================================

/// Dispatches config subcommands.
fn command_config(command: ConfigCommand) -> CliResult<ExitCode> {
    match command {
        ConfigCommand::Validate(args) => command_config_validate(&args),
        ConfigCommand::Show(command) => command_config_show(&command),
        ConfigCommand::Schema => command_config_schema(),
        ConfigCommand::Example => command_config_example(),
    }
}

/// Executes the config validation command.
fn command_config_validate(args: &ConfigLoadArgs) -> CliResult<ExitCode> {
    let config = args.load()?;
    tracing::info!(config = %config, "run configuration is valid");
    write_stdout_text(&format!("config ok: {config}"))?;
    Ok(ExitCode::SUCCESS)
}

/// Executes the config show command.
fn command_config_show(command: &ConfigShowCommand) -> CliResult<ExitCode> {
    let config = command.load.load()?;
    write_stdout_text(&render_config(&config, command.format)?)?;
    Ok(ExitCode::SUCCESS)
}

/// Executes the config schema command.
fn command_config_schema() -> CliResult<ExitCode> {
    let schema = serde_json::to_string_pretty(&config_schema())
        .map_err(|err| CliError::new(format!("failed to render schema: {err}")))?;
    write_stdout_text(&schema)?;
    Ok(ExitCode::SUCCESS)
}

/// Executes the config example command.
fn command_config_example() -> CliResult<ExitCode> {
    write_stdout_text(&config_toml_example())?;
    Ok(ExitCode::SUCCESS)
}

/// Renders a resolved configuration in the requested format.
fn render_config(config: &RunConfiguration, format: ShowFormat) -> CliResult<String> {
    match format {
        ShowFormat::Toml => config.to_toml_string().map_err(render_error),
        ShowFormat::Json => {
            let value = config.to_json_value().map_err(render_error)?;
            serde_json::to_string_pretty(&value).map_err(render_error)
        }
    }
}

/// Wraps a rendering failure.
fn render_error(err: impl std::fmt::Display) -> CliError {
    CliError::new(format!("failed to render config: {err}"))
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Writes text to stdout, ensuring a single trailing newline.
fn write_stdout_text(text: &str) -> CliResult<()> {
    let mut stdout = std::io::stdout();
    let result = if text.ends_with('\n') {
        stdout.write_all(text.as_bytes())
    } else {
        writeln!(&mut stdout, "{text}")
    };
    result.map_err(|err| CliError::new(output_error("stdout", &err)))
}

/// Writes a line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Formats an output error message.
fn output_error(stream: &str, error: &std::io::Error) -> String {
    format!("failed to write to {stream}: {error}")
}

/// Emits an error message and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}
