// gemini-files-cli/src/main.rs
// ============================================================================
// Module: Gemini Files CLI Entry Point
// Description: Argument parsing, startup resolution, and exit-code mapping.
// Purpose: Run one file verb per invocation.
// Dependencies: clap, gemini-files-cli, gemini-files-core, thiserror, tokio
// ============================================================================

//! ## Overview
//! `gemini-files` accepts each verb directly (`gemini-files list`) or under
//! the `files` group (`gemini-files files list`). Global flags are resolved
//! against the environment once, then the verb runs through
//! [`gemini_files_cli::commands::execute`].
//!
//! Exit codes: 0 success, 2 validation or usage error, 3 auth failure,
//! 4 backend API failure, 5 network failure, 1 anything else.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Args;
use clap::Parser;
use clap::Subcommand;
use clap::error::ErrorKind as ClapErrorKind;
use gemini_files_cli::commands::FileCommand;
use gemini_files_cli::commands::OutputFormat;
use gemini_files_cli::commands::execute;
use gemini_files_cli::t;
use gemini_files_core::EnvSnapshot;
use gemini_files_core::ErrorKind;
use gemini_files_core::FilesError;
use gemini_files_core::GeminiFilesClient;
use gemini_files_core::StartupOptions;
use gemini_files_core::resolve_startup_config;

// ============================================================================
// SECTION: Exit Codes
// ============================================================================

/// Validation or usage failure.
const EXIT_VALIDATION: u8 = 2;
/// Credential rejected.
const EXIT_AUTH: u8 = 3;
/// Backend rejected the request.
const EXIT_API: u8 = 4;
/// Transport failure.
const EXIT_NETWORK: u8 = 5;
/// Unclassified failure.
const EXIT_OTHER: u8 = 1;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(
    name = "gemini-files",
    version,
    about = "Manage Gemini Files from the command line",
    disable_help_subcommand = true
)]
struct Cli {
    /// API key (falls back to `GEMINI_API_KEY`, then `GOOGLE_API_KEY`).
    #[arg(long, value_name = "KEY", global = true)]
    api_key: Option<String>,
    /// API base URL (falls back to `GEMINI_BASE_URL`).
    #[arg(long, value_name = "URL", global = true)]
    base_url: Option<String>,
    /// Request timeout in milliseconds (falls back to `GEMINI_TIMEOUT_MS`).
    #[arg(long, value_name = "MS", global = true)]
    timeout_ms: Option<String>,
    /// Safety mode: read-only, balanced, or unsafe.
    #[arg(long, value_name = "MODE", global = true)]
    safety_mode: Option<String>,
    /// Print results as pretty JSON.
    #[arg(long, global = true)]
    json: bool,
    /// Selected verb.
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Verbs, either grouped under `files` or given directly.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Manage Gemini Files.
    Files {
        /// Selected file verb.
        #[command(subcommand)]
        command: FilesCommand,
    },
    /// File verbs given without the `files` prefix.
    #[command(flatten)]
    Direct(FilesCommand),
}

/// File verbs.
#[derive(Subcommand, Debug)]
enum FilesCommand {
    /// Upload a local file.
    Upload(UploadArgs),
    /// List files.
    List(ListArgs),
    /// Show file metadata.
    Get(NameArgs),
    /// Delete a file (requires --force).
    Delete(DeleteArgs),
    /// Download file content to a local path.
    Download(DownloadArgs),
}

/// Arguments for `upload`.
#[derive(Args, Debug)]
struct UploadArgs {
    /// Local file path.
    path: PathBuf,
    /// Display name stored with the file.
    #[arg(long, value_name = "NAME")]
    display_name: Option<String>,
    /// MIME type override.
    #[arg(long, value_name = "MIME")]
    mime_type: Option<String>,
    /// Confirm the upload.
    #[arg(long)]
    force: bool,
}

/// Arguments for `list`.
#[derive(Args, Debug)]
struct ListArgs {
    /// Number of files to return.
    #[arg(long, value_name = "N", value_parser = parse_page_size)]
    page_size: Option<u32>,
    /// Continuation token from a previous page.
    #[arg(long, value_name = "TOKEN")]
    page_token: Option<String>,
}

/// Arguments naming one file.
#[derive(Args, Debug)]
struct NameArgs {
    /// File name (`files/<id>`) or bare id.
    name: String,
}

/// Arguments for `delete`.
#[derive(Args, Debug)]
struct DeleteArgs {
    /// File name (`files/<id>`) or bare id.
    name: String,
    /// Confirm the deletion.
    #[arg(long)]
    force: bool,
}

/// Arguments for `download`.
#[derive(Args, Debug)]
struct DownloadArgs {
    /// File name (`files/<id>`) or bare id.
    name: String,
    /// Destination path.
    #[arg(long, value_name = "PATH")]
    output: PathBuf,
    /// Confirm the download.
    #[arg(long)]
    force: bool,
}

impl From<FilesCommand> for FileCommand {
    fn from(command: FilesCommand) -> Self {
        match command {
            FilesCommand::Upload(args) => Self::Upload {
                path: args.path,
                display_name: args.display_name,
                mime_type: args.mime_type,
                force: args.force,
            },
            FilesCommand::List(args) => Self::List {
                page_size: args.page_size,
                page_token: args.page_token,
            },
            FilesCommand::Get(args) => Self::Get {
                name: args.name,
            },
            FilesCommand::Delete(args) => Self::Delete {
                name: args.name,
                force: args.force,
            },
            FilesCommand::Download(args) => Self::Download {
                name: args.name,
                output: args.output,
                force: args.force,
            },
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI failure with its exit code.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
    /// Process exit code.
    exit_code: u8,
    /// Whether usage text follows the message.
    show_usage: bool,
}

impl From<FilesError> for CliError {
    fn from(error: FilesError) -> Self {
        let exit_code = match error.kind() {
            ErrorKind::Validation => EXIT_VALIDATION,
            ErrorKind::Auth => EXIT_AUTH,
            ErrorKind::Api => EXIT_API,
            ErrorKind::Network => EXIT_NETWORK,
            ErrorKind::Internal => EXIT_OTHER,
        };
        Self {
            message: error.to_string(),
            exit_code,
            show_usage: exit_code == EXIT_VALIDATION,
        }
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
#[tokio::main(flavor = "multi_thread")]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(err) => emit_error(&err),
    }
}

/// Parses arguments and runs the selected verb.
async fn run() -> CliResult<ExitCode> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => return Ok(report_clap_error(&err)),
    };
    let Some(command) = cli.command else {
        let _ = write_stdout_line(&t!("usage"));
        return Ok(ExitCode::SUCCESS);
    };
    let command = match command {
        Commands::Files {
            command,
        }
        | Commands::Direct(command) => FileCommand::from(command),
    };
    let options = StartupOptions {
        api_key: cli.api_key,
        base_url: cli.base_url,
        timeout_ms: cli.timeout_ms,
        safety_mode: cli.safety_mode,
    };
    let user_agent = format!("gemini-files-cli/{}", env!("CARGO_PKG_VERSION"));
    let resolved = resolve_startup_config(&options, &EnvSnapshot::from_process(), &user_agent)?;
    let client = GeminiFilesClient::new(resolved.client)?;
    let format = if cli.json { OutputFormat::Json } else { OutputFormat::Human };
    let mut stdout = std::io::stdout();
    execute(command, &client, resolved.safety_mode, format, &mut stdout).await?;
    Ok(ExitCode::SUCCESS)
}

/// Prints a clap error or help text and returns the matching exit code.
fn report_clap_error(err: &clap::Error) -> ExitCode {
    let _ = err.print();
    match err.kind() {
        ClapErrorKind::DisplayHelp
        | ClapErrorKind::DisplayVersion
        | ClapErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => ExitCode::SUCCESS,
        _ => ExitCode::from(EXIT_VALIDATION),
    }
}

/// Parses a positive page size.
fn parse_page_size(raw: &str) -> Result<u32, String> {
    match raw.parse::<u32>() {
        Ok(value) if value > 0 => Ok(value),
        _ => Err(t!("page_size.invalid")),
    }
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Writes a single line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes a single line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Emits an error (and usage for validation failures) and returns its exit code.
fn emit_error(err: &CliError) -> ExitCode {
    let _ = write_stderr_line(&err.message);
    if err.show_usage {
        let _ = write_stderr_line(&t!("usage"));
    }
    ExitCode::from(err.exit_code)
}
