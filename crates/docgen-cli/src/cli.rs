use std::ffi::OsString;
use std::process::ExitCode;

use clap::{Arg, ArgAction, ArgMatches, Command};

use crate::commands;
use crate::context::CliSession;
use crate::error::{CliError, ExitStatus};
use crate::formatter::{OutputFormat, emit_result};
use crate::util::Verbosity;

const NAME: &str = "docgen";

pub fn run() -> ExitCode {
    init_tracing();
    match run_cli(std::env::args()) {
        Ok(code) => code,
        Err(err) => {
            err.print();
            err.exit_code()
        }
    }
}

/// Parses arguments, resolves the storage root, and dispatches to a command.
/// Returns a `sysexits`-compatible `ExitCode`.
pub fn run_cli<I, S>(args: I) -> Result<ExitCode, CliError>
where
    I: IntoIterator<Item = S>,
    S: Into<OsString> + Clone,
{
    let command = build_cli();
    let matches = command.try_get_matches_from(args)?;

    let verbosity = Verbosity {
        json: matches.get_flag("json"),
        verbose: matches.get_flag("verbose"),
    };
    let output = if verbosity.json {
        OutputFormat::Json
    } else {
        OutputFormat::Text
    };

    let root_override = matches.get_one::<String>("root").cloned();
    let session = CliSession::bootstrap(root_override, verbosity)?;
    if session.verbosity.verbose {
        let config = session.manager.config();
        tracing::info!(
            root = %session.paths.root().display(),
            exports = %session.paths.exports_dir().display(),
            max_documents = config.max_documents,
            max_file_size = config.max_file_size,
            "resolved storage context"
        );
    }

    let result = dispatch(&session, &matches)?;
    emit_result(result, output)
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init();
}

fn build_cli() -> Command {
    Command::new(NAME)
        .about("Structured document store with automatic numbering")
        .arg(
            Arg::new("root")
                .long("root")
                .value_name("PATH")
                .global(true)
                .help("Storage root directory. Defaults to $DOCGEN_ROOT_DIR."),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .action(ArgAction::SetTrue)
                .global(true)
                .help("Emit newline-delimited JSON instead of human-readable text."),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .action(ArgAction::SetTrue)
                .global(true)
                .help("Log the resolved storage root and limits."),
        )
        .subcommand_required(true)
        .subcommand(commands::doc::command())
        .subcommand(commands::chapter::command())
        .subcommand(commands::section::command())
        .subcommand(commands::figure::command())
        .subcommand(commands::table::command())
}

fn dispatch(
    session: &CliSession,
    matches: &ArgMatches,
) -> Result<commands::CommandResult, CliError> {
    match matches.subcommand() {
        Some(("doc", sub)) => commands::doc::run(session, sub),
        Some(("chapter", sub)) => commands::chapter::run(session, sub),
        Some(("section", sub)) => commands::section::run(session, sub),
        Some(("figure", sub)) => commands::figure::run(session, sub),
        Some(("table", sub)) => commands::table::run(session, sub),
        _ => Err(CliError::new("missing command", ExitStatus::Usage)),
    }
}
