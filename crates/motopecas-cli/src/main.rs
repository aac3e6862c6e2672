mod cli;
mod dispatch;
mod output;
mod stdout_io;

use std::process::ExitCode;

use clap::{Parser, error::ErrorKind};
use motopecas_client::ClientError;
use stdout_io::write_stdout_line;
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "MOTOPECAS_LOG";

const ROOT_HELP: &str = "motopecas - back-office ledger for a motorcycle-parts shop

Usage:
  motopecas <command>

Start here:
  motopecas dash
  motopecas employee list
  motopecas import --help";

const TOP_LEVEL_HELP: &str = "motopecas - back-office ledger for a motorcycle-parts shop

USAGE: motopecas <command> [--json]

See how the shop is doing:
  motopecas dash [--date YYYY-MM-DD]                      Totals, expense composition, top categories
  motopecas compare [--date YYYY-MM-DD]                   This month against the previous one

Record money in and out:
  motopecas transaction add --help                        Record income or an expense
  motopecas transaction list [--month YYYY-MM]            List transactions with totals
  motopecas transaction update <id> / delete <id>         Fix or remove a transaction
  motopecas import --dry-run <path>                       Check a JSON or CSV file before importing
  motopecas import <path>                                 Import every row of the file

Manage the team:
  motopecas employee add --help                           Register an employee and fixed salary
  motopecas employee list                                 Employees and total fixed payroll

Card sales:
  motopecas fee <gross> --acquirer <A> --brand <B>        Net settlement from the fee schedule
  motopecas fee <gross> --rate <percent> [--advance]      Net settlement for an explicit rate

Data lives in ~/.motopecas (override with MOTOPECAS_HOME).
Set MOTOPECAS_LOG=debug to trace ledger and report activity on stderr.
Run `motopecas <command> --help` for command usage.";

fn main() -> ExitCode {
    init_tracing();
    match run() {
        Ok(code) => code,
        Err(code) => code,
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn run() -> Result<ExitCode, ExitCode> {
    let raw_args = std::env::args().collect::<Vec<String>>();
    if raw_args.len() == 1 {
        if write_stdout_line(ROOT_HELP).is_err() {
            return Err(ExitCode::from(2));
        }
        return Ok(ExitCode::SUCCESS);
    }

    let cli = match cli::Cli::try_parse() {
        Ok(value) => value,
        Err(err) => return handle_parse_error(&raw_args, &err),
    };
    let mode = output::mode_for_command(&cli.command);

    match dispatch::dispatch(&cli) {
        Ok(success) => {
            if output::print_success(&success, mode).is_err() {
                return Err(ExitCode::from(2));
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(error) => {
            tracing::debug!(code = %error.code, "command failed");
            if output::print_failure(&error, mode).is_err() {
                return Err(ExitCode::from(2));
            }
            Err(ExitCode::from(1))
        }
    }
}

fn handle_parse_error(raw_args: &[String], err: &clap::Error) -> Result<ExitCode, ExitCode> {
    if matches!(
        err.kind(),
        ErrorKind::DisplayHelp
            | ErrorKind::DisplayVersion
            | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
    ) {
        let text = if is_top_level_help_request(raw_args) {
            TOP_LEVEL_HELP.to_string()
        } else {
            err.to_string()
        };
        if write_stdout_line(text.trim_end()).is_err() {
            return Err(ExitCode::from(2));
        }
        return Ok(ExitCode::SUCCESS);
    }

    let command_hint = command_path_from_args(raw_args);
    let clean_message = strip_clap_boilerplate(&err.to_string());
    let parse_error =
        ClientError::invalid_argument_for_command(&clean_message, command_hint.as_deref());
    let mode = infer_requested_output_mode(raw_args);
    if output::print_failure(&parse_error, mode).is_err() {
        return Err(ExitCode::from(2));
    }
    Err(ExitCode::from(1))
}

fn is_top_level_help_request(raw_args: &[String]) -> bool {
    raw_args.len() == 2 && matches!(raw_args[1].as_str(), "--help" | "-h")
}

/// Drops clap's trailing usage line and "For more information" hint.
fn strip_clap_boilerplate(message: &str) -> String {
    let trimmed = if let Some(pos) = message.find("\n\nUsage:") {
        &message[..pos]
    } else if let Some(pos) = message.find("\nFor more information") {
        &message[..pos]
    } else {
        message
    };
    trimmed
        .trim_start_matches("error: ")
        .trim_end()
        .to_string()
}

/// The known command path named by the leading positional arguments, used
/// for `motopecas <path> --help` hints.
fn command_path_from_args(raw_args: &[String]) -> Option<String> {
    let words = raw_args
        .iter()
        .skip(1)
        .take_while(|value| !value.starts_with('-'))
        .map(String::as_str)
        .collect::<Vec<&str>>();

    let hint = match words.as_slice() {
        ["transaction", sub @ ("add" | "list" | "update" | "delete"), ..]
        | ["employee", sub @ ("add" | "list" | "update" | "delete"), ..] => {
            return Some(format!("{} {sub}", words[0]));
        }
        ["transaction", ..] => "transaction",
        ["employee", ..] => "employee",
        ["dash", ..] => "dash",
        ["compare", ..] => "compare",
        ["fee", ..] => "fee",
        ["import", ..] => "import",
        _ => return None,
    };
    Some(hint.to_string())
}

fn infer_requested_output_mode(raw_args: &[String]) -> output::OutputMode {
    if raw_args.iter().skip(1).any(|value| value == "--json") {
        return output::OutputMode::Json;
    }
    output::OutputMode::Text
}
