use std::path::Path;

use serde_json::{Value, json};
use thiserror::Error;

use crate::contracts::types::{ImportIssue, ImportSummary};

pub(crate) const IMPORT_HELP_COMMAND: &str = "motopecas import --help";

#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct ClientError {
    pub code: String,
    pub message: String,
    pub recovery_steps: Vec<String>,
    pub data: Option<Value>,
}

impl ClientError {
    pub fn new(code: &str, message: &str, recovery_steps: Vec<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.to_string(),
            recovery_steps,
            data: None,
        }
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn invalid_argument(message: &str) -> Self {
        Self::invalid_argument_for_command(message, None)
    }

    pub fn invalid_argument_for_command(message: &str, command: Option<&str>) -> Self {
        let help_hint = match command {
            Some(cmd) => format!("Run `motopecas {cmd} --help` for usage."),
            None => "Run `motopecas --help` for usage.".to_string(),
        };
        let error = Self::new("invalid_argument", message, vec![help_hint]);
        if let Some(cmd) = command {
            return error.with_data(json!({
                "command_hint": cmd,
            }));
        }
        error
    }

    pub fn invalid_argument_with_recovery(message: &str, recovery_steps: Vec<String>) -> Self {
        Self::new("invalid_argument", message, recovery_steps)
    }

    pub fn transaction_not_found(id: &str) -> Self {
        Self::new(
            "transaction_not_found",
            &format!("Transaction `{id}` was not found."),
            vec![
                "Run motopecas transaction list to find a valid transaction id.".to_string(),
                "Retry with the id exactly as listed.".to_string(),
            ],
        )
        .with_data(json!({
            "transaction_id": id,
        }))
    }

    pub fn employee_not_found(id: &str) -> Self {
        Self::new(
            "employee_not_found",
            &format!("Employee `{id}` was not found."),
            vec![
                "Run motopecas employee list to find a valid employee id.".to_string(),
                "Retry with the id exactly as listed.".to_string(),
            ],
        )
        .with_data(json!({
            "employee_id": id,
        }))
    }

    pub fn invalid_import_format(message: &str, received_format: &str) -> Self {
        Self::invalid_argument_with_recovery(
            message,
            vec![
                "Provide a supported import format (JSON array or CSV).".to_string(),
                format!("Run `{IMPORT_HELP_COMMAND}` to confirm field requirements."),
            ],
        )
        .with_data(json!({
            "received_format": received_format,
            "supported_formats": ["json_array", "csv"],
            "help_command": IMPORT_HELP_COMMAND,
        }))
    }

    pub fn import_schema_mismatch(expected_headers: Vec<String>, actual_headers: Vec<String>) -> Self {
        Self::new(
            "import_schema_mismatch",
            "CSV headers do not satisfy the import schema.",
            vec![
                "Include all required headers; optional headers may be omitted.".to_string(),
                "Do not include unknown headers.".to_string(),
                "Rerun `motopecas import --dry-run <path>`.".to_string(),
            ],
        )
        .with_data(json!({
            "expected_headers": expected_headers,
            "actual_headers": actual_headers,
            "help_command": IMPORT_HELP_COMMAND,
        }))
    }

    pub fn import_validation_failed(summary: ImportSummary, issues: Vec<ImportIssue>) -> Self {
        let issue_count = summary.rows_invalid;
        Self::new(
            "import_validation_failed",
            &format!(
                "Import failed validation: {issue_count} rows need fixes. No rows were written."
            ),
            vec![
                "Fix the listed issues in your source file.".to_string(),
                "Rerun motopecas import --dry-run <path>.".to_string(),
                "Then rerun motopecas import <path>.".to_string(),
            ],
        )
        .with_data(json!({
            "summary": summary,
            "issues": issues,
            "help_command": IMPORT_HELP_COMMAND,
        }))
    }

    pub fn fee_schedule_invalid(path: &Path, detail: &str) -> Self {
        let location = path.display().to_string();
        Self::new(
            "fee_schedule_invalid",
            &format!("Fee schedule at `{location}` could not be read: {detail}"),
            vec![
                format!("Fix the JSON in `{location}` or remove it to use the built-in rates."),
            ],
        )
    }

    pub fn fee_rate_not_found(acquirer: &str, brand: &str) -> Self {
        Self::new(
            "fee_rate_not_found",
            &format!("No fee rate is configured for acquirer `{acquirer}` and brand `{brand}`."),
            vec![
                "Pass the rate explicitly with `--rate <percent>`.".to_string(),
                "Or add the acquirer/brand pair to fees.json in your ledger home.".to_string(),
            ],
        )
        .with_data(json!({
            "acquirer": acquirer,
            "brand": brand,
        }))
    }

    pub fn internal_serialization(message: &str) -> Self {
        Self::new("internal_serialization_error", message, Vec::new())
    }

    pub fn ledger_init_permission_denied(path: &Path, detail: &str) -> Self {
        let location = path.display();
        Self::new(
            "ledger_init_permission_denied",
            &format!("No write access to the ledger at `{location}` ({detail})."),
            vec![format!(
                "Make `{location}` writable, or point `MOTOPECAS_HOME` at a directory you own."
            )],
        )
    }

    pub fn ledger_locked(path: &Path) -> Self {
        let location = path.display();
        Self::new(
            "ledger_locked",
            &format!("Another process holds the ledger lock on `{location}`."),
            vec![
                "Wait for the other motopecas command to finish, then retry.".to_string(),
                format!("If nothing else is running, close any SQLite tool that has `{location}` open."),
            ],
        )
    }

    pub fn ledger_corrupt(path: &Path) -> Self {
        let location = path.display();
        Self::new(
            "ledger_corrupt",
            &format!("`{location}` is not a usable motopecas ledger."),
            vec![
                format!("Restore `{location}` from a backup."),
                "Or move it aside so an empty ledger is created on the next run.".to_string(),
            ],
        )
    }

    pub fn migration_failed(path: &Path, detail: &str) -> Self {
        Self::new(
            "migration_failed",
            &format!("Could not upgrade the ledger schema in `{}`: {detail}", path.display()),
            vec!["Back up the ledger file and report the error details.".to_string()],
        )
    }

    pub fn ledger_init_failed(path: &Path, detail: &str) -> Self {
        Self::new(
            "ledger_init_failed",
            &format!("Could not open the ledger at `{}`: {detail}", path.display()),
            Vec::new(),
        )
    }
}

pub type ClientResult<T> = Result<T, ClientError>;
