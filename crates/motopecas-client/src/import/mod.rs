pub(crate) mod input;
pub(crate) mod parse;
pub(crate) mod validate;

use serde_json::json;

use crate::contracts::types::{ImportData, ImportNextStep, ImportSummary};
use crate::error::IMPORT_HELP_COMMAND;
use crate::ledger::{LedgerChange, LedgerRepository, SqliteLedger};
use crate::setup::SetupContext;
use crate::{ClientError, ClientResult};

/// Reads, validates, and (unless `dry_run`) commits one import source.
///
/// Any invalid row fails the whole import before the ledger is touched.
pub(crate) fn execute(
    setup: &SetupContext,
    path: Option<String>,
    dry_run: bool,
    stdin_override: Option<String>,
) -> ClientResult<ImportData> {
    let resolved_source = input::resolve_source(path.clone(), stdin_override)?;
    let parsed_rows = parse::parse_source(&resolved_source.content)?;
    let validated = validate::validate_rows(parsed_rows)?;

    let mut ledger = SqliteLedger::open(setup)?;

    if dry_run {
        let ledger_version = ledger.snapshot()?.version;
        let commit_command = match resolved_source.source_kind {
            input::SourceKind::Stdin => "motopecas import -",
            input::SourceKind::File => "motopecas import <path>",
        };
        return Ok(ImportData {
            dry_run: true,
            path,
            message: "Validation passed. No rows were written.".to_string(),
            summary: validated.summary,
            issues: Vec::new(),
            transaction_ids: Vec::new(),
            ledger_version,
            next_step: Some(ImportNextStep {
                label: "Commit this import".to_string(),
                command: commit_command.to_string(),
            }),
        });
    }

    let changes = validated
        .rows
        .into_iter()
        .map(LedgerChange::AddTransaction)
        .collect::<Vec<LedgerChange>>();
    let receipts = ledger.commit_all(changes)?;
    let ledger_version = match receipts.last() {
        Some(receipt) => receipt.version,
        None => ledger.snapshot()?.version,
    };

    let inserted = receipts.len() as i64;
    tracing::info!(
        inserted,
        ledger_version,
        source = resolved_source.source_kind.as_str(),
        "import committed"
    );

    let message = if inserted == 0 {
        "Import source had no rows. Nothing was written.".to_string()
    } else {
        format!("Imported {inserted} transactions.")
    };

    Ok(ImportData {
        dry_run: false,
        path,
        message,
        summary: ImportSummary {
            inserted,
            ..validated.summary
        },
        issues: Vec::new(),
        transaction_ids: receipts.into_iter().map(|receipt| receipt.id).collect(),
        ledger_version,
        next_step: Some(ImportNextStep {
            label: "Review the dashboard".to_string(),
            command: "motopecas dash".to_string(),
        }),
    })
}

pub(crate) fn invalid_input_error(message: &str) -> ClientError {
    ClientError::invalid_argument_with_recovery(
        message,
        vec![
            "Provide JSON array or CSV input via path or stdin.".to_string(),
            format!("Run `{IMPORT_HELP_COMMAND}` to confirm import field requirements."),
        ],
    )
    .with_data(json!({
        "help_command": IMPORT_HELP_COMMAND,
    }))
}
