use std::path::Path;

use crate::ClientResult;
use crate::commands::common::{ledger_context, load_setup, reference_date};
use crate::contracts::envelope::{SuccessEnvelope, success};
use crate::contracts::types::CompareData;
use crate::ledger::{LedgerRepository, SqliteLedger};
use crate::reports::date::format_iso_date;
use crate::reports::period::compare_months;

#[derive(Debug, Default)]
pub struct CompareOptions<'a> {
    pub date: Option<String>,
    pub home_override: Option<&'a Path>,
}

pub fn run(date: Option<String>) -> ClientResult<SuccessEnvelope> {
    run_with_options(CompareOptions {
        date,
        home_override: None,
    })
}

#[doc(hidden)]
pub fn run_with_options(options: CompareOptions<'_>) -> ClientResult<SuccessEnvelope> {
    let reference = reference_date(options.date.as_deref(), "compare")?;
    let setup = load_setup(options.home_override)?;
    let snapshot = SqliteLedger::open(&setup)?.snapshot()?;

    success(
        "compare",
        CompareData {
            reference_date: format_iso_date(&reference),
            ledger: ledger_context(&setup, snapshot.version),
            comparison: compare_months(&snapshot.transactions, reference),
        },
    )
}
