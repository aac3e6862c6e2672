use std::path::Path;

use crate::ClientResult;
use crate::commands::common::{ledger_context, load_setup, reference_date};
use crate::contracts::envelope::{SuccessEnvelope, success};
use crate::contracts::types::DashData;
use crate::ledger::{LedgerRepository, SqliteLedger};
use crate::reports::date::format_iso_date;
use crate::reports::dashboard::Dashboard;

#[derive(Debug, Default)]
pub struct DashOptions<'a> {
    /// Reference date (YYYY-MM-DD); today when absent.
    pub date: Option<String>,
    pub home_override: Option<&'a Path>,
}

pub fn run(date: Option<String>) -> ClientResult<SuccessEnvelope> {
    run_with_options(DashOptions {
        date,
        home_override: None,
    })
}

#[doc(hidden)]
pub fn run_with_options(options: DashOptions<'_>) -> ClientResult<SuccessEnvelope> {
    let reference = reference_date(options.date.as_deref(), "dash")?;
    let setup = load_setup(options.home_override)?;
    let snapshot = SqliteLedger::open(&setup)?.snapshot()?;
    let report = Dashboard::build(&snapshot, reference);

    success(
        "dash",
        DashData {
            reference_date: format_iso_date(&reference),
            ledger: ledger_context(&setup, snapshot.version),
            report,
        },
    )
}
