use chrono::NaiveDate;
use serde::Serialize;

use crate::ledger::LedgerSnapshot;
use crate::reports::aggregate::{
    CategoryTotal, CompositionShares, ExpenseComposition, Stats, aggregate, category_breakdown,
    composition_breakdown,
};
use crate::reports::date::MonthKey;
use crate::reports::period::{MonthComparison, compare_months};

/// Every report the dashboard shows, computed from one snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dashboard {
    pub version: u64,
    pub reference_month: MonthKey,
    pub stats: Stats,
    pub composition: ExpenseComposition,
    pub composition_shares: CompositionShares,
    pub categories: Vec<CategoryTotal>,
    pub comparison: MonthComparison,
}

impl Dashboard {
    pub fn build(snapshot: &LedgerSnapshot, reference_date: NaiveDate) -> Self {
        let stats = aggregate(&snapshot.transactions, &snapshot.employees);
        let composition = composition_breakdown(&stats);

        tracing::debug!(
            version = snapshot.version,
            transactions = snapshot.transactions.len(),
            employees = snapshot.employees.len(),
            "built dashboard"
        );

        Self {
            version: snapshot.version,
            reference_month: MonthKey::of(reference_date),
            stats,
            composition,
            composition_shares: composition.shares(),
            categories: category_breakdown(&snapshot.transactions, &snapshot.employees),
            comparison: compare_months(&snapshot.transactions, reference_date),
        }
    }
}
