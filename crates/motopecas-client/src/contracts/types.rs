use rust_decimal::Decimal;
use serde::Serialize;

use crate::ledger::Employee;
use crate::reports::dashboard::Dashboard;
use crate::reports::fees::FeeBreakdown;
use crate::reports::period::MonthComparison;

#[derive(Debug, Clone, Serialize)]
pub struct DataRange {
    pub earliest: Option<String>,
    pub latest: Option<String>,
}

/// Where a command read its ledger from, and at which version.
#[derive(Debug, Clone, Serialize)]
pub struct LedgerContext {
    pub db_path: String,
    pub schema_version: String,
    pub ledger_version: u64,
    pub data_range: DataRange,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashData {
    pub reference_date: String,
    pub ledger: LedgerContext,
    pub report: Dashboard,
}

#[derive(Debug, Clone, Serialize)]
pub struct CompareData {
    pub reference_date: String,
    pub ledger: LedgerContext,
    pub comparison: MonthComparison,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FeeRateSource {
    Explicit,
    Schedule,
}

#[derive(Debug, Clone, Serialize)]
pub struct FeeData {
    pub rate_source: FeeRateSource,
    pub acquirer: Option<String>,
    pub brand: Option<String>,
    pub fee_rate_percent: Decimal,
    pub apply_advance: bool,
    pub advance_rate_percent: Decimal,
    pub breakdown: FeeBreakdown,
}

#[derive(Debug, Clone, Serialize)]
pub struct TransactionRow {
    pub id: String,
    pub date: String,
    pub description: String,
    pub amount: Decimal,
    #[serde(rename = "type")]
    pub txn_type: String,
    pub category: String,
    pub employee_id: Option<String>,
    /// Resolved name; `unknown employee` when the id has no match.
    pub employee_name: Option<String>,
    pub payment_method: Option<String>,
    pub installments: Option<u32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TransactionListData {
    pub month: Option<String>,
    pub ledger_version: u64,
    pub total_income: Decimal,
    pub total_expense: Decimal,
    pub rows: Vec<TransactionRow>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MutationAction {
    Added,
    Updated,
    Deleted,
}

#[derive(Debug, Clone, Serialize)]
pub struct TransactionMutationData {
    pub action: MutationAction,
    pub id: String,
    pub ledger_version: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction: Option<TransactionRow>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EmployeeListData {
    pub ledger_version: u64,
    pub total_fixed_payroll: Decimal,
    pub rows: Vec<Employee>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EmployeeMutationData {
    pub action: MutationAction,
    pub id: String,
    pub ledger_version: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub employee: Option<Employee>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImportData {
    pub dry_run: bool,
    pub path: Option<String>,
    pub message: String,
    pub summary: ImportSummary,
    pub issues: Vec<ImportIssue>,
    pub transaction_ids: Vec<String>,
    pub ledger_version: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_step: Option<ImportNextStep>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImportNextStep {
    pub label: String,
    pub command: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub rows_read: i64,
    pub rows_valid: i64,
    pub rows_invalid: i64,
    pub inserted: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportIssue {
    pub row: i64,
    pub field: String,
    pub code: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub received: Option<String>,
}
