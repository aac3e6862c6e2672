use std::path::Path;

use rust_decimal::Decimal;

use crate::commands::common::{
    load_setup, optional_text, parse_money, reference_date, required_text, transaction_row,
};
use crate::contracts::envelope::{SuccessEnvelope, success};
use crate::contracts::types::{
    MutationAction, TransactionListData, TransactionMutationData, TransactionRow,
};
use crate::ledger::{
    LedgerChange, LedgerRepository, LedgerSnapshot, NewTransaction, PaymentDetails, SqliteLedger,
    TransactionKind,
};
use crate::reports::date::{parse_iso_date_strict, parse_month_strict};
use crate::{ClientError, ClientResult};

#[derive(Debug, Default)]
pub struct TransactionAddOptions<'a> {
    /// YYYY-MM-DD; today when absent.
    pub date: Option<String>,
    pub description: String,
    pub amount: String,
    pub txn_type: String,
    pub employee_id: Option<String>,
    pub category: Option<String>,
    pub payment_method: Option<String>,
    pub installments: Option<u32>,
    pub home_override: Option<&'a Path>,
}

#[derive(Debug, Default)]
pub struct TransactionListOptions<'a> {
    /// YYYY-MM filter.
    pub month: Option<String>,
    pub home_override: Option<&'a Path>,
}

/// Fields left as `None` keep their stored value.
#[derive(Debug, Default)]
pub struct TransactionUpdateOptions<'a> {
    pub id: String,
    pub date: Option<String>,
    pub description: Option<String>,
    pub amount: Option<String>,
    pub txn_type: Option<String>,
    pub employee_id: Option<String>,
    pub category: Option<String>,
    pub payment_method: Option<String>,
    pub installments: Option<u32>,
    pub home_override: Option<&'a Path>,
}

#[derive(Debug, Default)]
pub struct TransactionDeleteOptions<'a> {
    pub id: String,
    pub home_override: Option<&'a Path>,
}

pub fn add(options: TransactionAddOptions<'_>) -> ClientResult<SuccessEnvelope> {
    add_with_options(options)
}

pub fn list(month: Option<String>) -> ClientResult<SuccessEnvelope> {
    list_with_options(TransactionListOptions {
        month,
        home_override: None,
    })
}

pub fn update(options: TransactionUpdateOptions<'_>) -> ClientResult<SuccessEnvelope> {
    update_with_options(options)
}

pub fn delete(id: &str) -> ClientResult<SuccessEnvelope> {
    delete_with_options(TransactionDeleteOptions {
        id: id.to_string(),
        home_override: None,
    })
}

#[doc(hidden)]
pub fn add_with_options(options: TransactionAddOptions<'_>) -> ClientResult<SuccessEnvelope> {
    let command = "transaction add";
    let date = reference_date(options.date.as_deref(), command)?;
    let description = required_text(&options.description, "description", command)?;
    let amount = parse_money(&options.amount, "amount", command)?;
    let kind = parse_kind(&options.txn_type, options.employee_id.as_deref(), command)?;
    let payment = payment_details(options.payment_method, options.installments, command)?;

    let setup = load_setup(options.home_override)?;
    let mut ledger = SqliteLedger::open(&setup)?;
    let receipt = ledger.commit(LedgerChange::AddTransaction(NewTransaction {
        date,
        description,
        amount,
        kind,
        category: optional_text(options.category),
        payment,
    }))?;

    let snapshot = ledger.snapshot()?;
    mutation_envelope(command, MutationAction::Added, receipt.id, receipt.version, &snapshot)
}

#[doc(hidden)]
pub fn list_with_options(options: TransactionListOptions<'_>) -> ClientResult<SuccessEnvelope> {
    let command = "transaction list";
    let month = options
        .month
        .as_deref()
        .map(|value| parse_month_strict(value, "month", command))
        .transpose()?;

    let setup = load_setup(options.home_override)?;
    let snapshot = SqliteLedger::open(&setup)?.snapshot()?;

    let rows = snapshot
        .transactions
        .iter()
        .filter(|transaction| month.is_none_or(|key| key.contains(transaction.date)))
        .collect::<Vec<_>>();

    let total_income = rows
        .iter()
        .filter(|transaction| transaction.kind.is_income())
        .fold(Decimal::ZERO, |total, transaction| total.saturating_add(transaction.amount));
    let total_expense = rows
        .iter()
        .filter(|transaction| !transaction.kind.is_income())
        .fold(Decimal::ZERO, |total, transaction| total.saturating_add(transaction.amount));

    success(
        command,
        TransactionListData {
            month: month.map(|key| key.to_string()),
            ledger_version: snapshot.version,
            total_income,
            total_expense,
            rows: rows
                .iter()
                .map(|transaction| transaction_row(transaction, &snapshot))
                .collect::<Vec<TransactionRow>>(),
        },
    )
}

#[doc(hidden)]
pub fn update_with_options(options: TransactionUpdateOptions<'_>) -> ClientResult<SuccessEnvelope> {
    let command = "transaction update";
    let setup = load_setup(options.home_override)?;
    let mut ledger = SqliteLedger::open(&setup)?;
    let current = ledger
        .snapshot()?
        .transactions
        .into_iter()
        .find(|transaction| transaction.id == options.id)
        .ok_or_else(|| ClientError::transaction_not_found(&options.id))?;

    let mut updated = current.clone();
    if let Some(date) = options.date.as_deref() {
        updated.date = parse_iso_date_strict(date, "date", command)?;
    }
    if let Some(description) = options.description.as_deref() {
        updated.description = required_text(description, "description", command)?;
    }
    if let Some(amount) = options.amount.as_deref() {
        updated.amount = parse_money(amount, "amount", command)?;
    }
    if options.txn_type.is_some() || options.employee_id.is_some() {
        let code = options
            .txn_type
            .as_deref()
            .unwrap_or_else(|| current.kind.code());
        // A type change away from EXPENSE_EMPLOYEE drops the stored employee.
        let employee_id = options.employee_id.as_deref().or_else(|| {
            if code.trim().eq_ignore_ascii_case("EXPENSE_EMPLOYEE") {
                current.kind.employee_id()
            } else {
                None
            }
        });
        updated.kind = parse_kind(code, employee_id, command)?;
    }
    if options.category.is_some() {
        updated.category = optional_text(options.category);
    }
    if options.payment_method.is_some() || options.installments.is_some() {
        let method = options.payment_method.or_else(|| {
            current
                .payment
                .as_ref()
                .map(|payment| payment.method.clone())
        });
        let installments = options.installments.or_else(|| {
            current
                .payment
                .as_ref()
                .and_then(|payment| payment.installments)
        });
        updated.payment = payment_details(method, installments, command)?;
    }

    let receipt = ledger.commit(LedgerChange::UpdateTransaction(updated))?;
    let snapshot = ledger.snapshot()?;
    mutation_envelope(command, MutationAction::Updated, receipt.id, receipt.version, &snapshot)
}

#[doc(hidden)]
pub fn delete_with_options(options: TransactionDeleteOptions<'_>) -> ClientResult<SuccessEnvelope> {
    let setup = load_setup(options.home_override)?;
    let mut ledger = SqliteLedger::open(&setup)?;
    let receipt = ledger.commit(LedgerChange::DeleteTransaction(options.id))?;

    success(
        "transaction delete",
        TransactionMutationData {
            action: MutationAction::Deleted,
            id: receipt.id,
            ledger_version: receipt.version,
            transaction: None,
        },
    )
}

fn parse_kind(code: &str, employee_id: Option<&str>, command: &str) -> ClientResult<TransactionKind> {
    TransactionKind::from_code(code, employee_id).map_err(|error| {
        ClientError::invalid_argument_for_command(&error.message, Some(command))
    })
}

fn payment_details(
    method: Option<String>,
    installments: Option<u32>,
    command: &str,
) -> ClientResult<Option<PaymentDetails>> {
    if installments == Some(0) {
        return Err(ClientError::invalid_argument_for_command(
            "`installments` must be a positive integer.",
            Some(command),
        ));
    }
    match optional_text(method) {
        Some(method) => Ok(Some(PaymentDetails {
            method,
            installments,
        })),
        None if installments.is_some() => Err(ClientError::invalid_argument_for_command(
            "`installments` requires `payment-method`.",
            Some(command),
        )),
        None => Ok(None),
    }
}

fn mutation_envelope(
    command: &str,
    action: MutationAction,
    id: String,
    ledger_version: u64,
    snapshot: &LedgerSnapshot,
) -> ClientResult<SuccessEnvelope> {
    let transaction = snapshot
        .transactions
        .iter()
        .find(|transaction| transaction.id == id)
        .map(|transaction| transaction_row(transaction, snapshot));

    success(
        command,
        TransactionMutationData {
            action,
            id,
            ledger_version,
            transaction,
        },
    )
}
