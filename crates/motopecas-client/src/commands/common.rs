use std::path::Path;

use chrono::{Local, NaiveDate};
use rust_decimal::Decimal;

use crate::contracts::types::{LedgerContext, TransactionRow};
use crate::ledger::{LedgerSnapshot, Transaction};
use crate::reports::date::{format_iso_date, parse_iso_date_strict};
use crate::reports::policy::MAX_MONEY_AMOUNT;
use crate::setup::{SetupContext, ensure_initialized, ensure_initialized_at};
use crate::{ClientError, ClientResult};

pub(crate) const UNKNOWN_EMPLOYEE_LABEL: &str = "unknown employee";

const REQUIRED_IMPORT_FIELDS: [(&str, &str); 4] = [
    ("date", "date"),
    ("description", "string"),
    ("amount", "number"),
    ("type", "string"),
];

const OPTIONAL_IMPORT_FIELDS: [(&str, &str); 4] = [
    ("category", "string|null"),
    ("employee_id", "string|null"),
    ("payment_method", "string|null"),
    ("installments", "integer|null"),
];

pub(crate) fn required_import_field_names() -> Vec<&'static str> {
    REQUIRED_IMPORT_FIELDS
        .iter()
        .map(|(name, _)| *name)
        .collect()
}

pub(crate) fn optional_import_field_names() -> Vec<&'static str> {
    OPTIONAL_IMPORT_FIELDS
        .iter()
        .map(|(name, _)| *name)
        .collect()
}

pub(crate) fn load_setup(home_override: Option<&Path>) -> ClientResult<SetupContext> {
    match home_override {
        Some(path) => ensure_initialized_at(path),
        None => ensure_initialized(),
    }
}

pub(crate) fn ledger_context(setup: &SetupContext, ledger_version: u64) -> LedgerContext {
    LedgerContext {
        db_path: setup.db_path.display().to_string(),
        schema_version: setup.schema_version.clone(),
        ledger_version,
        data_range: setup.data_range.clone(),
    }
}

/// `value` as an ISO date, or today's local date when absent.
pub(crate) fn reference_date(value: Option<&str>, command: &str) -> ClientResult<NaiveDate> {
    match value {
        Some(raw) => parse_iso_date_strict(raw, "date", command),
        None => Ok(Local::now().date_naive()),
    }
}

/// A money amount typed by the user: non-negative, at most two decimals,
/// no larger than [`MAX_MONEY_AMOUNT`].
pub(crate) fn parse_money(value: &str, field_name: &str, command: &str) -> ClientResult<Decimal> {
    let amount = parse_decimal(value, field_name, command)?;
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(ClientError::invalid_argument_for_command(
            &format!("`{field_name}` must not be negative."),
            Some(command),
        ));
    }
    if amount.normalize().scale() > 2 {
        return Err(ClientError::invalid_argument_for_command(
            &format!("`{field_name}` must use at most 2 decimal places."),
            Some(command),
        ));
    }
    if amount > MAX_MONEY_AMOUNT {
        return Err(ClientError::invalid_argument_for_command(
            &format!("`{field_name}` must not exceed {MAX_MONEY_AMOUNT}."),
            Some(command),
        ));
    }
    Ok(amount)
}

pub(crate) fn parse_percent(value: &str, field_name: &str, command: &str) -> ClientResult<Decimal> {
    let percent = parse_decimal(value, field_name, command)?;
    if percent < Decimal::ZERO || percent > Decimal::ONE_HUNDRED {
        return Err(ClientError::invalid_argument_for_command(
            &format!("`{field_name}` must be a percentage between 0 and 100."),
            Some(command),
        ));
    }
    Ok(percent)
}

pub(crate) fn parse_decimal(value: &str, field_name: &str, command: &str) -> ClientResult<Decimal> {
    value.trim().parse::<Decimal>().map_err(|_| {
        ClientError::invalid_argument_for_command(
            &format!("`{field_name}` must be a decimal number (e.g. 1200.50); got `{value}`."),
            Some(command),
        )
    })
}

pub(crate) fn required_text(value: &str, field_name: &str, command: &str) -> ClientResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ClientError::invalid_argument_for_command(
            &format!("`{field_name}` must not be empty."),
            Some(command),
        ));
    }
    Ok(trimmed.to_string())
}

pub(crate) fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|raw| raw.trim().to_string())
        .filter(|trimmed| !trimmed.is_empty())
}

pub(crate) fn transaction_row(transaction: &Transaction, snapshot: &LedgerSnapshot) -> TransactionRow {
    let employee_name = transaction.kind.employee_id().map(|employee_id| {
        snapshot
            .employee(employee_id)
            .map(|employee| employee.name.clone())
            .unwrap_or_else(|| UNKNOWN_EMPLOYEE_LABEL.to_string())
    });

    TransactionRow {
        id: transaction.id.clone(),
        date: format_iso_date(&transaction.date),
        description: transaction.description.clone(),
        amount: transaction.amount,
        txn_type: transaction.kind.code().to_string(),
        category: transaction.category_label().to_string(),
        employee_id: transaction.kind.employee_id().map(str::to_string),
        employee_name,
        payment_method: transaction
            .payment
            .as_ref()
            .map(|payment| payment.method.clone()),
        installments: transaction
            .payment
            .as_ref()
            .and_then(|payment| payment.installments),
    }
}
