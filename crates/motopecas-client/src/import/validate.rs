use std::collections::HashSet;

use rust_decimal::Decimal;

use crate::contracts::types::{ImportIssue, ImportSummary};
use crate::import::parse::ParsedRow;
use crate::ledger::{NewTransaction, PaymentDetails, TransactionKind};
use crate::reports::date::parse_iso_date;
use crate::reports::policy::MAX_MONEY_AMOUNT;
use crate::{ClientError, ClientResult};

const AMOUNT_EXPECTATION: &str = "non-negative number with <= 2 decimal places (e.g. 1200.50)";

#[derive(Debug, Clone)]
pub(crate) struct ValidatedRows {
    pub(crate) rows: Vec<NewTransaction>,
    pub(crate) summary: ImportSummary,
}

/// Checks every row and collects all issues before failing, so one run
/// reports everything that needs fixing.
pub(crate) fn validate_rows(parsed_rows: Vec<ParsedRow>) -> ClientResult<ValidatedRows> {
    let total_rows = parsed_rows.len();
    let mut rows = Vec::new();
    let mut issues = Vec::new();

    for raw in parsed_rows {
        let mut row_issues = Vec::new();

        let date = validate_date(raw.row, raw.date, &mut row_issues);
        let description = validate_required_string(
            raw.row,
            "description",
            raw.description,
            &mut row_issues,
            "description must be present and non-empty.",
        );
        let amount = validate_amount(raw.row, raw.amount, &mut row_issues);
        let kind = validate_kind(raw.row, raw.txn_type, raw.employee_id, &mut row_issues);
        let payment = validate_payment(
            raw.row,
            raw.payment_method,
            raw.installments,
            &mut row_issues,
        );
        let category = normalize_optional(raw.category);

        match (date, description, amount, kind) {
            (Some(date), Some(description), Some(amount), Some(kind)) if row_issues.is_empty() => {
                rows.push(NewTransaction {
                    date,
                    description,
                    amount,
                    kind,
                    category,
                    payment,
                });
            }
            _ => issues.extend(row_issues),
        }
    }

    let summary = ImportSummary {
        rows_read: total_rows as i64,
        rows_valid: rows.len() as i64,
        rows_invalid: issues
            .iter()
            .map(|issue| issue.row)
            .collect::<HashSet<i64>>()
            .len() as i64,
        inserted: 0,
    };

    if !issues.is_empty() {
        return Err(ClientError::import_validation_failed(summary, issues));
    }

    Ok(ValidatedRows { rows, summary })
}

fn validate_required_string(
    row: i64,
    field: &str,
    value: Option<String>,
    issues: &mut Vec<ImportIssue>,
    description: &str,
) -> Option<String> {
    let normalized = normalize_optional(value);
    if normalized.is_none() {
        issues.push(missing_field(row, field, description, "non-empty string"));
    }
    normalized
}

fn validate_date(
    row: i64,
    value: Option<String>,
    issues: &mut Vec<ImportIssue>,
) -> Option<chrono::NaiveDate> {
    let Some(candidate) = normalize_optional(value) else {
        issues.push(missing_field(
            row,
            "date",
            "date must be present and non-empty.",
            "YYYY-MM-DD",
        ));
        return None;
    };

    let parsed = parse_iso_date(&candidate);
    if parsed.is_none() {
        issues.push(ImportIssue {
            row,
            field: "date".to_string(),
            code: "invalid_date".to_string(),
            description: format!("date must be a real calendar date in YYYY-MM-DD; got \"{candidate}\""),
            expected: Some("YYYY-MM-DD".to_string()),
            received: Some(candidate),
        });
    }
    parsed
}

fn validate_amount(row: i64, value: Option<String>, issues: &mut Vec<ImportIssue>) -> Option<Decimal> {
    let Some(candidate) = normalize_optional(value) else {
        issues.push(missing_field(
            row,
            "amount",
            "amount must be present and non-empty.",
            AMOUNT_EXPECTATION,
        ));
        return None;
    };

    let Ok(amount) = candidate.parse::<Decimal>() else {
        issues.push(amount_issue(
            row,
            "invalid_number",
            format!("amount must be numeric; got \"{candidate}\""),
            candidate,
        ));
        return None;
    };

    if amount.is_sign_negative() && !amount.is_zero() {
        issues.push(amount_issue(
            row,
            "negative_amount",
            "amount must not be negative; the type decides whether it is income or expense."
                .to_string(),
            candidate,
        ));
        return None;
    }

    let scale = amount.normalize().scale();
    if scale > 2 {
        issues.push(amount_issue(
            row,
            "invalid_amount_scale",
            format!("amount must use at most 2 decimal places; got {scale} decimal places."),
            candidate,
        ));
        return None;
    }

    if amount > MAX_MONEY_AMOUNT {
        issues.push(amount_issue(
            row,
            "amount_too_large",
            format!("amount must not exceed {MAX_MONEY_AMOUNT}."),
            candidate,
        ));
        return None;
    }

    Some(amount)
}

fn validate_kind(
    row: i64,
    txn_type: Option<String>,
    employee_id: Option<String>,
    issues: &mut Vec<ImportIssue>,
) -> Option<TransactionKind> {
    let Some(code) = normalize_optional(txn_type) else {
        issues.push(missing_field(
            row,
            "type",
            "type must be present and non-empty.",
            "INCOME | EXPENSE_SHOP | EXPENSE_EMPLOYEE",
        ));
        return None;
    };

    let employee_id = normalize_optional(employee_id);
    match TransactionKind::from_code(&code, employee_id.as_deref()) {
        Ok(kind) => Some(kind),
        Err(error) => {
            let field = if employee_id.is_some() || code.eq_ignore_ascii_case("EXPENSE_EMPLOYEE") {
                "employee_id"
            } else {
                "type"
            };
            issues.push(ImportIssue {
                row,
                field: field.to_string(),
                code: "invalid_type".to_string(),
                description: error.message,
                expected: Some("INCOME | EXPENSE_SHOP | EXPENSE_EMPLOYEE (with employee_id)".to_string()),
                received: Some(code),
            });
            None
        }
    }
}

fn validate_payment(
    row: i64,
    payment_method: Option<String>,
    installments: Option<String>,
    issues: &mut Vec<ImportIssue>,
) -> Option<PaymentDetails> {
    let method = normalize_optional(payment_method);
    let installments = match normalize_optional(installments) {
        None => None,
        Some(raw) => match raw.parse::<u32>() {
            Ok(value) if value > 0 => Some(value),
            _ => {
                issues.push(ImportIssue {
                    row,
                    field: "installments".to_string(),
                    code: "invalid_installments".to_string(),
                    description: format!("installments must be a positive integer; got \"{raw}\""),
                    expected: Some("positive integer".to_string()),
                    received: Some(raw),
                });
                return None;
            }
        },
    };

    match method {
        Some(method) => Some(PaymentDetails {
            method,
            installments,
        }),
        None => {
            if installments.is_some() {
                issues.push(missing_field(
                    row,
                    "payment_method",
                    "payment_method is required when installments is set.",
                    "non-empty string",
                ));
            }
            None
        }
    }
}

fn missing_field(row: i64, field: &str, description: &str, expected: &str) -> ImportIssue {
    ImportIssue {
        row,
        field: field.to_string(),
        code: "missing_required_field".to_string(),
        description: description.to_string(),
        expected: Some(expected.to_string()),
        received: Some(String::new()),
    }
}

fn amount_issue(row: i64, code: &str, description: String, received: String) -> ImportIssue {
    ImportIssue {
        row,
        field: "amount".to_string(),
        code: code.to_string(),
        description,
        expected: Some(AMOUNT_EXPECTATION.to_string()),
        received: Some(received),
    }
}

fn normalize_optional(value: Option<String>) -> Option<String> {
    let raw = value?;
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.to_string())
}
