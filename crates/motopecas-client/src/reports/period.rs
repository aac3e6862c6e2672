//! Month-over-month comparison.
//!
//! Only recorded transactions count here. Fixed payroll is not added to the
//! monthly expenses, unlike [`crate::reports::aggregate::aggregate`].

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::ledger::Transaction;
use crate::reports::date::MonthKey;
use crate::reports::policy::GROWTH_FROM_ZERO_PCT;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MonthTotals {
    pub month: MonthKey,
    pub income: Decimal,
    pub expenses: Decimal,
    pub profit: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthComparison {
    pub current: MonthTotals,
    pub previous: MonthTotals,
    pub income_growth_pct: Decimal,
    pub expense_growth_pct: Decimal,
    pub profit_growth_pct: Decimal,
    /// `[previous, current]`, oldest first.
    pub series: [MonthTotals; 2],
}

pub fn month_totals(transactions: &[Transaction], month: MonthKey) -> MonthTotals {
    let mut income = Decimal::ZERO;
    let mut expenses = Decimal::ZERO;

    for transaction in transactions.iter().filter(|row| month.contains(row.date)) {
        if transaction.kind.is_income() {
            income = income.saturating_add(transaction.amount);
        } else {
            expenses = expenses.saturating_add(transaction.amount);
        }
    }

    MonthTotals {
        month,
        income,
        expenses,
        profit: income.saturating_sub(expenses),
    }
}

/// Percentage change from `previous` to `current`.
///
/// A zero previous value has no ratio: growth is 100 when the current value
/// is positive and 0 otherwise. A ratio outside the decimal range saturates.
pub fn growth_pct(current: Decimal, previous: Decimal) -> Decimal {
    if previous.is_zero() {
        if current > Decimal::ZERO {
            return Decimal::from(GROWTH_FROM_ZERO_PCT);
        }
        return Decimal::ZERO;
    }
    let change = current.saturating_sub(previous);
    change
        .checked_div(previous)
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
        .unwrap_or_else(|| {
            if change.is_sign_negative() == previous.is_sign_negative() {
                Decimal::MAX
            } else {
                Decimal::MIN
            }
        })
}

pub fn compare_months(transactions: &[Transaction], reference_date: NaiveDate) -> MonthComparison {
    let current_month = MonthKey::of(reference_date);
    let current = month_totals(transactions, current_month);
    let previous = month_totals(transactions, current_month.previous());

    tracing::debug!(
        month = %current_month,
        transactions = transactions.len(),
        "computed month comparison"
    );

    MonthComparison {
        current,
        previous,
        income_growth_pct: growth_pct(current.income, previous.income),
        expense_growth_pct: growth_pct(current.expenses, previous.expenses),
        profit_growth_pct: growth_pct(current.profit, previous.profit),
        series: [previous, current],
    }
}
