//! Ledger-wide totals for the dashboard.
//!
//! Fixed payroll comes from the employee list, never from the transaction
//! list: each employee's `fixed_salary` is counted once per call whether or
//! not a matching transaction was recorded.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::ledger::{Employee, Transaction, TransactionKind};
use crate::reports::policy::{CATEGORY_BREAKDOWN_LIMIT, FIXED_SALARY_CATEGORY_LABEL};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Stats {
    pub total_income: Decimal,
    pub shop_expense: Decimal,
    pub employee_expense: Decimal,
    pub total_fixed_payroll: Decimal,
    pub total_expense: Decimal,
    pub net_balance: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryTotal {
    pub category: String,
    pub total: Decimal,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ExpenseComposition {
    pub shop: Decimal,
    pub employee_extras: Decimal,
    pub fixed_salaries: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CompositionShares {
    pub shop_pct: Decimal,
    pub employee_extras_pct: Decimal,
    pub fixed_salaries_pct: Decimal,
}

impl ExpenseComposition {
    pub fn total(&self) -> Decimal {
        self.shop
            .saturating_add(self.employee_extras)
            .saturating_add(self.fixed_salaries)
    }

    pub fn buckets(&self) -> [(&'static str, Decimal); 3] {
        [
            ("Shop", self.shop),
            ("EmployeeExtras", self.employee_extras),
            ("FixedSalaries", self.fixed_salaries),
        ]
    }

    /// Percentage of the total per bucket, rounded to two places. All zero
    /// when there is no expense at all.
    pub fn shares(&self) -> CompositionShares {
        let total = self.total();
        let share = |value: Decimal| {
            if total.is_zero() {
                Decimal::ZERO
            } else {
                value
                    .checked_div(total)
                    .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
                    .map_or(Decimal::ZERO, |pct| pct.round_dp(2))
            }
        };
        CompositionShares {
            shop_pct: share(self.shop),
            employee_extras_pct: share(self.employee_extras),
            fixed_salaries_pct: share(self.fixed_salaries),
        }
    }
}

pub fn aggregate(transactions: &[Transaction], employees: &[Employee]) -> Stats {
    let mut total_income = Decimal::ZERO;
    let mut shop_expense = Decimal::ZERO;
    let mut employee_expense = Decimal::ZERO;

    for transaction in transactions {
        match transaction.kind {
            TransactionKind::Income => {
                total_income = total_income.saturating_add(transaction.amount);
            }
            TransactionKind::ShopExpense => {
                shop_expense = shop_expense.saturating_add(transaction.amount);
            }
            TransactionKind::EmployeeExpense { .. } => {
                employee_expense = employee_expense.saturating_add(transaction.amount);
            }
        }
    }

    let total_fixed_payroll = fixed_payroll(employees);
    let total_expense = shop_expense
        .saturating_add(employee_expense)
        .saturating_add(total_fixed_payroll);

    Stats {
        total_income,
        shop_expense,
        employee_expense,
        total_fixed_payroll,
        total_expense,
        net_balance: total_income.saturating_sub(total_expense),
    }
}

pub fn fixed_payroll(employees: &[Employee]) -> Decimal {
    employees
        .iter()
        .fold(Decimal::ZERO, |total, employee| total.saturating_add(employee.fixed_salary))
}

/// Expense totals per category, largest first, capped at
/// [`CATEGORY_BREAKDOWN_LIMIT`] entries.
///
/// Income is excluded. Fixed payroll is added as its own category (merged
/// into an existing category with the same label). Equal totals keep the
/// order in which categories were first seen.
pub fn category_breakdown(transactions: &[Transaction], employees: &[Employee]) -> Vec<CategoryTotal> {
    let mut groups: Vec<CategoryTotal> = Vec::new();
    let mut index_by_label: HashMap<String, usize> = HashMap::new();

    let mut add = |label: &str, amount: Decimal| {
        if let Some(index) = index_by_label.get(label) {
            let group = &mut groups[*index];
            group.total = group.total.saturating_add(amount);
            return;
        }
        index_by_label.insert(label.to_string(), groups.len());
        groups.push(CategoryTotal {
            category: label.to_string(),
            total: amount,
        });
    };

    for transaction in transactions.iter().filter(|row| !row.kind.is_income()) {
        add(transaction.category_label(), transaction.amount);
    }

    let payroll = fixed_payroll(employees);
    if payroll > Decimal::ZERO {
        add(FIXED_SALARY_CATEGORY_LABEL, payroll);
    }

    groups.sort_by(|left, right| right.total.cmp(&left.total));
    groups.truncate(CATEGORY_BREAKDOWN_LIMIT);
    groups
}

pub fn composition_breakdown(stats: &Stats) -> ExpenseComposition {
    ExpenseComposition {
        shop: stats.shop_expense,
        employee_extras: stats.employee_expense,
        fixed_salaries: stats.total_fixed_payroll,
    }
}
