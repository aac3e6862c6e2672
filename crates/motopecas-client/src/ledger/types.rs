use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::reports::policy::DEFAULT_CATEGORY_LABEL;
use crate::{ClientError, ClientResult};

/// Kind of a ledger transaction.
///
/// Only employee expenses carry an employee reference, so a shop expense
/// pointing at an employee (or the reverse) cannot be represented.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionKind {
    Income,
    #[serde(rename = "EXPENSE_SHOP")]
    ShopExpense,
    #[serde(rename = "EXPENSE_EMPLOYEE")]
    EmployeeExpense { employee_id: String },
}

impl TransactionKind {
    /// Builds a kind from a stored or user supplied type code.
    ///
    /// `EXPENSE_COMMON` and `EXPENSE_FIXED` are older spellings of
    /// `EXPENSE_SHOP` and normalize to [`TransactionKind::ShopExpense`].
    pub fn from_code(code: &str, employee_id: Option<&str>) -> ClientResult<Self> {
        let normalized = code.trim().to_ascii_uppercase();
        let employee_id = employee_id
            .map(str::trim)
            .filter(|value| !value.is_empty());

        match (normalized.as_str(), employee_id) {
            ("INCOME", None) => Ok(Self::Income),
            ("EXPENSE_SHOP" | "EXPENSE_COMMON" | "EXPENSE_FIXED", None) => Ok(Self::ShopExpense),
            ("EXPENSE_EMPLOYEE", Some(id)) => Ok(Self::EmployeeExpense {
                employee_id: id.to_string(),
            }),
            ("EXPENSE_EMPLOYEE", None) => Err(ClientError::invalid_argument(
                "EXPENSE_EMPLOYEE transactions require an employee id.",
            )),
            ("INCOME" | "EXPENSE_SHOP" | "EXPENSE_COMMON" | "EXPENSE_FIXED", Some(_)) => {
                Err(ClientError::invalid_argument(
                    "Only EXPENSE_EMPLOYEE transactions may reference an employee.",
                ))
            }
            _ => Err(ClientError::invalid_argument(&format!(
                "Unknown transaction type `{}`. Use INCOME, EXPENSE_SHOP, or EXPENSE_EMPLOYEE.",
                code.trim()
            ))),
        }
    }

    pub const fn code(&self) -> &'static str {
        match self {
            Self::Income => "INCOME",
            Self::ShopExpense => "EXPENSE_SHOP",
            Self::EmployeeExpense { .. } => "EXPENSE_EMPLOYEE",
        }
    }

    pub fn employee_id(&self) -> Option<&str> {
        match self {
            Self::EmployeeExpense { employee_id } => Some(employee_id),
            Self::Income | Self::ShopExpense => None,
        }
    }

    pub const fn is_income(&self) -> bool {
        matches!(self, Self::Income)
    }
}

/// Display-only payment metadata; never used in report math.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaymentDetails {
    pub method: String,
    pub installments: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Transaction {
    pub id: String,
    pub date: NaiveDate,
    pub description: String,
    pub amount: Decimal,
    #[serde(flatten)]
    pub kind: TransactionKind,
    pub category: Option<String>,
    pub payment: Option<PaymentDetails>,
}

impl Transaction {
    pub fn category_label(&self) -> &str {
        category_label(self.category.as_deref())
    }
}

/// A transaction before the store has assigned it an id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTransaction {
    pub date: NaiveDate,
    pub description: String,
    pub amount: Decimal,
    pub kind: TransactionKind,
    pub category: Option<String>,
    pub payment: Option<PaymentDetails>,
}

impl NewTransaction {
    pub fn into_transaction(self, id: String) -> Transaction {
        Transaction {
            id,
            date: self.date,
            description: self.description,
            amount: self.amount,
            kind: self.kind,
            category: self.category,
            payment: self.payment,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Employee {
    pub id: String,
    pub name: String,
    pub role: String,
    pub fixed_salary: Decimal,
    /// Percentage in `0..=100`. Informational only.
    pub commission_rate: Decimal,
    pub bonus: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEmployee {
    pub name: String,
    pub role: String,
    pub fixed_salary: Decimal,
    pub commission_rate: Decimal,
    pub bonus: Option<Decimal>,
}

impl NewEmployee {
    pub fn into_employee(self, id: String) -> Employee {
        Employee {
            id,
            name: self.name,
            role: self.role,
            fixed_salary: self.fixed_salary,
            commission_rate: self.commission_rate,
            bonus: self.bonus,
        }
    }
}

/// Consistent, owned copy of the ledger at one version.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LedgerSnapshot {
    pub version: u64,
    pub transactions: Vec<Transaction>,
    pub employees: Vec<Employee>,
}

impl LedgerSnapshot {
    pub fn employee(&self, id: &str) -> Option<&Employee> {
        self.employees.iter().find(|employee| employee.id == id)
    }
}

pub fn category_label(category: Option<&str>) -> &str {
    category
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .unwrap_or(DEFAULT_CATEGORY_LABEL)
}
