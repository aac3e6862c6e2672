//! Ledger store: the transactions and employees the reports are computed from.
//!
//! Every mutation goes through [`LedgerRepository::commit`] and bumps the
//! ledger version; readers take an owned [`LedgerSnapshot`] so report code
//! never observes a half-applied change.

mod memory;
mod sqlite;
pub mod types;

use ulid::Ulid;

pub use memory::MemoryLedger;
pub use sqlite::SqliteLedger;
pub use types::{
    Employee, LedgerSnapshot, NewEmployee, NewTransaction, PaymentDetails, Transaction,
    TransactionKind,
};

use crate::ClientResult;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerChange {
    AddTransaction(NewTransaction),
    /// Full replace by id.
    UpdateTransaction(Transaction),
    DeleteTransaction(String),
    AddEmployee(NewEmployee),
    UpdateEmployee(Employee),
    DeleteEmployee(String),
}

impl LedgerChange {
    pub const fn label(&self) -> &'static str {
        match self {
            Self::AddTransaction(_) => "add_transaction",
            Self::UpdateTransaction(_) => "update_transaction",
            Self::DeleteTransaction(_) => "delete_transaction",
            Self::AddEmployee(_) => "add_employee",
            Self::UpdateEmployee(_) => "update_employee",
            Self::DeleteEmployee(_) => "delete_employee",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitReceipt {
    /// Ledger version after the commit.
    pub version: u64,
    /// Id of the transaction or employee the change touched.
    pub id: String,
}

pub trait LedgerRepository {
    fn snapshot(&self) -> ClientResult<LedgerSnapshot>;

    fn commit(&mut self, change: LedgerChange) -> ClientResult<CommitReceipt>;

    /// Applies every change in order, or none of them. Each applied change
    /// bumps the version once.
    fn commit_all(&mut self, changes: Vec<LedgerChange>) -> ClientResult<Vec<CommitReceipt>>;
}

pub(crate) fn new_transaction_id() -> String {
    format!("txn_{}", Ulid::new())
}

pub(crate) fn new_employee_id() -> String {
    format!("emp_{}", Ulid::new())
}

pub(crate) fn warn_on_dangling_employee(kind: &TransactionKind, employees: &[Employee]) {
    if let Some(employee_id) = kind.employee_id()
        && !employees.iter().any(|employee| employee.id == employee_id)
    {
        tracing::warn!(employee_id, "transaction references an unknown employee");
    }
}
