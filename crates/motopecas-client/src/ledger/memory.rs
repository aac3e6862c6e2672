use crate::ledger::{
    CommitReceipt, LedgerChange, LedgerRepository, LedgerSnapshot, new_employee_id,
    new_transaction_id, warn_on_dangling_employee,
};
use crate::{ClientError, ClientResult};

/// In-process ledger; every commit mutates a private snapshot copy.
#[derive(Debug, Clone, Default)]
pub struct MemoryLedger {
    state: LedgerSnapshot,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn version(&self) -> u64 {
        self.state.version
    }
}

impl LedgerRepository for MemoryLedger {
    fn snapshot(&self) -> ClientResult<LedgerSnapshot> {
        Ok(self.state.clone())
    }

    fn commit(&mut self, change: LedgerChange) -> ClientResult<CommitReceipt> {
        let label = change.label();
        let id = match change {
            LedgerChange::AddTransaction(new_transaction) => {
                warn_on_dangling_employee(&new_transaction.kind, &self.state.employees);
                let id = new_transaction_id();
                self.state
                    .transactions
                    .push(new_transaction.into_transaction(id.clone()));
                id
            }
            LedgerChange::UpdateTransaction(transaction) => {
                warn_on_dangling_employee(&transaction.kind, &self.state.employees);
                let slot = self
                    .state
                    .transactions
                    .iter_mut()
                    .find(|existing| existing.id == transaction.id)
                    .ok_or_else(|| ClientError::transaction_not_found(&transaction.id))?;
                let id = transaction.id.clone();
                *slot = transaction;
                id
            }
            LedgerChange::DeleteTransaction(id) => {
                let index = self
                    .state
                    .transactions
                    .iter()
                    .position(|existing| existing.id == id)
                    .ok_or_else(|| ClientError::transaction_not_found(&id))?;
                self.state.transactions.remove(index);
                id
            }
            LedgerChange::AddEmployee(new_employee) => {
                let id = new_employee_id();
                self.state
                    .employees
                    .push(new_employee.into_employee(id.clone()));
                id
            }
            LedgerChange::UpdateEmployee(employee) => {
                let slot = self
                    .state
                    .employees
                    .iter_mut()
                    .find(|existing| existing.id == employee.id)
                    .ok_or_else(|| ClientError::employee_not_found(&employee.id))?;
                let id = employee.id.clone();
                *slot = employee;
                id
            }
            LedgerChange::DeleteEmployee(id) => {
                let index = self
                    .state
                    .employees
                    .iter()
                    .position(|existing| existing.id == id)
                    .ok_or_else(|| ClientError::employee_not_found(&id))?;
                self.state.employees.remove(index);
                id
            }
        };

        self.state.version += 1;
        tracing::debug!(change = label, version = self.state.version, %id, "ledger commit");
        Ok(CommitReceipt {
            version: self.state.version,
            id,
        })
    }

    fn commit_all(&mut self, changes: Vec<LedgerChange>) -> ClientResult<Vec<CommitReceipt>> {
        let saved = self.state.clone();
        let mut receipts = Vec::with_capacity(changes.len());
        for change in changes {
            match self.commit(change) {
                Ok(receipt) => receipts.push(receipt),
                Err(error) => {
                    self.state = saved;
                    return Err(error);
                }
            }
        }
        Ok(receipts)
    }
}
