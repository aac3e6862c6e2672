use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use rusqlite::{Connection, OptionalExtension, TransactionBehavior, params};
use rust_decimal::Decimal;

use crate::ledger::{
    CommitReceipt, Employee, LedgerChange, LedgerRepository, LedgerSnapshot, NewEmployee,
    NewTransaction, PaymentDetails, Transaction, TransactionKind, new_employee_id,
    new_transaction_id, warn_on_dangling_employee,
};
use crate::reports::date::{format_iso_date, parse_iso_date};
use crate::setup::SetupContext;
use crate::state::{open_connection, sqlite_failure};
use crate::{ClientError, ClientResult};

/// Durable ledger backed by the SQLite database in the ledger home.
#[derive(Debug)]
pub struct SqliteLedger {
    connection: Connection,
    db_path: PathBuf,
}

struct RawTransactionRow {
    txn_id: String,
    occurred_on: String,
    description: String,
    amount: String,
    txn_type: String,
    employee_id: Option<String>,
    category: Option<String>,
    payment_method: Option<String>,
    installments: Option<i64>,
}

struct RawEmployeeRow {
    employee_id: String,
    name: String,
    role: String,
    fixed_salary: String,
    commission_rate: String,
    bonus: Option<String>,
}

impl SqliteLedger {
    pub fn open(setup: &SetupContext) -> ClientResult<Self> {
        Self::open_path(&setup.db_path)
    }

    pub fn open_path(db_path: &Path) -> ClientResult<Self> {
        let connection = open_connection(db_path)?;
        Ok(Self {
            connection,
            db_path: db_path.to_path_buf(),
        })
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    fn load_transactions(&self, connection: &Connection) -> ClientResult<Vec<Transaction>> {
        let db_path = self.db_path.as_path();
        let mut statement = connection
            .prepare(
                "SELECT
                    txn_id,
                    occurred_on,
                    description,
                    amount,
                    txn_type,
                    employee_id,
                    category,
                    payment_method,
                    installments
                 FROM internal_transactions
                 ORDER BY seq ASC",
            )
            .map_err(|error| sqlite_failure(db_path, &error))?;

        let rows_iter = statement
            .query_map([], |row| {
                Ok(RawTransactionRow {
                    txn_id: row.get(0)?,
                    occurred_on: row.get(1)?,
                    description: row.get(2)?,
                    amount: row.get(3)?,
                    txn_type: row.get(4)?,
                    employee_id: row.get(5)?,
                    category: row.get(6)?,
                    payment_method: row.get(7)?,
                    installments: row.get(8)?,
                })
            })
            .map_err(|error| sqlite_failure(db_path, &error))?;

        let mut transactions = Vec::new();
        for row in rows_iter {
            let raw = row.map_err(|error| sqlite_failure(db_path, &error))?;
            if let Some(transaction) = decode_transaction(raw) {
                transactions.push(transaction);
            }
        }

        Ok(transactions)
    }

    fn load_employees(&self, connection: &Connection) -> ClientResult<Vec<Employee>> {
        let db_path = self.db_path.as_path();
        let mut statement = connection
            .prepare(
                "SELECT employee_id, name, role, fixed_salary, commission_rate, bonus
                 FROM internal_employees
                 ORDER BY seq ASC",
            )
            .map_err(|error| sqlite_failure(db_path, &error))?;

        let rows_iter = statement
            .query_map([], |row| {
                Ok(RawEmployeeRow {
                    employee_id: row.get(0)?,
                    name: row.get(1)?,
                    role: row.get(2)?,
                    fixed_salary: row.get(3)?,
                    commission_rate: row.get(4)?,
                    bonus: row.get(5)?,
                })
            })
            .map_err(|error| sqlite_failure(db_path, &error))?;

        let mut employees = Vec::new();
        for row in rows_iter {
            let raw = row.map_err(|error| sqlite_failure(db_path, &error))?;
            if let Some(employee) = decode_employee(raw) {
                employees.push(employee);
            }
        }

        Ok(employees)
    }
}

impl LedgerRepository for SqliteLedger {
    fn snapshot(&self) -> ClientResult<LedgerSnapshot> {
        let db_path = self.db_path.as_path();
        let read = self
            .connection
            .unchecked_transaction()
            .map_err(|error| sqlite_failure(db_path, &error))?;

        let version = read_ledger_version(&read, db_path)?;
        let transactions = self.load_transactions(&read)?;
        let employees = self.load_employees(&read)?;

        read.commit()
            .map_err(|error| sqlite_failure(db_path, &error))?;

        tracing::debug!(
            version,
            transactions = transactions.len(),
            employees = employees.len(),
            "loaded ledger snapshot"
        );
        Ok(LedgerSnapshot {
            version,
            transactions,
            employees,
        })
    }

    fn commit(&mut self, change: LedgerChange) -> ClientResult<CommitReceipt> {
        let mut receipts = self.commit_all(vec![change])?;
        receipts
            .pop()
            .ok_or_else(|| ClientError::ledger_init_failed(&self.db_path, "commit applied no change"))
    }

    fn commit_all(&mut self, changes: Vec<LedgerChange>) -> ClientResult<Vec<CommitReceipt>> {
        let db_path = self.db_path.clone();
        let transaction = self
            .connection
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(|error| sqlite_failure(&db_path, &error))?;

        let mut version = read_ledger_version(&transaction, &db_path)?;
        let mut receipts = Vec::with_capacity(changes.len());
        for change in changes {
            let label = change.label();
            let id = apply_change(&transaction, &db_path, change)?;
            version += 1;
            tracing::debug!(change = label, version, %id, "ledger change staged");
            receipts.push(CommitReceipt { version, id });
        }
        if receipts.is_empty() {
            return Ok(receipts);
        }

        transaction
            .execute(
                "UPDATE internal_meta SET value = ?1 WHERE key = 'ledger_version'",
                [version.to_string()],
            )
            .map_err(|error| sqlite_failure(&db_path, &error))?;
        transaction
            .commit()
            .map_err(|error| sqlite_failure(&db_path, &error))?;

        tracing::debug!(changes = receipts.len(), version, "ledger commit");
        Ok(receipts)
    }
}

fn apply_change(connection: &Connection, db_path: &Path, change: LedgerChange) -> ClientResult<String> {
    match change {
        LedgerChange::AddTransaction(new_transaction) => {
            warn_if_dangling(connection, db_path, &new_transaction.kind)?;
            insert_transaction(connection, db_path, &new_transaction)
        }
        LedgerChange::UpdateTransaction(existing) => {
            warn_if_dangling(connection, db_path, &existing.kind)?;
            update_transaction(connection, db_path, &existing)?;
            Ok(existing.id)
        }
        LedgerChange::DeleteTransaction(id) => {
            let deleted = connection
                .execute("DELETE FROM internal_transactions WHERE txn_id = ?1", [&id])
                .map_err(|error| sqlite_failure(db_path, &error))?;
            if deleted == 0 {
                return Err(ClientError::transaction_not_found(&id));
            }
            Ok(id)
        }
        LedgerChange::AddEmployee(new_employee) => insert_employee(connection, db_path, &new_employee),
        LedgerChange::UpdateEmployee(employee) => {
            update_employee(connection, db_path, &employee)?;
            Ok(employee.id)
        }
        LedgerChange::DeleteEmployee(id) => {
            let deleted = connection
                .execute("DELETE FROM internal_employees WHERE employee_id = ?1", [&id])
                .map_err(|error| sqlite_failure(db_path, &error))?;
            if deleted == 0 {
                return Err(ClientError::employee_not_found(&id));
            }
            Ok(id)
        }
    }
}

fn read_ledger_version(connection: &Connection, db_path: &Path) -> ClientResult<u64> {
    let value = connection
        .query_row(
            "SELECT value FROM internal_meta WHERE key = 'ledger_version' LIMIT 1",
            [],
            |row| row.get::<_, String>(0),
        )
        .optional()
        .map_err(|error| sqlite_failure(db_path, &error))?;

    let Some(raw) = value else {
        return Err(ClientError::ledger_corrupt(db_path));
    };
    raw.trim()
        .parse::<u64>()
        .map_err(|_| ClientError::ledger_corrupt(db_path))
}

fn warn_if_dangling(
    connection: &Connection,
    db_path: &Path,
    kind: &TransactionKind,
) -> ClientResult<()> {
    let Some(employee_id) = kind.employee_id() else {
        return Ok(());
    };
    let exists = connection
        .query_row(
            "SELECT 1 FROM internal_employees WHERE employee_id = ?1 LIMIT 1",
            [employee_id],
            |_row| Ok(true),
        )
        .optional()
        .map_err(|error| sqlite_failure(db_path, &error))?
        .unwrap_or(false);
    if !exists {
        warn_on_dangling_employee(kind, &[]);
    }
    Ok(())
}

fn insert_transaction(
    connection: &Connection,
    db_path: &Path,
    row: &NewTransaction,
) -> ClientResult<String> {
    let txn_id = new_transaction_id();
    let timestamp = now_timestamp();
    let (payment_method, installments) = payment_columns(row.payment.as_ref());
    connection
        .execute(
            "INSERT INTO internal_transactions (
                txn_id,
                occurred_on,
                description,
                amount,
                txn_type,
                employee_id,
                category,
                payment_method,
                installments,
                created_at,
                updated_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?10)",
            params![
                &txn_id,
                format_iso_date(&row.date),
                &row.description,
                row.amount.to_string(),
                row.kind.code(),
                row.kind.employee_id(),
                &row.category,
                payment_method,
                installments,
                &timestamp,
            ],
        )
        .map_err(|error| sqlite_failure(db_path, &error))?;
    Ok(txn_id)
}

fn update_transaction(
    connection: &Connection,
    db_path: &Path,
    row: &Transaction,
) -> ClientResult<()> {
    let (payment_method, installments) = payment_columns(row.payment.as_ref());
    let updated = connection
        .execute(
            "UPDATE internal_transactions SET
                occurred_on = ?2,
                description = ?3,
                amount = ?4,
                txn_type = ?5,
                employee_id = ?6,
                category = ?7,
                payment_method = ?8,
                installments = ?9,
                updated_at = ?10
             WHERE txn_id = ?1",
            params![
                &row.id,
                format_iso_date(&row.date),
                &row.description,
                row.amount.to_string(),
                row.kind.code(),
                row.kind.employee_id(),
                &row.category,
                payment_method,
                installments,
                now_timestamp(),
            ],
        )
        .map_err(|error| sqlite_failure(db_path, &error))?;
    if updated == 0 {
        return Err(ClientError::transaction_not_found(&row.id));
    }
    Ok(())
}

fn insert_employee(
    connection: &Connection,
    db_path: &Path,
    row: &NewEmployee,
) -> ClientResult<String> {
    let employee_id = new_employee_id();
    let timestamp = now_timestamp();
    connection
        .execute(
            "INSERT INTO internal_employees (
                employee_id,
                name,
                role,
                fixed_salary,
                commission_rate,
                bonus,
                created_at,
                updated_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)",
            params![
                &employee_id,
                &row.name,
                &row.role,
                row.fixed_salary.to_string(),
                row.commission_rate.to_string(),
                row.bonus.map(|value| value.to_string()),
                &timestamp,
            ],
        )
        .map_err(|error| sqlite_failure(db_path, &error))?;
    Ok(employee_id)
}

fn update_employee(connection: &Connection, db_path: &Path, row: &Employee) -> ClientResult<()> {
    let updated = connection
        .execute(
            "UPDATE internal_employees SET
                name = ?2,
                role = ?3,
                fixed_salary = ?4,
                commission_rate = ?5,
                bonus = ?6,
                updated_at = ?7
             WHERE employee_id = ?1",
            params![
                &row.id,
                &row.name,
                &row.role,
                row.fixed_salary.to_string(),
                row.commission_rate.to_string(),
                row.bonus.map(|value| value.to_string()),
                now_timestamp(),
            ],
        )
        .map_err(|error| sqlite_failure(db_path, &error))?;
    if updated == 0 {
        return Err(ClientError::employee_not_found(&row.id));
    }
    Ok(())
}

fn payment_columns(payment: Option<&PaymentDetails>) -> (Option<&str>, Option<i64>) {
    match payment {
        Some(details) => (
            Some(details.method.as_str()),
            details.installments.map(i64::from),
        ),
        None => (None, None),
    }
}

fn decode_transaction(raw: RawTransactionRow) -> Option<Transaction> {
    let Some(date) = parse_iso_date(&raw.occurred_on) else {
        tracing::warn!(txn_id = %raw.txn_id, value = %raw.occurred_on, "skipping transaction with unparsable date");
        return None;
    };
    let Ok(amount) = raw.amount.trim().parse::<Decimal>() else {
        tracing::warn!(txn_id = %raw.txn_id, value = %raw.amount, "skipping transaction with unparsable amount");
        return None;
    };
    let kind = match TransactionKind::from_code(&raw.txn_type, raw.employee_id.as_deref()) {
        Ok(kind) => kind,
        Err(error) => {
            tracing::warn!(txn_id = %raw.txn_id, %error, "skipping transaction with invalid type");
            return None;
        }
    };

    let payment = raw.payment_method.map(|method| PaymentDetails {
        method,
        installments: raw
            .installments
            .and_then(|value| u32::try_from(value).ok()),
    });

    Some(Transaction {
        id: raw.txn_id,
        date,
        description: raw.description,
        amount,
        kind,
        category: raw.category,
        payment,
    })
}

fn decode_employee(raw: RawEmployeeRow) -> Option<Employee> {
    let parse = |value: &str| value.trim().parse::<Decimal>().ok();
    let (Some(fixed_salary), Some(commission_rate)) =
        (parse(raw.fixed_salary.as_str()), parse(raw.commission_rate.as_str()))
    else {
        tracing::warn!(employee_id = %raw.employee_id, "skipping employee with unparsable amounts");
        return None;
    };

    Some(Employee {
        id: raw.employee_id,
        name: raw.name,
        role: raw.role,
        fixed_salary,
        commission_rate,
        bonus: raw.bonus.as_deref().and_then(parse),
    })
}

pub(crate) fn now_timestamp() -> String {
    let now = SystemTime::now().duration_since(UNIX_EPOCH);
    match now {
        Ok(duration) => format!("{}", duration.as_secs()),
        Err(_) => "0".to_string(),
    }
}
