use std::path::Path;

use rust_decimal::Decimal;

use crate::commands::common::{load_setup, parse_money, parse_percent, required_text};
use crate::contracts::envelope::{SuccessEnvelope, success};
use crate::contracts::types::{EmployeeListData, EmployeeMutationData, MutationAction};
use crate::ledger::{LedgerChange, LedgerRepository, NewEmployee, SqliteLedger};
use crate::reports::aggregate::fixed_payroll;
use crate::{ClientError, ClientResult};

#[derive(Debug, Default)]
pub struct EmployeeAddOptions<'a> {
    pub name: String,
    pub role: String,
    pub fixed_salary: String,
    /// Percentage; zero when absent.
    pub commission_rate: Option<String>,
    pub bonus: Option<String>,
    pub home_override: Option<&'a Path>,
}

#[derive(Debug, Default)]
pub struct EmployeeListOptions<'a> {
    pub home_override: Option<&'a Path>,
}

/// Fields left as `None` keep their stored value.
#[derive(Debug, Default)]
pub struct EmployeeUpdateOptions<'a> {
    pub id: String,
    pub name: Option<String>,
    pub role: Option<String>,
    pub fixed_salary: Option<String>,
    pub commission_rate: Option<String>,
    pub bonus: Option<String>,
    pub clear_bonus: bool,
    pub home_override: Option<&'a Path>,
}

#[derive(Debug, Default)]
pub struct EmployeeDeleteOptions<'a> {
    pub id: String,
    pub home_override: Option<&'a Path>,
}

pub fn add(options: EmployeeAddOptions<'_>) -> ClientResult<SuccessEnvelope> {
    add_with_options(options)
}

pub fn list() -> ClientResult<SuccessEnvelope> {
    list_with_options(EmployeeListOptions {
        home_override: None,
    })
}

pub fn update(options: EmployeeUpdateOptions<'_>) -> ClientResult<SuccessEnvelope> {
    update_with_options(options)
}

pub fn delete(id: &str) -> ClientResult<SuccessEnvelope> {
    delete_with_options(EmployeeDeleteOptions {
        id: id.to_string(),
        home_override: None,
    })
}

#[doc(hidden)]
pub fn add_with_options(options: EmployeeAddOptions<'_>) -> ClientResult<SuccessEnvelope> {
    let command = "employee add";
    let name = required_text(&options.name, "name", command)?;
    let role = required_text(&options.role, "role", command)?;
    let fixed_salary = parse_money(&options.fixed_salary, "fixed-salary", command)?;
    let commission_rate = match options.commission_rate.as_deref() {
        Some(value) => parse_percent(value, "commission-rate", command)?,
        None => Decimal::ZERO,
    };
    let bonus = options
        .bonus
        .as_deref()
        .map(|value| parse_money(value, "bonus", command))
        .transpose()?;

    let setup = load_setup(options.home_override)?;
    let mut ledger = SqliteLedger::open(&setup)?;
    let receipt = ledger.commit(LedgerChange::AddEmployee(NewEmployee {
        name,
        role,
        fixed_salary,
        commission_rate,
        bonus,
    }))?;
    let employee = ledger.snapshot()?.employee(&receipt.id).cloned();

    success(
        command,
        EmployeeMutationData {
            action: MutationAction::Added,
            id: receipt.id,
            ledger_version: receipt.version,
            employee,
        },
    )
}

#[doc(hidden)]
pub fn list_with_options(options: EmployeeListOptions<'_>) -> ClientResult<SuccessEnvelope> {
    let setup = load_setup(options.home_override)?;
    let snapshot = SqliteLedger::open(&setup)?.snapshot()?;

    success(
        "employee list",
        EmployeeListData {
            ledger_version: snapshot.version,
            total_fixed_payroll: fixed_payroll(&snapshot.employees),
            rows: snapshot.employees,
        },
    )
}

#[doc(hidden)]
pub fn update_with_options(options: EmployeeUpdateOptions<'_>) -> ClientResult<SuccessEnvelope> {
    let command = "employee update";
    if options.clear_bonus && options.bonus.is_some() {
        return Err(ClientError::invalid_argument_for_command(
            "Pass either `--bonus` or `--clear-bonus`, not both.",
            Some(command),
        ));
    }

    let setup = load_setup(options.home_override)?;
    let mut ledger = SqliteLedger::open(&setup)?;
    let mut employee = ledger
        .snapshot()?
        .employee(&options.id)
        .cloned()
        .ok_or_else(|| ClientError::employee_not_found(&options.id))?;

    if let Some(name) = options.name.as_deref() {
        employee.name = required_text(name, "name", command)?;
    }
    if let Some(role) = options.role.as_deref() {
        employee.role = required_text(role, "role", command)?;
    }
    if let Some(fixed_salary) = options.fixed_salary.as_deref() {
        employee.fixed_salary = parse_money(fixed_salary, "fixed-salary", command)?;
    }
    if let Some(commission_rate) = options.commission_rate.as_deref() {
        employee.commission_rate = parse_percent(commission_rate, "commission-rate", command)?;
    }
    if let Some(bonus) = options.bonus.as_deref() {
        employee.bonus = Some(parse_money(bonus, "bonus", command)?);
    }
    if options.clear_bonus {
        employee.bonus = None;
    }

    let receipt = ledger.commit(LedgerChange::UpdateEmployee(employee.clone()))?;

    success(
        command,
        EmployeeMutationData {
            action: MutationAction::Updated,
            id: receipt.id,
            ledger_version: receipt.version,
            employee: Some(employee),
        },
    )
}

/// Removes the employee. Expenses that referenced them stay in the ledger
/// and list as `unknown employee`.
#[doc(hidden)]
pub fn delete_with_options(options: EmployeeDeleteOptions<'_>) -> ClientResult<SuccessEnvelope> {
    let setup = load_setup(options.home_override)?;
    let mut ledger = SqliteLedger::open(&setup)?;
    let receipt = ledger.commit(LedgerChange::DeleteEmployee(options.id))?;

    success(
        "employee delete",
        EmployeeMutationData {
            action: MutationAction::Deleted,
            id: receipt.id,
            ledger_version: receipt.version,
            employee: None,
        },
    )
}
