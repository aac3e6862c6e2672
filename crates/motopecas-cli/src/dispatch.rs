use motopecas_client::commands;
use motopecas_client::commands::employee::{EmployeeAddOptions, EmployeeUpdateOptions};
use motopecas_client::commands::fee::FeeOptions;
use motopecas_client::commands::transaction::{TransactionAddOptions, TransactionUpdateOptions};
use motopecas_client::{ClientResult, SuccessEnvelope};

use crate::cli::{Cli, Commands, EmployeeCommand, IsoDate, TransactionCommand};

pub fn dispatch(cli: &Cli) -> ClientResult<SuccessEnvelope> {
    match &cli.command {
        Commands::Dash { date, .. } => commands::dash::run(date_arg(date)),
        Commands::Compare { date, .. } => commands::compare::run(date_arg(date)),
        Commands::Fee {
            gross,
            rate,
            acquirer,
            brand,
            advance,
            advance_rate,
            ..
        } => commands::fee::run_with_options(FeeOptions {
            gross: gross.clone(),
            rate: rate.clone(),
            acquirer: acquirer.clone(),
            brand: brand.clone(),
            advance: *advance,
            advance_rate: advance_rate.clone(),
            home_override: None,
        }),
        Commands::Transaction { command } => dispatch_transaction(command),
        Commands::Employee { command } => dispatch_employee(command),
        Commands::Import { dry_run, path, .. } => commands::import::run(path.clone(), *dry_run),
    }
}

fn dispatch_transaction(command: &TransactionCommand) -> ClientResult<SuccessEnvelope> {
    match command {
        TransactionCommand::Add {
            date,
            description,
            amount,
            txn_type,
            employee_id,
            category,
            payment_method,
            installments,
            ..
        } => commands::transaction::add(TransactionAddOptions {
            date: date_arg(date),
            description: description.clone(),
            amount: amount.clone(),
            txn_type: txn_type.clone(),
            employee_id: employee_id.clone(),
            category: category.clone(),
            payment_method: payment_method.clone(),
            installments: *installments,
            home_override: None,
        }),
        TransactionCommand::List { month, .. } => commands::transaction::list(month.clone()),
        TransactionCommand::Update {
            id,
            date,
            description,
            amount,
            txn_type,
            employee_id,
            category,
            payment_method,
            installments,
            ..
        } => commands::transaction::update(TransactionUpdateOptions {
            id: id.clone(),
            date: date_arg(date),
            description: description.clone(),
            amount: amount.clone(),
            txn_type: txn_type.clone(),
            employee_id: employee_id.clone(),
            category: category.clone(),
            payment_method: payment_method.clone(),
            installments: *installments,
            home_override: None,
        }),
        TransactionCommand::Delete { id, .. } => commands::transaction::delete(id),
    }
}

fn dispatch_employee(command: &EmployeeCommand) -> ClientResult<SuccessEnvelope> {
    match command {
        EmployeeCommand::Add {
            name,
            role,
            fixed_salary,
            commission_rate,
            bonus,
            ..
        } => commands::employee::add(EmployeeAddOptions {
            name: name.clone(),
            role: role.clone(),
            fixed_salary: fixed_salary.clone(),
            commission_rate: commission_rate.clone(),
            bonus: bonus.clone(),
            home_override: None,
        }),
        EmployeeCommand::List { .. } => commands::employee::list(),
        EmployeeCommand::Update {
            id,
            name,
            role,
            fixed_salary,
            commission_rate,
            bonus,
            clear_bonus,
            ..
        } => commands::employee::update(EmployeeUpdateOptions {
            id: id.clone(),
            name: name.clone(),
            role: role.clone(),
            fixed_salary: fixed_salary.clone(),
            commission_rate: commission_rate.clone(),
            bonus: bonus.clone(),
            clear_bonus: *clear_bonus,
            home_override: None,
        }),
        EmployeeCommand::Delete { id, .. } => commands::employee::delete(id),
    }
}

fn date_arg(date: &Option<IsoDate>) -> Option<String> {
    date.as_ref().map(|value| value.as_str().to_string())
}
