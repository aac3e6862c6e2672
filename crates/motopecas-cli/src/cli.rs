use chrono::NaiveDate;
use clap::{Parser, Subcommand};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IsoDate(pub String);

impl IsoDate {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

pub fn parse_iso_date(value: &str) -> Result<IsoDate, String> {
    if !has_digit_layout(value, &[4, 7]) || value.len() != 10 {
        return Err("date must use YYYY-MM-DD format".to_string());
    }
    if NaiveDate::parse_from_str(value, "%Y-%m-%d").is_err() {
        return Err("date must use valid calendar values".to_string());
    }
    Ok(IsoDate(value.to_string()))
}

pub fn parse_month(value: &str) -> Result<String, String> {
    if !has_digit_layout(value, &[4]) || value.len() != 7 {
        return Err("month must use YYYY-MM format".to_string());
    }
    match value[5..].parse::<u32>() {
        Ok(month) if (1..=12).contains(&month) => Ok(value.to_string()),
        _ => Err("month must be between 01 and 12".to_string()),
    }
}

/// ASCII digits everywhere except `-` at the given byte offsets.
fn has_digit_layout(value: &str, dash_offsets: &[usize]) -> bool {
    value.bytes().enumerate().all(|(index, byte)| {
        if dash_offsets.contains(&index) {
            byte == b'-'
        } else {
            byte.is_ascii_digit()
        }
    })
}

/// Extended help shown after `motopecas import --help`.
pub const IMPORT_AFTER_HELP: &str = "\
How import works:
  Provide one file per call: a JSON array of transaction objects, or a
  CSV file whose header row uses the field names below.
  Use `-` as the path to read from stdin.
  Example: cat october.csv | motopecas import --dry-run -

  Every row is checked before anything is written. If any row is invalid
  the whole file is rejected and the ledger stays unchanged.

What to do next:
  1. Run `motopecas employee list` to copy employee ids for EXPENSE_EMPLOYEE rows.
  2. Run `motopecas import --dry-run <path>` and fix any reported issues.
  3. Run `motopecas import <path>` once the dry run passes.

Fields:
  date (required)            YYYY-MM-DD
  description (required)     free text
  amount (required)          non-negative, at most 2 decimal places
  type (required)            INCOME | EXPENSE_SHOP | EXPENSE_EMPLOYEE
                             (EXPENSE_COMMON and EXPENSE_FIXED are read as EXPENSE_SHOP)
  employee_id                required for EXPENSE_EMPLOYEE, rejected otherwise
  category                   label used in the category breakdown (default `Outros`)
  payment_method             e.g. Pix, Dinheiro, Cartão de Crédito
  installments               positive integer; needs payment_method

  CSV example:
  date,description,amount,type,category,employee_id
  2023-10-01,Revisão completa,450.00,INCOME,Serviços,
  2023-10-05,Pastilhas de freio,1200.00,EXPENSE_SHOP,Estoque,
  2023-10-12,Comissão outubro,150.00,EXPENSE_EMPLOYEE,Comissão,emp_01HC7Z...
";

#[derive(Debug, Parser)]
#[command(
    name = "motopecas",
    version,
    about = "back-office ledger for a motorcycle-parts shop",
    disable_help_subcommand = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Show totals, expense composition, top categories and the month comparison
    Dash {
        /// Reference date; its month is reported (YYYY-MM-DD, default today)
        #[arg(long, value_parser = parse_iso_date)]
        date: Option<IsoDate>,
        /// Emit machine-readable JSON output
        #[arg(long)]
        json: bool,
    },
    /// Compare one month's income, expenses and profit against the previous month
    Compare {
        /// Reference date; its month is compared (YYYY-MM-DD, default today)
        #[arg(long, value_parser = parse_iso_date)]
        date: Option<IsoDate>,
        /// Emit machine-readable JSON output
        #[arg(long)]
        json: bool,
    },
    /// Compute card settlement fees for a sale
    Fee {
        /// Gross sale amount
        gross: String,
        /// Fee percentage; overrides the acquirer/brand lookup
        #[arg(long)]
        rate: Option<String>,
        /// Acquirer used for the schedule lookup (e.g. Stone)
        #[arg(long)]
        acquirer: Option<String>,
        /// Card brand used for the schedule lookup (e.g. Visa)
        #[arg(long)]
        brand: Option<String>,
        /// Also charge the advance (antecipação) fee
        #[arg(long)]
        advance: bool,
        /// Advance percentage; overrides the acquirer lookup
        #[arg(long)]
        advance_rate: Option<String>,
        /// Emit machine-readable JSON output
        #[arg(long)]
        json: bool,
    },
    /// Record, list, edit and remove transactions
    #[command(arg_required_else_help = true)]
    Transaction {
        #[command(subcommand)]
        command: TransactionCommand,
    },
    /// Manage employees and their fixed salaries
    #[command(arg_required_else_help = true)]
    Employee {
        #[command(subcommand)]
        command: EmployeeCommand,
    },
    /// Import transactions from a JSON or CSV file
    #[command(after_long_help = IMPORT_AFTER_HELP)]
    Import {
        /// Validate the file without writing to the ledger
        #[arg(long)]
        dry_run: bool,
        /// Emit machine-readable JSON output
        #[arg(long)]
        json: bool,
        /// Path to a JSON or CSV file (use `-` for stdin)
        path: Option<String>,
    },
}

#[derive(Debug, Clone, Subcommand)]
pub enum TransactionCommand {
    /// Record a new transaction
    Add {
        /// Transaction date (YYYY-MM-DD, default today)
        #[arg(long, value_parser = parse_iso_date)]
        date: Option<IsoDate>,
        #[arg(long)]
        description: String,
        #[arg(long)]
        amount: String,
        /// INCOME, EXPENSE_SHOP or EXPENSE_EMPLOYEE
        #[arg(long = "type")]
        txn_type: String,
        /// Required for EXPENSE_EMPLOYEE
        #[arg(long)]
        employee_id: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        payment_method: Option<String>,
        #[arg(long)]
        installments: Option<u32>,
        /// Emit machine-readable JSON output
        #[arg(long)]
        json: bool,
    },
    /// List transactions, optionally for one month
    List {
        /// Month filter (YYYY-MM)
        #[arg(long, value_parser = parse_month)]
        month: Option<String>,
        /// Emit machine-readable JSON output
        #[arg(long)]
        json: bool,
    },
    /// Change fields of an existing transaction
    Update {
        /// Transaction id (e.g. txn_01HC...)
        id: String,
        #[arg(long, value_parser = parse_iso_date)]
        date: Option<IsoDate>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        amount: Option<String>,
        #[arg(long = "type")]
        txn_type: Option<String>,
        #[arg(long)]
        employee_id: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        payment_method: Option<String>,
        #[arg(long)]
        installments: Option<u32>,
        /// Emit machine-readable JSON output
        #[arg(long)]
        json: bool,
    },
    /// Remove a transaction
    Delete {
        /// Transaction id (e.g. txn_01HC...)
        id: String,
        /// Emit machine-readable JSON output
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Clone, Subcommand)]
pub enum EmployeeCommand {
    /// Register an employee
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        role: String,
        /// Monthly fixed salary, counted as payroll on the dashboard
        #[arg(long)]
        fixed_salary: String,
        /// Commission percentage (default 0)
        #[arg(long)]
        commission_rate: Option<String>,
        #[arg(long)]
        bonus: Option<String>,
        /// Emit machine-readable JSON output
        #[arg(long)]
        json: bool,
    },
    /// List employees and the total fixed payroll
    List {
        /// Emit machine-readable JSON output
        #[arg(long)]
        json: bool,
    },
    /// Change fields of an existing employee
    Update {
        /// Employee id (e.g. emp_01HC...)
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        role: Option<String>,
        #[arg(long)]
        fixed_salary: Option<String>,
        #[arg(long)]
        commission_rate: Option<String>,
        #[arg(long)]
        bonus: Option<String>,
        /// Remove the stored bonus
        #[arg(long, conflicts_with = "bonus")]
        clear_bonus: bool,
        /// Emit machine-readable JSON output
        #[arg(long)]
        json: bool,
    },
    /// Remove an employee; their past expenses stay in the ledger
    Delete {
        /// Employee id (e.g. emp_01HC...)
        id: String,
        /// Emit machine-readable JSON output
        #[arg(long)]
        json: bool,
    },
}

#[cfg(test)]
pub fn parse_from<I, T>(itr: I) -> Result<Cli, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    Cli::try_parse_from(itr)
}
