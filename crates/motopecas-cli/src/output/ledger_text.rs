use std::io;

use serde_json::Value;

use super::format::{self, Column, brl_field, percent_field, text_field};

pub fn render_transaction_list(data: &Value) -> io::Result<String> {
    let rows = data
        .get("rows")
        .and_then(Value::as_array)
        .ok_or_else(|| io::Error::other("transaction list output requires rows"))?;
    let scope = match data.get("month").and_then(Value::as_str) {
        Some(month) => format!(" for {month}"),
        None => String::new(),
    };

    if rows.is_empty() {
        return Ok([
            format!("No transactions found{scope}."),
            String::new(),
            "Record one:".to_string(),
            "  motopecas transaction add --description <text> --amount <value> --type INCOME"
                .to_string(),
            "Or bring in a file:".to_string(),
            "  motopecas import --help".to_string(),
        ]
        .join("\n"));
    }

    let count_label = if rows.len() == 1 {
        format!("1 transaction{scope}.")
    } else {
        format!("{} transactions{scope}.", rows.len())
    };

    let table_rows = rows
        .iter()
        .map(|row| {
            vec![
                text_field(row, "id").to_string(),
                text_field(row, "date").to_string(),
                text_field(row, "description").to_string(),
                text_field(row, "type").to_string(),
                text_field(row, "category").to_string(),
                text_field(row, "employee_name").to_string(),
                brl_field(row, "amount"),
            ]
        })
        .collect::<Vec<Vec<String>>>();

    let mut lines = vec![count_label, String::new()];
    lines.extend(format::render_table_or_blocks(
        &[
            Column::left("ID"),
            Column::left("Date"),
            Column::left("Description"),
            Column::left("Type"),
            Column::left("Category"),
            Column::left("Employee"),
            Column::right("Amount"),
        ],
        &table_rows,
        format::terminal_width(),
        "Transaction",
    ));
    lines.push(String::new());
    lines.extend(format::key_value_rows(
        &[
            ("Income:", brl_field(data, "total_income")),
            ("Expenses:", brl_field(data, "total_expense")),
        ],
        2,
    ));

    Ok(lines.join("\n"))
}

pub fn render_transaction_mutation(data: &Value) -> io::Result<String> {
    let mut lines = vec![
        format!("Transaction {}.", action_label(data)?),
        String::new(),
    ];

    let mut entries = vec![
        ("ID:", text_field(data, "id").to_string()),
        ("Ledger version:", version_text(data)),
    ];
    if let Some(row) = data.get("transaction") {
        entries.push(("Date:", text_field(row, "date").to_string()));
        entries.push(("Description:", text_field(row, "description").to_string()));
        entries.push(("Amount:", brl_field(row, "amount")));
        entries.push(("Type:", text_field(row, "type").to_string()));
        entries.push(("Category:", text_field(row, "category").to_string()));
        if let Some(name) = row.get("employee_name").and_then(Value::as_str) {
            entries.push(("Employee:", name.to_string()));
        }
        if let Some(method) = row.get("payment_method").and_then(Value::as_str) {
            let installments = row
                .get("installments")
                .and_then(Value::as_u64)
                .map(|count| format!(" in {count}x"))
                .unwrap_or_default();
            entries.push(("Payment:", format!("{method}{installments}")));
        }
    }
    lines.extend(format::key_value_rows(&entries, 2));

    Ok(lines.join("\n"))
}

pub fn render_employee_list(data: &Value) -> io::Result<String> {
    let rows = data
        .get("rows")
        .and_then(Value::as_array)
        .ok_or_else(|| io::Error::other("employee list output requires rows"))?;

    if rows.is_empty() {
        return Ok([
            "No employees registered yet.",
            "",
            "Register one:",
            "  motopecas employee add --name <name> --role <role> --fixed-salary <value>",
        ]
        .join("\n"));
    }

    let count_label = if rows.len() == 1 {
        "1 employee.".to_string()
    } else {
        format!("{} employees.", rows.len())
    };

    let table_rows = rows
        .iter()
        .map(|row| {
            vec![
                text_field(row, "id").to_string(),
                text_field(row, "name").to_string(),
                text_field(row, "role").to_string(),
                brl_field(row, "fixed_salary"),
                percent_field(row, "commission_rate"),
                brl_field(row, "bonus"),
            ]
        })
        .collect::<Vec<Vec<String>>>();

    let mut lines = vec![count_label, String::new()];
    lines.extend(format::render_table_or_blocks(
        &[
            Column::left("ID"),
            Column::left("Name"),
            Column::left("Role"),
            Column::right("Fixed salary"),
            Column::right("Commission"),
            Column::right("Bonus"),
        ],
        &table_rows,
        format::terminal_width(),
        "Employee",
    ));
    lines.push(String::new());
    lines.extend(format::key_value_rows(
        &[("Total fixed payroll:", brl_field(data, "total_fixed_payroll"))],
        2,
    ));

    Ok(lines.join("\n"))
}

pub fn render_employee_mutation(data: &Value) -> io::Result<String> {
    let mut lines = vec![
        format!("Employee {}.", action_label(data)?),
        String::new(),
    ];

    let mut entries = vec![
        ("ID:", text_field(data, "id").to_string()),
        ("Ledger version:", version_text(data)),
    ];
    if let Some(employee) = data.get("employee") {
        entries.push(("Name:", text_field(employee, "name").to_string()));
        entries.push(("Role:", text_field(employee, "role").to_string()));
        entries.push(("Fixed salary:", brl_field(employee, "fixed_salary")));
        entries.push(("Commission:", percent_field(employee, "commission_rate")));
        entries.push(("Bonus:", brl_field(employee, "bonus")));
    }
    if data.get("action").and_then(Value::as_str) == Some("deleted") {
        entries.push((
            "Note:",
            "past expenses for this employee now list as `unknown employee`".to_string(),
        ));
    }
    lines.extend(format::key_value_rows(&entries, 2));

    Ok(lines.join("\n"))
}

fn action_label(data: &Value) -> io::Result<&str> {
    data.get("action")
        .and_then(Value::as_str)
        .ok_or_else(|| io::Error::other("mutation output requires action"))
}

fn version_text(data: &Value) -> String {
    data.get("ledger_version")
        .and_then(Value::as_u64)
        .map(|version| version.to_string())
        .unwrap_or_else(|| "-".to_string())
}
