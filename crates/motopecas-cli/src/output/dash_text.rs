use std::io;

use serde_json::Value;

use super::format::{self, Column, brl_field, percent_field};

pub fn render_dash(data: &Value) -> io::Result<String> {
    let report = data
        .get("report")
        .ok_or_else(|| io::Error::other("dash output requires report"))?;
    let stats = report
        .get("stats")
        .ok_or_else(|| io::Error::other("dash output requires stats"))?;
    let comparison = report
        .get("comparison")
        .ok_or_else(|| io::Error::other("dash output requires comparison"))?;

    let mut lines = vec![
        format!(
            "Dashboard for {} (ledger version {})",
            month_label(report.get("reference_month")),
            report.get("version").and_then(Value::as_u64).unwrap_or(0)
        ),
        String::new(),
        "Totals:".to_string(),
    ];
    lines.extend(format::key_value_rows(
        &[
            ("Income:", brl_field(stats, "total_income")),
            ("Shop expenses:", brl_field(stats, "shop_expense")),
            ("Employee extras:", brl_field(stats, "employee_expense")),
            ("Fixed payroll:", brl_field(stats, "total_fixed_payroll")),
            ("Total expenses:", brl_field(stats, "total_expense")),
            ("Net balance:", brl_field(stats, "net_balance")),
        ],
        2,
    ));

    lines.push(String::new());
    lines.push("Expense composition:".to_string());
    lines.extend(render_composition(report));

    lines.push(String::new());
    lines.push("Top expense categories:".to_string());
    lines.extend(render_categories(report));

    lines.push(String::new());
    lines.extend(render_comparison_section(comparison));

    Ok(lines.join("\n"))
}

pub fn render_compare(data: &Value) -> io::Result<String> {
    let comparison = data
        .get("comparison")
        .ok_or_else(|| io::Error::other("compare output requires comparison"))?;

    let mut lines = render_comparison_section(comparison);
    lines.push(String::new());
    lines.push("Fixed payroll is not part of these month totals; run `motopecas dash` to include it.".to_string());
    Ok(lines.join("\n"))
}

fn render_composition(report: &Value) -> Vec<String> {
    let empty = Value::Null;
    let amounts = report.get("composition").unwrap_or(&empty);
    let shares = report.get("composition_shares").unwrap_or(&empty);

    let rows = [
        ("Shop", "shop", "shop_pct"),
        ("Employee extras", "employee_extras", "employee_extras_pct"),
        ("Fixed salaries", "fixed_salaries", "fixed_salaries_pct"),
    ]
    .iter()
    .map(|(label, amount_key, share_key)| {
        vec![
            (*label).to_string(),
            brl_field(amounts, amount_key),
            percent_field(shares, share_key),
        ]
    })
    .collect::<Vec<Vec<String>>>();

    format::render_table_or_blocks(
        &[
            Column::left("Bucket"),
            Column::right("Amount"),
            Column::right("Share"),
        ],
        &rows,
        format::terminal_width(),
        "Bucket",
    )
}

fn render_categories(report: &Value) -> Vec<String> {
    let categories = report
        .get("categories")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();
    if categories.is_empty() {
        return vec!["  No expenses recorded yet.".to_string()];
    }

    let rows = categories
        .iter()
        .map(|row| {
            vec![
                format::text_field(row, "category").to_string(),
                brl_field(row, "total"),
            ]
        })
        .collect::<Vec<Vec<String>>>();

    format::render_table_or_blocks(
        &[Column::left("Category"), Column::right("Total")],
        &rows,
        format::terminal_width(),
        "Category",
    )
}

fn render_comparison_section(comparison: &Value) -> Vec<String> {
    let empty = Value::Null;
    let current = comparison.get("current").unwrap_or(&empty);
    let previous = comparison.get("previous").unwrap_or(&empty);
    let current_label = month_label(current.get("month"));
    let previous_label = month_label(previous.get("month"));

    let rows = [
        ("Income", "income", "income_growth_pct"),
        ("Expenses", "expenses", "expense_growth_pct"),
        ("Profit", "profit", "profit_growth_pct"),
    ]
    .iter()
    .map(|(label, key, growth_key)| {
        vec![
            (*label).to_string(),
            brl_field(current, key),
            brl_field(previous, key),
            percent_field(comparison, growth_key),
        ]
    })
    .collect::<Vec<Vec<String>>>();

    let mut lines = vec![format!(
        "Month comparison ({current_label} vs {previous_label}):"
    )];
    lines.extend(format::render_table_or_blocks(
        &[
            Column::left("Metric"),
            Column::right(&current_label),
            Column::right(&previous_label),
            Column::right("Growth"),
        ],
        &rows,
        format::terminal_width(),
        "Metric",
    ));
    lines
}

fn month_label(month: Option<&Value>) -> String {
    let year = month.and_then(|value| value.get("year")).and_then(Value::as_i64);
    let number = month
        .and_then(|value| value.get("month"))
        .and_then(Value::as_u64);
    match (year, number) {
        (Some(year), Some(number)) => format!("{year:04}-{number:02}"),
        _ => "unknown month".to_string(),
    }
}
