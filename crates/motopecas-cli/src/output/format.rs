use std::cmp;

use rust_decimal::Decimal;
use serde_json::Value;

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Align {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy)]
pub struct Column<'a> {
    pub name: &'a str,
    pub align: Align,
}

impl<'a> Column<'a> {
    pub const fn left(name: &'a str) -> Self {
        Self {
            name,
            align: Align::Left,
        }
    }

    pub const fn right(name: &'a str) -> Self {
        Self {
            name,
            align: Align::Right,
        }
    }
}

const INDENT: &str = "  ";
const COLUMN_GAP: &str = "  ";

pub fn terminal_width() -> usize {
    let from_env = std::env::var("COLUMNS")
        .ok()
        .and_then(|value| value.parse::<usize>().ok())
        .unwrap_or(120);
    cmp::max(from_env, 40)
}

pub fn key_value_rows(entries: &[(&str, String)], indent: usize) -> Vec<String> {
    let label_width = entries
        .iter()
        .map(|(label, _)| label.chars().count())
        .max()
        .unwrap_or(0);
    let padding = " ".repeat(indent);

    entries
        .iter()
        .map(|(label, value)| format!("{padding}{label:<label_width$}  {value}"))
        .collect()
}

/// A header, a rule and one line per row; one labelled block per row when
/// the table would not fit in `max_width`.
pub fn render_table_or_blocks(
    columns: &[Column<'_>],
    rows: &[Vec<String>],
    max_width: usize,
    block_label: &str,
) -> Vec<String> {
    if columns.is_empty() {
        return Vec::new();
    }

    let widths = column_widths(columns, rows);
    let table_width = INDENT.len()
        + widths.iter().sum::<usize>()
        + COLUMN_GAP.len() * widths.len().saturating_sub(1);
    if table_width > max_width {
        return render_blocks(columns, rows, block_label);
    }

    let header = columns
        .iter()
        .map(|column| column.name.to_string())
        .collect::<Vec<String>>();
    let rule = widths
        .iter()
        .map(|width| "-".repeat(*width))
        .collect::<Vec<String>>();

    let mut output = vec![
        format_row(columns, &header, &widths),
        format_row(columns, &rule, &widths),
    ];
    output.extend(rows.iter().map(|row| format_row(columns, row, &widths)));
    output
}

fn column_widths(columns: &[Column<'_>], rows: &[Vec<String>]) -> Vec<usize> {
    columns
        .iter()
        .enumerate()
        .map(|(index, column)| {
            rows.iter()
                .filter_map(|row| row.get(index))
                .map(|cell| cell.chars().count())
                .fold(column.name.chars().count(), cmp::max)
        })
        .collect()
}

fn format_row(columns: &[Column<'_>], cells: &[String], widths: &[usize]) -> String {
    let pieces = columns
        .iter()
        .zip(widths)
        .enumerate()
        .map(|(index, (column, width))| {
            let value = cells.get(index).map(String::as_str).unwrap_or("");
            match column.align {
                Align::Left => format!("{value:<width$}"),
                Align::Right => format!("{value:>width$}"),
            }
        })
        .collect::<Vec<String>>();

    format!("{INDENT}{}", pieces.join(COLUMN_GAP)).trim_end().to_string()
}

fn render_blocks(columns: &[Column<'_>], rows: &[Vec<String>], block_label: &str) -> Vec<String> {
    let labels = columns
        .iter()
        .map(|column| format!("{}:", column.name))
        .collect::<Vec<String>>();
    let label_width = labels
        .iter()
        .map(|label| label.chars().count())
        .max()
        .unwrap_or(0);

    let mut output = Vec::new();
    for (row_index, row) in rows.iter().enumerate() {
        if row_index > 0 {
            output.push(String::new());
        }
        output.push(format!("{INDENT}{block_label} {}:", row_index + 1));
        for (column_index, label) in labels.iter().enumerate() {
            let value = row.get(column_index).map(String::as_str).unwrap_or("");
            output.push(format!("{INDENT}  {label:<label_width$}  {value}"));
        }
    }
    output
}

/// Reads a decimal serialized either as a JSON string or a JSON number.
pub fn decimal_of(value: Option<&Value>) -> Option<Decimal> {
    match value? {
        Value::String(text) => text.parse::<Decimal>().ok(),
        Value::Number(number) => number.to_string().parse::<Decimal>().ok(),
        _ => None,
    }
}

/// Brazilian real, e.g. `R$ 16.650,00`.
pub fn brl(amount: Decimal) -> String {
    let rounded = amount.round_dp(2);
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    let plain = format!("{:.2}", rounded.abs());
    let (units, cents) = plain.split_once('.').unwrap_or((plain.as_str(), "00"));
    format!("{sign}R$ {},{cents}", group_thousands(units))
}

pub fn brl_field(data: &Value, key: &str) -> String {
    decimal_of(data.get(key)).map_or_else(|| "-".to_string(), brl)
}

pub fn percent_field(data: &Value, key: &str) -> String {
    decimal_of(data.get(key)).map_or_else(
        || "-".to_string(),
        |value| format!("{:.2}%", value.round_dp(2)).replace('.', ","),
    )
}

pub fn text_field<'a>(data: &'a Value, key: &str) -> &'a str {
    data.get(key).and_then(Value::as_str).unwrap_or("")
}

fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use serde_json::json;

    use super::{
        Column, brl, brl_field, key_value_rows, percent_field, render_table_or_blocks,
    };

    #[test]
    fn brl_groups_thousands_and_uses_comma_cents() {
        assert_eq!(brl(Decimal::new(1665000, 2)), "R$ 16.650,00");
        assert_eq!(brl(Decimal::new(-16200, 0)), "-R$ 16.200,00");
        assert_eq!(brl(Decimal::new(9782, 1)), "R$ 978,20");
        assert_eq!(brl(Decimal::ZERO), "R$ 0,00");
        assert_eq!(brl(Decimal::new(1234567891, 0)), "R$ 1.234.567.891,00");
    }

    #[test]
    fn field_helpers_accept_strings_and_numbers() {
        let data = json!({"total": "450", "count": 12.5, "pct": "33.333"});
        assert_eq!(brl_field(&data, "total"), "R$ 450,00");
        assert_eq!(brl_field(&data, "count"), "R$ 12,50");
        assert_eq!(brl_field(&data, "missing"), "-");
        assert_eq!(percent_field(&data, "pct"), "33,33%");
    }

    #[test]
    fn key_value_rows_align_labels_by_characters() {
        let rows = key_value_rows(
            &[
                ("Salários:", "1".to_string()),
                ("Income:", "2".to_string()),
            ],
            2,
        );

        assert_eq!(rows[0], "  Salários:  1");
        assert_eq!(rows[1], "  Income:    2");
    }

    #[test]
    fn table_pads_accented_cells_by_characters() {
        let columns = [Column::left("Category"), Column::right("Total")];
        let rows = vec![
            vec!["Salário Base".to_string(), "R$ 15.000,00".to_string()],
            vec!["Estoque".to_string(), "R$ 1.200,00".to_string()],
        ];

        let rendered = render_table_or_blocks(&columns, &rows, 80, "Category");
        assert_eq!(rendered.len(), 4);
        assert_eq!(rendered[0], "  Category             Total");
        assert_eq!(rendered[2], "  Salário Base  R$ 15.000,00");
        assert_eq!(rendered[3], "  Estoque        R$ 1.200,00");
    }

    #[test]
    fn narrow_width_falls_back_to_blocks() {
        let columns = [
            Column::left("Date"),
            Column::left("Description"),
            Column::right("Amount"),
        ];
        let rows = vec![vec![
            "2023-10-01".to_string(),
            "Revisão completa".to_string(),
            "R$ 450,00".to_string(),
        ]];

        let rendered = render_table_or_blocks(&columns, &rows, 20, "Transaction");
        assert_eq!(rendered[0], "  Transaction 1:");
        assert!(rendered[1].contains("Date:"));
        assert!(rendered[2].contains("Revisão completa"));
        assert!(rendered[3].contains("R$ 450,00"));
    }
}
