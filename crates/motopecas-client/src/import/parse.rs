use std::collections::HashMap;

use serde_json::{Map, Value};

use crate::commands::common::{optional_import_field_names, required_import_field_names};
use crate::import::invalid_input_error;
use crate::{ClientError, ClientResult};

/// One source row with every field still as raw text.
#[derive(Debug, Clone, Default)]
pub(crate) struct ParsedRow {
    pub(crate) row: i64,
    pub(crate) date: Option<String>,
    pub(crate) description: Option<String>,
    pub(crate) amount: Option<String>,
    pub(crate) txn_type: Option<String>,
    pub(crate) category: Option<String>,
    pub(crate) employee_id: Option<String>,
    pub(crate) payment_method: Option<String>,
    pub(crate) installments: Option<String>,
}

impl ParsedRow {
    /// Builds a row from any per-field lookup so JSON objects and CSV
    /// records share one mapping of source names to row fields.
    fn from_fields(row: i64, mut field: impl FnMut(&str) -> Option<String>) -> Self {
        Self {
            row,
            date: field("date"),
            description: field("description"),
            amount: field("amount"),
            txn_type: field("type"),
            category: field("category"),
            employee_id: field("employee_id"),
            payment_method: field("payment_method"),
            installments: field("installments"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SourceFormat {
    JsonArray,
    Csv,
    JsonOther,
    Unknown,
}

fn sniff(content: &str) -> SourceFormat {
    if content.starts_with('[') {
        return SourceFormat::JsonArray;
    }
    if serde_json::from_str::<Value>(content).is_ok() {
        return SourceFormat::JsonOther;
    }
    let first_line = content.lines().find(|line| !line.trim().is_empty());
    if first_line.is_some_and(|line| line.contains(',')) {
        return SourceFormat::Csv;
    }
    SourceFormat::Unknown
}

pub(crate) fn parse_source(content: &str) -> ClientResult<Vec<ParsedRow>> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err(invalid_input_error("Import source is empty."));
    }

    match sniff(trimmed) {
        SourceFormat::JsonArray => parse_json_rows(trimmed),
        SourceFormat::Csv => parse_csv_rows(trimmed),
        SourceFormat::JsonOther => Err(ClientError::invalid_import_format(
            "JSON input must be an array of transaction objects, not a single value.",
            "json_non_array",
        )),
        SourceFormat::Unknown => Err(ClientError::invalid_import_format(
            "Could not recognise the import format. Use a JSON array or a CSV file with a header row.",
            "unknown",
        )),
    }
}

fn parse_json_rows(content: &str) -> ClientResult<Vec<ParsedRow>> {
    let items = serde_json::from_str::<Vec<Value>>(content).map_err(|error| {
        invalid_input_error(&format!("The JSON array could not be parsed: {error}."))
    })?;

    items
        .iter()
        .zip(1_i64..)
        .map(|(item, row)| {
            let object = item.as_object().ok_or_else(|| {
                invalid_input_error(&format!(
                    "Entry {row} of the JSON array is not an object."
                ))
            })?;
            Ok(ParsedRow::from_fields(row, |name| json_text(object, name)))
        })
        .collect()
}

/// Strings pass through; numbers keep their JSON spelling so decimal places
/// survive; `null` counts as absent.
fn json_text(object: &Map<String, Value>, name: &str) -> Option<String> {
    match object.get(name)? {
        Value::Null => None,
        Value::String(text) => Some(text.clone()),
        other => Some(other.to_string()),
    }
}

fn parse_csv_rows(content: &str) -> ClientResult<Vec<ParsedRow>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let headers = reader
        .headers()
        .map_err(|_| invalid_input_error("The CSV header row could not be read."))?
        .iter()
        .map(str::to_string)
        .collect::<Vec<String>>();
    check_headers(&headers)?;

    let column_of = headers
        .iter()
        .enumerate()
        .map(|(index, name)| (name.as_str(), index))
        .collect::<HashMap<&str, usize>>();

    let mut rows = Vec::new();
    for (record, row) in reader.records().zip(1_i64..) {
        let record = record.map_err(|error| {
            invalid_input_error(&format!("CSV row {row} is malformed: {error}."))
        })?;
        rows.push(ParsedRow::from_fields(row, |name| {
            column_of
                .get(name)
                .and_then(|index| record.get(*index))
                .map(str::to_string)
        }));
    }
    Ok(rows)
}

/// Every required header must be present and nothing outside the known
/// fields may appear.
fn check_headers(headers: &[String]) -> ClientResult<()> {
    let required = required_import_field_names();
    let optional = optional_import_field_names();

    let has_required = required
        .iter()
        .all(|name| headers.iter().any(|header| header == name));
    let all_known = headers.iter().all(|header| {
        required
            .iter()
            .chain(optional.iter())
            .any(|name| *name == header.as_str())
    });
    if has_required && all_known {
        return Ok(());
    }

    let expected = required
        .iter()
        .chain(optional.iter())
        .map(|name| (*name).to_string())
        .collect();
    Err(ClientError::import_schema_mismatch(expected, headers.to_vec()))
}
