use std::io;

use serde_json::{Map, Value};

use super::format;

pub fn render_import_run(data: &Value) -> io::Result<String> {
    let dry_run = data
        .get("dry_run")
        .and_then(Value::as_bool)
        .unwrap_or(false);
    let summary = data
        .get("summary")
        .and_then(Value::as_object)
        .ok_or_else(|| io::Error::other("import output requires summary"))?;

    let mut lines = vec![
        if dry_run {
            "Dry-run validation completed successfully.".to_string()
        } else {
            "Import completed successfully.".to_string()
        },
        String::new(),
        "Summary:".to_string(),
    ];

    let mut entries = vec![
        (
            "Source:",
            match data.get("path").and_then(Value::as_str) {
                None | Some("-") => "stdin".to_string(),
                Some(path) => path.to_string(),
            },
        ),
        ("Rows read:", get_i64(summary, "rows_read").to_string()),
        ("Rows valid:", get_i64(summary, "rows_valid").to_string()),
        ("Rows invalid:", get_i64(summary, "rows_invalid").to_string()),
        ("Inserted:", get_i64(summary, "inserted").to_string()),
    ];
    if let Some(version) = data.get("ledger_version").and_then(Value::as_u64) {
        entries.push(("Ledger version:", version.to_string()));
    }
    lines.extend(format::key_value_rows(&entries, 2));

    if dry_run {
        lines.push(String::new());
        lines.push("No rows were written because this was a dry run.".to_string());
    }

    if let Some(next_step) = data.get("next_step") {
        lines.push(String::new());
        lines.push("What to do next:".to_string());
        lines.push(format!(
            "  {}: `{}`",
            format::text_field(next_step, "label"),
            format::text_field(next_step, "command")
        ));
    }

    Ok(lines.join("\n"))
}

fn get_i64(map: &Map<String, Value>, key: &str) -> i64 {
    map.get(key).and_then(Value::as_i64).unwrap_or(0)
}
