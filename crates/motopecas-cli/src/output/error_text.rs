use motopecas_client::ClientError;
use serde_json::Value;

use super::format::{self, Column, text_field};

pub fn render_error(error: &ClientError) -> String {
    let mut lines = vec![
        "The command did not complete.".to_string(),
        String::new(),
        format!("  Error:    {}", error.code),
        format!("  Details:  {}", error.message),
    ];

    let issues = error
        .data
        .as_ref()
        .and_then(|data| data.get("issues"))
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();
    if !issues.is_empty() {
        lines.push(String::new());
        lines.push("Issues:".to_string());
        lines.extend(render_issues(&issues));
    }

    lines.push(String::new());
    lines.push("What to do next:".to_string());
    if error.recovery_steps.is_empty() {
        lines.push("  1. Retry the command.".to_string());
    } else {
        lines.extend(
            error
                .recovery_steps
                .iter()
                .enumerate()
                .map(|(index, step)| format!("  {}. {step}", index + 1)),
        );
    }

    lines.join("\n")
}

fn render_issues(issues: &[Value]) -> Vec<String> {
    let rows = issues
        .iter()
        .map(|issue| {
            vec![
                issue
                    .get("row")
                    .and_then(Value::as_i64)
                    .map(|row| row.to_string())
                    .unwrap_or_default(),
                text_field(issue, "field").to_string(),
                text_field(issue, "code").to_string(),
                text_field(issue, "description").to_string(),
            ]
        })
        .collect::<Vec<Vec<String>>>();

    format::render_table_or_blocks(
        &[
            Column::right("Row"),
            Column::left("Field"),
            Column::left("Code"),
            Column::left("Description"),
        ],
        &rows,
        format::terminal_width(),
        "Issue",
    )
}
