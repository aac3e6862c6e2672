mod dash_text;
mod error_text;
mod fee_text;
mod format;
mod import_text;
mod json;
mod ledger_text;
mod mode;

use std::io;

use motopecas_client::{ClientError, SuccessEnvelope};

pub use mode::{OutputMode, mode_for_command};

use crate::stdout_io::write_stdout_line;

pub fn print_success(success: &SuccessEnvelope, mode: OutputMode) -> io::Result<()> {
    let body = match mode {
        OutputMode::Text => render_text_success(success)?,
        OutputMode::Json => json::render_success_json(success)?,
    };
    write_stdout_line(&body)
}

pub fn print_failure(error: &ClientError, mode: OutputMode) -> io::Result<()> {
    let body = match mode {
        OutputMode::Json => json::render_error_json(error)?,
        OutputMode::Text => error_text::render_error(error),
    };
    write_stdout_line(&body)
}

fn render_text_success(success: &SuccessEnvelope) -> io::Result<String> {
    match success.command.as_str() {
        "dash" => dash_text::render_dash(&success.data),
        "compare" => dash_text::render_compare(&success.data),
        "fee" => fee_text::render_fee(&success.data),
        "transaction list" => ledger_text::render_transaction_list(&success.data),
        "transaction add" | "transaction update" | "transaction delete" => {
            ledger_text::render_transaction_mutation(&success.data)
        }
        "employee list" => ledger_text::render_employee_list(&success.data),
        "employee add" | "employee update" | "employee delete" => {
            ledger_text::render_employee_mutation(&success.data)
        }
        "import" => import_text::render_import_run(&success.data),
        _ => Err(io::Error::other(format!(
            "unsupported text output command `{}`",
            success.command
        ))),
    }
}
