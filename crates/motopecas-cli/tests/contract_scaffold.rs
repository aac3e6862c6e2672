use std::fs;
use std::io::{BufRead, BufReader, Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use serde_json::Value;

const EXPECTED_ROOT_HELP: &str = "motopecas - back-office ledger for a motorcycle-parts shop

Usage:
  motopecas <command>

Start here:
  motopecas dash
  motopecas employee list
  motopecas import --help
";

static TEST_COUNTER: AtomicU64 = AtomicU64::new(1);

struct CliOutput {
    ok: bool,
    code: Option<i32>,
    stdout: String,
    stderr: String,
}

fn unique_test_home() -> PathBuf {
    let mut path = std::env::temp_dir();
    let stamp = match SystemTime::now().duration_since(UNIX_EPOCH) {
        Ok(value) => value.as_nanos(),
        Err(_) => 0,
    };
    let sequence = TEST_COUNTER.fetch_add(1, Ordering::Relaxed);
    path.push(format!(
        "motopecas-cli-test-{}-{stamp}-{sequence}",
        std::process::id()
    ));
    path
}

fn run_cli_full(
    home: &Path,
    args: &[&str],
    input: Option<&str>,
    log_filter: Option<&str>,
) -> CliOutput {
    let mut command = Command::new(env!("CARGO_BIN_EXE_motopecas"));
    command.args(args);
    command.env("MOTOPECAS_HOME", home);
    match log_filter {
        Some(filter) => command.env("MOTOPECAS_LOG", filter),
        None => command.env_remove("MOTOPECAS_LOG"),
    };
    if input.is_some() {
        command.stdin(Stdio::piped());
    }
    command.stdout(Stdio::piped());
    command.stderr(Stdio::piped());

    let mut result = CliOutput {
        ok: false,
        code: None,
        stdout: String::new(),
        stderr: String::new(),
    };

    let child_spawn = command.spawn();
    assert!(child_spawn.is_ok());
    let Ok(mut child) = child_spawn else {
        return result;
    };
    if let Some(body) = input {
        let stdin = child.stdin.take();
        assert!(stdin.is_some());
        if let Some(mut pipe) = stdin {
            let write_result = pipe.write_all(body.as_bytes());
            assert!(write_result.is_ok());
        }
    }

    let output = child.wait_with_output();
    assert!(output.is_ok());
    if let Ok(finished) = output {
        result.ok = finished.status.success();
        result.code = finished.status.code();
        result.stdout = String::from_utf8_lossy(&finished.stdout).into_owned();
        result.stderr = String::from_utf8_lossy(&finished.stderr).into_owned();
    }
    result
}

fn run_in(home: &Path, args: &[&str]) -> CliOutput {
    run_cli_full(home, args, None, None)
}

fn run_cli(args: &[&str]) -> CliOutput {
    run_in(&unique_test_home(), args)
}

fn write_source_file(home: &Path, name: &str, body: &str) -> PathBuf {
    let create_home = fs::create_dir_all(home);
    assert!(create_home.is_ok());

    let source_path = home.join(name);
    let write = fs::write(&source_path, body);
    assert!(write.is_ok());
    source_path
}

fn parse_json(body: &str) -> Value {
    let parsed = serde_json::from_str::<Value>(body);
    assert!(parsed.is_ok(), "not JSON: {body}");
    parsed.unwrap_or(Value::Null)
}

fn add_employee(home: &Path, name: &str, salary: &str) -> String {
    let output = run_in(
        home,
        &[
            "employee",
            "add",
            "--name",
            name,
            "--role",
            "Mecânico",
            "--fixed-salary",
            salary,
            "--json",
        ],
    );
    assert!(output.ok, "employee add failed: {}", output.stdout);
    parse_json(&output.stdout)["data"]["id"]
        .as_str()
        .unwrap_or_default()
        .to_string()
}

fn decimal_text(value: &Value) -> String {
    value
        .as_str()
        .and_then(|text| text.parse::<f64>().ok())
        .map(|number| format!("{number:.2}"))
        .unwrap_or_default()
}

fn assert_text_error_contract(body: &str, code: &str) {
    assert!(body.contains("The command did not complete."));
    assert!(body.contains(&format!("  Error:    {code}")));
    assert!(body.contains("  Details:"));
    assert!(body.contains("What to do next:"));
}

fn assert_json_error_contract(body: &str, code: &str) -> Value {
    let payload = parse_json(body);
    assert_eq!(payload["ok"], Value::Bool(false));
    assert_eq!(payload["error"]["code"], Value::String(code.to_string()));
    assert!(payload["error"]["message"].is_string());
    assert!(payload["error"]["recovery_steps"].is_array());
    payload
}

fn assert_pipe_close_does_not_panic(home: &Path, args: &[&str], expect_success: bool) {
    let mut producer = Command::new(env!("CARGO_BIN_EXE_motopecas"));
    producer.args(args);
    producer.env("MOTOPECAS_HOME", home);
    producer.stdout(Stdio::piped());
    producer.stderr(Stdio::piped());

    let producer_spawn = producer.spawn();
    assert!(producer_spawn.is_ok());
    let Ok(mut producer_child) = producer_spawn else {
        return;
    };

    if let Some(stdout_pipe) = producer_child.stdout.take() {
        let mut reader = BufReader::new(stdout_pipe);
        let mut first_line = String::new();
        let read_result = reader.read_line(&mut first_line);
        assert!(read_result.is_ok());
        assert!(!first_line.is_empty());
        drop(reader);
    }

    let status = producer_child.wait();
    assert!(status.is_ok());
    if let Ok(exit_status) = status {
        assert_eq!(exit_status.success(), expect_success);
    }

    if let Some(mut stderr_pipe) = producer_child.stderr.take() {
        let mut stderr_text = String::new();
        let stderr_read = stderr_pipe.read_to_string(&mut stderr_text);
        assert!(stderr_read.is_ok());
        assert!(!stderr_text.contains("Broken pipe"));
        assert!(!stderr_text.contains("panicked"));
    }
}

#[test]
fn root_command_uses_short_plaintext_help() {
    let output = run_cli(&[]);
    assert!(output.ok);
    assert_eq!(output.stdout, EXPECTED_ROOT_HELP);
}

#[test]
fn help_and_version_return_success_output() {
    let help = run_cli(&["--help"]);
    assert!(help.ok);
    assert!(help.stdout.starts_with("motopecas - back-office ledger"));
    assert!(help.stdout.contains("See how the shop is doing:"));
    assert!(help.stdout.contains("MOTOPECAS_HOME"));

    let version = run_cli(&["--version"]);
    assert!(version.ok);
    assert_eq!(version.stdout.trim(), "motopecas 0.1.0");
}

#[test]
fn import_help_shows_workflow_and_fields() {
    let output = run_cli(&["import", "--help"]);
    assert!(output.ok);
    assert!(output.stdout.contains("How import works:"));
    assert!(output.stdout.contains("EXPENSE_EMPLOYEE"));
    assert!(output.stdout.contains("installments"));
}

#[test]
fn pipe_close_does_not_panic() {
    let home = unique_test_home();
    assert_pipe_close_does_not_panic(&home, &["import", "--help"], true);
    assert_pipe_close_does_not_panic(&home, &["transaction", "list"], true);
    assert_pipe_close_does_not_panic(&home, &["dash", "--nope"], false);
}

#[test]
fn parse_errors_use_text_or_json_contract_and_exit_one() {
    let text = run_cli(&["transaction", "add", "--amount", "10"]);
    assert!(!text.ok);
    assert_eq!(text.code, Some(1));
    assert_text_error_contract(&text.stdout, "invalid_argument");
    assert!(text.stdout.contains("motopecas transaction add --help"));

    let json = run_cli(&["dash", "--date", "2023-02-30", "--json"]);
    assert_eq!(json.code, Some(1));
    let payload = assert_json_error_contract(&json.stdout, "invalid_argument");
    assert_eq!(payload["error"]["data"]["command_hint"], "dash");
}

#[test]
fn dash_reports_payroll_and_month_comparison() {
    let home = unique_test_home();
    let employee_id = add_employee(&home, "Ana", "4000");
    add_employee(&home, "Bruno", "4000");

    let rows = [
        ["2023-10-01", "Revisão completa", "450", "INCOME"],
        ["2023-10-05", "Pastilhas de freio", "1500", "EXPENSE_SHOP"],
    ];
    for [date, description, amount, kind] in rows {
        let output = run_in(
            &home,
            &[
                "transaction",
                "add",
                "--date",
                date,
                "--description",
                description,
                "--amount",
                amount,
                "--type",
                kind,
            ],
        );
        assert!(output.ok, "transaction add failed: {}", output.stdout);
        assert!(output.stdout.starts_with("Transaction added."));
    }
    let commission = run_in(
        &home,
        &[
            "transaction",
            "add",
            "--date",
            "2023-10-12",
            "--description",
            "Comissão",
            "--amount",
            "150",
            "--type",
            "EXPENSE_EMPLOYEE",
            "--employee-id",
            &employee_id,
            "--category",
            "Comissão",
        ],
    );
    assert!(commission.ok);

    let dash = run_in(&home, &["dash", "--date", "2023-10-20", "--json"]);
    assert!(dash.ok);
    let payload = parse_json(&dash.stdout);
    assert_eq!(payload["command"], "dash");
    let stats = &payload["data"]["report"]["stats"];
    assert_eq!(decimal_text(&stats["total_fixed_payroll"]), "8000.00");
    assert_eq!(decimal_text(&stats["total_expense"]), "9650.00");
    assert_eq!(decimal_text(&stats["net_balance"]), "-9200.00");
    assert_eq!(
        payload["data"]["report"]["categories"][0]["category"],
        "Salário Base"
    );
    assert_eq!(
        decimal_text(&payload["data"]["report"]["comparison"]["current"]["expenses"]),
        "1650.00"
    );

    let text = run_in(&home, &["dash", "--date", "2023-10-20"]);
    assert!(text.ok);
    assert!(text.stdout.starts_with("Dashboard for 2023-10"));
    assert!(text.stdout.contains("R$ 8.000,00"));
    assert!(text.stdout.contains("Month comparison (2023-10 vs 2023-09):"));
}

#[test]
fn compare_rolls_january_back_to_december() {
    let home = unique_test_home();
    for (date, amount) in [("2023-12-20", "400"), ("2024-01-05", "1000")] {
        let output = run_in(
            &home,
            &[
                "transaction",
                "add",
                "--date",
                date,
                "--description",
                "Venda",
                "--amount",
                amount,
                "--type",
                "INCOME",
            ],
        );
        assert!(output.ok);
    }

    let output = run_in(&home, &["compare", "--date", "2024-01-15", "--json"]);
    assert!(output.ok);
    let comparison = &parse_json(&output.stdout)["data"]["comparison"];
    assert_eq!(comparison["previous"]["month"]["year"], 2023);
    assert_eq!(comparison["previous"]["month"]["month"], 12);
    assert_eq!(decimal_text(&comparison["income_growth_pct"]), "150.00");

    let text = run_in(&home, &["compare", "--date", "2024-01-15"]);
    assert!(text.ok);
    assert!(text.stdout.contains("2024-01 vs 2023-12"));
    assert!(text.stdout.contains("150,00%"));
}

#[test]
fn transaction_lifecycle_and_dangling_employee() {
    let home = unique_test_home();
    let employee_id = add_employee(&home, "Caio", "0");
    let added = run_in(
        &home,
        &[
            "transaction",
            "add",
            "--date",
            "2023-10-12",
            "--description",
            "Vale",
            "--amount",
            "80",
            "--type",
            "EXPENSE_EMPLOYEE",
            "--employee-id",
            &employee_id,
            "--json",
        ],
    );
    assert!(added.ok);
    let transaction_id = parse_json(&added.stdout)["data"]["id"]
        .as_str()
        .unwrap_or_default()
        .to_string();

    let deleted_employee = run_in(&home, &["employee", "delete", &employee_id]);
    assert!(deleted_employee.ok);
    assert!(deleted_employee.stdout.starts_with("Employee deleted."));

    let list = run_in(&home, &["transaction", "list", "--month", "2023-10", "--json"]);
    assert!(list.ok);
    let payload = parse_json(&list.stdout);
    assert_eq!(payload["data"]["rows"][0]["employee_name"], "unknown employee");

    let updated = run_in(
        &home,
        &[
            "transaction",
            "update",
            &transaction_id,
            "--type",
            "EXPENSE_SHOP",
            "--json",
        ],
    );
    assert!(updated.ok);
    let updated_row = &parse_json(&updated.stdout)["data"]["transaction"];
    assert_eq!(updated_row["type"], "EXPENSE_SHOP");
    assert!(updated_row["employee_id"].is_null());

    let removed = run_in(&home, &["transaction", "delete", &transaction_id]);
    assert!(removed.ok);
    assert!(removed.stdout.starts_with("Transaction deleted."));

    let missing = run_in(&home, &["transaction", "delete", &transaction_id, "--json"]);
    assert_eq!(missing.code, Some(1));
    assert_json_error_contract(&missing.stdout, "transaction_not_found");

    let empty = run_in(&home, &["transaction", "list"]);
    assert!(empty.ok);
    assert!(empty.stdout.starts_with("No transactions found."));
}

#[test]
fn employee_list_shows_total_payroll() {
    let home = unique_test_home();
    add_employee(&home, "Davi", "1800");
    add_employee(&home, "Elisa", "2200");

    let text = run_in(&home, &["employee", "list"]);
    assert!(text.ok);
    assert!(text.stdout.starts_with("2 employees."));
    assert!(text.stdout.contains("R$ 4.000,00"));

    let json = run_in(&home, &["employee", "list", "--json"]);
    assert!(json.ok);
    assert_eq!(
        decimal_text(&parse_json(&json.stdout)["data"]["total_fixed_payroll"]),
        "4000.00"
    );
}

#[test]
fn import_dry_run_then_commit() {
    let home = unique_test_home();
    let source = write_source_file(
        &home,
        "october.csv",
        "date,description,amount,type,category\n\
         2023-10-01,Revisão,450.00,INCOME,Serviços\n\
         2023-10-02,Aluguel,1200,EXPENSE_FIXED,Aluguel\n",
    );
    let source_text = source.display().to_string();

    let dry_run = run_in(&home, &["import", "--dry-run", &source_text]);
    assert!(dry_run.ok);
    assert!(dry_run.stdout.starts_with("Dry-run validation completed successfully."));
    assert!(dry_run.stdout.contains("No rows were written"));

    let before = run_in(&home, &["transaction", "list", "--json"]);
    assert_eq!(parse_json(&before.stdout)["data"]["rows"], Value::Array(Vec::new()));

    let commit = run_in(&home, &["import", &source_text, "--json"]);
    assert!(commit.ok);
    let payload = parse_json(&commit.stdout);
    assert_eq!(payload["command"], "import");
    assert_eq!(payload["data"]["summary"]["inserted"], 2);

    let after = run_in(&home, &["transaction", "list", "--json"]);
    let rows = parse_json(&after.stdout)["data"]["rows"].clone();
    assert_eq!(rows.as_array().map(Vec::len), Some(2));
    assert_eq!(rows[1]["type"], "EXPENSE_SHOP");
}

#[test]
fn import_from_stdin_rejects_the_whole_file_on_one_bad_row() {
    let home = unique_test_home();
    let body = r#"[
      {"date":"2023-10-01","description":"ok","amount":10,"type":"INCOME"},
      {"date":"2023-10-32","description":"bad date","amount":5,"type":"INCOME"}
    ]"#;

    let json = run_cli_full(&home, &["import", "-", "--json"], Some(body), None);
    assert_eq!(json.code, Some(1));
    let payload = assert_json_error_contract(&json.stdout, "import_validation_failed");
    assert_eq!(payload["error"]["data"]["issues"][0]["row"], 2);
    assert_eq!(payload["error"]["data"]["issues"][0]["code"], "invalid_date");

    let text = run_cli_full(&home, &["import", "-"], Some(body), None);
    assert_eq!(text.code, Some(1));
    assert_text_error_contract(&text.stdout, "import_validation_failed");
    assert!(text.stdout.contains("Issues:"));

    let list = run_in(&home, &["transaction", "list", "--json"]);
    assert_eq!(parse_json(&list.stdout)["data"]["rows"], Value::Array(Vec::new()));
}

#[test]
fn fee_command_text_and_json() {
    let home = unique_test_home();
    let text = run_in(
        &home,
        &["fee", "1000", "--acquirer", "Stone", "--brand", "Visa", "--advance"],
    );
    assert!(text.ok);
    assert!(text.stdout.starts_with("Card settlement for R$ 1.000,00"));
    assert!(text.stdout.contains("R$ 963,20"));

    let json = run_in(&home, &["fee", "1000", "--rate", "2.18", "--json"]);
    assert!(json.ok);
    let payload = parse_json(&json.stdout);
    assert_eq!(payload["data"]["rate_source"], "explicit");
    assert_eq!(decimal_text(&payload["data"]["breakdown"]["net_amount"]), "978.20");
    assert!(!home.join("ledger.db").exists());

    let unknown = run_in(
        &home,
        &["fee", "1000", "--acquirer", "Nowhere", "--brand", "Visa", "--json"],
    );
    assert_eq!(unknown.code, Some(1));
    assert_json_error_contract(&unknown.stdout, "fee_rate_not_found");
}

#[test]
fn debug_logs_go_to_stderr_and_keep_stdout_json() {
    let home = unique_test_home();
    let output = run_cli_full(
        &home,
        &["dash", "--date", "2023-10-20", "--json"],
        None,
        Some("debug"),
    );
    assert!(output.ok);
    let payload = parse_json(&output.stdout);
    assert_eq!(payload["ok"], Value::Bool(true));
    assert!(!output.stderr.is_empty());

    let quiet = run_in(&home, &["dash", "--date", "2023-10-20", "--json"]);
    assert!(quiet.ok);
    assert!(quiet.stderr.is_empty());
}
