#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use motopecas_client::SuccessEnvelope;
use motopecas_client::commands::employee::{self, EmployeeAddOptions};
use motopecas_client::commands::import::{self, ImportRunOptions};
use serde_json::Value;
use tempfile::{TempDir, tempdir};

pub fn temp_home() -> std::io::Result<(TempDir, PathBuf)> {
    let dir = tempdir()?;
    let home = dir.path().join("ledger-home");
    Ok((dir, home))
}

pub fn write_file(path: &Path, body: &str) {
    let result = fs::write(path, body);
    assert!(result.is_ok());
}

pub fn envelope_json(envelope: &SuccessEnvelope) -> Value {
    let value = serde_json::to_value(envelope);
    assert!(value.is_ok());
    value.unwrap_or(Value::Null)
}

pub fn import_json(home: &Path, body: &str) -> Value {
    let result = import::run_with_options(ImportRunOptions {
        path: Some("-".to_string()),
        dry_run: false,
        home_override: Some(home),
        stdin_override: Some(body.to_string()),
    });
    assert!(result.is_ok(), "{result:?}");
    match result {
        Ok(envelope) => envelope_json(&envelope),
        Err(_) => Value::Null,
    }
}

pub fn add_employee(home: &Path, name: &str, fixed_salary: &str) -> String {
    let result = employee::add_with_options(EmployeeAddOptions {
        name: name.to_string(),
        role: "Mecânico".to_string(),
        fixed_salary: fixed_salary.to_string(),
        commission_rate: None,
        bonus: None,
        home_override: Some(home),
    });
    assert!(result.is_ok(), "{result:?}");
    result
        .ok()
        .and_then(|envelope| envelope.data["id"].as_str().map(str::to_string))
        .unwrap_or_default()
}

/// Six employees whose fixed salaries add up to 15000, and the four October
/// 2023 transactions of the reference scenario. Returns the employee ids.
pub fn seed_shop_scenario(home: &Path) -> Vec<String> {
    let ids = [
        ("Ana", "4000"),
        ("Bruno", "4000"),
        ("Caio", "0"),
        ("Davi", "1800"),
        ("Elisa", "2200"),
        ("Fábio", "3000"),
    ]
    .iter()
    .map(|(name, salary)| add_employee(home, name, salary))
    .collect::<Vec<String>>();

    let body = format!(
        r#"[
  {{"date":"2023-10-01","description":"Revisão completa","amount":"450","type":"INCOME","category":"Serviços"}},
  {{"date":"2023-10-02","description":"Reposição de estoque","amount":"1200","type":"EXPENSE_SHOP","category":"Estoque"}},
  {{"date":"2023-10-05","description":"Aluguel","amount":"300","type":"EXPENSE_SHOP","category":"Aluguel"}},
  {{"date":"2023-10-12","description":"Comissão","amount":"150","type":"EXPENSE_EMPLOYEE","employee_id":"{}","category":"Comissão"}}
]"#,
        ids[2]
    );
    let payload = import_json(home, &body);
    assert_eq!(payload["data"]["summary"]["inserted"], 4);
    ids
}

/// Decimal fields serialize as strings; compare them numerically.
pub fn decimal_at(payload: &Value, pointer: &str) -> Option<rust_decimal::Decimal> {
    payload.pointer(pointer)?.as_str()?.parse().ok()
}
