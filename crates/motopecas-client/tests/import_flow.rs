mod support;

use std::path::Path;

use motopecas_client::commands::import::{self, ImportRunOptions};
use motopecas_client::commands::transaction;
use motopecas_client::contracts::envelope::failure;
use serde_json::Value;
use support::{envelope_json, temp_home, write_file};

fn run_import(
    home: &Path,
    path: Option<String>,
    dry_run: bool,
    stdin_override: Option<&str>,
) -> motopecas_client::ClientResult<motopecas_client::SuccessEnvelope> {
    import::run_with_options(ImportRunOptions {
        path,
        dry_run,
        home_override: Some(home),
        stdin_override: stdin_override.map(std::string::ToString::to_string),
    })
}

fn listed_rows(home: &Path) -> Vec<Value> {
    let result = transaction::list_with_options(transaction::TransactionListOptions {
        month: None,
        home_override: Some(home),
    });
    assert!(result.is_ok());
    result
        .ok()
        .map(|envelope| envelope_json(&envelope))
        .and_then(|payload| payload["data"]["rows"].as_array().cloned())
        .unwrap_or_default()
}

const CSV_BODY: &str = "date,description,amount,type,category,payment_method,installments
2023-10-01,Troca de óleo,180.00,INCOME,Serviços,Cartão de Crédito,2
2023-10-02,Pneus,950.5,EXPENSE_COMMON,Estoque,,
2023-10-03,Luz,120,EXPENSE_FIXED,,,
";

#[test]
fn dry_run_validates_without_writing() {
    let temp = temp_home();
    assert!(temp.is_ok());
    let Ok((_dir, home)) = temp else {
        return;
    };
    let source = home.with_extension("csv");
    write_file(&source, CSV_BODY);

    let result = run_import(&home, Some(source.display().to_string()), true, None);
    assert!(result.is_ok(), "{result:?}");
    if let Ok(envelope) = result {
        let payload = envelope_json(&envelope);
        assert_eq!(payload["command"], "import");
        assert_eq!(payload["data"]["dry_run"], true);
        assert_eq!(payload["data"]["summary"]["rows_read"], 3);
        assert_eq!(payload["data"]["summary"]["rows_valid"], 3);
        assert_eq!(payload["data"]["summary"]["inserted"], 0);
        assert_eq!(payload["data"]["next_step"]["command"], "motopecas import <path>");
    }
    assert!(listed_rows(&home).is_empty());
}

#[test]
fn csv_import_commits_rows_in_order_with_legacy_types_normalized() {
    let temp = temp_home();
    assert!(temp.is_ok());
    let Ok((_dir, home)) = temp else {
        return;
    };
    let source = home.with_extension("csv");
    write_file(&source, CSV_BODY);

    let result = run_import(&home, Some(source.display().to_string()), false, None);
    assert!(result.is_ok(), "{result:?}");
    if let Ok(envelope) = result {
        let payload = envelope_json(&envelope);
        assert_eq!(payload["data"]["summary"]["inserted"], 3);
        assert_eq!(payload["data"]["ledger_version"], 3);
        assert_eq!(
            payload["data"]["transaction_ids"].as_array().map(Vec::len),
            Some(3)
        );
    }

    let rows = listed_rows(&home);
    let types = rows
        .iter()
        .filter_map(|row| row["type"].as_str())
        .collect::<Vec<&str>>();
    assert_eq!(types, vec!["INCOME", "EXPENSE_SHOP", "EXPENSE_SHOP"]);
    assert_eq!(rows[0]["installments"], 2);
    assert_eq!(rows[0]["payment_method"], "Cartão de Crédito");
    assert_eq!(rows[2]["category"], "Outros");
}

#[test]
fn one_invalid_row_rejects_the_whole_import() {
    let temp = temp_home();
    assert!(temp.is_ok());
    let Ok((_dir, home)) = temp else {
        return;
    };

    let body = r#"[
      {"date":"2023-10-01","description":"ok","amount":"10","type":"INCOME"},
      {"date":"2023-10-02","description":"sem funcionário","amount":"5","type":"EXPENSE_EMPLOYEE"}
    ]"#;
    let result = run_import(&home, Some("-".to_string()), false, Some(body));
    assert!(result.is_err());
    if let Err(error) = result {
        assert_eq!(error.code, "import_validation_failed");
        let payload = serde_json::to_value(failure(&error)).unwrap_or(Value::Null);
        assert_eq!(payload["ok"], false);
        assert_eq!(payload["error"]["data"]["summary"]["rows_invalid"], 1);
        assert_eq!(payload["error"]["data"]["issues"][0]["row"], 2);
        assert_eq!(payload["error"]["data"]["issues"][0]["field"], "employee_id");
    }
    assert!(listed_rows(&home).is_empty());
}

#[test]
fn unknown_csv_header_is_a_schema_mismatch() {
    let temp = temp_home();
    assert!(temp.is_ok());
    let Ok((_dir, home)) = temp else {
        return;
    };

    let body = "date,description,amount,type,currency\n2023-10-01,x,10,INCOME,BRL\n";
    let result = run_import(&home, Some("-".to_string()), false, Some(body));
    assert!(result.is_err());
    if let Err(error) = result {
        assert_eq!(error.code, "import_schema_mismatch");
    }
}

#[test]
fn empty_array_imports_nothing() {
    let temp = temp_home();
    assert!(temp.is_ok());
    let Ok((_dir, home)) = temp else {
        return;
    };

    let result = run_import(&home, None, false, Some("[]"));
    assert!(result.is_ok());
    if let Ok(envelope) = result {
        let payload = envelope_json(&envelope);
        assert_eq!(payload["data"]["summary"]["inserted"], 0);
        assert_eq!(payload["data"]["ledger_version"], 0);
    }
}
