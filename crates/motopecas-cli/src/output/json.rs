use std::io;

use motopecas_client::contracts::envelope::failure;
use motopecas_client::{ClientError, SuccessEnvelope};
use serde::Serialize;

/// Success output is the envelope itself: `{ ok, command, version, data }`.
pub fn render_success_json(success: &SuccessEnvelope) -> io::Result<String> {
    serialize_json_pretty(success)
}

pub fn render_error_json(error: &ClientError) -> io::Result<String> {
    serialize_json_pretty(&failure(error))
}

fn serialize_json_pretty<T>(value: &T) -> io::Result<String>
where
    T: Serialize,
{
    serde_json::to_string_pretty(value).map_err(io::Error::other)
}

#[cfg(test)]
mod tests {
    use motopecas_client::{ClientError, SuccessEnvelope};
    use serde_json::{Value, json};

    use super::{render_error_json, render_success_json};

    #[test]
    fn success_json_is_the_envelope() {
        let payload = SuccessEnvelope {
            ok: true,
            command: "employee list".to_string(),
            version: "0.1.0".to_string(),
            data: json!({"ledger_version": 3, "rows": []}),
        };

        let rendered = render_success_json(&payload);
        assert!(rendered.is_ok());
        if let Ok(text) = rendered {
            let parsed: Result<Value, _> = serde_json::from_str(&text);
            assert!(parsed.is_ok());
            if let Ok(value) = parsed {
                assert_eq!(value["ok"], Value::Bool(true));
                assert_eq!(value["command"], "employee list");
                assert_eq!(value["data"]["ledger_version"], 3);
            }
        }
    }

    #[test]
    fn error_json_carries_structured_data_when_present() {
        let error = ClientError::new("import_validation_failed", "bad rows", vec![])
            .with_data(json!({"issues": [{"row": 2}]}));
        let rendered = render_error_json(&error);
        assert!(rendered.is_ok());
        if let Ok(text) = rendered {
            let parsed: Result<Value, _> = serde_json::from_str(&text);
            assert!(parsed.is_ok());
            if let Ok(value) = parsed {
                assert_eq!(value["ok"], Value::Bool(false));
                assert_eq!(value["error"]["code"], "import_validation_failed");
                assert_eq!(value["error"]["data"]["issues"][0]["row"], 2);
            }
        }
    }
}
