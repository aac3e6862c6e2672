use std::io;

use serde_json::Value;

use super::format::{self, brl_field, percent_field, text_field};

pub fn render_fee(data: &Value) -> io::Result<String> {
    let breakdown = data
        .get("breakdown")
        .ok_or_else(|| io::Error::other("fee output requires breakdown"))?;
    let apply_advance = data
        .get("apply_advance")
        .and_then(Value::as_bool)
        .unwrap_or(false);

    let source = match text_field(data, "rate_source") {
        "schedule" => format!(
            "fee schedule ({} / {})",
            text_field(data, "acquirer"),
            text_field(data, "brand")
        ),
        _ => "explicit rate".to_string(),
    };

    let mut lines = vec![
        format!("Card settlement for {}", brl_field(breakdown, "gross_amount")),
        String::new(),
        "Rates:".to_string(),
    ];
    let mut rates = vec![
        ("Source:", source),
        ("Fee rate:", percent_field(data, "fee_rate_percent")),
    ];
    if apply_advance {
        rates.push(("Advance rate:", percent_field(data, "advance_rate_percent")));
    }
    lines.extend(format::key_value_rows(&rates, 2));

    lines.push(String::new());
    lines.push("Breakdown:".to_string());
    let mut amounts = vec![
        ("Gross:", brl_field(breakdown, "gross_amount")),
        ("Fee:", brl_field(breakdown, "fee_amount")),
    ];
    if apply_advance {
        amounts.push(("Advance:", brl_field(breakdown, "advance_amount")));
    }
    amounts.push(("Net:", brl_field(breakdown, "net_amount")));
    lines.extend(format::key_value_rows(&amounts, 2));

    Ok(lines.join("\n"))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::render_fee;

    #[test]
    fn schedule_fee_with_advance_shows_every_line() {
        let data = json!({
            "rate_source": "schedule",
            "acquirer": "Stone",
            "brand": "Visa",
            "fee_rate_percent": "2.18",
            "apply_advance": true,
            "advance_rate_percent": "1.50",
            "breakdown": {
                "gross_amount": "1000",
                "fee_amount": "21.80",
                "advance_amount": "15.00",
                "net_amount": "963.20"
            }
        });

        let rendered = render_fee(&data);
        assert!(rendered.is_ok());
        if let Ok(text) = rendered {
            assert!(text.starts_with("Card settlement for R$ 1.000,00"));
            assert!(text.contains("fee schedule (Stone / Visa)"));
            assert!(text.contains("Advance rate:  1,50%"));
            assert!(text.contains("Net:      R$ 963,20"));
        }
    }

    #[test]
    fn explicit_fee_hides_advance_lines() {
        let data = json!({
            "rate_source": "explicit",
            "fee_rate_percent": "2.5",
            "apply_advance": false,
            "advance_rate_percent": "0",
            "breakdown": {
                "gross_amount": "1000",
                "fee_amount": "25",
                "advance_amount": "0",
                "net_amount": "975"
            }
        });

        let rendered = render_fee(&data);
        assert!(rendered.is_ok());
        if let Ok(text) = rendered {
            assert!(text.contains("explicit rate"));
            assert!(!text.contains("Advance"));
            assert!(text.contains("Net:    R$ 975,00"));
        }
    }
}
