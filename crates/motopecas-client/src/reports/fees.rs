//! Card settlement fees.
//!
//! [`compute_net`] is the pure calculation; [`FeeSchedule`] is the
//! acquirer × brand rate table the caller resolves rates from.

use std::fs;
use std::path::Path;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{ClientError, ClientResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FeeBreakdown {
    pub gross_amount: Decimal,
    pub fee_amount: Decimal,
    pub advance_amount: Decimal,
    pub net_amount: Decimal,
}

/// Net settlement for a card payment.
///
/// The advance fee is charged on the gross amount, not on the amount left
/// after the acquirer fee. Negative inputs are clamped to zero and products
/// beyond the decimal range saturate.
pub fn compute_net(
    gross_amount: Decimal,
    fee_rate_percent: Decimal,
    apply_advance: bool,
    advance_rate_percent: Decimal,
) -> FeeBreakdown {
    let gross_amount = gross_amount.max(Decimal::ZERO);
    let fee_rate_percent = fee_rate_percent.max(Decimal::ZERO);
    let advance_rate_percent = advance_rate_percent.max(Decimal::ZERO);

    let percent_of = |rate: Decimal| gross_amount.saturating_mul(rate) / Decimal::ONE_HUNDRED;
    let fee_amount = percent_of(fee_rate_percent);
    let advance_amount = if apply_advance {
        percent_of(advance_rate_percent)
    } else {
        Decimal::ZERO
    };

    FeeBreakdown {
        gross_amount,
        fee_amount,
        advance_amount,
        net_amount: gross_amount
            .saturating_sub(fee_amount)
            .saturating_sub(advance_amount),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeRate {
    pub acquirer: String,
    pub brand: String,
    pub rate_percent: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdvanceRate {
    pub acquirer: String,
    pub rate_percent: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeSchedule {
    pub rates: Vec<FeeRate>,
    #[serde(default)]
    pub advance_rates: Vec<AdvanceRate>,
}

impl Default for FeeSchedule {
    fn default() -> Self {
        let rate = |acquirer: &str, brand: &str, basis_points: i64| FeeRate {
            acquirer: acquirer.to_string(),
            brand: brand.to_string(),
            rate_percent: Decimal::new(basis_points, 2),
        };
        Self {
            rates: vec![
                rate("Stone", "Visa", 218),
                rate("Stone", "Mastercard", 218),
                rate("Stone", "Elo", 269),
                rate("Cielo", "Visa", 239),
                rate("Cielo", "Mastercard", 239),
                rate("Cielo", "Elo", 289),
                rate("PagSeguro", "Visa", 299),
                rate("PagSeguro", "Mastercard", 299),
            ],
            advance_rates: vec![
                AdvanceRate {
                    acquirer: "Stone".to_string(),
                    rate_percent: Decimal::new(150, 2),
                },
                AdvanceRate {
                    acquirer: "Cielo".to_string(),
                    rate_percent: Decimal::new(199, 2),
                },
            ],
        }
    }
}

impl FeeSchedule {
    /// Loads `fees.json`; a missing file means the built-in schedule.
    pub fn load(path: &Path) -> ClientResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let body = fs::read_to_string(path)
            .map_err(|error| ClientError::fee_schedule_invalid(path, &error.to_string()))?;
        let schedule = serde_json::from_str::<Self>(&body)
            .map_err(|error| ClientError::fee_schedule_invalid(path, &error.to_string()))?;

        let out_of_range = schedule
            .rates
            .iter()
            .map(|rate| rate.rate_percent)
            .chain(schedule.advance_rates.iter().map(|rate| rate.rate_percent))
            .any(|value| value.is_sign_negative() || value > Decimal::ONE_HUNDRED);
        if out_of_range {
            return Err(ClientError::fee_schedule_invalid(
                path,
                "rates must be percentages between 0 and 100",
            ));
        }

        tracing::debug!(path = %path.display(), rates = schedule.rates.len(), "loaded fee schedule");
        Ok(schedule)
    }

    pub fn rate_for(&self, acquirer: &str, brand: &str) -> Option<Decimal> {
        self.rates
            .iter()
            .find(|rate| {
                rate.acquirer.eq_ignore_ascii_case(acquirer.trim())
                    && rate.brand.eq_ignore_ascii_case(brand.trim())
            })
            .map(|rate| rate.rate_percent)
    }

    pub fn advance_rate_for(&self, acquirer: &str) -> Option<Decimal> {
        self.advance_rates
            .iter()
            .find(|rate| rate.acquirer.eq_ignore_ascii_case(acquirer.trim()))
            .map(|rate| rate.rate_percent)
    }

    /// Resolves the rates for `acquirer`/`brand` and computes the settlement.
    ///
    /// An acquirer without a configured advance rate settles with a zero
    /// advance fee.
    pub fn settle(
        &self,
        gross_amount: Decimal,
        acquirer: &str,
        brand: &str,
        apply_advance: bool,
    ) -> ClientResult<FeeBreakdown> {
        let fee_rate = self
            .rate_for(acquirer, brand)
            .ok_or_else(|| ClientError::fee_rate_not_found(acquirer, brand))?;
        let advance_rate = self.advance_rate_for(acquirer).unwrap_or(Decimal::ZERO);
        Ok(compute_net(gross_amount, fee_rate, apply_advance, advance_rate))
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use rust_decimal::Decimal;
    use tempfile::tempdir;

    use super::{FeeSchedule, compute_net};

    #[test]
    fn card_fee_without_advance() {
        let result = compute_net(
            Decimal::new(1000, 0),
            Decimal::new(218, 2),
            false,
            Decimal::ZERO,
        );
        assert_eq!(result.fee_amount, Decimal::new(2180, 2));
        assert_eq!(result.advance_amount, Decimal::ZERO);
        assert_eq!(result.net_amount, Decimal::new(97820, 2));
    }

    #[test]
    fn advance_fee_is_charged_on_gross() {
        let result = compute_net(
            Decimal::new(1000, 0),
            Decimal::new(218, 2),
            true,
            Decimal::new(150, 2),
        );
        assert_eq!(result.fee_amount, Decimal::new(2180, 2));
        assert_eq!(result.advance_amount, Decimal::new(1500, 2));
        assert_eq!(result.net_amount, Decimal::new(96320, 2));
    }

    #[test]
    fn advance_rate_is_ignored_when_not_applied() {
        let result = compute_net(
            Decimal::new(500, 0),
            Decimal::ZERO,
            false,
            Decimal::new(199, 2),
        );
        assert_eq!(result.net_amount, Decimal::new(500, 0));
    }

    #[test]
    fn negative_inputs_clamp_to_zero() {
        let result = compute_net(
            Decimal::new(-100, 0),
            Decimal::new(-5, 0),
            true,
            Decimal::new(-1, 0),
        );
        assert_eq!(result.gross_amount, Decimal::ZERO);
        assert_eq!(result.net_amount, Decimal::ZERO);

        let negative_rate = compute_net(Decimal::new(100, 0), Decimal::new(-5, 0), false, Decimal::ZERO);
        assert_eq!(negative_rate.fee_amount, Decimal::ZERO);
        assert_eq!(negative_rate.net_amount, Decimal::new(100, 0));
    }

    #[test]
    fn oversized_rate_saturates_instead_of_overflowing() {
        let result = compute_net(Decimal::new(1000, 0), Decimal::MAX, true, Decimal::MAX);
        assert_eq!(result.gross_amount, Decimal::new(1000, 0));
        assert!(result.fee_amount > Decimal::new(1000, 0));
        assert!(result.net_amount.is_sign_negative());
    }

    #[test]
    fn schedule_lookup_is_case_insensitive() {
        let schedule = FeeSchedule::default();
        assert_eq!(schedule.rate_for("stone", "VISA"), Some(Decimal::new(218, 2)));
        assert_eq!(schedule.advance_rate_for(" cielo "), Some(Decimal::new(199, 2)));
        assert_eq!(schedule.rate_for("Stone", "Amex"), None);
    }

    #[test]
    fn settle_uses_schedule_rates() {
        let schedule = FeeSchedule::default();
        let result = schedule.settle(Decimal::new(1000, 0), "Stone", "Visa", true);
        assert!(result.is_ok());
        if let Ok(value) = result {
            assert_eq!(value.net_amount, Decimal::new(96320, 2));
        }

        let missing = schedule.settle(Decimal::new(1000, 0), "Stone", "Amex", false);
        assert!(missing.is_err());
        if let Err(error) = missing {
            assert_eq!(error.code, "fee_rate_not_found");
        }
    }

    #[test]
    fn acquirer_without_advance_rate_settles_with_zero_advance() {
        let schedule = FeeSchedule::default();
        let result = schedule.settle(Decimal::new(200, 0), "PagSeguro", "Visa", true);
        assert!(result.is_ok());
        if let Ok(value) = result {
            assert_eq!(value.advance_amount, Decimal::ZERO);
            assert_eq!(value.fee_amount, Decimal::new(598, 2));
        }
    }

    #[test]
    fn load_reads_custom_schedule_and_rejects_garbage() {
        let dir = tempdir();
        assert!(dir.is_ok());
        let Ok(dir) = dir else {
            return;
        };

        let missing = FeeSchedule::load(&dir.path().join("absent.json"));
        assert_eq!(missing.ok(), Some(FeeSchedule::default()));

        let custom_path = dir.path().join("fees.json");
        let written = fs::write(
            &custom_path,
            r#"{"rates":[{"acquirer":"Rede","brand":"Visa","rate_percent":"1.99"}]}"#,
        );
        assert!(written.is_ok());
        let custom = FeeSchedule::load(&custom_path);
        assert!(custom.is_ok());
        if let Ok(schedule) = custom {
            assert_eq!(schedule.rate_for("rede", "visa"), Some(Decimal::new(199, 2)));
            assert!(schedule.advance_rates.is_empty());
        }

        let oversized_path = dir.path().join("oversized.json");
        let written = fs::write(
            &oversized_path,
            r#"{"rates":[{"acquirer":"Rede","brand":"Visa","rate_percent":"79228162514264337593543950335"}]}"#,
        );
        assert!(written.is_ok());
        let oversized = FeeSchedule::load(&oversized_path);
        assert!(oversized.is_err());
        if let Err(error) = oversized {
            assert_eq!(error.code, "fee_schedule_invalid");
        }

        let garbage_path = dir.path().join("broken.json");
        let written = fs::write(&garbage_path, "{not json");
        assert!(written.is_ok());
        let broken = FeeSchedule::load(&garbage_path);
        assert!(broken.is_err());
        if let Err(error) = broken {
            assert_eq!(error.code, "fee_schedule_invalid");
        }
    }
}
