use std::path::Path;

use rust_decimal::Decimal;

use crate::commands::common::{parse_money, parse_percent};
use crate::contracts::envelope::{SuccessEnvelope, success};
use crate::contracts::types::{FeeData, FeeRateSource};
use crate::reports::fees::{FeeSchedule, compute_net};
use crate::state::LedgerHome;
use crate::{ClientError, ClientResult};

const COMMAND: &str = "fee";

#[derive(Debug, Default)]
pub struct FeeOptions<'a> {
    pub gross: String,
    /// Explicit fee percentage; skips the schedule lookup.
    pub rate: Option<String>,
    pub acquirer: Option<String>,
    pub brand: Option<String>,
    pub advance: bool,
    /// Explicit advance percentage; overrides the acquirer's scheduled rate.
    pub advance_rate: Option<String>,
    pub home_override: Option<&'a Path>,
}

/// Settles `gross` with the scheduled rates for `acquirer`/`brand`.
pub fn run(gross: &str, acquirer: &str, brand: &str, advance: bool) -> ClientResult<SuccessEnvelope> {
    run_with_options(FeeOptions {
        gross: gross.to_string(),
        acquirer: Some(acquirer.to_string()),
        brand: Some(brand.to_string()),
        advance,
        ..FeeOptions::default()
    })
}

#[doc(hidden)]
pub fn run_with_options(options: FeeOptions<'_>) -> ClientResult<SuccessEnvelope> {
    let gross = parse_money(&options.gross, "gross", COMMAND)?;
    let explicit_rate = options
        .rate
        .as_deref()
        .map(|value| parse_percent(value, "rate", COMMAND))
        .transpose()?;
    let explicit_advance = options
        .advance_rate
        .as_deref()
        .map(|value| parse_percent(value, "advance-rate", COMMAND))
        .transpose()?;
    let acquirer = options.acquirer.as_deref().map(str::trim).filter(|value| !value.is_empty());
    let brand = options.brand.as_deref().map(str::trim).filter(|value| !value.is_empty());

    // The schedule is only read when some rate has to come from it.
    let needs_schedule = explicit_rate.is_none() || (options.advance && explicit_advance.is_none());
    let schedule = if needs_schedule && acquirer.is_some() {
        let home = LedgerHome::resolve(options.home_override)?;
        Some(FeeSchedule::load(&home.fee_schedule_path())?)
    } else {
        None
    };

    let (rate_source, fee_rate_percent) = match explicit_rate {
        Some(rate) => (FeeRateSource::Explicit, rate),
        None => {
            let (Some(acquirer), Some(brand), Some(schedule)) = (acquirer, brand, schedule.as_ref())
            else {
                return Err(ClientError::invalid_argument_for_command(
                    "Pass `--rate <percent>`, or both `--acquirer` and `--brand` to use the fee schedule.",
                    Some(COMMAND),
                ));
            };
            let rate = schedule
                .rate_for(acquirer, brand)
                .ok_or_else(|| ClientError::fee_rate_not_found(acquirer, brand))?;
            (FeeRateSource::Schedule, rate)
        }
    };

    let advance_rate_percent = match (explicit_advance, schedule.as_ref(), acquirer) {
        (Some(rate), _, _) => rate,
        (None, Some(schedule), Some(acquirer)) if options.advance => {
            schedule.advance_rate_for(acquirer).unwrap_or(Decimal::ZERO)
        }
        _ => Decimal::ZERO,
    };

    let breakdown = compute_net(gross, fee_rate_percent, options.advance, advance_rate_percent);
    tracing::debug!(
        source = ?rate_source,
        %fee_rate_percent,
        %advance_rate_percent,
        apply_advance = options.advance,
        "computed card fee"
    );

    success(
        COMMAND,
        FeeData {
            rate_source,
            acquirer: acquirer.map(str::to_string),
            brand: brand.map(str::to_string),
            fee_rate_percent,
            apply_advance: options.advance,
            advance_rate_percent,
            breakdown,
        },
    )
}
