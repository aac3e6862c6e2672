use rust_decimal::Decimal;

/// Category used for expenses recorded without one.
pub const DEFAULT_CATEGORY_LABEL: &str = "Outros";

/// Synthetic category carrying the fixed payroll in the expense breakdown.
pub const FIXED_SALARY_CATEGORY_LABEL: &str = "Salário Base";

/// The expense breakdown keeps only this many top categories.
pub const CATEGORY_BREAKDOWN_LIMIT: usize = 6;

/// Growth reported when the previous period was zero and the current one is
/// positive.
pub const GROWTH_FROM_ZERO_PCT: i64 = 100;

/// Largest amount (R$ 1 quadrillion) accepted for a transaction, salary,
/// bonus or card sale. Keeps every ledger total far inside the decimal range.
pub const MAX_MONEY_AMOUNT: Decimal = Decimal::from_parts(2_764_472_320, 232_830, 0, false, 0);
