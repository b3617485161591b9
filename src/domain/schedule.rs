use super::money::{Amount, Rate, round_cents};
use crate::error::{FinancingError, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One period of a payment schedule. All amounts are rounded to cents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleRow {
    /// 1-based period index.
    pub period: u32,
    /// Total cash due for the period.
    pub payment: Decimal,
    /// Part of the payment attributable to accrued interest.
    pub interest: Decimal,
    /// Part of the payment that reduces the outstanding balance.
    pub principal: Decimal,
    /// Outstanding balance after the period, never below zero.
    pub remaining: Decimal,
}

impl ScheduleRow {
    fn rounded(
        period: u32,
        payment: Decimal,
        interest: Decimal,
        principal: Decimal,
        remaining: Decimal,
    ) -> Self {
        Self {
            period,
            payment: round_cents(payment),
            interest: round_cents(interest),
            principal: round_cents(principal),
            remaining: round_cents(remaining),
        }
    }
}

/// A complete payment schedule with its aggregates.
///
/// `total_interest` is the rounded sum of the unrounded per-period interest,
/// while `total_paid` adds up the already rounded payments, so the two can
/// drift apart from `principal` by a few cents over long terms.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ScheduleResult {
    pub rows: Vec<ScheduleRow>,
    pub total_interest: Decimal,
    pub total_paid: Decimal,
    /// The constant payment; only present for the French method.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monthly_payment: Option<Decimal>,
}

impl ScheduleResult {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn last_remaining(&self) -> Decimal {
        self.rows.last().map_or(Decimal::ZERO, |row| row.remaining)
    }
}

/// Computes a French (fixed payment) schedule.
///
/// A non-positive principal or a zero term yields an empty schedule with zero
/// totals. Arithmetic saturates, so no finite input panics.
pub fn french_schedule(principal: Decimal, rate: Decimal, months: u32) -> ScheduleResult {
    if principal <= Decimal::ZERO || months == 0 {
        return ScheduleResult {
            monthly_payment: Some(Decimal::ZERO),
            ..ScheduleResult::default()
        };
    }

    let annuity = annuity(principal, rate, months);
    let mut balance = principal;
    let mut raw_interest = Decimal::ZERO;
    let mut total_paid = Decimal::ZERO;
    let mut rows = Vec::with_capacity(months as usize);

    for period in 1..=months {
        let interest = balance.saturating_mul(rate);
        let principal_part = annuity.saturating_sub(interest);
        balance = balance.saturating_sub(principal_part).max(Decimal::ZERO);

        let row = ScheduleRow::rounded(period, annuity, interest, principal_part, balance);
        raw_interest = raw_interest.saturating_add(interest);
        total_paid = total_paid.saturating_add(row.payment);
        rows.push(row);
    }

    ScheduleResult {
        rows,
        total_interest: round_cents(raw_interest),
        total_paid,
        monthly_payment: Some(round_cents(annuity)),
    }
}

/// Computes a Linear (constant principal) schedule.
///
/// Same degenerate-input policy as [`french_schedule`]; there is no constant
/// payment, so `monthly_payment` is `None`.
pub fn linear_schedule(principal: Decimal, rate: Decimal, months: u32) -> ScheduleResult {
    if principal <= Decimal::ZERO || months == 0 {
        return ScheduleResult::default();
    }

    let slice = principal / Decimal::from(months);
    let mut balance = principal;
    let mut raw_interest = Decimal::ZERO;
    let mut total_paid = Decimal::ZERO;
    let mut rows = Vec::with_capacity(months as usize);

    for period in 1..=months {
        let interest = balance.saturating_mul(rate);
        let payment = slice.saturating_add(interest);
        balance = balance.saturating_sub(slice).max(Decimal::ZERO);

        let row = ScheduleRow::rounded(period, payment, interest, slice, balance);
        raw_interest = raw_interest.saturating_add(interest);
        total_paid = total_paid.saturating_add(row.payment);
        rows.push(row);
    }

    ScheduleResult {
        rows,
        total_interest: round_cents(raw_interest),
        total_paid,
        monthly_payment: None,
    }
}

/// `principal * rate / (1 - (1 + rate)^-months)`, or an even split at zero rate.
fn annuity(principal: Decimal, rate: Decimal, months: u32) -> Decimal {
    let even_split = principal / Decimal::from(months);
    if rate.is_zero() {
        return even_split;
    }

    // An overflowing growth factor discounts to zero.
    let discount = match compound(Decimal::ONE.saturating_add(rate), months) {
        Some(growth) => Decimal::ONE.checked_div(growth),
        None => Some(Decimal::ZERO),
    };

    discount
        .map(|d| Decimal::ONE.saturating_sub(d))
        .filter(|denominator| !denominator.is_zero())
        .and_then(|denominator| principal.saturating_mul(rate).checked_div(denominator))
        .unwrap_or(even_split)
}

/// `base^periods` by squaring; `None` on overflow.
fn compound(mut base: Decimal, mut periods: u32) -> Option<Decimal> {
    let mut result = Decimal::ONE;
    while periods > 0 {
        if periods & 1 == 1 {
            result = result.checked_mul(base)?;
        }
        periods >>= 1;
        if periods > 0 {
            base = base.checked_mul(base)?;
        }
    }
    Some(result)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum AmortizationMethod {
    /// Fixed payment per period.
    #[default]
    French,
    /// Fixed principal per period, declining payment.
    Linear,
}

impl AmortizationMethod {
    pub fn schedule(&self, principal: Decimal, rate: Decimal, months: u32) -> ScheduleResult {
        match self {
            Self::French => french_schedule(principal, rate, months),
            Self::Linear => linear_schedule(principal, rate, months),
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::French => "french",
            Self::Linear => "linear",
        }
    }
}

impl fmt::Display for AmortizationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AmortizationMethod {
    type Err = FinancingError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "french" | "frances" | "francés" => Ok(Self::French),
            "linear" | "lineal" => Ok(Self::Linear),
            other => Err(FinancingError::Validation(format!(
                "Unknown amortization method: {other}"
            ))),
        }
    }
}

impl TryFrom<String> for AmortizationMethod {
    type Error = FinancingError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

/// Loan terms validated at the application boundary.
///
/// The schedule functions accept any input; this type is what keeps negative
/// rates and empty loans out of persisted financings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoanTerms {
    pub principal: Amount,
    pub rate: Rate,
    pub months: u32,
}

impl LoanTerms {
    pub fn new(principal: Decimal, rate: Decimal, months: u32) -> Result<Self> {
        if months == 0 {
            return Err(FinancingError::Validation(
                "Term must be at least one month".to_string(),
            ));
        }
        Ok(Self {
            principal: Amount::new(principal)?,
            rate: Rate::new(rate)?,
            months,
        })
    }

    pub fn schedule(&self, method: AmortizationMethod) -> ScheduleResult {
        method.schedule(self.principal.value(), self.rate.value(), self.months)
    }
}
