use super::schedule::{AmortizationMethod, LoanTerms, ScheduleResult, ScheduleRow};
use super::workflow::FinancingStatus;
use crate::error::{FinancingError, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Input for creating a financing; validated into [`LoanTerms`].
#[derive(Debug, Clone, PartialEq)]
pub struct NewFinancing {
    pub id: u32,
    pub farmer: u32,
    pub principal: Decimal,
    pub rate: Decimal,
    pub months: u32,
    pub method: AmortizationMethod,
}

/// A loan request moving through the financing lifecycle.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Financing {
    /// The unique identifier of the financing.
    pub id: u32,
    /// The farmer the loan belongs to.
    pub farmer: u32,
    #[serde(flatten)]
    pub terms: LoanTerms,
    pub method: AmortizationMethod,
    pub status: FinancingStatus,
    /// Incremented on every applied status change.
    pub version: u64,
}

impl Financing {
    /// Creates a draft financing at version 0.
    pub fn new(id: u32, farmer: u32, terms: LoanTerms, method: AmortizationMethod) -> Self {
        Self {
            id,
            farmer,
            terms,
            method,
            status: FinancingStatus::Draft,
            version: 0,
        }
    }

    pub fn schedule(&self) -> ScheduleResult {
        self.terms.schedule(self.method)
    }

    /// Moves to `status` and bumps the version. Legality is checked by the caller.
    pub fn apply_status(&mut self, status: FinancingStatus) {
        self.status = status;
        self.version += 1;
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Default)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Paid,
}

/// One installment (pago) of an approved financing.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
pub struct Payment {
    pub financing: u32,
    pub period: u32,
    pub amount: Decimal,
    pub interest: Decimal,
    pub principal: Decimal,
    pub remaining: Decimal,
    pub status: PaymentStatus,
}

impl Payment {
    pub fn from_row(financing: u32, row: &ScheduleRow) -> Self {
        Self {
            financing,
            period: row.period,
            amount: row.payment,
            interest: row.interest,
            principal: row.principal,
            remaining: row.remaining,
            status: PaymentStatus::Pending,
        }
    }

    /// Settles the installment; paying it twice is a validation error.
    pub fn mark_paid(&mut self) -> Result<()> {
        if self.status == PaymentStatus::Paid {
            return Err(FinancingError::Validation(format!(
                "Installment {} of financing {} is already paid",
                self.period, self.financing
            )));
        }
        self.status = PaymentStatus::Paid;
        Ok(())
    }

    /// Settles installment `period` within `plan` and returns the updated copy.
    pub fn settle(plan: &mut [Self], financing: u32, period: u32) -> Result<Self> {
        let Some(installment) = plan.iter_mut().find(|p| p.period == period) else {
            return Err(FinancingError::Validation(format!(
                "Financing {financing} has no installment {period}"
            )));
        };
        installment.mark_paid()?;
        Ok(installment.clone())
    }

    /// Expands a schedule into pending installments, in period order.
    pub fn plan(financing: u32, schedule: &ScheduleResult) -> Vec<Self> {
        schedule
            .rows
            .iter()
            .map(|row| Self::from_row(financing, row))
            .collect()
    }
}

/// A message to a farmer about one of their financings.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
pub struct Notification {
    pub farmer: u32,
    pub financing: u32,
    pub status: FinancingStatus,
    pub message: String,
}

impl Notification {
    pub fn status_changed(financing: &Financing) -> Self {
        Self {
            farmer: financing.farmer,
            financing: financing.id,
            status: financing.status,
            message: format!("Financing {} is now {}", financing.id, financing.status),
        }
    }
}
