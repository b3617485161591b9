use crate::domain::financing::Financing;
use crate::domain::schedule::AmortizationMethod;
use crate::domain::workflow::FinancingStatus;
use crate::error::Result;
use rust_decimal::Decimal;
use serde::Serialize;
use std::io::Write;

#[derive(Serialize)]
struct FinancingRecord {
    financing: u32,
    farmer: u32,
    status: FinancingStatus,
    method: AmortizationMethod,
    principal: Decimal,
    rate: Decimal,
    months: u32,
    version: u64,
}

impl From<&Financing> for FinancingRecord {
    fn from(f: &Financing) -> Self {
        Self {
            financing: f.id,
            farmer: f.farmer,
            status: f.status,
            method: f.method,
            principal: f.terms.principal.value(),
            rate: f.terms.rate.value(),
            months: f.terms.months,
            version: f.version,
        }
    }
}

/// Writes the final state of financings, one per line.
pub struct FinancingWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> FinancingWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    pub fn write_financings(&mut self, financings: Vec<Financing>) -> Result<()> {
        if financings.is_empty() {
            self.writer.write_record([
                "financing",
                "farmer",
                "status",
                "method",
                "principal",
                "rate",
                "months",
                "version",
            ])?;
        }
        for financing in &financings {
            self.writer.serialize(FinancingRecord::from(financing))?;
        }
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::schedule::LoanTerms;
    use rust_decimal_macros::dec;

    #[test]
    fn test_write_financings() {
        let terms = LoanTerms::new(dec!(1200.50), dec!(0.015), 18).unwrap();
        let mut financing = Financing::new(4, 9, terms, AmortizationMethod::French);
        financing.apply_status(FinancingStatus::PendingApproval);

        let mut buffer = Vec::new();
        FinancingWriter::new(&mut buffer)
            .write_financings(vec![financing])
            .unwrap();
        let output = String::from_utf8(buffer).unwrap();

        assert_eq!(
            output,
            "financing,farmer,status,method,principal,rate,months,version\n\
             4,9,pending_approval,french,1200.50,0.015,18,1\n"
        );
    }
}
