use super::financing::NewFinancing;
use super::schedule::AmortizationMethod;
use super::workflow::{FinancingStatus, Role};
use crate::error::{FinancingError, Result};
use rust_decimal::Decimal;
use serde::Deserialize;

#[derive(Debug, Deserialize, PartialEq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum CommandType {
    Create,
    Transition,
    Pay,
}

/// One row of a batch of financing operations.
///
/// Which optional columns are required depends on `type`: `create` needs
/// `farmer`, `principal`, `rate` and `months`; `transition` needs `target`;
/// `pay` needs `period`.
#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct FinancingCommand {
    pub r#type: CommandType,
    pub financing: u32,
    pub farmer: Option<u32>,
    pub role: Option<Role>,
    pub target: Option<FinancingStatus>,
    pub principal: Option<Decimal>,
    pub rate: Option<Decimal>,
    pub months: Option<u32>,
    pub method: Option<AmortizationMethod>,
    pub version: Option<u64>,
    pub period: Option<u32>,
}

impl FinancingCommand {
    /// Builds the creation request, defaulting to the French method.
    pub fn new_financing(&self) -> Result<NewFinancing> {
        Ok(NewFinancing {
            id: self.financing,
            farmer: required(self.farmer, "farmer")?,
            principal: required(self.principal, "principal")?,
            rate: required(self.rate, "rate")?,
            months: required(self.months, "months")?,
            method: self.method.unwrap_or_default(),
        })
    }

    pub fn target(&self) -> Result<FinancingStatus> {
        required(self.target, "target")
    }

    pub fn period(&self) -> Result<u32> {
        required(self.period, "period")
    }
}

fn required<T>(value: Option<T>, column: &str) -> Result<T> {
    value.ok_or_else(|| FinancingError::Validation(format!("Missing {column} column")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn parse(csv: &str) -> Vec<FinancingCommand> {
        csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(csv.as_bytes())
            .deserialize()
            .map(|r| r.expect("Failed to deserialize command"))
            .collect()
    }

    #[test]
    fn test_create_command_deserialization() {
        let commands = parse(
            "type, financing, farmer, role, target, principal, rate, months, method\n\
             create, 1, 7, , , 1200, 0.01, 12, linear",
        );
        let request = commands[0].new_financing().unwrap();
        assert_eq!(request.farmer, 7);
        assert_eq!(request.principal, dec!(1200));
        assert_eq!(request.method, AmortizationMethod::Linear);
        assert!(commands[0].target().is_err());
    }

    #[test]
    fn test_transition_command_deserialization() {
        let commands = parse(
            "type, financing, farmer, role, target\ntransition, 1, , operador, pending_approval",
        );
        let command = &commands[0];
        assert_eq!(command.r#type, CommandType::Transition);
        assert_eq!(command.role, Some(Role::Operador));
        assert_eq!(command.target().unwrap(), FinancingStatus::PendingApproval);
        assert_eq!(command.version, None);
    }

    #[test]
    fn test_pay_command_deserialization() {
        let commands = parse(
            "type, financing, farmer, role, target, principal, rate, months, method, version, period\n\
             pay, 4, , , , , , , , , 3\n\
             pay, 4",
        );
        assert_eq!(commands[0].r#type, CommandType::Pay);
        assert_eq!(commands[0].period().unwrap(), 3);
        assert!(matches!(
            commands[1].period(),
            Err(FinancingError::Validation(_))
        ));
    }

    #[test]
    fn test_enum_columns_ignore_case() {
        let commands = parse(
            "type, financing, farmer, role, target, principal, rate, months, method\n\
             transition, 1, , Admin, Approved\n\
             create, 2, 7, , , 900, 0.01, 6, Lineal\n\
             transition, 3, , OPERADOR, pending_approval",
        );
        assert_eq!(commands[0].role, Some(Role::Admin));
        assert_eq!(commands[0].target, Some(FinancingStatus::Approved));
        assert_eq!(commands[1].method, Some(AmortizationMethod::Linear));
        assert_eq!(commands[2].role, Some(Role::Operador));
    }

    #[test]
    fn test_create_requires_terms() {
        let commands = parse("type, financing, farmer\ncreate, 1, 7");
        assert!(matches!(
            commands[0].new_financing(),
            Err(FinancingError::Validation(_))
        ));
    }
}
