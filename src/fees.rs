//! Fee schedule.
//!
//! A static catalogue of fee rules, each evaluated against an amount in one
//! of four ways:
//!
//! | config_type        | fee                                              |
//! |--------------------|--------------------------------------------------|
//! | `flat`             | fixed                                            |
//! | `percentage_cap`   | `min(amount * percentage / 100, cap)`            |
//! | `flat_conditional` | first condition the amount satisfies, else zero  |
//! | `range`            | fee of the inclusive band containing the amount  |
//!
//! Fees are informational: they are quoted to the user but never taken out
//! of a balance.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::dto::truncate_money;
use crate::error::{Error, Result};

pub const TRANSFER_FEE: &str = "transfer_fee";
pub const CARD_FUNDING_FEE: &str = "card_funding";
pub const SMS_OTP_FEE: &str = "sms_otp";
pub const STAMP_DUTY: &str = "stamp_duty";
pub const PAYROLL_PROCESSING_FEE: &str = "payroll_processing";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeeType {
    Transfer,
    Funding,
    Notification,
    Tax,
    Payroll,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    Gt,
    Gte,
    Lt,
    Lte,
    Eq,
}

impl Operator {
    fn holds(self, amount: Decimal, threshold: Decimal) -> bool {
        match self {
            Operator::Gt => amount > threshold,
            Operator::Gte => amount >= threshold,
            Operator::Lt => amount < threshold,
            Operator::Lte => amount <= threshold,
            Operator::Eq => amount == threshold,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeeCondition {
    pub operator: Operator,
    pub threshold: Decimal,
    pub fee: Decimal,
}

/// Inclusive amount band; `max: None` is unbounded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeeBand {
    pub min: Decimal,
    pub max: Option<Decimal>,
    pub fee: Decimal,
}

impl FeeBand {
    fn contains(&self, amount: Decimal) -> bool {
        amount >= self.min && self.max.map_or(true, |max| amount <= max)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "config_type", content = "config", rename_all = "snake_case")]
pub enum FeeRule {
    Flat { fee: Decimal },
    PercentageCap { percentage: Decimal, cap: Decimal },
    FlatConditional { conditions: Vec<FeeCondition> },
    Range { ranges: Vec<FeeBand> },
}

impl FeeRule {
    pub fn evaluate(&self, amount: Decimal) -> Result<Decimal> {
        match self {
            FeeRule::Flat { fee } => Ok(*fee),
            FeeRule::PercentageCap { percentage, cap } => {
                let fee = truncate_money(amount * *percentage / dec!(100));
                Ok(fee.min(*cap))
            }
            FeeRule::FlatConditional { conditions } => Ok(conditions
                .iter()
                .find(|condition| condition.operator.holds(amount, condition.threshold))
                .map_or(Decimal::ZERO, |condition| condition.fee)),
            FeeRule::Range { ranges } => ranges
                .iter()
                .find(|band| band.contains(amount))
                .map(|band| band.fee)
                .ok_or_else(|| Error::validation(format!("No fee band covers {}", amount))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeeConfig {
    pub id: String,
    pub name: String,
    pub fee_type: FeeType,
    #[serde(flatten)]
    pub rule: FeeRule,
    pub currency: String,
}

#[derive(Debug, Clone)]
pub struct FeeSchedule {
    entries: Vec<FeeConfig>,
}

impl FeeSchedule {
    pub fn new(entries: Vec<FeeConfig>) -> Self {
        Self { entries }
    }

    /// The catalogue shipped with the service.
    pub fn standard(currency: &str) -> Self {
        let entry = |id: &str, name: &str, fee_type: FeeType, rule: FeeRule| FeeConfig {
            id: id.to_string(),
            name: name.to_string(),
            fee_type,
            rule,
            currency: currency.to_string(),
        };
        let band = |min: Decimal, max: Option<Decimal>, fee: Decimal| FeeBand { min, max, fee };
        let condition = |operator: Operator, threshold: Decimal, fee: Decimal| FeeCondition {
            operator,
            threshold,
            fee,
        };

        Self::new(vec![
            entry(
                TRANSFER_FEE,
                "Bank transfer",
                FeeType::Transfer,
                FeeRule::Range {
                    ranges: vec![
                        band(dec!(0), Some(dec!(5000)), dec!(10)),
                        band(dec!(5000.01), Some(dec!(50000)), dec!(25)),
                        band(dec!(50000.01), None, dec!(50)),
                    ],
                },
            ),
            entry(
                CARD_FUNDING_FEE,
                "Card funding",
                FeeType::Funding,
                FeeRule::PercentageCap {
                    percentage: dec!(1.5),
                    cap: dec!(2000),
                },
            ),
            entry(
                SMS_OTP_FEE,
                "SMS OTP delivery",
                FeeType::Notification,
                FeeRule::Flat { fee: dec!(4) },
            ),
            entry(
                STAMP_DUTY,
                "Electronic money transfer levy",
                FeeType::Tax,
                FeeRule::FlatConditional {
                    conditions: vec![
                        condition(Operator::Gte, dec!(10000), dec!(50)),
                        condition(Operator::Lt, dec!(10000), dec!(0)),
                    ],
                },
            ),
            entry(
                PAYROLL_PROCESSING_FEE,
                "Payroll processing per employee",
                FeeType::Payroll,
                FeeRule::Flat { fee: dec!(100) },
            ),
        ])
    }

    pub fn entries(&self) -> &[FeeConfig] {
        &self.entries
    }

    pub fn get(&self, id: &str) -> Result<&FeeConfig> {
        self.entries
            .iter()
            .find(|entry| entry.id == id)
            .ok_or(Error::FeeNotFound)
    }

    pub fn quote(&self, id: &str, amount: Decimal) -> Result<Decimal> {
        if amount < Decimal::ZERO {
            return Err(Error::AmountMustBePositive);
        }
        self.get(id)?.rule.evaluate(amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schedule() -> FeeSchedule {
        FeeSchedule::standard("NGN")
    }

    #[test]
    fn test_percentage_cap_is_capped() {
        assert_eq!(
            schedule().quote(CARD_FUNDING_FEE, dec!(200000)).unwrap(),
            dec!(2000)
        );
    }

    #[test]
    fn test_percentage_below_cap() {
        assert_eq!(
            schedule().quote(CARD_FUNDING_FEE, dec!(10000)).unwrap(),
            dec!(150)
        );
    }

    #[test]
    fn test_range_bands() {
        let schedule = schedule();
        assert_eq!(schedule.quote(TRANSFER_FEE, dec!(3000)).unwrap(), dec!(10));
        assert_eq!(schedule.quote(TRANSFER_FEE, dec!(5000)).unwrap(), dec!(10));
        assert_eq!(schedule.quote(TRANSFER_FEE, dec!(50000)).unwrap(), dec!(25));
        assert_eq!(schedule.quote(TRANSFER_FEE, dec!(50001)).unwrap(), dec!(50));
        assert_eq!(schedule.quote(TRANSFER_FEE, dec!(0)).unwrap(), dec!(10));
    }

    #[test]
    fn test_range_gap_is_an_error() {
        let rule = FeeRule::Range {
            ranges: vec![FeeBand {
                min: dec!(100),
                max: Some(dec!(200)),
                fee: dec!(1),
            }],
        };
        assert!(matches!(rule.evaluate(dec!(50)), Err(Error::Validation(_))));
    }

    #[test]
    fn test_conditional_first_match_wins() {
        let rule = FeeRule::FlatConditional {
            conditions: vec![
                FeeCondition {
                    operator: Operator::Gt,
                    threshold: dec!(100),
                    fee: dec!(7),
                },
                FeeCondition {
                    operator: Operator::Gt,
                    threshold: dec!(50),
                    fee: dec!(3),
                },
            ],
        };
        assert_eq!(rule.evaluate(dec!(150)).unwrap(), dec!(7));
        assert_eq!(rule.evaluate(dec!(75)).unwrap(), dec!(3));
        assert_eq!(rule.evaluate(dec!(10)).unwrap(), Decimal::ZERO);
    }

    #[test]
    fn test_stamp_duty_threshold() {
        let schedule = schedule();
        assert_eq!(schedule.quote(STAMP_DUTY, dec!(9999.99)).unwrap(), dec!(0));
        assert_eq!(schedule.quote(STAMP_DUTY, dec!(10000)).unwrap(), dec!(50));
    }

    #[test]
    fn test_flat_ignores_amount() {
        let schedule = schedule();
        assert_eq!(schedule.quote(SMS_OTP_FEE, dec!(1)).unwrap(), dec!(4));
        assert_eq!(schedule.quote(SMS_OTP_FEE, dec!(1000000)).unwrap(), dec!(4));
    }

    #[test]
    fn test_unknown_fee_and_negative_amount() {
        let schedule = schedule();
        assert_eq!(schedule.quote("nope", dec!(1)), Err(Error::FeeNotFound));
        assert_eq!(
            schedule.quote(SMS_OTP_FEE, dec!(-1)),
            Err(Error::AmountMustBePositive)
        );
    }

    #[test]
    fn test_fee_config_wire_shape() {
        let entry = schedule().get(CARD_FUNDING_FEE).unwrap().clone();
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["config_type"], json!("percentage_cap"));
        assert_eq!(value["fee_type"], json!("funding"));
        assert_eq!(value["config"]["cap"], json!("2000"));

        let parsed: FeeConfig = serde_json::from_value(value).unwrap();
        assert_eq!(parsed, entry);
    }
}
