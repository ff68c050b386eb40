use async_trait::async_trait;

use super::{Classification, ClassifyError, RiskClassifier};
use crate::types::{InvoiceRecord, RiskTier};

/// Name recorded on records classified by the threshold rules, so consumers
/// can tell rule output from model output.
pub const RULE_MODEL_NAME: &str = "rule-based";

/// Invoices at or below this amount are low risk regardless of delay.
const LOW_RISK_MAX_AMOUNT: f64 = 5000.0;
/// Above the amount cutoff, delays up to this many days stay medium.
const MEDIUM_RISK_MAX_DELAY: i64 = 90;

/// Threshold rules for environments without a model server.
#[derive(Debug, Default, Clone, Copy)]
pub struct RuleClassifier;

impl RuleClassifier {
    /// Ordered rules; the first match wins.
    pub fn tier(amount: f64, pay_delay: i64) -> RiskTier {
        if amount <= LOW_RISK_MAX_AMOUNT {
            RiskTier::Low
        } else if pay_delay <= MEDIUM_RISK_MAX_DELAY {
            RiskTier::Medium
        } else {
            RiskTier::High
        }
    }
}

#[async_trait]
impl RiskClassifier for RuleClassifier {
    async fn classify(&self, record: &InvoiceRecord) -> Result<Classification, ClassifyError> {
        Ok(Classification {
            risk: Self::tier(record.amount, record.pay_delay),
            model_name: RULE_MODEL_NAME.to_string(),
        })
    }
}
