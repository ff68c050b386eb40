use async_trait::async_trait;
use tracing::debug;

use inference_client::{InferenceClient, InferenceResponse};

use super::{Classification, ClassifyError, RiskClassifier};
use crate::types::{InvoiceRecord, RiskTier};

/// Feature name the anomaly model was trained on.
pub const PAY_DELAY_FEATURE: &str = "Pay_Delay";

/// Substituted when the serving layer does not report a model name, so the
/// published record always says what scored it.
pub const DEFAULT_MODEL_NAME: &str = "anomaly-classifier-predictor";

/// Scores at or below this are low risk.
const LOW_SCORE_MAX: i64 = 50;
/// Scores above `LOW_SCORE_MAX` up to here are medium; beyond is high.
const MEDIUM_SCORE_MAX: i64 = 100;

/// Remote classification through an inference client. The transport behind
/// the client (REST or grpc) is decided at configuration time.
pub struct ModelClassifier {
    client: Box<dyn InferenceClient>,
}

impl ModelClassifier {
    pub fn new(client: Box<dyn InferenceClient>) -> Self {
        Self { client }
    }

    fn tier_for_score(output: i64) -> RiskTier {
        if output > MEDIUM_SCORE_MAX {
            RiskTier::High
        } else if output > LOW_SCORE_MAX {
            RiskTier::Medium
        } else {
            RiskTier::Low
        }
    }
}

#[async_trait]
impl RiskClassifier for ModelClassifier {
    async fn classify(&self, record: &InvoiceRecord) -> Result<Classification, ClassifyError> {
        let response = self
            .client
            .infer(PAY_DELAY_FEATURE, record.pay_delay)
            .await?
            .ok_or(ClassifyError::NoPrediction)?;

        let InferenceResponse {
            output,
            model_name,
            model_version,
        } = response;

        debug!(
            invoice_id = %record.invoice_id,
            output,
            model_version = model_version.as_deref().unwrap_or(""),
            "model scored invoice"
        );

        Ok(Classification {
            risk: Self::tier_for_score(output),
            model_name: model_name.unwrap_or_else(|| DEFAULT_MODEL_NAME.to_string()),
        })
    }
}
