use async_trait::async_trait;
use thiserror::Error;

use crate::types::{InvoiceRecord, RiskTier};

mod model;
mod rules;

pub use model::ModelClassifier;
pub use model::DEFAULT_MODEL_NAME;
pub use model::PAY_DELAY_FEATURE;
pub use rules::RuleClassifier;
pub use rules::RULE_MODEL_NAME;

/// Outcome of classifying one invoice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub risk: RiskTier,
    pub model_name: String,
}

/// Failure to classify one record. Scoped to that record; the stream keeps
/// flowing. Rule classification is total and never produces one of these.
#[derive(Debug, Error)]
pub enum ClassifyError {
    #[error(transparent)]
    Inference(#[from] inference_client::InferenceError),
    /// The server answered but declined to score the instance.
    #[error("Model returned no prediction")]
    NoPrediction,
}

impl ClassifyError {
    /// Metrics label for the failure cause.
    pub fn cause(&self) -> &'static str {
        match self {
            ClassifyError::Inference(e) => e.kind().as_label(),
            ClassifyError::NoPrediction => "no_prediction",
        }
    }
}

/// Strategy seam between the threshold rules and the remote model. The
/// strategy is chosen once when the pipeline is assembled and holds for the
/// life of the process.
#[async_trait]
pub trait RiskClassifier: Send + Sync {
    async fn classify(&self, record: &InvoiceRecord) -> Result<Classification, ClassifyError>;
}
