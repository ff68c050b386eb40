use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use serde::Deserialize;
use tracing::debug;

use crate::config::InferenceConfig;
use crate::error::{BuildError, InferenceError};
use crate::tls::TrustStore;
use crate::{InferenceClient, InferenceResponse};

/// Version stamped on REST predictions; the serving layer does not echo one
/// back in the response body.
// TODO: read the real version from the model metadata endpoint instead of
// pinning it.
pub const REST_MODEL_VERSION: &str = "1";

/// Shape of a predict response: one row of scores per instance sent.
#[derive(Deserialize)]
struct PredictionsResponse {
    predictions: Vec<Vec<f64>>,
}

/// Client for the row-format predict endpoint
/// (`{"instances": [...]} -> {"predictions": [...]}`).
pub struct RestInferenceClient {
    client: reqwest::Client,
    url: String,
}

impl RestInferenceClient {
    /// Builds the client and its connection pool. TLS material is loaded
    /// eagerly so a bad trust store fails startup, not the first record.
    pub fn build(config: &InferenceConfig) -> Result<Self, BuildError> {
        let url = config.predictor_url.trim().to_string();
        let parsed = url::Url::parse(&url).map_err(|e| BuildError::InvalidUrl {
            url: url.clone(),
            reason: e.to_string(),
        })?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let mut builder = reqwest::Client::builder()
            .timeout(config.timeout())
            .connect_timeout(config.connect_timeout())
            .default_headers(headers);

        if parsed.scheme() == "https" {
            if let Some(store) = TrustStore::load(&config.truststore)? {
                for certificate in store.reqwest_certificates()? {
                    builder = builder.add_root_certificate(certificate);
                }
            }
        }

        Ok(Self {
            client: builder.build()?,
            url,
        })
    }
}

#[async_trait]
impl InferenceClient for RestInferenceClient {
    async fn infer(
        &self,
        feature_name: &str,
        feature_value: i64,
    ) -> Result<Option<InferenceResponse>, InferenceError> {
        let mut instance = serde_json::Map::new();
        instance.insert(feature_name.to_string(), serde_json::Value::from(feature_value));
        let body = serde_json::json!({ "instances": [instance] });

        let response = self
            .client
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(InferenceError::Transport)?;

        let status = response.status();
        let text = response.text().await.map_err(InferenceError::Transport)?;
        if !status.is_success() {
            return Err(InferenceError::Status {
                status,
                body: truncate_body(&text),
            });
        }

        let decoded: PredictionsResponse = serde_json::from_str(&text)
            .map_err(|e| InferenceError::Malformed(format!("undecodable predict body: {e}")))?;

        let Some(first_row) = decoded.predictions.first() else {
            debug!("model server returned an empty prediction list");
            return Ok(None);
        };
        let score = first_row.first().ok_or_else(|| {
            InferenceError::Malformed("first prediction row is empty".to_string())
        })?;
        // Scores are fractional; round up so a 50.2 does not read as 50.
        let output = score.ceil() as i64;

        debug!(output, "rest inference completed");

        Ok(Some(InferenceResponse {
            output,
            model_name: None,
            model_version: Some(REST_MODEL_VERSION.to_string()),
        }))
    }
}

/// Keeps error diagnostics bounded when a proxy answers with a full page.
fn truncate_body(body: &str) -> String {
    let mut out: String = body.chars().take(256).collect();
    if out.len() < body.len() {
        out.push_str("...");
    }
    out
}
