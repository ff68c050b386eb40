use async_trait::async_trait;
use tonic::metadata::MetadataValue;
use tonic::transport::{Channel, ClientTlsConfig};
use tonic::Request;
use tracing::debug;

use crate::config::InferenceConfig;
use crate::error::{BuildError, InferenceError};
use crate::proto::grpc_inference_service_client::GrpcInferenceServiceClient;
use crate::proto::{InferInputTensor, InferTensorContents, ModelInferRequest, ModelInferResponse};
use crate::tls::TrustStore;
use crate::{InferenceClient, InferenceResponse};

/// Model id the serving mesh routes on. Sent both in the request body and
/// in the `mm-vmodel-id` metadata header, per the ModelMesh convention.
pub const GRPC_MODEL_NAME: &str = "anomaly-classifier-predictor";

const VMODEL_ID_HEADER: &str = "mm-vmodel-id";
const INT64_DATATYPE: &str = "INT64";

/// `ModelInfer` client for the open inference protocol.
pub struct GrpcInferenceClient {
    client: GrpcInferenceServiceClient,
}

impl GrpcInferenceClient {
    /// Builds a client around a lazily connecting channel. The endpoint and
    /// TLS material are validated here but the server is not dialed; an
    /// unreachable server surfaces as a per-call transport failure, keeping
    /// the one-attempt-per-record contract.
    ///
    /// Must be called from within a tokio runtime: the lazy channel spawns
    /// its background connector task there.
    pub fn build(config: &InferenceConfig) -> Result<Self, BuildError> {
        let url = config.predictor_url.trim().to_string();
        let use_tls = url.starts_with("https://");

        let mut endpoint = Channel::from_shared(url.clone())
            .map_err(|e| BuildError::InvalidUrl {
                url,
                reason: e.to_string(),
            })?
            .timeout(config.timeout())
            .connect_timeout(config.connect_timeout());

        if use_tls {
            let mut tls = ClientTlsConfig::new().with_native_roots();
            if let Some(store) = TrustStore::load(&config.truststore)? {
                tls = tls.ca_certificate(store.tonic_certificate()?);
            }
            endpoint = endpoint.tls_config(tls)?;
        }

        Ok(Self {
            client: GrpcInferenceServiceClient::new(endpoint.connect_lazy()),
        })
    }
}

#[async_trait]
impl InferenceClient for GrpcInferenceClient {
    async fn infer(
        &self,
        feature_name: &str,
        feature_value: i64,
    ) -> Result<Option<InferenceResponse>, InferenceError> {
        let infer_request = ModelInferRequest {
            model_name: GRPC_MODEL_NAME.to_string(),
            model_version: String::new(),
            id: String::new(),
            inputs: vec![InferInputTensor {
                name: feature_name.to_string(),
                datatype: INT64_DATATYPE.to_string(),
                shape: vec![1, 1],
                contents: Some(InferTensorContents {
                    int64_contents: vec![feature_value],
                }),
            }],
        };

        let mut request = Request::new(infer_request);
        request
            .metadata_mut()
            .insert(VMODEL_ID_HEADER, MetadataValue::from_static(GRPC_MODEL_NAME));

        // The channel multiplexes; cloning the thin client is how one call
        // gets a `&mut` handle without serializing callers.
        let mut client = self.client.clone();
        let response = client.model_infer(request).await?.into_inner();
        let response = translate_response(response)?;

        debug!(output = response.output, "grpc inference completed");

        Ok(Some(response))
    }
}

/// Maps a `ModelInferResponse` onto the shared response shape. The score
/// comes back as one INT8 cell in the first raw output entry, sign extended
/// to `i64`; empty model name/version strings mean the server reported none.
fn translate_response(response: ModelInferResponse) -> Result<InferenceResponse, InferenceError> {
    let raw = response
        .raw_output_contents
        .first()
        .and_then(|bytes| bytes.first())
        .copied()
        .ok_or_else(|| {
            InferenceError::Malformed("response carried no raw output bytes".to_string())
        })?;

    Ok(InferenceResponse {
        output: i64::from(raw as i8),
        model_name: none_if_empty(response.model_name),
        model_version: none_if_empty(response.model_version),
    })
}

fn none_if_empty(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}
