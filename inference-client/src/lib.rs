use async_trait::async_trait;

mod config;
mod error;
mod grpc;
mod proto;
mod rest;
mod tls;

// Config
pub use config::InferenceConfig;
pub use config::InferenceProtocol;
pub use config::TrustStoreConfig;
pub use config::TrustStoreKind;

// Errors
pub use error::BuildError;
pub use error::FailureKind;
pub use error::InferenceError;

// Clients
pub use grpc::GrpcInferenceClient;
pub use grpc::GRPC_MODEL_NAME;
pub use rest::RestInferenceClient;
pub use rest::REST_MODEL_VERSION;
pub use tls::TrustStore;

/// One scored answer from a model server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InferenceResponse {
    /// Integer score. Transports that return fractional values round them
    /// up before handing them back.
    pub output: i64,
    /// Model name as reported by the server, when it reports one.
    pub model_name: Option<String>,
    /// Model version as reported by the server, when it reports one.
    pub model_version: Option<String>,
}

/// A client that asks a model server to score a single integer feature.
///
/// Implementations own their transport state (connection pools, channels)
/// and are shared across concurrently processed records, so calls take
/// `&self`. `Ok(None)` means the server answered but produced no prediction
/// for the instance, which callers must not confuse with a zero score.
#[async_trait]
pub trait InferenceClient: Send + Sync {
    async fn infer(
        &self,
        feature_name: &str,
        feature_value: i64,
    ) -> Result<Option<InferenceResponse>, InferenceError>;
}
