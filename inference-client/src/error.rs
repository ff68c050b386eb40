use thiserror::Error;
use tonic::Code;

/// Failures that prevent a client from being constructed. These are
/// configuration problems and are fatal at startup.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Invalid predictor url {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("Trust store file {path}: {source}")]
    TrustStoreRead {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Trust store file {path}: {reason}")]
    TrustStoreInvalid { path: String, reason: String },
    #[error("DER trust stores are not supported for grpc endpoints")]
    DerOverGrpc,
    #[error("Http client error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Grpc channel error: {0}")]
    Channel(#[from] tonic::transport::Error),
}

/// Broad class of a failed inference call, used to label metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The server could not be reached, or the call timed out.
    Transport,
    /// The server was reached but the exchange violated the contract.
    Protocol,
}

impl FailureKind {
    pub fn as_label(&self) -> &'static str {
        match self {
            FailureKind::Transport => "transport",
            FailureKind::Protocol => "protocol",
        }
    }
}

/// Failures of a single inference call. These are scoped to the record
/// being scored and never terminate the caller's stream.
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("Transport error calling model server: {0}")]
    Transport(reqwest::Error),
    #[error("Model server returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("Model server returned grpc status {}: {}", .0.code(), .0.message())]
    Grpc(#[from] tonic::Status),
    #[error("Malformed model response: {0}")]
    Malformed(String),
}

impl InferenceError {
    pub fn kind(&self) -> FailureKind {
        match self {
            InferenceError::Transport(_) => FailureKind::Transport,
            InferenceError::Status { .. } | InferenceError::Malformed(_) => FailureKind::Protocol,
            InferenceError::Grpc(status) => match status.code() {
                Code::Unavailable | Code::DeadlineExceeded | Code::Cancelled | Code::Aborted => {
                    FailureKind::Transport
                }
                _ => FailureKind::Protocol,
            },
        }
    }
}
