use thiserror::Error;

/// Fatal pipeline failures. Per-record problems (bad payloads, inference
/// failures) are absorbed inside the pipeline and never show up here.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Config error: {0}")]
    Config(#[from] envconfig::Error),
    #[error("Inference client error: {0}")]
    ClientBuild(#[from] inference_client::BuildError),
    #[error("Io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Sink error: {0}")]
    Sink(#[from] crate::sinks::SinkError),
    #[error("Worker task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}
