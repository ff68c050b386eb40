use std::sync::Arc;

use invoice_risk::config::Config;
use invoice_risk::error::PipelineError;
use invoice_risk::pipeline::RiskPipeline;
use invoice_risk::sinks::{DocumentSink, JsonLinesDocumentSink, JsonLinesRecordSink, NullDocumentSink};
use invoice_risk::source::JsonLinesSource;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

fn setup_tracing() {
    // Stdout carries the record stream, so log output goes to stderr.
    let log_layer: tracing_subscriber::filter::Filtered<
        tracing_subscriber::fmt::Layer<
            tracing_subscriber::Registry,
            tracing_subscriber::fmt::format::DefaultFields,
            tracing_subscriber::fmt::format::Format,
            fn() -> std::io::Stderr,
        >,
        EnvFilter,
        tracing_subscriber::Registry,
    > = {
        let stderr_writer: fn() -> std::io::Stderr = std::io::stderr;
        tracing_subscriber::fmt::layer()
            .with_writer(stderr_writer)
            .with_filter(EnvFilter::from_default_env())
    };
    tracing_subscriber::registry().with(log_layer).init();
}

/// Append-file document sink, or a discarding one when no path is set.
async fn document_sink(path: &str) -> Result<Arc<dyn DocumentSink>, PipelineError> {
    if path.trim().is_empty() {
        return Ok(Arc::new(NullDocumentSink));
    }
    let file = tokio::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await?;
    Ok(Arc::new(JsonLinesDocumentSink::new(file)))
}

// Reads raw events as JSON lines on stdin and emits classified records as
// JSON lines on stdout; broker plumbing stays outside the process.
#[tokio::main]
async fn main() -> Result<(), PipelineError> {
    setup_tracing();
    info!("Starting up...");

    let config = Config::init_with_defaults()?;

    let record_sink = Arc::new(JsonLinesRecordSink::new(tokio::io::stdout()));
    let raw_index = document_sink(&config.raw_index_path).await?;
    let risk_index = document_sink(&config.risk_index_path).await?;

    let pipeline = Arc::new(RiskPipeline::assemble(
        &config,
        record_sink,
        raw_index,
        risk_index,
    )?);

    let source = JsonLinesSource::new(tokio::io::stdin());
    pipeline.run(Box::new(source)).await
}
