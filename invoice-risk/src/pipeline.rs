use std::sync::Arc;
use std::time::Instant;

use futures::FutureExt;
use metrics::{counter, histogram};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use inference_client::{GrpcInferenceClient, InferenceClient, InferenceProtocol, RestInferenceClient};

use crate::classify::{Classification, ModelClassifier, RiskClassifier, RuleClassifier};
use crate::config::Config;
use crate::error::PipelineError;
use crate::filters::{is_late, is_valid};
use crate::metrics_consts::{
    CLASSIFY_FAILURES, CLASSIFY_TIME, EVENTS_RECEIVED, EVENT_PARSE_ERROR, RECORDS_CLASSIFIED,
    RECORDS_INVALID, RECORDS_ON_TIME, RECORDS_PUBLISHED,
};
use crate::sinks::{DocumentSink, RecordSink, SinkError};
use crate::source::EventSource;
use crate::types::{InvoiceRecord, RawEvent};

/// Where one payload ended up. Every payload reaches exactly one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Payload did not deserialize; nothing entered the stream.
    Unparseable,
    /// Amount was not positive; archived but dropped before scoring.
    Invalid,
    /// Paid on time; archived but not scored.
    OnTime,
    /// Classification failed; the record was dropped, the stream continues.
    ClassifyFailed,
    /// Classified and fanned out to the record sink and the risk index.
    Published,
}

/// The assembled per-record flow and its shared collaborators.
pub struct RiskPipeline {
    classifier: Arc<dyn RiskClassifier>,
    record_sink: Arc<dyn RecordSink>,
    raw_index: Arc<dyn DocumentSink>,
    risk_index: Arc<dyn DocumentSink>,
    max_in_flight: usize,
}

impl RiskPipeline {
    /// Chooses the classification strategy from configuration and wires the
    /// sinks. A configured predictor address selects remote inference; an
    /// empty one selects the threshold rules. The choice holds for the life
    /// of the pipeline.
    pub fn assemble(
        config: &Config,
        record_sink: Arc<dyn RecordSink>,
        raw_index: Arc<dyn DocumentSink>,
        risk_index: Arc<dyn DocumentSink>,
    ) -> Result<Self, PipelineError> {
        let classifier: Arc<dyn RiskClassifier> = if config.inference.remote_enabled() {
            let client: Box<dyn InferenceClient> = match config.inference.protocol {
                InferenceProtocol::Rest => {
                    Box::new(RestInferenceClient::build(&config.inference)?)
                }
                InferenceProtocol::Grpc => {
                    Box::new(GrpcInferenceClient::build(&config.inference)?)
                }
            };
            info!(
                url = %config.inference.predictor_url,
                protocol = ?config.inference.protocol,
                "classifying with the remote model"
            );
            Arc::new(ModelClassifier::new(client))
        } else {
            info!("no predictor configured, classifying with threshold rules");
            Arc::new(RuleClassifier)
        };

        Ok(Self {
            classifier,
            record_sink,
            raw_index,
            risk_index,
            max_in_flight: config.max_in_flight_records.max(1),
        })
    }

    /// Runs one payload through the whole chain. Data-quality drops and
    /// classification failures are absorbed here with counters and logs;
    /// only sink failures escape as errors.
    pub async fn process(&self, payload: &[u8]) -> Result<Outcome, PipelineError> {
        counter!(EVENTS_RECEIVED).increment(1);

        let event: RawEvent = match serde_json::from_slice(payload) {
            Ok(event) => event,
            Err(e) => {
                counter!(EVENT_PARSE_ERROR).increment(1);
                warn!(error = %e, "dropping unparseable event payload");
                return Ok(Outcome::Unparseable);
            }
        };

        // Every event that parses is archived, scored or not.
        let raw_document = serde_json::to_value(&event).map_err(SinkError::from)?;
        self.raw_index.append(&raw_document).await?;

        let record = InvoiceRecord::from(&event);
        if !is_valid(&record) {
            counter!(RECORDS_INVALID).increment(1);
            debug!(
                invoice_id = %record.invoice_id,
                amount = record.amount,
                "dropping invoice with non-positive amount"
            );
            return Ok(Outcome::Invalid);
        }
        if !is_late(&record) {
            counter!(RECORDS_ON_TIME).increment(1);
            debug!(invoice_id = %record.invoice_id, "skipping on-time invoice");
            return Ok(Outcome::OnTime);
        }

        let start = Instant::now();
        let Classification { risk, model_name } = match self.classifier.classify(&record).await {
            Ok(classification) => classification,
            Err(e) => {
                counter!(CLASSIFY_FAILURES, "cause" => e.cause()).increment(1);
                warn!(
                    invoice_id = %record.invoice_id,
                    error = %e,
                    "classification failed, dropping record"
                );
                return Ok(Outcome::ClassifyFailed);
            }
        };
        histogram!(CLASSIFY_TIME).record(start.elapsed().as_millis() as f64);
        counter!(RECORDS_CLASSIFIED).increment(1);

        let record = record.with_classification(risk, model_name);
        self.record_sink.send(&record).await?;
        let risk_document = serde_json::to_value(&record).map_err(SinkError::from)?;
        self.risk_index.append(&risk_document).await?;
        counter!(RECORDS_PUBLISHED).increment(1);
        debug!(
            invoice_id = %record.invoice_id,
            risk = risk.as_str(),
            "published classified invoice"
        );

        Ok(Outcome::Published)
    }

    /// Pulls the source to exhaustion, processing payloads concurrently up
    /// to the configured bound, then joins every in-flight record. The
    /// first fatal error wins; in-flight work is abandoned with it.
    pub async fn run(self: Arc<Self>, mut source: Box<dyn EventSource>) -> Result<(), PipelineError> {
        let limiter = Arc::new(Semaphore::new(self.max_in_flight));
        let mut in_flight: JoinSet<Result<Outcome, PipelineError>> = JoinSet::new();

        while let Some(payload) = source.next_event().await? {
            let permit = limiter
                .clone()
                .acquire_owned()
                .await
                .expect("classify semaphore closed");
            let pipeline = self.clone();
            in_flight.spawn(async move {
                let outcome = pipeline.process(&payload).await;
                drop(permit);
                outcome
            });

            // Surface sink failures promptly instead of at end of stream.
            while let Some(Some(joined)) = in_flight.join_next().now_or_never() {
                joined??;
            }
        }

        while let Some(joined) = in_flight.join_next().await {
            joined??;
        }

        info!("event source exhausted, pipeline stopping");
        Ok(())
    }
}
