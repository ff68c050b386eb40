use std::sync::Arc;

use async_trait::async_trait;
use httpmock::prelude::*;
use serde_json::json;

use inference_client::{InferenceConfig, InferenceProtocol};
use invoice_risk::classify::{DEFAULT_MODEL_NAME, RULE_MODEL_NAME};
use invoice_risk::config::Config;
use invoice_risk::error::PipelineError;
use invoice_risk::pipeline::RiskPipeline;
use invoice_risk::sinks::{MemoryDocumentSink, MemoryRecordSink, RecordSink, SinkError};
use invoice_risk::source::MemorySource;
use invoice_risk::types::{InvoiceRecord, RiskTier};

struct Harness {
    pipeline: Arc<RiskPipeline>,
    records: Arc<MemoryRecordSink>,
    raw_docs: Arc<MemoryDocumentSink>,
    risk_docs: Arc<MemoryDocumentSink>,
}

fn config_for(predictor_url: &str, max_in_flight: usize) -> Config {
    Config {
        inference: InferenceConfig::for_endpoint(predictor_url, InferenceProtocol::Rest),
        max_in_flight_records: max_in_flight,
        raw_index_path: String::new(),
        risk_index_path: String::new(),
    }
}

fn harness(config: &Config) -> Harness {
    let records = Arc::new(MemoryRecordSink::new());
    let raw_docs = Arc::new(MemoryDocumentSink::new());
    let risk_docs = Arc::new(MemoryDocumentSink::new());
    let pipeline = Arc::new(
        RiskPipeline::assemble(
            config,
            records.clone(),
            raw_docs.clone(),
            risk_docs.clone(),
        )
        .expect("failed to assemble pipeline"),
    );
    Harness {
        pipeline,
        records,
        raw_docs,
        risk_docs,
    }
}

fn event(invoice_id: &str, amount: f64, pay_type: &str, delay: i64) -> String {
    json!({
        "Invoice_ID": invoice_id,
        "Invoice_Amount": amount,
        "Invoice_Due_Date": "2021-06-30",
        "Pay_Type": pay_type,
        "Pay_Delay": delay,
    })
    .to_string()
}

#[tokio::test]
async fn rule_classification_tiers_late_invoices() {
    let config = config_for("", 1);
    let h = harness(&config);
    let source = MemorySource::new([
        event("INV-low", 4000.0, "Late", 200),
        event("INV-medium", 9000.0, "Late", 30),
        event("INV-high", 9000.0, "Late", 120),
    ]);

    h.pipeline.clone().run(Box::new(source)).await.unwrap();

    let records = h.records.records().await;
    assert_eq!(records.len(), 3);
    assert_eq!(records[0].invoice_id, "INV-low");
    assert_eq!(records[0].risk, Some(RiskTier::Low));
    assert_eq!(records[1].risk, Some(RiskTier::Medium));
    assert_eq!(records[2].risk, Some(RiskTier::High));
    for record in &records {
        assert_eq!(record.model_name.as_deref(), Some(RULE_MODEL_NAME));
    }

    assert_eq!(h.raw_docs.documents().await.len(), 3);
    assert_eq!(h.risk_docs.documents().await.len(), 3);
}

#[tokio::test]
async fn invalid_and_on_time_invoices_are_archived_but_not_scored() {
    let config = config_for("", 1);
    let h = harness(&config);
    let source = MemorySource::new([
        event("INV-zero", 0.0, "Late", 50),
        event("INV-negative", -10.0, "Late", 50),
        event("INV-on-time", 800.0, "OnTime", 0),
        event("INV-no-type", 800.0, "", 0),
        event("INV-late", 800.0, "Late", 50),
    ]);

    h.pipeline.clone().run(Box::new(source)).await.unwrap();

    let records = h.records.records().await;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].invoice_id, "INV-late");
    assert_eq!(records[0].risk, Some(RiskTier::Low));

    // Every parseable event reaches the raw index, scored or not.
    assert_eq!(h.raw_docs.documents().await.len(), 5);
    assert_eq!(h.risk_docs.documents().await.len(), 1);
}

#[tokio::test]
async fn unparseable_payloads_do_not_stop_the_stream() {
    let config = config_for("", 1);
    let h = harness(&config);
    let source = MemorySource::new([
        "not json at all".to_string(),
        event("INV-after-garbage", 6000.0, "Late", 10),
    ]);

    h.pipeline.clone().run(Box::new(source)).await.unwrap();

    let records = h.records.records().await;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].invoice_id, "INV-after-garbage");
    // The garbage never made it to the raw index either.
    assert_eq!(h.raw_docs.documents().await.len(), 1);
}

#[tokio::test]
async fn remote_scores_map_to_tiers_with_the_default_model_name() {
    let server = MockServer::start();
    let low = server.mock(|when, then| {
        when.method(POST)
            .path("/v1/models/anomaly:predict")
            .json_body(json!({ "instances": [{ "Pay_Delay": 10 }] }));
        then.status(200).json_body(json!({ "predictions": [[12.0]] }));
    });
    let medium = server.mock(|when, then| {
        when.method(POST)
            .path("/v1/models/anomaly:predict")
            .json_body(json!({ "instances": [{ "Pay_Delay": 60 }] }));
        then.status(200).json_body(json!({ "predictions": [[60.4]] }));
    });
    let high = server.mock(|when, then| {
        when.method(POST)
            .path("/v1/models/anomaly:predict")
            .json_body(json!({ "instances": [{ "Pay_Delay": 300 }] }));
        then.status(200).json_body(json!({ "predictions": [[140.0]] }));
    });

    let config = config_for(&server.url("/v1/models/anomaly:predict"), 1);
    let h = harness(&config);
    let source = MemorySource::new([
        event("INV-1", 9000.0, "Late", 10),
        event("INV-2", 9000.0, "Late", 60),
        event("INV-3", 9000.0, "Late", 300),
    ]);

    h.pipeline.clone().run(Box::new(source)).await.unwrap();

    low.assert();
    medium.assert();
    high.assert();

    let records = h.records.records().await;
    assert_eq!(records.len(), 3);
    assert_eq!(records[0].risk, Some(RiskTier::Low));
    // 60.4 rounds up to 61, which is over the low cutoff.
    assert_eq!(records[1].risk, Some(RiskTier::Medium));
    assert_eq!(records[2].risk, Some(RiskTier::High));
    for record in &records {
        assert_eq!(record.model_name.as_deref(), Some(DEFAULT_MODEL_NAME));
    }
}

#[tokio::test]
async fn on_time_invoices_never_reach_the_model() {
    let server = MockServer::start();
    let predict = server.mock(|when, then| {
        when.method(POST).path("/v1/models/anomaly:predict");
        then.status(200).json_body(json!({ "predictions": [[10.0]] }));
    });

    let config = config_for(&server.url("/v1/models/anomaly:predict"), 1);
    let h = harness(&config);
    let source = MemorySource::new([
        event("INV-on-time", 9000.0, "OnTime", 0),
        event("INV-invalid", 0.0, "Late", 90),
    ]);

    h.pipeline.clone().run(Box::new(source)).await.unwrap();

    predict.assert_hits(0);
    assert!(h.records.records().await.is_empty());
}

#[tokio::test]
async fn a_failed_inference_drops_only_that_record() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST)
            .path("/v1/models/anomaly:predict")
            .json_body(json!({ "instances": [{ "Pay_Delay": 10 }] }));
        then.status(503).body("model unavailable");
    });
    server.mock(|when, then| {
        when.method(POST)
            .path("/v1/models/anomaly:predict")
            .json_body(json!({ "instances": [{ "Pay_Delay": 20 }] }));
        then.status(200).json_body(json!({ "predictions": [[80.0]] }));
    });

    let config = config_for(&server.url("/v1/models/anomaly:predict"), 1);
    let h = harness(&config);
    let source = MemorySource::new([
        event("INV-fails", 9000.0, "Late", 10),
        event("INV-scores", 9000.0, "Late", 20),
    ]);

    h.pipeline.clone().run(Box::new(source)).await.unwrap();

    let records = h.records.records().await;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].invoice_id, "INV-scores");
    assert_eq!(records[0].risk, Some(RiskTier::Medium));
    // Both parsed, so both were archived.
    assert_eq!(h.raw_docs.documents().await.len(), 2);
    assert_eq!(h.risk_docs.documents().await.len(), 1);
}

#[tokio::test]
async fn an_unreachable_predictor_keeps_the_stream_alive() {
    // Port 9 is unbound in CI, so connects are refused immediately.
    let config = config_for("http://127.0.0.1:9/v1/models/anomaly:predict", 1);
    let h = harness(&config);
    let source = MemorySource::new([
        event("INV-1", 9000.0, "Late", 10),
        event("INV-2", 9000.0, "Late", 20),
    ]);

    h.pipeline.clone().run(Box::new(source)).await.unwrap();

    assert!(h.records.records().await.is_empty());
    assert_eq!(h.raw_docs.documents().await.len(), 2);
}

#[tokio::test]
async fn raw_documents_keep_the_event_as_consumed() {
    let config = config_for("", 1);
    let h = harness(&config);
    let payload = json!({
        "Invoice_ID": "INV-extras",
        "Invoice_Amount": 100.0,
        "Pay_Type": "OnTime",
        "Pay_Delay": 0,
        "Plant": "0001",
        "Process_Variant": "fast-track"
    })
    .to_string();
    let source = MemorySource::new([payload]);

    h.pipeline.clone().run(Box::new(source)).await.unwrap();

    let docs = h.raw_docs.documents().await;
    assert_eq!(docs.len(), 1);
    assert_eq!(docs[0].get("Plant"), Some(&json!("0001")));
    // Fields outside the process model survive untouched.
    assert_eq!(docs[0].get("Process_Variant"), Some(&json!("fast-track")));
}

#[tokio::test]
async fn bounded_concurrency_processes_every_record() {
    let config = config_for("", 8);
    let h = harness(&config);
    let events: Vec<String> = (0..50)
        .map(|i| event(&format!("INV-{i}"), 9000.0, "Late", 120))
        .collect();
    let source = MemorySource::new(events);

    h.pipeline.clone().run(Box::new(source)).await.unwrap();

    assert_eq!(h.records.records().await.len(), 50);
    assert_eq!(h.risk_docs.documents().await.len(), 50);
    assert_eq!(h.raw_docs.documents().await.len(), 50);
}

struct FailingRecordSink;

#[async_trait]
impl RecordSink for FailingRecordSink {
    async fn send(&self, _record: &InvoiceRecord) -> Result<(), SinkError> {
        Err(SinkError::Io(std::io::Error::new(
            std::io::ErrorKind::BrokenPipe,
            "sink closed",
        )))
    }
}

#[tokio::test]
async fn a_sink_failure_is_fatal() {
    let config = config_for("", 1);
    let raw_docs = Arc::new(MemoryDocumentSink::new());
    let risk_docs = Arc::new(MemoryDocumentSink::new());
    let pipeline = Arc::new(
        RiskPipeline::assemble(
            &config,
            Arc::new(FailingRecordSink),
            raw_docs.clone(),
            risk_docs.clone(),
        )
        .expect("failed to assemble pipeline"),
    );
    let source = MemorySource::new([event("INV-1", 9000.0, "Late", 120)]);

    let err = pipeline.run(Box::new(source)).await.unwrap_err();
    assert!(matches!(err, PipelineError::Sink(_)));
    // Nothing was published past the failing sink.
    assert!(risk_docs.documents().await.is_empty());
}
