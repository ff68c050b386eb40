use async_trait::async_trait;
use thiserror::Error;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::Mutex;

use crate::types::InvoiceRecord;

/// Failures surfaced by sinks. The run loop treats these as fatal; retry
/// and durability policy belong to the embedding host, not the pipeline.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("Sink io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Sink serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Destination for classified records, one write per record that survives
/// the whole chain.
#[async_trait]
pub trait RecordSink: Send + Sync {
    async fn send(&self, record: &InvoiceRecord) -> Result<(), SinkError>;
}

/// Append-only document store. The index assigns document identity, and
/// batching is the implementation's concern, not the pipeline's.
#[async_trait]
pub trait DocumentSink: Send + Sync {
    async fn append(&self, document: &serde_json::Value) -> Result<(), SinkError>;
}

/// Writes one record per line as JSON. Pointed at stdout it is the local
/// stand-in for the downstream topic.
pub struct JsonLinesRecordSink<W> {
    writer: Mutex<W>,
}

impl<W: AsyncWrite + Unpin + Send> JsonLinesRecordSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }
}

#[async_trait]
impl<W: AsyncWrite + Unpin + Send> RecordSink for JsonLinesRecordSink<W> {
    async fn send(&self, record: &InvoiceRecord) -> Result<(), SinkError> {
        let mut line = serde_json::to_vec(record)?;
        line.push(b'\n');
        let mut writer = self.writer.lock().await;
        writer.write_all(&line).await?;
        writer.flush().await?;
        Ok(())
    }
}

/// Writes one document per line as JSON, usually onto an append file.
pub struct JsonLinesDocumentSink<W> {
    writer: Mutex<W>,
}

impl<W: AsyncWrite + Unpin + Send> JsonLinesDocumentSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }
}

#[async_trait]
impl<W: AsyncWrite + Unpin + Send> DocumentSink for JsonLinesDocumentSink<W> {
    async fn append(&self, document: &serde_json::Value) -> Result<(), SinkError> {
        let mut line = serde_json::to_vec(document)?;
        line.push(b'\n');
        let mut writer = self.writer.lock().await;
        writer.write_all(&line).await?;
        writer.flush().await?;
        Ok(())
    }
}

/// Discards documents, for hosts that run without an index.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullDocumentSink;

#[async_trait]
impl DocumentSink for NullDocumentSink {
    async fn append(&self, _document: &serde_json::Value) -> Result<(), SinkError> {
        Ok(())
    }
}

/// Captures records in memory, for tests.
#[derive(Default)]
pub struct MemoryRecordSink {
    records: Mutex<Vec<InvoiceRecord>>,
}

impl MemoryRecordSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn records(&self) -> Vec<InvoiceRecord> {
        self.records.lock().await.clone()
    }
}

#[async_trait]
impl RecordSink for MemoryRecordSink {
    async fn send(&self, record: &InvoiceRecord) -> Result<(), SinkError> {
        self.records.lock().await.push(record.clone());
        Ok(())
    }
}

/// Captures documents in memory, for tests.
#[derive(Default)]
pub struct MemoryDocumentSink {
    documents: Mutex<Vec<serde_json::Value>>,
}

impl MemoryDocumentSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn documents(&self) -> Vec<serde_json::Value> {
        self.documents.lock().await.clone()
    }
}

#[async_trait]
impl DocumentSink for MemoryDocumentSink {
    async fn append(&self, document: &serde_json::Value) -> Result<(), SinkError> {
        self.documents.lock().await.push(document.clone());
        Ok(())
    }
}
