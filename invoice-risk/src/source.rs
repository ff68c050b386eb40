use std::collections::VecDeque;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader, Lines};

use crate::error::PipelineError;

/// Ordered stream of raw event payloads. Position tracking and delivery
/// semantics belong to the implementation; the pipeline only pulls.
#[async_trait]
pub trait EventSource: Send {
    /// Next payload, or `None` once the stream is exhausted.
    async fn next_event(&mut self) -> Result<Option<Vec<u8>>, PipelineError>;
}

/// Fixed list of payloads, for tests and local tooling.
pub struct MemorySource {
    events: VecDeque<Vec<u8>>,
}

impl MemorySource {
    pub fn new<I>(events: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Vec<u8>>,
    {
        Self {
            events: events.into_iter().map(Into::into).collect(),
        }
    }
}

#[async_trait]
impl EventSource for MemorySource {
    async fn next_event(&mut self) -> Result<Option<Vec<u8>>, PipelineError> {
        Ok(self.events.pop_front())
    }
}

/// Newline-delimited JSON payloads from any reader, one event per line.
/// Blank lines are skipped so hand-fed stdin works comfortably.
pub struct JsonLinesSource<R> {
    lines: Lines<BufReader<R>>,
}

impl<R: AsyncRead + Unpin + Send> JsonLinesSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: BufReader::new(reader).lines(),
        }
    }
}

#[async_trait]
impl<R: AsyncRead + Unpin + Send> EventSource for JsonLinesSource<R> {
    async fn next_event(&mut self) -> Result<Option<Vec<u8>>, PipelineError> {
        loop {
            match self.lines.next_line().await? {
                Some(line) if line.trim().is_empty() => continue,
                Some(line) => return Ok(Some(line.into_bytes())),
                None => return Ok(None),
            }
        }
    }
}
