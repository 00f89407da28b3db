//! Single-producer single-consumer pipe between a stream worker and the caller

use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::{Stream, StreamExt};
use tokio::io::AsyncRead;
use tokio::sync::mpsc;
use tokio_util::io::StreamReader;

use super::ChunkSink;
use crate::error::LlmError;

type PipeItem = Result<String, LlmError>;

/// Create a connected writer/reader pair
///
/// The channel holds a single item, so the writer waits for the reader
/// before producing more.
pub(crate) fn pipe() -> (PipeWriter, CompletionStream) {
    let (tx, rx) = mpsc::channel(1);
    (PipeWriter { tx }, CompletionStream { rx })
}

/// Producing end, owned by the stream worker
#[derive(Debug)]
pub(crate) struct PipeWriter {
    tx: mpsc::Sender<PipeItem>,
}

impl PipeWriter {
    /// Handle that resolves once the reader is gone
    pub(crate) fn watcher(&self) -> ReaderWatcher {
        ReaderWatcher { tx: self.tx.clone() }
    }

    /// Finish the stream normally; the reader sees end-of-stream
    pub(crate) fn close(self) {
        drop(self);
    }

    /// Finish the stream with an error the reader will observe
    pub(crate) async fn close_with_error(self, error: LlmError) {
        if self.tx.send(Err(error)).await.is_err() {
            tracing::debug!("stream reader closed before the error could be delivered");
        }
    }
}

#[async_trait]
impl ChunkSink for PipeWriter {
    async fn write_chunk(&mut self, chunk: String) -> Result<(), LlmError> {
        self.tx.send(Ok(chunk)).await.map_err(|_| LlmError::StreamClosed)
    }
}

/// Observes reader shutdown without borrowing the writer
pub(crate) struct ReaderWatcher {
    tx: mpsc::Sender<PipeItem>,
}

impl ReaderWatcher {
    pub(crate) async fn closed(&self) {
        self.tx.closed().await;
    }
}

/// Text fragments of a streaming completion
///
/// Yields fragments in vendor order. A failure is delivered as the final
/// `Err` item; normal completion ends the stream. Dropping or calling
/// [`close`](Self::close) stops the producer and releases the connection.
#[derive(Debug)]
pub struct CompletionStream {
    rx: mpsc::Receiver<PipeItem>,
}

impl CompletionStream {
    /// Stop reading; the producer observes the closure and shuts down
    pub fn close(mut self) {
        self.rx.close();
    }

    /// Read the whole stream into one string
    pub async fn collect_text(mut self) -> Result<String, LlmError> {
        let mut text = String::new();
        while let Some(chunk) = self.next().await {
            text.push_str(&chunk?);
        }
        Ok(text)
    }

    /// Byte-oriented view for callers that want an [`AsyncRead`]
    pub fn into_reader(self) -> impl AsyncRead + Send + Unpin {
        StreamReader::new(self.map(|item| item.map(Bytes::from).map_err(io::Error::other)))
    }
}

impl Stream for CompletionStream {
    type Item = PipeItem;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.get_mut().rx.poll_recv(cx)
    }
}
