//! Streaming: line framing, chunk extraction and the caller-facing pipe

pub mod frame;
pub mod generic;
pub mod pipe;

use async_trait::async_trait;

use crate::error::LlmError;
use crate::transport::BodyStream;

pub use frame::{Frame, FrameStream, frames};
pub use generic::ChoicesDeltaParser;
pub use pipe::CompletionStream;

/// Receives text fragments in the order the vendor produced them
#[async_trait]
pub trait ChunkSink: Send {
    /// Deliver one non-empty fragment
    ///
    /// An error aborts parsing and is returned from [`StreamParser::parse`].
    async fn write_chunk(&mut self, chunk: String) -> Result<(), LlmError>;
}

/// Turns a streaming reply body into text fragments
#[async_trait]
pub trait StreamParser: Send + Sync {
    /// Consume `body` until the vendor signals completion or it ends
    ///
    /// The body is dropped (closing the connection) when this returns.
    async fn parse(&self, body: BodyStream, sink: &mut dyn ChunkSink) -> Result<(), LlmError>;
}

#[cfg(test)]
#[async_trait]
impl ChunkSink for Vec<String> {
    async fn write_chunk(&mut self, chunk: String) -> Result<(), LlmError> {
        self.push(chunk);
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use bytes::Bytes;
    use futures_util::stream;

    use super::*;

    /// Body made of the given chunks
    pub(crate) fn body(chunks: &[&'static str]) -> BodyStream {
        let chunks: Vec<Result<Bytes, LlmError>> = chunks.iter().map(|c| Ok(Bytes::from_static(c.as_bytes()))).collect();
        Box::pin(stream::iter(chunks))
    }

    /// Sink that fails after accepting `capacity` chunks
    pub(crate) struct FailingSink {
        pub(crate) accepted: Vec<String>,
        pub(crate) capacity: usize,
    }

    #[async_trait]
    impl ChunkSink for FailingSink {
        async fn write_chunk(&mut self, chunk: String) -> Result<(), LlmError> {
            if self.accepted.len() == self.capacity {
                return Err(LlmError::StreamClosed);
            }
            self.accepted.push(chunk);
            Ok(())
        }
    }
}
