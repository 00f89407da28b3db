use async_trait::async_trait;
use futures_util::StreamExt;

use super::{ChunkSink, StreamParser, frames};
use crate::error::LlmError;
use crate::protocol::openai::OpenAiStreamChunk;
use crate::transport::BodyStream;

/// Parser for vendors streaming `choices[].delta.content` frames
///
/// Emits each non-empty delta in order and stops at `[DONE]`. Lines that
/// are not valid JSON are skipped.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChoicesDeltaParser;

#[async_trait]
impl StreamParser for ChoicesDeltaParser {
    async fn parse(&self, body: BodyStream, sink: &mut dyn ChunkSink) -> Result<(), LlmError> {
        let mut frames = frames(body);

        while let Some(frame) = frames.next().await {
            let frame = frame?;
            if frame.is_done() {
                return Ok(());
            }

            let chunk: OpenAiStreamChunk = match serde_json::from_str(frame.data()) {
                Ok(chunk) => chunk,
                Err(e) => {
                    tracing::debug!(error = %e, "skipping undecodable stream line");
                    continue;
                }
            };

            for content in chunk.choices.into_iter().filter_map(|choice| choice.delta.content) {
                if !content.is_empty() {
                    sink.write_chunk(content).await?;
                }
            }
        }

        Ok(())
    }
}
