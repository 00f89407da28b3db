//! Line framing shared by every streaming parser
//!
//! Vendors stream either newline-delimited JSON or server-sent events. Both
//! reduce to: split on newlines, trim, skip blanks, strip a `data: ` prefix.

use std::io;
use std::pin::Pin;

use futures_util::{Stream, StreamExt, TryStreamExt, future};
use tokio_util::codec::{AnyDelimiterCodec, AnyDelimiterCodecError, FramedRead};
use tokio_util::io::StreamReader;

use crate::error::LlmError;
use crate::transport::BodyStream;

const DATA_PREFIX: &str = "data: ";
const DONE_SENTINEL: &str = "[DONE]";

/// Longest line buffered while waiting for a newline
const MAX_LINE_LENGTH: usize = 4 * 1024 * 1024;

/// Payload of one non-blank line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    data: String,
}

impl Frame {
    /// Frame for a raw line, or `None` for blank lines
    pub fn from_line(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        let data = line.strip_prefix(DATA_PREFIX).unwrap_or(line);
        Some(Self { data: data.to_owned() })
    }

    pub fn data(&self) -> &str {
        &self.data
    }

    /// Whether this is the `[DONE]` end-of-stream sentinel
    pub fn is_done(&self) -> bool {
        self.data == DONE_SENTINEL
    }
}

pub type FrameStream = Pin<Box<dyn Stream<Item = Result<Frame, LlmError>> + Send>>;

/// Split a reply body into frames
///
/// Lines that are not UTF-8 are skipped like any other unreadable frame.
pub fn frames(body: BodyStream) -> FrameStream {
    split_lines(body, MAX_LINE_LENGTH)
}

fn split_lines(body: BodyStream, max_length: usize) -> FrameStream {
    let reader = StreamReader::new(body.map_err(io::Error::other));
    let codec = AnyDelimiterCodec::new_with_max_length(b"\n".to_vec(), Vec::new(), max_length);

    let frames = FramedRead::new(reader, codec).filter_map(|line| {
        future::ready(match line {
            Ok(line) => decode_line(&line).map(Ok),
            Err(e) => Some(Err(codec_error(e))),
        })
    });

    Box::pin(frames)
}

fn decode_line(line: &[u8]) -> Option<Frame> {
    match std::str::from_utf8(line) {
        Ok(line) => Frame::from_line(line),
        Err(e) => {
            tracing::debug!(error = %e, "skipping stream line that is not UTF-8");
            None
        }
    }
}

/// Recover the original error from the io layer
fn codec_error(error: AnyDelimiterCodecError) -> LlmError {
    match error {
        AnyDelimiterCodecError::Io(error) => {
            let message = error.to_string();
            match error.into_inner().map(|inner| inner.downcast::<LlmError>()) {
                Some(Ok(original)) => *original,
                _ => LlmError::Transport(message),
            }
        }
        AnyDelimiterCodecError::MaxChunkLengthExceeded => {
            LlmError::MalformedResponse("stream line too long".to_owned())
        }
    }
}
