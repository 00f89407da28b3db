//! HTTP seam between adapters and the network
//!
//! Adapters produce [`HttpRequest`] values; a [`Transport`] sends them and
//! hands back the status plus a lazily-read body. Dropping the body closes
//! the underlying connection.

use std::pin::Pin;

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use futures_util::{Stream, TryStreamExt};
use http::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use http::{Method, StatusCode};
use serde::Serialize;
use url::Url;

use crate::error::LlmError;

/// Reply body, read incrementally
pub type BodyStream = Pin<Box<dyn Stream<Item = Result<Bytes, LlmError>> + Send>>;

/// Fully built outbound request
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl HttpRequest {
    /// JSON `POST` request with the given extra headers
    pub fn post_json<T: Serialize>(url: Url, mut headers: HeaderMap, payload: &T) -> Result<Self, LlmError> {
        let body = serde_json::to_vec(payload)
            .map_err(|e| LlmError::InvalidRequest(format!("failed to encode request body: {e}")))?;

        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        Ok(Self {
            method: Method::POST,
            url,
            headers,
            body: Bytes::from(body),
        })
    }
}

/// Status and body of a vendor reply
pub struct TransportResponse {
    pub status: StatusCode,
    pub body: BodyStream,
}

impl std::fmt::Debug for TransportResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransportResponse")
            .field("status", &self.status)
            .finish_non_exhaustive()
    }
}

/// Sends requests to a vendor
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send a request and return once the status line and headers arrive
    async fn send(&self, request: HttpRequest) -> Result<TransportResponse, LlmError>;
}

/// Transport backed by a shared [`reqwest::Client`]
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<TransportResponse, LlmError> {
        let response = self
            .client
            .request(request.method, request.url)
            .headers(request.headers)
            .body(request.body)
            .send()
            .await
            .map_err(|e| LlmError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .bytes_stream()
            .map_err(|e| LlmError::Transport(e.to_string()));

        Ok(TransportResponse {
            status,
            body: Box::pin(body),
        })
    }
}

/// Drain a body into memory
pub(crate) async fn read_body(body: BodyStream) -> Result<Bytes, LlmError> {
    body.try_fold(BytesMut::new(), |mut buffer, chunk| async move {
        buffer.extend_from_slice(&chunk);
        Ok(buffer)
    })
    .await
    .map(BytesMut::freeze)
}

#[cfg(test)]
mod tests {
    use futures_util::stream;
    use serde_json::json;

    use super::*;

    #[test]
    fn post_json_sets_content_type() {
        let url = Url::parse("https://example.com/v1/chat").unwrap();
        let request = HttpRequest::post_json(url, HeaderMap::new(), &json!({"a": 1})).unwrap();

        assert_eq!(request.method, Method::POST);
        assert_eq!(request.headers[CONTENT_TYPE], "application/json");
        assert_eq!(&request.body[..], br#"{"a":1}"#);
    }

    #[tokio::test]
    async fn read_body_concatenates_chunks() {
        let body: BodyStream = Box::pin(stream::iter(vec![
            Ok(Bytes::from_static(b"hel")),
            Ok(Bytes::from_static(b"lo")),
        ]));

        assert_eq!(&read_body(body).await.unwrap()[..], b"hello");
    }

    #[tokio::test]
    async fn read_body_propagates_errors() {
        let body: BodyStream = Box::pin(stream::iter(vec![
            Ok(Bytes::from_static(b"partial")),
            Err(LlmError::Transport("connection reset".to_owned())),
        ]));

        assert!(matches!(read_body(body).await, Err(LlmError::Transport(_))));
    }
}
