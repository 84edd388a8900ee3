//! HTTP response alias and response builders.

use bytes::Bytes;
use http_body_util::Full;
use mnemosyne_core::ErrorEnvelope;

/// The HTTP response type produced by hooks and handlers.
///
/// This is a standard `http::Response` with a `Full<Bytes>` body.
pub type Response = http::Response<Full<Bytes>>;

/// Extension trait for building error responses.
pub trait ResponseExt {
    /// Creates a plain-text error response.
    fn plain_error(status: http::StatusCode, message: &str) -> Response;

    /// Creates a JSON response from an error envelope.
    fn from_envelope(status: http::StatusCode, envelope: &ErrorEnvelope) -> Response;
}

impl ResponseExt for Response {
    fn plain_error(status: http::StatusCode, message: &str) -> Response {
        http::Response::builder()
            .status(status)
            .header(http::header::CONTENT_TYPE, "text/plain; charset=utf-8")
            .body(Full::new(Bytes::from(message.to_string())))
            .expect("failed to build error response")
    }

    fn from_envelope(status: http::StatusCode, envelope: &ErrorEnvelope) -> Response {
        let body = serde_json::to_string(envelope).expect("failed to serialize error envelope");

        http::Response::builder()
            .status(status)
            .header(http::header::CONTENT_TYPE, "application/json")
            .body(Full::new(Bytes::from(body)))
            .expect("failed to build JSON error response")
    }
}
