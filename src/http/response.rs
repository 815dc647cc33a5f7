//! Outbound response type.

use bytes::Bytes;
use http_body_util::Full;
use hyper::{Response, StatusCode};

pub const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";
pub const TEXT_CONTENT_TYPE: &str = "text/plain; charset=utf-8";

/// A response produced by a handler, before it is written to the wire.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    /// Headers in insertion order.
    pub headers: Vec<(String, String)>,
    pub body: Bytes,
}

impl ApiResponse {
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: Bytes::new(),
        }
    }

    /// 200 with a JSON payload written verbatim.
    pub fn json_bytes(payload: impl Into<Bytes>) -> Self {
        Self::new(StatusCode::OK)
            .header("Content-Type", JSON_CONTENT_TYPE)
            .body(payload)
    }

    /// Plain text error; the message is terminated with a newline.
    pub fn plain_error(status: StatusCode, message: &str) -> Self {
        Self::new(status)
            .header("Content-Type", TEXT_CONTENT_TYPE)
            .header("X-Content-Type-Options", "nosniff")
            .body(format!("{}\n", message))
    }

    /// The router's response when no route matches.
    pub fn not_found() -> Self {
        Self::new(StatusCode::NOT_FOUND)
            .header("Content-Type", TEXT_CONTENT_TYPE)
            .header("X-Content-Type-Options", "nosniff")
            .body("404 page not found\n")
    }

    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let key = key.into();
        self.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(&key));
        self.headers.push((key, value.into()));
        self
    }

    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    pub fn get_header(&self, key: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    pub fn text_body(&self) -> String {
        String::from_utf8_lossy(&self.body).to_string()
    }

    /// Build the hyper response. Fails if a header name or value is not
    /// valid on the wire.
    pub fn into_hyper(self) -> Result<Response<Full<Bytes>>, hyper::http::Error> {
        let mut builder = Response::builder().status(self.status);
        for (name, value) in self.headers {
            builder = builder.header(name, value);
        }
        builder.body(Full::new(self.body))
    }
}
