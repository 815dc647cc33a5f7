//! Response writers shared by every handler.

use crate::error::{translate, ApiError};
use crate::http::ApiResponse;
use bytes::Bytes;
use http_body_util::Full;
use hyper::{Response, StatusCode};
use std::backtrace::Backtrace;
use std::io::Write;
use tracing::error;

/// Body served at `/`.
pub const HOME_BODY: &str = "{\"message\": \"Fission API\", \"version\": \"0.1.0\"}\n";

/// JSON success response carrying `payload` unchanged.
pub fn respond_with_success(payload: impl Into<Bytes>) -> ApiResponse {
    ApiResponse::json_bytes(payload)
}

/// Plain text error response for `err`.
///
/// Always dumps the current stack to stderr first, whatever the error kind.
pub fn respond_with_error(err: &ApiError) -> ApiResponse {
    dump_stack(&mut std::io::stderr().lock());

    let (code, msg) = translate(err);
    error!(code = code.as_u16(), message = %msg);
    ApiResponse::plain_error(code, &msg)
}

/// Turn a handler response into the wire response.
///
/// If the response cannot be written, the failure goes through
/// [`respond_with_error`] once. Should that fail too, an empty 500 is sent.
pub fn write_response(response: ApiResponse) -> Response<Full<Bytes>> {
    match response.into_hyper() {
        Ok(response) => response,
        Err(err) => {
            // this will probably fail too, but try anyway
            match respond_with_error(&ApiError::from(err)).into_hyper() {
                Ok(response) => response,
                Err(_) => {
                    let mut response = Response::new(Full::new(Bytes::new()));
                    *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
                    response
                }
            }
        }
    }
}

fn dump_stack(out: &mut impl Write) {
    let backtrace = Backtrace::force_capture();
    let _ = writeln!(out, "{}", backtrace);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::{JSON_CONTENT_TYPE, TEXT_CONTENT_TYPE};
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Captured {
        fn text(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    impl Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_respond_with_success() {
        let response = respond_with_success(r#"[{"name":"hello"}]"#);
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.get_header("Content-Type"), Some(JSON_CONTENT_TYPE));
        assert_eq!(response.text_body(), r#"[{"name":"hello"}]"#);
    }

    #[test]
    fn test_respond_with_error() {
        let response = respond_with_error(&ApiError::not_found("function 'x' not found"));
        assert_eq!(response.status, StatusCode::NOT_FOUND);
        assert_eq!(response.get_header("Content-Type"), Some(TEXT_CONTENT_TYPE));
        assert_eq!(response.text_body(), "function 'x' not found\n");
    }

    #[test]
    fn test_respond_with_error_logs_code_and_message() {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::TRACE)
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            respond_with_error(&ApiError::not_found("function 'x' not found"));
        });

        let logged = captured.text();
        let lines: Vec<&str> = logged.lines().collect();
        assert_eq!(lines.len(), 1, "{}", logged);
        assert!(lines[0].contains("ERROR"));
        assert!(lines[0].contains("code=404"));
        assert!(lines[0].contains("function 'x' not found"));
    }

    #[test]
    fn test_dump_stack_writes_backtrace() {
        let mut out = Captured::default();
        dump_stack(&mut out);

        let dumped = out.text();
        assert!(dumped.ends_with('\n'));
        assert!(!dumped.trim().is_empty());
    }

    #[test]
    fn test_write_response_passes_through() {
        let response = write_response(respond_with_success("{}"));
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get("content-type").unwrap(),
            JSON_CONTENT_TYPE
        );
    }

    #[test]
    fn test_write_failure_goes_through_error_path() {
        let broken = respond_with_success("{}").header("X-Broken", "a\r\nb");
        let response = write_response(broken);
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            response.headers().get("content-type").unwrap(),
            TEXT_CONTENT_TYPE
        );
    }
}
