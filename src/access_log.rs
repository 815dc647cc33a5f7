//! Access logging in Apache Common Log Format.
//!
//! One line per completed request, written to a fixed stream (stdout by
//! default) from a background thread, independent of the tracing
//! subscriber.

use chrono::{DateTime, FixedOffset, Local};
use std::fmt;
use std::io::Write;
use std::net::IpAddr;
use std::sync::mpsc;
use std::thread;
use tracing::warn;

/// One completed request.
#[derive(Debug, Clone)]
pub struct AccessLogEntry {
    pub host: IpAddr,
    pub time: DateTime<FixedOffset>,
    pub method: String,
    /// Path and query as received.
    pub uri: String,
    pub protocol: String,
    pub status: u16,
    /// Response body size in bytes.
    pub size: usize,
}

impl AccessLogEntry {
    pub fn now(
        host: IpAddr,
        method: impl Into<String>,
        uri: impl Into<String>,
        protocol: impl Into<String>,
    ) -> Self {
        Self {
            host,
            time: Local::now().fixed_offset(),
            method: method.into(),
            uri: uri.into(),
            protocol: protocol.into(),
            status: 0,
            size: 0,
        }
    }
}

impl fmt::Display for AccessLogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - - [{}] \"{} {} {}\" {} {}",
            self.host,
            self.time.format("%d/%b/%Y:%H:%M:%S %z"),
            self.method,
            self.uri,
            self.protocol,
            self.status,
            self.size
        )
    }
}

enum Message {
    Line(String),
    Flush(mpsc::SyncSender<()>),
}

/// Destination for access log lines.
///
/// Lines are formatted on the request task and written by a dedicated
/// thread.
#[derive(Clone)]
pub struct AccessLog {
    tx: mpsc::Sender<Message>,
}

impl AccessLog {
    pub fn new(mut sink: Box<dyn Write + Send>) -> Self {
        let (tx, rx) = mpsc::channel::<Message>();

        let spawned = thread::Builder::new()
            .name("access-log".to_string())
            .spawn(move || {
                for message in rx {
                    match message {
                        Message::Line(line) => {
                            let _ = sink.write_all(line.as_bytes());
                            let _ = sink.flush();
                        }
                        Message::Flush(done) => {
                            let _ = done.send(());
                        }
                    }
                }
            });
        if let Err(err) = spawned {
            warn!(error = %err, "Access log writer could not start; access log disabled");
        }

        Self { tx }
    }

    pub fn stdout() -> Self {
        Self::new(Box::new(std::io::stdout()))
    }

    /// Queue one line. Failures to write the log are ignored.
    pub fn record(&self, entry: &AccessLogEntry) {
        let _ = self.tx.send(Message::Line(format!("{}\n", entry)));
    }

    /// Block until every line queued so far has been written.
    pub fn flush(&self) {
        let (done_tx, done_rx) = mpsc::sync_channel(1);
        if self.tx.send(Message::Flush(done_tx)).is_ok() {
            let _ = done_rx.recv();
        }
    }
}

impl Default for AccessLog {
    fn default() -> Self {
        Self::stdout()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Buffer(Arc<Mutex<Vec<u8>>>);

    impl Write for Buffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn entry() -> AccessLogEntry {
        let tz = FixedOffset::west_opt(7 * 3600).unwrap();
        AccessLogEntry {
            host: "127.0.0.1".parse().unwrap(),
            time: tz.with_ymd_and_hms(2000, 10, 10, 13, 55, 36).unwrap(),
            method: "GET".to_string(),
            uri: "/v1/functions?x=1".to_string(),
            protocol: "HTTP/1.1".to_string(),
            status: 200,
            size: 2326,
        }
    }

    #[test]
    fn test_common_log_format() {
        assert_eq!(
            entry().to_string(),
            "127.0.0.1 - - [10/Oct/2000:13:55:36 -0700] \"GET /v1/functions?x=1 HTTP/1.1\" 200 2326"
        );
    }

    #[test]
    fn test_record_writes_one_line() {
        let buffer = Buffer::default();
        let log = AccessLog::new(Box::new(buffer.clone()));

        log.record(&entry());
        log.record(&entry());
        log.flush();

        let written = String::from_utf8(buffer.0.lock().unwrap().clone()).unwrap();
        assert_eq!(written.lines().count(), 2);
        assert!(written.ends_with("200 2326\n"));
    }

    struct Stalled(Arc<Mutex<Vec<u8>>>);

    impl Write for Stalled {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            std::thread::sleep(std::time::Duration::from_millis(200));
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_record_does_not_wait_for_slow_sink() {
        let written = Arc::new(Mutex::new(Vec::new()));
        let log = AccessLog::new(Box::new(Stalled(written.clone())));

        let start = std::time::Instant::now();
        for _ in 0..5 {
            log.record(&entry());
        }
        assert!(start.elapsed() < std::time::Duration::from_millis(200));

        log.flush();
        let text = String::from_utf8(written.lock().unwrap().clone()).unwrap();
        assert_eq!(text.lines().count(), 5);
    }
}
