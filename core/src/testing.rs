//! Test helpers shared by unit tests

use std::io::Write;
use std::sync::{Arc, Mutex};
use tracing::Subscriber;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

/// Captures formatted tracing output into memory.
///
/// Event names are not part of the default fmt output, so each event is
/// additionally recorded as an `event=<name>` line.
#[derive(Clone, Debug, Default)]
pub(crate) struct LogCapture {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl LogCapture {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscriber writing into this capture; install with `set_default`
    pub fn subscriber(&self) -> impl Subscriber + Send + Sync + use<> {
        tracing_subscriber::registry()
            .with(EventNames {
                capture: self.clone(),
            })
            .with(tracing_subscriber::fmt::layer().with_writer(self.clone()).with_ansi(false))
    }

    pub fn output(&self) -> String {
        let buffer = self.buffer.lock().unwrap();
        String::from_utf8_lossy(&buffer).into_owned()
    }

    pub fn count(&self, needle: &str) -> usize {
        self.output().matches(needle).count()
    }

    #[track_caller]
    pub fn assert_contains(&self, needle: &str) {
        let output = self.output();
        assert!(
            output.contains(needle),
            "log output does not contain '{needle}':\n{output}"
        );
    }

    #[track_caller]
    pub fn assert_not_contains(&self, needle: &str) {
        let output = self.output();
        assert!(
            !output.contains(needle),
            "log output unexpectedly contains '{needle}':\n{output}"
        );
    }
}

impl<'a> MakeWriter<'a> for LogCapture {
    type Writer = LogCaptureWriter;

    fn make_writer(&'a self) -> Self::Writer {
        LogCaptureWriter {
            buffer: Arc::clone(&self.buffer),
        }
    }
}

pub(crate) struct LogCaptureWriter {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl Write for LogCaptureWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.buffer.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

struct EventNames {
    capture: LogCapture,
}

impl<S: Subscriber> Layer<S> for EventNames {
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        let line = format!("event={}\n", event.metadata().name());
        self.capture.buffer.lock().unwrap().extend_from_slice(line.as_bytes());
    }
}
