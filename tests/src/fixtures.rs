//! Recording handlers and log capture shared by integration scenarios.

use crosstalk::{EventHandler, Handler, LifecycleEvent, LifecycleHandler};
use parking_lot::Mutex;
use serde_json::Value;
use std::io;
use std::sync::Arc;
use tracing_subscriber::fmt::MakeWriter;

/// Handler that stores every value it receives.
pub struct Recorder {
    pub handler: EventHandler,
    seen: Arc<Mutex<Vec<Value>>>,
}

impl Recorder {
    pub fn new() -> Self {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        Self {
            handler: Handler::new(move |value: &Value| {
                sink.lock().push(value.clone());
                Ok(())
            }),
            seen,
        }
    }

    /// Everything received so far.
    pub fn values(&self) -> Vec<Value> {
        self.seen.lock().clone()
    }

    pub fn count(&self) -> usize {
        self.seen.lock().len()
    }
}

impl Default for Recorder {
    fn default() -> Self {
        Self::new()
    }
}

/// Lifecycle handler that stores every transition it receives.
pub struct LifecycleRecorder {
    pub handler: LifecycleHandler,
    seen: Arc<Mutex<Vec<LifecycleEvent>>>,
}

impl LifecycleRecorder {
    pub fn new() -> Self {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        Self {
            handler: Handler::new(move |event: &LifecycleEvent| {
                sink.lock().push(event.clone());
                Ok(())
            }),
            seen,
        }
    }

    pub fn events(&self) -> Vec<LifecycleEvent> {
        self.seen.lock().clone()
    }
}

impl Default for LifecycleRecorder {
    fn default() -> Self {
        Self::new()
    }
}

/// Handler that always fails with `message`.
pub fn failing(message: &'static str) -> EventHandler {
    Handler::new(move |_: &Value| Err(anyhow::anyhow!(message)))
}

/// Handler that always panics with `message`.
pub fn panicking(message: &'static str) -> EventHandler {
    Handler::new(move |_: &Value| panic!("{message}"))
}

/// Formatted tracing output collected while a closure runs.
#[derive(Clone, Default)]
pub struct LogCapture(Arc<Mutex<Vec<u8>>>);

impl LogCapture {
    /// Run `f` with every tracing event on this thread written to a new capture.
    pub fn run<R>(f: impl FnOnce() -> R) -> (R, Self) {
        let capture = Self::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(capture.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::TRACE)
            .finish();
        let result = tracing::subscriber::with_default(subscriber, f);
        (result, capture)
    }

    pub fn lines_containing(&self, needle: &str) -> Vec<String> {
        String::from_utf8_lossy(&self.0.lock())
            .lines()
            .filter(|line| line.contains(needle))
            .map(str::to_string)
            .collect()
    }
}

impl io::Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogCapture {
    type Writer = Self;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}
