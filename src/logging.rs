//! Logging setup and in-memory log history
//!
//! Every event that passes the level filter is written to stderr and also
//! appended to a [`LogHistory`] as `[<timestamp>] [<LEVEL>] <message>`. The
//! history is attached to error notifications so the operator sees what led
//! up to a failure.
//!
//! Critical events are `error!` events carrying `critical = true`; use the
//! [`critical!`](crate::critical) macro to emit them.

use chrono::{SecondsFormat, Utc};
use std::fmt;
use std::sync::{Arc, Mutex};
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::prelude::*;
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{fmt as tracing_fmt, EnvFilter};

/// Emit an error event marked as critical
#[macro_export]
macro_rules! critical {
    ($($arg:tt)+) => {
        ::tracing::error!(critical = true, $($arg)+)
    };
}

/// Append-only, ordered record of the log lines of one update run
#[derive(Debug, Clone, Default)]
pub struct LogHistory {
    lines: Arc<Mutex<Vec<String>>>,
}

impl LogHistory {
    /// Create an empty history
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a line
    pub fn push(&self, line: impl Into<String>) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.push(line.into());
        }
    }

    /// Copy of all lines recorded so far
    pub fn snapshot(&self) -> Vec<String> {
        self.lines.lock().map(|l| l.clone()).unwrap_or_default()
    }

    /// Number of recorded lines
    pub fn len(&self) -> usize {
        self.lines.lock().map(|l| l.len()).unwrap_or(0)
    }

    /// Returns true if nothing was recorded
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Tracing layer recording formatted events into a [`LogHistory`]
pub struct HistoryLayer {
    history: LogHistory,
}

impl HistoryLayer {
    /// Create a layer writing into `history`
    pub fn new(history: LogHistory) -> Self {
        Self { history }
    }
}

impl<S: Subscriber> Layer<S> for HistoryLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = EventVisitor::default();
        event.record(&mut visitor);

        let label = if visitor.critical {
            "CRITICAL"
        } else {
            level_label(event.metadata().level())
        };

        self.history.push(format!(
            "[{}] [{}] {}",
            Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            label,
            visitor.render()
        ));
    }
}

fn level_label(level: &Level) -> &'static str {
    match *level {
        Level::TRACE => "TRACE",
        Level::DEBUG => "DEBUG",
        Level::INFO => "INFO",
        Level::WARN => "WARN",
        Level::ERROR => "ERROR",
    }
}

#[derive(Default)]
struct EventVisitor {
    message: String,
    fields: Vec<String>,
    critical: bool,
}

impl EventVisitor {
    fn render(&self) -> String {
        if self.fields.is_empty() {
            self.message.clone()
        } else {
            format!("{} {}", self.message, self.fields.join(" "))
        }
    }
}

impl Visit for EventVisitor {
    fn record_bool(&mut self, field: &Field, value: bool) {
        if field.name() == "critical" {
            self.critical = value;
        } else {
            self.fields.push(format!("{}={}", field.name(), value));
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        } else {
            self.fields.push(format!("{}={}", field.name(), value));
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{:?}", value);
        } else {
            self.fields.push(format!("{}={:?}", field.name(), value));
        }
    }
}

/// Install the global subscriber: stderr output plus history capture
///
/// `RUST_LOG` takes precedence over `default_level`.
pub fn init_logging(default_level: &str, history: &LogHistory) -> Result<(), TryInitError> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_fmt::layer().with_writer(std::io::stderr))
        .with(HistoryLayer::new(history.clone()))
        .try_init()
}

/// Capture events of the current thread into `history` until the guard is dropped
pub fn capture(history: &LogHistory) -> tracing::subscriber::DefaultGuard {
    let subscriber = tracing_subscriber::registry()
        .with(EnvFilter::new("debug"))
        .with(HistoryLayer::new(history.clone()));
    tracing::subscriber::set_default(subscriber)
}
