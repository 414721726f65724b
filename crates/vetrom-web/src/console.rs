#![forbid(unsafe_code)]

//! A `tracing` layer that hands each event to a line sink.
//!
//! The browser build installs it over `console.*`, so storage failures,
//! rejected options, and clipboard errors show up in devtools.

use std::fmt::{self, Write as _};

use tracing::field::{Field, Visit};
use tracing::{Event, Level, Metadata, Subscriber};
use tracing_subscriber::layer::{Context, Layer};

/// `console` method for events at `level`.
#[must_use]
pub fn console_method(level: Level) -> &'static str {
    match level {
        Level::ERROR => "error",
        Level::WARN => "warn",
        Level::INFO => "info",
        Level::DEBUG | Level::TRACE => "debug",
    }
}

/// Forwards events at `max_level` or more severe to `sink` as one line each:
/// `target: message key=value ...`.
pub struct ConsoleLayer<F> {
    max_level: Level,
    sink: F,
}

impl<F> ConsoleLayer<F>
where
    F: Fn(Level, &str) + Send + Sync + 'static,
{
    pub fn new(max_level: Level, sink: F) -> Self {
        Self { max_level, sink }
    }
}

impl<S, F> Layer<S> for ConsoleLayer<F>
where
    S: Subscriber,
    F: Fn(Level, &str) + Send + Sync + 'static,
{
    fn enabled(&self, metadata: &Metadata<'_>, _ctx: Context<'_, S>) -> bool {
        *metadata.level() <= self.max_level
    }

    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        let mut line = LineVisitor::default();
        event.record(&mut line);
        (self.sink)(*metadata.level(), &line.finish(metadata.target()));
    }
}

#[derive(Default)]
struct LineVisitor {
    message: String,
    fields: String,
}

impl LineVisitor {
    fn finish(self, target: &str) -> String {
        let mut out = format!("{target}: {}", self.message);
        out.push_str(&self.fields);
        out
    }
}

impl Visit for LineVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message.push_str(value);
        } else {
            let _ = write!(self.fields, " {}={value}", field.name());
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            let _ = write!(self.message, "{value:?}");
        } else {
            let _ = write!(self.fields, " {}={value:?}", field.name());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::sync::{Arc, Mutex};
    use tracing_subscriber::layer::SubscriberExt;

    type Lines = Arc<Mutex<Vec<(Level, String)>>>;

    fn capture(max_level: Level, emit: impl FnOnce()) -> Vec<(Level, String)> {
        let lines: Lines = Arc::default();
        let sink = Arc::clone(&lines);
        let layer = ConsoleLayer::new(max_level, move |level, line: &str| {
            sink.lock().expect("lines").push((level, line.to_owned()));
        });
        let subscriber = tracing_subscriber::registry().with(layer);
        tracing::subscriber::with_default(subscriber, emit);
        let out = lines.lock().expect("lines").clone();
        out
    }

    #[test]
    fn warnings_reach_the_sink_with_fields() {
        let lines = capture(Level::WARN, || {
            tracing::warn!(target: "vetrom", key = "vetrom-pos-a", error = %"quota exceeded", "position save failed");
        });
        assert_eq!(
            lines,
            vec![(
                Level::WARN,
                "vetrom: position save failed key=vetrom-pos-a error=quota exceeded".to_owned()
            )]
        );
    }

    #[test]
    fn events_below_the_threshold_are_dropped() {
        let lines = capture(Level::WARN, || {
            tracing::debug!(target: "vetrom", "nested event skipped");
            tracing::info!(target: "vetrom", "scan complete");
            tracing::error!(target: "vetrom", "setup failed");
        });
        assert_eq!(lines, vec![(Level::ERROR, "vetrom: setup failed".to_owned())]);
    }

    #[test]
    fn debug_threshold_keeps_debug_events() {
        let lines = capture(Level::DEBUG, || {
            tracing::debug!(target: "vetrom", created = 2, "scan complete");
            tracing::trace!(target: "vetrom", "too chatty");
        });
        assert_eq!(lines, vec![(Level::DEBUG, "vetrom: scan complete created=2".to_owned())]);
    }

    #[test]
    fn console_methods_by_level() {
        assert_eq!(console_method(Level::ERROR), "error");
        assert_eq!(console_method(Level::WARN), "warn");
        assert_eq!(console_method(Level::INFO), "info");
        assert_eq!(console_method(Level::TRACE), "debug");
    }
}
