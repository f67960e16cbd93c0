// ── Operation tracing ─────────────────────────────────────────────────────────
//
// Uniform instrumentation for every facade call:
//   • `OperationSpan` enters a `tracing` span on creation and records the
//     elapsed time when dropped, so early returns and `?` are covered.
//   • `log_ok` / `log_err` emit the outcome line (Debug on success, Error on
//     failure).
//
// The subscriber is chosen by the embedding binary; this module only emits.

use std::fmt::Debug;
use std::time::Instant;

use tracing::span::EnteredSpan;
use tracing::{debug, debug_span, error};

/// Scoped span around one operation.  Dropping it closes the span and logs
/// the duration.
#[must_use = "the span closes as soon as the guard is dropped"]
pub struct OperationSpan {
    operation: &'static str,
    arg: Option<String>,
    started: Instant,
    _entered: EnteredSpan,
}

impl OperationSpan {
    pub fn enter(operation: &'static str) -> Self {
        Self::build(operation, None)
    }

    /// Span labelled with the operation's primary argument.
    pub fn with_arg(operation: &'static str, arg: impl Into<String>) -> Self {
        Self::build(operation, Some(arg.into()))
    }

    fn build(operation: &'static str, arg: Option<String>) -> Self {
        let span = debug_span!("env", operation, arg = arg.as_deref().unwrap_or_default());
        Self {
            operation,
            arg,
            started: Instant::now(),
            _entered: span.entered(),
        }
    }
}

impl Drop for OperationSpan {
    fn drop(&mut self) {
        let elapsed_us = self.started.elapsed().as_micros() as u64;
        match &self.arg {
            Some(arg) => debug!(operation = self.operation, arg = %arg, elapsed_us, "trace"),
            None => debug!(operation = self.operation, elapsed_us, "trace"),
        }
    }
}

/// Outcome line for a successful call.
pub fn log_ok<T: Debug + ?Sized>(operation: &'static str, result: &T) {
    debug!(operation, result = ?result);
}

/// Outcome line for a failed call.
pub fn log_err(operation: &'static str, err: &dyn std::fmt::Display) {
    error!(operation, error = %err);
}

/// Log the outcome of a fallible call and pass it through unchanged.
pub fn log_result<T: Debug, E: std::fmt::Display>(
    operation: &'static str,
    result: std::result::Result<T, E>,
) -> std::result::Result<T, E> {
    match &result {
        Ok(value) => log_ok(operation, value),
        Err(err) => log_err(operation, err),
    }
    result
}

/// Run `f` under a subscriber that counts Error-level events.
#[cfg(test)]
pub(crate) fn count_error_events<R>(f: impl FnOnce() -> R) -> (R, usize) {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use tracing::{Event, Level, Subscriber};
    use tracing_subscriber::layer::{Context, SubscriberExt};
    use tracing_subscriber::Layer;

    struct ErrorCounter(Arc<AtomicUsize>);

    impl<S: Subscriber> Layer<S> for ErrorCounter {
        fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
            if *event.metadata().level() == Level::ERROR {
                self.0.fetch_add(1, Ordering::SeqCst);
            }
        }
    }

    let count = Arc::new(AtomicUsize::new(0));
    let subscriber = tracing_subscriber::registry().with(ErrorCounter(Arc::clone(&count)));
    let result = tracing::subscriber::with_default(subscriber, f);
    (result, count.load(Ordering::SeqCst))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_result_passes_value_through() {
        let ok: std::result::Result<u16, String> = Ok(80);
        assert_eq!(log_result("TerminalWidth", ok), Ok(80));

        let err: std::result::Result<u16, String> = Err("no console".into());
        assert_eq!(log_result("TerminalWidth", err), Err("no console".to_string()));
    }

    #[test]
    fn only_failures_log_at_error() {
        let (_, errors) = count_error_events(|| {
            let _span = OperationSpan::enter("TerminalWidth");
            log_ok("TerminalWidth", &80u16);
            log_result::<u16, _>("TerminalWidth", Err("no console"))
        });
        assert_eq!(errors, 1);
    }

    #[test]
    fn span_guard_survives_early_return() {
        fn guarded(fail: bool) -> std::result::Result<(), ()> {
            let _span = OperationSpan::with_arg("DirIsWritable", "/tmp");
            if fail {
                return Err(());
            }
            Ok(())
        }
        assert!(guarded(true).is_err());
        assert!(guarded(false).is_ok());
    }
}
