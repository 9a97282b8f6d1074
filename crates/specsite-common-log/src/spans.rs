//! Span helpers for build and watch operations.

use tracing::{info_span, Span};

/// Span covering the render of one spec file.
pub fn render_span(source: &str) -> Span {
    info_span!("render", source = %source)
}

/// Span covering the reaction to one watch event.
pub fn watch_span(kind: &str, path: &str) -> Span {
    info_span!("watch", event = %kind, path = %path)
}

/// Span covering a full build pass.
pub fn build_span(spec_count: usize) -> Span {
    info_span!("build", specs = spec_count)
}

/// Timing utility for operations.
pub struct Timer {
    start: std::time::Instant,
    operation: &'static str,
}

impl Timer {
    /// Start a new timer.
    pub fn start(operation: &'static str) -> Self {
        Self {
            start: std::time::Instant::now(),
            operation,
        }
    }

    /// Complete the timer and record duration.
    pub fn finish(self) {
        let duration = self.start.elapsed();
        tracing::debug!(
            operation = %self.operation,
            duration_ms = %duration.as_millis(),
            "operation completed"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::EnvFilter;

    fn with_subscriber<F>(f: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let subscriber = tracing_subscriber::fmt()
            .with_test_writer()
            .with_env_filter(EnvFilter::new("trace"))
            .finish();

        tracing::subscriber::with_default(subscriber, f);
    }

    #[test]
    fn test_span_nesting() {
        with_subscriber(|| {
            let build = build_span(2);
            let _build = build.enter();

            let render = render_span("spec/a-v1.md");
            let _render = render.enter();

            tracing::info!("nested operation");
        });
    }

    #[test]
    fn test_timer_finishes_inside_span() {
        with_subscriber(|| {
            let span = watch_span("change", "spec/a-v1.md");
            let _entered = span.enter();

            let timer = Timer::start("render");
            timer.finish();
        });
    }
}
