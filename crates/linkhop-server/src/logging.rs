//! Structured logging setup.
//!
//! Installs a global `tracing-subscriber` registry from [`LoggingSettings`].
//! `RUST_LOG`, when set, replaces the configured level entirely, so
//! per-crate directives such as `linkhop_domain=trace` work as usual.
//!
//! # Log Format
//!
//! With `logging.json` enabled every event is one JSON object per line:
//!
//! ```json
//! {"timestamp":"...","level":"WARN","fields":{"message":"skipping title after link fetch failure","title":"Cat"},"target":"linkhop_domain::search::expand"}
//! ```

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::LoggingSettings;

/// Builds the event filter: `RUST_LOG` if set and valid, else `level`.
pub fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.to_lowercase()))
}

/// Installs the global subscriber.
///
/// Returns `false` when a global subscriber was already installed, in which
/// case the existing one stays in place.
pub fn init_logging(settings: &LoggingSettings) -> bool {
    let filter = env_filter(&settings.level);

    let installed = if settings.json {
        let subscriber = tracing_subscriber::registry().with(filter).with(
            fmt::layer()
                .json()
                .with_current_span(true)
                .with_target(true)
                .with_file(false)
                .with_line_number(false),
        );
        tracing::subscriber::set_global_default(subscriber).is_ok()
    } else {
        let subscriber = tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().pretty().with_target(true));
        tracing::subscriber::set_global_default(subscriber).is_ok()
    };

    if installed {
        tracing::debug!(level = %settings.level, json = settings.json, "logging initialized");
    }
    installed
}

/// A JSON subscriber writing to `writer`, for capturing logs in tests.
pub fn json_subscriber<W>(writer: W, level: &str) -> impl tracing::Subscriber + Send + Sync
where
    W: for<'writer> fmt::MakeWriter<'writer> + Send + Sync + 'static,
{
    tracing_subscriber::registry().with(EnvFilter::new(level)).with(
        fmt::layer()
            .json()
            .with_writer(writer)
            .with_target(true)
            .with_current_span(true),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use linkhop_domain::{PathFinder, SearchLimits};
    use linkhop_storage::MemoryLinkGraph;

    /// A writer that captures output to a shared buffer.
    #[derive(Clone, Default)]
    struct CaptureWriter {
        buffer: Arc<Mutex<Vec<u8>>>,
    }

    impl CaptureWriter {
        fn lines(&self) -> Vec<serde_json::Value> {
            let buffer = self.buffer.lock().unwrap();
            String::from_utf8_lossy(&buffer)
                .lines()
                .filter(|line| !line.is_empty())
                .map(|line| serde_json::from_str(line).unwrap())
                .collect()
        }
    }

    impl std::io::Write for CaptureWriter {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.buffer.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl<'a> fmt::MakeWriter<'a> for CaptureWriter {
        type Writer = CaptureWriter;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    fn limits() -> SearchLimits {
        SearchLimits::new(4, 100, std::time::Duration::from_secs(5))
    }

    #[test]
    fn test_fetch_failures_are_logged_as_json_warnings() {
        let graph = MemoryLinkGraph::new();
        graph.add_links("A", ["B"]).unwrap();
        graph.fail_title("B", "upstream returned 503");
        let finder = PathFinder::new(Arc::new(graph));

        let writer = CaptureWriter::default();
        let subscriber = json_subscriber(writer.clone(), "warn");

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .unwrap();
        tracing::subscriber::with_default(subscriber, || {
            runtime
                .block_on(finder.search_with_limits("A", "C", &limits()))
                .unwrap();
        });

        let lines = writer.lines();
        let warning = lines
            .iter()
            .find(|line| line["fields"]["message"] == "skipping title after link fetch failure")
            .expect("fetch failure should be logged");
        assert_eq!(warning["level"], "WARN");
        assert_eq!(warning["fields"]["title"], "B");
        assert!(warning["target"]
            .as_str()
            .unwrap()
            .starts_with("linkhop_domain"));
    }

    #[test]
    fn test_level_filters_debug_events() {
        let graph = MemoryLinkGraph::new();
        graph.add_links("A", ["B"]).unwrap();
        let finder = PathFinder::new(Arc::new(graph));

        let writer = CaptureWriter::default();
        let subscriber = json_subscriber(writer.clone(), "info");

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .unwrap();
        tracing::subscriber::with_default(subscriber, || {
            runtime
                .block_on(finder.search_with_limits("A", "B", &limits()))
                .unwrap();
        });

        assert!(writer.lines().is_empty(), "search summaries are debug-only");
    }

    #[test]
    fn test_env_filter_uses_configured_level() {
        if std::env::var_os("RUST_LOG").is_some() {
            return;
        }
        let filter = env_filter("DEBUG");
        assert_eq!(filter.to_string(), "debug");
    }
}
