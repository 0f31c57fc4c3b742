use std::time::Instant;

use anyhow::Result;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::{FmtSpan, Writer};
use tracing_subscriber::fmt::time::FormatTime;

struct SinceStart(Instant);

impl FormatTime for SinceStart {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        let elapsed = self.0.elapsed();
        write!(w, "{:.5}s", elapsed.as_secs_f64())
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum LoggingLevel {
    #[default]
    Silent,
    Verbose,
    Traces,
}

impl From<u8> for LoggingLevel {
    fn from(count: u8) -> Self {
        match count {
            0 => LoggingLevel::Silent,
            1 => LoggingLevel::Verbose,
            2.. => LoggingLevel::Traces,
        }
    }
}

impl LoggingLevel {
    fn filters(self) -> (LevelFilter, FmtSpan) {
        match self {
            LoggingLevel::Silent => (LevelFilter::WARN, FmtSpan::NONE),
            LoggingLevel::Verbose => (LevelFilter::DEBUG, FmtSpan::NONE),
            LoggingLevel::Traces => (LevelFilter::DEBUG, FmtSpan::CLOSE | FmtSpan::ENTER),
        }
    }
}

/// Installs the global subscriber on stderr. `RUST_LOG` directives refine the level.
pub fn setup_logging(level: LoggingLevel) -> Result<()> {
    let timer = SinceStart(Instant::now());
    let (log_level, span_events) = level.filters();

    let filter = EnvFilter::builder()
        .with_default_directive(log_level.into())
        .from_env_lossy();

    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .compact()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_thread_names(false)
        .with_thread_ids(false)
        .with_target(true)
        .with_ansi(true)
        .with_timer(timer)
        .with_span_events(span_events)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_count_maps_to_level() {
        assert_eq!(LoggingLevel::from(0), LoggingLevel::Silent);
        assert_eq!(LoggingLevel::from(1), LoggingLevel::Verbose);
        assert_eq!(LoggingLevel::from(2), LoggingLevel::Traces);
        assert_eq!(LoggingLevel::from(7), LoggingLevel::Traces);
    }

    #[test]
    fn test_only_traces_report_spans() {
        assert_eq!(LoggingLevel::Silent.filters().0, LevelFilter::WARN);
        assert_eq!(LoggingLevel::Verbose.filters().1, FmtSpan::NONE);
        assert_eq!(LoggingLevel::Traces.filters().1, FmtSpan::CLOSE | FmtSpan::ENTER);
    }
}
