use tracing::Subscriber;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset. User-facing diagnostics go to
/// stdout, so nothing below `warn` reaches stderr by default.
pub const DEFAULT_LOG_FILTER: &str = "warn";

pub fn log_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
}

/// Formatted subscriber writing to `writer`. Colour codes only when `ansi`.
pub fn log_subscriber<W>(filter: EnvFilter, writer: W, ansi: bool) -> impl Subscriber + Send + Sync + 'static
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(ansi)
        .with_writer(writer)
        .finish()
}


#[cfg(test)]
mod tests {
    use super::capture::with_default_logging;

    #[test]
    fn default_filter_keeps_warnings_without_colour() {
        let ((), log) = with_default_logging(|| {
            tracing::info!("quiet");
            tracing::warn!("loud");
        });
        assert!(log.contains("loud"));
        assert!(!log.contains("quiet"));
        assert!(!log.contains('\x1b'), "{:?}", log);
    }
}
