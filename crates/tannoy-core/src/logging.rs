use tracing_subscriber::{fmt, EnvFilter};

/// Install the global tracing subscriber, honoring `RUST_LOG`. Later calls
/// are no-ops.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_env_filter(filter).try_init();
}

#[cfg(test)]
mod tests {
    use super::init_logging;

    #[test]
    fn init_can_be_called_repeatedly() {
        init_logging();
        init_logging();
        tracing::debug!("logging initialized");
    }
}
