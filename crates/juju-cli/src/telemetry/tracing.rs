use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

/// Environment variable holding the filter directives.
pub(super) const FILTER_ENV: &str = "RUST_LOG";

/// Filter used when `RUST_LOG` is unset or empty.
const DEFAULT_FILTER: &str = "info";

/// Installs the fmt subscriber and returns the directives in effect.
///
/// ```bash
/// RUST_LOG=debug juju
/// RUST_LOG=juju_server=trace,tower_http=debug juju
/// ```
pub(super) fn init_tracing(directives: Option<&str>) -> anyhow::Result<String> {
    let (env_filter, directives) = create_env_filter(directives)?;

    tracing_subscriber::registry()
        .with(create_fmt_layer())
        .with(env_filter)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {e}"))?;

    Ok(directives)
}

fn create_env_filter(directives: Option<&str>) -> anyhow::Result<(EnvFilter, String)> {
    let directives = directives
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .unwrap_or(DEFAULT_FILTER);

    let env_filter = EnvFilter::try_new(directives)
        .map_err(|e| anyhow::anyhow!("Invalid {FILTER_ENV} directives {directives:?}: {e}"))?;

    Ok((env_filter, directives.to_owned()))
}

fn create_fmt_layer() -> fmt::Layer<tracing_subscriber::Registry> {
    fmt::layer()
        .with_target(true)
        .with_thread_ids(false)
        .with_level(true)
        .with_ansi(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_info() -> anyhow::Result<()> {
        let (_, directives) = create_env_filter(None)?;
        assert_eq!(directives, "info");

        let (_, directives) = create_env_filter(Some("  "))?;
        assert_eq!(directives, "info");
        Ok(())
    }

    #[test]
    fn accepts_per_target_directives() -> anyhow::Result<()> {
        let (_, directives) = create_env_filter(Some("juju_server=debug,info"))?;
        assert_eq!(directives, "juju_server=debug,info");
        Ok(())
    }

    #[test]
    fn rejects_unknown_levels() {
        assert!(create_env_filter(Some("juju_server=loudest")).is_err());
    }
}
