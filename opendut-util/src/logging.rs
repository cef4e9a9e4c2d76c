use std::str::FromStr;

use tracing_subscriber::filter::{Directive, EnvFilter, LevelFilter};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

pub const LOG_FILTER_ENV_VAR: &str = "OPENDUT_LOG";

/// The netlink message parsers warn about every attribute layout they do not fully know,
/// which happens for each interface in a link dump on recent kernels.
const NETLINK_PACKET_DIRECTIVE: &str = "netlink_packet_route=error";

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Unable to initialize tracing: {source}")]
    TracingFilterFromEnv { #[from] source: tracing_subscriber::filter::FromEnvError },
    #[error("Unable to initialize tracing: {source}")]
    TracingFilterParse { #[from] source: tracing_subscriber::filter::ParseError },
    #[error("Unable to set initialize tracing: {source}")]
    TracingInit { #[from] source: tracing_subscriber::util::TryInitError },
}

/// Installs the global subscriber, logging compactly to stdout.
///
/// Defaults to level INFO. The filter can be overridden with directives in the
/// environment variable [`LOG_FILTER_ENV_VAR`], e.g. `OPENDUT_LOG=debug`.
pub fn initialize() -> Result<(), Error> {

    let tracing_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .with_env_var(LOG_FILTER_ENV_VAR)
        .from_env()?;
    let tracing_filter = silence_libraries(tracing_filter)?;

    let logging_layer = tracing_subscriber::fmt::layer()
        .compact();

    tracing_subscriber::registry()
        .with(tracing_filter)
        .with(logging_layer)
        .try_init()?;

    Ok(())
}

fn silence_libraries(tracing_filter: EnvFilter) -> Result<EnvFilter, Error> {
    let tracing_filter = tracing_filter
        .add_directive(Directive::from_str(NETLINK_PACKET_DIRECTIVE)?);
    Ok(tracing_filter)
}
