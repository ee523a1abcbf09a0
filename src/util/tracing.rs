use tracing::dispatcher::DefaultGuard;
use tracing::subscriber;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{EnvFilter, fmt};
use weblogs_env_vars::var;

/// Initializes the `tracing` logging framework.
///
/// Output is filtered by the
/// [`RUST_LOG`](tracing_subscriber::filter::EnvFilter) environment variable
/// and defaults to `INFO`. Setting `LOG_FORMAT=json` switches to one JSON
/// object per line for log collectors.
pub fn init() {
    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();

    let json = matches!(var("LOG_FORMAT"), Ok(Some(format)) if format == "json");
    if json {
        fmt().json().with_env_filter(env_filter).init();
    } else {
        fmt().compact().with_env_filter(env_filter).init();
    }
}

/// Enables tracing output for the current test.
///
/// Output stops once the returned guard is dropped.
pub fn init_for_test() -> DefaultGuard {
    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::DEBUG.into())
        .from_env_lossy();

    let subscriber = fmt()
        .compact()
        .with_env_filter(env_filter)
        .with_test_writer()
        .finish();

    subscriber::set_default(subscriber)
}
