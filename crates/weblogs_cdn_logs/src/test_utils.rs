use tracing::dispatcher::DefaultGuard;
use tracing::level_filters::LevelFilter;
use tracing::subscriber;
use tracing_subscriber::fmt;

/// Routes `tracing` output of the current test, including skipped header
/// lines at `DEBUG` level, to the test writer.
///
/// Output stops once the returned guard is dropped.
pub fn enable_tracing_output() -> DefaultGuard {
    let subscriber = fmt()
        .compact()
        .with_max_level(LevelFilter::DEBUG)
        .with_test_writer()
        .finish();

    subscriber::set_default(subscriber)
}
