use std::sync::Once;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

static INIT: Once = Once::new();

/// Initialize logging with environment-based configuration
///
/// Safe to call more than once; only the first call installs the subscriber.
pub fn init() {
    INIT.call_once(|| {
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
            )
            .finish();

        // A test harness may have installed its own subscriber already
        let _ = tracing::subscriber::set_global_default(subscriber);
    });
}
