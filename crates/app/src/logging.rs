use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Environment variable holding the log filter, e.g. `debug` or `services=trace`.
pub const LOG_ENV: &str = "VOCAB_LOG";

/// Install the global subscriber. Logs go to stderr so they never interleave
/// with the card prompts on stdout.
pub fn init_tracing() {
    let filter = std::env::var(LOG_ENV).unwrap_or_else(|_| "warn".to_owned());
    let env_filter = EnvFilter::try_new(&filter).unwrap_or_else(|_| EnvFilter::new("warn"));
    let stderr_layer = fmt::layer().with_target(true).with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .init();
}
