use tracing::Subscriber;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

/// Build the JSON subscriber. `RUST_LOG` wins over `default_filter`.
pub fn get_subscriber(default_filter: &str) -> impl Subscriber + Send + Sync {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let formatting_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stdout)
        .with_target(true)
        .json();

    Registry::default().with(env_filter).with(formatting_layer)
}

/// Structured JSON logging for the whole process. Call once, from `main`.
pub fn init_telemetry() {
    get_subscriber("info").init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subscriber_emits_without_global_install() {
        let subscriber = get_subscriber("debug");

        tracing::subscriber::with_default(subscriber, || {
            tracing::info!(user_id = "u1", "telemetry smoke event");
        });
    }
}
