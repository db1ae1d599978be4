use authkeeper::configuration::get_configuration;
use authkeeper::startup::{run, AppState};
use authkeeper::store::PgUserStore;
use authkeeper::telemetry::init_telemetry;
use secrecy::ExposeSecret;
use sqlx::postgres::PgPoolOptions;
use std::net::TcpListener;
use std::sync::Arc;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    init_telemetry();

    tracing::info!("Starting application");

    let configuration = match get_configuration() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Failed to read configuration");
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "Configuration error",
            ));
        }
    };

    if let Err(e) = configuration.validate() {
        tracing::error!(error = %e, "Refusing to start with invalid configuration");
        return Err(std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string()));
    }
    tracing::info!("Configuration loaded successfully");

    let store_timeout = configuration.application.store_timeout();

    tracing::info!("Attempting to connect to database");
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .acquire_timeout(store_timeout)
        .connect(configuration.database.connection_string().expose_secret())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to create connection pool");
            std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                "Database connection error",
            )
        })?;

    let store = PgUserStore::new(pool);
    store.migrate().await.map_err(|e| {
        tracing::error!(error = %e, "Failed to run database migrations");
        std::io::Error::new(std::io::ErrorKind::Other, "Migration error")
    })?;
    tracing::info!("Database ready");

    let state = AppState::new(
        Arc::new(store),
        &configuration.jwt,
        &configuration.password,
        store_timeout,
    )
    .map_err(|e| {
        tracing::error!(error = %e, "Failed to initialise auth components");
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string())
    })?;

    let address = configuration.application.address();
    let listener = TcpListener::bind(&address)?;
    tracing::info!(address = %address, "Server listening");

    run(listener, state)?.await
}
