use actix_web::dev::Server;
use actix_web::{web, App, HttpServer};
use std::net::TcpListener;
use std::sync::Arc;
use std::time::Duration;

use crate::auth::{AuthService, PasswordHasher, TokenIssuer, TokenValidator};
use crate::configuration::{JwtSettings, PasswordSettings};
use crate::error::{AppError, ValidationError};
use crate::logger::LoggerMiddleware;
use crate::middleware::JwtMiddleware;
use crate::routes::{get_me, get_user, get_users, health_check, login, signup};
use crate::store::{BoundedStore, UserStore};

/// Shared request state
pub struct AppState {
    pub store: Arc<dyn UserStore>,
    pub auth: AuthService,
    pub validator: Arc<TokenValidator>,
}

impl AppState {
    /// Wire the auth components around `store`. Every store call made on
    /// behalf of a request is bounded by `store_timeout`.
    pub fn new(
        store: Arc<dyn UserStore>,
        jwt: &JwtSettings,
        password: &PasswordSettings,
        store_timeout: Duration,
    ) -> Result<Self, AppError> {
        let store: Arc<dyn UserStore> = Arc::new(BoundedStore::new(store, store_timeout));
        let issuer = Arc::new(TokenIssuer::from_settings(jwt)?);
        let validator = Arc::new(TokenValidator::from_settings(jwt)?);
        let hasher = PasswordHasher::new(password.hash_cost)?;

        Ok(Self {
            auth: AuthService::new(store.clone(), issuer, hasher),
            store,
            validator,
        })
    }
}

pub fn run(listener: TcpListener, state: AppState) -> Result<Server, std::io::Error> {
    let validator = state.validator.clone();
    let state = web::Data::new(state);

    let server = HttpServer::new(move || {
        let json_config = web::JsonConfig::default().error_handler(|err, _req| {
            AppError::from(ValidationError::MalformedBody(err.to_string())).into()
        });

        App::new()
            .wrap(LoggerMiddleware)
            .app_data(state.clone())
            .app_data(json_config)
            // Public routes
            .route("/health_check", web::get().to(health_check))
            .route("/signup", web::post().to(signup))
            .route("/login", web::post().to(login))
            // Protected routes
            .service(
                web::resource("/me")
                    .wrap(JwtMiddleware::new(validator.clone()))
                    .route(web::get().to(get_me)),
            )
            .service(
                web::resource("/users")
                    .wrap(JwtMiddleware::new(validator.clone()))
                    .route(web::get().to(get_users)),
            )
            .service(
                web::resource("/user/{user_id}")
                    .wrap(JwtMiddleware::new(validator.clone()))
                    .route(web::get().to(get_user)),
            )
    })
    .listen(listener)?
    .run();

    Ok(server)
}
