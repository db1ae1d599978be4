/// Authentication Routes
///
/// Self-registration and credential login. Both are public; everything
/// else sits behind the JWT middleware.

use actix_web::{web, HttpResponse};

use crate::error::{AppError, ErrorContext};
use crate::models::{LoginRequest, SignupRequest, SignupResponse};
use crate::startup::AppState;

/// POST /signup
///
/// Register a user and issue its first token pair.
///
/// # Errors
/// - 400: Validation errors (names, email, phone, password, role)
/// - 409: Email or phone already registered
/// - 503: User store unavailable or timed out
pub async fn signup(
    form: web::Json<SignupRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("user_signup");

    let user = state
        .auth
        .signup(form.into_inner())
        .await
        .map_err(|e| context.fail(e))?;

    tracing::info!(
        request_id = %context.request_id,
        user_id = %user.user_id,
        role = %user.role,
        "User registered successfully"
    );

    Ok(HttpResponse::Ok().json(SignupResponse {
        inserted_id: user.user_id,
    }))
}

/// POST /login
///
/// Verify credentials, rotate the stored token pair and return the user
/// with its fresh tokens.
///
/// # Errors
/// - 400: Malformed email
/// - 401: Unknown email or wrong password, indistinguishable
/// - 503: User store unavailable or timed out
pub async fn login(
    form: web::Json<LoginRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("user_login");

    let user = state
        .auth
        .login(form.into_inner())
        .await
        .map_err(|e| context.fail(e))?;

    tracing::info!(
        request_id = %context.request_id,
        user_id = %user.user_id,
        "User logged in successfully"
    );

    Ok(HttpResponse::Ok().json(user))
}
