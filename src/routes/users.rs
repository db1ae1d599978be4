/// User Routes
///
/// Both handlers run behind `JwtMiddleware`, which supplies the
/// `AuthContext` of the caller.

use actix_web::{web, HttpResponse};

use crate::auth::{require_role, require_self_or_role, AuthContext, Role};
use crate::error::{AppError, ErrorContext};
use crate::models::{PageQuery, Pagination};
use crate::startup::AppState;

/// GET /me
///
/// The caller's own record. Any authenticated role.
pub async fn get_me(
    auth: web::ReqData<AuthContext>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("get_me").with_user_id(auth.user_id.clone());

    let user = state
        .store
        .find_by_user_id(&auth.user_id)
        .await
        .map_err(|e| context.fail(e.into()))?
        .ok_or_else(|| context.fail(AppError::NotFound("user".to_string())))?;

    Ok(HttpResponse::Ok().json(user))
}

/// GET /users?recordPerPage=&page=
///
/// Paginated user listing. ADMIN only.
pub async fn get_users(
    auth: web::ReqData<AuthContext>,
    query: web::Query<PageQuery>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("list_users").with_user_id(auth.user_id.clone());

    require_role(&auth, Role::Admin).map_err(|e| context.fail(e.into()))?;

    let pagination = Pagination::from_query(&query);
    let page = state
        .store
        .list_users(pagination.offset(), pagination.limit())
        .await
        .map_err(|e| context.fail(e.into()))?;

    tracing::debug!(
        request_id = %context.request_id,
        page = pagination.page,
        record_per_page = pagination.record_per_page,
        total_count = page.total_count,
        "Listed users"
    );

    Ok(HttpResponse::Ok().json(page))
}

/// GET /user/{user_id}
///
/// A user may read their own record; ADMIN may read any.
pub async fn get_user(
    auth: web::ReqData<AuthContext>,
    path: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let user_id = path.into_inner();
    let context = ErrorContext::new("get_user").with_user_id(auth.user_id.clone());

    require_self_or_role(&auth, &user_id, Role::Admin).map_err(|e| context.fail(e.into()))?;

    let user = state
        .store
        .find_by_user_id(&user_id)
        .await
        .map_err(|e| context.fail(e.into()))?
        .ok_or_else(|| context.fail(AppError::NotFound("user".to_string())))?;

    Ok(HttpResponse::Ok().json(user))
}
