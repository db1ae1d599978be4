/// Request-time authorization
///
/// Pure decisions over the identity the JWT middleware attached to the
/// request. A failure is always the same opaque `AuthError::Forbidden`.

use crate::auth::{Claims, Role};
use crate::error::AuthError;

/// Authenticated principal attached to a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext {
    pub user_id: String,
    pub email: String,
    pub role: Role,
}

impl From<&Claims> for AuthContext {
    fn from(claims: &Claims) -> Self {
        Self {
            user_id: claims.user_id.clone(),
            email: claims.email.clone(),
            role: claims.role,
        }
    }
}

/// Succeeds iff the principal holds exactly `role`.
pub fn require_role(context: &AuthContext, role: Role) -> Result<(), AuthError> {
    if context.role == role {
        Ok(())
    } else {
        Err(AuthError::Forbidden)
    }
}

/// Succeeds iff the principal holds the privileged `role` or is the target.
pub fn require_self_or_role(
    context: &AuthContext,
    target_user_id: &str,
    role: Role,
) -> Result<(), AuthError> {
    if context.role == role || context.user_id == target_user_id {
        Ok(())
    } else {
        Err(AuthError::Forbidden)
    }
}
