/// Authentication module
///
/// Password hashing, token issuance and validation, request-time
/// authorization, token persistence and the signup/login flow.

mod claims;
mod guard;
mod jwt;
mod password;
mod persist;
mod role;
mod service;

pub use claims::{Claims, Identity, RefreshClaims};
pub use guard::{require_role, require_self_or_role, AuthContext};
pub use jwt::{TokenIssuer, TokenPair, TokenValidator};
pub use password::{PasswordHasher, DEFAULT_HASH_COST};
pub use persist::persist_token_pair;
pub use role::Role;
pub use service::AuthService;
