/// JWT Token Issuance and Validation
///
/// Tokens are HS256-signed with one process-wide secret. The secret is read
/// once at startup; rotating it invalidates every outstanding token.

use chrono::Utc;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, decode_header, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::auth::claims::{Claims, Identity, RefreshClaims};
use crate::configuration::JwtSettings;
use crate::error::{AppError, ConfigError, TokenError};

const ALGORITHM: Algorithm = Algorithm::HS256;
const SECONDS_PER_HOUR: i64 = 3_600;

/// Access and refresh token, always minted together
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Mints signed token pairs
#[derive(Clone)]
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    access_ttl_seconds: i64,
    refresh_ttl_seconds: i64,
}

impl TokenIssuer {
    /// # Errors
    /// Refuses an empty secret, a non-positive access lifetime, or a refresh
    /// lifetime that does not outlast the access lifetime.
    pub fn new(
        secret: &str,
        access_ttl_seconds: i64,
        refresh_ttl_seconds: i64,
    ) -> Result<Self, ConfigError> {
        if secret.is_empty() {
            return Err(ConfigError::MissingSecret);
        }
        if access_ttl_seconds <= 0 {
            return Err(ConfigError::InvalidValue(
                "access token lifetime must be positive".to_string(),
            ));
        }
        if refresh_ttl_seconds <= access_ttl_seconds {
            return Err(ConfigError::InvalidValue(
                "refresh token lifetime must exceed access token lifetime".to_string(),
            ));
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            access_ttl_seconds,
            refresh_ttl_seconds,
        })
    }

    pub fn from_settings(settings: &JwtSettings) -> Result<Self, ConfigError> {
        Self::new(
            settings.secret.expose_secret(),
            settings.access_token_ttl_hours * SECONDS_PER_HOUR,
            settings.refresh_token_ttl_hours * SECONDS_PER_HOUR,
        )
    }

    /// Issue an access/refresh pair for `identity`.
    ///
    /// # Errors
    /// A signing failure fails the whole pair; no partial pair is returned.
    pub fn issue(&self, identity: &Identity) -> Result<TokenPair, AppError> {
        self.issue_at(identity, Utc::now().timestamp())
    }

    fn issue_at(&self, identity: &Identity, now: i64) -> Result<TokenPair, AppError> {
        let header = Header::new(ALGORITHM);

        let access_token = encode(
            &header,
            &Claims::new(identity, now, self.access_ttl_seconds),
            &self.encoding_key,
        )
        .map_err(|e| AppError::Internal(format!("Access token signing failed: {}", e)))?;

        let refresh_token = encode(
            &header,
            &RefreshClaims::new(now, self.refresh_ttl_seconds),
            &self.encoding_key,
        )
        .map_err(|e| AppError::Internal(format!("Refresh token signing failed: {}", e)))?;

        Ok(TokenPair {
            access_token,
            refresh_token,
        })
    }
}

/// Payloads with an expiry the validator checks after decoding
pub(crate) trait Expiring {
    fn expires_at(&self) -> i64;
}

impl Expiring for Claims {
    fn expires_at(&self) -> i64 {
        self.expires_at
    }
}

impl Expiring for RefreshClaims {
    fn expires_at(&self) -> i64 {
        self.expires_at
    }
}

/// Verifies signed tokens and returns their claims
#[derive(Clone)]
pub struct TokenValidator {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenValidator {
    pub fn new(secret: &str) -> Result<Self, ConfigError> {
        if secret.is_empty() {
            return Err(ConfigError::MissingSecret);
        }

        // Only HS256 is accepted. Expiry is checked here after the claim
        // shape, so the library's own exp check is off.
        let mut validation = Validation::new(ALGORITHM);
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        Ok(Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        })
    }

    pub fn from_settings(settings: &JwtSettings) -> Result<Self, ConfigError> {
        Self::new(settings.secret.expose_secret())
    }

    /// Validate an access token.
    ///
    /// Checks run in order: envelope, signature and algorithm, claim shape,
    /// expiry. The first failing check decides the error.
    pub fn validate(&self, token: &str) -> Result<Claims, TokenError> {
        self.validate_at(token, Utc::now().timestamp())
    }

    fn validate_at(&self, token: &str, now: i64) -> Result<Claims, TokenError> {
        self.decode_as::<Claims>(token, now)
    }

    pub(crate) fn decode_as<T>(&self, token: &str, now: i64) -> Result<T, TokenError>
    where
        T: DeserializeOwned + Expiring,
    {
        if token.split('.').count() != 3 {
            return Err(TokenError::Malformed);
        }
        decode_header(token).map_err(|_| TokenError::Malformed)?;

        let claims = decode::<T>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| classify(e.kind()))?;

        if claims.expires_at() <= now {
            return Err(TokenError::Expired);
        }

        Ok(claims)
    }
}

fn classify(kind: &ErrorKind) -> TokenError {
    match kind {
        ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => TokenError::BadSignature,
        ErrorKind::Json(_) | ErrorKind::MissingRequiredClaim(_) => TokenError::BadClaims,
        ErrorKind::ExpiredSignature => TokenError::Expired,
        _ => TokenError::Malformed,
    }
}
