//! HS256 bearer tokens carrying the user id.

use std::fmt;

use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

pub const DEFAULT_TOKEN_TTL_SECS: u64 = 24 * 60 * 60;
const MIN_SECRET_LEN: usize = 16;

/// Token settings.
#[derive(Clone, Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AuthConfig {
    /// HMAC key, at least 16 bytes.
    pub jwt_secret: SecretString,
    pub token_ttl_secs: u64,
    /// Created on startup when no user exists yet.
    pub bootstrap_admin: Option<BootstrapAdmin>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: SecretString::from(String::new()),
            token_ttl_secs: DEFAULT_TOKEN_TTL_SECS,
            bootstrap_admin: None,
        }
    }
}

impl Serialize for AuthConfig {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;

        let mut s = serializer.serialize_struct("AuthConfig", 3)?;
        s.serialize_field("jwt_secret", "<redacted>")?;
        s.serialize_field("token_ttl_secs", &self.token_ttl_secs)?;
        s.serialize_field("bootstrap_admin", &self.bootstrap_admin)?;
        s.end()
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BootstrapAdmin {
    pub email: String,
    pub password: SecretString,
}

impl Serialize for BootstrapAdmin {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;

        let mut s = serializer.serialize_struct("BootstrapAdmin", 2)?;
        s.serialize_field("email", &self.email)?;
        s.serialize_field("password", "<redacted>")?;
        s.end()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("jwt secret must be at least {MIN_SECRET_LEN} bytes")]
    WeakSecret,
    #[error("token rejected: {0}")]
    Rejected(#[source] jsonwebtoken::errors::Error),
    #[error("token subject is not a user id")]
    BadSubject,
    #[error("token encoding failed: {0}")]
    Encode(#[source] jsonwebtoken::errors::Error),
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    iat: i64,
    exp: i64,
}

/// Issues and verifies tokens. Cheap to clone.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl_secs: i64,
}

impl fmt::Debug for TokenService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenService")
            .field("ttl_secs", &self.ttl_secs)
            .finish_non_exhaustive()
    }
}

impl TokenService {
    /// # Errors
    ///
    /// Returns [`TokenError::WeakSecret`] for a missing or short secret.
    pub fn new(config: &AuthConfig) -> Result<Self, TokenError> {
        let secret = config.jwt_secret.expose_secret().as_bytes();
        if secret.len() < MIN_SECRET_LEN {
            return Err(TokenError::WeakSecret);
        }
        Ok(Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl_secs: i64::try_from(config.token_ttl_secs).unwrap_or(i64::MAX),
        })
    }

    /// # Errors
    ///
    /// Returns [`TokenError::Encode`] if signing fails.
    pub fn issue(&self, user_id: i64) -> Result<String, TokenError> {
        let iat = Utc::now().timestamp();
        let claims = Claims {
            sub: user_id.to_string(),
            iat,
            exp: iat.saturating_add(self.ttl_secs),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding).map_err(TokenError::Encode)
    }

    /// The user id of a valid, unexpired token.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::Rejected`] for a bad signature, malformed or
    /// expired token, [`TokenError::BadSubject`] for a non-numeric subject.
    pub fn verify(&self, token: &str) -> Result<i64, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        let data = decode::<Claims>(token, &self.decoding, &validation).map_err(TokenError::Rejected)?;
        data.claims.sub.parse().map_err(|_| TokenError::BadSubject)
    }
}
