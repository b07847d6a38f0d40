//! Staff sessions: HS256 access tokens plus opaque refresh tokens.
//!
//! Only the SHA-256 digest of a refresh token is persisted, so the
//! `user_sessions` table alone cannot be replayed against the API.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tnc_core::roles::Role;
use tnc_core::types::{DbId, Timestamp};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// User id.
    pub sub: DbId,
    pub role: String,
    pub exp: i64,
    pub iat: i64,
    pub jti: String,
}

impl Claims {
    /// `None` for a role name this build does not know.
    pub fn role(&self) -> Option<Role> {
        Role::from_name(&self.role)
    }
}

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub access_token_expiry_mins: i64,
    pub refresh_token_expiry_days: i64,
}

/// Everything minted at login or refresh.
#[derive(Debug)]
pub struct IssuedSession {
    pub access_token: String,
    /// Seconds until the access token expires.
    pub expires_in: i64,
    /// Handed to the client once.
    pub refresh_token: String,
    /// Persisted in place of the refresh token.
    pub refresh_token_hash: String,
    pub refresh_expires_at: Timestamp,
}

pub fn issue_session(
    user_id: DbId,
    role: Role,
    config: &JwtConfig,
) -> Result<IssuedSession, jsonwebtoken::errors::Error> {
    let now = Utc::now();
    let expires_in = config.access_token_expiry_mins * 60;
    let claims = Claims {
        sub: user_id,
        role: role.as_str().to_string(),
        exp: now.timestamp() + expires_in,
        iat: now.timestamp(),
        jti: Uuid::new_v4().to_string(),
    };
    let access_token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )?;

    // Two v4 uuids give 244 random bits.
    let refresh_token = format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple());
    let refresh_token_hash = hash_refresh_token(&refresh_token);

    Ok(IssuedSession {
        access_token,
        expires_in,
        refresh_token,
        refresh_token_hash,
        refresh_expires_at: now + Duration::days(config.refresh_token_expiry_days),
    })
}

/// Check signature and expiry, returning the claims.
pub fn validate_token(
    token: &str,
    config: &JwtConfig,
) -> Result<Claims, jsonwebtoken::errors::Error> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
}

pub fn hash_refresh_token(token: &str) -> String {
    format!("{:x}", Sha256::digest(token.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(secret: &str) -> JwtConfig {
        JwtConfig {
            secret: secret.to_string(),
            access_token_expiry_mins: 15,
            refresh_token_expiry_days: 7,
        }
    }

    #[test]
    fn issued_access_token_carries_role() {
        let cfg = config("unit-test-secret-with-enough-length");
        let session = issue_session(7, Role::Instructor, &cfg).unwrap();
        let claims = validate_token(&session.access_token, &cfg).unwrap();
        assert_eq!(claims.sub, 7);
        assert_eq!(claims.role(), Some(Role::Instructor));
        assert_eq!(claims.exp - claims.iat, session.expires_in);
        assert_eq!(session.expires_in, 15 * 60);
    }

    #[test]
    fn refresh_token_is_stored_as_digest() {
        let session = issue_session(1, Role::Viewer, &config("s")).unwrap();
        assert_eq!(session.refresh_token.len(), 64);
        assert_eq!(
            session.refresh_token_hash,
            hash_refresh_token(&session.refresh_token)
        );
        assert_ne!(session.refresh_token, session.refresh_token_hash);
        assert!(session.refresh_expires_at > Utc::now() + Duration::days(6));
    }

    #[test]
    fn expired_token_is_rejected() {
        let cfg = config("unit-test-secret-with-enough-length");
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: 1,
            role: "viewer".into(),
            exp: now - 600,
            iat: now - 1200,
            jti: Uuid::new_v4().to_string(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(cfg.secret.as_bytes()),
        )
        .unwrap();
        assert!(validate_token(&token, &cfg).is_err());
    }

    #[test]
    fn token_from_other_secret_is_rejected() {
        let session = issue_session(1, Role::Admin, &config("first-secret")).unwrap();
        assert!(validate_token(&session.access_token, &config("second-secret")).is_err());
    }
}
