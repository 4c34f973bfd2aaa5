//! Signed credentials (JWT, HS256).
//!
//! Two kinds are issued on login:
//! - access credential, presented on every operation (default 24h)
//! - refresh credential, exchanged for a fresh pair (default 7 days)

use crate::error::{AuthError, AuthResult};
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use paybank_core::{AccountId, Principal};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Token settings, `[auth]` section of the config file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenConfig {
    /// HMAC secret
    #[serde(default = "default_secret")]
    pub secret: String,

    #[serde(default = "default_access_ttl")]
    pub access_ttl_secs: u64,

    #[serde(default = "default_refresh_ttl")]
    pub refresh_ttl_secs: u64,
}

/// Built-in secret used when none is configured; fine for local runs only
pub const DEV_SECRET: &str = "paybank-dev-secret";

fn default_secret() -> String {
    DEV_SECRET.to_string()
}

fn default_access_ttl() -> u64 {
    24 * 60 * 60
}

fn default_refresh_ttl() -> u64 {
    7 * 24 * 60 * 60
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            secret: default_secret(),
            access_ttl_secs: default_access_ttl(),
            refresh_ttl_secs: default_refresh_ttl(),
        }
    }
}

impl TokenConfig {
    /// Signing with the built-in secret lets anyone mint credentials
    pub fn uses_dev_secret(&self) -> bool {
        self.secret == DEV_SECRET
    }

    /// Lifetime of `kind` in seconds, as a claim offset
    pub fn ttl_secs(&self, kind: TokenKind) -> AuthResult<i64> {
        let ttl = match kind {
            TokenKind::Access => self.access_ttl_secs,
            TokenKind::Refresh => self.refresh_ttl_secs,
        };
        i64::try_from(ttl).map_err(|_| {
            AuthError::InvalidConfig(format!("{kind} lifetime {ttl}s out of range"))
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Access => write!(f, "access"),
            Self::Refresh => write!(f, "refresh"),
        }
    }
}

/// Claims carried by both credential kinds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: AccountId,
    pub phone_number: String,
    pub token_type: TokenKind,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn principal(&self) -> Principal {
        Principal::new(self.user_id, &self.phone_number)
    }
}

/// Result of a successful login or refresh
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    /// Access credential lifetime in seconds
    pub expires_in: u64,
}

/// Turns a bearer credential into a verified principal
pub trait IdentityVerifier: Send + Sync {
    fn verify(&self, credential: &str) -> AuthResult<Principal>;
}

/// Issues and verifies credentials with one shared secret
pub struct TokenService {
    config: TokenConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl fmt::Debug for TokenService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenService")
            .field("access_ttl_secs", &self.config.access_ttl_secs)
            .field("refresh_ttl_secs", &self.config.refresh_ttl_secs)
            .finish_non_exhaustive()
    }
}

impl TokenService {
    pub fn new(config: TokenConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());
        Self {
            config,
            encoding_key,
            decoding_key,
        }
    }

    pub fn config(&self) -> &TokenConfig {
        &self.config
    }

    /// Issue an access + refresh pair for `principal`
    pub fn issue_pair(&self, principal: &Principal) -> AuthResult<TokenPair> {
        let access_token = self.issue(principal, TokenKind::Access)?;
        let refresh_token = self.issue(principal, TokenKind::Refresh)?;

        Ok(TokenPair {
            access_token,
            refresh_token,
            token_type: "Bearer".to_string(),
            expires_in: self.config.access_ttl_secs,
        })
    }

    pub fn issue(&self, principal: &Principal, kind: TokenKind) -> AuthResult<String> {
        let ttl = self.config.ttl_secs(kind)?;
        self.issue_with_ttl(principal, kind, ttl)
    }

    fn issue_with_ttl(
        &self,
        principal: &Principal,
        kind: TokenKind,
        ttl_secs: i64,
    ) -> AuthResult<String> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            user_id: principal.account_id,
            phone_number: principal.phone_number.clone(),
            token_type: kind,
            iat: now,
            exp: now.saturating_add(ttl_secs),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AuthError::Signing(e.to_string()))
    }

    /// Decode and check signature, expiry and kind
    pub fn decode(&self, token: &str, expected: TokenKind) -> AuthResult<Claims> {
        let validation = Validation::new(Algorithm::HS256);
        let data = decode::<Claims>(token, &self.decoding_key, &validation)?;

        if data.claims.token_type != expected {
            return Err(AuthError::WrongTokenKind {
                expected,
                found: data.claims.token_type,
            });
        }
        Ok(data.claims)
    }

    /// Exchange a refresh credential for a new pair
    pub fn refresh(&self, refresh_token: &str) -> AuthResult<(Principal, TokenPair)> {
        let claims = self.decode(refresh_token, TokenKind::Refresh)?;
        let principal = claims.principal();
        let pair = self.issue_pair(&principal)?;
        tracing::debug!(account_id = %principal.account_id, "credential refreshed");
        Ok((principal, pair))
    }
}

impl IdentityVerifier for TokenService {
    fn verify(&self, credential: &str) -> AuthResult<Principal> {
        let token = credential
            .strip_prefix("Bearer ")
            .unwrap_or(credential)
            .trim();
        Ok(self.decode(token, TokenKind::Access)?.principal())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn service() -> TokenService {
        TokenService::new(TokenConfig {
            secret: "unit-test-secret".to_string(),
            ..TokenConfig::default()
        })
    }

    fn principal() -> Principal {
        Principal::new(Uuid::new_v4(), "0812345678")
    }

    #[test]
    fn test_access_token_verifies_to_principal() {
        let svc = service();
        let who = principal();
        let pair = svc.issue_pair(&who).unwrap();

        assert_eq!(pair.token_type, "Bearer");
        assert_eq!(pair.expires_in, 86_400);
        assert_eq!(svc.verify(&pair.access_token).unwrap(), who);
        assert_eq!(
            svc.verify(&format!("Bearer {}", pair.access_token)).unwrap(),
            who
        );
    }

    #[test]
    fn test_refresh_token_is_not_an_access_token() {
        let svc = service();
        let pair = svc.issue_pair(&principal()).unwrap();

        let err = svc.verify(&pair.refresh_token).unwrap_err();
        assert!(matches!(
            err,
            AuthError::WrongTokenKind {
                expected: TokenKind::Access,
                found: TokenKind::Refresh
            }
        ));

        let err = svc.refresh(&pair.access_token).unwrap_err();
        assert!(err.is_unauthenticated());
    }

    #[test]
    fn test_refresh_issues_new_pair() {
        let svc = service();
        let who = principal();
        let pair = svc.issue_pair(&who).unwrap();

        let (refreshed_for, new_pair) = svc.refresh(&pair.refresh_token).unwrap();
        assert_eq!(refreshed_for, who);
        assert_eq!(svc.verify(&new_pair.access_token).unwrap(), who);
    }

    #[test]
    fn test_expired_token_rejected() {
        let svc = service();
        // past the default 60s leeway
        let token = svc
            .issue_with_ttl(&principal(), TokenKind::Access, -300)
            .unwrap();

        assert!(matches!(svc.verify(&token), Err(AuthError::Expired)));
    }

    #[test]
    fn test_wrong_secret_and_garbage_rejected() {
        let svc = service();
        let other = TokenService::new(TokenConfig {
            secret: "another-secret".to_string(),
            ..TokenConfig::default()
        });
        let token = other.issue(&principal(), TokenKind::Access).unwrap();

        assert!(matches!(svc.verify(&token), Err(AuthError::InvalidToken(_))));
        assert!(matches!(
            svc.verify("not-a-jwt"),
            Err(AuthError::InvalidToken(_))
        ));
    }

    #[test]
    fn test_dev_secret_detected() {
        assert!(TokenConfig::default().uses_dev_secret());
        assert!(!service().config().uses_dev_secret());
    }

    #[test]
    fn test_out_of_range_lifetime_rejected() {
        let svc = TokenService::new(TokenConfig {
            secret: "unit-test-secret".to_string(),
            access_ttl_secs: u64::MAX,
            ..TokenConfig::default()
        });

        assert!(matches!(
            svc.issue(&principal(), TokenKind::Access),
            Err(AuthError::InvalidConfig(_))
        ));
        assert!(svc.issue(&principal(), TokenKind::Refresh).is_ok());
    }
}
