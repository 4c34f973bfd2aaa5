//! Auth errors

use crate::token::TokenKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Credential expired")]
    Expired,

    #[error("Invalid credential: {0}")]
    InvalidToken(String),

    #[error("Expected {expected} credential, got {found}")]
    WrongTokenKind { expected: TokenKind, found: TokenKind },

    #[error("Invalid PIN: {0}")]
    InvalidPin(String),

    #[error("Failed to sign credential: {0}")]
    Signing(String),

    #[error("Invalid token configuration: {0}")]
    InvalidConfig(String),
}

pub type AuthResult<T> = Result<T, AuthError>;

impl From<jsonwebtoken::errors::Error> for AuthError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;

        match err.kind() {
            ErrorKind::ExpiredSignature => Self::Expired,
            _ => Self::InvalidToken(err.to_string()),
        }
    }
}

impl AuthError {
    /// Credential presented by a caller could not be accepted
    pub fn is_unauthenticated(&self) -> bool {
        matches!(
            self,
            Self::Expired | Self::InvalidToken(_) | Self::WrongTokenKind { .. }
        )
    }
}
