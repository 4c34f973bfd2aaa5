//! # Paybank Auth
//!
//! Identity Verifier cho Paybank:
//! - `TokenService`: ký và xác thực access/refresh credential (JWT HS256)
//! - `IdentityVerifier`: credential → `Principal`
//! - PIN validation + hashing

pub mod error;
pub mod pin;
pub mod token;

pub use error::{AuthError, AuthResult};
pub use pin::{hash_pin, validate_pin, verify_pin};
pub use token::{
    Claims, IdentityVerifier, TokenConfig, TokenKind, TokenPair, TokenService, DEV_SECRET,
};
