//! Account operations - register, login, refresh, profile
//!
//! AccountService không bao giờ thay đổi balance.

use crate::error::{LedgerError, LedgerResult, NotFoundTarget, LOGIN_FAILED};
use crate::services::LedgerContext;
use paybank_auth::{hash_pin, validate_pin, verify_pin, TokenPair};
use paybank_core::{Account, Principal, Profile};
use paybank_persistence::{AccountRepo, PersistenceError};
use serde::{Deserialize, Serialize};

/// Login result: who logged in and their credentials
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub principal: Principal,
    #[serde(flatten)]
    pub tokens: TokenPair,
}

/// Account Service - registration, credentials, profile
pub struct AccountService<'a> {
    ctx: &'a LedgerContext,
}

impl<'a> AccountService<'a> {
    pub fn new(ctx: &'a LedgerContext) -> Self {
        Self { ctx }
    }

    /// Create an account with balance 0
    pub async fn register(
        &self,
        phone_number: &str,
        pin: &str,
        profile: Profile,
    ) -> LedgerResult<Account> {
        let phone_number = phone_number.trim();
        if phone_number.is_empty() {
            return Err(LedgerError::InvalidOperation(
                "Phone number is required".to_string(),
            ));
        }
        validate_pin(pin)?;

        let mut account = Account::new(phone_number, profile, String::new());
        account.pin_hash = hash_pin(account.id, pin);

        AccountRepo::insert(self.ctx.pool(), &account)
            .await
            .map_err(|e| match e {
                PersistenceError::AlreadyExists { .. } => LedgerError::Conflict(format!(
                    "Phone number {phone_number} is already registered"
                )),
                other => other.into(),
            })?;

        tracing::info!(account_id = %account.id, phone = %account.phone_number, "account registered");
        Ok(account)
    }

    /// Check phone + PIN and issue an access/refresh pair
    pub async fn login(&self, phone_number: &str, pin: &str) -> LedgerResult<Session> {
        let account = match AccountRepo::get_by_phone(self.ctx.pool(), phone_number.trim()).await
        {
            Ok(row) => Account::try_from(row)?,
            Err(e) if e.is_not_found() => {
                tracing::debug!(phone = %phone_number, "login for unknown phone");
                return Err(LedgerError::Unauthenticated(LOGIN_FAILED.to_string()));
            }
            Err(e) => return Err(e.into()),
        };

        if !verify_pin(account.id, pin, &account.pin_hash) {
            tracing::warn!(account_id = %account.id, "login with wrong PIN");
            return Err(LedgerError::Unauthenticated(LOGIN_FAILED.to_string()));
        }

        let principal = Principal::from(&account);
        let tokens = self.ctx.tokens().issue_pair(&principal)?;
        tracing::info!(account_id = %account.id, "login succeeded");
        Ok(Session { principal, tokens })
    }

    /// Exchange a refresh credential for a new pair
    pub async fn refresh(&self, refresh_token: &str) -> LedgerResult<Session> {
        let (principal, tokens) = self.ctx.tokens().refresh(refresh_token)?;

        // the account must still exist
        match AccountRepo::get_by_id(self.ctx.pool(), principal.account_id).await {
            Ok(_) => Ok(Session { principal, tokens }),
            Err(e) if e.is_not_found() => Err(LedgerError::Unauthenticated(format!(
                "Account {} no longer exists",
                principal.account_id
            ))),
            Err(e) => Err(e.into()),
        }
    }

    /// Current account state, including balance
    pub async fn get(&self, principal: &Principal) -> LedgerResult<Account> {
        let row = AccountRepo::get_by_id(self.ctx.pool(), principal.account_id).await?;
        Ok(Account::try_from(row)?)
    }

    /// Overwrite first name, last name and address
    pub async fn update_profile(
        &self,
        principal: &Principal,
        profile: Profile,
    ) -> LedgerResult<Account> {
        let mut uow = self.ctx.begin().await?;
        let outcome = uow
            .update_profile(principal.account_id, &profile)
            .await
            .map_err(|e| LedgerError::in_unit(e, NotFoundTarget::Account));
        let account = self.ctx.finish(uow, outcome).await?;

        tracing::info!(account_id = %account.id, "profile updated");
        Ok(account)
    }
}
