//! # Account Module
//!
//! Định nghĩa Account - tài khoản giữ balance của một user.
//! Balance chỉ được thay đổi bên trong một Ledger operation (TopUp, Payment, Transfer).

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Stable, globally unique account identifier
pub type AccountId = Uuid;

/// Thông tin profile có thể cập nhật
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub first_name: String,
    pub last_name: String,
    pub address: String,
}

impl Profile {
    pub fn new(first_name: &str, last_name: &str, address: &str) -> Self {
        Self {
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            address: address.to_string(),
        }
    }
}

/// Tài khoản của người dùng.
///
/// - `phone_number` là login key, unique
/// - `pin_hash` không bao giờ được serialize ra ngoài
/// - `balance` bắt đầu từ 0 khi đăng ký
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    pub phone_number: String,
    #[serde(flatten)]
    pub profile: Profile,
    #[serde(skip_serializing, default)]
    pub pin_hash: String,
    pub balance: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// Tạo Account mới với balance = 0
    pub fn new(phone_number: &str, profile: Profile, pin_hash: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            phone_number: phone_number.to_string(),
            profile,
            pin_hash,
            balance: Decimal::ZERO,
            created_at: now,
            updated_at: now,
        }
    }

    /// Balance ngay sau khi đăng ký, điểm bắt đầu của ledger chain
    pub fn opening_balance() -> Decimal {
        Decimal::ZERO
    }
}

impl fmt::Display for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Account {} (phone: {}, balance: {})",
            self.id, self.phone_number, self.balance
        )
    }
}

/// Verified identity derived from a caller's credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub account_id: AccountId,
    pub phone_number: String,
}

impl Principal {
    pub fn new(account_id: AccountId, phone_number: &str) -> Self {
        Self {
            account_id,
            phone_number: phone_number.to_string(),
        }
    }
}

impl From<&Account> for Principal {
    fn from(account: &Account) -> Self {
        Self::new(account.id, &account.phone_number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_creation() {
        let account = Account::new(
            "0812000111",
            Profile::new("Alice", "Nguyen", "Hanoi"),
            "hash".to_string(),
        );

        assert_eq!(account.phone_number, "0812000111");
        assert_eq!(account.balance, Decimal::ZERO);
        assert_eq!(account.created_at, account.updated_at);
        assert_eq!(account.profile.first_name, "Alice");
    }

    #[test]
    fn test_account_json_hides_pin() {
        let account = Account::new("0812000111", Profile::default(), "secret".to_string());
        let json = serde_json::to_value(&account).unwrap();

        assert!(json.get("pin_hash").is_none());
        assert_eq!(json["phone_number"], "0812000111");
        assert_eq!(json["first_name"], "");
        assert_eq!(json["balance"], "0");
    }

    #[test]
    fn test_principal_from_account() {
        let account = Account::new("0812000111", Profile::default(), String::new());
        let principal = Principal::from(&account);

        assert_eq!(principal.account_id, account.id);
        assert_eq!(principal.phone_number, "0812000111");
    }
}
