//! JSON response envelopes
//!
//! Success: `{"status": "SUCCESS", "result": ...}`
//! Failure: `{"status": <status>, "message": ...}`

use paybank_ledger::LedgerError;
use serde::Serialize;
use serde_json::{json, Value};

pub const SUCCESS: &str = "SUCCESS";

pub fn success<T: Serialize>(result: &T) -> serde_json::Result<Value> {
    Ok(json!({
        "status": SUCCESS,
        "result": serde_json::to_value(result)?,
    }))
}

/// Envelope for a failed command; ledger errors keep their own status
pub fn failure(err: &anyhow::Error) -> Value {
    match err.downcast_ref::<LedgerError>() {
        Some(ledger) => json!({
            "status": ledger.status(),
            "message": ledger.to_string(),
        }),
        None => json!({
            "status": "INTERNAL",
            "message": format!("{err:#}"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_success_envelope() {
        let value = success(&json!({"balance": "10"})).unwrap();
        assert_eq!(value["status"], "SUCCESS");
        assert_eq!(value["result"]["balance"], "10");
    }

    #[test]
    fn test_failure_envelope_keeps_ledger_status() {
        let err = anyhow::Error::new(LedgerError::insufficient_funds(dec!(100), dec!(60)));
        let value = failure(&err);
        assert_eq!(value["status"], "INSUFFICIENT_FUNDS");
        assert_eq!(
            value["message"],
            "Insufficient funds: required 100, available 60"
        );

        let err = anyhow::anyhow!("config file not found: x.toml");
        assert_eq!(failure(&err)["status"], "INTERNAL");
    }
}
