//! Integration tests for ledger operations
//!
//! Each test gets its own SQLite file in a temp dir.

mod common;

use common::{balance, funded, register, setup, setup_with, PIN};
use paybank_core::{Principal, Profile, RecordKind, TransactionType};
use paybank_ledger::{
    AccountService, AuditService, HistoryService, LedgerConfig, LedgerError, NotFoundTarget,
    TransferService, WalletService, LOGIN_FAILED,
};
use rust_decimal_macros::dec;
use uuid::Uuid;

// ============================================================================
// Registration / login / profile
// ============================================================================

#[tokio::test]
async fn test_register_starts_at_zero() {
    let (_dir, ctx) = setup().await;
    let principal = register(&ctx, "0811000001").await;

    let account = AccountService::new(&ctx).get(&principal).await.unwrap();
    assert_eq!(account.balance, dec!(0));
    assert_eq!(account.phone_number, "0811000001");
    assert_ne!(account.pin_hash, PIN);
}

#[tokio::test]
async fn test_duplicate_phone_is_conflict() {
    let (_dir, ctx) = setup().await;
    register(&ctx, "0811000002").await;

    let err = AccountService::new(&ctx)
        .register("0811000002", "9999", Profile::default())
        .await
        .unwrap_err();
    assert_eq!(err.status(), "CONFLICT");
}

#[tokio::test]
async fn test_register_rejects_bad_input() {
    let (_dir, ctx) = setup().await;
    let service = AccountService::new(&ctx);

    let err = service
        .register("0811000003", "12", Profile::default())
        .await
        .unwrap_err();
    assert_eq!(err.status(), "INVALID_OPERATION");

    let err = service.register("   ", PIN, Profile::default()).await.unwrap_err();
    assert_eq!(err.status(), "INVALID_OPERATION");
}

#[tokio::test]
async fn test_login_and_authenticate() {
    let (_dir, ctx) = setup().await;
    let principal = register(&ctx, "0811000004").await;

    let session = AccountService::new(&ctx)
        .login("0811000004", PIN)
        .await
        .unwrap();
    assert_eq!(session.principal, principal);

    let resolved = ctx.authenticate(&session.tokens.access_token).unwrap();
    assert_eq!(resolved, principal);

    // refresh credential is not accepted for operations
    let err = ctx.authenticate(&session.tokens.refresh_token).unwrap_err();
    assert_eq!(err.status(), "UNAUTHENTICATED");
}

#[tokio::test]
async fn test_login_failures_share_one_message() {
    let (_dir, ctx) = setup().await;
    register(&ctx, "0811000005").await;
    let service = AccountService::new(&ctx);

    let wrong_pin = service.login("0811000005", "0000").await.unwrap_err();
    let unknown = service.login("0899999999", PIN).await.unwrap_err();

    for err in [wrong_pin, unknown] {
        match err {
            LedgerError::Unauthenticated(msg) => assert_eq!(msg, LOGIN_FAILED),
            other => panic!("expected Unauthenticated, got {other:?}"),
        }
    }
}

#[tokio::test]
async fn test_refresh_flow() {
    let (_dir, ctx) = setup().await;
    let principal = register(&ctx, "0811000006").await;
    let service = AccountService::new(&ctx);
    let session = service.login("0811000006", PIN).await.unwrap();

    let refreshed = service.refresh(&session.tokens.refresh_token).await.unwrap();
    assert_eq!(refreshed.principal, principal);
    assert_eq!(
        ctx.authenticate(&refreshed.tokens.access_token).unwrap(),
        principal
    );

    let err = service
        .refresh(&session.tokens.access_token)
        .await
        .unwrap_err();
    assert_eq!(err.status(), "UNAUTHENTICATED");

    let err = service.refresh("garbage").await.unwrap_err();
    assert_eq!(err.status(), "UNAUTHENTICATED");
}

#[tokio::test]
async fn test_update_profile() {
    let (_dir, ctx) = setup().await;
    let principal = funded(&ctx, "0811000007", dec!(25)).await;
    let service = AccountService::new(&ctx);
    let before = service.get(&principal).await.unwrap();

    let updated = service
        .update_profile(&principal, Profile::new("Binh", "Tran", "Da Nang"))
        .await
        .unwrap();

    assert_eq!(updated.profile.first_name, "Binh");
    assert_eq!(updated.profile.address, "Da Nang");
    assert_eq!(updated.balance, dec!(25));
    assert!(updated.updated_at >= before.updated_at);

    let ghost = Principal::new(Uuid::new_v4(), "0800000000");
    let err = service
        .update_profile(&ghost, Profile::default())
        .await
        .unwrap_err();
    assert_eq!(err.status(), "NOT_FOUND");
}

// ============================================================================
// Top-up / payment
// ============================================================================

#[tokio::test]
async fn test_scenario_a_top_up() {
    let (_dir, ctx) = setup().await;
    let x = register(&ctx, "0822000001").await;

    let record = WalletService::new(&ctx).top_up(&x, dec!(100)).await.unwrap();
    assert_eq!(record.balance_before, dec!(0));
    assert_eq!(record.balance_after, dec!(100));
    assert_eq!(balance(&ctx, &x).await, dec!(100));

    let history = HistoryService::new(&ctx).history(&x).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].record_kind, RecordKind::TopUp);
    assert_eq!(history[0].transaction_type, TransactionType::Credit);
}

#[tokio::test]
async fn test_scenario_b_payment() {
    let (_dir, ctx) = setup().await;
    let x = funded(&ctx, "0822000002", dec!(100)).await;
    let wallet = WalletService::new(&ctx);

    let record = wallet.pay(&x, dec!(40), "lunch").await.unwrap();
    assert_eq!(record.balance_before, dec!(100));
    assert_eq!(record.balance_after, dec!(60));
    assert_eq!(record.remarks, "lunch");
    assert_eq!(balance(&ctx, &x).await, dec!(60));

    let err = wallet.pay(&x, dec!(100), "too much").await.unwrap_err();
    assert!(matches!(
        err,
        LedgerError::InsufficientFunds { required, available }
            if required == dec!(100) && available == dec!(60)
    ));
    assert_eq!(balance(&ctx, &x).await, dec!(60));
    assert_eq!(HistoryService::new(&ctx).history(&x).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_pay_exact_balance_reaches_zero() {
    let (_dir, ctx) = setup().await;
    let x = funded(&ctx, "0822000003", dec!(12.50)).await;

    let record = WalletService::new(&ctx)
        .pay(&x, dec!(12.5), "everything")
        .await
        .unwrap();
    assert_eq!(record.balance_after, dec!(0));
    assert_eq!(balance(&ctx, &x).await, dec!(0));
}

#[tokio::test]
async fn test_invalid_amounts_rejected_without_effect() {
    let (_dir, ctx) = setup().await;
    let x = funded(&ctx, "0822000004", dec!(50)).await;
    let y = register(&ctx, "0822000005").await;
    let wallet = WalletService::new(&ctx);

    for amount in [dec!(0), dec!(-5), dec!(1.001)] {
        let err = wallet.top_up(&x, amount).await.unwrap_err();
        assert_eq!(err.status(), "INVALID_AMOUNT");

        let err = wallet.pay(&x, amount, "").await.unwrap_err();
        assert_eq!(err.status(), "INVALID_AMOUNT");

        let err = TransferService::new(&ctx)
            .transfer(&x, y.account_id, amount, "")
            .await
            .unwrap_err();
        assert_eq!(err.status(), "INVALID_AMOUNT");
    }

    assert_eq!(balance(&ctx, &x).await, dec!(50));
    assert_eq!(balance(&ctx, &y).await, dec!(0));
}

#[tokio::test]
async fn test_unknown_account_is_not_found() {
    let (_dir, ctx) = setup().await;
    let ghost = Principal::new(Uuid::new_v4(), "0800000000");

    let err = WalletService::new(&ctx)
        .top_up(&ghost, dec!(10))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        LedgerError::NotFound { target: NotFoundTarget::Account, .. }
    ));

    let err = HistoryService::new(&ctx).history(&ghost).await.unwrap_err();
    assert_eq!(err.status(), "NOT_FOUND");
}

// ============================================================================
// Transfer
// ============================================================================

#[tokio::test]
async fn test_scenario_c_transfer() {
    let (_dir, ctx) = setup().await;
    let x = funded(&ctx, "0833000001", dec!(100)).await;
    let y = register(&ctx, "0833000002").await;

    let record = TransferService::new(&ctx)
        .transfer(&x, y.account_id, dec!(30), "rent")
        .await
        .unwrap();

    assert_eq!(record.balance_before, dec!(100));
    assert_eq!(record.balance_after, dec!(70));
    assert_eq!(record.to_balance_before, dec!(0));
    assert_eq!(record.to_balance_after, dec!(30));
    assert_eq!(balance(&ctx, &x).await, dec!(70));
    assert_eq!(balance(&ctx, &y).await, dec!(30));

    // conservation
    assert_eq!(record.balance_after + record.amount, record.balance_before);
    assert_eq!(record.to_balance_after - record.to_balance_before, record.amount);

    let history_x = HistoryService::new(&ctx).history(&x).await.unwrap();
    let debits: Vec<_> = history_x
        .iter()
        .filter(|e| e.record_kind == RecordKind::Transfer)
        .collect();
    assert_eq!(debits.len(), 1);
    assert_eq!(debits[0].transaction_type, TransactionType::Debit);
    assert_eq!(debits[0].amount, dec!(30));
    assert_eq!(debits[0].counterparty, Some(y.account_id));

    // received transfers stay out of the recipient's history by default
    assert!(HistoryService::new(&ctx).history(&y).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_received_transfers_in_history_when_enabled() {
    let (_dir, ctx) = setup_with(LedgerConfig {
        include_received_transfers: true,
        ..LedgerConfig::default()
    })
    .await;
    let x = funded(&ctx, "0833000003", dec!(100)).await;
    let y = register(&ctx, "0833000004").await;

    TransferService::new(&ctx)
        .transfer(&x, y.account_id, dec!(30), "gift")
        .await
        .unwrap();

    let history_y = HistoryService::new(&ctx).history(&y).await.unwrap();
    assert_eq!(history_y.len(), 1);
    assert_eq!(history_y[0].transaction_type, TransactionType::Credit);
    assert_eq!(history_y[0].balance_before, dec!(0));
    assert_eq!(history_y[0].balance_after, dec!(30));
    assert_eq!(history_y[0].counterparty, Some(x.account_id));
}

#[tokio::test]
async fn test_transfer_rejections() {
    let (_dir, ctx) = setup().await;
    let x = funded(&ctx, "0833000005", dec!(20)).await;
    let y = register(&ctx, "0833000006").await;
    let service = TransferService::new(&ctx);

    let err = service
        .transfer(&x, x.account_id, dec!(5), "self")
        .await
        .unwrap_err();
    assert_eq!(err.status(), "INVALID_OPERATION");

    let err = service
        .transfer(&x, Uuid::new_v4(), dec!(5), "nobody")
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        LedgerError::NotFound { target: NotFoundTarget::Destination, .. }
    ));

    let ghost = Principal::new(Uuid::new_v4(), "0800000000");
    let err = service
        .transfer(&ghost, y.account_id, dec!(5), "ghost")
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        LedgerError::NotFound { target: NotFoundTarget::Source, .. }
    ));

    let err = service
        .transfer(&ghost, ghost.account_id, dec!(5), "ghost to self")
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        LedgerError::NotFound { target: NotFoundTarget::Source, .. }
    ));

    let err = service
        .transfer(&x, y.account_id, dec!(20.01), "over")
        .await
        .unwrap_err();
    assert_eq!(err.status(), "INSUFFICIENT_FUNDS");

    assert_eq!(balance(&ctx, &x).await, dec!(20));
    assert_eq!(balance(&ctx, &y).await, dec!(0));
    assert_eq!(AuditService::new(&ctx).stats().await.unwrap().transfers, 0);
}

#[tokio::test]
async fn test_unknown_destinations_leave_no_lock_entries() {
    let (_dir, ctx) = setup().await;
    let x = funded(&ctx, "0833000007", dec!(10)).await;
    let service = TransferService::new(&ctx);

    for _ in 0..200 {
        let err = service
            .transfer(&x, Uuid::new_v4(), dec!(1), "nobody")
            .await
            .unwrap_err();
        assert_eq!(err.status(), "NOT_FOUND");
    }

    assert!(ctx.locks().is_empty());
    assert_eq!(balance(&ctx, &x).await, dec!(10));
}

// ============================================================================
// History order / audit
// ============================================================================

#[tokio::test]
async fn test_history_is_ascending_and_chained() {
    let (_dir, ctx) = setup().await;
    let x = funded(&ctx, "0844000001", dec!(100)).await;
    let y = register(&ctx, "0844000002").await;

    WalletService::new(&ctx).pay(&x, dec!(40), "lunch").await.unwrap();
    TransferService::new(&ctx)
        .transfer(&x, y.account_id, dec!(30), "rent")
        .await
        .unwrap();
    WalletService::new(&ctx).top_up(&x, dec!(5.25)).await.unwrap();

    let history = HistoryService::new(&ctx).history(&x).await.unwrap();
    let kinds: Vec<_> = history.iter().map(|e| e.record_kind).collect();
    assert_eq!(
        kinds,
        vec![
            RecordKind::TopUp,
            RecordKind::Payment,
            RecordKind::Transfer,
            RecordKind::TopUp
        ]
    );

    assert_eq!(history[0].balance_before, dec!(0));
    for pair in history.windows(2) {
        assert!(pair[0].created_at <= pair[1].created_at);
        assert_eq!(pair[0].balance_after, pair[1].balance_before);
    }
    assert_eq!(history.last().unwrap().balance_after, dec!(35.25));
    assert_eq!(balance(&ctx, &x).await, dec!(35.25));
}

#[tokio::test]
async fn test_audit_reports_consistent_chains() {
    let (_dir, ctx) = setup().await;
    let x = funded(&ctx, "0855000001", dec!(100)).await;
    let y = funded(&ctx, "0855000002", dec!(10)).await;

    TransferService::new(&ctx)
        .transfer(&x, y.account_id, dec!(30), "")
        .await
        .unwrap();
    TransferService::new(&ctx)
        .transfer(&y, x.account_id, dec!(15), "")
        .await
        .unwrap();
    WalletService::new(&ctx).pay(&y, dec!(1.5), "coffee").await.unwrap();

    let audit = AuditService::new(&ctx);
    let report_x = audit.verify_account(x.account_id).await.unwrap();
    assert!(report_x.consistent, "{:?}", report_x.violation);
    assert_eq!(report_x.records_checked, 3);
    assert_eq!(report_x.stored_balance, dec!(85));

    let report_y = audit.verify_account(y.account_id).await.unwrap();
    assert!(report_y.consistent, "{:?}", report_y.violation);
    assert_eq!(report_y.records_checked, 4);
    assert_eq!(report_y.stored_balance, dec!(23.5));

    let stats = audit.stats().await.unwrap();
    assert_eq!(stats.accounts, 2);
    assert_eq!(stats.transfers, 2);
}

#[tokio::test]
async fn test_audit_detects_tampered_balance() {
    let (_dir, ctx) = setup().await;
    let x = funded(&ctx, "0855000003", dec!(100)).await;

    sqlx::query("UPDATE accounts SET balance = '90' WHERE id = ?")
        .bind(x.account_id.to_string())
        .execute(ctx.pool())
        .await
        .unwrap();

    let report = AuditService::new(&ctx)
        .verify_account(x.account_id)
        .await
        .unwrap();
    assert!(!report.consistent);
    assert!(report.violation.unwrap().contains("ledger chain ends at 100"));
}
