//! 店面流程集成测试
//!
//! 使用内存版外部服务跑通注册、结账、订单查询和会话恢复（无需外部依赖）

use std::path::PathBuf;
use std::sync::Arc;

use bakery_shared::{AppConfig, FileSessionStore, SessionConfig};
use benefits_engine::{BenefitsError, Product};
use chrono::NaiveDate;
use storefront::app::sample_catalog;
use storefront::dto::{ProfileUpdateRequest, RegistrationRequest};
use storefront::{CartStore, InMemoryBackends, ServiceError, Storefront};

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
}

fn registration(email: &str, birth_date: Option<&str>, promo: Option<&str>) -> RegistrationRequest {
    RegistrationRequest {
        first_name: "Ana".to_string(),
        last_name: Some("Pérez".to_string()),
        email: email.to_string(),
        password: "secreto".to_string(),
        confirm_password: "secreto".to_string(),
        phone: None,
        address: None,
        birth_date: birth_date.map(str::to_string),
        promo_code: promo.map(str::to_string),
    }
}

fn product(backends: &InMemoryBackends, id: i64) -> Product {
    backends.carts.product(id).unwrap()
}

fn setup() -> (InMemoryBackends, Storefront) {
    let backends = InMemoryBackends::with_catalog(sample_catalog());
    let storefront = Storefront::in_memory(&AppConfig::default(), &backends).unwrap();
    (backends, storefront)
}

fn temp_session_dir() -> PathBuf {
    std::env::temp_dir().join(format!("storefront-test-{}", uuid::Uuid::new_v4()))
}

// ==================== 结账流程 ====================

#[tokio::test]
async fn test_senior_checkout_with_promo() {
    let (backends, storefront) = setup();

    let account = storefront
        .accounts
        .register(
            registration("ana@duoc.cl", Some("1960-03-01"), Some("FELICES50")),
            today(),
        )
        .await
        .unwrap();
    // 年长折扣优先于终身优惠码
    assert_eq!(account.profile.discount_percent, 50);
    assert!(account.profile.is_partner_member);

    let user = account.user;
    let stored = storefront.checkout.initialize(user.id).await.unwrap();

    storefront
        .checkout
        .add_product(&product(&backends, 1), 1)
        .await
        .unwrap();
    storefront
        .checkout
        .add_product(&product(&backends, 3), 2)
        .await
        .unwrap();
    storefront
        .checkout
        .apply_promo_code("descuento20")
        .await
        .unwrap();

    let totals = storefront.checkout.totals(Some(&user), today());
    assert_eq!(totals.subtotal, 55000);
    assert_eq!(totals.user_discount, 27500);
    assert_eq!(totals.promo_discount, 11000);
    assert_eq!(totals.total, 16500);

    let order = storefront.checkout.finalize(&user, today()).await.unwrap();
    assert_eq!(order.totals, totals);
    assert_eq!(order.user_id, Some(user.id));
    assert_eq!(order.cart_id, Some(stored.id));
    assert_eq!(order.promo_code.as_deref(), Some("DESCUENTO20"));
    assert_eq!(backends.ledger.count(), 1);

    // 结账后购物车清空但保留绑定
    let cart = storefront.checkout.cart();
    assert!(cart.is_empty());
    assert!(cart.promo().is_none());
    assert_eq!(cart.cart_id, Some(stored.id));
    assert!(backends.carts.get(stored.id).await.unwrap().lines.is_empty());

    let err = storefront.checkout.finalize(&user, today()).await.unwrap_err();
    assert_eq!(err.as_benefits(), Some(&BenefitsError::EmptyCart));
    assert_eq!(backends.ledger.count(), 1);
}

#[tokio::test]
async fn test_invalid_promo_keeps_previous() {
    let (backends, storefront) = setup();
    let user = storefront
        .accounts
        .register(registration("luis@gmail.com", None, None), today())
        .await
        .unwrap()
        .user;
    storefront.checkout.initialize(user.id).await.unwrap();
    storefront
        .checkout
        .add_product(&product(&backends, 5), 1)
        .await
        .unwrap();

    storefront.checkout.apply_promo_code("FELICES50").await.unwrap();
    let err = storefront
        .checkout
        .apply_promo_code("NOEXISTE")
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "INVALID_PROMO_CODE");

    let promo = storefront.checkout.cart().promo().cloned().unwrap();
    assert_eq!(promo.code, "FELICES50");

    let totals = storefront.checkout.totals(Some(&user), today());
    assert_eq!(totals.promo_discount, 300);
    assert_eq!(totals.total, 2700);
}

#[tokio::test]
async fn test_ledger_outage_keeps_cart() {
    let (backends, storefront) = setup();
    let user = storefront
        .accounts
        .register(registration("sofia@gmail.com", None, None), today())
        .await
        .unwrap()
        .user;
    storefront.checkout.initialize(user.id).await.unwrap();
    storefront
        .checkout
        .add_product(&product(&backends, 2), 1)
        .await
        .unwrap();

    backends.ledger.set_online(false);
    let err = storefront.checkout.finalize(&user, today()).await.unwrap_err();
    assert!(err.is_retryable());
    assert_eq!(storefront.checkout.cart().item_count(), 1);

    backends.ledger.set_online(true);
    let order = storefront.checkout.finalize(&user, today()).await.unwrap();
    assert_eq!(order.totals.total, 42000);
    assert!(storefront.checkout.cart().is_empty());
}

#[tokio::test]
async fn test_cart_store_outage_keeps_local_line() {
    let (backends, storefront) = setup();
    let user = storefront
        .accounts
        .register(registration("diego@gmail.com", None, None), today())
        .await
        .unwrap()
        .user;
    storefront.checkout.initialize(user.id).await.unwrap();

    backends.carts.set_online(false);
    let line = storefront
        .checkout
        .add_product(&product(&backends, 4), 3)
        .await
        .unwrap();
    assert_eq!(line.quantity, 3);
    assert_eq!(line.remote_line_id, None);

    backends.carts.set_online(true);
    let order = storefront.checkout.finalize(&user, today()).await.unwrap();
    assert_eq!(order.totals.subtotal, 16500);
}

#[tokio::test]
async fn test_outage_on_existing_line_still_removes_backend_line() {
    let (backends, storefront) = setup();
    let user = storefront
        .accounts
        .register(registration("ines@gmail.com", None, None), today())
        .await
        .unwrap()
        .user;
    let stored = storefront.checkout.initialize(user.id).await.unwrap();
    let cake = product(&backends, 1);

    storefront.checkout.add_product(&cake, 1).await.unwrap();
    let remote_line_id = storefront.checkout.cart().line(1).unwrap().remote_line_id;
    assert!(remote_line_id.is_some());

    backends.carts.set_online(false);
    storefront.checkout.add_product(&cake, 1).await.unwrap();
    backends.carts.set_online(true);

    // 同步失败不会丢掉已知的远程行
    let line = storefront.checkout.cart().line(1).cloned().unwrap();
    assert_eq!(line.quantity, 2);
    assert_eq!(line.remote_line_id, remote_line_id);

    storefront.checkout.remove_product(1).await.unwrap();
    assert!(storefront.checkout.cart().is_empty());
    assert!(backends.carts.get(stored.id).await.unwrap().lines.is_empty());
}

// ==================== 账户与生日权益 ====================

#[tokio::test]
async fn test_birthday_benefit_fixed_at_registration() {
    let (_backends, storefront) = setup();

    let outsider = storefront
        .accounts
        .register(registration("marta@gmail.com", None, None), today())
        .await
        .unwrap()
        .user;
    let updated = storefront
        .accounts
        .update_profile(
            outsider.id,
            ProfileUpdateRequest {
                email: Some("marta@duoc.cl".to_string()),
                ..Default::default()
            },
            today(),
        )
        .await
        .unwrap();
    assert!(updated.profile.is_partner_member);
    assert!(!updated.profile.birthday.available);

    let err = storefront
        .accounts
        .redeem_birthday_benefit(outsider.id, today())
        .await
        .unwrap_err();
    assert_eq!(err.as_benefits(), Some(&BenefitsError::BenefitUnavailable));

    let member = storefront
        .accounts
        .register(registration("pablo@duocuc.cl", None, None), today())
        .await
        .unwrap()
        .user;
    let state = storefront
        .accounts
        .redeem_birthday_benefit(member.id, today())
        .await
        .unwrap();
    assert!(state.used);
    assert_eq!(state.year_used, Some(2026));

    let err = storefront
        .accounts
        .redeem_birthday_benefit(member.id, today())
        .await
        .unwrap_err();
    assert_eq!(
        err.as_benefits(),
        Some(&BenefitsError::AlreadyUsed { year_used: 2026 })
    );
}

#[tokio::test]
async fn test_duplicate_registration_rejected() {
    let (backends, storefront) = setup();
    storefront
        .accounts
        .register(registration("ana@duoc.cl", None, None), today())
        .await
        .unwrap();

    let err = storefront
        .accounts
        .register(registration("ANA@duoc.cl", None, None), today())
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "DUPLICATE_EMAIL");
    assert_eq!(backends.directory.count(), 1);
}

// ==================== 订单查询 ====================

#[tokio::test]
async fn test_order_history_falls_back_to_snapshot() {
    let (backends, storefront) = setup();
    let user = storefront
        .accounts
        .register(registration("rosa@gmail.com", None, None), today())
        .await
        .unwrap()
        .user;
    storefront.checkout.initialize(user.id).await.unwrap();
    storefront
        .checkout
        .add_product(&product(&backends, 6), 2)
        .await
        .unwrap();
    storefront.checkout.finalize(&user, today()).await.unwrap();

    let live = storefront.orders.list_for_user(user.id).await.unwrap();
    assert!(!live.is_stale());
    assert_eq!(live.orders.len(), 1);

    backends.ledger.set_online(false);
    let cached = storefront.orders.list_for_user(user.id).await.unwrap();
    assert!(cached.is_stale());
    assert_eq!(cached.orders, live.orders);

    let err = storefront.orders.list_all().await.unwrap_err();
    assert!(matches!(err, ServiceError::Unavailable { .. }));
}

// ==================== 会话恢复 ====================

#[tokio::test]
async fn test_file_session_survives_restart() {
    let directory = temp_session_dir();
    let config = AppConfig {
        session: SessionConfig {
            directory: Some(directory.clone()),
        },
        ..AppConfig::default()
    };
    let backends = InMemoryBackends::with_catalog(sample_catalog());

    let user_id = {
        let storefront = Storefront::in_memory(&config, &backends).unwrap();
        let user = storefront
            .accounts
            .register(registration("eva@duoc.cl", None, None), today())
            .await
            .unwrap()
            .user;
        storefront.checkout.initialize(user.id).await.unwrap();
        storefront
            .checkout
            .add_product(&product(&backends, 3), 4)
            .await
            .unwrap();
        storefront.checkout.apply_promo_code("DESCUENTO20").await.unwrap();
        user.id
    };

    let session = Arc::new(FileSessionStore::new(&directory).unwrap());
    let restarted = Storefront::build(
        &config,
        Arc::new(backends.directory.clone()),
        Arc::new(backends.carts.clone()),
        Arc::new(backends.ledger.clone()),
        session,
    )
    .unwrap();

    let current = restarted.accounts.current_user().unwrap().unwrap();
    assert_eq!(current.id, user_id);

    let cart = restarted.checkout.cart();
    assert_eq!(cart.item_count(), 4);
    assert_eq!(cart.user_id, Some(user_id));
    assert_eq!(cart.promo().map(|p| p.code.as_str()), Some("DESCUENTO20"));

    let order = restarted.checkout.finalize(&current, today()).await.unwrap();
    assert_eq!(order.totals.total, 16000);

    std::fs::remove_dir_all(&directory).ok();
}
