//! 购物流程测试套件
//!
//! 注册、加购、优惠码、结账、订单查询、重启恢复。

use crate::setup::TestEnvironment;
use benefits_engine::{BenefitsError, OrderStatus};

#[cfg(test)]
mod checkout_tests {
    use super::*;

    /// 终身优惠码用户叠加结账优惠码
    ///
    /// 1. 用 FELICES50 注册（非年长）
    /// 2. 加入两件商品并应用 DESCUENTO20
    /// 3. 结账，验证两部分折扣分别计算
    /// 4. 订单出现在用户订单列表中
    #[tokio::test]
    async fn test_lifetime_code_with_checkout_promo() {
        let env = TestEnvironment::setup().unwrap();
        let today = TestEnvironment::today();
        let shop = &env.storefront;

        let account = shop
            .accounts
            .register(
                TestEnvironment::registration("cami@gmail.com", Some("1995-02-14"), Some("felices50")),
                today,
            )
            .await
            .unwrap();
        assert_eq!(account.profile.discount_percent, 10);
        assert!(account.profile.has_lifetime_promo);
        let user = account.user;

        shop.checkout.initialize(user.id).await.unwrap();
        let tiramisu = env.backends.carts.product(4).unwrap();
        let brownie = env.backends.carts.product(6).unwrap();
        shop.checkout.add_product(&tiramisu, 1).await.unwrap();
        shop.checkout.add_product(&brownie, 1).await.unwrap();
        shop.checkout.add_product(&brownie, 1).await.unwrap();
        shop.checkout.apply_promo_code("DESCUENTO20").await.unwrap();

        let order = shop.checkout.finalize(&user, today).await.unwrap();
        // 5500 + 2 * 4000 = 13500；10% = 1350；20% = 2700
        assert_eq!(order.totals.subtotal, 13500);
        assert_eq!(order.totals.user_discount, 1350);
        assert_eq!(order.totals.promo_discount, 2700);
        assert_eq!(order.totals.total, 9450);
        assert_eq!(order.status, OrderStatus::Pending);

        let history = shop.orders.list_for_user(user.id).await.unwrap();
        assert_eq!(history.orders, vec![order.clone()]);

        let updated = shop
            .orders
            .override_status(order.id, OrderStatus::Completed)
            .await
            .unwrap();
        assert_eq!(updated.status, OrderStatus::Completed);
        assert_eq!(updated.totals, order.totals);
    }

    /// 修改数量与移除商品
    #[tokio::test]
    async fn test_quantity_changes_before_checkout() {
        let env = TestEnvironment::setup().unwrap();
        let today = TestEnvironment::today();
        let shop = &env.storefront;

        let user = shop
            .accounts
            .register(TestEnvironment::registration("tomas@gmail.com", None, None), today)
            .await
            .unwrap()
            .user;
        shop.checkout.initialize(user.id).await.unwrap();

        let empanada = env.backends.carts.product(5).unwrap();
        let mousse = env.backends.carts.product(3).unwrap();
        shop.checkout.add_product(&empanada, 2).await.unwrap();
        shop.checkout.add_product(&mousse, 1).await.unwrap();

        shop.checkout.update_quantity(empanada.id, 5).await.unwrap();
        shop.checkout.update_quantity(mousse.id, 0).await.unwrap();

        let cart = shop.checkout.cart();
        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.item_count(), 5);

        let removed = shop.checkout.remove_product(empanada.id).await.unwrap();
        assert!(removed.is_some());

        let err = shop.checkout.finalize(&user, today).await.unwrap_err();
        assert_eq!(err.as_benefits(), Some(&BenefitsError::EmptyCart));
        assert_eq!(env.backends.ledger.count(), 0);
    }

    /// 重启后恢复登录用户和购物车
    #[tokio::test]
    async fn test_restart_restores_session() {
        let mut env = TestEnvironment::setup().unwrap();
        let today = TestEnvironment::today();

        let user = env
            .storefront
            .accounts
            .register(
                TestEnvironment::registration("vale@duoc.cl", Some("1970-10-19"), None),
                today,
            )
            .await
            .unwrap()
            .user;
        env.storefront.checkout.initialize(user.id).await.unwrap();
        let cake = env.backends.carts.product(2).unwrap();
        env.storefront.checkout.add_product(&cake, 1).await.unwrap();

        env.restart().unwrap();

        let current = env.storefront.accounts.current_user().unwrap().unwrap();
        assert_eq!(current.id, user.id);
        assert_eq!(env.storefront.checkout.cart().item_count(), 1);

        // 56 岁，享受年长折扣
        let order = env.storefront.checkout.finalize(&current, today).await.unwrap();
        assert_eq!(order.totals.total, 21000);

        env.storefront.accounts.logout().unwrap();
        env.restart().unwrap();
        assert!(env.storefront.accounts.current_user().unwrap().is_none());
    }
}

#[cfg(test)]
mod outage_tests {
    use super::*;

    /// 订单服务故障时，用户订单回退到本地快照
    #[tokio::test]
    async fn test_history_snapshot_after_restart() {
        let mut env = TestEnvironment::setup().unwrap();
        let today = TestEnvironment::today();

        let user = env
            .storefront
            .accounts
            .register(TestEnvironment::registration("nico@gmail.com", None, None), today)
            .await
            .unwrap()
            .user;
        env.storefront.checkout.initialize(user.id).await.unwrap();
        let brownie = env.backends.carts.product(6).unwrap();
        env.storefront.checkout.add_product(&brownie, 3).await.unwrap();
        env.storefront.checkout.finalize(&user, today).await.unwrap();
        env.storefront.orders.list_for_user(user.id).await.unwrap();

        env.restart().unwrap();
        env.backends.ledger.set_online(false);

        let history = env.storefront.orders.list_for_user(user.id).await.unwrap();
        assert!(history.is_stale());
        assert_eq!(history.orders.len(), 1);
        assert_eq!(history.orders[0].totals.total, 12000);
    }

    /// 用户目录故障时登录失败且可重试
    #[tokio::test]
    async fn test_directory_outage_is_retryable() {
        let env = TestEnvironment::setup().unwrap();
        env.backends.directory.set_online(false);

        let err = env
            .storefront
            .accounts
            .login("nadie@duoc.cl", TestEnvironment::today())
            .await
            .unwrap_err();
        assert!(err.is_retryable());
        assert_eq!(err.error_code(), "SERVICE_UNAVAILABLE");
    }
}
