//! 结账服务
//!
//! 本地购物车先更新、随后同步到购物车服务。同步失败只记录日志，本地状态保留，
//! 对应行没有远程行 ID。每次修改都写入会话快照。
//!
//! ## 生成订单流程
//!
//! 1. 按用户资料确定折扣 -> 2. 生成订单草稿 -> 3. 订单账本落单
//!    -> 4. 清空远程购物车 -> 5. 清空本地购物车（保留绑定）
//!
//! 第 3 步失败时购物车保持原样。

use std::sync::Arc;

use bakery_shared::observability::metrics;
use benefits_engine::{
    BenefitPolicy, CartLine, CartSession, Order, OrderTotals, Product, PromoCode, PromoRegistry,
    UserIdentity,
};
use chrono::NaiveDate;
use parking_lot::Mutex;
use tracing::{info, instrument, warn};

use crate::error::{Result, ServiceError};
use crate::models::StoredCart;
use crate::repository::{CartStore, OrderLedger};
use crate::session::PersistedCart;

/// 结账服务
pub struct CheckoutService {
    cart_store: Arc<dyn CartStore>,
    ledger: Arc<dyn OrderLedger>,
    policy: BenefitPolicy,
    promos: PromoRegistry,
    cart: Mutex<PersistedCart>,
}

impl CheckoutService {
    pub fn new(
        cart_store: Arc<dyn CartStore>,
        ledger: Arc<dyn OrderLedger>,
        policy: BenefitPolicy,
        promos: PromoRegistry,
        cart: PersistedCart,
    ) -> Self {
        Self {
            cart_store,
            ledger,
            policy,
            promos,
            cart: Mutex::new(cart),
        }
    }

    /// 当前购物车的副本
    pub fn cart(&self) -> CartSession {
        self.cart.lock().session().clone()
    }

    fn cart_id(&self) -> Option<i64> {
        self.cart.lock().session().cart_id
    }

    /// 在购物车服务创建购物车并绑定
    #[instrument(skip(self))]
    pub async fn initialize(&self, user_id: i64) -> Result<StoredCart> {
        let stored = self.cart_store.create(user_id).await.inspect_err(|e| {
            warn!(user_id, error = %e, "购物车服务初始化失败");
        })?;

        self.cart
            .lock()
            .mutate(|cart| cart.bind(stored.id, user_id))?;

        info!(user_id, cart_id = stored.id, "购物车已绑定");
        Ok(stored)
    }

    /// 加入商品
    #[instrument(skip(self, product), fields(product_id = product.id))]
    pub async fn add_product(&self, product: &Product, quantity: u32) -> Result<CartLine> {
        if quantity == 0 {
            return Err(ServiceError::Validation("数量必须大于 0".to_string()));
        }

        let line = self
            .cart
            .lock()
            .mutate(|cart| cart.add_product(product, quantity).cloned())?
            .ok_or_else(|| ServiceError::Validation("商品未能加入购物车".to_string()))?;

        if let Some(cart_id) = self.cart_id() {
            self.push_line(cart_id, product.id, quantity).await?;
        }

        Ok(line)
    }

    /// 修改数量，`quantity <= 0` 时移除
    ///
    /// 远程以“删除旧行 + 按新数量加入”同步
    #[instrument(skip(self))]
    pub async fn update_quantity(&self, product_id: i64, quantity: i64) -> Result<Option<CartLine>> {
        let (previous, current) = self.cart.lock().mutate(|cart| {
            let previous = cart.line(product_id).cloned();
            (previous, cart.update_quantity(product_id, quantity))
        })?;

        let Some(previous) = previous else {
            return Ok(None);
        };

        if let Some(cart_id) = self.cart_id() {
            if let Some(line_id) = previous.remote_line_id {
                if !self.pull_line(cart_id, line_id).await {
                    // 旧行未删除时不再加入新行，避免远程数量翻倍
                    return Ok(current);
                }
                // 旧行已删除，新行加入失败时不能再引用它
                self.cart
                    .lock()
                    .mutate(|cart| cart.set_remote_line_id(product_id, None))?;
            }
            if quantity > 0 {
                let quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
                self.push_line(cart_id, product_id, quantity).await?;
            }
        }

        Ok(current)
    }

    /// 移除商品
    #[instrument(skip(self))]
    pub async fn remove_product(&self, product_id: i64) -> Result<Option<CartLine>> {
        let removed = self
            .cart
            .lock()
            .mutate(|cart| cart.remove_product(product_id))?;

        if let (Some(cart_id), Some(line_id)) = (
            self.cart_id(),
            removed.as_ref().and_then(|l| l.remote_line_id),
        ) {
            self.pull_line(cart_id, line_id).await;
        }

        Ok(removed)
    }

    /// 应用优惠码
    ///
    /// 无效的码返回 `InvalidPromoCode`，之前的优惠码继续生效
    #[instrument(skip(self))]
    pub async fn apply_promo_code(&self, code: &str) -> Result<PromoCode> {
        let result = self
            .cart
            .lock()
            .mutate(|cart| cart.apply_promo_code(code, &self.promos).cloned())?;
        metrics::record_promo_attempt(result.is_ok());
        Ok(result?)
    }

    pub fn remove_promo_code(&self) -> Result<Option<PromoCode>> {
        self.cart.lock().mutate(CartSession::remove_promo_code)
    }

    /// 清空购物车，保留绑定
    #[instrument(skip(self))]
    pub async fn clear(&self) -> Result<()> {
        self.cart.lock().mutate(CartSession::clear)?;

        if let Some(cart_id) = self.cart_id() {
            if let Err(e) = self.cart_store.clear(cart_id).await {
                warn!(cart_id, error = %e, "远程购物车清空失败");
                metrics::record_cart_sync_failure("clear");
            }
        }
        Ok(())
    }

    /// 按用户资料折扣计算当前金额，未登录时没有用户折扣
    pub fn totals(&self, user: Option<&UserIdentity>, today: NaiveDate) -> OrderTotals {
        let percent = self.discount_percent(user, today);
        self.cart.lock().session().totals(percent)
    }

    /// 生成订单
    ///
    /// 订单账本失败时购物车不做任何改动
    #[instrument(skip(self, user), fields(user_id = user.id))]
    pub async fn finalize(&self, user: &UserIdentity, today: NaiveDate) -> Result<Order> {
        let percent = self.discount_percent(Some(user), today);

        let (cart_id, draft) = {
            let guard = self.cart.lock();
            let session = guard.session();
            let mut draft = session.prepare_order(percent)?;
            draft.user_id = Some(user.id);
            (session.cart_id, draft)
        };
        let cart_id = cart_id.ok_or_else(|| {
            ServiceError::Validation("购物车尚未绑定，请先初始化".to_string())
        })?;

        let order = self
            .ledger
            .finalize(cart_id, draft)
            .await
            .inspect_err(|e| warn!(cart_id, error = %e, "订单生成失败，购物车保持不变"))?;

        if let Err(e) = self.cart_store.clear(cart_id).await {
            warn!(cart_id, error = %e, "远程购物车清空失败");
            metrics::record_cart_sync_failure("clear");
        }
        self.cart.lock().mutate(CartSession::clear)?;

        metrics::record_order_finalized(order.promo_code.is_some());
        info!(
            order_id = order.id,
            cart_id,
            subtotal = order.totals.subtotal,
            discount = order.totals.discount_amount,
            total = order.totals.total,
            "订单生成成功"
        );
        Ok(order)
    }

    fn discount_percent(&self, user: Option<&UserIdentity>, today: NaiveDate) -> u8 {
        user.map(|u| self.policy.resolve(u, today).discount_percent)
            .unwrap_or(0)
    }

    /// 推送一行到购物车服务并记录远程行 ID
    ///
    /// 同步失败时行保留在本地，已知的远程行 ID 不变
    async fn push_line(&self, cart_id: i64, product_id: i64, quantity: u32) -> Result<()> {
        match self.cart_store.add_line(cart_id, product_id, quantity).await {
            Ok(stored) => {
                let remote_line_id = stored.line_for_product(product_id).map(|l| l.id);
                self.cart
                    .lock()
                    .mutate(|cart| cart.set_remote_line_id(product_id, remote_line_id))
            }
            Err(e) => {
                warn!(cart_id, product_id, error = %e, "购物车同步失败，保留本地状态");
                metrics::record_cart_sync_failure("add_line");
                Ok(())
            }
        }
    }

    /// 从购物车服务删除一行，返回是否成功
    async fn pull_line(&self, cart_id: i64, line_id: i64) -> bool {
        match self.cart_store.remove_line(cart_id, line_id).await {
            Ok(_) => true,
            Err(e) => {
                warn!(cart_id, line_id, error = %e, "购物车同步失败，保留本地状态");
                metrics::record_cart_sync_failure("remove_line");
                false
            }
        }
    }
}
