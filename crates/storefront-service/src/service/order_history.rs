//! 订单查询服务
//!
//! 用户订单列表采用读穿缓存：订单账本可用时保存快照，不可用时返回最近一次快照。
//! 快照只是体验上的回退，不保证与账本一致。

use std::sync::Arc;

use bakery_shared::observability::metrics;
use benefits_engine::{Order, OrderStatus};
use tracing::{info, instrument, warn};

use crate::error::Result;
use crate::models::OrderHistory;
use crate::repository::OrderLedger;
use crate::session::OrderCache;

/// 订单查询服务
pub struct OrderHistoryService {
    ledger: Arc<dyn OrderLedger>,
    cache: OrderCache,
}

impl OrderHistoryService {
    pub fn new(ledger: Arc<dyn OrderLedger>, cache: OrderCache) -> Self {
        Self { ledger, cache }
    }

    /// 查询用户订单
    ///
    /// 账本调用失败时回退到本地快照（标记为 `Cached`），没有快照时返回空列表
    #[instrument(skip(self))]
    pub async fn list_for_user(&self, user_id: i64) -> Result<OrderHistory> {
        match self.ledger.list_by_user(user_id).await {
            Ok(orders) => {
                if let Err(e) = self.cache.save(user_id, &orders) {
                    warn!(user_id, error = %e, "订单快照保存失败");
                }
                Ok(OrderHistory::live(orders))
            }
            Err(e) => {
                warn!(user_id, error = %e, "订单服务不可用，使用本地快照");
                metrics::record_cache_fallback("orders");
                let cached = self.cache.load(user_id)?.unwrap_or_default();
                Ok(OrderHistory::cached(cached))
            }
        }
    }

    /// 管理端：全部订单
    pub async fn list_all(&self) -> Result<Vec<Order>> {
        self.ledger.list_all().await
    }

    pub async fn get(&self, order_id: i64) -> Result<Order> {
        self.ledger.get(order_id).await
    }

    /// 管理端：修改订单状态，金额保持下单时的快照
    #[instrument(skip(self))]
    pub async fn override_status(&self, order_id: i64, status: OrderStatus) -> Result<Order> {
        let order = self.ledger.update_status(order_id, status).await?;
        info!(order_id, status = status.as_str(), "订单状态已修改");
        Ok(order)
    }
}
