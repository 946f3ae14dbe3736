//! 外部服务交互模型

use benefits_engine::Order;
use serde::{Deserialize, Serialize};

/// 购物车服务中的购物车
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredCart {
    pub id: i64,
    pub user_id: i64,
    #[serde(default)]
    pub lines: Vec<StoredCartLine>,
}

impl StoredCart {
    pub fn line_for_product(&self, product_id: i64) -> Option<&StoredCartLine> {
        self.lines.iter().find(|l| l.product_id == product_id)
    }

    pub fn total(&self) -> i64 {
        self.lines.iter().map(|l| l.unit_price * i64::from(l.quantity)).sum()
    }
}

/// 购物车服务中的行
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredCartLine {
    pub id: i64,
    pub product_id: i64,
    pub quantity: u32,
    pub unit_price: i64,
}

/// 订单列表的数据来源
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderSource {
    /// 订单服务的实时数据
    Live,
    /// 订单服务不可用时的本地快照
    Cached,
}

/// 订单列表
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderHistory {
    pub orders: Vec<Order>,
    pub source: OrderSource,
}

impl OrderHistory {
    pub fn live(orders: Vec<Order>) -> Self {
        Self {
            orders,
            source: OrderSource::Live,
        }
    }

    pub fn cached(orders: Vec<Order>) -> Self {
        Self {
            orders,
            source: OrderSource::Cached,
        }
    }

    pub fn is_stale(&self) -> bool {
        self.source == OrderSource::Cached
    }
}
