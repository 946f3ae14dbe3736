//! 订单模型
//!
//! 订单是生成时刻的不可变快照：行项目和金额一经写入不再重算，
//! 之后只允许运营手动修改状态。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::cart::CartLine;

/// 订单金额
///
/// 用户折扣和优惠码折扣是两个独立的桶，分别取整后相加。
/// `discount_amount` 不超过 `subtotal`，`total = subtotal - discount_amount` 恒成立。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderTotals {
    pub subtotal: i64,
    /// 按用户资料（年长/终身优惠）计算的折扣
    pub user_discount: i64,
    /// 按结账优惠码计算的折扣
    pub promo_discount: i64,
    pub discount_amount: i64,
    pub total: i64,
}

/// 订单状态
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    /// 待处理 - 已生成，等待支付/履约确认
    #[default]
    Pending,
    /// 已完成
    Completed,
    /// 已取消
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "completed" => Ok(Self::Completed),
            "cancelled" | "canceled" => Ok(Self::Cancelled),
            other => Err(format!("未知的订单状态: {}", other)),
        }
    }
}

/// 订单草稿
///
/// 由购物车生成，交给订单账本分配 ID 后成为 [`Order`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDraft {
    pub user_id: Option<i64>,
    pub cart_id: Option<i64>,
    pub lines: Vec<CartLine>,
    pub totals: OrderTotals,
    pub promo_code: Option<String>,
    pub user_discount_percent: u8,
    pub promo_discount_percent: u8,
}

/// 已生成的订单
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: i64,
    pub user_id: Option<i64>,
    pub cart_id: Option<i64>,
    pub lines: Vec<CartLine>,
    pub totals: OrderTotals,
    pub promo_code: Option<String>,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

impl Order {
    pub fn from_draft(
        id: i64,
        draft: OrderDraft,
        status: OrderStatus,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            user_id: draft.user_id,
            cart_id: draft.cart_id,
            lines: draft.lines,
            totals: draft.totals,
            promo_code: draft.promo_code,
            status,
            created_at,
        }
    }

    /// 运营手动修改状态，金额保持不变
    pub fn override_status(&mut self, status: OrderStatus) {
        self.status = status;
    }

    pub fn item_count(&self) -> u32 {
        self.lines.iter().map(|l| l.quantity).sum()
    }
}
