//! 购物车模型

use serde::{Deserialize, Serialize};

/// 商品目录中的商品
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: i64,
    pub name: String,
    /// 单价（整数货币单位）
    pub price: i64,
}

/// 购物车行
///
/// 单价在加入购物车时锁定，之后商品调价不影响本行
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub product_id: i64,
    pub name: String,
    pub unit_price: i64,
    /// 始终 >= 1，数量降到 0 及以下时整行移除
    pub quantity: u32,
    /// 购物车服务中的行 ID，未同步时为 None
    #[serde(default)]
    pub remote_line_id: Option<i64>,
}

impl CartLine {
    pub fn from_product(product: &Product, quantity: u32) -> Self {
        Self {
            product_id: product.id,
            name: product.name.clone(),
            unit_price: product.price,
            quantity,
            remote_line_id: None,
        }
    }

    /// 行金额，溢出时饱和
    pub fn line_total(&self) -> i64 {
        self.unit_price.saturating_mul(i64::from(self.quantity))
    }
}

/// 已校验的结账优惠码
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromoCode {
    /// 规范化后的优惠码（去空白、大写）
    pub code: String,
    /// 0-100
    pub discount_percent: u8,
    pub valid: bool,
}

impl PromoCode {
    /// 生效的折扣百分比，无效优惠码按 0 计
    pub fn effective_percent(&self) -> u8 {
        if self.valid { self.discount_percent } else { 0 }
    }
}
