//! 购物车会话
//!
//! 持有一次购物的行项目和当前优惠码。金额不在会话中保存，
//! 每次调用 [`CartSession::totals`] 都从当前行项目和优惠码完整重算。
//!
//! 会话可整体序列化，作为持久化快照使用。

use serde::{Deserialize, Deserializer, Serialize};
use tracing::{debug, info, warn};

use crate::error::{BenefitsError, Result};
use crate::models::{CartLine, OrderDraft, OrderTotals, Product, PromoCode};
use crate::promo::PromoRegistry;
use crate::totals::calculate_totals;

/// 购物车会话
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartSession {
    /// 购物车服务中的购物车 ID，清空后保留以便复用
    #[serde(default)]
    pub cart_id: Option<i64>,
    #[serde(default)]
    pub user_id: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_lines")]
    lines: Vec<CartLine>,
    #[serde(default)]
    promo: Option<PromoCode>,
}

/// 恢复快照时丢弃数量为 0 的行
fn deserialize_lines<'de, D>(deserializer: D) -> std::result::Result<Vec<CartLine>, D::Error>
where
    D: Deserializer<'de>,
{
    let mut lines = Vec::<CartLine>::deserialize(deserializer)?;
    let before = lines.len();
    lines.retain(|line| line.quantity > 0);
    if lines.len() < before {
        warn!(dropped = before - lines.len(), "快照中存在数量为 0 的行，已丢弃");
    }
    Ok(lines)
}

impl CartSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// 绑定购物车服务中的购物车
    pub fn bind(&mut self, cart_id: i64, user_id: i64) {
        self.cart_id = Some(cart_id);
        self.user_id = Some(user_id);
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn line(&self, product_id: i64) -> Option<&CartLine> {
        self.lines.iter().find(|l| l.product_id == product_id)
    }

    pub fn promo(&self) -> Option<&PromoCode> {
        self.promo.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// 商品件数（各行数量之和）
    pub fn item_count(&self) -> u32 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    /// 加入商品
    ///
    /// 已有同一商品时累加数量并保留原行锁定的单价；数量为 0 时不做任何事。
    /// 返回加入后的行
    pub fn add_product(&mut self, product: &Product, quantity: u32) -> Option<&CartLine> {
        if quantity == 0 {
            return self.line(product.id);
        }

        match self.lines.iter().position(|l| l.product_id == product.id) {
            Some(index) => {
                let line = &mut self.lines[index];
                line.quantity = line.quantity.saturating_add(quantity);
                debug!(product_id = product.id, quantity = line.quantity, "购物车行数量累加");
            }
            None => {
                self.lines.push(CartLine::from_product(product, quantity));
                debug!(product_id = product.id, quantity, "购物车新增行");
            }
        }

        self.line(product.id)
    }

    /// 修改数量，`quantity <= 0` 时移除整行
    ///
    /// 返回被修改或移除的行（修改后的状态）；商品不在购物车中时返回 None
    pub fn update_quantity(&mut self, product_id: i64, quantity: i64) -> Option<CartLine> {
        if quantity <= 0 {
            return self.remove_product(product_id);
        }

        let line = self.lines.iter_mut().find(|l| l.product_id == product_id)?;
        line.quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
        Some(line.clone())
    }

    /// 移除商品行
    pub fn remove_product(&mut self, product_id: i64) -> Option<CartLine> {
        let index = self.lines.iter().position(|l| l.product_id == product_id)?;
        Some(self.lines.remove(index))
    }

    /// 记录购物车服务分配的行 ID
    pub fn set_remote_line_id(&mut self, product_id: i64, remote_line_id: Option<i64>) {
        if let Some(line) = self.lines.iter_mut().find(|l| l.product_id == product_id) {
            line.remote_line_id = remote_line_id;
        }
    }

    /// 应用结账优惠码
    ///
    /// 无效的码返回 `InvalidPromoCode`，购物车保持原样，之前已应用的优惠码继续生效
    pub fn apply_promo_code(&mut self, raw: &str, registry: &PromoRegistry) -> Result<&PromoCode> {
        let promo = registry.lookup(raw)?;
        info!(code = %promo.code, discount_percent = promo.discount_percent, "优惠码已应用");
        Ok(self.promo.insert(promo))
    }

    /// 移除优惠码，返回被移除的码
    pub fn remove_promo_code(&mut self) -> Option<PromoCode> {
        self.promo.take()
    }

    /// 清空行项目和优惠码，保留购物车与用户绑定
    pub fn clear(&mut self) {
        self.lines.clear();
        self.promo = None;
    }

    /// 按当前状态重算金额
    pub fn totals(&self, user_discount_percent: u8) -> OrderTotals {
        calculate_totals(&self.lines, self.promo.as_ref(), user_discount_percent)
    }

    /// 由当前购物车生成订单草稿，不修改购物车
    ///
    /// 购物车为空时返回 `EmptyCart`
    pub fn prepare_order(&self, user_discount_percent: u8) -> Result<OrderDraft> {
        if self.lines.is_empty() {
            return Err(BenefitsError::EmptyCart);
        }

        Ok(OrderDraft {
            user_id: self.user_id,
            cart_id: self.cart_id,
            lines: self.lines.clone(),
            totals: self.totals(user_discount_percent),
            promo_code: self.promo.as_ref().map(|p| p.code.clone()),
            user_discount_percent,
            promo_discount_percent: self.promo.as_ref().map(PromoCode::effective_percent).unwrap_or(0),
        })
    }

    /// 生成订单草稿并清空购物车
    pub fn checkout(&mut self, user_discount_percent: u8) -> Result<OrderDraft> {
        let draft = self.prepare_order(user_discount_percent)?;
        self.clear();
        Ok(draft)
    }
}
