//! 订单金额计算
//!
//! 纯函数：`(购物车行, 优惠码, 用户折扣百分比) -> OrderTotals`。
//!
//! 1. `subtotal = Σ 单价 × 数量`
//! 2. 用户折扣桶与优惠码折扣桶分别按百分比计算并四舍五入（0.5 进位）
//! 3. `discount_amount = min(subtotal, 两桶之和)`
//! 4. `total = subtotal - discount_amount`，不会为负
//!
//! 每次购物车变化都从当前状态完整重算，不做增量修补。

use crate::models::{CartLine, OrderTotals, PromoCode};

/// 按百分比计算折扣并四舍五入到整数货币单位
///
/// 金额非负时 `(amount × percent + 50) / 100` 与 0.5 进位的 round 一致。
/// 中间结果在 i128 中计算，超出 i64 时饱和
pub fn percent_of(amount: i64, percent: u8) -> i64 {
    if amount <= 0 || percent == 0 {
        return 0;
    }
    let scaled = (i128::from(amount) * i128::from(percent) + 50) / 100;
    i64::try_from(scaled).unwrap_or(i64::MAX)
}

/// 小计，溢出时饱和到 `i64::MAX`
pub fn subtotal(lines: &[CartLine]) -> i64 {
    lines
        .iter()
        .map(CartLine::line_total)
        .fold(0i64, i64::saturating_add)
}

/// 由小计和两个百分比计算金额
pub fn totals_from_subtotal(subtotal: i64, user_percent: u8, promo_percent: u8) -> OrderTotals {
    let subtotal = subtotal.max(0);
    let user_discount = percent_of(subtotal, user_percent.min(100));
    let promo_discount = percent_of(subtotal, promo_percent.min(100));
    let discount_amount = user_discount.saturating_add(promo_discount).min(subtotal);

    OrderTotals {
        subtotal,
        user_discount,
        promo_discount,
        discount_amount,
        total: subtotal - discount_amount,
    }
}

/// 计算订单金额
pub fn calculate_totals(
    lines: &[CartLine],
    promo: Option<&PromoCode>,
    user_discount_percent: u8,
) -> OrderTotals {
    let promo_percent = promo.map(PromoCode::effective_percent).unwrap_or(0);
    totals_from_subtotal(subtotal(lines), user_discount_percent, promo_percent)
}
