//! 业务指标定义
//!
//! 基于 metrics 门面声明指标名称与说明。本 crate 不安装导出器，
//! 宿主进程安装 recorder 之前所有计数都是空操作。

/// 结账时成功应用的优惠码次数
pub const PROMO_APPLIED_TOTAL: &str = "promo_codes_applied_total";
/// 结账时被拒绝的优惠码次数
pub const PROMO_REJECTED_TOTAL: &str = "promo_codes_rejected_total";
/// 生成的订单数
pub const ORDERS_FINALIZED_TOTAL: &str = "orders_finalized_total";
/// 生日权益兑换次数
pub const BIRTHDAY_REDEEMED_TOTAL: &str = "birthday_benefits_redeemed_total";
/// 外部服务不可用时回退到本地快照的次数
pub const CACHE_FALLBACK_TOTAL: &str = "session_cache_fallbacks_total";
/// 购物车同步失败次数
pub const CART_SYNC_FAILURES_TOTAL: &str = "cart_sync_failures_total";

/// 注册指标描述
pub fn describe_metrics() {
    metrics::describe_counter!(PROMO_APPLIED_TOTAL, "Promo codes accepted at checkout");
    metrics::describe_counter!(PROMO_REJECTED_TOTAL, "Promo codes rejected at checkout");
    metrics::describe_counter!(ORDERS_FINALIZED_TOTAL, "Orders finalized from a cart");
    metrics::describe_counter!(
        BIRTHDAY_REDEEMED_TOTAL,
        "One-time birthday benefits redeemed"
    );
    metrics::describe_counter!(
        CACHE_FALLBACK_TOTAL,
        "Reads served from the local session snapshot"
    );
    metrics::describe_counter!(
        CART_SYNC_FAILURES_TOTAL,
        "Cart changes that could not be pushed to the cart store"
    );
}

/// 记录一次优惠码校验结果
pub fn record_promo_attempt(accepted: bool) {
    let name = if accepted {
        PROMO_APPLIED_TOTAL
    } else {
        PROMO_REJECTED_TOTAL
    };
    metrics::counter!(name).increment(1);
}

/// 记录订单生成，`with_promo` 标识是否带优惠码
pub fn record_order_finalized(with_promo: bool) {
    metrics::counter!(ORDERS_FINALIZED_TOTAL, "with_promo" => with_promo.to_string()).increment(1);
}

pub fn record_birthday_redeemed() {
    metrics::counter!(BIRTHDAY_REDEEMED_TOTAL).increment(1);
}

/// 记录一次回退到本地快照的读取
pub fn record_cache_fallback(snapshot: &'static str) {
    metrics::counter!(CACHE_FALLBACK_TOTAL, "snapshot" => snapshot).increment(1);
}

/// 记录一次购物车同步失败
pub fn record_cart_sync_failure(operation: &'static str) {
    metrics::counter!(CART_SYNC_FAILURES_TOTAL, "operation" => operation).increment(1);
}
