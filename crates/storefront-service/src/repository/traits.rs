//! 外部服务接口定义
//!
//! 服务层依赖抽象而非具体实现，支持 mock 测试。所有调用都可能挂起，
//! 失败以 `ServiceError::Unavailable` 返回，本服务不做自动重试。

use async_trait::async_trait;
use benefits_engine::{
    BirthdayBenefit, NewUser, Order, OrderDraft, OrderStatus, ProfileUpdate, UserIdentity,
};

use crate::error::Result;
use crate::models::StoredCart;

/// 用户目录
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// 创建用户，邮箱已存在时返回 `DuplicateEmail`
    async fn create(&self, user: NewUser) -> Result<UserIdentity>;

    /// 按邮箱查找（忽略大小写），不存在时返回 `NotFound`
    async fn fetch_by_email(&self, email: &str) -> Result<UserIdentity>;

    async fn get(&self, id: i64) -> Result<UserIdentity>;

    /// 部分更新资料
    async fn update(&self, id: i64, update: ProfileUpdate) -> Result<UserIdentity>;

    /// 写入生日权益状态
    async fn save_birthday_benefit(
        &self,
        id: i64,
        benefit: BirthdayBenefit,
    ) -> Result<UserIdentity>;

    async fn list(&self) -> Result<Vec<UserIdentity>>;
}

/// 购物车服务
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CartStore: Send + Sync {
    async fn create(&self, user_id: i64) -> Result<StoredCart>;

    /// 加入商品，同一商品合并到已有行
    async fn add_line(&self, cart_id: i64, product_id: i64, quantity: u32) -> Result<StoredCart>;

    async fn remove_line(&self, cart_id: i64, line_id: i64) -> Result<StoredCart>;

    async fn get(&self, cart_id: i64) -> Result<StoredCart>;

    /// 清空行，购物车本身保留
    async fn clear(&self, cart_id: i64) -> Result<StoredCart>;
}

/// 订单账本
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OrderLedger: Send + Sync {
    /// 由购物车生成订单
    ///
    /// 金额由调用方按本地规则算好放在草稿中，账本只分配 ID 和初始状态
    async fn finalize(&self, cart_id: i64, draft: OrderDraft) -> Result<Order>;

    async fn list_by_user(&self, user_id: i64) -> Result<Vec<Order>>;

    /// 管理端：全部订单
    async fn list_all(&self) -> Result<Vec<Order>>;

    async fn get(&self, order_id: i64) -> Result<Order>;

    /// 管理端：修改状态
    async fn update_status(&self, order_id: i64, status: OrderStatus) -> Result<Order>;
}
