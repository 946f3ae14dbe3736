//! 内存实现
//!
//! 基于 [`MemoryStore`] 的外部服务替身，用于命令行演示和测试。
//! 每个实现都带一个在线开关，关闭后所有调用返回 `Unavailable`，用来模拟服务故障。

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};

use async_trait::async_trait;
use bakery_shared::MemoryStore;
use benefits_engine::{
    BenefitsError, BirthdayBenefit, NewUser, Order, OrderDraft, OrderStatus, Product,
    ProfileUpdate, UserIdentity,
};
use chrono::Utc;
use tracing::{debug, info};

use crate::error::{Result, ServiceError};
use crate::models::{StoredCart, StoredCartLine};
use crate::repository::traits::{CartStore, OrderLedger, UserDirectory};

/// 在线开关，克隆后共享状态
#[derive(Debug, Clone)]
struct Availability {
    service: &'static str,
    online: Arc<AtomicBool>,
}

impl Availability {
    fn new(service: &'static str) -> Self {
        Self {
            service,
            online: Arc::new(AtomicBool::new(true)),
        }
    }

    fn set(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
        info!(service = self.service, online, "模拟服务状态切换");
    }

    fn check(&self) -> Result<()> {
        if self.online.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(ServiceError::unavailable(self.service, "服务已离线"))
        }
    }
}

// ==================== 用户目录 ====================

/// 内存用户目录
#[derive(Debug, Clone)]
pub struct MemoryUserDirectory {
    users: MemoryStore<UserIdentity>,
    availability: Availability,
}

impl Default for MemoryUserDirectory {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryUserDirectory {
    pub fn new() -> Self {
        Self {
            users: MemoryStore::new(),
            availability: Availability::new("user-directory"),
        }
    }

    pub fn set_online(&self, online: bool) {
        self.availability.set(online);
    }

    /// 直接写入已有记录（导入用）
    ///
    /// ID 已存在时返回 `Validation`，邮箱冲突时返回 `DuplicateEmail`，已有记录不会被覆盖
    pub fn insert(&self, user: UserIdentity) -> Result<()> {
        if self.users.contains(user.id) {
            return Err(ServiceError::Validation(format!("用户 ID 已存在: {}", user.id)));
        }
        if self.email_taken(&user.email, None) {
            return Err(BenefitsError::DuplicateEmail(user.email).into());
        }
        self.users.insert(user.id, user);
        Ok(())
    }

    pub fn count(&self) -> usize {
        self.users.count()
    }

    fn email_taken(&self, email: &str, except_id: Option<i64>) -> bool {
        self.users
            .find(|u| u.has_email(email) && Some(u.id) != except_id)
            .is_some()
    }

    fn require(&self, id: i64) -> Result<UserIdentity> {
        self.users
            .get(id)
            .ok_or_else(|| BenefitsError::not_found("user", id).into())
    }
}

#[async_trait]
impl UserDirectory for MemoryUserDirectory {
    async fn create(&self, user: NewUser) -> Result<UserIdentity> {
        self.availability.check()?;

        if self.email_taken(&user.email, None) {
            return Err(BenefitsError::DuplicateEmail(user.email.trim().to_string()).into());
        }

        let id = self.users.next_id();
        let identity = UserIdentity::from_new(id, user, Utc::now());
        self.users.insert(id, identity.clone());
        debug!(user_id = id, "用户已创建");
        Ok(identity)
    }

    async fn fetch_by_email(&self, email: &str) -> Result<UserIdentity> {
        self.availability.check()?;
        self.users
            .find(|u| u.has_email(email))
            .ok_or_else(|| BenefitsError::not_found("user", email.trim()).into())
    }

    async fn get(&self, id: i64) -> Result<UserIdentity> {
        self.availability.check()?;
        self.require(id)
    }

    async fn update(&self, id: i64, update: ProfileUpdate) -> Result<UserIdentity> {
        self.availability.check()?;
        self.require(id)?;

        if let Some(email) = &update.email {
            if self.email_taken(email, Some(id)) {
                return Err(BenefitsError::DuplicateEmail(email.trim().to_string()).into());
            }
        }

        self.users
            .update(id, |user| update.apply_to(user))
            .ok_or_else(|| BenefitsError::not_found("user", id).into())
    }

    async fn save_birthday_benefit(
        &self,
        id: i64,
        benefit: BirthdayBenefit,
    ) -> Result<UserIdentity> {
        self.availability.check()?;
        self.users
            .update(id, |user| user.birthday_benefit = benefit)
            .ok_or_else(|| BenefitsError::not_found("user", id).into())
    }

    async fn list(&self) -> Result<Vec<UserIdentity>> {
        self.availability.check()?;
        Ok(self.users.list())
    }
}

// ==================== 购物车服务 ====================

/// 内存购物车服务
///
/// 行单价取自商品目录，同一商品合并到已有行
#[derive(Debug, Clone)]
pub struct MemoryCartStore {
    catalog: MemoryStore<Product>,
    carts: MemoryStore<StoredCart>,
    line_sequence: Arc<AtomicI64>,
    availability: Availability,
}

impl Default for MemoryCartStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryCartStore {
    pub fn new() -> Self {
        Self {
            catalog: MemoryStore::new(),
            carts: MemoryStore::new(),
            line_sequence: Arc::new(AtomicI64::new(0)),
            availability: Availability::new("cart-store"),
        }
    }

    /// 用给定商品初始化目录
    pub fn with_catalog(products: impl IntoIterator<Item = Product>) -> Self {
        let store = Self::new();
        for product in products {
            store.add_product(product);
        }
        store
    }

    pub fn add_product(&self, product: Product) {
        self.catalog.insert(product.id, product);
    }

    pub fn product(&self, id: i64) -> Option<Product> {
        self.catalog.get(id)
    }

    pub fn products(&self) -> Vec<Product> {
        self.catalog.list()
    }

    pub fn set_online(&self, online: bool) {
        self.availability.set(online);
    }

    fn require(&self, cart_id: i64) -> Result<StoredCart> {
        self.carts
            .get(cart_id)
            .ok_or_else(|| BenefitsError::not_found("cart", cart_id).into())
    }
}

#[async_trait]
impl CartStore for MemoryCartStore {
    async fn create(&self, user_id: i64) -> Result<StoredCart> {
        self.availability.check()?;

        let id = self.carts.next_id();
        let cart = StoredCart {
            id,
            user_id,
            lines: Vec::new(),
        };
        self.carts.insert(id, cart.clone());
        debug!(cart_id = id, user_id, "购物车已创建");
        Ok(cart)
    }

    async fn add_line(&self, cart_id: i64, product_id: i64, quantity: u32) -> Result<StoredCart> {
        self.availability.check()?;
        self.require(cart_id)?;
        let product = self
            .catalog
            .get(product_id)
            .ok_or_else(|| BenefitsError::not_found("product", product_id))?;

        let line_sequence = Arc::clone(&self.line_sequence);
        self.carts
            .update(cart_id, move |cart| {
                match cart.lines.iter_mut().find(|l| l.product_id == product_id) {
                    Some(line) => line.quantity = line.quantity.saturating_add(quantity),
                    None => cart.lines.push(StoredCartLine {
                        id: line_sequence.fetch_add(1, Ordering::SeqCst) + 1,
                        product_id,
                        quantity,
                        unit_price: product.price,
                    }),
                }
            })
            .ok_or_else(|| BenefitsError::not_found("cart", cart_id).into())
    }

    async fn remove_line(&self, cart_id: i64, line_id: i64) -> Result<StoredCart> {
        self.availability.check()?;
        let cart = self.require(cart_id)?;
        if !cart.lines.iter().any(|l| l.id == line_id) {
            return Err(BenefitsError::not_found("cart line", line_id).into());
        }

        self.carts
            .update(cart_id, |cart| cart.lines.retain(|l| l.id != line_id))
            .ok_or_else(|| BenefitsError::not_found("cart", cart_id).into())
    }

    async fn get(&self, cart_id: i64) -> Result<StoredCart> {
        self.availability.check()?;
        self.require(cart_id)
    }

    async fn clear(&self, cart_id: i64) -> Result<StoredCart> {
        self.availability.check()?;
        self.carts
            .update(cart_id, |cart| cart.lines.clear())
            .ok_or_else(|| BenefitsError::not_found("cart", cart_id).into())
    }
}

// ==================== 订单账本 ====================

/// 内存订单账本，新订单状态为 `Pending`
#[derive(Debug, Clone)]
pub struct MemoryOrderLedger {
    orders: MemoryStore<Order>,
    availability: Availability,
}

impl Default for MemoryOrderLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryOrderLedger {
    pub fn new() -> Self {
        Self {
            orders: MemoryStore::new(),
            availability: Availability::new("order-ledger"),
        }
    }

    pub fn set_online(&self, online: bool) {
        self.availability.set(online);
    }

    /// 直接写入已有订单（导入用）
    pub fn insert(&self, order: Order) {
        self.orders.insert(order.id, order);
    }

    pub fn count(&self) -> usize {
        self.orders.count()
    }
}

#[async_trait]
impl OrderLedger for MemoryOrderLedger {
    async fn finalize(&self, cart_id: i64, draft: OrderDraft) -> Result<Order> {
        self.availability.check()?;
        if draft.lines.is_empty() {
            return Err(BenefitsError::EmptyCart.into());
        }

        let id = self.orders.next_id();
        let mut order = Order::from_draft(id, draft, OrderStatus::Pending, Utc::now());
        order.cart_id = Some(cart_id);
        self.orders.insert(id, order.clone());

        info!(order_id = id, cart_id, total = order.totals.total, "订单已生成");
        Ok(order)
    }

    async fn list_by_user(&self, user_id: i64) -> Result<Vec<Order>> {
        self.availability.check()?;
        Ok(self.orders.list_by(|o| o.user_id == Some(user_id)))
    }

    async fn list_all(&self) -> Result<Vec<Order>> {
        self.availability.check()?;
        Ok(self.orders.list())
    }

    async fn get(&self, order_id: i64) -> Result<Order> {
        self.availability.check()?;
        self.orders
            .get(order_id)
            .ok_or_else(|| BenefitsError::not_found("order", order_id).into())
    }

    async fn update_status(&self, order_id: i64, status: OrderStatus) -> Result<Order> {
        self.availability.check()?;
        self.orders
            .update(order_id, |order| order.override_status(status))
            .ok_or_else(|| BenefitsError::not_found("order", order_id).into())
    }
}
