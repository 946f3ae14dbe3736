//! 会话持久化装饰器
//!
//! 把当前用户、购物车和订单列表快照写入 [`SessionStore`]，进程重启后可以恢复。
//! 引擎本身不感知持久化：购物车的每次修改都经由 [`PersistedCart::mutate`] 完成并落盘。

use std::sync::Arc;

use bakery_shared::SessionStore;
use bakery_shared::session::{load_typed, save_typed};
use benefits_engine::{CartSession, Order, UserIdentity};
use tracing::debug;

use crate::error::Result;

const CURRENT_USER_KEY: &str = "current-user";
const CART_KEY: &str = "cart";

fn orders_key(user_id: i64) -> String {
    format!("orders-{}", user_id)
}

/// 当前登录用户快照
#[derive(Clone)]
pub struct SessionUser {
    store: Arc<dyn SessionStore>,
}

impl SessionUser {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }

    pub fn load(&self) -> Result<Option<UserIdentity>> {
        Ok(load_typed(self.store.as_ref(), CURRENT_USER_KEY)?)
    }

    pub fn save(&self, user: &UserIdentity) -> Result<()> {
        save_typed(self.store.as_ref(), CURRENT_USER_KEY, user)?;
        debug!(user_id = user.id, "当前用户已保存");
        Ok(())
    }

    pub fn clear(&self) -> Result<()> {
        Ok(self.store.remove(CURRENT_USER_KEY)?)
    }
}

/// 持久化的购物车会话
///
/// 打开时从快照恢复，快照损坏或不存在时从空购物车开始
pub struct PersistedCart {
    store: Arc<dyn SessionStore>,
    session: CartSession,
}

impl PersistedCart {
    pub fn open(store: Arc<dyn SessionStore>) -> Result<Self> {
        let session = load_typed::<CartSession>(store.as_ref(), CART_KEY)?.unwrap_or_default();
        debug!(
            cart_id = ?session.cart_id,
            lines = session.lines().len(),
            "购物车会话已恢复"
        );
        Ok(Self { store, session })
    }

    pub fn session(&self) -> &CartSession {
        &self.session
    }

    /// 修改购物车并写入快照
    ///
    /// 闭包的返回值原样返回；闭包返回业务错误时购物车本身保持不变，快照照常写入
    pub fn mutate<R>(&mut self, f: impl FnOnce(&mut CartSession) -> R) -> Result<R> {
        let result = f(&mut self.session);
        self.persist()?;
        Ok(result)
    }

    pub fn persist(&self) -> Result<()> {
        Ok(save_typed(self.store.as_ref(), CART_KEY, &self.session)?)
    }

    /// 删除快照并重置为空购物车
    pub fn discard(&mut self) -> Result<()> {
        self.session = CartSession::default();
        Ok(self.store.remove(CART_KEY)?)
    }
}

/// 订单列表快照，订单服务不可用时作为回退
#[derive(Clone)]
pub struct OrderCache {
    store: Arc<dyn SessionStore>,
}

impl OrderCache {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }

    pub fn load(&self, user_id: i64) -> Result<Option<Vec<Order>>> {
        Ok(load_typed(self.store.as_ref(), &orders_key(user_id))?)
    }

    pub fn save(&self, user_id: i64, orders: &[Order]) -> Result<()> {
        Ok(save_typed(self.store.as_ref(), &orders_key(user_id), &orders)?)
    }
}
