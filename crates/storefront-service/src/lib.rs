//! 烘焙店店面服务
//!
//! 在权益引擎外层处理与外部服务的交互和会话持久化。
//!
//! ## 核心功能
//!
//! - **账户**：注册、登录、资料修改、生日权益兑换
//! - **结账**：购物车与购物车服务同步、优惠码、生成订单
//! - **订单查询**：用户订单读穿缓存、管理端查询与改状态
//! - **数据导入**：把外部服务的用户和收据映射为领域模型
//!
//! ## 模块结构
//!
//! - `error`: 错误类型定义
//! - `models`: 外部服务交互模型
//! - `repository`: 外部服务接口与内存实现
//! - `mapping`: 外部数据映射
//! - `session`: 会话持久化装饰器
//! - `service`: 业务服务层
//! - `app`: 服务装配
//! - `cli`: 命令行

pub mod app;
pub mod cli;
pub mod error;
pub mod mapping;
pub mod models;
pub mod repository;
pub mod service;
pub mod session;

pub use app::{InMemoryBackends, Storefront};
pub use error::{Result, ServiceError};
pub use models::{OrderHistory, OrderSource, StoredCart, StoredCartLine};
pub use repository::{CartStore, OrderLedger, UserDirectory};
pub use service::{AccountService, CheckoutService, OrderHistoryService, dto};
pub use session::{OrderCache, PersistedCart, SessionUser};
