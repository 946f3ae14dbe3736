//! 烘焙店端到端测试
//!
//! 测试覆盖完整的业务流程，包括：
//! - 注册与权益推导
//! - 购物车、优惠码与结账
//! - 订单查询与外部服务故障回退
//! - 外部数据导入

pub mod setup;
pub mod suites;

pub use setup::TestEnvironment;
