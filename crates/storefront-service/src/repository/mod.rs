//! 外部服务适配层
//!
//! - `traits`: 用户目录、购物车服务、订单账本接口
//! - `memory`: 内存实现

pub mod memory;
pub mod traits;

pub use memory::{MemoryCartStore, MemoryOrderLedger, MemoryUserDirectory};
pub use traits::{CartStore, OrderLedger, UserDirectory};

#[cfg(test)]
pub use traits::{MockCartStore, MockOrderLedger, MockUserDirectory};
