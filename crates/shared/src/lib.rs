//! 共享库
//!
//! 包含各 crate 共用的配置、错误处理、可观测性、内存存储和会话持久化等基础设施代码。

pub mod config;
pub mod error;
pub mod observability;
pub mod session;
pub mod store;

pub use config::{AppConfig, BenefitsConfig, SessionConfig};
pub use error::{Result, SharedError};
pub use session::{FileSessionStore, MemorySessionStore, SessionStore};
pub use store::MemoryStore;
