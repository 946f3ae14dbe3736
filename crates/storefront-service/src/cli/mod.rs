//! CLI 模块
//!
//! 提供命令行接口，支持以下功能：
//!
//! - `quote` - 按用户资料计算购物车金额
//! - `demo` - 在内存版外部服务上演示完整购物流程
//! - `import` - 导入外部服务导出的用户和收据
//!
//! # 使用示例
//!
//! ```bash
//! # 计算金额
//! storefront quote --line 10000 --birth-date 1960-01-01 --promo DESCUENTO20
//!
//! # 演示流程
//! storefront demo --email cliente@duoc.cl
//!
//! # 导入数据
//! storefront import -f export.json
//! ```

pub mod commands;
pub mod runner;

pub use commands::{Cli, Commands, QuoteLine};
pub use runner::{CommandRunner, QuoteRequest};
