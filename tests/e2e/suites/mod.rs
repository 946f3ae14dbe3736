//! 测试套件

pub mod import;
pub mod shopping;
