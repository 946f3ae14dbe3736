//! 统一错误处理模块
//!
//! 定义基础设施层共享的错误类型（配置、会话持久化），使用 thiserror 提供良好的错误信息。

use thiserror::Error;

/// 基础设施错误类型
#[derive(Debug, Error)]
pub enum SharedError {
    // ==================== 配置错误 ====================
    #[error("配置错误: {0}")]
    Config(#[from] config::ConfigError),

    // ==================== 会话持久化错误 ====================
    #[error("会话存储 IO 错误: {0}")]
    Io(#[from] std::io::Error),

    #[error("会话快照序列化失败: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("无效的会话键: {0}")]
    InvalidKey(String),

    // ==================== 通用错误 ====================
    #[error("内部错误: {0}")]
    Internal(String),
}

/// 错误结果类型别名
pub type Result<T> = std::result::Result<T, SharedError>;

impl SharedError {
    /// 获取错误码
    pub fn code(&self) -> &'static str {
        match self {
            Self::Config(_) => "CONFIG_ERROR",
            Self::Io(_) => "SESSION_IO_ERROR",
            Self::Serialization(_) => "SERIALIZATION_ERROR",
            Self::InvalidKey(_) => "INVALID_SESSION_KEY",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// 是否为可重试错误
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Io(_))
    }
}
