//! 店面服务错误类型
//!
//! 包装权益引擎的业务错误和基础设施错误，另外区分外部服务不可用

use bakery_shared::SharedError;
use benefits_engine::BenefitsError;
use thiserror::Error;

/// 店面服务错误类型
#[derive(Debug, Error)]
pub enum ServiceError {
    // === 业务错误 ===
    #[error(transparent)]
    Benefits(#[from] BenefitsError),

    #[error("参数校验失败: {0}")]
    Validation(String),

    // === 系统错误 ===
    #[error("会话存储错误: {0}")]
    Session(#[from] SharedError),

    #[error("{service} 服务不可用: {message}")]
    Unavailable {
        service: &'static str,
        message: String,
    },
}

/// 店面服务 Result 类型别名
pub type Result<T> = std::result::Result<T, ServiceError>;

impl ServiceError {
    pub fn unavailable(service: &'static str, message: impl Into<String>) -> Self {
        Self::Unavailable {
            service,
            message: message.into(),
        }
    }

    /// 检查是否为可重试的错误
    ///
    /// 本服务不自动重试，由调用方决定
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Unavailable { .. })
    }

    /// 检查是否为业务错误（非系统错误）
    pub fn is_business_error(&self) -> bool {
        match self {
            Self::Benefits(e) => e.is_business_error(),
            Self::Validation(_) => true,
            Self::Session(_) | Self::Unavailable { .. } => false,
        }
    }

    /// 获取错误码（用于界面提示）
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Benefits(e) => e.error_code(),
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Session(e) => e.code(),
            Self::Unavailable { .. } => "SERVICE_UNAVAILABLE",
        }
    }

    /// 取出内部的权益引擎错误
    pub fn as_benefits(&self) -> Option<&BenefitsError> {
        match self {
            Self::Benefits(e) => Some(e),
            _ => None,
        }
    }
}

impl From<validator::ValidationErrors> for ServiceError {
    fn from(errors: validator::ValidationErrors) -> Self {
        Self::Validation(errors.to_string())
    }
}
