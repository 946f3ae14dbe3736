//! 权益引擎错误类型
//!
//! 所有错误都是可恢复的业务错误，由调用方（界面）决定如何提示用户

use thiserror::Error;

/// 权益引擎错误类型
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BenefitsError {
    // === 用户资料相关错误 ===
    #[error("无效的日期: {0}")]
    InvalidDate(String),

    #[error("邮箱已被注册: {0}")]
    DuplicateEmail(String),

    #[error("记录不存在: {entity} {key}")]
    NotFound { entity: &'static str, key: String },

    // === 优惠相关错误 ===
    #[error("无效的优惠码: {0}")]
    InvalidPromoCode(String),

    #[error("生日权益已在 {year_used} 年使用")]
    AlreadyUsed { year_used: i32 },

    #[error("用户没有生日权益")]
    BenefitUnavailable,

    // === 订单相关错误 ===
    #[error("购物车为空，无法生成订单")]
    EmptyCart,

    #[error("参数校验失败: {0}")]
    Validation(String),
}

/// 权益引擎 Result 类型别名
pub type Result<T> = std::result::Result<T, BenefitsError>;

impl BenefitsError {
    pub fn not_found(entity: &'static str, key: impl ToString) -> Self {
        Self::NotFound {
            entity,
            key: key.to_string(),
        }
    }

    /// 权益引擎不做 I/O，错误都不可重试
    pub fn is_retryable(&self) -> bool {
        false
    }

    /// 是否为面向用户的业务错误
    ///
    /// `Validation` 来自策略配置错误，属于部署问题
    pub fn is_business_error(&self) -> bool {
        !matches!(self, Self::Validation(_))
    }

    /// 获取错误码（用于界面提示映射）
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidDate(_) => "INVALID_DATE",
            Self::DuplicateEmail(_) => "DUPLICATE_EMAIL",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::InvalidPromoCode(_) => "INVALID_PROMO_CODE",
            Self::AlreadyUsed { .. } => "ALREADY_USED",
            Self::BenefitUnavailable => "BENEFIT_UNAVAILABLE",
            Self::EmptyCart => "EMPTY_CART",
            Self::Validation(_) => "VALIDATION_ERROR",
        }
    }
}
