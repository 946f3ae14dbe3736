//! 生日权益状态机
//!
//! 合作院校用户在注册时获得一次性生日赠品权益，只能使用一次，不可续期。
//!
//! ```text
//! Unavailable ──(注册时为合作院校用户)──> Available ──(兑换)──> Used { year_used }
//! ```
//!
//! `Used` 是终态。用枚举表达状态，`used ⇒ available` 与 `used ⇒ year_used` 由构造保证。

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{BenefitsError, Result};

/// 生日权益状态
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum BirthdayBenefit {
    /// 未获得 - 注册时不是合作院校用户
    #[default]
    Unavailable,
    /// 可用 - 已获得尚未兑换
    Available,
    /// 已使用 - 记录兑换年份
    Used { year_used: i32 },
}

impl BirthdayBenefit {
    /// 注册时授予
    ///
    /// 这是唯一能进入 `Available` 的途径，注册之后邮箱变化不会影响该结果
    pub fn grant_at_registration(is_partner_member: bool) -> Self {
        if is_partner_member {
            Self::Available
        } else {
            Self::Unavailable
        }
    }

    /// 兑换生日权益
    ///
    /// - `Available` -> `Used { year }`
    /// - `Used` 返回 `AlreadyUsed`，状态和年份保持不变
    /// - `Unavailable` 返回 `BenefitUnavailable`
    pub fn redeem(&mut self, year: i32) -> Result<()> {
        match *self {
            Self::Available => {
                *self = Self::Used { year_used: year };
                info!(year, "生日权益已兑换");
                Ok(())
            }
            Self::Used { year_used } => {
                warn!(year_used, "生日权益重复兑换");
                Err(BenefitsError::AlreadyUsed { year_used })
            }
            Self::Unavailable => Err(BenefitsError::BenefitUnavailable),
        }
    }

    /// 是否曾获得过（含已使用）
    pub fn available(&self) -> bool {
        !matches!(self, Self::Unavailable)
    }

    pub fn used(&self) -> bool {
        matches!(self, Self::Used { .. })
    }

    pub fn year_used(&self) -> Option<i32> {
        match self {
            Self::Used { year_used } => Some(*year_used),
            _ => None,
        }
    }

    /// 是否还能兑换
    pub fn redeemable(&self) -> bool {
        matches!(self, Self::Available)
    }
}

/// 生日权益的扁平视图，供界面展示
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BirthdayBenefitState {
    pub available: bool,
    pub used: bool,
    pub year_used: Option<i32>,
}

impl From<BirthdayBenefit> for BirthdayBenefitState {
    fn from(benefit: BirthdayBenefit) -> Self {
        Self {
            available: benefit.available(),
            used: benefit.used(),
            year_used: benefit.year_used(),
        }
    }
}
