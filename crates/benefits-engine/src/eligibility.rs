//! 权益资格判定
//!
//! 根据用户身份确定性地推导三类权益标志，所有调用点（注册、资料编辑、结账）都走这里：
//!
//! - **年长折扣**：按日历年/月/日比较得到的周岁 >= 阈值（默认 50）
//! - **合作院校身份**：小写邮箱以 `@<合作域名>` 结尾
//! - **终身优惠**：注册时填写的优惠码（去空白、大写）等于保留的终身优惠码
//!
//! 折扣百分比互斥且年长优先：年长 50%，否则终身优惠 10%，否则 0。
//! 生日权益只在注册时根据合作院校身份授予一次，见 [`BirthdayBenefit`]。

use bakery_shared::config::BenefitsConfig;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{BenefitsError, Result};
use crate::models::{BirthdayBenefit, BirthdayBenefitState, UserIdentity};

const DEFAULT_SENIOR_AGE: u32 = 50;
const DEFAULT_SENIOR_PERCENT: u8 = 50;
const DEFAULT_LIFETIME_CODE: &str = "FELICES50";
const DEFAULT_LIFETIME_PERCENT: u8 = 10;
const DEFAULT_PARTNER_DOMAINS: [&str; 2] = ["duoc.cl", "duocuc.cl"];

/// 优惠码规范化：去首尾空白并转大写
pub fn normalize_code(raw: &str) -> String {
    raw.trim().to_uppercase()
}

/// 解析 `YYYY-MM-DD` 格式的出生日期
///
/// 空字符串视为未填写，返回 `Ok(None)`；格式错误返回 `InvalidDate`，
/// 调用方应在注册输入阶段拒绝
pub fn parse_birth_date(raw: &str) -> Result<Option<NaiveDate>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map(Some)
        .map_err(|_| BenefitsError::InvalidDate(raw.to_string()))
}

/// 计算周岁
///
/// 用日历比较而不是毫秒差，生日当天即满岁。出生日期晚于 `today` 时按 0 岁计
pub fn age_on(birth_date: NaiveDate, today: NaiveDate) -> u32 {
    let mut age = today.year() - birth_date.year();
    if (today.month(), today.day()) < (birth_date.month(), birth_date.day()) {
        age -= 1;
    }
    u32::try_from(age).unwrap_or(0)
}

/// 当前本地日期
pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// 权益策略
///
/// 由配置构造，构造时校验百分比范围并规范化优惠码和域名
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BenefitPolicy {
    senior_age_threshold: u32,
    senior_discount_percent: u8,
    lifetime_promo_code: String,
    lifetime_discount_percent: u8,
    partner_domains: Vec<String>,
}

impl Default for BenefitPolicy {
    fn default() -> Self {
        Self {
            senior_age_threshold: DEFAULT_SENIOR_AGE,
            senior_discount_percent: DEFAULT_SENIOR_PERCENT,
            lifetime_promo_code: DEFAULT_LIFETIME_CODE.to_string(),
            lifetime_discount_percent: DEFAULT_LIFETIME_PERCENT,
            partner_domains: DEFAULT_PARTNER_DOMAINS
                .iter()
                .map(|d| d.to_string())
                .collect(),
        }
    }
}

impl BenefitPolicy {
    pub fn from_config(config: &BenefitsConfig) -> Result<Self> {
        for (name, percent) in [
            ("senior_discount_percent", config.senior_discount_percent),
            ("lifetime_discount_percent", config.lifetime_discount_percent),
        ] {
            if percent > 100 {
                return Err(BenefitsError::Validation(format!(
                    "{} 必须在 0-100 之间，实际为 {}",
                    name, percent
                )));
            }
        }

        let lifetime_promo_code = normalize_code(&config.lifetime_promo_code);
        if lifetime_promo_code.is_empty() {
            return Err(BenefitsError::Validation(
                "lifetime_promo_code 不能为空".to_string(),
            ));
        }

        let partner_domains = config
            .partner_domains
            .iter()
            .map(|d| d.trim().trim_start_matches('@').to_lowercase())
            .filter(|d| !d.is_empty())
            .collect();

        Ok(Self {
            senior_age_threshold: config.senior_age_threshold,
            senior_discount_percent: config.senior_discount_percent,
            lifetime_promo_code,
            lifetime_discount_percent: config.lifetime_discount_percent,
            partner_domains,
        })
    }

    pub fn lifetime_promo_code(&self) -> &str {
        &self.lifetime_promo_code
    }

    pub fn partner_domains(&self) -> &[String] {
        &self.partner_domains
    }

    /// 未填写出生日期按 0 岁处理，不享受年长折扣
    pub fn is_senior(&self, birth_date: Option<NaiveDate>, today: NaiveDate) -> bool {
        birth_date.is_some_and(|b| age_on(b, today) >= self.senior_age_threshold)
    }

    pub fn is_partner_email(&self, email: &str) -> bool {
        let email = email.trim().to_lowercase();
        self.partner_domains
            .iter()
            .any(|domain| email.ends_with(&format!("@{}", domain)))
    }

    /// 只用于注册时填写的优惠码；结账时输入同一个码不会获得终身资格
    pub fn is_lifetime_code(&self, registration_code: Option<&str>) -> bool {
        registration_code.is_some_and(|code| normalize_code(code) == self.lifetime_promo_code)
    }

    /// 折扣档位互斥，年长优先
    pub fn discount_percent(&self, is_senior: bool, has_lifetime_promo: bool) -> u8 {
        if is_senior {
            self.senior_discount_percent
        } else if has_lifetime_promo {
            self.lifetime_discount_percent
        } else {
            0
        }
    }

    /// 注册时授予生日权益
    pub fn registration_grant(&self, email: &str) -> BirthdayBenefit {
        BirthdayBenefit::grant_at_registration(self.is_partner_email(email))
    }

    /// 推导用户在 `today` 这一天的权益概况
    pub fn resolve(&self, user: &UserIdentity, today: NaiveDate) -> BenefitProfile {
        let age = user.birth_date.map(|b| age_on(b, today)).unwrap_or(0);
        let is_senior = self.is_senior(user.birth_date, today);
        let is_partner_member = self.is_partner_email(&user.email);
        let has_lifetime_promo = self.is_lifetime_code(user.registration_promo_code.as_deref());
        let discount_percent = self.discount_percent(is_senior, has_lifetime_promo);

        debug!(
            user_id = user.id,
            age,
            is_senior,
            is_partner_member,
            has_lifetime_promo,
            discount_percent,
            "权益资格判定完成"
        );

        BenefitProfile {
            age,
            is_senior,
            is_partner_member,
            has_lifetime_promo,
            discount_percent,
            birthday: user.birthday_benefit.into(),
        }
    }
}

/// 用户权益概况（推导结果，不落库）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BenefitProfile {
    pub age: u32,
    pub is_senior: bool,
    pub is_partner_member: bool,
    pub has_lifetime_promo: bool,
    /// 用户资料对应的常驻折扣
    pub discount_percent: u8,
    pub birthday: BirthdayBenefitState,
}

/// 当前生效的权益，用于欢迎语和账户页展示
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ActiveBenefit {
    SeniorDiscount { percent: u8 },
    LifetimeDiscount { percent: u8 },
    BirthdayItemAvailable,
    BirthdayItemUsed { year: i32 },
}

impl ActiveBenefit {
    pub fn description(&self) -> String {
        match self {
            Self::SeniorDiscount { percent } => {
                format!("{}% senior discount on every product", percent)
            }
            Self::LifetimeDiscount { percent } => {
                format!("{}% lifetime discount from your registration code", percent)
            }
            Self::BirthdayItemAvailable => {
                "Free birthday cake for partner institution members (single use)".to_string()
            }
            Self::BirthdayItemUsed { year } => format!("Birthday cake benefit used in {}", year),
        }
    }
}

impl BenefitProfile {
    pub fn has_benefits(&self) -> bool {
        self.discount_percent > 0 || self.birthday.available
    }

    /// 列出生效的权益
    ///
    /// 终身折扣只在非年长用户上展示，两档折扣互斥
    pub fn active_benefits(&self) -> Vec<ActiveBenefit> {
        let mut benefits = Vec::new();

        if self.is_senior {
            benefits.push(ActiveBenefit::SeniorDiscount {
                percent: self.discount_percent,
            });
        } else if self.has_lifetime_promo {
            benefits.push(ActiveBenefit::LifetimeDiscount {
                percent: self.discount_percent,
            });
        }

        match (self.birthday.available, self.birthday.year_used) {
            (true, Some(year)) => benefits.push(ActiveBenefit::BirthdayItemUsed { year }),
            (true, None) => benefits.push(ActiveBenefit::BirthdayItemAvailable),
            _ => {}
        }

        benefits
    }
}
