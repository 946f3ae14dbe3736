//! 服务层请求与响应结构

use benefits_engine::{
    ActiveBenefit, BenefitPolicy, BenefitProfile, NewUser, ProfileUpdate, UserIdentity, UserRole,
    parse_birth_date,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::Result;

/// 注册请求
///
/// 密码只做校验，不在本系统保存
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationRequest {
    #[validate(length(min = 1, max = 100, message = "名字不能为空且不超过100个字符"))]
    pub first_name: String,
    #[serde(default)]
    pub last_name: Option<String>,
    #[validate(email(message = "邮箱格式不正确"))]
    pub email: String,
    #[validate(length(min = 6, message = "密码至少6个字符"))]
    pub password: String,
    #[validate(must_match(other = "password", message = "两次输入的密码不一致"))]
    pub confirm_password: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    /// `YYYY-MM-DD`
    #[serde(default)]
    pub birth_date: Option<String>,
    #[serde(default)]
    pub promo_code: Option<String>,
}

impl RegistrationRequest {
    /// 转换为待创建用户
    ///
    /// 出生日期格式错误返回 `InvalidDate`；生日权益按此刻的邮箱一次性确定
    pub fn into_new_user(self, policy: &BenefitPolicy) -> Result<NewUser> {
        let birth_date = match self.birth_date.as_deref() {
            Some(raw) => parse_birth_date(raw)?,
            None => None,
        };
        let email = self.email.trim().to_string();
        let birthday_benefit = policy.registration_grant(&email);

        Ok(NewUser {
            first_name: self.first_name.trim().to_string(),
            last_name: non_blank(self.last_name),
            email,
            phone: non_blank(self.phone),
            address: non_blank(self.address),
            birth_date,
            registration_promo_code: non_blank(self.promo_code),
            role: UserRole::Customer,
            birthday_benefit,
        })
    }
}

/// 资料修改请求
///
/// 注册优惠码和生日权益不可修改，因此不在此列
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdateRequest {
    #[validate(length(min = 1, max = 100, message = "名字不能为空且不超过100个字符"))]
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[validate(email(message = "邮箱格式不正确"))]
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub birth_date: Option<String>,
}

impl ProfileUpdateRequest {
    pub fn into_update(self) -> Result<ProfileUpdate> {
        let birth_date = match self.birth_date.as_deref() {
            Some(raw) => parse_birth_date(raw)?,
            None => None,
        };
        Ok(ProfileUpdate {
            first_name: self.first_name.map(|s| s.trim().to_string()),
            last_name: self.last_name,
            email: self.email.map(|s| s.trim().to_string()),
            phone: self.phone,
            address: self.address,
            birth_date,
        })
    }
}

/// 账户视图：用户、权益概况和生效权益说明
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountView {
    pub user: UserIdentity,
    pub profile: BenefitProfile,
    pub active_benefits: Vec<ActiveBenefit>,
}

impl AccountView {
    pub fn new(user: UserIdentity, profile: BenefitProfile) -> Self {
        Self {
            active_benefits: profile.active_benefits(),
            user,
            profile,
        }
    }

    /// 欢迎语
    pub fn welcome_message(&self) -> String {
        let mut message = format!("Welcome, {}!", self.user.full_name());
        if !self.active_benefits.is_empty() {
            let lines: Vec<String> = self
                .active_benefits
                .iter()
                .map(|b| format!("- {}", b.description()))
                .collect();
            message.push_str(" Your benefits:\n");
            message.push_str(&lines.join("\n"));
        }
        message
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
