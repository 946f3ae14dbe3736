//! 用户身份模型
//!
//! 只保存事实数据（邮箱、出生日期、注册时使用的优惠码、生日权益状态）。
//! 年长折扣、合作院校身份等标志每次都由 [`crate::eligibility`] 重新推导，不落库。

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::birthday::BirthdayBenefit;

/// 用户角色
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    #[default]
    Customer,
    Admin,
}

/// 用户身份
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserIdentity {
    /// 由用户目录在创建时分配，之后不可变
    pub id: i64,
    pub first_name: String,
    #[serde(default)]
    pub last_name: Option<String>,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub birth_date: Option<NaiveDate>,
    /// 注册时填写的优惠码，注册后不可变
    #[serde(default)]
    pub registration_promo_code: Option<String>,
    #[serde(default)]
    pub role: UserRole,
    #[serde(default)]
    pub birthday_benefit: BirthdayBenefit,
    pub created_at: DateTime<Utc>,
}

impl UserIdentity {
    /// 由用户目录分配主键后构造
    pub fn from_new(id: i64, new_user: NewUser, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            first_name: new_user.first_name,
            last_name: new_user.last_name,
            email: new_user.email,
            phone: new_user.phone,
            address: new_user.address,
            birth_date: new_user.birth_date,
            registration_promo_code: new_user.registration_promo_code,
            role: new_user.role,
            birthday_benefit: new_user.birthday_benefit,
            created_at,
        }
    }

    pub fn full_name(&self) -> String {
        match &self.last_name {
            Some(last) if !last.trim().is_empty() => format!("{} {}", self.first_name, last.trim()),
            _ => self.first_name.clone(),
        }
    }

    /// 邮箱是否相同（忽略大小写和首尾空白）
    pub fn has_email(&self, email: &str) -> bool {
        self.email.trim().eq_ignore_ascii_case(email.trim())
    }
}

/// 待创建的用户
///
/// 生日权益在注册时确定后随记录一起写入
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub first_name: String,
    pub last_name: Option<String>,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub registration_promo_code: Option<String>,
    pub role: UserRole,
    pub birthday_benefit: BirthdayBenefit,
}

/// 资料部分更新
///
/// 注册优惠码和生日权益不在此列：前者注册后不可变，后者只能通过兑换改变
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub birth_date: Option<NaiveDate>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// 合并到已有用户上，未提供的字段保持原值
    pub fn apply_to(&self, user: &mut UserIdentity) {
        if let Some(first_name) = &self.first_name {
            user.first_name = first_name.clone();
        }
        if let Some(last_name) = &self.last_name {
            user.last_name = Some(last_name.clone());
        }
        if let Some(email) = &self.email {
            user.email = email.trim().to_string();
        }
        if let Some(phone) = &self.phone {
            user.phone = Some(phone.clone());
        }
        if let Some(address) = &self.address {
            user.address = Some(address.clone());
        }
        if let Some(birth_date) = self.birth_date {
            user.birth_date = Some(birth_date);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> UserIdentity {
        UserIdentity::from_new(
            7,
            NewUser {
                first_name: "Ana".to_string(),
                last_name: Some("Rojas".to_string()),
                email: "ana@duoc.cl".to_string(),
                phone: None,
                address: None,
                birth_date: NaiveDate::from_ymd_opt(1990, 5, 1),
                registration_promo_code: Some("FELICES50".to_string()),
                role: UserRole::Customer,
                birthday_benefit: BirthdayBenefit::Available,
            },
            Utc::now(),
        )
    }

    #[test]
    fn test_full_name() {
        let mut user = sample_user();
        assert_eq!(user.full_name(), "Ana Rojas");
        user.last_name = Some("  ".to_string());
        assert_eq!(user.full_name(), "Ana");
    }

    #[test]
    fn test_has_email_ignores_case() {
        let user = sample_user();
        assert!(user.has_email(" ANA@Duoc.cl "));
        assert!(!user.has_email("ana@duocuc.cl"));
    }

    #[test]
    fn test_profile_update_keeps_immutable_fields() {
        let mut user = sample_user();
        let update = ProfileUpdate {
            email: Some("ana@gmail.com".to_string()),
            phone: Some("+56 9 1234 5678".to_string()),
            ..Default::default()
        };
        update.apply_to(&mut user);

        assert_eq!(user.email, "ana@gmail.com");
        assert_eq!(user.phone.as_deref(), Some("+56 9 1234 5678"));
        assert_eq!(user.first_name, "Ana");
        assert_eq!(user.id, 7);
        assert_eq!(user.birthday_benefit, BirthdayBenefit::Available);
        assert_eq!(user.registration_promo_code.as_deref(), Some("FELICES50"));
    }

    #[test]
    fn test_deserialize_partial_payload() {
        let json = r#"{
            "id": 3,
            "firstName": "Luis",
            "email": "luis@example.com",
            "createdAt": "2026-01-01T00:00:00Z"
        }"#;
        let user: UserIdentity = serde_json::from_str(json).unwrap();
        assert_eq!(user.role, UserRole::Customer);
        assert_eq!(user.birthday_benefit, BirthdayBenefit::Unavailable);
        assert!(user.birth_date.is_none());
    }
}
