//! 账户服务
//!
//! 注册、登录、资料修改和生日权益兑换。所有权益标志都交给 [`BenefitPolicy`] 推导，
//! 本服务只负责与用户目录交互并维护会话中的当前用户。
//!
//! ## 注册流程
//!
//! 1. 参数校验 -> 2. 解析出生日期 -> 3. 按邮箱确定生日权益 -> 4. 写入用户目录
//!    -> 5. 保存为当前用户

use std::sync::Arc;

use bakery_shared::observability::metrics;
use benefits_engine::{BenefitPolicy, BenefitProfile, BirthdayBenefitState, UserIdentity};
use chrono::{Datelike, NaiveDate};
use tracing::{info, instrument, warn};
use validator::Validate;

use crate::error::Result;
use crate::repository::UserDirectory;
use crate::service::dto::{AccountView, ProfileUpdateRequest, RegistrationRequest};
use crate::session::SessionUser;

/// 账户服务
pub struct AccountService {
    directory: Arc<dyn UserDirectory>,
    policy: BenefitPolicy,
    session: SessionUser,
}

impl AccountService {
    pub fn new(directory: Arc<dyn UserDirectory>, policy: BenefitPolicy, session: SessionUser) -> Self {
        Self {
            directory,
            policy,
            session,
        }
    }

    pub fn policy(&self) -> &BenefitPolicy {
        &self.policy
    }

    /// 注册新用户并登录
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn register(&self, request: RegistrationRequest, today: NaiveDate) -> Result<AccountView> {
        request.validate()?;
        let new_user = request.into_new_user(&self.policy)?;

        let user = self.directory.create(new_user).await?;
        self.session.save(&user)?;

        let view = self.view(user, today);
        info!(
            user_id = view.user.id,
            discount_percent = view.profile.discount_percent,
            birthday_available = view.profile.birthday.available,
            "用户注册成功"
        );
        Ok(view)
    }

    /// 按邮箱登录
    ///
    /// 认证不在本系统范围内，这里只做身份查找
    #[instrument(skip(self))]
    pub async fn login(&self, email: &str, today: NaiveDate) -> Result<AccountView> {
        let user = self.directory.fetch_by_email(email).await?;
        self.session.save(&user)?;

        info!(user_id = user.id, "用户登录");
        Ok(self.view(user, today))
    }

    pub fn logout(&self) -> Result<()> {
        self.session.clear()?;
        info!("用户退出登录");
        Ok(())
    }

    pub fn current_user(&self) -> Result<Option<UserIdentity>> {
        self.session.load()
    }

    /// 修改资料
    ///
    /// 改邮箱只影响合作院校身份的展示，不会授予或收回生日权益
    #[instrument(skip(self, request))]
    pub async fn update_profile(
        &self,
        user_id: i64,
        request: ProfileUpdateRequest,
        today: NaiveDate,
    ) -> Result<AccountView> {
        request.validate()?;
        let update = request.into_update()?;

        let user = if update.is_empty() {
            self.directory.get(user_id).await?
        } else {
            self.directory.update(user_id, update).await?
        };
        self.refresh_session(&user)?;

        info!(user_id, "用户资料已更新");
        Ok(self.view(user, today))
    }

    /// 兑换生日权益
    ///
    /// 重复兑换返回 `AlreadyUsed`，用户目录中的记录不会被改动
    #[instrument(skip(self))]
    pub async fn redeem_birthday_benefit(
        &self,
        user_id: i64,
        today: NaiveDate,
    ) -> Result<BirthdayBenefitState> {
        let user = self.directory.get(user_id).await?;

        let mut benefit = user.birthday_benefit;
        if let Err(e) = benefit.redeem(today.year()) {
            warn!(user_id, error = %e, "生日权益兑换被拒绝");
            return Err(e.into());
        }

        let user = self
            .directory
            .save_birthday_benefit(user_id, benefit)
            .await?;
        self.refresh_session(&user)?;
        metrics::record_birthday_redeemed();

        info!(user_id, year = today.year(), "生日权益兑换成功");
        Ok(user.birthday_benefit.into())
    }

    pub fn profile(&self, user: &UserIdentity, today: NaiveDate) -> BenefitProfile {
        self.policy.resolve(user, today)
    }

    pub fn view(&self, user: UserIdentity, today: NaiveDate) -> AccountView {
        let profile = self.profile(&user, today);
        AccountView::new(user, profile)
    }

    /// 当前用户是同一人时更新会话快照
    fn refresh_session(&self, user: &UserIdentity) -> Result<()> {
        match self.session.load()? {
            Some(current) if current.id == user.id => self.session.save(user),
            _ => Ok(()),
        }
    }
}
