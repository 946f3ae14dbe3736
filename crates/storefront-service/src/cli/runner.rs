//! 命令执行器
//!
//! 负责执行各 CLI 子命令的具体逻辑，结果以 JSON 输出到标准输出。

use std::io::Write as _;
use std::path::Path;

use anyhow::{Context, Result, bail};
use bakery_shared::AppConfig;
use benefits_engine::eligibility::today;
use benefits_engine::{
    BenefitPolicy, BenefitsError, CartSession, NewUser, Product, PromoRegistry, UserIdentity,
    UserRole, parse_birth_date,
};
use chrono::{NaiveDate, Utc};
use futures::future::try_join_all;
use serde_json::{Value, json};
use tracing::{info, warn};

use crate::app::{InMemoryBackends, Storefront, sample_catalog};
use crate::cli::commands::QuoteLine;
use crate::error::ServiceError;
use crate::mapping::{ImportPayload, map_receipt, map_user};
use crate::service::dto::RegistrationRequest;

/// 命令执行器
///
/// 持有加载好的配置，各命令按需构造权益策略和内存版外部服务。
pub struct CommandRunner {
    config: AppConfig,
}

/// `quote` 命令参数
#[derive(Debug, Clone, Default)]
pub struct QuoteRequest {
    pub lines: Vec<QuoteLine>,
    pub promo: Option<String>,
    pub email: Option<String>,
    pub birth_date: Option<String>,
    pub registration_code: Option<String>,
    pub today: Option<String>,
}

impl CommandRunner {
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    /// 执行 quote 命令
    pub async fn run_quote(&self, request: QuoteRequest) -> Result<()> {
        let report = self.quote(request)?;
        print_json(&report)
    }

    /// 执行 demo 命令
    pub async fn run_demo(&self, email: &str, birth_date: &str) -> Result<()> {
        let report = self.demo(email, birth_date, today()).await?;
        print_json(&report)
    }

    /// 执行 import 命令
    pub async fn run_import(&self, file: &Path) -> Result<()> {
        let raw = tokio::fs::read_to_string(file)
            .await
            .with_context(|| format!("读取导入文件失败: {}", file.display()))?;
        let payload: ImportPayload =
            serde_json::from_str(&raw).context("导入文件不是合法的 JSON")?;

        let report = self.import(payload, today()).await?;
        print_json(&report)
    }

    /// 计算一个临时购物车的金额
    ///
    /// 用户资料只用于推导折扣，不会写入任何存储
    pub fn quote(&self, request: QuoteRequest) -> Result<Value> {
        let policy = BenefitPolicy::from_config(&self.config.benefits)?;
        let promos = PromoRegistry::from_config(&self.config.promo_codes)?;

        let as_of = match request.today.as_deref() {
            Some(raw) => parse_birth_date(raw)?.unwrap_or_else(today),
            None => today(),
        };
        let birth_date = match request.birth_date.as_deref() {
            Some(raw) => parse_birth_date(raw)?,
            None => None,
        };
        let email = request.email.unwrap_or_default();

        let user = UserIdentity::from_new(
            0,
            NewUser {
                first_name: "Cliente".to_string(),
                last_name: None,
                birthday_benefit: policy.registration_grant(&email),
                email,
                phone: None,
                address: None,
                birth_date,
                registration_promo_code: request.registration_code,
                role: UserRole::Customer,
            },
            Utc::now(),
        );
        let profile = policy.resolve(&user, as_of);

        let mut cart = CartSession::new();
        for (index, line) in request.lines.iter().enumerate() {
            let id = i64::try_from(index).unwrap_or(i64::MAX) + 1;
            let product = Product {
                id,
                name: format!("Línea {}", id),
                price: line.unit_price,
            };
            cart.add_product(&product, line.quantity);
        }

        if let Some(code) = request.promo.as_deref() {
            if let Err(e) = cart.apply_promo_code(code, &promos) {
                bail!("{}", e);
            }
        }

        let totals = cart.totals(profile.discount_percent);
        info!(
            subtotal = totals.subtotal,
            total = totals.total,
            discount_percent = profile.discount_percent,
            "金额计算完成"
        );

        Ok(json!({
            "today": as_of,
            "profile": profile,
            "activeBenefits": profile
                .active_benefits()
                .iter()
                .map(|b| b.description())
                .collect::<Vec<_>>(),
            "promo": cart.promo(),
            "lines": cart.lines(),
            "totals": totals,
        }))
    }

    /// 演示完整流程
    ///
    /// 注册、加购、优惠码、结账、订单查询、生日权益兑换，以及订单服务下线后的快照回退
    pub async fn demo(&self, email: &str, birth_date: &str, today: NaiveDate) -> Result<Value> {
        let backends = InMemoryBackends::with_catalog(sample_catalog());
        let storefront = Storefront::in_memory(&self.config, &backends)?;
        let lifetime_code = storefront.accounts.policy().lifetime_promo_code().to_string();

        let account = storefront
            .accounts
            .register(
                RegistrationRequest {
                    first_name: "Cliente".to_string(),
                    last_name: Some("Demo".to_string()),
                    email: email.to_string(),
                    password: "secreto".to_string(),
                    confirm_password: "secreto".to_string(),
                    phone: None,
                    address: None,
                    birth_date: Some(birth_date.to_string()),
                    promo_code: Some(lifetime_code),
                },
                today,
            )
            .await?;
        let user = account.user.clone();

        storefront.checkout.initialize(user.id).await?;
        let catalog = backends.carts.products();
        let Some(cake) = catalog.first() else {
            bail!("商品目录为空");
        };
        storefront.checkout.add_product(cake, 1).await?;
        if let Some(extra) = catalog.get(2) {
            storefront.checkout.add_product(extra, 2).await?;
        }

        storefront.checkout.apply_promo_code("DESCUENTO20").await?;
        let rejected = storefront.checkout.apply_promo_code("NOEXISTE").await;
        if let Err(e) = &rejected {
            warn!(error = %e, "演示：无效优惠码被拒绝，保留原优惠码");
        }

        let quoted = storefront.checkout.totals(Some(&user), today);
        let order = storefront.checkout.finalize(&user, today).await?;
        let live = storefront.orders.list_for_user(user.id).await?;

        backends.ledger.set_online(false);
        let cached = storefront.orders.list_for_user(user.id).await?;
        backends.ledger.set_online(true);

        let first_redeem = match storefront
            .accounts
            .redeem_birthday_benefit(user.id, today)
            .await
        {
            Ok(state) => json!({ "ok": state }),
            Err(e) => json!({ "error": e.error_code(), "message": e.to_string() }),
        };
        let second_redeem = match storefront
            .accounts
            .redeem_birthday_benefit(user.id, today)
            .await
        {
            Ok(state) => json!({ "ok": state }),
            Err(e) => json!({ "error": e.error_code(), "message": e.to_string() }),
        };

        Ok(json!({
            "welcome": account.welcome_message(),
            "profile": account.profile,
            "invalidPromoRejected": rejected.is_err(),
            "quotedTotals": quoted,
            "order": order,
            "cartAfterCheckout": storefront.checkout.cart(),
            "history": { "live": live.orders.len(), "cached": cached.orders.len(), "stale": cached.is_stale() },
            "birthdayRedeem": [first_redeem, second_redeem],
        }))
    }

    /// 导入外部服务导出的数据
    ///
    /// 用户和收据映射后写入内存版外部服务，再并发查询每个用户的订单
    pub async fn import(&self, payload: ImportPayload, today: NaiveDate) -> Result<Value> {
        let policy = BenefitPolicy::from_config(&self.config.benefits)?;
        let backends = InMemoryBackends::default();
        let storefront = Storefront::in_memory(&self.config, &backends)?;

        let mut users = Vec::with_capacity(payload.users.len());
        let mut skipped = 0usize;
        for record in payload.users {
            let user = map_user(record.user, record.extras, &policy);
            match backends.directory.insert(user.clone()) {
                Ok(()) => users.push(user),
                Err(ServiceError::Benefits(BenefitsError::DuplicateEmail(email))) => {
                    warn!(user_id = user.id, email = %email, "重复邮箱，跳过该用户");
                    skipped += 1;
                }
                Err(ServiceError::Validation(reason)) => {
                    warn!(user_id = user.id, reason = %reason, "重复用户 ID，跳过该用户");
                    skipped += 1;
                }
                Err(e) => return Err(e.into()),
            }
        }

        let receipts = payload.receipts.len();
        for receipt in payload.receipts {
            backends.ledger.insert(map_receipt(receipt));
        }

        let histories = try_join_all(
            users
                .iter()
                .map(|user| storefront.orders.list_for_user(user.id)),
        )
        .await?;

        info!(
            users = users.len(),
            skipped,
            receipts,
            "导入完成"
        );

        let summaries: Vec<Value> = users
            .iter()
            .zip(histories)
            .map(|(user, history)| {
                let profile = storefront.accounts.profile(user, today);
                let spent: i64 = history.orders.iter().map(|o| o.totals.total).sum();
                json!({
                    "user": user,
                    "profile": profile,
                    "orders": history.orders.len(),
                    "spent": spent,
                })
            })
            .collect();

        Ok(json!({
            "imported": { "users": users.len(), "skipped": skipped, "receipts": receipts },
            "users": summaries,
        }))
    }
}

fn print_json(value: &Value) -> Result<()> {
    let mut stdout = std::io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, value).context("序列化输出失败")?;
    writeln!(stdout)?;
    Ok(())
}
