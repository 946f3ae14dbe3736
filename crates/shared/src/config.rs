//! 配置管理模块
//!
//! 支持多格式配置文件加载，环境变量覆盖，以及类型安全的配置访问。

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::observability::ObservabilityConfig;

/// 会话持久化配置
///
/// `directory` 为空时使用内存存储，进程退出即丢失
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SessionConfig {
    #[serde(default)]
    pub directory: Option<PathBuf>,
}

/// 用户权益配置
///
/// 年龄折扣、终身优惠码和合作院校邮箱域名
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BenefitsConfig {
    /// 享受年长折扣的最低年龄（含）
    pub senior_age_threshold: u32,
    pub senior_discount_percent: u8,
    /// 注册时输入即可获得终身折扣的优惠码
    pub lifetime_promo_code: String,
    pub lifetime_discount_percent: u8,
    /// 合作院校邮箱域名，不带 `@`
    pub partner_domains: Vec<String>,
}

impl Default for BenefitsConfig {
    fn default() -> Self {
        Self {
            senior_age_threshold: 50,
            senior_discount_percent: 50,
            lifetime_promo_code: "FELICES50".to_string(),
            lifetime_discount_percent: 10,
            partner_domains: vec!["duoc.cl".to_string(), "duocuc.cl".to_string()],
        }
    }
}

/// 结账优惠码表：优惠码 -> 折扣百分比
pub fn default_promo_codes() -> HashMap<String, u8> {
    HashMap::from([
        ("FELICES50".to_string(), 10),
        ("DESCUENTO20".to_string(), 20),
    ])
}

/// 应用配置
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub service_name: String,
    pub environment: String,
    #[serde(default)]
    pub observability: ObservabilityConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub benefits: BenefitsConfig,
    #[serde(default = "default_promo_codes")]
    pub promo_codes: HashMap<String, u8>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            service_name: "storefront".to_string(),
            environment: "development".to_string(),
            observability: ObservabilityConfig::default(),
            session: SessionConfig::default(),
            benefits: BenefitsConfig::default(),
            promo_codes: default_promo_codes(),
        }
    }
}

impl AppConfig {
    /// 从配置文件和环境变量加载配置
    ///
    /// 加载顺序（后加载的会覆盖先加载的同名配置项）：
    /// 1. .env 文件（如果存在）
    /// 2. config/default.toml（默认配置）
    /// 3. config/{environment}.toml（环境特定配置）
    /// 4. config/{service_name}.toml（服务特定配置）
    /// 5. 环境变量（BAKERY_ 前缀，双下划线分隔层级，如 BAKERY_SESSION__DIRECTORY -> session.directory）
    pub fn load(service_name: &str) -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        let env = std::env::var("BAKERY_ENV").unwrap_or_else(|_| "development".to_string());
        let config_dir = std::env::var("CONFIG_DIR").unwrap_or_else(|_| "config".to_string());

        let builder = Config::builder()
            .set_default("service_name", service_name)?
            .set_default("environment", env.clone())?
            .add_source(File::from(Path::new(&config_dir).join("default.toml")).required(false))
            .add_source(
                File::from(Path::new(&config_dir).join(format!("{}.toml", env))).required(false),
            )
            .add_source(
                File::from(Path::new(&config_dir).join(format!("{}.toml", service_name)))
                    .required(false),
            )
            .add_source(
                Environment::with_prefix("BAKERY")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );

        let mut config: Self = builder.build()?.try_deserialize()?;
        config.observability.service_name = config.service_name.clone();

        Ok(config)
    }

    /// 是否为生产环境
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}
