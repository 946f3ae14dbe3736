//! 测试环境管理
//!
//! 基于内存版外部服务装配店面，会话写入临时目录以便模拟重启。

use std::path::PathBuf;

use anyhow::Result;
use bakery_shared::{AppConfig, SessionConfig};
use chrono::NaiveDate;
use storefront::app::sample_catalog;
use storefront::dto::RegistrationRequest;
use storefront::{InMemoryBackends, Storefront};

/// 测试环境
pub struct TestEnvironment {
    pub config: AppConfig,
    pub backends: InMemoryBackends,
    pub storefront: Storefront,
    pub session_dir: PathBuf,
}

impl TestEnvironment {
    pub fn setup() -> Result<Self> {
        let session_dir =
            std::env::temp_dir().join(format!("bakery-e2e-{}", uuid::Uuid::new_v4()));
        let config = AppConfig {
            session: SessionConfig {
                directory: Some(session_dir.clone()),
            },
            ..AppConfig::default()
        };
        let backends = InMemoryBackends::with_catalog(sample_catalog());
        let storefront = Storefront::in_memory(&config, &backends)?;

        Ok(Self {
            config,
            backends,
            storefront,
            session_dir,
        })
    }

    /// 以同一会话目录重新装配，模拟应用重启
    pub fn restart(&mut self) -> Result<()> {
        self.storefront = Storefront::in_memory(&self.config, &self.backends)?;
        Ok(())
    }

    pub fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    pub fn registration(
        email: &str,
        birth_date: Option<&str>,
        promo_code: Option<&str>,
    ) -> RegistrationRequest {
        RegistrationRequest {
            first_name: "Cliente".to_string(),
            last_name: None,
            email: email.to_string(),
            password: "secreto123".to_string(),
            confirm_password: "secreto123".to_string(),
            phone: Some("+56 9 1234 5678".to_string()),
            address: Some("Av. Providencia 123".to_string()),
            birth_date: birth_date.map(str::to_string),
            promo_code: promo_code.map(str::to_string),
        }
    }
}

impl Drop for TestEnvironment {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.session_dir);
    }
}
