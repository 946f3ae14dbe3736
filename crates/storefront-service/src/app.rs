//! 服务装配
//!
//! 由 [`AppConfig`] 构造权益策略、优惠码表和会话存储，再组装三个业务服务。

use std::sync::Arc;

use bakery_shared::{AppConfig, FileSessionStore, MemorySessionStore, SessionConfig, SessionStore};
use benefits_engine::{BenefitPolicy, Product, PromoRegistry};
use tracing::info;

use crate::error::Result;
use crate::repository::{
    CartStore, MemoryCartStore, MemoryOrderLedger, MemoryUserDirectory, OrderLedger,
    UserDirectory,
};
use crate::service::{AccountService, CheckoutService, OrderHistoryService};
use crate::session::{OrderCache, PersistedCart, SessionUser};

/// 按配置创建会话存储：配置了目录时写文件，否则放在内存
pub fn session_store(config: &SessionConfig) -> Result<Arc<dyn SessionStore>> {
    match &config.directory {
        Some(directory) => {
            info!(directory = %directory.display(), "使用文件会话存储");
            Ok(Arc::new(FileSessionStore::new(directory)?))
        }
        None => Ok(Arc::new(MemorySessionStore::new())),
    }
}

/// 内存版外部服务
#[derive(Debug, Clone, Default)]
pub struct InMemoryBackends {
    pub directory: MemoryUserDirectory,
    pub carts: MemoryCartStore,
    pub ledger: MemoryOrderLedger,
}

impl InMemoryBackends {
    pub fn with_catalog(products: impl IntoIterator<Item = Product>) -> Self {
        Self {
            directory: MemoryUserDirectory::new(),
            carts: MemoryCartStore::with_catalog(products),
            ledger: MemoryOrderLedger::new(),
        }
    }
}

/// 演示用商品目录
pub fn sample_catalog() -> Vec<Product> {
    [
        (1, "Torta Cuadrada de Chocolate", 45000),
        (2, "Torta Circular de Manjar", 42000),
        (3, "Mousse de Chocolate", 5000),
        (4, "Tiramisú Clásico", 5500),
        (5, "Empanada de Manzana", 3000),
        (6, "Brownie Sin Gluten", 4000),
    ]
    .into_iter()
    .map(|(id, name, price)| Product {
        id,
        name: name.to_string(),
        price,
    })
    .collect()
}

/// 店面服务集合
pub struct Storefront {
    pub accounts: AccountService,
    pub checkout: CheckoutService,
    pub orders: OrderHistoryService,
}

impl Storefront {
    pub fn build(
        config: &AppConfig,
        directory: Arc<dyn UserDirectory>,
        cart_store: Arc<dyn CartStore>,
        ledger: Arc<dyn OrderLedger>,
        session: Arc<dyn SessionStore>,
    ) -> Result<Self> {
        let policy = BenefitPolicy::from_config(&config.benefits)?;
        let promos = PromoRegistry::from_config(&config.promo_codes)?;
        let cart = PersistedCart::open(Arc::clone(&session))?;

        info!(
            service = %config.service_name,
            promo_codes = promos.len(),
            partner_domains = policy.partner_domains().len(),
            "店面服务已装配"
        );

        Ok(Self {
            accounts: AccountService::new(
                directory,
                policy.clone(),
                SessionUser::new(Arc::clone(&session)),
            ),
            checkout: CheckoutService::new(
                cart_store,
                Arc::clone(&ledger),
                policy,
                promos,
                cart,
            ),
            orders: OrderHistoryService::new(ledger, OrderCache::new(session)),
        })
    }

    /// 使用内存版外部服务装配
    pub fn in_memory(config: &AppConfig, backends: &InMemoryBackends) -> Result<Self> {
        Self::build(
            config,
            Arc::new(backends.directory.clone()),
            Arc::new(backends.carts.clone()),
            Arc::new(backends.ledger.clone()),
            session_store(&config.session)?,
        )
    }
}
