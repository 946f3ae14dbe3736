//! 烘焙店权益引擎
//!
//! 纯同步的领域核心，不做任何 I/O：
//! - 权益资格判定（年长折扣、终身优惠码、合作院校生日权益）
//! - 一次性生日权益状态机
//! - 结账优惠码注册表
//! - 订单金额计算与购物车会话
//!
//! 持久化与远程服务由 storefront 服务层负责。

pub mod cart;
pub mod eligibility;
pub mod error;
pub mod models;
pub mod promo;
pub mod totals;

pub use cart::CartSession;
pub use eligibility::{ActiveBenefit, BenefitPolicy, BenefitProfile, age_on, parse_birth_date};
pub use error::{BenefitsError, Result};
pub use models::{
    BirthdayBenefit, BirthdayBenefitState, CartLine, NewUser, Order, OrderDraft, OrderStatus,
    OrderTotals, Product, ProfileUpdate, PromoCode, UserIdentity, UserRole,
};
pub use promo::PromoRegistry;
pub use totals::{calculate_totals, percent_of};
