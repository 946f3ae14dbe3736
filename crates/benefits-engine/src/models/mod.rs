//! 权益引擎领域模型
//!
//! 所有模型都支持 JSON（serde）序列化

pub mod birthday;
pub mod cart;
pub mod order;
pub mod user;

pub use birthday::{BirthdayBenefit, BirthdayBenefitState};
pub use cart::{CartLine, Product, PromoCode};
pub use order::{Order, OrderDraft, OrderStatus, OrderTotals};
pub use user::{NewUser, ProfileUpdate, UserIdentity, UserRole};
