//! 业务服务层

pub mod account_service;
pub mod checkout_service;
pub mod dto;
pub mod order_history;

pub use account_service::AccountService;
pub use checkout_service::CheckoutService;
pub use order_history::OrderHistoryService;
