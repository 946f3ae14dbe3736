//! 结账优惠码注册表
//!
//! 静态表，按规范化后的优惠码（去空白、大写）查找。结账优惠码只产生本次订单的
//! 折扣桶，与用户资料折扣相互独立。

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::eligibility::normalize_code;
use crate::error::{BenefitsError, Result};
use crate::models::PromoCode;

/// 优惠码注册表
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromoRegistry {
    codes: HashMap<String, u8>,
}

impl Default for PromoRegistry {
    fn default() -> Self {
        Self {
            codes: HashMap::from([
                ("FELICES50".to_string(), 10),
                ("DESCUENTO20".to_string(), 20),
            ]),
        }
    }
}

impl PromoRegistry {
    /// 从配置构造，校验百分比范围并规范化优惠码
    pub fn from_config(codes: &HashMap<String, u8>) -> Result<Self> {
        let mut normalized = HashMap::with_capacity(codes.len());
        for (code, percent) in codes {
            let key = normalize_code(code);
            if key.is_empty() {
                return Err(BenefitsError::Validation("优惠码不能为空".to_string()));
            }
            if *percent > 100 {
                return Err(BenefitsError::Validation(format!(
                    "优惠码 {} 的折扣必须在 0-100 之间，实际为 {}",
                    key, percent
                )));
            }
            normalized.insert(key, *percent);
        }

        debug!(count = normalized.len(), "优惠码注册表已加载");
        Ok(Self { codes: normalized })
    }

    /// 查找优惠码
    ///
    /// 未知或空白的码返回 `InvalidPromoCode`
    pub fn lookup(&self, raw: &str) -> Result<PromoCode> {
        let code = normalize_code(raw);
        match self.codes.get(&code) {
            Some(&discount_percent) => Ok(PromoCode {
                code,
                discount_percent,
                valid: true,
            }),
            None => {
                warn!(code = %code, "未知的优惠码");
                Err(BenefitsError::InvalidPromoCode(code))
            }
        }
    }

    pub fn contains(&self, raw: &str) -> bool {
        self.codes.contains_key(&normalize_code(raw))
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}
