//! 外部数据映射
//!
//! 外部服务返回的数据字段不全且命名不统一（同时存在英文与西班牙文字段名）。
//! 这里的结构体所有字段都带默认值，缺失字段在映射时补齐，引擎只接收完整的领域模型。
//!
//! 收据缺省规则：
//! - 状态缺失或无法识别 -> `Completed`
//! - 小计缺失 -> 等于总额
//! - 两个折扣桶缺失 -> 0
//! - 开具时间缺失或无法解析 -> Unix 纪元
//! - 商品名缺失 -> `Product #<id>`

use benefits_engine::{
    BenefitPolicy, BirthdayBenefit, CartLine, Order, OrderStatus, OrderTotals, UserIdentity,
    UserRole, parse_birth_date,
};
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// 用户服务返回的用户
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RemoteUser {
    pub id: i64,
    #[serde(alias = "nombre")]
    pub first_name: String,
    #[serde(alias = "apellido")]
    pub last_name: Option<String>,
    #[serde(alias = "correo")]
    pub email: String,
    #[serde(alias = "tipoUsuario")]
    pub role: Option<String>,
    #[serde(alias = "fechaRegistro")]
    pub created_at: Option<String>,
}

/// 用户服务之外保存的资料补充
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RemoteProfileExtras {
    #[serde(alias = "telefono")]
    pub phone: Option<String>,
    #[serde(alias = "direccion")]
    pub address: Option<String>,
    #[serde(alias = "fechaNacimiento")]
    pub birth_date: Option<String>,
    #[serde(alias = "codigoPromocional")]
    pub promo_code: Option<String>,
    /// 注册时写入的生日权益授予结果
    #[serde(alias = "tortaGratisCumpleanosDisponible")]
    pub birthday_benefit_available: Option<bool>,
    #[serde(alias = "tortaGratisCumpleanosUsada")]
    pub birthday_benefit_used: bool,
    pub birthday_benefit_year: Option<i32>,
}

/// 导入文件中的用户记录
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteUserRecord {
    #[serde(flatten)]
    pub user: RemoteUser,
    #[serde(default, alias = "datosExtra")]
    pub extras: RemoteProfileExtras,
}

/// 订单服务返回的收据
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RemoteReceipt {
    pub id: i64,
    #[serde(alias = "usuarioId")]
    pub user_id: Option<i64>,
    #[serde(alias = "carritoId")]
    pub cart_id: Option<i64>,
    #[serde(alias = "fecha", alias = "fechaEmision")]
    pub issued_at: Option<String>,
    pub total: i64,
    pub subtotal: Option<i64>,
    #[serde(alias = "descuentoUsuario")]
    pub user_discount: Option<i64>,
    #[serde(alias = "descuentoCodigo")]
    pub promo_discount: Option<i64>,
    #[serde(alias = "codigoPromoAplicado")]
    pub promo_code: Option<String>,
    #[serde(alias = "estado")]
    pub status: Option<String>,
    #[serde(alias = "detalles", alias = "items")]
    pub lines: Vec<RemoteReceiptLine>,
}

/// 收据行
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RemoteReceiptLine {
    pub id: Option<i64>,
    #[serde(alias = "productoId")]
    pub product_id: i64,
    #[serde(alias = "nombre", alias = "nombreProducto")]
    pub name: Option<String>,
    #[serde(alias = "cantidad")]
    pub quantity: u32,
    #[serde(alias = "precioUnitario")]
    pub unit_price: i64,
}

/// 批量导入文件
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ImportPayload {
    #[serde(alias = "usuarios")]
    pub users: Vec<RemoteUserRecord>,
    #[serde(alias = "boletas")]
    pub receipts: Vec<RemoteReceipt>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// 解析外部时间
///
/// 接受 RFC 3339、不带时区的 `YYYY-MM-DDTHH:MM:SS[.f]`（按 UTC）和纯日期
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

/// 解析角色，无法识别的按普通顾客处理
pub fn parse_role(raw: Option<&str>) -> UserRole {
    match raw.map(|r| r.trim().to_lowercase()) {
        Some(r) if r == "admin" || r == "administrador" => UserRole::Admin,
        _ => UserRole::Customer,
    }
}

/// 解析订单状态
///
/// 同时接受英文和西班牙文，缺失或无法识别时为 `Completed`
pub fn parse_order_status(raw: Option<&str>) -> OrderStatus {
    let Some(raw) = raw else {
        return OrderStatus::Completed;
    };
    match raw.trim().to_lowercase().as_str() {
        "completado" => OrderStatus::Completed,
        "pendiente" => OrderStatus::Pending,
        "cancelado" => OrderStatus::Cancelled,
        other => other.parse().unwrap_or_else(|_| {
            warn!(status = %other, "无法识别的订单状态，按已完成处理");
            OrderStatus::Completed
        }),
    }
}

/// 映射用户
///
/// 生日权益优先采用注册时记录的授予结果，缺失时才按邮箱推导，再叠加外部记录的使用状态；
/// 使用年份缺失时取注册年份。出生日期无法解析时丢弃该字段并记录日志
pub fn map_user(
    remote: RemoteUser,
    extras: RemoteProfileExtras,
    policy: &BenefitPolicy,
) -> UserIdentity {
    let birth_date = match extras.birth_date.as_deref().map(parse_birth_date) {
        Some(Ok(date)) => date,
        Some(Err(e)) => {
            warn!(user_id = remote.id, error = %e, "出生日期无法解析，已忽略");
            None
        }
        None => None,
    };

    let created_at = remote
        .created_at
        .as_deref()
        .and_then(parse_timestamp)
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH);

    let mut birthday_benefit = match extras.birthday_benefit_available {
        Some(granted) => BirthdayBenefit::grant_at_registration(granted),
        None => policy.registration_grant(&remote.email),
    };
    if extras.birthday_benefit_used && birthday_benefit == BirthdayBenefit::Available {
        birthday_benefit = BirthdayBenefit::Used {
            year_used: extras
                .birthday_benefit_year
                .unwrap_or_else(|| created_at.year()),
        };
    }

    UserIdentity {
        id: remote.id,
        first_name: remote.first_name.trim().to_string(),
        last_name: non_blank(remote.last_name),
        email: remote.email.trim().to_string(),
        phone: non_blank(extras.phone),
        address: non_blank(extras.address),
        birth_date,
        registration_promo_code: non_blank(extras.promo_code),
        role: parse_role(remote.role.as_deref()),
        birthday_benefit,
        created_at,
    }
}

/// 映射收据为订单
pub fn map_receipt(remote: RemoteReceipt) -> Order {
    let lines: Vec<CartLine> = remote
        .lines
        .into_iter()
        .filter(|line| {
            if line.quantity == 0 {
                warn!(receipt_id = remote.id, product_id = line.product_id, "收据行数量为 0，已忽略");
            }
            line.quantity > 0
        })
        .map(|line| CartLine {
            product_id: line.product_id,
            name: non_blank(line.name).unwrap_or_else(|| format!("Product #{}", line.product_id)),
            unit_price: line.unit_price,
            quantity: line.quantity,
            remote_line_id: line.id,
        })
        .collect();

    let user_discount = remote.user_discount.unwrap_or(0).max(0);
    let promo_discount = remote.promo_discount.unwrap_or(0).max(0);
    let total = remote.total.max(0);
    // 小计缺失时由实付金额和两个折扣桶反推；折扣总额始终取 subtotal - total
    let subtotal = remote
        .subtotal
        .unwrap_or_else(|| {
            total
                .saturating_add(user_discount)
                .saturating_add(promo_discount)
        })
        .max(total);
    let discount_amount = subtotal - total;
    if discount_amount != user_discount.saturating_add(promo_discount) {
        warn!(
            receipt_id = remote.id,
            subtotal,
            total,
            user_discount,
            promo_discount,
            "收据折扣明细与金额不一致"
        );
    }

    let created_at = match remote.issued_at.as_deref() {
        Some(raw) => parse_timestamp(raw).unwrap_or_else(|| {
            warn!(receipt_id = remote.id, issued_at = %raw, "收据时间无法解析，使用纪元时间");
            DateTime::<Utc>::UNIX_EPOCH
        }),
        None => DateTime::<Utc>::UNIX_EPOCH,
    };

    Order {
        id: remote.id,
        user_id: remote.user_id,
        cart_id: remote.cart_id,
        lines,
        totals: OrderTotals {
            subtotal,
            user_discount,
            promo_discount,
            discount_amount,
            total,
        },
        promo_code: non_blank(remote.promo_code),
        status: parse_order_status(remote.status.as_deref()),
        created_at,
    }
}
