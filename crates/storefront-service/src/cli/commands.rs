//! CLI 命令定义
//!
//! 使用 clap derive 宏定义命令行接口结构。

use std::path::PathBuf;
use std::str::FromStr;

use clap::{Parser, Subcommand};

/// 烘焙店店面命令行工具
///
/// 使用 `--help` 查看各子命令的详细说明。
#[derive(Parser, Debug)]
#[command(name = "storefront")]
#[command(version, about = "烘焙店权益与结账工具")]
#[command(propagate_version = true)]
pub struct Cli {
    /// 日志级别 (trace, debug, info, warn, error)，覆盖配置文件
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// 输出 JSON 格式日志
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// 子命令枚举
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// 计算购物车金额
    ///
    /// 按给定用户资料推导折扣，输出权益概况和金额（JSON）
    Quote {
        /// 购物车行，格式 `单价x数量`，可重复，如 `--line 1000x2 --line 500`
        #[arg(short = 'l', long = "line", required = true)]
        lines: Vec<QuoteLine>,

        /// 结账优惠码
        #[arg(short, long)]
        promo: Option<String>,

        /// 用户邮箱（决定合作院校身份）
        #[arg(long)]
        email: Option<String>,

        /// 出生日期 YYYY-MM-DD
        #[arg(long)]
        birth_date: Option<String>,

        /// 注册时使用的优惠码
        #[arg(long)]
        registration_code: Option<String>,

        /// 计算日期 YYYY-MM-DD，默认今天
        #[arg(long)]
        today: Option<String>,
    },

    /// 运行演示场景：注册 -> 购物车 -> 结账 -> 订单查询 -> 生日权益
    Demo {
        /// 注册邮箱
        #[arg(long, default_value = "cliente@duoc.cl")]
        email: String,

        /// 出生日期 YYYY-MM-DD
        #[arg(long, default_value = "1970-05-01")]
        birth_date: String,
    },

    /// 导入外部服务导出的用户和收据（JSON）并输出映射结果
    Import {
        /// 导入文件路径
        #[arg(short, long)]
        file: PathBuf,
    },
}

/// `quote` 的购物车行
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuoteLine {
    pub unit_price: i64,
    pub quantity: u32,
}

impl FromStr for QuoteLine {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (price, quantity) = match s.split_once(['x', 'X']) {
            Some((price, quantity)) => (price, quantity),
            None => (s, "1"),
        };

        let unit_price: i64 = price
            .trim()
            .parse()
            .map_err(|_| format!("无效的单价: {}", price))?;
        let quantity: u32 = quantity
            .trim()
            .parse()
            .map_err(|_| format!("无效的数量: {}", quantity))?;

        if unit_price < 0 {
            return Err(format!("单价不能为负: {}", unit_price));
        }
        if quantity == 0 {
            return Err("数量必须大于 0".to_string());
        }

        Ok(Self {
            unit_price,
            quantity,
        })
    }
}
