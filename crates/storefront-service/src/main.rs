//! 烘焙店店面 CLI
//!
//! 命令行入口点，提供金额计算、流程演示和数据导入功能。

use bakery_shared::{AppConfig, observability};
use clap::Parser;
use storefront::cli::{Cli, CommandRunner, Commands, QuoteRequest};
use tracing::warn;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // 配置文件缺失或格式错误时使用默认配置继续运行
    let (mut config, load_error) = match AppConfig::load("storefront") {
        Ok(config) => (config, None),
        Err(e) => (AppConfig::default(), Some(e)),
    };

    if let Some(level) = cli.log_level {
        config.observability.log_level = level;
    }
    if cli.json_logs {
        config.observability.json_logs = true;
    }
    observability::init(&config.observability)?;

    if let Some(e) = load_error {
        warn!(error = %e, "配置加载失败，使用默认配置");
    }

    let runner = CommandRunner::new(config);

    match cli.command {
        Commands::Quote {
            lines,
            promo,
            email,
            birth_date,
            registration_code,
            today,
        } => {
            runner
                .run_quote(QuoteRequest {
                    lines,
                    promo,
                    email,
                    birth_date,
                    registration_code,
                    today,
                })
                .await?;
        }
        Commands::Demo { email, birth_date } => {
            runner.run_demo(&email, &birth_date).await?;
        }
        Commands::Import { file } => {
            runner.run_import(&file).await?;
        }
    }

    Ok(())
}
