//! 日志初始化

use crate::config::LoggingConfig;
use anyhow::{anyhow, Result};
use tracing_subscriber::EnvFilter;

/// 初始化全局日志订阅器
///
/// `RUST_LOG` 存在时优先于配置中的级别。重复初始化返回错误。
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&config.level))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(config.ansi)
        .with_target(config.with_target)
        .try_init()
        .map_err(|e| anyhow!("Failed to initialize logging: {}", e))?;

    tracing::debug!("Logging initialized with level {}", config.level);
    Ok(())
}
