//! # PalmAI管理模块
//!
//! 提供配置管理和日志初始化

pub mod config;
pub mod logging;

pub use config::{
    AnalysisConfig, CatalogConfig, ConfigManager, LoggingConfig, PalmConfig, ReportConfig, ServerConfig,
    ThemeConfig, UploadConfig,
};
pub use logging::init_logging;
