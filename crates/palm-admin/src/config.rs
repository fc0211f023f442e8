//! 配置管理
//!
//! 默认值 → 配置文件 → `PALMAI_` 环境变量，逐层覆盖

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use palm_workflow::{AnalysisTiming, UploadPolicy};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{error, info};

/// 配置管理器
#[derive(Debug)]
pub struct ConfigManager {
    /// 配置数据
    config: Arc<RwLock<PalmConfig>>,
    /// 配置文件路径（未指定时只使用默认值和环境变量）
    config_path: Option<PathBuf>,
    /// 配置验证器
    validator: ConfigValidator,
}

/// PalmAI完整配置
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PalmConfig {
    /// 服务器配置
    pub server: ServerConfig,
    /// 病害目录配置
    pub catalog: CatalogConfig,
    /// 上传配置
    pub upload: UploadConfig,
    /// 模拟分析配置
    pub analysis: AnalysisConfig,
    /// 主题配置
    pub theme: ThemeConfig,
    /// 报告配置
    pub report: ReportConfig,
    /// 日志配置
    pub logging: LoggingConfig,
}

/// 服务器配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub name: String,
    pub host: String,
    pub port: u16,
    /// 静态页面目录
    pub static_dir: String,
}

/// 病害目录配置
///
/// 优先级：URL → 本地文件 → 内置数据
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub url: Option<String>,
    pub path: Option<String>,
    /// 拉取超时（毫秒）
    pub fetch_timeout_ms: u64,
}

/// 上传配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    pub allowed_types: Vec<String>,
    pub max_bytes: u64,
}

/// 模拟分析配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// 模拟推理耗时（毫秒）
    pub delay_ms: u64,
    /// 阶段提示间隔（毫秒）
    pub stage_interval_ms: u64,
    pub stages: Vec<String>,
}

/// 主题配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeConfig {
    /// 偏好文件路径
    pub storage_path: String,
    /// 偏好键名
    pub storage_key: String,
}

/// 报告配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// 报告导出目录
    pub output_dir: String,
}

/// 日志配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// 日志级别或过滤表达式
    pub level: String,
    pub ansi: bool,
    pub with_target: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            name: "PalmAI".to_string(),
            host: "127.0.0.1".to_string(),
            port: 8080,
            static_dir: "static".to_string(),
        }
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            url: None,
            path: None,
            fetch_timeout_ms: 5000,
        }
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        let policy = UploadPolicy::default();
        Self {
            allowed_types: policy.allowed_types,
            max_bytes: policy.max_bytes,
        }
    }
}

impl UploadConfig {
    pub fn policy(&self) -> UploadPolicy {
        UploadPolicy {
            allowed_types: self.allowed_types.clone(),
            max_bytes: self.max_bytes,
        }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        let timing = AnalysisTiming::default();
        Self {
            delay_ms: timing.delay.as_millis() as u64,
            stage_interval_ms: timing.stage_interval.as_millis() as u64,
            stages: timing.stages,
        }
    }
}

impl AnalysisConfig {
    pub fn timing(&self) -> AnalysisTiming {
        AnalysisTiming {
            delay: Duration::from_millis(self.delay_ms),
            stage_interval: Duration::from_millis(self.stage_interval_ms),
            stages: self.stages.clone(),
        }
    }
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            storage_path: "data/preferences.json".to_string(),
            storage_key: "palmai-theme".to_string(),
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output_dir: "data/reports".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            ansi: true,
            with_target: true,
        }
    }
}

/// 配置验证器
#[derive(Debug)]
struct ConfigValidator {
    /// 验证规则
    validation_rules: Vec<ValidationRule>,
}

/// 验证规则
#[derive(Debug)]
struct ValidationRule {
    /// 字段路径
    field_path: &'static str,
    /// 验证函数
    validator: fn(&PalmConfig) -> bool,
    /// 错误消息
    error_message: &'static str,
}

impl ConfigManager {
    /// 创建新的配置管理器
    pub fn new(config_path: Option<&str>) -> Result<Self> {
        let validator = ConfigValidator::new();
        let config = Self::load_config(config_path)?;
        validator.validate(&config)?;

        Ok(Self {
            config: Arc::new(RwLock::new(config)),
            config_path: config_path.map(PathBuf::from),
            validator,
        })
    }

    /// 加载配置
    fn load_config(config_path: Option<&str>) -> Result<PalmConfig> {
        let mut builder = Config::builder()
            .add_source(Config::try_from(&PalmConfig::default()).context("Failed to build default configuration")?);

        if let Some(path) = config_path {
            builder = builder.add_source(File::with_name(path));
        }

        let settings = builder
            .add_source(
                Environment::with_prefix("PALMAI")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("Failed to load configuration sources")?;

        let config: PalmConfig = settings
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        match config_path {
            Some(path) => info!("Configuration loaded successfully from: {}", path),
            None => info!("Using default configuration"),
        }
        Ok(config)
    }

    /// 获取配置
    pub async fn get_config(&self) -> PalmConfig {
        let config = self.config.read().await;
        config.clone()
    }

    /// 更新配置
    pub async fn update_config(&self, new_config: PalmConfig) -> Result<()> {
        // 验证新配置
        self.validator.validate(&new_config)?;

        {
            let mut config = self.config.write().await;
            *config = new_config;
        }

        // 保存配置到文件
        self.save_config().await?;

        info!("Configuration updated successfully");
        Ok(())
    }

    /// 保存配置到文件
    async fn save_config(&self) -> Result<()> {
        let Some(path) = &self.config_path else {
            return Ok(());
        };

        let config = self.config.read().await;
        let config_str = toml::to_string_pretty(&*config).context("Failed to serialize configuration")?;

        tokio::fs::write(path, config_str)
            .await
            .context("Failed to write configuration file")?;

        info!("Configuration saved to: {}", path.display());
        Ok(())
    }

    /// 重新加载配置
    pub async fn reload_config(&self) -> Result<()> {
        let path = self.config_path.as_ref().map(|p| p.to_string_lossy().into_owned());
        let new_config = Self::load_config(path.as_deref())?;
        self.validator.validate(&new_config)?;

        let mut config = self.config.write().await;
        *config = new_config;
        info!("Configuration reloaded");
        Ok(())
    }
}

impl ConfigValidator {
    /// 创建新的配置验证器
    fn new() -> Self {
        let validation_rules = vec![
            ValidationRule {
                field_path: "server.port",
                validator: |config| config.server.port != 0,
                error_message: "Server port cannot be 0",
            },
            ValidationRule {
                field_path: "upload.max_bytes",
                validator: |config| config.upload.max_bytes > 0,
                error_message: "Upload size limit must be positive",
            },
            ValidationRule {
                field_path: "upload.allowed_types",
                validator: |config| !config.upload.allowed_types.is_empty(),
                error_message: "At least one upload media type must be allowed",
            },
            ValidationRule {
                field_path: "analysis.delay_ms",
                validator: |config| config.analysis.delay_ms > 0,
                error_message: "Analysis delay must be positive",
            },
            ValidationRule {
                field_path: "analysis.stage_interval_ms",
                validator: |config| config.analysis.stage_interval_ms > 0,
                error_message: "Stage interval must be positive",
            },
            ValidationRule {
                field_path: "theme.storage_key",
                validator: |config| !config.theme.storage_key.is_empty(),
                error_message: "Theme storage key cannot be empty",
            },
        ];

        Self { validation_rules }
    }

    /// 验证配置
    fn validate(&self, config: &PalmConfig) -> Result<()> {
        for rule in &self.validation_rules {
            if !(rule.validator)(config) {
                error!("Configuration validation failed for {}", rule.field_path);
                return Err(anyhow::anyhow!("{}: {}", rule.field_path, rule.error_message));
            }
        }

        Ok(())
    }
}
