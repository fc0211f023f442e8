//! 主题偏好
//!
//! 偏好保存在JSON文件的单个键下，文件缺失或内容无效时使用浅色主题。

use palm_core::{Result, Theme};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;
use tracing::{info, warn};

/// 默认偏好键
pub const THEME_STORAGE_KEY: &str = "palmai-theme";

/// 主题存储
#[derive(Debug)]
pub struct ThemeStore {
    path: PathBuf,
    key: String,
    current: RwLock<Theme>,
}

impl ThemeStore {
    /// 从偏好文件加载
    pub async fn load(path: impl Into<PathBuf>, key: impl Into<String>) -> Self {
        let path = path.into();
        let key = key.into();

        let theme = match read_preferences(&path).await {
            Ok(prefs) => prefs
                .get(&key)
                .and_then(Value::as_str)
                .and_then(|s| s.parse().ok())
                .unwrap_or_default(),
            Err(e) => {
                warn!("Could not read preferences from {}: {}", path.display(), e);
                Theme::default()
            }
        };

        info!("Theme preference: {}", theme.as_str());
        Self {
            path,
            key,
            current: RwLock::new(theme),
        }
    }

    pub async fn current(&self) -> Theme {
        *self.current.read().await
    }

    /// 切换主题并保存
    pub async fn toggle(&self) -> Result<Theme> {
        let mut current = self.current.write().await;
        let next = current.toggled();

        // 保留文件中其他偏好，无法解析的文件先备份再覆盖
        let mut prefs = match read_preferences(&self.path).await {
            Ok(prefs) => prefs,
            Err(e) => {
                let backup = self.backup_path();
                warn!(
                    "Preferences file {} is unreadable ({}), moving it to {}",
                    self.path.display(),
                    e,
                    backup.display()
                );
                tokio::fs::rename(&self.path, &backup).await?;
                Map::new()
            }
        };
        prefs.insert(self.key.clone(), Value::String(next.as_str().to_string()));

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&self.path, serde_json::to_vec_pretty(&Value::Object(prefs))?).await?;

        *current = next;
        info!("Theme switched to {}", next.as_str());
        Ok(next)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 损坏偏好文件的备份位置
    pub fn backup_path(&self) -> PathBuf {
        let mut name = self.path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
        name.push(".bak");
        self.path.with_file_name(name)
    }
}

async fn read_preferences(path: &Path) -> Result<Map<String, Value>> {
    if !tokio::fs::try_exists(path).await? {
        return Ok(Map::new());
    }

    let content = tokio::fs::read_to_string(path).await?;
    match serde_json::from_str(&content)? {
        Value::Object(map) => Ok(map),
        _ => Err(palm_core::PalmError::Config("preferences file is not a JSON object".to_string())),
    }
}
