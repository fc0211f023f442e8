//! 病害目录数据源
//!
//! 每个数据源只负责一次性取回原始JSON文本，解析和兜底由目录本身处理。

use async_trait::async_trait;
use palm_core::{PalmError, Result};
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;

/// 随程序发布的病害数据
const BUNDLED_DISEASE_DATA: &str = include_str!("../data/diseases.json");

/// 目录数据源接口
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// 数据源描述（用于日志）
    fn describe(&self) -> String;

    /// 取回目录JSON文本，无重试
    async fn fetch(&self) -> Result<String>;
}

/// HTTP数据端点
pub struct HttpCatalogSource {
    client: reqwest::Client,
    url: String,
}

impl HttpCatalogSource {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PalmError::Network(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl CatalogSource for HttpCatalogSource {
    fn describe(&self) -> String {
        self.url.clone()
    }

    async fn fetch(&self) -> Result<String> {
        debug!("Fetching disease data from {}", self.url);

        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| PalmError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(PalmError::Network(format!(
                "Disease data request failed with status: {}",
                response.status()
            )));
        }

        response
            .text()
            .await
            .map_err(|e| PalmError::Network(e.to_string()))
    }
}

/// 本地JSON文件
pub struct FileCatalogSource {
    path: PathBuf,
}

impl FileCatalogSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl CatalogSource for FileCatalogSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    async fn fetch(&self) -> Result<String> {
        Ok(tokio::fs::read_to_string(&self.path).await?)
    }
}

/// 内置病害数据
pub struct BundledCatalogSource;

#[async_trait]
impl CatalogSource for BundledCatalogSource {
    fn describe(&self) -> String {
        "bundled disease data".to_string()
    }

    async fn fetch(&self) -> Result<String> {
        Ok(BUNDLED_DISEASE_DATA.to_string())
    }
}
