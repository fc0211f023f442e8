//! 病害目录
//!
//! 加载后不可变，遍历顺序与源数据中的插入顺序一致。

use crate::source::CatalogSource;
use palm_core::{DiseaseRecord, PalmError, Result};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashMap;
use tracing::{error, info};

/// 兜底目录中唯一的病害标识
pub const FALLBACK_CONDITION: &str = "healthy";

/// 目录来源
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CatalogOrigin {
    Source,   // 外部数据源
    Fallback, // 内置兜底
}

/// 病害目录
#[derive(Debug, Clone)]
pub struct DiseaseCatalog {
    entries: Vec<(String, DiseaseRecord)>,
    index: HashMap<String, usize>,
    origin: CatalogOrigin,
}

impl DiseaseCatalog {
    /// 从数据源加载目录
    ///
    /// 任何失败（网络、状态码、格式）都不会向上传播，而是整体替换为兜底目录。
    pub async fn load<S>(source: &S) -> Self
    where
        S: CatalogSource + ?Sized,
    {
        let payload = match source.fetch().await {
            Ok(payload) => payload,
            Err(e) => {
                error!("Failed to load disease data from {}: {}", source.describe(), e);
                return Self::fallback();
            }
        };

        match Self::from_json(&payload) {
            Ok(catalog) => {
                info!("Loaded {} disease records from {}", catalog.len(), source.describe());
                catalog
            }
            Err(e) => {
                error!("Malformed disease data from {}: {}", source.describe(), e);
                Self::fallback()
            }
        }
    }

    /// 解析JSON目录
    ///
    /// 只校验基本形状：顶层是对象，每个值是带字符串 `name` 的对象。
    pub fn from_json(payload: &str) -> Result<Self> {
        let map: Map<String, Value> = serde_json::from_str(payload)
            .map_err(|e| PalmError::Catalog(format!("payload is not a JSON object: {}", e)))?;

        let mut entries = Vec::with_capacity(map.len());
        for (id, value) in map {
            if id.is_empty() {
                return Err(PalmError::Catalog("empty disease identifier".to_string()));
            }
            if !value.is_object() {
                return Err(PalmError::Catalog(format!("record '{}' is not an object", id)));
            }
            let record: DiseaseRecord = serde_json::from_value(value)
                .map_err(|e| PalmError::Catalog(format!("record '{}': {}", id, e)))?;
            entries.push((id, record));
        }

        Ok(Self::with_origin(entries, CatalogOrigin::Source))
    }

    /// 由记录列表构建目录（重复标识以后者为准）
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (String, DiseaseRecord)>,
    {
        Self::with_origin(entries, CatalogOrigin::Source)
    }

    fn with_origin<I>(entries: I, origin: CatalogOrigin) -> Self
    where
        I: IntoIterator<Item = (String, DiseaseRecord)>,
    {
        let mut catalog = Self {
            entries: Vec::new(),
            index: HashMap::new(),
            origin,
        };

        for (id, record) in entries {
            match catalog.index.get(&id) {
                Some(&position) => catalog.entries[position].1 = record,
                None => {
                    catalog.index.insert(id.clone(), catalog.entries.len());
                    catalog.entries.push((id, record));
                }
            }
        }

        catalog
    }

    /// 内置兜底目录，仅含 `healthy` 一条记录
    pub fn fallback() -> Self {
        let healthy = DiseaseRecord {
            name: "Healthy Palm".to_string(),
            description: Some("Your palm tree appears to be in excellent health!".to_string()),
            symptoms: vec![
                "Vibrant green fronds".to_string(),
                "Normal leaf structure".to_string(),
            ],
            treatment: vec!["Continue current care routine".to_string()],
            prevention: vec!["Continue regular maintenance".to_string()],
            severity: Some("None".to_string()),
            color: Some("green".to_string()),
        };

        Self::with_origin([(FALLBACK_CONDITION.to_string(), healthy)], CatalogOrigin::Fallback)
    }

    /// 按标识查找，未知标识返回 `None`
    pub fn get(&self, id: &str) -> Option<&DiseaseRecord> {
        self.index.get(id).map(|&position| &self.entries[position].1)
    }

    /// 按插入顺序列出全部记录
    pub fn all(&self) -> &[(String, DiseaseRecord)] {
        &self.entries
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(id, _)| id.as_str())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn origin(&self) -> CatalogOrigin {
        self.origin
    }

    pub fn is_fallback(&self) -> bool {
        self.origin == CatalogOrigin::Fallback
    }

    /// 按原顺序序列化为JSON对象
    pub fn to_json(&self) -> Result<String> {
        let mut map = Map::with_capacity(self.entries.len());
        for (id, record) in &self.entries {
            map.insert(id.clone(), serde_json::to_value(record)?);
        }
        Ok(serde_json::to_string(&Value::Object(map))?)
    }
}
