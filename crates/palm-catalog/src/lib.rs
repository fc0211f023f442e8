//! # PalmAI病害目录
//!
//! 病害标识到病害记录的映射，启动时从外部数据源加载一次，
//! 加载失败时整体替换为内置的单条目兜底目录。

pub mod catalog;
pub mod source;

pub use catalog::{CatalogOrigin, DiseaseCatalog, FALLBACK_CONDITION};
pub use source::{BundledCatalogSource, CatalogSource, FileCatalogSource, HttpCatalogSource};
