//! # PalmAI Core
//!
//! PalmAI的核心模块，提供病害数据模型、错误定义和通用工具。

pub mod error;
pub mod models;
pub mod utils;

pub use error::{PalmError, Result};
pub use models::*;
