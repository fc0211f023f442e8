//! 错误定义模块

use thiserror::Error;

/// PalmAI统一错误类型
#[derive(Error, Debug)]
pub enum PalmError {
    #[error("配置错误: {0}")]
    Config(String),

    #[error("病害目录错误: {0}")]
    Catalog(String),

    #[error("网络错误: {0}")]
    Network(String),

    #[error("IO错误: {0}")]
    Io(#[from] std::io::Error),

    #[error("序列化错误: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("上传被拒绝: {0}")]
    Upload(#[from] crate::models::RejectionReason),

    #[error("相机错误: {0}")]
    Camera(String),

    #[error("分析失败: {0}")]
    Analysis(String),

    #[error("报告错误: {0}")]
    Report(String),

    #[error("资源未找到: {0}")]
    NotFound(String),

    #[error("系统内部错误: {0}")]
    Internal(String),

    #[error("无效状态转换: 从 {from} 到 {event}")]
    InvalidStateTransition { from: String, event: String },
}

/// PalmAI统一结果类型
pub type Result<T> = std::result::Result<T, PalmError>;
