//! 核心数据模型定义

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// 相机拍照生成的固定文件名
pub const CAMERA_CAPTURE_FILE_NAME: &str = "camera-capture.jpg";

/// 相机拍照的媒体类型
pub const CAMERA_CAPTURE_MEDIA_TYPE: &str = "image/jpeg";

/// 病害记录
///
/// 只有 `name` 是必需字段，其余字段缺失时由渲染层填充占位文本。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiseaseRecord {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub symptoms: Vec<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub treatment: Vec<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub prevention: Vec<String>,
    /// 严重程度标签（开放集合，按不透明字符串处理）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<String>,
    /// 展示颜色标签，仅用于样式
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<Vec<String>>::deserialize(deserializer).map(Option::unwrap_or_default)
}

impl DiseaseRecord {
    /// 创建只有名称的记录
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            symptoms: Vec::new(),
            treatment: Vec::new(),
            prevention: Vec::new(),
            severity: None,
            color: None,
        }
    }
}

/// 用户提交的候选图片（文件选择、拖放或相机拍照）
#[derive(Debug, Clone)]
pub struct ImagePayload {
    /// 展示用文件名
    pub name: String,
    /// 声明的媒体类型，不做内容嗅探
    pub media_type: String,
    /// 声明的字节大小
    pub size: u64,
    pub bytes: Bytes,
}

impl ImagePayload {
    /// 从字节内容创建，大小取内容长度
    pub fn new(name: impl Into<String>, media_type: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        let bytes = bytes.into();
        Self {
            name: name.into(),
            media_type: media_type.into(),
            size: bytes.len() as u64,
            bytes,
        }
    }

    /// 相机拍照得到的JPEG图片
    pub fn camera_capture(jpeg: impl Into<Bytes>) -> Self {
        Self::new(CAMERA_CAPTURE_FILE_NAME, CAMERA_CAPTURE_MEDIA_TYPE, jpeg)
    }
}

/// 上传拒绝原因
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[serde(rename_all = "snake_case")]
pub enum RejectionReason {
    #[error("invalid media type")]
    InvalidType,
    #[error("file too large")]
    TooLarge,
}

impl RejectionReason {
    /// 面向用户的提示文本
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::InvalidType => "Please upload a valid image file (JPG, PNG)",
            Self::TooLarge => "File size must be less than 10MB",
        }
    }
}

/// 待分析图片
///
/// 同一时刻最多存在一个，由分析工作流独占。
#[derive(Debug, Clone)]
pub struct PendingImage {
    pub id: Uuid,
    pub name: String,
    pub media_type: String,
    pub size: u64,
    pub bytes: Bytes,
    pub selected_at: DateTime<Utc>,
}

impl From<ImagePayload> for PendingImage {
    fn from(payload: ImagePayload) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: payload.name,
            media_type: payload.media_type,
            size: payload.size,
            bytes: payload.bytes,
            selected_at: Utc::now(),
        }
    }
}

/// 分析结果
///
/// 包含计算时刻病害记录的完整副本，创建后不可变。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub id: Uuid,
    /// 病害标识，必定存在于加载的病害目录中
    pub condition: String,
    /// 置信度，取值范围 [0.70, 1.00)
    pub confidence: f64,
    #[serde(flatten)]
    pub record: DiseaseRecord,
    pub completed_at: DateTime<Utc>,
}

/// 工作流状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowState {
    Idle,        // 无图片（即等待文件）
    Previewing,  // 已选择图片
    Analyzing,   // 模拟分析中
    ResultReady, // 结果就绪
    Failed,      // 分析失败
}

impl WorkflowState {
    /// 等待文件与空闲是同一个状态
    pub const AWAITING_FILE: WorkflowState = WorkflowState::Idle;
}

impl std::fmt::Display for WorkflowState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Previewing => write!(f, "previewing"),
            Self::Analyzing => write!(f, "analyzing"),
            Self::ResultReady => write!(f, "result_ready"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// 界面主题
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    /// 切换后的主题
    pub fn toggled(&self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }
}

impl std::str::FromStr for Theme {
    type Err = crate::PalmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            other => Err(crate::PalmError::Config(format!("unknown theme: {}", other))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_requires_only_name() {
        let record: DiseaseRecord = serde_json::from_str(r#"{"name": "Black Scorch"}"#).unwrap();
        assert_eq!(record.name, "Black Scorch");
        assert!(record.symptoms.is_empty());
        assert!(record.severity.is_none());

        let missing_name = serde_json::from_str::<DiseaseRecord>(r#"{"severity": "High"}"#);
        assert!(missing_name.is_err());
    }

    #[test]
    fn test_record_null_lists_become_empty() {
        let record: DiseaseRecord =
            serde_json::from_str(r#"{"name": "Rachis Blight", "treatment": null}"#).unwrap();
        assert!(record.treatment.is_empty());
    }

    #[test]
    fn test_camera_capture_payload() {
        let payload = ImagePayload::camera_capture(vec![0xFF, 0xD8, 0xFF]);
        assert_eq!(payload.name, "camera-capture.jpg");
        assert_eq!(payload.media_type, "image/jpeg");
        assert_eq!(payload.size, 3);
    }

    #[test]
    fn test_result_flattens_record() {
        let result = AnalysisResult {
            id: Uuid::new_v4(),
            condition: "healthy".to_string(),
            confidence: 0.85,
            record: DiseaseRecord::named("Healthy Palm"),
            completed_at: Utc::now(),
        };

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["condition"], "healthy");
        assert_eq!(json["name"], "Healthy Palm");
    }

    #[test]
    fn test_theme_toggle() {
        assert_eq!(Theme::default(), Theme::Light);
        assert_eq!(Theme::Light.toggled(), Theme::Dark);
        assert_eq!("dark".parse::<Theme>().unwrap(), Theme::Dark);
        assert!("sepia".parse::<Theme>().is_err());
    }
}
