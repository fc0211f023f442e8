//! 上传图片校验
//!
//! 只依据声明的媒体类型和大小判断，不解析图片头。

use palm_core::{ImagePayload, RejectionReason};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// 默认上传大小上限（10 MiB）
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

/// 默认允许的媒体类型
pub const DEFAULT_ALLOWED_TYPES: [&str; 3] = ["image/jpeg", "image/png", "image/jpg"];

/// 上传策略
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadPolicy {
    /// 允许的媒体类型（精确匹配）
    pub allowed_types: Vec<String>,
    /// 最大字节数（含）
    pub max_bytes: u64,
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self {
            allowed_types: DEFAULT_ALLOWED_TYPES.iter().map(|t| t.to_string()).collect(),
            max_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

/// 上传校验器
#[derive(Debug, Clone, Default)]
pub struct UploadValidator {
    policy: UploadPolicy,
}

impl UploadValidator {
    pub fn new(policy: UploadPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &UploadPolicy {
        &self.policy
    }

    /// 校验候选图片，按顺序检查，第一个失败项即为结果
    pub fn validate(&self, payload: &ImagePayload) -> Result<(), RejectionReason> {
        // 1. 媒体类型
        if !self.policy.allowed_types.iter().any(|t| t == &payload.media_type) {
            debug!("Rejected '{}': media type {}", payload.name, payload.media_type);
            return Err(RejectionReason::InvalidType);
        }

        // 2. 大小
        if payload.size > self.policy.max_bytes {
            debug!("Rejected '{}': {} bytes exceeds {}", payload.name, payload.size, self.policy.max_bytes);
            return Err(RejectionReason::TooLarge);
        }

        Ok(())
    }
}
