//! 待分析图片的预览状态

use palm_core::PendingImage;

/// 最多持有一个待分析图片
#[derive(Debug, Default)]
pub struct PreviewState {
    current: Option<PendingImage>,
}

impl PreviewState {
    pub fn new() -> Self {
        Self::default()
    }

    /// 替换当前图片，返回被替换的旧图片
    pub fn set(&mut self, image: PendingImage) -> Option<PendingImage> {
        self.current.replace(image)
    }

    /// 丢弃当前图片（幂等）
    pub fn clear(&mut self) {
        self.current = None;
    }

    pub fn current(&self) -> Option<&PendingImage> {
        self.current.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.current.is_none()
    }
}
