//! 相机拍照
//!
//! 视频流由会话独占，拍照、取消或会话被丢弃时都会释放设备。

use crate::notify::{Notification, Notifier, CAMERA_FAILED_MESSAGE};
use async_trait::async_trait;
use image::codecs::jpeg::JpegEncoder;
use image::ExtendedColorType;
use palm_core::{ImagePayload, PalmError, Result};
use tracing::{debug, info, warn};

/// 拍照JPEG质量（0.9）
pub const CAPTURE_JPEG_QUALITY: u8 = 90;

/// 摄像头朝向
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FacingMode {
    /// 后置摄像头（优先）
    Environment,
    User,
}

/// 一帧RGB8图像
#[derive(Debug, Clone)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub rgb: Vec<u8>,
}

/// 相机设备接口
#[async_trait]
pub trait CameraDevice: Send + Sync {
    /// 请求视频流，拒绝授权或设备不存在时返回错误
    async fn open_stream(&self, facing: FacingMode) -> Result<Box<dyn VideoStream>>;
}

/// 已打开的视频流
pub trait VideoStream: Send {
    fn grab_frame(&mut self) -> Result<Frame>;

    /// 停止全部轨道并释放设备
    fn stop(&mut self);
}

/// 相机拍照会话
pub struct CameraSession {
    stream: Option<Box<dyn VideoStream>>,
}

impl CameraSession {
    /// 打开后置摄像头
    ///
    /// 失败时发送通知并返回 `None`，不影响其余工作流。
    pub async fn open(device: &dyn CameraDevice, notifier: &dyn Notifier) -> Option<Self> {
        match device.open_stream(FacingMode::Environment).await {
            Ok(stream) => {
                info!("Camera stream opened");
                Some(Self { stream: Some(stream) })
            }
            Err(e) => {
                warn!("Camera access failed: {}", e);
                notifier.notify(Notification::error(CAMERA_FAILED_MESSAGE));
                None
            }
        }
    }

    /// 拍照并编码为 `camera-capture.jpg`，随后释放视频流
    pub fn capture(mut self) -> Result<ImagePayload> {
        let frame = match self.stream.as_mut() {
            Some(stream) => stream.grab_frame(),
            None => Err(PalmError::Camera("camera stream already released".to_string())),
        };
        self.release();

        let jpeg = encode_jpeg(&frame?)?;
        Ok(ImagePayload::camera_capture(jpeg))
    }

    /// 取消拍照
    pub fn cancel(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            stream.stop();
            debug!("Camera stream released");
        }
    }
}

impl Drop for CameraSession {
    fn drop(&mut self) {
        self.release();
    }
}

/// 将RGB帧编码为JPEG
pub fn encode_jpeg(frame: &Frame) -> Result<Vec<u8>> {
    let expected = frame.width as usize * frame.height as usize * 3;
    if frame.width == 0 || frame.height == 0 || frame.rgb.len() != expected {
        return Err(PalmError::Camera(format!(
            "invalid frame {}x{} with {} bytes",
            frame.width,
            frame.height,
            frame.rgb.len()
        )));
    }

    let mut jpeg = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut jpeg, CAPTURE_JPEG_QUALITY);
    encoder
        .encode(&frame.rgb, frame.width, frame.height, ExtendedColorType::Rgb8)
        .map_err(|e| PalmError::Camera(format!("Failed to encode capture: {}", e)))?;

    Ok(jpeg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::NotificationQueue;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    struct FakeStream {
        released: Arc<AtomicBool>,
    }

    impl VideoStream for FakeStream {
        fn grab_frame(&mut self) -> Result<Frame> {
            Ok(Frame {
                width: 4,
                height: 2,
                rgb: vec![120u8; 4 * 2 * 3],
            })
        }

        fn stop(&mut self) {
            self.released.store(true, Ordering::SeqCst);
        }
    }

    struct FakeCamera {
        allow: bool,
        released: Arc<AtomicBool>,
    }

    impl FakeCamera {
        fn new(allow: bool) -> Self {
            Self {
                allow,
                released: Arc::new(AtomicBool::new(false)),
            }
        }
    }

    #[async_trait]
    impl CameraDevice for FakeCamera {
        async fn open_stream(&self, facing: FacingMode) -> Result<Box<dyn VideoStream>> {
            assert_eq!(facing, FacingMode::Environment);
            if !self.allow {
                return Err(PalmError::Camera("permission denied".to_string()));
            }
            Ok(Box::new(FakeStream {
                released: self.released.clone(),
            }))
        }
    }

    #[tokio::test]
    async fn test_capture_releases_stream() {
        let camera = FakeCamera::new(true);
        let notifier = NotificationQueue::new();

        let session = CameraSession::open(&camera, &notifier).await.unwrap();
        let payload = session.capture().unwrap();

        assert!(camera.released.load(Ordering::SeqCst));
        assert_eq!(payload.name, "camera-capture.jpg");
        assert_eq!(payload.media_type, "image/jpeg");
        assert_eq!(&payload.bytes[..2], &[0xFF, 0xD8]);
        assert_eq!(payload.size, payload.bytes.len() as u64);
    }

    #[tokio::test]
    async fn test_cancel_and_dismiss_release_stream() {
        let notifier = NotificationQueue::new();

        let camera = FakeCamera::new(true);
        CameraSession::open(&camera, &notifier).await.unwrap().cancel();
        assert!(camera.released.load(Ordering::SeqCst));

        let camera = FakeCamera::new(true);
        {
            let _session = CameraSession::open(&camera, &notifier).await.unwrap();
            assert!(!camera.released.load(Ordering::SeqCst));
        }
        assert!(camera.released.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_denied_camera_notifies() {
        let camera = FakeCamera::new(false);
        let notifier = NotificationQueue::new();

        assert!(CameraSession::open(&camera, &notifier).await.is_none());
        let notifications = notifier.drain();
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].message, CAMERA_FAILED_MESSAGE);
    }

    #[test]
    fn test_encode_rejects_short_frame() {
        let frame = Frame {
            width: 2,
            height: 2,
            rgb: vec![0u8; 5],
        };
        assert!(encode_jpeg(&frame).is_err());
    }
}
