//! 用户通知
//!
//! 可恢复错误和提示通过短暂显示的通知告知用户，渲染由外壳负责。

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;
use tracing::{debug, info, warn};

/// 通知默认显示时长
pub const NOTIFICATION_DISPLAY_TIME: Duration = Duration::from_millis(4000);

/// 队列最多保留的通知数
pub const NOTIFICATION_QUEUE_CAPACITY: usize = 32;

pub const ANALYSIS_FAILED_MESSAGE: &str = "Analysis failed. Please try again.";
pub const CAMERA_FAILED_MESSAGE: &str = "Camera access failed. Please use file upload instead.";
pub const CATALOG_FALLBACK_MESSAGE: &str = "Disease data could not be loaded. Showing limited information.";

/// 通知级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    Info,
    Error,
}

/// 一条通知
#[derive(Debug, Clone, Serialize)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
    /// 显示时长（毫秒）
    pub display_ms: u64,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn new(level: NotificationLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            display_ms: NOTIFICATION_DISPLAY_TIME.as_millis() as u64,
            created_at: Utc::now(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Info, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Error, message)
    }

    /// 显示时间已过
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.created_at + chrono::Duration::milliseconds(self.display_ms as i64)
    }
}

/// 通知发送接口
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// 只写日志的通知器
#[derive(Debug, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notification: Notification) {
        match notification.level {
            NotificationLevel::Info => info!("Notification: {}", notification.message),
            NotificationLevel::Error => warn!("Notification: {}", notification.message),
        }
    }
}

/// 缓存通知，供外壳轮询取走
///
/// 超过显示时间的通知不再投递，超出容量时丢弃最早的一条。
#[derive(Debug)]
pub struct NotificationQueue {
    pending: Mutex<VecDeque<Notification>>,
    capacity: usize,
}

impl Default for NotificationQueue {
    fn default() -> Self {
        Self::with_capacity(NOTIFICATION_QUEUE_CAPACITY)
    }
}

impl NotificationQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            pending: Mutex::new(VecDeque::new()),
            capacity: capacity.max(1),
        }
    }

    /// 取走全部仍在显示时间内的通知
    pub fn drain(&self) -> Vec<Notification> {
        let now = Utc::now();
        self.with_pending(|pending| pending.drain(..).filter(|n| !n.is_expired(now)).collect())
    }

    pub fn len(&self) -> usize {
        let now = Utc::now();
        self.with_pending(|pending| pending.iter().filter(|n| !n.is_expired(now)).count())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn with_pending<T>(&self, f: impl FnOnce(&mut VecDeque<Notification>) -> T) -> T {
        match self.pending.lock() {
            Ok(mut pending) => f(&mut pending),
            Err(poisoned) => f(&mut poisoned.into_inner()),
        }
    }
}

impl Notifier for NotificationQueue {
    fn notify(&self, notification: Notification) {
        TracingNotifier.notify(notification.clone());
        let now = Utc::now();
        let capacity = self.capacity;
        self.with_pending(|pending| {
            pending.retain(|n| !n.is_expired(now));
            while pending.len() >= capacity {
                if let Some(dropped) = pending.pop_front() {
                    debug!("Notification queue full, dropping '{}'", dropped.message);
                }
            }
            pending.push_back(notification);
        });
    }
}
