//! 分析阶段进度提示
//!
//! 按固定节奏推进阶段指示，只用于界面反馈，与分析完成时机互不依赖。

use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// 阶段进度快照
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StageProgress {
    /// 已激活的阶段数
    pub active: usize,
    pub total: usize,
    /// 最近激活的阶段
    pub current: Option<String>,
}

impl StageProgress {
    pub fn reset(total: usize) -> Self {
        Self {
            active: 0,
            total,
            current: None,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.total > 0 && self.active == self.total
    }
}

/// 可取消的阶段计时器
///
/// 第 i 个阶段在启动后 (i + 1) × interval 时激活，全部激活后自行结束。
pub struct StageTicker {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl StageTicker {
    /// 启动计时器（需要在tokio运行时内调用）
    pub fn start(stages: Vec<String>, interval: Duration, progress: Arc<watch::Sender<StageProgress>>) -> Self {
        let cancel = CancellationToken::new();
        let total = stages.len();
        progress.send_replace(StageProgress::reset(total));

        let token = cancel.clone();
        let handle = tokio::spawn(async move {
            for (index, label) in stages.into_iter().enumerate() {
                tokio::select! {
                    _ = token.cancelled() => return,
                    _ = tokio::time::sleep(interval) => {}
                }

                progress.send_replace(StageProgress {
                    active: index + 1,
                    total,
                    current: Some(label),
                });
            }
        });

        Self { cancel, handle }
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for StageTicker {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
