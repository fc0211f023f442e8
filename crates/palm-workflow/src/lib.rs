//! # PalmAI分析工作流模块
//!
//! 提供从上传到结果的完整交互流程，包括：
//! - 上传校验：按媒体类型和大小接受或拒绝图片
//! - 预览状态：持有唯一的待分析图片
//! - 工作流状态机：空闲、预览、分析中、结果就绪、失败
//! - 模拟分析：固定延时后从病害目录中随机给出结果
//! - 相机拍照与用户通知

pub mod analyzer;
pub mod camera;
pub mod engine;
pub mod notify;
pub mod preview;
pub mod progress;
pub mod state_machine;
pub mod validator;

// 重新导出主要类型
pub use analyzer::{Analyzer, Diagnosis, SimulatedAnalyzer};
pub use camera::{CameraDevice, CameraSession, FacingMode, Frame, VideoStream};
pub use engine::{AnalysisOutcome, AnalysisTicket, AnalysisTiming, AnalysisWorkflow};
pub use notify::{
    Notification, NotificationLevel, NotificationQueue, Notifier, TracingNotifier, ANALYSIS_FAILED_MESSAGE,
    CAMERA_FAILED_MESSAGE, CATALOG_FALLBACK_MESSAGE,
};
pub use preview::PreviewState;
pub use progress::{StageProgress, StageTicker};
pub use state_machine::{WorkflowEvent, WorkflowStateMachine};
pub use validator::{UploadPolicy, UploadValidator};
