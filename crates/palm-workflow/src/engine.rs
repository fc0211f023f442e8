//! 分析工作流引擎
//!
//! 协调上传校验、预览状态、模拟分析和结果生成。工作流由外壳显式持有，
//! 所有协作者在构造时注入。

use crate::{
    analyzer::{Analyzer, SimulatedAnalyzer},
    camera::CameraSession,
    notify::{Notification, Notifier, ANALYSIS_FAILED_MESSAGE},
    preview::PreviewState,
    progress::{StageProgress, StageTicker},
    state_machine::{WorkflowEvent, WorkflowStateMachine},
    validator::UploadValidator,
};
use chrono::Utc;
use palm_catalog::DiseaseCatalog;
use palm_core::{AnalysisResult, ImagePayload, PalmError, PendingImage, RejectionReason, WorkflowState};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// 模拟分析的时间参数
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisTiming {
    /// 模拟推理耗时
    pub delay: Duration,
    /// 阶段提示的推进间隔
    pub stage_interval: Duration,
    /// 阶段提示文本
    pub stages: Vec<String>,
}

impl Default for AnalysisTiming {
    fn default() -> Self {
        Self {
            delay: Duration::from_millis(3000),
            stage_interval: Duration::from_millis(1000),
            stages: vec![
                "Processing image".to_string(),
                "Detecting palm leaf".to_string(),
                "Identifying condition".to_string(),
            ],
        }
    }
}

/// 一次分析的凭据
///
/// 记录开始时的代数，清除或换图后旧凭据失效。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalysisTicket {
    generation: u64,
}

/// 分析结束的结果
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisOutcome {
    /// 未在预览状态，调用被忽略
    NotStarted,
    Completed(AnalysisResult),
    Failed(String),
    /// 分析期间工作流已被清除或换图，结果丢弃
    Superseded,
}

/// 分析工作流
pub struct AnalysisWorkflow {
    catalog: Arc<DiseaseCatalog>,
    notifier: Arc<dyn Notifier>,
    analyzer: Box<dyn Analyzer>,
    validator: UploadValidator,
    state_machine: WorkflowStateMachine,
    timing: AnalysisTiming,
    preview: PreviewState,
    state: WorkflowState,
    result: Option<AnalysisResult>,
    generation: u64,
    analysis_in_progress: bool,
    progress: Arc<watch::Sender<StageProgress>>,
    ticker: Option<StageTicker>,
}

impl AnalysisWorkflow {
    /// 创建新的工作流，使用默认校验策略、时间参数和模拟分析器
    pub fn new(catalog: Arc<DiseaseCatalog>, notifier: Arc<dyn Notifier>) -> Self {
        let timing = AnalysisTiming::default();
        let (progress, _) = watch::channel(StageProgress::reset(timing.stages.len()));

        Self {
            catalog,
            notifier,
            analyzer: Box::new(SimulatedAnalyzer::new()),
            validator: UploadValidator::default(),
            state_machine: WorkflowStateMachine::new(),
            timing,
            preview: PreviewState::new(),
            state: WorkflowState::Idle,
            result: None,
            generation: 0,
            analysis_in_progress: false,
            progress: Arc::new(progress),
            ticker: None,
        }
    }

    pub fn with_analyzer(mut self, analyzer: impl Analyzer + 'static) -> Self {
        self.analyzer = Box::new(analyzer);
        self
    }

    pub fn with_validator(mut self, validator: UploadValidator) -> Self {
        self.validator = validator;
        self
    }

    pub fn with_timing(mut self, timing: AnalysisTiming) -> Self {
        self.progress.send_replace(StageProgress::reset(timing.stages.len()));
        self.timing = timing;
        self
    }

    /// 选择图片（文件选择、拖放）
    ///
    /// 校验失败时状态不变，发送通知并返回原因。
    pub fn select_image(&mut self, payload: ImagePayload) -> Result<(), RejectionReason> {
        if let Err(reason) = self.validator.validate(&payload) {
            warn!("Rejected image '{}': {}", payload.name, reason);
            self.notifier.notify(Notification::error(reason.user_message()));
            return Err(reason);
        }

        if self.state == WorkflowState::Analyzing {
            info!("New image selected during analysis; in-flight result will be discarded");
            self.supersede_analysis();
        }

        let image = PendingImage::from(payload);
        info!("Selected image '{}' ({} bytes, {})", image.name, image.size, image.media_type);

        self.result = None;
        if let Some(previous) = self.preview.set(image) {
            debug!("Replaced pending image '{}'", previous.name);
        }
        self.apply(WorkflowEvent::ImageSelected);
        Ok(())
    }

    /// 更换图片，不需要先清除
    pub fn change_image(&mut self, payload: ImagePayload) -> Result<(), RejectionReason> {
        debug!("Changing image from state {}", self.state);
        self.select_image(payload)
    }

    /// 通过相机拍照选择图片
    pub fn select_camera_capture(&mut self, session: CameraSession) -> palm_core::Result<()> {
        let payload = session.capture().map_err(|e| {
            warn!("Camera capture failed: {}", e);
            self.notifier.notify(Notification::error(crate::notify::CAMERA_FAILED_MESSAGE));
            e
        })?;

        self.select_image(payload)?;
        Ok(())
    }

    /// 开始分析，返回凭据
    ///
    /// 只在预览状态有效，否则（重复提交、没有图片）返回 `None` 且不改变任何状态。
    /// 需要在tokio运行时内调用。
    pub fn begin_analysis(&mut self) -> Option<AnalysisTicket> {
        if self.analysis_in_progress || self.state != WorkflowState::Previewing || self.preview.is_empty() {
            debug!("Ignoring analysis request in state {}", self.state);
            return None;
        }

        self.apply(WorkflowEvent::AnalysisStarted);
        self.analysis_in_progress = true;
        self.result = None;
        self.ticker = Some(StageTicker::start(
            self.timing.stages.clone(),
            self.timing.stage_interval,
            self.progress.clone(),
        ));

        info!("Analysis started (generation {})", self.generation);
        Some(AnalysisTicket {
            generation: self.generation,
        })
    }

    /// 完成分析
    ///
    /// 过期凭据不改变任何状态。
    pub fn finish_analysis(&mut self, ticket: AnalysisTicket) -> AnalysisOutcome {
        if ticket.generation != self.generation || self.state != WorkflowState::Analyzing {
            info!("Discarding stale analysis completion (generation {})", ticket.generation);
            return AnalysisOutcome::Superseded;
        }

        self.analysis_in_progress = false;
        self.stop_progress();

        match self.compute_result() {
            Ok(result) => {
                info!(
                    "Analysis complete: {} ({:.0}%)",
                    result.condition,
                    result.confidence * 100.0
                );
                self.result = Some(result.clone());
                self.apply(WorkflowEvent::AnalysisCompleted);
                AnalysisOutcome::Completed(result)
            }
            Err(e) => {
                error!("Analysis failed: {}", e);
                self.notifier.notify(Notification::error(ANALYSIS_FAILED_MESSAGE));
                self.apply(WorkflowEvent::AnalysisFailed);
                AnalysisOutcome::Failed(e.to_string())
            }
        }
    }

    /// 执行一次完整的模拟分析
    pub async fn start_analysis(&mut self) -> AnalysisOutcome {
        let Some(ticket) = self.begin_analysis() else {
            return AnalysisOutcome::NotStarted;
        };

        tokio::time::sleep(self.timing.delay).await;
        self.finish_analysis(ticket)
    }

    /// 清除图片和结果，回到空闲状态
    pub fn clear(&mut self) {
        self.supersede_analysis();
        self.preview.clear();
        self.result = None;
        self.apply(WorkflowEvent::Cleared);
        info!("Workflow cleared");
    }

    /// 开始新的分析
    pub fn new_analysis(&mut self) {
        self.clear();
    }

    fn compute_result(&mut self) -> palm_core::Result<AnalysisResult> {
        let image = self
            .preview
            .current()
            .ok_or_else(|| PalmError::Analysis("no pending image".to_string()))?;

        let diagnosis = self.analyzer.analyze(&self.catalog, image)?;
        let record = self.catalog.get(&diagnosis.condition).cloned().ok_or_else(|| {
            PalmError::Analysis(format!("condition '{}' is not in the catalog", diagnosis.condition))
        })?;

        Ok(AnalysisResult {
            id: Uuid::new_v4(),
            condition: diagnosis.condition,
            confidence: diagnosis.confidence,
            record,
            completed_at: Utc::now(),
        })
    }

    /// 作废进行中的分析，阶段指示归零
    fn supersede_analysis(&mut self) {
        self.generation += 1;
        self.analysis_in_progress = false;
        self.stop_progress();
        self.progress.send_replace(StageProgress::reset(self.timing.stages.len()));
    }

    fn stop_progress(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.cancel();
        }
    }

    fn apply(&mut self, event: WorkflowEvent) {
        match self.state_machine.transition(self.state, event) {
            Ok(next) => {
                debug!("Workflow {} --{:?}--> {}", self.state, event, next);
                self.state = next;
            }
            Err(e) => debug!("Ignored workflow event: {}", e),
        }
    }

    pub fn state(&self) -> WorkflowState {
        self.state
    }

    pub fn pending_image(&self) -> Option<&PendingImage> {
        self.preview.current()
    }

    pub fn result(&self) -> Option<&AnalysisResult> {
        self.result.as_ref()
    }

    pub fn catalog(&self) -> &Arc<DiseaseCatalog> {
        &self.catalog
    }

    pub fn timing(&self) -> &AnalysisTiming {
        &self.timing
    }

    pub fn is_analysis_in_progress(&self) -> bool {
        self.analysis_in_progress
    }

    /// 当前阶段进度
    pub fn progress(&self) -> StageProgress {
        self.progress.borrow().clone()
    }

    /// 订阅阶段进度变化
    pub fn subscribe_progress(&self) -> watch::Receiver<StageProgress> {
        self.progress.subscribe()
    }
}
