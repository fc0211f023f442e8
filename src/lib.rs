//! # PalmAI
//!
//! 棕榈树病害识别工作流：上传校验、模拟分析、结果展示与报告导出

pub use palm_catalog as catalog;
pub use palm_report as report;
pub use palm_workflow as workflow;

pub use palm_catalog::DiseaseCatalog;
pub use palm_core::{AnalysisResult, ImagePayload, PalmError, Result, WorkflowState};
pub use palm_workflow::AnalysisWorkflow;
