//! 分析工作流状态机
//!
//! 管理 空闲 → 预览 → 分析中 → 结果就绪/失败 的状态转换

use palm_core::{PalmError, Result, WorkflowState};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 状态转换事件
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum WorkflowEvent {
    ImageSelected,
    AnalysisStarted,
    AnalysisCompleted,
    AnalysisFailed,
    Cleared,
}

/// 工作流状态机
#[derive(Debug)]
pub struct WorkflowStateMachine {
    transitions: HashMap<(WorkflowState, WorkflowEvent), WorkflowState>,
}

impl WorkflowStateMachine {
    /// 创建新的状态机实例
    pub fn new() -> Self {
        let mut transitions = HashMap::new();

        // 任意状态下都可以选择新图片或清除
        for state in Self::get_all_states() {
            transitions.insert((state, WorkflowEvent::ImageSelected), WorkflowState::Previewing);
            transitions.insert((state, WorkflowEvent::Cleared), WorkflowState::Idle);
        }

        transitions.insert((WorkflowState::Previewing, WorkflowEvent::AnalysisStarted), WorkflowState::Analyzing);
        transitions.insert((WorkflowState::Analyzing, WorkflowEvent::AnalysisCompleted), WorkflowState::ResultReady);
        transitions.insert((WorkflowState::Analyzing, WorkflowEvent::AnalysisFailed), WorkflowState::Failed);

        Self { transitions }
    }

    /// 检查状态转换是否有效
    pub fn can_transition(&self, from: WorkflowState, event: WorkflowEvent) -> bool {
        self.transitions.contains_key(&(from, event))
    }

    /// 执行状态转换
    pub fn transition(&self, from: WorkflowState, event: WorkflowEvent) -> Result<WorkflowState> {
        match self.transitions.get(&(from, event)) {
            Some(to) => Ok(*to),
            None => Err(PalmError::InvalidStateTransition {
                from: from.to_string(),
                event: format!("{:?}", event),
            }),
        }
    }

    /// 获取所有可能的状态
    pub fn get_all_states() -> Vec<WorkflowState> {
        vec![
            WorkflowState::Idle,
            WorkflowState::Previewing,
            WorkflowState::Analyzing,
            WorkflowState::ResultReady,
            WorkflowState::Failed,
        ]
    }

    /// 获取状态的所有可能事件
    pub fn get_possible_events(&self, current_state: WorkflowState) -> Vec<WorkflowEvent> {
        self.transitions
            .keys()
            .filter(|(state, _)| *state == current_state)
            .map(|(_, event)| *event)
            .collect()
    }
}

impl Default for WorkflowStateMachine {
    fn default() -> Self {
        Self::new()
    }
}
