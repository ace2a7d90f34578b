use crate::preview::Preview;
use trackscan_common::AnalysisResult;

/// ワークフローの状態（1インスタンスにつき1つ）
///
/// `result` と `error` は同時に入らない。どちらかが入っていれば
/// `is_analyzing` は false。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkflowState {
    pub preview: Option<Preview>,
    pub is_analyzing: bool,
    pub result: Option<AnalysisResult>,
    pub error: Option<String>,
    /// 現在のサイクルの世代番号
    pub cycle: u64,
}

/// 表示上のフェーズ
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// アップロード面を表示
    Empty,
    /// 解析中（スキャン表示）
    Analyzing,
    Succeeded,
    Failed,
}

impl WorkflowState {
    pub fn phase(&self) -> Phase {
        if self.is_analyzing {
            Phase::Analyzing
        } else if self.result.is_some() {
            Phase::Succeeded
        } else if self.error.is_some() {
            Phase::Failed
        } else {
            Phase::Empty
        }
    }

    /// 状態の不変条件を満たしているか
    pub fn is_consistent(&self) -> bool {
        let exclusive = !(self.result.is_some() && self.error.is_some());
        let settled = !(self.is_analyzing && (self.result.is_some() || self.error.is_some()));
        exclusive && settled
    }
}
