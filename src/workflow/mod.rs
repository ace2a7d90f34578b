//! アップロード解析ワークフロー
//!
//! 1回の解析サイクル（ファイル選択 → プレビュー生成 → 解析リクエスト →
//! 結果/エラー → リセット）を管理する状態機械。
//!
//! 状態は watch チャネルで保持し、購読者はスナップショットを受け取る。
//! 各サイクルは世代番号（`cycle`）を持ち、非同期処理の完了時に世代が
//! 一致しない場合は書き込まずに捨てる。リセットや再選択の後に古い応答が
//! 届いても状態は上書きされない。

mod state;

pub use state::{Phase, WorkflowState};

use crate::analyzer::Analyzer;
use crate::error::AnalysisError;
use crate::preview::derive_preview;
use crate::upload::{FileCandidate, ImageUpload};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use trackscan_common::PACING_DELAY;

pub struct UploadWorkflow<A> {
    analyzer: Arc<A>,
    state: Arc<watch::Sender<WorkflowState>>,
    pacing: Duration,
}

/// 投入したサイクルの非同期処理
pub struct CycleHandle {
    pub cycle: u64,
    preview: JoinHandle<()>,
    analysis: JoinHandle<()>,
}

impl CycleHandle {
    /// プレビュー生成と解析の両方が終わるまで待つ
    pub async fn finished(self) {
        if let Err(e) = self.preview.await {
            warn!(cycle = self.cycle, error = %e, "preview task failed");
        }
        if let Err(e) = self.analysis.await {
            warn!(cycle = self.cycle, error = %e, "analysis task failed");
        }
    }
}

impl<A: Analyzer + 'static> UploadWorkflow<A> {
    pub fn new(analyzer: A) -> Self {
        let (state, _) = watch::channel(WorkflowState::default());
        Self {
            analyzer: Arc::new(analyzer),
            state: Arc::new(state),
            pacing: PACING_DELAY,
        }
    }

    /// 結果公開前の待機時間を変更
    pub fn with_pacing(mut self, pacing: Duration) -> Self {
        self.pacing = pacing;
        self
    }

    pub fn subscribe(&self) -> watch::Receiver<WorkflowState> {
        self.state.subscribe()
    }

    /// 現在の状態のスナップショット
    pub fn state(&self) -> WorkflowState {
        self.state.borrow().clone()
    }

    /// 入力面から来たファイルを受け付ける
    ///
    /// 画像でなければ何もせず None（状態は変えない、エラーにもしない）。
    pub fn offer(&self, candidate: FileCandidate) -> Option<CycleHandle> {
        let file_name = candidate.file_name.clone();
        let media_type = candidate.media_type.clone();
        match candidate.into_upload() {
            Some(upload) => Some(self.submit(upload)),
            None => {
                debug!(file = %file_name, %media_type, "ignoring non-image file");
                None
            }
        }
    }

    /// 新しいサイクルを開始する
    ///
    /// 1. 結果とエラーを即座に消し、解析中フラグを立てる（1回の書き込み）
    /// 2. プレビュー生成を開始（解析を待たせない）
    /// 3. 解析リクエストを送る
    ///
    /// 購読者に「結果なし・エラーなし・解析中でない」の中間状態は見えない。
    pub fn submit(&self, upload: ImageUpload) -> CycleHandle {
        let upload = Arc::new(upload);

        let mut cycle = 0;
        self.state.send_modify(|s| {
            s.cycle += 1;
            s.result = None;
            s.error = None;
            s.is_analyzing = true;
            cycle = s.cycle;
        });

        info!(cycle, file = upload.file_name(), "starting analysis cycle");

        let preview = self.spawn_preview(cycle, upload.clone());
        let analysis = self.spawn_analysis(cycle, upload);

        CycleHandle {
            cycle,
            preview,
            analysis,
        }
    }

    /// プレビュー・結果・エラーを消して空の状態に戻す
    ///
    /// 送信済みのリクエストは止めないが、世代が進むので応答は捨てられる。
    pub fn reset(&self) {
        self.state.send_modify(|s| {
            if s.is_analyzing {
                debug!(cycle = s.cycle, "reset while analysis in flight");
            }
            s.cycle += 1;
            s.preview = None;
            s.result = None;
            s.error = None;
            s.is_analyzing = false;
        });
    }

    fn spawn_preview(&self, cycle: u64, upload: Arc<ImageUpload>) -> JoinHandle<()> {
        let state = self.state.clone();
        tokio::spawn(async move {
            let preview = match tokio::task::spawn_blocking(move || derive_preview(&upload)).await {
                Ok(preview) => preview,
                Err(e) => {
                    warn!(cycle, error = %e, "preview derivation panicked");
                    return;
                }
            };

            state.send_if_modified(|s| {
                if s.cycle != cycle {
                    debug!(cycle, active = s.cycle, "discarding stale preview");
                    return false;
                }
                s.preview = Some(preview);
                true
            });
        })
    }

    fn spawn_analysis(&self, cycle: u64, upload: Arc<ImageUpload>) -> JoinHandle<()> {
        let state = self.state.clone();
        let analyzer = self.analyzer.clone();
        let pacing = self.pacing;

        tokio::spawn(async move {
            // 解析器が panic してもサイクルは必ず終わらせる
            let request = tokio::spawn(async move { analyzer.analyze(&upload).await });
            let outcome = match request.await {
                Ok(outcome) => outcome,
                Err(e) => {
                    warn!(cycle, error = %e, "analyzer task aborted");
                    Err(AnalysisError::Unknown)
                }
            };

            if outcome.is_ok() {
                tokio::time::sleep(pacing).await;
            }

            state.send_if_modified(|s| {
                if s.cycle != cycle {
                    debug!(cycle, active = s.cycle, "discarding stale analysis response");
                    return false;
                }
                match outcome {
                    Ok(result) => {
                        info!(
                            cycle,
                            has_crack = result.has_crack,
                            confidence = result.confidence,
                            "analysis completed"
                        );
                        s.result = Some(result);
                        s.error = None;
                    }
                    Err(e) => {
                        info!(cycle, error = %e, "analysis failed");
                        s.error = Some(e.to_string());
                        s.result = None;
                    }
                }
                s.is_analyzing = false;
                true
            });
        })
    }
}

#[cfg(test)]
mod tests;
