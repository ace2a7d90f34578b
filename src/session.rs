//! 解析サイクルの実行と対話セッション

use crate::analyzer::Analyzer;
use crate::error::{AnalysisError, Result, TrackscanError};
use crate::render::{self, AnalyzingIndicator};
use crate::upload::FileCandidate;
use crate::workflow::UploadWorkflow;
use dialoguer::{Confirm, Input};
use std::path::PathBuf;
use tracing::debug;
use trackscan_common::AnalysisResult;

/// 1サイクルの結末
#[derive(Debug, Clone, PartialEq)]
pub enum CycleOutcome {
    /// 画像ではないので投入しなかった
    Ignored,
    Analyzed(AnalysisResult),
    Failed(String),
}

/// ファイルを1枚投入し、サイクルが終わるまで待つ
pub async fn run_cycle<A: Analyzer + 'static>(
    workflow: &UploadWorkflow<A>,
    candidate: FileCandidate,
    show_progress: bool,
) -> CycleOutcome {
    let Some(handle) = workflow.offer(candidate) else {
        return CycleOutcome::Ignored;
    };
    let cycle = handle.cycle;

    let indicator = show_progress.then(|| AnalyzingIndicator::attach(workflow.subscribe()));
    handle.finished().await;
    drop(indicator);

    let state = workflow.state();
    if state.cycle != cycle {
        debug!(cycle, active = state.cycle, "cycle superseded before completion");
    }

    match (state.result, state.error) {
        (Some(result), _) => CycleOutcome::Analyzed(result),
        (None, Some(error)) => CycleOutcome::Failed(error),
        (None, None) => CycleOutcome::Failed(AnalysisError::Unknown.to_string()),
    }
}

/// 対話セッション
///
/// パス入力 → 解析 → 「もう1枚解析しますか？」→ リセット、を繰り返す。
/// 空入力で終了。
pub async fn run_interactive<A: Analyzer + 'static>(workflow: &UploadWorkflow<A>) -> Result<()> {
    loop {
        let Some(path) = prompt_path().await? else {
            break;
        };

        match FileCandidate::from_path(&path) {
            Ok(candidate) => match run_cycle(workflow, candidate, true).await {
                CycleOutcome::Ignored => {
                    println!("Not an image file, ignored: {}", path.display());
                }
                CycleOutcome::Analyzed(result) => {
                    if let Some(preview) = workflow.state().preview {
                        render::print_preview(&preview);
                    }
                    render::print_result(&result);
                    render::animate_meter(&result).await;
                }
                CycleOutcome::Failed(message) => render::print_error(&message),
            },
            Err(e) => render::print_error(&e.to_string()),
        }

        if !prompt_confirm("Analyze another image?").await? {
            break;
        }
        workflow.reset();
        println!();
    }

    Ok(())
}

async fn prompt_path() -> Result<Option<PathBuf>> {
    let input = tokio::task::spawn_blocking(|| {
        Input::<String>::new()
            .with_prompt("Image path (empty to quit)")
            .allow_empty(true)
            .interact_text()
    })
    .await
    .map_err(|e| TrackscanError::Prompt(e.to_string()))?
    .map_err(|e| TrackscanError::Prompt(e.to_string()))?;

    let trimmed = input.trim().trim_matches(|c| c == '"' || c == '\'');
    if trimmed.is_empty() {
        Ok(None)
    } else {
        Ok(Some(PathBuf::from(trimmed)))
    }
}

async fn prompt_confirm(prompt: &'static str) -> Result<bool> {
    tokio::task::spawn_blocking(move || Confirm::new().with_prompt(prompt).default(true).interact())
        .await
        .map_err(|e| TrackscanError::Prompt(e.to_string()))?
        .map_err(|e| TrackscanError::Prompt(e.to_string()))
}
