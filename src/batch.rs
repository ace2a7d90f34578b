//! フォルダ一括解析
//!
//! 画像1枚ごとに1サイクル回し、次の画像の前にリセットする。

use crate::analyzer::Analyzer;
use crate::scanner::ImageInfo;
use crate::session::{run_cycle, CycleOutcome};
use crate::upload::FileCandidate;
use crate::workflow::UploadWorkflow;
use serde::Serialize;
use trackscan_common::AnalysisResult;

#[derive(Debug, Clone, Serialize)]
pub struct BatchEntry {
    pub file_name: String,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<AnalysisResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BatchEntry {
    /// 一行表示
    pub fn line(&self) -> String {
        match (&self.result, &self.error) {
            (Some(r), _) => format!(
                "{} {}  {} {:.1}% ({})",
                if r.has_crack { "⚠" } else { "✔" },
                self.file_name,
                r.headline(),
                r.confidence,
                r.confidence_level
            ),
            (None, Some(e)) => format!("✖ {}  {}", self.file_name, e),
            (None, None) => format!("- {}  skipped", self.file_name),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub cracked: usize,
    pub clear: usize,
    pub failed: usize,
}

impl BatchSummary {
    pub fn from_entries(entries: &[BatchEntry]) -> Self {
        let mut summary = Self::default();
        for entry in entries {
            match &entry.result {
                Some(r) if r.has_crack => summary.cracked += 1,
                Some(_) => summary.clear += 1,
                None if entry.error.is_some() => summary.failed += 1,
                None => {}
            }
        }
        summary
    }

    pub fn total(&self) -> usize {
        self.cracked + self.clear + self.failed
    }
}

pub async fn run_batch<A, F>(
    workflow: &UploadWorkflow<A>,
    images: &[ImageInfo],
    show_progress: bool,
    mut on_entry: F,
) -> Vec<BatchEntry>
where
    A: Analyzer + 'static,
    F: FnMut(usize, &BatchEntry),
{
    let mut entries = Vec::with_capacity(images.len());

    for (index, image) in images.iter().enumerate() {
        let mut entry = BatchEntry {
            file_name: image.file_name.clone(),
            path: image.path.display().to_string(),
            result: None,
            error: None,
        };

        match FileCandidate::read_as(&image.path, image.media_type.as_str()) {
            Ok(candidate) => match run_cycle(workflow, candidate, show_progress).await {
                CycleOutcome::Analyzed(result) => entry.result = Some(result),
                CycleOutcome::Failed(message) => entry.error = Some(message),
                CycleOutcome::Ignored => {}
            },
            Err(e) => entry.error = Some(e.to_string()),
        }

        workflow.reset();
        on_entry(index, &entry);
        entries.push(entry);
    }

    entries
}
