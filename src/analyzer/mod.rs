//! 推論サービスとの境界
//!
//! 解析ワークフローは Analyzer トレイト越しにサービスを呼ぶ。
//! 本番は HttpAnalyzer、テストではモックを差し込む。

mod http;

pub use http::HttpAnalyzer;
pub use trackscan_common::AnalysisResult;

use crate::error::AnalysisError;
use crate::upload::ImageUpload;
use async_trait::async_trait;

#[async_trait]
pub trait Analyzer: Send + Sync {
    /// 画像を1枚解析する。リトライはしない。
    async fn analyze(&self, upload: &ImageUpload) -> Result<AnalysisResult, AnalysisError>;
}
