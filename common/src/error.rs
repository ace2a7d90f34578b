//! エラー型定義

use thiserror::Error;

/// 共通エラー型
#[derive(Error, Debug)]
pub enum Error {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Response is missing field `{0}`")]
    MissingField(&'static str),

    #[error("Confidence out of range: {0}")]
    ConfidenceOutOfRange(f64),

    /// サービスが `error: true` を返した場合
    #[error("Service reported an error: {0}")]
    ServiceReported(String),
}

/// Result型エイリアス
pub type Result<T> = std::result::Result<T, Error>;
