use thiserror::Error;

#[derive(Error, Debug)]
pub enum TrackscanError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("ファイルが見つかりません: {0}")]
    FileNotFound(String),

    #[error("フォルダが見つかりません: {0}")]
    FolderNotFound(String),

    #[error("HTTPクライアントの初期化に失敗: {0}")]
    HttpClient(String),

    #[error("ヘルスチェック失敗: {0}")]
    Health(String),

    #[error("入力エラー: {0}")]
    Prompt(String),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, TrackscanError>;

/// 1回の解析サイクルの失敗
///
/// `Display` がそのままユーザー向けメッセージになる。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnalysisError {
    /// サービスが失敗を返した（原因は表示しない）
    #[error("Analysis failed. Please try again.")]
    ServiceFailure,

    /// 応答が得られなかった・応答が壊れていた
    #[error("{0}")]
    Transport(String),

    /// 説明のない失敗
    #[error("Failed to analyze image")]
    Unknown,
}

impl AnalysisError {
    /// 下位エラーの説明から Transport を作る。説明が空なら Unknown。
    pub fn transport(err: impl std::fmt::Display) -> Self {
        let description = err.to_string();
        if description.trim().is_empty() {
            AnalysisError::Unknown
        } else {
            AnalysisError::Transport(description)
        }
    }
}
