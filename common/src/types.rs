//! 解析結果の型定義
//!
//! 推論サービスとのやり取りで使う型:
//! - AnalysisResult: `/upload/` の成功レスポンス
//! - HealthStatus: `/health` のレスポンス

use serde::{Deserialize, Serialize};

/// 亀裂判定結果（受信後は不変）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// 判定（true = 亀裂あり）
    pub has_crack: bool,

    /// 確信度 0〜100
    pub confidence: f64,

    /// 確信度の区分ラベル（"High" など、そのまま表示する）
    pub confidence_level: String,

    /// 説明メッセージ（そのまま表示する）
    pub message: String,
}

impl AnalysisResult {
    /// 判定の見出し
    pub fn headline(&self) -> &'static str {
        if self.has_crack {
            "CRACK DETECTED"
        } else {
            "NO CRACK DETECTED"
        }
    }

    /// 画像上に重ねるバッジ文言
    pub fn badge(&self) -> &'static str {
        if self.has_crack {
            "Crack Detected"
        } else {
            "Track Safe"
        }
    }
}

/// サービスのヘルスチェック結果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub model_loaded: bool,
}

impl HealthStatus {
    pub fn is_ready(&self) -> bool {
        self.status == "healthy" && self.model_loaded
    }
}
