//! APIレスポンスパーサー
//!
//! `/upload/` のレスポンスボディを検証して AnalysisResult に変換する。
//! フィールド欠落や範囲外の確信度はここで弾き、表示側に不正値を渡さない。

use crate::error::{Error, Result};
use crate::types::AnalysisResult;
use serde::Deserialize;

/// 検証前のレスポンス
///
/// サービスは `probability` や `class` も返すが使わない。
#[derive(Debug, Deserialize)]
struct RawResponse {
    #[serde(default)]
    error: bool,
    has_crack: Option<bool>,
    confidence: Option<f64>,
    confidence_level: Option<String>,
    message: Option<String>,
}

/// 解析レスポンスをパース
///
/// # Returns
/// * `Ok(AnalysisResult)` - 全フィールドが揃い確信度が 0〜100 の場合
/// * `Err(Error::ServiceReported)` - ボディに `"error": true` が含まれる場合
/// * `Err` - JSON不正・フィールド欠落・範囲外
///
/// # Examples
/// ```
/// use trackscan_common::parse_analysis_response;
///
/// let body = r#"{"has_crack": false, "confidence": 91.2,
///               "confidence_level": "Very High", "message": "No crack detected"}"#;
/// let result = parse_analysis_response(body).unwrap();
/// assert!(!result.has_crack);
/// ```
pub fn parse_analysis_response(body: &str) -> Result<AnalysisResult> {
    let raw: RawResponse = serde_json::from_str(body)?;

    if raw.error {
        return Err(Error::ServiceReported(raw.message.unwrap_or_default()));
    }

    let has_crack = raw.has_crack.ok_or(Error::MissingField("has_crack"))?;
    let confidence = raw.confidence.ok_or(Error::MissingField("confidence"))?;
    let confidence_level = raw
        .confidence_level
        .ok_or(Error::MissingField("confidence_level"))?;
    let message = raw.message.ok_or(Error::MissingField("message"))?;

    if !confidence.is_finite() || !(0.0..=100.0).contains(&confidence) {
        return Err(Error::ConfidenceOutOfRange(confidence));
    }

    Ok(AnalysisResult {
        has_crack,
        confidence,
        confidence_level,
        message,
    })
}
