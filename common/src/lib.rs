//! Trackscan Common Library
//!
//! CLIと表示層で共有される型とユーティリティ

pub mod types;
pub mod error;
pub mod media;
pub mod meter;
pub mod parser;

pub use types::{AnalysisResult, HealthStatus};
pub use error::{Error, Result};
pub use media::is_image_media_type;
pub use meter::{ConfidenceMeter, MeterFrame, Palette, METER_DURATION};
pub use parser::parse_analysis_response;

/// 解析結果を公開する前の最低待機時間
///
/// 応答が速くても、この時間は解析中の表示を続ける。
pub const PACING_DELAY: std::time::Duration = std::time::Duration::from_millis(1500);
