//! 確信度メーター
//!
//! 確信度の数値表示と円形インジケーターを、ネットワークとは独立した
//! 1500ms のアニメーションで 0 から目標値まで動かす。
//!
//! 状態は開始時刻だけで、表示値は経過時間の純関数。時刻は呼び出し側が
//! 渡すので、実時計なしでテストできる。

use crate::types::AnalysisResult;
use std::time::{Duration, Instant};

/// アニメーション時間
pub const METER_DURATION: Duration = Duration::from_millis(1500);

/// 円形インジケーターの半径
pub const METER_RADIUS: f64 = 45.0;

/// 円周 (2π·45)
pub fn circumference() -> f64 {
    2.0 * std::f64::consts::PI * METER_RADIUS
}

/// 3次イーズアウト
///
/// `progress` は 0〜1 にクランプされる。
pub fn ease_out_cubic(progress: f64) -> f64 {
    let p = progress.clamp(0.0, 1.0);
    1.0 - (1.0 - p).powi(3)
}

/// 経過時間に対する表示値
///
/// `confidence × (1 − (1 − t/1500)³)`、1500ms 以降は `confidence` で固定。
pub fn displayed_at(confidence: f64, elapsed: Duration) -> f64 {
    if elapsed >= METER_DURATION {
        return confidence;
    }
    let progress = elapsed.as_secs_f64() / METER_DURATION.as_secs_f64();
    confidence * ease_out_cubic(progress)
}

/// 配色（判定で二択、確信度による段階なし）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Palette {
    /// 亀裂あり
    Danger,
    /// 亀裂なし
    Safe,
}

impl Palette {
    pub fn for_verdict(has_crack: bool) -> Self {
        if has_crack {
            Palette::Danger
        } else {
            Palette::Safe
        }
    }

    /// 端末表示用の色名
    pub fn color_name(&self) -> &'static str {
        match self {
            Palette::Danger => "red",
            Palette::Safe => "green",
        }
    }
}

/// ある時点の描画内容
#[derive(Debug, Clone, PartialEq)]
pub struct MeterFrame {
    /// 表示中の確信度
    pub displayed: f64,
    /// 円弧の塗り割合 (`displayed / 100`)
    pub fraction: f64,
    /// stroke-dashoffset 相当 (`circumference − fraction × circumference`)
    pub dash_offset: f64,
    pub palette: Palette,
    /// アニメーション完了済みか
    pub finished: bool,
}

impl MeterFrame {
    /// 中央に出す数値 ("73.2%")
    pub fn readout(&self) -> String {
        format!("{:.1}%", self.displayed)
    }
}

/// 確信度メーター
#[derive(Debug, Clone)]
pub struct ConfidenceMeter {
    confidence: f64,
    has_crack: bool,
    level: String,
    started_at: Instant,
}

impl ConfidenceMeter {
    pub fn new(confidence: f64, has_crack: bool, level: impl Into<String>, now: Instant) -> Self {
        Self {
            confidence,
            has_crack,
            level: level.into(),
            started_at: now,
        }
    }

    pub fn from_result(result: &AnalysisResult, now: Instant) -> Self {
        Self::new(
            result.confidence,
            result.has_crack,
            result.confidence_level.clone(),
            now,
        )
    }

    /// 新しい確信度で再開する（前回の表示値ではなく 0 から）
    pub fn restart(&mut self, confidence: f64, now: Instant) {
        self.confidence = confidence;
        self.started_at = now;
    }

    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    pub fn level(&self) -> &str {
        &self.level
    }

    pub fn palette(&self) -> Palette {
        Palette::for_verdict(self.has_crack)
    }

    /// `now` 時点のフレームを計算
    pub fn frame(&self, now: Instant) -> MeterFrame {
        let elapsed = now.saturating_duration_since(self.started_at);
        let displayed = displayed_at(self.confidence, elapsed);
        let fraction = displayed / 100.0;
        let circumference = circumference();

        MeterFrame {
            displayed,
            fraction,
            dash_offset: circumference - fraction * circumference,
            palette: self.palette(),
            finished: elapsed >= METER_DURATION,
        }
    }
}
