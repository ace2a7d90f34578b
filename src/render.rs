//! 端末表示
//!
//! - AnalyzingIndicator: 解析中のスピナー。ワークフローを購読し、ドロップで確実に片付ける
//! - animate_meter: 確信度メーターを 1500ms かけて描画
//! - print_*: プレビュー・結果・エラーの各パネル

use crate::preview::Preview;
use crate::workflow::WorkflowState;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use trackscan_common::{AnalysisResult, ConfidenceMeter, MeterFrame};

const FRAME_INTERVAL: Duration = Duration::from_millis(16);
const SPINNER_TICK: Duration = Duration::from_millis(80);
const METER_STEPS: u64 = 1000;

const ANALYZING_MESSAGE: &str = "Analyzing Track... AI is inspecting for cracks";

/// 解析中スピナー
///
/// 生存中だけ状態を購読する。解析が終わるかガードが落ちた時点で消える。
pub struct AnalyzingIndicator {
    bar: ProgressBar,
    task: JoinHandle<()>,
}

impl AnalyzingIndicator {
    pub fn attach(mut rx: watch::Receiver<WorkflowState>) -> Self {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.set_message(ANALYZING_MESSAGE);
        bar.enable_steady_tick(SPINNER_TICK);

        let task_bar = bar.clone();
        let task = tokio::spawn(async move {
            loop {
                {
                    let state = rx.borrow_and_update();
                    if let Some(preview) = &state.preview {
                        task_bar.set_message(format!("{} [{}]", ANALYZING_MESSAGE, preview.summary()));
                    }
                    if !state.is_analyzing {
                        task_bar.finish_and_clear();
                        break;
                    }
                }
                if rx.changed().await.is_err() {
                    break;
                }
            }
        });

        Self { bar, task }
    }
}

impl Drop for AnalyzingIndicator {
    fn drop(&mut self) {
        self.task.abort();
        self.bar.finish_and_clear();
    }
}

pub fn print_preview(preview: &Preview) {
    println!("🖼  {}", preview.summary());
}

pub fn print_result(result: &AnalysisResult) {
    let icon = if result.has_crack { "⚠" } else { "✔" };
    println!("{} {}  [{}]", icon, result.headline(), result.badge());
    println!("   {}", result.message);
}

pub fn print_error(message: &str) {
    println!("✖ {}", message);
}

/// 確信度メーターをアニメーション表示
///
/// 端末でない場合は最終値だけを出力する。
pub async fn animate_meter(result: &AnalysisResult) {
    let meter = ConfidenceMeter::from_result(result, Instant::now());
    let bar = meter_bar(&meter);

    if bar.is_hidden() {
        let frame = meter.frame(Instant::now() + trackscan_common::METER_DURATION);
        println!("{}", meter_line(&meter, &frame));
        return;
    }

    let mut ticker = tokio::time::interval(FRAME_INTERVAL);
    loop {
        ticker.tick().await;
        let frame = meter.frame(Instant::now());
        bar.set_position(bar_position(&frame));
        bar.set_message(format!("{}  Confidence Level: {}", frame.readout(), meter.level()));
        if frame.finished {
            break;
        }
    }
    bar.finish();
}

fn meter_bar(meter: &ConfidenceMeter) -> ProgressBar {
    let bar = ProgressBar::new(METER_STEPS);
    let template = format!(
        "{{prefix}} [{{bar:40.{}/white}}] {{msg}}",
        meter.palette().color_name()
    );
    bar.set_style(
        ProgressStyle::with_template(&template)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓░"),
    );
    bar.set_prefix("Confidence");
    bar
}

fn bar_position(frame: &MeterFrame) -> u64 {
    (frame.fraction.clamp(0.0, 1.0) * METER_STEPS as f64).round() as u64
}

fn meter_line(meter: &ConfidenceMeter, frame: &MeterFrame) -> String {
    format!(
        "Confidence {}  Confidence Level: {}",
        frame.readout(),
        meter.level()
    )
}
