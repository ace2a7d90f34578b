use super::*;
use crate::error::AnalysisError;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use tokio::sync::Notify;
use tokio::time::Instant;
use trackscan_common::{AnalysisResult, ConfidenceMeter};

struct Scripted {
    gate: Option<Arc<Notify>>,
    outcome: Result<AnalysisResult, AnalysisError>,
}

/// 呼ばれた順に台本の応答を返すモック
#[derive(Default)]
struct MockAnalyzer {
    script: Mutex<VecDeque<Scripted>>,
    calls: AtomicUsize,
}

impl MockAnalyzer {
    fn respond(self, outcome: Result<AnalysisResult, AnalysisError>) -> Self {
        self.script.lock().unwrap().push_back(Scripted { gate: None, outcome });
        self
    }

    /// `gate` が通知されるまで応答を保留する
    fn respond_after(self, gate: Arc<Notify>, outcome: Result<AnalysisResult, AnalysisError>) -> Self {
        self.script.lock().unwrap().push_back(Scripted {
            gate: Some(gate),
            outcome,
        });
        self
    }
}

#[async_trait]
impl Analyzer for MockAnalyzer {
    async fn analyze(&self, _upload: &ImageUpload) -> Result<AnalysisResult, AnalysisError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let next = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .expect("unexpected analyze call");
        if let Some(gate) = next.gate {
            gate.notified().await;
        }
        next.outcome
    }
}

fn crack_result() -> AnalysisResult {
    AnalysisResult {
        has_crack: true,
        confidence: 87.5,
        confidence_level: "High".to_string(),
        message: "Severe crack detected".to_string(),
    }
}

fn clear_result(confidence: f64) -> AnalysisResult {
    AnalysisResult {
        has_crack: false,
        confidence,
        confidence_level: "Low".to_string(),
        message: "No crack detected".to_string(),
    }
}

fn jpeg(name: &str) -> ImageUpload {
    ImageUpload::new(name, "image/jpeg", b"\xFF\xD8fake-jpeg".to_vec()).unwrap()
}

async fn wait_until(
    rx: &mut watch::Receiver<WorkflowState>,
    f: impl FnMut(&WorkflowState) -> bool,
) -> WorkflowState {
    rx.wait_for(f).await.expect("workflow dropped").clone()
}

#[tokio::test(start_paused = true)]
async fn test_success_respects_pacing_floor() {
    let workflow = UploadWorkflow::new(MockAnalyzer::default().respond(Ok(crack_result())));
    let mut rx = workflow.subscribe();
    let start = Instant::now();

    workflow.submit(jpeg("track.jpg"));

    let state = workflow.state();
    assert!(state.is_analyzing);
    assert!(state.result.is_none());
    assert!(state.error.is_none());
    assert_eq!(state.phase(), Phase::Analyzing);

    let state = wait_until(&mut rx, |s| s.result.is_some()).await;
    assert!(start.elapsed() >= PACING_DELAY);
    assert!(!state.is_analyzing);
    assert!(state.error.is_none());

    let result = state.result.unwrap();
    assert!(result.has_crack);
    assert_eq!(result.confidence_level, "High");

    let now = std::time::Instant::now();
    let meter = ConfidenceMeter::from_result(&result, now);
    let frame = meter.frame(now + trackscan_common::METER_DURATION);
    assert_eq!(frame.readout(), "87.5%");
}

#[tokio::test(start_paused = true)]
async fn test_result_not_published_before_pacing_delay() {
    let workflow = UploadWorkflow::new(MockAnalyzer::default().respond(Ok(crack_result())));

    workflow.submit(jpeg("track.jpg"));

    tokio::time::sleep(Duration::from_millis(1499)).await;
    let state = workflow.state();
    assert!(state.is_analyzing);
    assert!(state.result.is_none());

    tokio::time::sleep(Duration::from_millis(2)).await;
    let state = workflow.state();
    assert!(!state.is_analyzing);
    assert!(state.result.is_some());
}

#[tokio::test(start_paused = true)]
async fn test_custom_pacing() {
    let workflow = UploadWorkflow::new(MockAnalyzer::default().respond(Ok(crack_result())))
        .with_pacing(Duration::from_millis(200));
    let start = Instant::now();

    workflow.submit(jpeg("track.jpg")).finished().await;

    let elapsed = start.elapsed();
    assert!(elapsed >= Duration::from_millis(200));
    assert!(elapsed < PACING_DELAY);
    assert!(workflow.state().result.is_some());
}

#[tokio::test(start_paused = true)]
async fn test_service_failure_sets_generic_error_without_pacing() {
    let workflow = UploadWorkflow::new(
        MockAnalyzer::default().respond(Err(AnalysisError::ServiceFailure)),
    );
    let mut rx = workflow.subscribe();
    let start = Instant::now();

    workflow.submit(jpeg("track.jpg"));

    let state = wait_until(&mut rx, |s| s.error.is_some()).await;
    assert_eq!(state.error.as_deref(), Some("Analysis failed. Please try again."));
    assert!(!state.is_analyzing);
    assert!(state.result.is_none());
    assert!(start.elapsed() < PACING_DELAY);
}

#[tokio::test(start_paused = true)]
async fn test_transport_failure_messages() {
    let workflow = UploadWorkflow::new(
        MockAnalyzer::default()
            .respond(Err(AnalysisError::transport("connection refused")))
            .respond(Err(AnalysisError::transport(""))),
    );

    workflow.submit(jpeg("a.jpg")).finished().await;
    assert_eq!(workflow.state().error.as_deref(), Some("connection refused"));

    workflow.submit(jpeg("b.jpg")).finished().await;
    assert_eq!(workflow.state().error.as_deref(), Some("Failed to analyze image"));
}

#[tokio::test(start_paused = true)]
async fn test_new_submission_clears_previous_outcome_immediately() {
    let gate = Arc::new(Notify::new());
    let workflow = UploadWorkflow::new(
        MockAnalyzer::default()
            .respond(Err(AnalysisError::ServiceFailure))
            .respond_after(gate.clone(), Ok(crack_result())),
    );

    workflow.submit(jpeg("a.jpg")).finished().await;
    assert!(workflow.state().error.is_some());

    let handle = workflow.submit(jpeg("b.jpg"));
    let state = workflow.state();
    assert!(state.error.is_none());
    assert!(state.result.is_none());
    assert!(state.is_analyzing);

    gate.notify_one();
    handle.finished().await;
    assert!(workflow.state().result.is_some());
}

#[tokio::test(start_paused = true)]
async fn test_preview_is_derived_independently() {
    let gate = Arc::new(Notify::new());
    let workflow =
        UploadWorkflow::new(MockAnalyzer::default().respond_after(gate.clone(), Ok(crack_result())));
    let mut rx = workflow.subscribe();

    let handle = workflow.submit(jpeg("track.jpg"));

    // 解析応答が届く前にプレビューが入る
    let state = wait_until(&mut rx, |s| s.preview.is_some()).await;
    assert!(state.is_analyzing);
    let preview = state.preview.unwrap();
    assert_eq!(preview.file_name, "track.jpg");
    assert!(preview.data_url.starts_with("data:image/jpeg;base64,"));

    gate.notify_one();
    handle.finished().await;
    assert!(workflow.state().preview.is_some());
}

#[tokio::test(start_paused = true)]
async fn test_reset_clears_everything() {
    let workflow = UploadWorkflow::new(
        MockAnalyzer::default()
            .respond(Ok(crack_result()))
            .respond(Err(AnalysisError::ServiceFailure)),
    );

    workflow.reset();
    let state = workflow.state();
    assert!(state.preview.is_none() && state.result.is_none() && state.error.is_none());

    workflow.submit(jpeg("a.jpg")).finished().await;
    assert!(workflow.state().result.is_some());
    assert!(workflow.state().preview.is_some());
    workflow.reset();
    let state = workflow.state();
    assert!(state.preview.is_none() && state.result.is_none() && state.error.is_none());
    assert_eq!(state.phase(), Phase::Empty);

    workflow.submit(jpeg("b.jpg")).finished().await;
    assert!(workflow.state().error.is_some());
    workflow.reset();
    let state = workflow.state();
    assert!(state.preview.is_none() && state.result.is_none() && state.error.is_none());
}

#[tokio::test(start_paused = true)]
async fn test_non_image_is_ignored() {
    let workflow = UploadWorkflow::new(MockAnalyzer::default());

    let handle = workflow.offer(FileCandidate::new("notes.txt", "text/plain", b"hello".to_vec()));
    assert!(handle.is_none());

    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(workflow.state(), WorkflowState::default());
    assert_eq!(workflow.analyzer.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn test_offer_accepts_image() {
    let workflow = UploadWorkflow::new(MockAnalyzer::default().respond(Ok(clear_result(91.0))));

    let handle = workflow
        .offer(FileCandidate::new("rail.png", "image/png", vec![1, 2, 3]))
        .expect("image should be accepted");
    handle.finished().await;

    assert_eq!(workflow.state().result.unwrap().confidence, 91.0);
}

#[tokio::test(start_paused = true)]
async fn test_stale_response_discarded_after_reset() {
    let gate = Arc::new(Notify::new());
    let workflow =
        UploadWorkflow::new(MockAnalyzer::default().respond_after(gate.clone(), Ok(crack_result())));

    let handle = workflow.submit(jpeg("a.jpg"));
    workflow.reset();

    gate.notify_one();
    handle.finished().await;

    let state = workflow.state();
    assert!(state.result.is_none());
    assert!(state.error.is_none());
    assert!(state.preview.is_none());
    assert!(!state.is_analyzing);
}

#[tokio::test(start_paused = true)]
async fn test_stale_failure_discarded_after_reset() {
    let gate = Arc::new(Notify::new());
    let workflow = UploadWorkflow::new(
        MockAnalyzer::default().respond_after(gate.clone(), Err(AnalysisError::ServiceFailure)),
    );

    let handle = workflow.submit(jpeg("a.jpg"));
    workflow.reset();
    gate.notify_one();
    handle.finished().await;

    assert!(workflow.state().error.is_none());
}

#[tokio::test(start_paused = true)]
async fn test_resubmission_supersedes_in_flight_cycle() {
    let gate = Arc::new(Notify::new());
    let workflow = UploadWorkflow::new(
        MockAnalyzer::default()
            .respond_after(gate.clone(), Ok(crack_result()))
            .respond(Ok(clear_result(12.0))),
    );

    let first = workflow.submit(jpeg("a.jpg"));
    // 1件目の解析タスクを先に走らせて台本の1件目を取らせる
    tokio::task::yield_now().await;
    let second = workflow.submit(jpeg("b.jpg"));
    assert!(second.cycle > first.cycle);

    second.finished().await;
    assert_eq!(workflow.state().result.as_ref().unwrap().confidence, 12.0);

    gate.notify_one();
    first.finished().await;

    let state = workflow.state();
    let result = state.result.unwrap();
    assert!(!result.has_crack);
    assert_eq!(result.confidence, 12.0);
    assert_eq!(state.preview.unwrap().file_name, "b.jpg");
}

#[tokio::test(start_paused = true)]
async fn test_invariants_hold_for_every_observed_state() {
    let gate = Arc::new(Notify::new());
    let workflow = UploadWorkflow::new(
        MockAnalyzer::default()
            .respond(Ok(crack_result()))
            .respond(Err(AnalysisError::ServiceFailure))
            .respond_after(gate.clone(), Ok(clear_result(40.0))),
    );

    let mut rx = workflow.subscribe();
    let monitor = tokio::spawn(async move {
        let mut seen = 0usize;
        while rx.changed().await.is_ok() {
            let state = rx.borrow_and_update().clone();
            assert!(state.is_consistent(), "inconsistent state: {:?}", state);
            // 解析中 ⇔ 結果もエラーもまだない
            if state.is_analyzing {
                assert!(state.result.is_none() && state.error.is_none());
            }
            seen += 1;
        }
        seen
    });

    workflow.submit(jpeg("a.jpg")).finished().await;
    workflow.submit(jpeg("b.jpg")).finished().await;
    let third = workflow.submit(jpeg("c.jpg"));
    workflow.reset();
    gate.notify_one();
    third.finished().await;

    assert!(workflow.state().is_consistent());
    drop(workflow);
    let seen = monitor.await.unwrap();
    assert!(seen > 0);
}

/// analyze の途中で panic する解析器
struct PanickingAnalyzer;

#[async_trait]
impl Analyzer for PanickingAnalyzer {
    async fn analyze(&self, _upload: &ImageUpload) -> Result<AnalysisResult, AnalysisError> {
        panic!("model crashed");
    }
}

#[tokio::test(start_paused = true)]
async fn test_panicking_analyzer_still_ends_cycle() {
    let workflow = UploadWorkflow::new(PanickingAnalyzer);

    workflow.submit(jpeg("a.jpg")).finished().await;

    let state = workflow.state();
    assert!(!state.is_analyzing);
    assert!(state.result.is_none());
    assert_eq!(state.error.as_deref(), Some("Failed to analyze image"));
    assert_eq!(state.phase(), Phase::Failed);
    assert!(state.is_consistent());
}

#[tokio::test(start_paused = true)]
async fn test_panic_after_reset_leaves_state_empty() {
    let workflow = UploadWorkflow::new(PanickingAnalyzer);

    let handle = workflow.submit(jpeg("a.jpg"));
    workflow.reset();
    handle.finished().await;

    assert_eq!(workflow.state().phase(), Phase::Empty);
    assert!(workflow.state().error.is_none());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_submit_never_exposes_idle_state() {
    let rounds = 50;
    let mut analyzer = MockAnalyzer::default();
    for i in 0..rounds {
        analyzer = analyzer.respond(Ok(clear_result(i as f64)));
    }
    let workflow = UploadWorkflow::new(analyzer).with_pacing(Duration::ZERO);

    let mut rx = workflow.subscribe();
    let monitor = tokio::spawn(async move {
        while rx.changed().await.is_ok() {
            let state = rx.borrow_and_update().clone();
            // リセットしないので、最初の投入以降は空の状態に戻らない
            assert_ne!(state.phase(), Phase::Empty, "idle state observed: {:?}", state);
        }
    });

    for i in 0..rounds {
        workflow.submit(jpeg(&format!("{}.jpg", i))).finished().await;
    }

    drop(workflow);
    monitor.await.unwrap();
}
