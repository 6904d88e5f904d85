//! End-to-end script replay with an in-process recognition service.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use inkcalc_cli::{parse_script, CliConfig, InkCalcApp};
use inkcalc_client::{ClientError, RecognitionClient, RecognitionTransport};
use inkcalc_core::{Position, RecognitionRequest};
use inkcalc_renderer::{CanvasRenderer, RendererConfig};
use serde_json::{json, Value};

/// Answers with the scripted payloads in order, then an HTTP 503.
struct Scripted {
    answers: Vec<Value>,
    calls: AtomicUsize,
    images: Mutex<Vec<String>>,
}

impl Scripted {
    fn new(answers: Vec<Value>) -> Self {
        Self {
            answers,
            calls: AtomicUsize::new(0),
            images: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl RecognitionTransport for Scripted {
    async fn recognize(&self, request: &RecognitionRequest) -> Result<Value, ClientError> {
        assert!(request.image.starts_with("data:image/png;base64,"));
        self.images.lock().unwrap().push(request.image.clone());
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        self.answers.get(call).cloned().ok_or(ClientError::Status {
            status: 503,
            body: "exhausted".into(),
        })
    }
}

fn small_config() -> CliConfig {
    CliConfig {
        width: 200,
        height: 100,
        ..CliConfig::default()
    }
}

fn app_with(answers: Vec<Value>) -> InkCalcApp<Scripted> {
    let client = RecognitionClient::with_transport(Scripted::new(answers));
    InkCalcApp::with_client(&small_config(), client).expect("app")
}

fn assignment_batch() -> Value {
    json!({
        "data": [
            { "expr": "x", "result": "5", "assign": true },
            { "expr": "x+2", "result": "7", "assign": false }
        ]
    })
}

#[tokio::test]
async fn test_draw_run_and_drag() {
    let mut app = app_with(vec![assignment_batch()]);
    let actions = parse_script(
        r#"[
            { "action": "width", "value": 6 },
            { "action": "stroke", "points": [[20, 50], [100, 50], [180, 50]] },
            { "action": "run" },
            { "action": "drag", "overlay": 1, "x": 10, "y": 20 }
        ]"#,
    )
    .expect("script");

    app.run_script(&actions).await.expect("replay");

    let summary = app.summary();
    assert_eq!(summary.strokes, 0);
    assert_eq!(summary.bindings.get("x").map(String::as_str), Some("5"));
    assert_eq!(summary.overlays.len(), 2);
    assert_eq!(summary.overlays[0].content, r"\(\LARGE{x = 5}\)");
    assert_eq!(summary.overlays[0].position, Position::new(100.0, 50.0));
    assert_eq!(summary.overlays[1].position, Position::new(10.0, 20.0));
    assert!(summary.notices.is_empty());

    // Typeset once for the new batch and once for the drag.
    assert_eq!(app.typesetter().runs(), 2);
    assert_eq!(app.typesetter().rendered().len(), 2);
    assert_eq!(app.renderer().painted_pixels(), 0);
}

#[tokio::test]
async fn test_undo_restores_strokes_cleared_by_recognition() {
    let mut app = app_with(vec![json!({ "data": [] })]);
    let actions = parse_script(
        r#"[
            { "action": "stroke", "points": [[20, 50], [180, 50]] },
            { "action": "run" },
            { "action": "undo" }
        ]"#,
    )
    .expect("script");

    app.run_script(&actions).await.expect("replay");

    assert_eq!(app.summary().strokes, 1);
    assert!(app.renderer().painted_pixels() > 0);
}

#[tokio::test]
async fn test_failed_run_keeps_drawing_and_notifies() {
    let mut app = app_with(vec![]);
    let actions = parse_script(
        r#"[
            { "action": "stroke", "points": [[20, 50], [180, 50]] },
            { "action": "run" }
        ]"#,
    )
    .expect("script");

    app.run_script(&actions).await.expect("replay");

    let summary = app.summary();
    assert_eq!(summary.strokes, 1);
    assert!(summary.overlays.is_empty());
    assert_eq!(summary.notices.len(), 1);
    assert!(summary.notices[0].contains("unavailable"));
    assert!(!app.session().read().is_recognizing());
}

#[tokio::test]
async fn test_bindings_flow_into_next_request_and_reset_clears() {
    let mut app = app_with(vec![
        assignment_batch(),
        json!({ "data": [{ "expr": "x*2", "result": "10", "assign": false }] }),
    ]);
    let actions = parse_script(
        r#"[
            { "action": "stroke", "points": [[10, 10], [50, 50]] },
            { "action": "run" },
            { "action": "stroke", "points": [[60, 10], [90, 50]] },
            { "action": "run" }
        ]"#,
    )
    .expect("script");
    app.run_script(&actions).await.expect("replay");
    assert_eq!(app.summary().overlays.len(), 3);

    app.run_script(&parse_script(r#"[{ "action": "reset" }]"#).expect("script"))
        .await
        .expect("reset");
    let summary = app.summary();
    assert!(summary.overlays.is_empty());
    assert!(summary.bindings.is_empty());
    assert_eq!(summary.strokes, 0);
}

#[tokio::test]
async fn test_resize_keeps_drawing_and_export_writes_png() {
    let mut app = app_with(vec![]);
    let actions = parse_script(
        r#"[
            { "action": "width", "value": 8 },
            { "action": "stroke", "points": [[20, 50], [180, 50]] },
            { "action": "resize", "width": 400, "height": 300 }
        ]"#,
    )
    .expect("script");
    app.run_script(&actions).await.expect("replay");

    assert_eq!(app.renderer().width(), 400);
    assert_eq!(app.renderer().alpha_at(100, 50), Some(255));

    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("canvas.png");
    app.export_png(&path).expect("export");
    let bytes = std::fs::read(&path).expect("read back");
    assert_eq!(&bytes[1..4], b"PNG");
}

#[tokio::test]
async fn test_eraser_and_tool_notices() {
    let mut app = app_with(vec![]);
    let actions = parse_script(
        r#"[
            { "action": "width", "value": 4 },
            { "action": "stroke", "points": [[20, 50], [180, 50]] },
            { "action": "eraser" },
            { "action": "width", "value": 20 },
            { "action": "stroke", "points": [[80, 50], [120, 50]] },
            { "action": "color", "value": "chartreuse" },
            { "action": "width", "value": -1 }
        ]"#,
    )
    .expect("script");
    app.run_script(&actions).await.expect("replay");

    assert_eq!(app.renderer().alpha_at(100, 50), Some(0));
    assert_eq!(app.renderer().alpha_at(40, 50), Some(255));
    assert_eq!(app.summary().notices.len(), 2);
}

#[tokio::test]
async fn test_drag_of_missing_overlay_is_a_script_error() {
    let mut app = app_with(vec![]);
    let actions =
        parse_script(r#"[{ "action": "drag", "overlay": 3, "x": 1, "y": 1 }]"#).expect("script");
    let err = app.run_script(&actions).await.unwrap_err();
    assert!(format!("{err:#}").contains("No overlay at index 3"));
}

#[tokio::test]
async fn test_repeated_down_is_not_a_recognition_notice() {
    let mut app = app_with(vec![]);
    let actions = parse_script(
        r#"[
            { "action": "down", "x": 10, "y": 10 },
            { "action": "down", "x": 20, "y": 20 },
            { "action": "move", "x": 60, "y": 40 },
            { "action": "up" }
        ]"#,
    )
    .expect("script");
    app.run_script(&actions).await.expect("replay");

    let summary = app.summary();
    assert!(summary.notices.is_empty());
    assert_eq!(summary.strokes, 1);
}

#[tokio::test]
async fn test_tap_is_in_recognition_snapshot() {
    let mut app = app_with(vec![json!({ "data": [] })]);
    let actions = parse_script(
        r#"[
            { "action": "width", "value": 10 },
            { "action": "down", "x": 50, "y": 50 },
            { "action": "run" }
        ]"#,
    )
    .expect("script");
    app.run_script(&actions).await.expect("replay");

    let blank = CanvasRenderer::new(200, 100, RendererConfig::default()).expect("renderer");
    let blank = blank.to_data_url().expect("blank url");
    let images = app.client().transport().images.lock().unwrap();
    assert_eq!(images.len(), 1);
    assert_ne!(images[0], blank);
    assert_eq!(app.summary().strokes, 0);
}
