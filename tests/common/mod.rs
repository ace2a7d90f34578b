//! テスト用の推論サービス（axum でローカルに立てる）

#![allow(dead_code)]

use axum::extract::Multipart;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::Router;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

/// サーバーが受け取ったファイル
#[derive(Debug, Clone)]
pub struct ReceivedFile {
    pub field: String,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

pub struct MockService {
    pub addr: SocketAddr,
    pub received: Arc<Mutex<Vec<ReceivedFile>>>,
}

impl MockService {
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }
}

/// `/upload/` が常に `status` と `body` を返すサービスを起動
pub async fn spawn_service(status: StatusCode, body: &'static str) -> MockService {
    let received = Arc::new(Mutex::new(Vec::new()));
    let sink = received.clone();

    let app = Router::new()
        .route(
            "/upload/",
            post(move |mut multipart: Multipart| {
                let sink = sink.clone();
                async move {
                    while let Ok(Some(field)) = multipart.next_field().await {
                        let name = field.name().unwrap_or_default().to_string();
                        let file_name = field.file_name().map(str::to_string);
                        let content_type = field.content_type().map(str::to_string);
                        let bytes = field.bytes().await.map(|b| b.to_vec()).unwrap_or_default();
                        sink.lock().unwrap().push(ReceivedFile {
                            field: name,
                            file_name,
                            content_type,
                            bytes,
                        });
                    }
                    (status, [("content-type", "application/json")], body).into_response()
                }
            }),
        )
        .route(
            "/health",
            get(|| async {
                (
                    [("content-type", "application/json")],
                    r#"{"status": "healthy", "model_loaded": true}"#,
                )
            }),
        );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    MockService { addr, received }
}

/// 接続を受け付けないアドレス
pub async fn closed_address() -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

pub const CRACK_BODY: &str = r#"{
    "has_crack": true,
    "confidence": 87.5,
    "confidence_level": "High",
    "message": "Severe crack detected",
    "probability": 0.125,
    "class": "Faulty"
}"#;
