//! HTTP経由の推論サービス呼び出し
//!
//! - `POST {base}/upload/` に multipart の `file` フィールドで画像を送る
//! - `GET {base}/health` でモデルの読み込み状態を確認する

use super::Analyzer;
use crate::error::{AnalysisError, Result, TrackscanError};
use crate::upload::ImageUpload;
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use std::time::Duration;
use tracing::{debug, warn};
use trackscan_common::{parse_analysis_response, AnalysisResult, HealthStatus};

pub struct HttpAnalyzer {
    client: reqwest::Client,
    base_url: String,
}

impl HttpAnalyzer {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TrackscanError::HttpClient(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn upload_url(&self) -> String {
        format!("{}/upload/", self.base_url)
    }

    pub fn health_url(&self) -> String {
        format!("{}/health", self.base_url)
    }

    /// サービスのヘルスチェック
    pub async fn health(&self) -> Result<HealthStatus> {
        let response = self
            .client
            .get(self.health_url())
            .send()
            .await
            .map_err(|e| TrackscanError::Health(e.to_string()))?;

        if !response.status().is_success() {
            return Err(TrackscanError::Health(format!("status {}", response.status())));
        }

        response
            .json::<HealthStatus>()
            .await
            .map_err(|e| TrackscanError::Health(e.to_string()))
    }
}

#[async_trait]
impl Analyzer for HttpAnalyzer {
    async fn analyze(&self, upload: &ImageUpload) -> std::result::Result<AnalysisResult, AnalysisError> {
        let part = Part::bytes(upload.bytes().to_vec())
            .file_name(upload.file_name().to_string())
            .mime_str(upload.media_type())
            .map_err(AnalysisError::transport)?;
        let form = Form::new().part("file", part);

        let url = self.upload_url();
        debug!(%url, file = upload.file_name(), bytes = upload.bytes().len(), "sending analysis request");

        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(AnalysisError::transport)?;

        let status = response.status();
        if !status.is_success() {
            warn!(%status, file = upload.file_name(), "analysis service returned failure status");
            return Err(AnalysisError::ServiceFailure);
        }

        let body = response.text().await.map_err(AnalysisError::transport)?;

        parse_analysis_response(&body).map_err(|e| match e {
            trackscan_common::Error::ServiceReported(message) => {
                warn!(file = upload.file_name(), %message, "analysis service reported an error");
                AnalysisError::ServiceFailure
            }
            other => {
                warn!(file = upload.file_name(), error = %other, "malformed analysis response");
                AnalysisError::transport(other)
            }
        })
    }
}
