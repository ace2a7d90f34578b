use crate::error::{Result, TrackscanError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// サービスURL未設定時のデフォルト
pub const DEFAULT_SERVICE_URL: &str = "http://localhost:8080";

/// サービスURLを指定する環境変数（実行時・ビルド時の両方で参照）
pub const SERVICE_URL_ENV: &str = "TRACKSCAN_API_URL";

const DEFAULT_TIMEOUT_SECONDS: u64 = 60;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub service_url: Option<String>,
    pub timeout_seconds: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_config()
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Config = serde_json::from_str(&content)?;
            config.validate()?;
            Ok(config)
        } else {
            Ok(Self::default_config())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| TrackscanError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("trackscan").join("config.json"))
    }

    fn default_config() -> Self {
        Self {
            service_url: None,
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
        }
    }

    /// タイムアウトは1秒以上
    fn validate(&self) -> Result<()> {
        if self.timeout_seconds == 0 {
            return Err(TrackscanError::Config(
                "timeout_seconds は1以上を指定してください".into(),
            ));
        }
        Ok(())
    }

    pub fn set_service_url(&mut self, url: String) -> Result<()> {
        let trimmed = url.trim();
        if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
            return Err(TrackscanError::Config(format!(
                "サービスURLは http:// または https:// で始めてください: {}",
                trimmed
            )));
        }
        self.service_url = Some(trimmed.to_string());
        self.save()
    }

    /// サービスURLを決定
    ///
    /// 優先順位: CLI引数 > 実行時の環境変数 > 設定ファイル > ビルド時の環境変数 > デフォルト
    pub fn resolve_service_url(&self, flag: Option<&str>) -> String {
        let env = std::env::var(SERVICE_URL_ENV).ok();
        self.resolve_service_url_with(flag, env.as_deref())
    }

    pub fn resolve_service_url_with(&self, flag: Option<&str>, env: Option<&str>) -> String {
        let chosen = [flag, env, self.service_url.as_deref(), option_env!("TRACKSCAN_API_URL")]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|url| !url.is_empty())
            .unwrap_or(DEFAULT_SERVICE_URL);

        chosen.trim_end_matches('/').to_string()
    }
}
