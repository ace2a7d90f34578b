//! 入力ファイルと解析リクエスト
//!
//! - FileCandidate: 入力面（パス指定・フォルダ走査・対話入力）から来たファイル
//! - ImageUpload: 画像と判定済みのファイル。解析リクエストはこれからしか作れない

use crate::error::{Result, TrackscanError};
use std::path::Path;
use trackscan_common::is_image_media_type;

/// 拡張子から判別できないときのメディアタイプ
const FALLBACK_MEDIA_TYPE: &str = "application/octet-stream";

/// パスの拡張子からメディアタイプを推定
pub fn media_type_for(path: &Path) -> String {
    mime_guess::from_path(path)
        .first_raw()
        .unwrap_or(FALLBACK_MEDIA_TYPE)
        .to_string()
}

/// 入力面から受け取った未検証のファイル
#[derive(Debug, Clone)]
pub struct FileCandidate {
    pub file_name: String,
    pub media_type: String,
    pub bytes: Vec<u8>,
}

impl FileCandidate {
    pub fn new(file_name: impl Into<String>, media_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            media_type: media_type.into(),
            bytes,
        }
    }

    /// 拡張子からメディアタイプを推定して読み込む
    pub fn from_path(path: &Path) -> Result<Self> {
        Self::read_as(path, media_type_for(path))
    }

    /// 宣言済みのメディアタイプで読み込む（フォルダ走査の結果など）
    pub fn read_as(path: &Path, media_type: impl Into<String>) -> Result<Self> {
        if !path.is_file() {
            return Err(TrackscanError::FileNotFound(path.display().to_string()));
        }

        let bytes = std::fs::read(path)?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        Ok(Self::new(file_name, media_type, bytes))
    }

    /// 画像なら ImageUpload に変換、それ以外は None
    pub fn into_upload(self) -> Option<ImageUpload> {
        ImageUpload::new(self.file_name, self.media_type, self.bytes)
    }
}

/// 解析リクエストのペイロード（画像バイト列 + 宣言メディアタイプ）
#[derive(Debug, Clone, PartialEq)]
pub struct ImageUpload {
    file_name: String,
    media_type: String,
    bytes: Vec<u8>,
}

impl ImageUpload {
    pub fn new(
        file_name: impl Into<String>,
        media_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Option<Self> {
        let media_type = media_type.into();
        if !is_image_media_type(&media_type) {
            return None;
        }
        Some(Self {
            file_name: file_name.into(),
            media_type,
            bytes,
        })
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}
