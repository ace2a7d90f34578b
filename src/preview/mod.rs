//! ローカルプレビュー生成
//!
//! 選択された画像からネットワークを介さずに表示用の情報を作る。
//! デコードに失敗しても data URL だけは必ず作る。

mod exif;

use crate::upload::ImageUpload;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use image::ImageReader;
use std::io::Cursor;

#[derive(Debug, Clone, PartialEq)]
pub struct Preview {
    pub file_name: String,
    /// `data:<media type>;base64,...`
    pub data_url: String,
    pub byte_len: usize,
    /// (幅, 高さ)。デコードできない場合は None
    pub dimensions: Option<(u32, u32)>,
    /// EXIF撮影日時
    pub captured_at: Option<String>,
}

impl Preview {
    /// 一行表示用の要約
    pub fn summary(&self) -> String {
        let mut parts = vec![self.file_name.clone()];
        if let Some((w, h)) = self.dimensions {
            parts.push(format!("{}x{}", w, h));
        }
        parts.push(format_size(self.byte_len));
        if let Some(date) = &self.captured_at {
            parts.push(date.clone());
        }
        parts.join(" · ")
    }
}

/// プレビューを生成（ブロッキング処理）
pub fn derive_preview(upload: &ImageUpload) -> Preview {
    let bytes = upload.bytes();

    let dimensions = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .ok()
        .and_then(|reader| reader.into_dimensions().ok());

    Preview {
        file_name: upload.file_name().to_string(),
        data_url: data_url(upload.media_type(), bytes),
        byte_len: bytes.len(),
        dimensions,
        captured_at: exif::extract_date(bytes).ok(),
    }
}

pub fn data_url(media_type: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", media_type, STANDARD.encode(bytes))
}

fn format_size(bytes: usize) -> String {
    if bytes >= 1024 * 1024 {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    } else if bytes >= 1024 {
        format!("{:.0} KB", bytes as f64 / 1024.0)
    } else {
        format!("{} B", bytes)
    }
}
