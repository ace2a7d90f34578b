use crate::error::{Result, TrackscanError};
use crate::upload::media_type_for;
use std::path::{Path, PathBuf};
use trackscan_common::is_image_media_type;
use walkdir::WalkDir;

#[derive(Debug, Clone)]
pub struct ImageInfo {
    pub path: PathBuf,
    pub file_name: String,
    pub media_type: String,
}

/// フォルダ内の画像を列挙
///
/// 拡張子から推定したメディアタイプが `image/*` のものだけを返す。
pub fn scan_folder(folder: &Path, recursive: bool) -> Result<Vec<ImageInfo>> {
    if !folder.is_dir() {
        return Err(TrackscanError::FolderNotFound(folder.display().to_string()));
    }

    let max_depth = if recursive { usize::MAX } else { 1 };
    let mut images = Vec::new();

    for entry in WalkDir::new(folder)
        .max_depth(max_depth)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();

        if !path.is_file() {
            continue;
        }

        let media_type = media_type_for(path);
        if !is_image_media_type(&media_type) {
            continue;
        }

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        images.push(ImageInfo {
            path: path.to_path_buf(),
            file_name,
            media_type,
        });
    }

    // パスでソート
    images.sort_by(|a, b| a.path.cmp(&b.path));

    Ok(images)
}
