//! メディアタイプ判定

/// 受け付けるメディアタイプの接頭辞
pub const IMAGE_MEDIA_PREFIX: &str = "image/";

/// 画像のメディアタイプか判定
///
/// ドラッグ&ドロップやファイル選択の入口で使う。ここで弾かれたファイルは
/// 解析リクエストにならない。
pub fn is_image_media_type(media_type: &str) -> bool {
    media_type
        .trim()
        .to_ascii_lowercase()
        .starts_with(IMAGE_MEDIA_PREFIX)
}
