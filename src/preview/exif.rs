use std::io::Cursor;

/// 撮影日時を取得（DateTimeOriginal → DateTime の順）
pub fn extract_date(bytes: &[u8]) -> Result<String, Box<dyn std::error::Error>> {
    let mut cursor = Cursor::new(bytes);
    let exif_reader = exif::Reader::new();
    let exif = exif_reader.read_from_container(&mut cursor)?;

    for tag in [exif::Tag::DateTimeOriginal, exif::Tag::DateTime] {
        if let Some(field) = exif.get_field(tag, exif::In::PRIMARY) {
            return Ok(field.display_value().to_string());
        }
    }

    Err("No date found in EXIF".into())
}
