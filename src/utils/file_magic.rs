/// 验证文件内容的魔术字节是否与扩展名匹配
///
/// * `data` - 文件内容的前几个字节
/// * `extension` - 文件扩展名（包含点号，如 ".png"）
///
/// 未知扩展名一律拒绝。
pub fn validate_magic_bytes(data: &[u8], extension: &str) -> bool {
    if data.is_empty() {
        return false;
    }

    match extension.to_lowercase().as_str() {
        // 图片
        ".png" => data.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]),
        ".jpg" | ".jpeg" => data.starts_with(&[0xFF, 0xD8, 0xFF]),
        ".gif" => data.starts_with(b"GIF87a") || data.starts_with(b"GIF89a"),
        ".webp" => is_riff(data, b"WEBP"),

        // 文档
        ".pdf" => data.starts_with(b"%PDF"),
        // OOXML 与 zip 同为 ZIP 容器
        ".docx" | ".xlsx" | ".pptx" | ".zip" => data.starts_with(&[0x50, 0x4B, 0x03, 0x04]),

        // 音频（听力材料）
        ".mp3" => {
            data.starts_with(b"ID3")
                || (data.len() >= 2 && data[0] == 0xFF && (data[1] & 0xE0) == 0xE0)
        }
        ".wav" => is_riff(data, b"WAVE"),
        ".ogg" => data.starts_with(b"OggS"),
        ".m4a" => is_iso_media(data),

        // 视频（考试录屏）
        ".mp4" => is_iso_media(data),
        // Matroska/WebM 的 EBML 头
        ".webm" => data.starts_with(&[0x1A, 0x45, 0xDF, 0xA3]),

        // 纯文本不检查
        ".txt" | ".md" | ".csv" => true,

        _ => false,
    }
}

fn is_riff(data: &[u8], form: &[u8; 4]) -> bool {
    data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == form
}

// ISO base media（mp4 / m4a）在偏移 4 处为 "ftyp"
fn is_iso_media(data: &[u8]) -> bool {
    data.len() >= 8 && &data[4..8] == b"ftyp"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_png_magic() {
        let png_header = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
        assert!(validate_magic_bytes(&png_header, ".png"));
        assert!(validate_magic_bytes(&png_header, ".PNG"));
        assert!(!validate_magic_bytes(&png_header, ".jpg"));
    }

    #[test]
    fn test_pdf_magic() {
        assert!(validate_magic_bytes(b"%PDF-1.7", ".pdf"));
        assert!(!validate_magic_bytes(b"%PDF-1.7", ".docx"));
    }

    #[test]
    fn test_recording_formats() {
        let webm = [0x1A, 0x45, 0xDF, 0xA3, 0x9F, 0x42];
        assert!(validate_magic_bytes(&webm, ".webm"));
        assert!(!validate_magic_bytes(&webm, ".mp4"));

        let mp4 = [0x00, 0x00, 0x00, 0x20, b'f', b't', b'y', b'p', b'i', b's', b'o', b'm'];
        assert!(validate_magic_bytes(&mp4, ".mp4"));
        assert!(validate_magic_bytes(&mp4, ".m4a"));
    }

    #[test]
    fn test_audio_formats() {
        assert!(validate_magic_bytes(b"ID3\x04\x00", ".mp3"));
        assert!(validate_magic_bytes(&[0xFF, 0xFB, 0x90], ".mp3"));
        assert!(validate_magic_bytes(b"RIFF\x24\x00\x00\x00WAVEfmt ", ".wav"));
        assert!(!validate_magic_bytes(b"RIFF\x24\x00\x00\x00WEBPVP8 ", ".wav"));
        assert!(validate_magic_bytes(b"OggS\x00\x02", ".ogg"));
    }

    #[test]
    fn test_text_and_unknown() {
        assert!(validate_magic_bytes(b"hello", ".txt"));
        assert!(!validate_magic_bytes(&[], ".txt"));
        assert!(!validate_magic_bytes(&[0x4D, 0x5A], ".exe"));
    }
}
