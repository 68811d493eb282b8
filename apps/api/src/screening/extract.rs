//! Resume text extraction. PDF via `pdf-extract`; anything ending `.txt`
//! is decoded as (lossy) UTF-8. Other formats are rejected up front.

use crate::errors::AppError;

/// Extensions the upload endpoint accepts.
const ALLOWED_EXTENSIONS: &[&str] = &[".pdf", ".txt"];

pub fn is_supported(file_name: &str) -> bool {
    let name = file_name.to_lowercase();
    ALLOWED_EXTENSIONS.iter().any(|ext| name.ends_with(ext))
}

/// Extracts plain text from an uploaded resume.
pub fn extract_text(file_name: &str, content: &[u8]) -> Result<String, AppError> {
    let name = file_name.to_lowercase();
    if !is_supported(&name) {
        return Err(AppError::UnsupportedMedia(
            "Unsupported file type. Upload PDF or TXT only.".to_string(),
        ));
    }

    if name.ends_with(".pdf") {
        pdf_extract::extract_text_from_mem(content).map_err(|e| {
            tracing::warn!("PDF extraction failed for {file_name}: {e}");
            AppError::Unprocessable("Parsed text is empty or unreadable.".to_string())
        })
    } else {
        Ok(String::from_utf8_lossy(content).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supported_extensions_case_insensitive() {
        assert!(is_supported("resume.pdf"));
        assert!(is_supported("RESUME.PDF"));
        assert!(is_supported("notes.txt"));
        assert!(!is_supported("resume.docx"));
        assert!(!is_supported("resume"));
    }

    #[test]
    fn test_plain_text_passthrough() {
        let text = extract_text("resume.txt", b"5 years of Rust").unwrap();
        assert_eq!(text, "5 years of Rust");
    }

    #[test]
    fn test_invalid_utf8_is_lossy_not_fatal() {
        let text = extract_text("resume.txt", &[0x66, 0x6f, 0xff, 0x6f]).unwrap();
        assert!(text.contains('\u{FFFD}'));
    }

    #[test]
    fn test_unknown_extension_rejected() {
        assert!(matches!(
            extract_text("resume.exe", b"whatever"),
            Err(AppError::UnsupportedMedia(_))
        ));
    }
}
