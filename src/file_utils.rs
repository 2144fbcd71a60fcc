// src/file_utils.rs
//! Plain-text extraction from uploaded résumé files

const ACCEPTED_CONTENT_TYPES: &[&str] = &[
    "text/plain",
    "application/pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
];

/// Only plain text is recognised by name alone; the match is case-sensitive.
const PLAIN_TEXT_SUFFIX: &str = ".txt";

/// Anything shorter is treated as a failed extraction.
pub const MIN_EXTRACTED_CHARS: usize = 50;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FileExtractionError {
    #[error("Unsupported file type: {0}")]
    UnsupportedType(String),
    #[error("Could not extract enough text from the file ({found} characters, need {min})")]
    InsufficientText { found: usize, min: usize },
}

/// Whether a file is accepted: any listed MIME type, or a `.txt` name.
pub fn is_supported(file_name: &str, content_type: Option<&str>) -> bool {
    let mime_ok = content_type
        .map(|ct| ct.split(';').next().unwrap_or(ct).trim().to_lowercase())
        .is_some_and(|ct| ACCEPTED_CONTENT_TYPES.contains(&ct.as_str()));

    mime_ok || file_name.ends_with(PLAIN_TEXT_SUFFIX)
}

/// Replace everything outside printable ASCII, CR and LF with a space.
pub fn clean_text(raw: &str) -> String {
    raw.chars()
        .map(|c| match c {
            '\r' | '\n' | ' '..='~' => c,
            _ => ' ',
        })
        .collect::<String>()
        .trim()
        .to_string()
}

/// Read the file as text. Binary formats are decoded lossily, so only their
/// embedded plain-text runs survive cleaning.
pub fn extract_text_from_file(
    file_name: &str,
    content_type: Option<&str>,
    bytes: &[u8],
) -> Result<String, FileExtractionError> {
    if !is_supported(file_name, content_type) {
        return Err(FileExtractionError::UnsupportedType(
            content_type.unwrap_or(file_name).to_string(),
        ));
    }

    let text = clean_text(&String::from_utf8_lossy(bytes));
    let found = text.chars().count();
    if found < MIN_EXTRACTED_CHARS {
        return Err(FileExtractionError::InsufficientText {
            found,
            min: MIN_EXTRACTED_CHARS,
        });
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supported_by_mime_or_txt_name() {
        assert!(is_supported("resume.txt", None));
        assert!(is_supported("resume.docx", Some("application/msword")));
        assert!(is_supported("upload", Some("application/pdf")));
        assert!(is_supported("upload", Some("text/plain; charset=utf-8")));
        assert!(!is_supported("photo.png", Some("image/png")));
        assert!(!is_supported("archive.zip", None));
    }

    #[test]
    fn test_name_fallback_is_plain_text_only() {
        assert!(!is_supported("resume.docx", None));
        assert!(!is_supported("resume.pdf", Some("application/octet-stream")));
        assert!(!is_supported("RESUME.TXT", None));
        assert!(is_supported("notes.txt", Some("application/octet-stream")));
        assert_eq!(
            extract_text_from_file("resume.doc", None, b"Plenty of readable text, no declared type"),
            Err(FileExtractionError::UnsupportedType("resume.doc".to_string()))
        );
    }

    #[test]
    fn test_clean_text_replaces_non_printable() {
        assert_eq!(clean_text("  Rust\tdeveloper\u{0}\u{7f}  "), "Rust developer");
        assert_eq!(clean_text("Line one\r\nLine two"), "Line one\r\nLine two");
        assert_eq!(clean_text("Café"), "Caf");
    }

    #[test]
    fn test_extract_text_from_plain_file() {
        let text = extract_text_from_file(
            "resume.txt",
            Some("text/plain"),
            b"Jane Doe\nSenior Rust Engineer, eight years of distributed systems\n",
        )
        .unwrap();
        assert_eq!(
            text,
            "Jane Doe\nSenior Rust Engineer, eight years of distributed systems"
        );
    }

    #[test]
    fn test_extract_rejects_unsupported_and_short() {
        assert_eq!(
            extract_text_from_file("photo.png", Some("image/png"), b"\x89PNG"),
            Err(FileExtractionError::UnsupportedType("image/png".to_string()))
        );
        assert_eq!(
            extract_text_from_file("blank.txt", None, b"\x00\x01  \n"),
            Err(FileExtractionError::InsufficientText { found: 0, min: MIN_EXTRACTED_CHARS })
        );
        assert!(matches!(
            extract_text_from_file("short.txt", None, b"Jane Doe, engineer"),
            Err(FileExtractionError::InsufficientText { found: 18, .. })
        ));
    }
}
