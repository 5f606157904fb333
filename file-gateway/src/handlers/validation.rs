// Input validation and header helpers

use axum::http::HeaderValue;

/// S3 object keys are limited to 1024 bytes of UTF-8
pub const MAX_KEY_LENGTH: usize = 1024;

pub fn validate_file_name(name: &str) -> Result<(), String> {
    if name.trim().is_empty() {
        return Err("File name must not be empty".to_string());
    }
    if name.len() > MAX_KEY_LENGTH {
        return Err(format!(
            "File name is {} bytes, maximum is {}",
            name.len(),
            MAX_KEY_LENGTH
        ));
    }
    if name.chars().any(char::is_control) {
        return Err("File name must not contain control characters".to_string());
    }
    Ok(())
}

/// Required query parameter: present and non-blank
pub fn require_param(value: Option<String>, name: &str) -> Result<String, String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(format!("Missing required query parameter '{}'", name)),
    }
}

/// `attachment; filename="<name>"` with the name escaped as an HTTP quoted-string
pub fn content_disposition(file_name: &str) -> HeaderValue {
    let mut escaped = String::with_capacity(file_name.len());
    for c in file_name.chars() {
        match c {
            '"' | '\\' => {
                escaped.push('\\');
                escaped.push(c);
            }
            c if c.is_control() => escaped.push('_'),
            c => escaped.push(c),
        }
    }

    let value = format!("attachment; filename=\"{}\"", escaped);
    // Non-ASCII bytes are valid obs-text, control characters are already gone
    HeaderValue::from_bytes(value.as_bytes())
        .unwrap_or_else(|_| HeaderValue::from_static("attachment"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_file_name() {
        assert!(validate_file_name("report.pdf").is_ok());
        assert!(validate_file_name("nested/dir/report.pdf").is_ok());
        assert!(validate_file_name("").is_err());
        assert!(validate_file_name("   ").is_err());
        assert!(validate_file_name("bad\nname").is_err());
        assert!(validate_file_name(&"x".repeat(MAX_KEY_LENGTH + 1)).is_err());
    }

    #[test]
    fn test_require_param() {
        assert_eq!(require_param(Some("v1".to_string()), "versionId").unwrap(), "v1");
        assert!(require_param(Some(" ".to_string()), "versionId").is_err());
        let err = require_param(None, "fileName").unwrap_err();
        assert!(err.contains("fileName"));
    }

    #[test]
    fn test_content_disposition_plain_name() {
        assert_eq!(
            content_disposition("report.pdf"),
            "attachment; filename=\"report.pdf\""
        );
    }

    #[test]
    fn test_content_disposition_escapes_quotes() {
        assert_eq!(
            content_disposition("say \"hi\"\\.txt"),
            "attachment; filename=\"say \\\"hi\\\"\\\\.txt\""
        );
    }

    #[test]
    fn test_content_disposition_keeps_utf8_names() {
        let value = content_disposition("отчёт.pdf");
        assert_eq!(value.as_bytes(), "attachment; filename=\"отчёт.pdf\"".as_bytes());
    }
}
