//! Object keys and upload rules for catalog materials.

use crate::error::CoreError;
use crate::types::DbId;

/// Largest upload a client may declare (500 MiB).
pub const MAX_UPLOAD_BYTES: i64 = 500 * 1024 * 1024;

/// Content types accepted for catalog materials.
pub const ALLOWED_CONTENT_TYPES: &[&str] = &[
    "application/pdf",
    "application/vnd.openxmlformats-officedocument.presentationml.presentation",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
    "application/zip",
    "image/png",
    "image/jpeg",
    "video/mp4",
    "text/plain",
    "text/markdown",
];

const MAX_FILE_NAME_LEN: usize = 120;

pub fn validate_content_type(content_type: &str) -> Result<(), CoreError> {
    let base = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    if !ALLOWED_CONTENT_TYPES.contains(&base.as_str()) {
        return Err(CoreError::Validation(format!(
            "Content type '{content_type}' is not allowed"
        )));
    }
    Ok(())
}

pub fn validate_size(size: Option<i64>) -> Result<(), CoreError> {
    match size {
        Some(s) if s <= 0 => Err(CoreError::Validation("file_size must be positive".into())),
        Some(s) if s > MAX_UPLOAD_BYTES => Err(CoreError::Validation(format!(
            "file_size {s} exceeds the limit of {MAX_UPLOAD_BYTES} bytes"
        ))),
        _ => Ok(()),
    }
}

/// Reduce a client file name to `[A-Za-z0-9._-]`, dropping any directory part.
pub fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_matches('.');
    if cleaned.is_empty() {
        return "file".to_string();
    }
    cleaned.chars().take(MAX_FILE_NAME_LEN).collect()
}

/// `catalogs/{catalog_id}/materials/{uuid}-{file name}`.
pub fn material_key(catalog_id: DbId, file_name: &str) -> String {
    format!(
        "catalogs/{catalog_id}/materials/{}-{}",
        uuid::Uuid::new_v4(),
        sanitize_file_name(file_name)
    )
}

/// Whether `key` belongs to the given catalog's material prefix.
pub fn key_belongs_to_catalog(key: &str, catalog_id: DbId) -> bool {
    let prefix = format!("catalogs/{catalog_id}/materials/");
    key.strip_prefix(&prefix)
        .is_some_and(|rest| !rest.is_empty() && !rest.contains('/') && !rest.contains(".."))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_types() {
        assert!(validate_content_type("application/pdf").is_ok());
        assert!(validate_content_type("text/plain; charset=utf-8").is_ok());
        assert!(validate_content_type("IMAGE/PNG").is_ok());
        assert!(validate_content_type("application/x-msdownload").is_err());
    }

    #[test]
    fn size_limits() {
        assert!(validate_size(None).is_ok());
        assert!(validate_size(Some(1024)).is_ok());
        assert!(validate_size(Some(0)).is_err());
        assert!(validate_size(Some(MAX_UPLOAD_BYTES + 1)).is_err());
    }

    #[test]
    fn file_names_are_sanitized() {
        assert_eq!(sanitize_file_name("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_file_name("Week 1 slides.pptx"), "Week_1_slides.pptx");
        assert_eq!(sanitize_file_name("C:\\docs\\guide.pdf"), "guide.pdf");
        assert_eq!(sanitize_file_name("..."), "file");
    }

    #[test]
    fn material_keys_are_scoped_to_catalog() {
        let key = material_key(42, "lab guide.pdf");
        assert!(key.starts_with("catalogs/42/materials/"));
        assert!(key.ends_with("-lab_guide.pdf"));
        assert!(key_belongs_to_catalog(&key, 42));
        assert!(!key_belongs_to_catalog(&key, 7));
        assert!(!key_belongs_to_catalog("catalogs/42/materials/../x", 42));
    }
}
