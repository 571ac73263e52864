//! Answer-option image upload rules.
//!
//! Only the resulting public reference is stored on the option; the bytes
//! live on disk under the configured upload directory.

use crate::error::{CoreError, INVALID_VALUE};

/// Default maximum upload size: 5 MiB.
pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

/// URL prefix under which stored images are served.
pub const UPLOAD_URL_PREFIX: &str = "/uploads/answers";

/// Accepted image content types.
pub const ALLOWED_IMAGE_TYPES: &[&str] = &[
    "image/jpeg",
    "image/jpg",
    "image/png",
    "image/gif",
    "image/webp",
    "image/svg+xml",
];

/// File extension used when storing an upload of the given content type.
pub fn extension_for_mime(content_type: &str) -> Option<&'static str> {
    match content_type {
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/gif" => Some("gif"),
        "image/webp" => Some("webp"),
        "image/svg+xml" => Some("svg"),
        _ => None,
    }
}

/// Validate an upload's content type and size against `max_bytes`.
///
/// Returns the extension to store the file under.
pub fn validate_image_upload(
    content_type: &str,
    size: usize,
    max_bytes: usize,
) -> Result<&'static str, CoreError> {
    let ext = extension_for_mime(content_type).ok_or_else(|| {
        CoreError::invalid_field(
            INVALID_VALUE,
            "image",
            format!(
                "Unsupported image type '{content_type}'. Allowed: {}",
                ALLOWED_IMAGE_TYPES.join(", ")
            ),
        )
    })?;
    if size == 0 {
        return Err(CoreError::invalid_field(
            INVALID_VALUE,
            "image",
            "Uploaded file is empty",
        ));
    }
    if size > max_bytes {
        return Err(CoreError::invalid_field(
            INVALID_VALUE,
            "image",
            format!("Image exceeds maximum size of {max_bytes} bytes"),
        ));
    }
    Ok(ext)
}

/// A collision-free storage file name for an option image.
pub fn storage_file_name(answer_id: i64, ext: &str) -> String {
    format!("answer-{answer_id}-{}.{ext}", uuid::Uuid::new_v4().simple())
}

/// Public reference saved on the option for a stored file.
pub fn public_url(file_name: &str) -> String {
    format!("{UPLOAD_URL_PREFIX}/{file_name}")
}
