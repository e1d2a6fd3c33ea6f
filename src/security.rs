//! Upload validation and response hardening

use axum::http::{header, HeaderName, HeaderValue, Method};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;

use crate::AppError;

pub const ALLOWED_IMAGE_TYPES: [&str; 6] = [
    "image/jpeg",
    "image/jpg",
    "image/png",
    "image/gif",
    "image/bmp",
    "image/webp",
];

pub const ALLOWED_IMAGE_EXTENSIONS: [&str; 6] = [".jpg", ".jpeg", ".png", ".gif", ".bmp", ".webp"];

pub const INVALID_IMAGE_MESSAGE: &str = "All files must be valid images (PNG, JPEG, etc.)";

pub const SECURITY_HEADERS: [(&str, &str); 5] = [
    ("x-content-type-options", "nosniff"),
    ("x-frame-options", "DENY"),
    ("x-xss-protection", "1; mode=block"),
    ("referrer-policy", "strict-origin-when-cross-origin"),
    ("content-security-policy", "default-src 'self'; img-src 'self' data: blob:;"),
];

/// Human-readable label of a compare form field
pub fn field_label(field: &str) -> &'static str {
    match field {
        "feed_image" => "Feed image",
        "image_a" => "Image A",
        "image_b" => "Image B",
        _ => "File",
    }
}

fn extension(filename: &str) -> Option<String> {
    let dot = filename.rfind('.')?;
    Some(filename[dot..].to_ascii_lowercase())
}

/// Validate one uploaded file before it reaches the decoder
pub fn validate_upload(
    field: &str,
    filename: Option<&str>,
    content_type: Option<&str>,
    len: usize,
    max_bytes: usize,
) -> Result<(), AppError> {
    let type_ok = content_type
        .map(|ct| ALLOWED_IMAGE_TYPES.contains(&ct.to_ascii_lowercase().as_str()))
        .unwrap_or(false);

    let extension_ok = filename
        .and_then(extension)
        .map(|ext| ALLOWED_IMAGE_EXTENSIONS.contains(&ext.as_str()))
        .unwrap_or(false);

    if !type_ok || !extension_ok || len == 0 {
        tracing::warn!(
            field,
            filename = filename.unwrap_or(""),
            content_type = content_type.unwrap_or(""),
            len,
            "Rejected upload"
        );
        return Err(AppError::ValidationError(INVALID_IMAGE_MESSAGE.to_string()));
    }

    if len > max_bytes {
        return Err(AppError::PayloadTooLarge(format!(
            "{} too large (max {}MB)",
            field_label(field),
            max_bytes / (1024 * 1024)
        )));
    }

    Ok(())
}

/// CORS restricted to the configured frontend origins
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", o);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE])
        .allow_credentials(true)
}

/// One layer per hardening header, each overriding whatever the handler set
pub fn security_header_layers() -> Vec<SetResponseHeaderLayer<HeaderValue>> {
    SECURITY_HEADERS
        .iter()
        .map(|&(name, value)| {
            SetResponseHeaderLayer::overriding(
                HeaderName::from_static(name),
                HeaderValue::from_static(value),
            )
        })
        .collect()
}
