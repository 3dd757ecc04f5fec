//! Extension allow-lists for image and 3D-model links.
//!
//! A URL or path that matches neither list for its expected role is dropped
//! (`None`), never stored blindly.

/// File extensions accepted as gallery images.
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "gif"];

/// File extensions accepted as printable 3D-model sources.
pub const MODEL_EXTENSIONS: &[&str] = &["stl", "obj", "3mf", "step", "stp", "gcode"];

/// Lowercased file extension of a URL or path, ignoring query and fragment.
#[must_use]
pub fn url_extension(raw: &str) -> Option<String> {
    let without_fragment = raw.split('#').next().unwrap_or(raw);
    let without_query = without_fragment.split('?').next().unwrap_or(without_fragment);
    let last_segment = without_query.rsplit(['/', '\\']).next().unwrap_or("");
    let (_, ext) = last_segment.rsplit_once('.')?;
    if ext.is_empty() || ext.chars().any(|c| !c.is_ascii_alphanumeric()) {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

/// `true` when the link's extension is on the image allow-list.
#[must_use]
pub fn is_image_link(raw: &str) -> bool {
    url_extension(raw).is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str()))
}

/// `true` when the link's extension is on the 3D-model allow-list.
#[must_use]
pub fn is_model_link(raw: &str) -> bool {
    url_extension(raw).is_some_and(|ext| MODEL_EXTENSIONS.contains(&ext.as_str()))
}

/// Validate a candidate link for a role; returns the trimmed link or `None`.
#[must_use]
pub fn classify_image_link(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty() && is_image_link(trimmed)).then(|| trimmed.to_string())
}

/// Validate a candidate 3D-model link; returns the trimmed link or `None`.
#[must_use]
pub fn classify_model_link(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty() && is_model_link(trimmed)).then(|| trimmed.to_string())
}
