//! Image-candidate discovery for one SKU.
//!
//! Candidates come from two sources, in priority order: an optional
//! preferred link carried by the job, then the SKU's own directory under
//! the media root. Local files only count when they carry an allow-listed
//! image extension and resolve inside the media root after symlink
//! resolution; anything escaping the root is dropped.

use std::path::{Path, PathBuf};

use makershop_core::links::is_image_link;

use crate::MediaError;

/// Ordered, deduplicated public image URLs for `sku`.
///
/// The preferred link, when present and valid, is always first, which makes
/// it the primary-image candidate downstream. A missing SKU directory
/// yields no local candidates; that is a normal state, not an error.
///
/// # Errors
///
/// Returns [`MediaError::Scan`] when the SKU directory exists but cannot be
/// read.
pub fn resolve_candidates(
    media_root: &Path,
    public_base_url: &str,
    sku: &str,
    prefer_url: Option<&str>,
) -> Result<Vec<String>, MediaError> {
    let mut candidates: Vec<String> = Vec::new();

    if let Some(preferred) = prefer_url {
        if let Some(url) = resolve_preferred(media_root, public_base_url, preferred) {
            candidates.push(url);
        } else {
            tracing::debug!(%sku, preferred, "preferred link rejected");
        }
    }

    candidates.extend(scan_sku_dir(media_root, public_base_url, sku)?);

    let mut seen = std::collections::HashSet::new();
    candidates.retain(|url| seen.insert(url.clone()));
    Ok(candidates)
}

/// Validate the job's preferred link: remote URLs pass through, local paths
/// must resolve to an image file inside the media root.
pub(crate) fn resolve_preferred(
    media_root: &Path,
    public_base_url: &str,
    preferred: &str,
) -> Option<String> {
    let trimmed = preferred.trim();
    if trimmed.is_empty() || !is_image_link(trimmed) {
        return None;
    }
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        return Some(trimmed.to_string());
    }
    let joined = media_root.join(trimmed.trim_start_matches('/'));
    contained_relative(media_root, &joined).map(|rel| public_url(public_base_url, &rel))
}

/// Image files directly inside `media_root/<sku>/`, sorted by file name.
fn scan_sku_dir(
    media_root: &Path,
    public_base_url: &str,
    sku: &str,
) -> Result<Vec<String>, MediaError> {
    let dir = media_root.join(sku);
    let entries = match std::fs::read_dir(&dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => {
            return Err(MediaError::Scan {
                path: dir.display().to_string(),
                source: e,
            })
        }
    };

    let mut paths: Vec<PathBuf> = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| MediaError::Scan {
            path: dir.display().to_string(),
            source: e,
        })?;
        let path = entry.path();
        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };
        if !is_image_link(name) {
            continue;
        }
        // Symlinks pointing outside the media root are silently excluded.
        if contained_relative(media_root, &path).is_some() {
            paths.push(path);
        }
    }
    paths.sort_by_key(|p| p.file_name().map(std::ffi::OsStr::to_os_string));

    Ok(paths
        .into_iter()
        .filter_map(|p| {
            contained_relative(media_root, &p).map(|rel| public_url(public_base_url, &rel))
        })
        .collect())
}

/// Canonicalized path of `candidate` relative to the media root, or `None`
/// when it does not exist or escapes the root.
fn contained_relative(media_root: &Path, candidate: &Path) -> Option<PathBuf> {
    let root = std::fs::canonicalize(media_root).ok()?;
    let resolved = std::fs::canonicalize(candidate).ok()?;
    resolved.strip_prefix(&root).ok().map(Path::to_path_buf)
}

fn public_url(public_base_url: &str, relative: &Path) -> String {
    let rel = relative
        .components()
        .filter_map(|c| c.as_os_str().to_str())
        .collect::<Vec<_>>()
        .join("/");
    format!("{}/media/{rel}", public_base_url.trim_end_matches('/'))
}
