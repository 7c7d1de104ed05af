//! URL helpers for file-server asset paths.
//!
//! The file-server listing only carries relative paths. The catalog stores
//! absolute URLs so clients can fetch assets directly.

/// Returns `true` when the path already carries a scheme.
pub fn is_absolute(path: &str) -> bool {
    path.starts_with("http://") || path.starts_with("https://")
}

/// Join a relative asset path onto the file-server base URL.
///
/// Absolute URLs are returned unchanged. Exactly one `/` separates the base
/// and the path.
///
/// # Examples
///
/// ```
/// use reelsync_common::urls::join_asset_url;
///
/// assert_eq!(join_asset_url("http://fs/", "/tv/x.mp4"), "http://fs/tv/x.mp4");
/// assert_eq!(join_asset_url("http://fs", "tv/x.mp4"), "http://fs/tv/x.mp4");
/// assert_eq!(join_asset_url("http://fs", "https://cdn/x.mp4"), "https://cdn/x.mp4");
/// ```
pub fn join_asset_url(base: &str, path: &str) -> String {
    if is_absolute(path) {
        return path.to_string();
    }
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Strip the file-server base URL from a stored URL, leaving the relative path.
///
/// Returns `None` when the URL does not live under `base`.
pub fn strip_base<'a>(base: &str, url: &'a str) -> Option<&'a str> {
    url.strip_prefix(base.trim_end_matches('/'))
        .filter(|rest| rest.is_empty() || rest.starts_with('/'))
}
