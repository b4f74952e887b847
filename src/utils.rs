// Resolves a site-root-relative path against the provider base.
// Absolute URLs pass through unchanged.
pub fn resolve_site_url(api_base: &str, file: &str) -> String {
    if file.starts_with("http://") || file.starts_with("https://") {
        file.to_string()
    } else if file.starts_with('/') {
        format!("{}{}", api_base.trim_end_matches('/'), file)
    } else {
        format!("{}/{}", api_base.trim_end_matches('/'), file)
    }
}

// Drops the first character, respecting UTF-8 boundaries
pub fn strip_first_char(s: &str) -> &str {
    let mut chars = s.chars();
    chars.next();
    chars.as_str()
}

// First `max` characters, for log output
pub fn preview(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
