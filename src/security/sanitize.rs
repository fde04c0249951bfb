/// Normalizes a raw path string without touching the filesystem. Pure and
/// total: drops control characters (including embedded NULs), collapses
/// runs of separators, and strips a trailing separator unless the result
/// would be the filesystem root. Does not resolve `.` or `..`.
pub fn sanitize(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut prev_sep = false;
    for ch in raw.chars() {
        if (ch as u32) < 32 {
            continue;
        }
        let is_sep = ch == '/' || ch == '\\';
        if is_sep && prev_sep {
            continue;
        }
        out.push(ch);
        prev_sep = is_sep;
    }
    if out.len() > 1 && (out.ends_with('/') || out.ends_with('\\')) {
        out.pop();
    }
    out
}

/// Trims a user-supplied search term for use as a directory name filter:
/// control characters removed, length capped, surrounding whitespace gone.
pub fn sanitize_search_term(raw: &str, max_len: usize) -> String {
    let cleaned: String = raw.chars().filter(|c| (*c as u32) >= 32).collect();
    let truncated: String = cleaned.chars().take(max_len).collect();
    truncated.trim().to_string()
}
