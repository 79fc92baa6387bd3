use crate::crawler::ContentVariant;

/// Converts a URL into a filesystem-safe token
///
/// # Steps
///
/// 1. Strip a literal `http://` or `https://` prefix (any other prefix is kept)
/// 2. Strip one trailing `/`
/// 3. Replace every remaining `/` with `-`
///
/// Nothing is decoded or escaped, so `a-b` and `a/b` map to the same token.
///
/// # Examples
///
/// ```
/// use site_harvester::url::path_token;
///
/// assert_eq!(path_token("https://example.com/a/b/"), "example.com-a-b");
/// ```
pub fn path_token(url: &str) -> String {
    let stripped = url
        .strip_prefix("http://")
        .or_else(|| url.strip_prefix("https://"))
        .unwrap_or(url);
    let stripped = stripped.strip_suffix('/').unwrap_or(stripped);
    stripped.replace('/', "-")
}

/// Returns the file name a page is stored under for the given content variant
pub fn target_filename(url: &str, variant: ContentVariant) -> String {
    format!("{}.{}", path_token(url), variant.extension())
}
