use reqwest::Url;

/// Host of an article URL without a leading "www.", used to label articles
/// with their source. Returns `None` for relative or unparsable input.
pub fn source_domain(url: &str) -> Option<String> {
    let parsed = Url::parse(url.trim()).ok()?;
    let host = parsed.host_str()?;
    let host = host.strip_prefix("www.").unwrap_or(host);
    if host.is_empty() {
        None
    } else {
        Some(host.to_string())
    }
}
