//! Warning and deprecation scraping for kubectl output.

/// Lines that are warnings (`Warning:` prefix, any case) or mention
/// `deprecated`, trimmed.
pub fn parse_warnings(output: &str) -> Vec<String> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter(|line| {
            let lower = line.to_lowercase();
            lower.starts_with("warning:") || lower.contains("deprecated")
        })
        .map(String::from)
        .collect()
}
