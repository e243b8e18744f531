/// Splits a newline-delimited URL list into jobs-to-be.
///
/// Lines are trimmed; blank lines and lines starting with `#` are skipped.
/// Anything else is passed through unvalidated, in input order.
pub fn parse_urls(raw: &str) -> Vec<String> {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(ToOwned::to_owned)
        .collect()
}
