//! Fixed-width table of discovered URLs

/// URLs longer than this are shortened in the table
const MAX_URL_WIDTH: usize = 68;

/// Characters kept before the ellipsis when shortening
const TRUNCATED_PREFIX: usize = 65;

const RULE: &str = "=================================================================";

/// Shortens a URL to fit the table column
///
/// Cuts on a character boundary, so multi-byte characters are never split.
pub fn truncate_url(url: &str) -> String {
    if url.chars().count() <= MAX_URL_WIDTH {
        return url.to_string();
    }

    let prefix: String = url.chars().take(TRUNCATED_PREFIX).collect();
    format!("{}...", prefix)
}

/// Renders results as a numbered table, one row per URL
pub fn render_table(results: &[String]) -> String {
    let mut out = String::new();
    out.push_str("===================== Endpoints Found =====================\n");
    out.push_str(&format!("{:<5} {:<70}\n", "ID", "URL"));
    out.push_str(RULE);
    out.push('\n');

    for (i, url) in results.iter().enumerate() {
        out.push_str(&format!("{:<5} {:<70}\n", i + 1, truncate_url(url)));
    }

    out.push_str(RULE);
    out.push('\n');
    out
}

/// Prints the results table to stdout
pub fn print_table(results: &[String]) {
    print!("{}", render_table(results));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_url_unchanged() {
        let url = "https://example.com/about";
        assert_eq!(truncate_url(url), url);
    }

    #[test]
    fn test_boundary_length_unchanged() {
        let url = format!("https://example.com/{}", "a".repeat(MAX_URL_WIDTH - 20));
        assert_eq!(url.len(), MAX_URL_WIDTH);
        assert_eq!(truncate_url(&url), url);
    }

    #[test]
    fn test_long_url_truncated() {
        let url = format!("https://example.com/{}", "a".repeat(100));
        let short = truncate_url(&url);
        assert_eq!(short.chars().count(), TRUNCATED_PREFIX + 3);
        assert!(short.ends_with("..."));
        assert!(short.starts_with("https://example.com/aaa"));
    }

    #[test]
    fn test_multibyte_truncation() {
        let url = format!("https://example.com/{}", "é".repeat(80));
        let short = truncate_url(&url);
        assert_eq!(short.chars().count(), TRUNCATED_PREFIX + 3);
    }

    #[test]
    fn test_render_table_rows() {
        let results = vec![
            "https://example.com/".to_string(),
            "https://example.com/about".to_string(),
        ];
        let table = render_table(&results);
        let rows: Vec<_> = table.lines().collect();

        assert_eq!(rows.len(), 6);
        assert!(rows[3].starts_with("1     https://example.com/"));
        assert!(rows[4].starts_with("2     https://example.com/about"));
    }

    #[test]
    fn test_render_empty_table() {
        let table = render_table(&[]);
        assert_eq!(table.lines().count(), 4);
    }
}
