/// Convert arbitrary text into a lowercase ASCII slug.
///
/// Alphanumeric characters are kept, runs of whitespace, dashes and
/// underscores collapse into a single `-`, everything else is dropped.
/// Leading and trailing dashes are trimmed.
pub fn slugify(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev_dash = false;
    for c in text.chars().flat_map(|c| c.to_lowercase()) {
        if c.is_ascii_alphanumeric() {
            out.push(c);
            prev_dash = false;
        } else if (c.is_whitespace() || c == '-' || c == '_') && !prev_dash {
            out.push('-');
            prev_dash = true;
        }
    }
    out.trim_matches('-').to_string()
}
