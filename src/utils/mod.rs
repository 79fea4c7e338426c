use std::fmt::Display;

/// "Season 2023-24" for 2023. The suffix is the last two digits of the following year.
pub fn season_label(year: i32) -> String {
    let next = (i64::from(year) + 1).rem_euclid(100);
    format!("Season {}-{:02}", year, next)
}

/// Display a stat, or "N/A" when the provider had nothing.
pub fn or_na<T: Display>(value: Option<T>) -> String {
    match value {
        Some(v) => v.to_string(),
        None => "N/A".to_string(),
    }
}

/// Fallback for blank text fields (position, team).
pub fn text_or(value: Option<&str>, fallback: &str) -> String {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => fallback.to_string(),
    }
}

/// Minimal HTML escaping for text and attribute values.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
