// SPDX-FileCopyrightText: 2026 Shelf Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Text and URL normalization shared by the adapters' response mappers.

/// Separator for multi-valued fields (authors, genres, designers).
pub const LIST_SEPARATOR: &str = ", ";

/// Upgrade an `http://` URL to `https://`. Blank input yields `None`.
pub fn secure_url(url: &str) -> Option<String> {
    let url = url.trim();
    if url.is_empty() {
        return None;
    }
    match url.strip_prefix("http://") {
        Some(rest) => Some(format!("https://{rest}")),
        None => Some(url.to_string()),
    }
}

/// Join non-blank values with [`LIST_SEPARATOR`]. Empty input yields `None`.
pub fn join_values<I, S>(values: I) -> Option<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let parts: Vec<String> = values
        .into_iter()
        .map(|v| v.as_ref().trim().to_string())
        .filter(|v| !v.is_empty())
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(LIST_SEPARATOR))
    }
}

/// Decode HTML/XML character references (`&amp;`, `&#10;`, `&mdash;`).
pub fn decode_entities(text: &str) -> String {
    html_escape::decode_html_entities(text).into_owned()
}

/// Trim and drop blank strings.
pub fn non_blank(text: Option<&str>) -> Option<String> {
    text.map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}
