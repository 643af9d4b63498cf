//! Lightweight reply formatting.
//!
//! Bot replies use a tiny markdown subset: `**bold**` spans and `- ` / `* `
//! bullet lines. Everything else is passed through line by line with a
//! `<br>` after each non-empty line.

use once_cell::sync::Lazy;
use regex::Regex;

// A bold span never crosses a line terminator (`\n`, `\r`, U+2028, U+2029).
static BOLD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\*\*([^\n\r\x{2028}\x{2029}]*?)\*\*").unwrap());

const LIST_OPEN: &str = "<ul>";
const LIST_CLOSE: &str = "</ul>";
const LINE_BREAK: &str = "<br>";

// Whitespace plus the byte-order mark.
fn trim_line(line: &str) -> &str {
    line.trim_matches(|ch: char| ch.is_whitespace() || ch == '\u{feff}')
}

fn list_item(line: &str) -> Option<&str> {
    line.strip_prefix("- ").or_else(|| line.strip_prefix("* "))
}

/// Renders `text` as inline markup. Absent or empty input renders as `""`.
pub fn format_message(text: Option<&str>) -> String {
    let Some(text) = text.filter(|text| !text.is_empty()) else {
        return String::new();
    };

    let bolded = BOLD_RE.replace_all(text, "<b>$1</b>");

    let mut in_list = false;
    let mut result = String::with_capacity(bolded.len() + 16);

    for line in bolded.split('\n') {
        let line = trim_line(line);
        if let Some(item) = list_item(line) {
            if !in_list {
                result.push_str(LIST_OPEN);
                in_list = true;
            }
            result.push_str("<li>");
            result.push_str(item);
            result.push_str("</li>");
        } else {
            if in_list {
                result.push_str(LIST_CLOSE);
                in_list = false;
            }
            if !line.is_empty() {
                result.push_str(line);
                result.push_str(LINE_BREAK);
            }
        }
    }
    if in_list {
        result.push_str(LIST_CLOSE);
    }

    result
}

/// Escapes the characters that are significant in HTML text and attributes.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}
