// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Minimal HTML rendering of JSON documents for browser callers

use serde_json::Value;
use std::fmt::Write;

/// Escape text for use in element content and attribute values
pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// A complete page with `heading` as title and `<h1>`, followed by `document` as nested tables.
///
/// `heading` is inserted as is and must already be escaped.
pub fn render_page(heading: &str, document: &Value) -> String {
    let mut page = String::new();
    page.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
    let _ = writeln!(page, "<title>{}</title>", heading);
    page.push_str("</head>\n<body>\n");
    let _ = writeln!(page, "<h1>{}</h1>", heading);
    render_value(&mut page, document);
    page.push_str("\n</body>\n</html>\n");
    page
}

fn render_value(out: &mut String, value: &Value) {
    match value {
        Value::Null => {}
        Value::String(text) => out.push_str(&escape(text)),
        Value::Bool(_) | Value::Number(_) => out.push_str(&escape(&value.to_string())),
        Value::Array(items) => {
            out.push_str("<ol>");
            for item in items {
                out.push_str("<li>");
                render_value(out, item);
                out.push_str("</li>");
            }
            out.push_str("</ol>");
        }
        Value::Object(members) => {
            out.push_str("<table>");
            for (key, member) in members {
                let _ = write!(out, "<tr><th>{}</th><td>", escape(key));
                render_value(out, member);
                out.push_str("</td></tr>");
            }
            out.push_str("</table>");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn escapes_markup() {
        assert_eq!(escape(r#"<a href="x">O'Neil & co</a>"#), "&lt;a href=&quot;x&quot;&gt;O&#39;Neil &amp; co&lt;/a&gt;");
    }

    #[test]
    fn page_renders_nested_tables() {
        let page = render_page(
            &format!("Operation '{}'", escape("Greet")),
            &json!({ "name": "Greet", "tags": ["<b>", 2], "skip": null }),
        );
        assert!(page.contains("<h1>Operation 'Greet'</h1>"));
        assert!(page.contains("<tr><th>name</th><td>Greet</td></tr>"));
        assert!(page.contains("<ol><li>&lt;b&gt;</li><li>2</li></ol>"));
        assert!(page.contains("<tr><th>skip</th><td></td></tr>"));
    }
}
