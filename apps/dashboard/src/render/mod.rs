// Presentation layer: server-rendered HTML for the dashboard.
// Everything here derives from session state; the only decision made is the
// score color band.

pub mod chart;
pub mod page;
pub mod table;

pub use page::render_dashboard;

/// Escapes text for HTML element content and double-quoted attributes.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
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
