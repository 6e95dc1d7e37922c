//! Lightweight markup to HTML for post bodies.
//!
//! Supports `#`/`##`/`###` headings, `- ` and `1. ` list items, `**bold**`,
//! and blank-line separated paragraphs. Nothing else is interpreted.

use std::sync::LazyLock;

use regex::Regex;

static H1_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^# (.+)$").unwrap());
static H2_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^## (.+)$").unwrap());
static H3_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^### (.+)$").unwrap());
static BULLET_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^- (.+)$").unwrap());
static NUMBERED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[0-9]+\. (.+)$").unwrap());
static BOLD_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*\*(.+?)\*\*").unwrap());

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Render post content to an HTML fragment.
///
/// The source is escaped first, so raw HTML in a post shows up as text.
pub fn render_html(content: &str) -> String {
    let escaped = html_escape(&content.replace("\r\n", "\n"));
    let marked = H1_RE.replace_all(&escaped, "<h1>$1</h1>");
    let marked = H2_RE.replace_all(&marked, "<h2>$1</h2>");
    let marked = H3_RE.replace_all(&marked, "<h3>$1</h3>");
    let marked = BULLET_RE.replace_all(&marked, "<li data-ul>$1</li>");
    let marked = NUMBERED_RE.replace_all(&marked, "<li data-ol>$1</li>");
    let marked = BOLD_RE.replace_all(&marked, "<strong>$1</strong>");

    marked
        .split("\n\n")
        .map(str::trim)
        .filter(|block| !block.is_empty())
        .map(render_block)
        .collect()
}

fn render_block(block: &str) -> String {
    if block.starts_with("<h1>") || block.starts_with("<h2>") || block.starts_with("<h3>") {
        // A heading may be followed directly by text or list lines.
        return match block.split_once('\n') {
            Some((heading, rest)) if !rest.trim().is_empty() => {
                format!("{heading}{}", render_block(rest.trim()))
            }
            _ => block.trim_end().to_string(),
        };
    }

    let bullets = block.contains("<li data-ul>");
    let numbered = block.contains("<li data-ol>");
    let body = block
        .replace("<li data-ul>", "<li>")
        .replace("<li data-ol>", "<li>");

    if bullets || numbered {
        let tag = if numbered && !bullets { "ol" } else { "ul" };
        return format!("<{tag}>{body}</{tag}>");
    }
    format!("<p>{body}</p>")
}
