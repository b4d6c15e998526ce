//! Markdown to HTML rendering for assistant replies
//!
//! Replies from the answering service are rendered into the chat window as
//! HTML. Rendering runs in three stages:
//!
//! 1. The whole input is HTML-escaped (`&`, `<`, `>`), so nothing the remote
//!    service returns can inject markup.
//! 2. The escaped text is tokenized into [`Block`]s (headings, tables, lists,
//!    paragraphs), and each block's text into [`Inline`] spans (bold, italic,
//!    code).
//! 3. The token stream is rendered to HTML.
//!
//! Supported syntax is deliberately small:
//! - `#` .. `######` headings
//! - `**bold**` / `__bold__` → `<strong>`
//! - `*italic*` / `_italic_` → `<em>`
//! - `` `code` `` → `<code>`
//! - pipe tables with a separator row
//! - single-level `-`, `*`, `+` and `1.` lists
//! - paragraphs separated by blank lines
//!
//! Anything else (links, blockquotes, nested emphasis) stays literal text.

mod block;
mod inline;

pub use block::{Block, ListKind, parse as parse_blocks};
pub use inline::{Inline, parse as parse_inline};

/// Render markdown text to HTML
///
/// Never fails: input that does not match any supported construct is
/// emitted as escaped literal text.
#[must_use]
pub fn render(input: &str) -> String {
    let escaped = escape_html(input);
    let blocks = block::parse(&escaped);

    let mut output = String::with_capacity(escaped.len() + 16 * blocks.len());
    for block in &blocks {
        render_block(block, &mut output);
    }
    output
}

/// Escape HTML special characters
///
/// `&` is replaced first so the entities produced for `<` and `>` are not
/// escaped twice.
#[must_use]
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn render_block(block: &Block, out: &mut String) {
    match block {
        Block::Heading { level, content } => {
            out.push_str(&format!("<h{level}>"));
            render_inlines(content, out);
            out.push_str(&format!("</h{level}>"));
        }
        Block::List { kind, items } => {
            let tag = match kind {
                ListKind::Unordered => "ul",
                ListKind::Ordered => "ol",
            };
            out.push_str(&format!("<{tag}>"));
            for item in items {
                out.push_str("<li>");
                render_inlines(item, out);
                out.push_str("</li>");
            }
            out.push_str(&format!("</{tag}>"));
        }
        Block::Table { header, rows } => {
            out.push_str("<table><thead><tr>");
            for cell in header {
                out.push_str("<th>");
                render_inlines(cell, out);
                out.push_str("</th>");
            }
            out.push_str("</tr></thead><tbody>");
            for row in rows {
                out.push_str("<tr>");
                for cell in row {
                    out.push_str("<td>");
                    render_inlines(cell, out);
                    out.push_str("</td>");
                }
                out.push_str("</tr>");
            }
            out.push_str("</tbody></table>");
        }
        Block::Paragraph(lines) => {
            out.push_str("<p>");
            for (i, line) in lines.iter().enumerate() {
                if i > 0 {
                    out.push_str("<br>");
                }
                render_inlines(line, out);
            }
            out.push_str("</p>");
        }
    }
}

fn render_inlines(inlines: &[Inline], out: &mut String) {
    for inline in inlines {
        match inline {
            Inline::Text(text) => out.push_str(text),
            Inline::Strong(text) => {
                out.push_str("<strong>");
                out.push_str(text);
                out.push_str("</strong>");
            }
            Inline::Emphasis(text) => {
                out.push_str("<em>");
                out.push_str(text);
                out.push_str("</em>");
            }
            Inline::Code(text) => {
                out.push_str("<code>");
                out.push_str(text);
                out.push_str("</code>");
            }
        }
    }
}
