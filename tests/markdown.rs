//! Markdown rendering tests

use edurise_chat::markdown::{self, Block, render};

#[test]
fn script_tags_are_escaped() {
    let html = render("<script>alert('x')</script> **bold**");
    assert!(!html.contains("<script"));
    assert!(html.contains("&lt;script&gt;alert('x')&lt;/script&gt;"));
    assert!(html.contains("<strong>bold</strong>"));
}

#[test]
fn markup_inside_every_block_is_escaped() {
    let input = "# <img src=x>\n\n- <b>item</b>\n\n| <i>h</i> |\n|---|\n| <u>c</u> |\n\n`<code>`";
    let html = render(input);
    for tag in ["<img", "<b>", "<i>", "<u>"] {
        assert!(!html.contains(tag), "{tag} leaked into {html}");
    }
    assert!(html.contains("<code>&lt;code&gt;</code>"));
}

#[test]
fn rendering_is_pure() {
    let input = "# Results\n\n| Name | Score |\n|---|---|\n| Alice | 10 |\n\n- **one**\n- _two_";
    assert_eq!(render(input), render(input));
}

#[test]
fn bold_end_to_end() {
    assert_eq!(render("**Hi** there"), "<p><strong>Hi</strong> there</p>");
}

#[test]
fn heading_then_body() {
    let html = render("# Title\n\nBody");
    let heading = html.find("<h1>Title</h1>").unwrap();
    let body = html.find("<p>Body</p>").unwrap();
    assert!(heading < body);
}

#[test]
fn two_row_table() {
    let html = render("Name | Score\n---|---\nAlice | 10");
    assert_eq!(
        html,
        "<table><thead><tr><th>Name</th><th>Score</th></tr></thead>\
         <tbody><tr><td>Alice</td><td>10</td></tr></tbody></table>"
    );
}

#[test]
fn every_row_matches_header_width() {
    let html = render(
        "| A | B | C |\n|:--|:-:|--:|\n| 1 | 2 | 3 |\n| 4 |\n| 5 | 6 | 7 | 8 |",
    );
    let header_cells = html.matches("<th>").count();
    assert_eq!(header_cells, 3);

    let body = &html[html.find("<tbody>").unwrap()..];
    let rows: Vec<&str> = body.split("<tr>").skip(1).collect();
    assert_eq!(rows.len(), 3);
    for row in rows {
        assert_eq!(row.matches("<td>").count(), header_cells);
    }
}

#[test]
fn table_cells_render_inline_markup() {
    let html = render("| Name | Note |\n|---|---|\n| **Bob** | `n/a` |");
    assert!(html.contains("<td><strong>Bob</strong></td><td><code>n/a</code></td>"));
}

#[test]
fn malformed_table_falls_through() {
    assert_eq!(render("Name | Score\nAlice | 10"), "<p>Name | Score<br>Alice | 10</p>");
}

#[test]
fn headings_by_marker_length() {
    assert_eq!(render("###### Six"), "<h6>Six</h6>");
    assert_eq!(render("### Three"), "<h3>Three</h3>");
    assert_eq!(render("####### Seven"), "<p>####### Seven</p>");
}

#[test]
fn lists_are_wrapped_once() {
    assert_eq!(
        render("Steps:\n\n- one\n- two\n+ three"),
        "<p>Steps:</p><ul><li>one</li><li>two</li><li>three</li></ul>"
    );
    assert_eq!(
        render("1. first\n2. **second**"),
        "<ol><li>first</li><li><strong>second</strong></li></ol>"
    );
}

#[test]
fn blocks_are_never_wrapped_in_paragraphs() {
    let html = render("Intro\n# Heading\n- item\nOutro");
    assert_eq!(
        html,
        "<p>Intro</p><h1>Heading</h1><ul><li>item</li></ul><p>Outro</p>"
    );
    assert!(!html.contains("<p><h1>"));
    assert!(!html.contains("<p><ul>"));
}

#[test]
fn unsupported_syntax_stays_literal() {
    assert_eq!(
        render("[link](http://x) and > quote"),
        "<p>[link](http://x) and &gt; quote</p>"
    );
    assert_eq!(render("**unclosed and *also"), "<p>**unclosed and *also</p>");
}

#[test]
fn bare_markers_stay_literal() {
    assert_eq!(render("# "), "<p>#</p>");
    assert_eq!(render("- "), "<p>-</p>");
    assert_eq!(render("- a\n- \n- b"), "<ul><li>a</li></ul><p>-</p><ul><li>b</li></ul>");
}

#[test]
fn block_tokens_are_exposed() {
    let blocks = markdown::parse_blocks("# A\n\ntext");
    assert!(matches!(blocks[0], Block::Heading { level: 1, .. }));
    assert!(matches!(blocks[1], Block::Paragraph(_)));
}
