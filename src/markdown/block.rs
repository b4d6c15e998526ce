//! Block-level tokenizer
//!
//! Splits already-escaped text into headings, tables, lists and paragraphs.
//! Block constructs are recognized per line; anything unrecognized joins the
//! current paragraph.

use super::inline::{self, Inline};

/// Deepest heading level
const MAX_HEADING_LEVEL: usize = 6;

/// Kind of list container
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
    /// `-`, `*` or `+` items
    Unordered,
    /// `1.` items
    Ordered,
}

/// A block-level element
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    /// `#` heading, level 1 to 6
    Heading { level: u8, content: Vec<Inline> },
    /// Run of contiguous list items; the container kind comes from the first item
    List { kind: ListKind, items: Vec<Vec<Inline>> },
    /// Pipe table; every row has exactly as many cells as the header
    Table {
        header: Vec<Vec<Inline>>,
        rows: Vec<Vec<Vec<Inline>>>,
    },
    /// Lines of text between blank lines
    Paragraph(Vec<Vec<Inline>>),
}

/// Tokenize escaped text into blocks
#[must_use]
pub fn parse(text: &str) -> Vec<Block> {
    let lines: Vec<&str> = text.lines().collect();
    let mut blocks = Vec::new();
    let mut paragraph: Vec<&str> = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i];

        if line.trim().is_empty() {
            flush_paragraph(&mut paragraph, &mut blocks);
            i += 1;
            continue;
        }

        if let Some((level, content)) = heading(line) {
            flush_paragraph(&mut paragraph, &mut blocks);
            blocks.push(Block::Heading {
                level,
                content: inline::parse(content),
            });
            i += 1;
            continue;
        }

        if let Some((table, consumed)) = table(&lines[i..]) {
            flush_paragraph(&mut paragraph, &mut blocks);
            blocks.push(table);
            i += consumed;
            continue;
        }

        if let Some((kind, _)) = list_item(line) {
            flush_paragraph(&mut paragraph, &mut blocks);
            let mut items = Vec::new();
            while let Some((_, content)) = lines.get(i).and_then(|l| list_item(l)) {
                items.push(inline::parse(content));
                i += 1;
            }
            blocks.push(Block::List { kind, items });
            continue;
        }

        paragraph.push(line.trim());
        i += 1;
    }

    flush_paragraph(&mut paragraph, &mut blocks);
    blocks
}

fn flush_paragraph(lines: &mut Vec<&str>, blocks: &mut Vec<Block>) {
    if lines.is_empty() {
        return;
    }
    blocks.push(Block::Paragraph(
        lines.drain(..).map(inline::parse).collect(),
    ));
}

/// Match `#`..`######` followed by a space
///
/// The marker length is the full run of `#`, so longer markers are never
/// mistaken for shorter ones.
fn heading(line: &str) -> Option<(u8, &str)> {
    let hashes = line.bytes().take_while(|&b| b == b'#').count();
    if hashes == 0 || hashes > MAX_HEADING_LEVEL {
        return None;
    }
    let content = line[hashes..].strip_prefix(' ')?.trim();
    if content.is_empty() {
        return None;
    }
    Some((u8::try_from(hashes).ok()?, content))
}

/// A list item needs content after its marker
fn list_item(line: &str) -> Option<(ListKind, &str)> {
    let (kind, content) = list_marker(line)?;
    (!content.is_empty()).then_some((kind, content))
}

fn list_marker(line: &str) -> Option<(ListKind, &str)> {
    let trimmed = line.trim_start();

    for marker in ["- ", "* ", "+ "] {
        if let Some(rest) = trimmed.strip_prefix(marker) {
            return Some((ListKind::Unordered, rest.trim()));
        }
    }

    let digits = trimmed.bytes().take_while(u8::is_ascii_digit).count();
    if digits > 0 {
        if let Some(rest) = trimmed[digits..].strip_prefix(". ") {
            return Some((ListKind::Ordered, rest.trim()));
        }
    }

    None
}

/// Match a header row, a separator row and at least one data row
///
/// Returns the table and the number of lines it spans.
fn table(lines: &[&str]) -> Option<(Block, usize)> {
    let header_line = *lines.first()?;
    let separator_line = *lines.get(1)?;
    if !header_line.contains('|') || !is_separator(separator_line) {
        return None;
    }

    let header = split_row(header_line);
    if header.is_empty() {
        return None;
    }
    let width = header.len();

    let rows: Vec<Vec<Vec<Inline>>> = lines[2..]
        .iter()
        .take_while(|l| l.contains('|') && !l.trim().is_empty())
        .map(|l| {
            let mut cells: Vec<Vec<Inline>> =
                split_row(l).into_iter().map(inline::parse).collect();
            cells.resize_with(width, Vec::new);
            cells
        })
        .collect();

    if rows.is_empty() {
        return None;
    }

    let consumed = 2 + rows.len();
    let header = header.into_iter().map(inline::parse).collect();
    Some((Block::Table { header, rows }, consumed))
}

/// Separator rows hold only dashes, colons, pipes and spaces, one `-` run per cell
fn is_separator(line: &str) -> bool {
    let cells = split_row(line);
    !cells.is_empty()
        && cells.iter().all(|cell| {
            let dashes = cell.trim_start_matches(':').trim_end_matches(':');
            !dashes.is_empty() && dashes.bytes().all(|b| b == b'-')
        })
}

/// Split a pipe row into trimmed cells
///
/// The empty cells produced by leading and trailing delimiter pipes are
/// dropped; empty cells between pipes are kept.
fn split_row(line: &str) -> Vec<&str> {
    let trimmed = line.trim();
    let inner = trimmed.strip_prefix('|').unwrap_or(trimmed);
    let inner = inner.strip_suffix('|').unwrap_or(inner);
    if inner.trim().is_empty() {
        return Vec::new();
    }
    inner.split('|').map(str::trim).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> Vec<Inline> {
        vec![Inline::Text(s.to_string())]
    }

    #[test]
    fn heading_levels_use_full_marker() {
        assert_eq!(heading("###### deep"), Some((6, "deep")));
        assert_eq!(heading("# top"), Some((1, "top")));
        assert_eq!(heading("####### seven"), None);
        assert_eq!(heading("#nospace"), None);
        assert_eq!(heading("# "), None);
        assert_eq!(heading("##   "), None);
    }

    #[test]
    fn list_markers() {
        assert_eq!(list_item("- a"), Some((ListKind::Unordered, "a")));
        assert_eq!(list_item("* a"), Some((ListKind::Unordered, "a")));
        assert_eq!(list_item("+ a"), Some((ListKind::Unordered, "a")));
        assert_eq!(list_item("12. a"), Some((ListKind::Ordered, "a")));
        assert_eq!(list_item("**bold**"), None);
        assert_eq!(list_item("1.5 apples"), None);
        assert_eq!(list_item("- "), None);
        assert_eq!(list_item("3.  "), None);
    }

    #[test]
    fn split_row_drops_edge_cells_only() {
        assert_eq!(split_row("| a | b |"), vec!["a", "b"]);
        assert_eq!(split_row("a | b"), vec!["a", "b"]);
        assert_eq!(split_row("| a | | c |"), vec!["a", "", "c"]);
    }

    #[test]
    fn separator_rows() {
        assert!(is_separator("---|---"));
        assert!(is_separator("| :--- | ---: |"));
        assert!(is_separator("|:-:|"));
        assert!(!is_separator("Alice | 10"));
        assert!(!is_separator("| |"));
    }

    #[test]
    fn contiguous_list_lines_form_one_list() {
        let blocks = parse("- a\n* b\n1. c\n\nafter");
        assert_eq!(
            blocks,
            vec![
                Block::List {
                    kind: ListKind::Unordered,
                    items: vec![text("a"), text("b"), text("c")],
                },
                Block::Paragraph(vec![text("after")]),
            ]
        );
    }

    #[test]
    fn table_without_separator_is_paragraph() {
        let blocks = parse("a | b\nc | d");
        assert_eq!(
            blocks,
            vec![Block::Paragraph(vec![text("a | b"), text("c | d")])]
        );
    }

    #[test]
    fn table_without_rows_is_paragraph() {
        let blocks = parse("a | b\n---|---");
        assert!(matches!(blocks.as_slice(), [Block::Paragraph(_)]));
    }

    #[test]
    fn short_rows_are_padded() {
        let blocks = parse("a | b | c\n---|---|---\n1 | 2");
        let Some(Block::Table { header, rows }) = blocks.first() else {
            panic!("expected table");
        };
        assert_eq!(header.len(), 3);
        assert_eq!(rows[0].len(), 3);
        assert!(rows[0][2].is_empty());
    }

    #[test]
    fn heading_interrupts_paragraph() {
        let blocks = parse("intro\n## Next\nmore");
        assert_eq!(blocks.len(), 3);
        assert!(matches!(blocks[1], Block::Heading { level: 2, .. }));
    }
}
