//! Inline span tokenizer
//!
//! Runs three passes over the text of a block, each splitting only the plain
//! text left by the previous pass: bold, then italic, then code. Bold goes
//! first so a `**pair**` is never consumed as two single-asterisk italics.

/// An inline span
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inline {
    Text(String),
    Strong(String),
    Emphasis(String),
    Code(String),
}

/// A delimiter pass over plain text
struct Pass {
    delimiters: &'static [&'static str],
    accepts: fn(&Span<'_>) -> bool,
    wrap: fn(String) -> Inline,
}

/// Candidate span found between an opening and a closing delimiter
struct Span<'a> {
    delimiter: &'a str,
    before: Option<char>,
    content: &'a str,
    after: Option<char>,
}

const BOLD: Pass = Pass {
    delimiters: &["**", "__"],
    accepts: has_content,
    wrap: Inline::Strong,
};

const ITALIC: Pass = Pass {
    delimiters: &["*", "_"],
    accepts: accepts_italic,
    wrap: Inline::Emphasis,
};

const CODE: Pass = Pass {
    delimiters: &["`"],
    accepts: has_content,
    wrap: Inline::Code,
};

/// Tokenize escaped text into inline spans
#[must_use]
pub fn parse(text: &str) -> Vec<Inline> {
    let mut tokens = vec![Inline::Text(text.to_string())];
    for pass in [&BOLD, &ITALIC, &CODE] {
        tokens = tokens
            .into_iter()
            .flat_map(|token| match token {
                Inline::Text(text) => apply(pass, &text),
                other => vec![other],
            })
            .collect();
    }
    tokens
}

const fn has_content(span: &Span<'_>) -> bool {
    !span.content.is_empty()
}

/// Italic content must hug its delimiters, and `_` never opens or closes inside a word
fn accepts_italic(span: &Span<'_>) -> bool {
    let hugs = span
        .content
        .chars()
        .next()
        .is_some_and(|c| !c.is_whitespace())
        && span
            .content
            .chars()
            .next_back()
            .is_some_and(|c| !c.is_whitespace());

    let intraword = span.delimiter == "_"
        && (span.before.is_some_and(char::is_alphanumeric)
            || span.after.is_some_and(char::is_alphanumeric));

    hugs && !intraword
}

fn apply(pass: &Pass, text: &str) -> Vec<Inline> {
    let mut tokens = Vec::new();
    let mut literal = String::new();
    let mut rest = text;

    while let Some((start, delimiter)) = find_delimiter(rest, pass.delimiters) {
        let after_open = &rest[start + delimiter.len()..];

        let span = after_open.find(delimiter).map(|end| Span {
            delimiter,
            before: rest[..start]
                .chars()
                .next_back()
                .or_else(|| literal.chars().next_back()),
            content: &after_open[..end],
            after: after_open[end + delimiter.len()..].chars().next(),
        });

        match span {
            Some(span) if (pass.accepts)(&span) => {
                literal.push_str(&rest[..start]);
                if !literal.is_empty() {
                    tokens.push(Inline::Text(std::mem::take(&mut literal)));
                }
                let consumed = span.content.len() + 2 * delimiter.len();
                tokens.push((pass.wrap)(span.content.to_string()));
                rest = &rest[start + consumed..];
            }
            _ => {
                // Unmatched or rejected: keep the opening delimiter as text
                literal.push_str(&rest[..start + delimiter.len()]);
                rest = after_open;
            }
        }
    }

    literal.push_str(rest);
    if !literal.is_empty() {
        tokens.push(Inline::Text(literal));
    }
    tokens
}

/// Earliest occurrence of any of the delimiters
fn find_delimiter(text: &str, delimiters: &[&'static str]) -> Option<(usize, &'static str)> {
    delimiters
        .iter()
        .filter_map(|d| text.find(d).map(|pos| (pos, *d)))
        .min_by_key(|(pos, _)| *pos)
}
