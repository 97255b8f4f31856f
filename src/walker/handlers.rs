//! Leaf element handlers: headings, code, tables, emphasis, lists, quotes.
//!
//! Lists and quotes recurse back into the [`Walker`]; the other handlers
//! read their node's text and never recurse.

use dom_query::NodeRef;
use tracing::debug;

use super::tags::{self, NodeKind, Widget};
use super::Walker;
use crate::dom;
use crate::normalize::normalize;
use crate::piece::{Piece, PieceKind, TableMode};

/// `<h1>`..`<h6>` → heading piece.
#[must_use]
pub fn heading(node: &NodeRef, level: u8) -> Piece {
    Piece::heading(level, normalize(&dom::text_content(node)))
}

/// `<a>` → link piece. A missing `href` gives an empty target.
#[must_use]
pub fn link(node: &NodeRef) -> Piece {
    Piece::link(
        dom::attr_or_empty(node, "href"),
        normalize(&dom::text_content(node)),
    )
}

/// `<strong>`, `<b>` → bold piece. Nested markup is flattened to text.
#[must_use]
pub fn bold(node: &NodeRef) -> Piece {
    Piece::bold(normalize(&dom::text_content(node)))
}

/// `<em>`, `<i>` → italic piece. Nested markup is flattened to text.
#[must_use]
pub fn italic(node: &NodeRef) -> Piece {
    Piece::italic(normalize(&dom::text_content(node)))
}

/// Platform widget → text placeholder built from its identifying attribute.
#[must_use]
pub fn widget(node: &NodeRef, widget: Widget) -> Piece {
    Piece::text(widget.placeholder(&dom::attr_or_empty(node, widget.id_attribute())))
}

// === Code blocks ===

/// Code container → one code block piece holding its non-blank lines.
///
/// Each `<code>` element inside the container is read in turn (the
/// container itself when there is none). `<br>` and embedded newlines end
/// a line; trailing whitespace is trimmed and whitespace-only lines are
/// dropped.
#[must_use]
pub fn code_block(node: &NodeRef) -> Piece {
    let sources = outermost_code(node);
    let mut lines = if sources.is_empty() {
        Vec::new()
    } else {
        code_lines(&sources)
    };

    // Text outside the <code> children still counts as code.
    if lines.is_empty() {
        lines = code_lines(std::slice::from_ref(node));
    }
    Piece::code_block(lines)
}

/// `<code>` descendants that are not nested in another `<code>`.
fn outermost_code<'a>(node: &NodeRef<'a>) -> Vec<NodeRef<'a>> {
    dom::find_all(node, "code")
        .into_iter()
        .filter(|code| {
            let mut current = code.parent();
            while let Some(ancestor) = current {
                if ancestor.id == node.id {
                    return true;
                }
                if dom::tag_name(&ancestor).as_deref() == Some("code") {
                    return false;
                }
                current = ancestor.parent();
            }
            true
        })
        .collect()
}

fn code_lines(sources: &[NodeRef]) -> Vec<String> {
    let mut rows = Vec::new();
    for source in sources {
        let mut line = String::new();
        push_code_text(source, &mut line, &mut rows);
        rows.push(line);
    }
    rows.into_iter()
        .map(|row| row.trim_end().to_string())
        .filter(|row| !row.trim().is_empty())
        .collect()
}

fn push_code_text(node: &NodeRef, line: &mut String, rows: &mut Vec<String>) {
    for child in dom::content_children(node) {
        if child.is_text() {
            let text = child.text();
            let mut parts = text.split('\n');
            if let Some(first) = parts.next() {
                line.push_str(first);
            }
            for part in parts {
                rows.push(std::mem::take(line));
                line.push_str(part);
            }
        } else if dom::tag_name(&child).as_deref() == Some("br") {
            rows.push(std::mem::take(line));
        } else {
            push_code_text(&child, line, rows);
        }
    }
}

// === Tables ===

/// `<table>` → one table piece.
///
/// Rows with at least one `th`/`td` become pipe-table lines, with a
/// separator row after the first line when there is more than one row.
/// A table without any such row is passed through as raw HTML.
#[must_use]
pub fn table(node: &NodeRef) -> Piece {
    let rows: Vec<Vec<String>> = dom::find_all(node, "tr")
        .iter()
        .map(|tr| {
            dom::find_all(tr, "th, td")
                .iter()
                .map(|cell| normalize(&dom::text_content(cell)).replace('|', "\\|"))
                .collect::<Vec<_>>()
        })
        .filter(|cells| !cells.is_empty())
        .collect();

    if rows.is_empty() {
        debug!("table without rows, keeping raw HTML");
        return Piece::table(
            TableMode::Native,
            format!("<table>{}</table>", dom::inner_html(node)),
        );
    }

    let mut lines: Vec<String> = rows
        .iter()
        .map(|cells| format!("| {} |", cells.join(" | ")))
        .collect();
    if lines.len() > 1 {
        let separator = format!("|{}", " --- |".repeat(rows[0].len()));
        lines.insert(1, separator);
    }
    Piece::table(TableMode::Markdown, lines.join("\n"))
}

// === Lists and quotes ===

/// `<ol>` / `<ul>` → one list item piece per item, in document order.
///
/// Items are walked with the list kind as context, so they never open with
/// a separator break.
#[must_use]
pub fn list(walker: &Walker, node: &NodeRef, ordered: bool) -> Vec<Piece> {
    let context = if ordered {
        PieceKind::OrderedListItem
    } else {
        PieceKind::UnorderedListItem
    };
    list_items(node)
        .iter()
        .map(|item| Piece::list_item(ordered, walker.walk(item, Some(context))))
        .collect()
}

/// `li` elements belonging to this list, skipping those of nested lists.
fn list_items<'a>(node: &NodeRef<'a>) -> Vec<NodeRef<'a>> {
    let mut items = Vec::new();
    for child in dom::element_children(node) {
        match dom::tag_name(&child).as_deref() {
            Some("li") => items.push(child),
            Some("ol" | "ul") => {}
            _ => items.extend(list_items(&child)),
        }
    }
    items
}

/// `<blockquote>` → one quote line per child that produced content,
/// followed by a line break.
#[must_use]
pub fn block_quote(walker: &Walker, node: &NodeRef) -> Vec<Piece> {
    let mut lines: Vec<Piece> = dom::content_children(node)
        .iter()
        .map(|child| match tags::classify(child) {
            NodeKind::Inline | NodeKind::Block | NodeKind::Other => {
                walker.walk(child, Some(PieceKind::BlockQuote))
            }
            _ => walker.walk_node(child),
        })
        .filter(|children| !children.is_empty())
        .map(Piece::block_quote)
        .collect();
    lines.push(Piece::line_break());
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{find_first, parse};

    fn first<'a>(doc: &'a dom_query::Document, selector: &str) -> NodeRef<'a> {
        find_first(doc, selector).expect("selector matched")
    }

    #[test]
    fn test_heading_levels() {
        let doc = parse("<h3> Section\n title </h3>");
        let piece = heading(&first(&doc, "h3"), 3);
        assert_eq!(piece.as_text(), Some("Section title"));
        assert_eq!(piece.level(), Some(3));
    }

    #[test]
    fn test_link_and_emphasis() {
        let doc = parse(r#"<a href="https://x.test"> go <b>here</b> </a><strong> <em>very</em> bold </strong>"#);
        let a = link(&first(&doc, "a"));
        assert_eq!(a.as_text(), Some("go here"));
        assert_eq!(a.attr("href"), Some("https://x.test"));

        let b = bold(&first(&doc, "strong"));
        assert_eq!(b.kind(), PieceKind::Bold);
        assert_eq!(b.as_text(), Some("very bold"));
    }

    #[test]
    fn test_widget_placeholder() {
        let doc = parse(r#"<mpvoice voice_encode_fileid="abc123"></mpvoice><mp-common-card></mp-common-card>"#);
        let voice = widget(&first(&doc, "mpvoice"), Widget::Voice);
        assert_eq!(voice.as_text(), Some("[语音消息: abc123]"));
        let card = widget(&first(&doc, "mp-common-card"), Widget::Card);
        assert_eq!(card.as_text(), Some("[卡片: ]"));
    }

    #[test]
    fn test_code_block_br_lines() {
        let doc = parse("<pre><code>fn main() {<br>    println!();<br><br>  <br>}</code></pre>");
        let piece = code_block(&first(&doc, "pre"));
        assert_eq!(piece.lines(), ["fn main() {", "    println!();", "}"]);
    }

    #[test]
    fn test_code_block_one_code_per_line() {
        let doc = parse(
            r#"<section class="code-snippet__fix"><ul class="code-snippet__line-index"><li></li><li></li></ul><pre><code><span>let a = 1;</span></code><code><span>let b = 2;</span></code></pre></section>"#,
        );
        let piece = code_block(&first(&doc, "section"));
        assert_eq!(piece.lines(), ["let a = 1;", "let b = 2;"]);
    }

    #[test]
    fn test_code_block_without_code_element() {
        let doc = parse("<pre>line 1\nline 2\n\n</pre>");
        let piece = code_block(&first(&doc, "pre"));
        assert_eq!(piece.lines(), ["line 1", "line 2"]);
    }

    #[test]
    fn test_code_element_itself() {
        let doc = parse("<p><code>x = 1</code></p>");
        let piece = code_block(&first(&doc, "code"));
        assert_eq!(piece.lines(), ["x = 1"]);
    }

    #[test]
    fn test_code_text_outside_code_children_is_kept() {
        let doc = parse("<pre>visible<code> </code></pre>");
        let piece = code_block(&first(&doc, "pre"));
        assert_eq!(piece.lines(), ["visible"]);
    }

    #[test]
    fn test_table_markdown() {
        let doc = parse(
            "<table><tr><th>H1</th><th>H2</th></tr><tr><td>A</td><td>B|C</td></tr></table>",
        );
        let piece = table(&first(&doc, "table"));
        assert_eq!(piece.table_mode(), Some(TableMode::Markdown));
        assert_eq!(
            piece.as_text(),
            Some("| H1 | H2 |\n| --- | --- |\n| A | B\\|C |")
        );
    }

    #[test]
    fn test_single_row_table_has_no_separator() {
        let doc = parse("<table><tr><td>only</td></tr></table>");
        let piece = table(&first(&doc, "table"));
        assert_eq!(piece.as_text(), Some("| only |"));
    }

    #[test]
    fn test_table_without_rows_is_native() {
        let doc = parse("<table><caption>empty</caption></table>");
        let piece = table(&first(&doc, "table"));
        assert_eq!(piece.table_mode(), Some(TableMode::Native));
        let html = piece.as_text().expect("html");
        assert!(html.starts_with("<table>"));
        assert!(html.contains("empty"));
        assert!(html.ends_with("</table>"));
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        /// Code bodies: letters, whitespace, non-breaking spaces and `<br>`s.
        fn code_body() -> impl Strategy<Value = String> {
            prop::collection::vec(
                prop_oneof![
                    "[a-z(){};=]{1,8}",
                    "[ \t\n\u{00A0}]{1,4}",
                    Just("<br>".to_string()),
                ],
                0..24,
            )
            .prop_map(|parts| parts.concat())
        }

        proptest! {
            #[test]
            fn code_block_lines_are_never_blank(body in code_body(), wrap in any::<bool>()) {
                prop_assume!(!body.replace("<br>", "").trim().is_empty());
                let html = if wrap {
                    format!("<pre><code>{body}</code></pre>")
                } else {
                    format!("<pre>{body}</pre>")
                };
                let doc = parse(&html);
                let piece = code_block(&first(&doc, "pre"));

                prop_assert!(!piece.lines().is_empty(), "no lines for {:?}", html);
                for line in piece.lines() {
                    prop_assert!(!line.trim().is_empty(), "blank line {:?} for {:?}", line, html);
                }
            }
        }
    }

    #[test]
    fn test_list_items_skip_nested_list_items() {
        let doc = parse("<ul id=\"outer\"><li>a<ul><li>inner</li></ul></li><li>b</li></ul>");
        let items = list_items(&first(&doc, "#outer"));
        assert_eq!(items.len(), 2);
    }
}
