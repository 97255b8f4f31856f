//! The recursive tree walker.
//!
//! [`Walker::walk`] turns the children of a DOM node into an ordered list of
//! [`Piece`]s. Each child is classified ([`tags::classify`]) and either
//! handed to a leaf handler ([`handlers`], [`images`]) or walked in turn.
//!
//! # Break insertion
//!
//! Separation between blocks is expressed with line-break pieces, decided
//! from sibling history only:
//!
//! - A walk opens with one line break unless the preceding context is
//!   "none", a list item, a quote line, or already a line break.
//! - Within one walk, the kind of the last piece emitted so far is passed as
//!   context to the next child that is walked. Children always start their
//!   own walk with a fresh, empty history.
//! - A paragraph-like child (`p`, `section`, `figcaption`) with non-blank
//!   text is followed by a line break unless the last piece already is one.
//! - A line break never directly follows another line break in the same
//!   sequence.
//!
//! # Usage
//!
//! ```rust
//! use wechatmp2markdown::dom;
//! use wechatmp2markdown::walker::Walker;
//! use wechatmp2markdown::{ImagePolicy, Options};
//! use wechatmp2markdown::fetch::HttpFetcher;
//!
//! let doc = dom::parse("<div id=\"c\"><p>A<br>B</p></div>");
//! let content = dom::find_first(&doc, "#c").unwrap();
//! let fetcher = HttpFetcher::new(&Options::default());
//! let pieces = Walker::new(ImagePolicy::Url, &fetcher).walk(&content, None);
//! assert_eq!(pieces.len(), 4); // "A", break, "B", break
//! ```

pub mod handlers;
pub mod images;
pub mod tags;

use dom_query::NodeRef;

use crate::dom;
use crate::fetch::ImageSource;
use crate::normalize::{is_blank, normalize};
use crate::options::ImagePolicy;
use crate::piece::{Piece, PieceKind};
use tags::NodeKind;

/// Walks DOM subtrees with a fixed image policy and image source.
pub struct Walker<'a> {
    policy: ImagePolicy,
    images: &'a dyn ImageSource,
}

impl<'a> Walker<'a> {
    #[must_use]
    pub fn new(policy: ImagePolicy, images: &'a dyn ImageSource) -> Self {
        Self { policy, images }
    }

    /// Convert the children of `node`.
    ///
    /// `preceding` is the kind of the last piece emitted before this walk
    /// by the caller, `None` at the top of the content.
    #[must_use]
    pub fn walk(&self, node: &NodeRef, preceding: Option<PieceKind>) -> Vec<Piece> {
        let mut pieces = Vec::new();
        if opens_with_break(preceding) {
            pieces.push(Piece::line_break());
        }

        let mut last: Option<PieceKind> = None;
        for child in dom::content_children(node) {
            self.dispatch(&child, last, &mut pieces);
            if let Some(piece) = pieces.last() {
                last = Some(piece.kind());
            }
        }
        pieces
    }

    /// Convert a single node as if it were the only child of a walk
    /// without context.
    #[must_use]
    pub fn walk_node(&self, node: &NodeRef) -> Vec<Piece> {
        let mut pieces = Vec::new();
        self.dispatch(node, None, &mut pieces);
        pieces
    }

    fn dispatch(&self, node: &NodeRef, last: Option<PieceKind>, pieces: &mut Vec<Piece>) {
        match tags::classify(node) {
            NodeKind::Text | NodeKind::Other => {
                let text = normalize(&dom::text_content(node));
                if !text.is_empty() {
                    pieces.push(Piece::text(text));
                }
            }
            NodeKind::Anchor => pieces.push(handlers::link(node)),
            NodeKind::Image => pieces.push(images::image_piece(node, self.policy, self.images)),
            NodeKind::OrderedList => append(pieces, handlers::list(self, node, true)),
            NodeKind::UnorderedList => append(pieces, handlers::list(self, node, false)),
            NodeKind::Code => pieces.push(handlers::code_block(node)),
            NodeKind::Inline => append(pieces, self.walk(node, last)),
            NodeKind::Block => {
                append(pieces, self.walk(node, last));
                if !pieces.is_empty() && !ends_with_break(pieces) && !is_blank(&dom::text_content(node)) {
                    pieces.push(Piece::line_break());
                }
            }
            NodeKind::Heading(level) => pieces.push(handlers::heading(node, level)),
            NodeKind::BlockQuote => append(pieces, handlers::block_quote(self, node)),
            NodeKind::Bold => pieces.push(handlers::bold(node)),
            NodeKind::Italic => pieces.push(handlers::italic(node)),
            NodeKind::Table => pieces.push(handlers::table(node)),
            NodeKind::HorizontalRule => pieces.push(Piece::horizontal_rule()),
            NodeKind::LineBreak => append(pieces, vec![Piece::line_break()]),
            NodeKind::Widget(widget) => pieces.push(handlers::widget(node, widget)),
            NodeKind::Ignored => {}
        }
    }
}

fn ends_with_break(pieces: &[Piece]) -> bool {
    pieces.last().is_some_and(|p| p.kind() == PieceKind::LineBreak)
}

/// Append `more`, dropping any line break that would follow another one.
fn append(pieces: &mut Vec<Piece>, more: Vec<Piece>) {
    for piece in more {
        if piece.kind() == PieceKind::LineBreak && ends_with_break(pieces) {
            continue;
        }
        pieces.push(piece);
    }
}

/// Whether a walk with this preceding context opens with a line break.
fn opens_with_break(preceding: Option<PieceKind>) -> bool {
    match preceding {
        None => false,
        Some(kind) => !matches!(
            kind,
            PieceKind::OrderedListItem
                | PieceKind::UnorderedListItem
                | PieceKind::BlockQuote
                | PieceKind::LineBreak
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{find_first, parse};

    struct NoImages;

    impl ImageSource for NoImages {
        fn acquire(&self, _url: &str) -> Option<Vec<u8>> {
            None
        }
    }

    fn walk_html(html: &str) -> Vec<Piece> {
        let doc = parse(&format!("<div id=\"root\">{html}</div>"));
        let root = find_first(&doc, "#root").expect("root");
        Walker::new(ImagePolicy::Url, &NoImages).walk(&root, None)
    }

    fn kinds(pieces: &[Piece]) -> Vec<PieceKind> {
        pieces.iter().map(Piece::kind).collect()
    }

    #[test]
    fn test_opens_with_break() {
        assert!(!opens_with_break(None));
        assert!(!opens_with_break(Some(PieceKind::OrderedListItem)));
        assert!(!opens_with_break(Some(PieceKind::UnorderedListItem)));
        assert!(!opens_with_break(Some(PieceKind::BlockQuote)));
        assert!(!opens_with_break(Some(PieceKind::LineBreak)));
        assert!(opens_with_break(Some(PieceKind::Text)));
        assert!(opens_with_break(Some(PieceKind::Image)));
    }

    #[test]
    fn test_paragraph_with_br() {
        let pieces = walk_html("<p>A<br>B</p>");
        assert_eq!(
            kinds(&pieces),
            vec![PieceKind::Text, PieceKind::LineBreak, PieceKind::Text, PieceKind::LineBreak]
        );
        assert_eq!(pieces[0].as_text(), Some("A"));
        assert_eq!(pieces[2].as_text(), Some("B"));
    }

    #[test]
    fn test_second_paragraph_opens_with_break() {
        // The first paragraph ends with a break, so the second one is not
        // given another.
        let pieces = walk_html("<p>one</p><p>two</p>");
        assert_eq!(
            kinds(&pieces),
            vec![PieceKind::Text, PieceKind::LineBreak, PieceKind::Text, PieceKind::LineBreak]
        );
    }

    #[test]
    fn test_breaks_are_never_doubled() {
        let pieces = walk_html("<p>one</p><p><br></p><p>A<br><br>B</p>");
        assert_eq!(
            kinds(&pieces),
            vec![
                PieceKind::Text,
                PieceKind::LineBreak,
                PieceKind::Text,
                PieceKind::LineBreak,
                PieceKind::Text,
                PieceKind::LineBreak
            ]
        );
    }

    #[test]
    fn test_span_after_text_opens_with_break() {
        let pieces = walk_html("before<span>inside</span>");
        assert_eq!(
            kinds(&pieces),
            vec![PieceKind::Text, PieceKind::LineBreak, PieceKind::Text]
        );
    }

    #[test]
    fn test_blank_text_nodes_are_dropped() {
        let pieces = walk_html("  \n\t <b>x</b> \u{200B} ");
        assert_eq!(kinds(&pieces), vec![PieceKind::Bold]);
    }

    #[test]
    fn test_unknown_tag_flattens_text() {
        let pieces = walk_html("<div>some <b>mixed</b> text</div><div>  </div>");
        assert_eq!(kinds(&pieces), vec![PieceKind::Text]);
        assert_eq!(pieces[0].as_text(), Some("some mixed text"));
    }

    #[test]
    fn test_scripts_are_ignored() {
        let pieces = walk_html("<script>var x = 1;</script><style>p{}</style>ok");
        assert_eq!(kinds(&pieces), vec![PieceKind::Text]);
    }

    #[test]
    fn test_simple_leaves() {
        let pieces = walk_html("<h2>H</h2><hr><em>i</em><a href=\"u\">l</a>");
        assert_eq!(
            kinds(&pieces),
            vec![
                PieceKind::Heading,
                PieceKind::HorizontalRule,
                PieceKind::Italic,
                PieceKind::Link
            ]
        );
    }

    #[test]
    fn test_list_items_hold_nested_pieces() {
        let pieces = walk_html("<ol><li>first <b>bold</b></li><li><p>second</p></li></ol>");
        assert_eq!(
            kinds(&pieces),
            vec![PieceKind::OrderedListItem, PieceKind::OrderedListItem]
        );
        assert_eq!(
            kinds(pieces[0].children()),
            vec![PieceKind::Text, PieceKind::Bold]
        );
        assert_eq!(
            kinds(pieces[1].children()),
            vec![PieceKind::Text, PieceKind::LineBreak]
        );
    }

    #[test]
    fn test_nested_list_is_contained_in_its_item() {
        let pieces = walk_html("<ul><li>a<ul><li>b</li></ul></li><li>c</li></ul>");
        assert_eq!(pieces.len(), 2);
        let inner = pieces[0].children();
        assert_eq!(kinds(inner), vec![PieceKind::Text, PieceKind::UnorderedListItem]);
        assert_eq!(inner[1].children()[0].as_text(), Some("b"));
    }

    #[test]
    fn test_block_quote_lines() {
        let pieces = walk_html("<blockquote><p>quoted</p>tail<strong>b</strong></blockquote>");
        assert_eq!(
            kinds(&pieces),
            vec![
                PieceKind::BlockQuote,
                PieceKind::BlockQuote,
                PieceKind::BlockQuote,
                PieceKind::LineBreak
            ]
        );
        assert_eq!(pieces[0].children()[0].as_text(), Some("quoted"));
        assert_eq!(pieces[1].children()[0].as_text(), Some("tail"));
        assert_eq!(pieces[2].children()[0].kind(), PieceKind::Bold);
    }

    #[test]
    fn test_widget_placeholder() {
        let pieces = walk_html(r#"<mpvideo vid="wxv_1"></mpvideo>"#);
        assert_eq!(pieces[0].as_text(), Some("[视频消息: wxv_1]"));
    }
}
