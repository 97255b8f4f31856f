//! Classification of DOM nodes for the walker.
//!
//! Every node maps onto exactly one [`NodeKind`]; tags the walker has no
//! rule for become [`NodeKind::Other`] and are rendered from their text.

use dom_query::NodeRef;

use crate::dom;

/// Class marking the platform's code snippet container.
pub const CODE_SNIPPET_CLASS: &str = "code-snippet__fix";

/// Platform widgets rendered as bracketed placeholders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Widget {
    Voice,
    Video,
    Music,
    Profile,
    Card,
}

impl Widget {
    /// Attribute naming the widget.
    #[must_use]
    pub fn id_attribute(self) -> &'static str {
        match self {
            Self::Voice => "voice_encode_fileid",
            Self::Video => "vid",
            Self::Music | Self::Profile => "data-name",
            Self::Card => "data-title",
        }
    }

    /// Label shown in the placeholder.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Voice => "语音消息",
            Self::Video => "视频消息",
            Self::Music => "音乐",
            Self::Profile => "名片",
            Self::Card => "卡片",
        }
    }

    /// Placeholder text for a widget instance, e.g. `[音乐: name]`.
    #[must_use]
    pub fn placeholder(self, id: &str) -> String {
        format!("[{}: {id}]", self.label())
    }
}

/// What the walker does with a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// Text node.
    Text,
    Anchor,
    Image,
    OrderedList,
    UnorderedList,
    /// `pre`, `code`, or a code snippet section.
    Code,
    /// `span`, `figure`: children are walked in place.
    Inline,
    /// `p`, `section`, `figcaption`: children are walked, then a break.
    Block,
    Heading(u8),
    BlockQuote,
    Bold,
    Italic,
    Table,
    HorizontalRule,
    LineBreak,
    Widget(Widget),
    /// Never rendered: scripts, styles, comments.
    Ignored,
    /// Anything else; rendered as its normalized text.
    Other,
}

/// Classify a node by its tag name.
#[must_use]
pub fn classify(node: &NodeRef) -> NodeKind {
    if node.is_text() {
        return NodeKind::Text;
    }
    let Some(tag) = dom::tag_name(node) else {
        return NodeKind::Ignored;
    };

    match tag.as_str() {
        "a" => NodeKind::Anchor,
        "img" => NodeKind::Image,
        "ol" => NodeKind::OrderedList,
        "ul" => NodeKind::UnorderedList,
        "pre" | "code" => NodeKind::Code,
        "section" if dom::has_class(node, CODE_SNIPPET_CLASS) => NodeKind::Code,
        "span" | "figure" => NodeKind::Inline,
        "p" | "section" | "figcaption" => NodeKind::Block,
        "h1" => NodeKind::Heading(1),
        "h2" => NodeKind::Heading(2),
        "h3" => NodeKind::Heading(3),
        "h4" => NodeKind::Heading(4),
        "h5" => NodeKind::Heading(5),
        "h6" => NodeKind::Heading(6),
        "blockquote" => NodeKind::BlockQuote,
        "strong" | "b" => NodeKind::Bold,
        "em" | "i" => NodeKind::Italic,
        "table" => NodeKind::Table,
        "hr" => NodeKind::HorizontalRule,
        "br" => NodeKind::LineBreak,
        "mpvoice" | "mp-common-mpaudio" => NodeKind::Widget(Widget::Voice),
        "mpvideo" => NodeKind::Widget(Widget::Video),
        "qqmusic" | "mp-common-qqmusic" => NodeKind::Widget(Widget::Music),
        "mp-common-profile" => NodeKind::Widget(Widget::Profile),
        "mp-common-card" => NodeKind::Widget(Widget::Card),
        "script" | "style" | "noscript" | "template" => NodeKind::Ignored,
        _ => NodeKind::Other,
    }
}
