//! DOM Operations Adapter
//!
//! Small helpers over `dom_query` nodes used by the walker and the
//! metadata extraction. Every helper tolerates missing attributes and
//! non-element nodes by returning `None` / empty values.

// Re-export core types for external use
pub use dom_query::{Document, NodeRef, Selection};

pub use tendril::StrTendril;

use crate::patterns::HIDDEN_STYLE;

/// Parse an HTML string into a document.
#[inline]
#[must_use]
pub fn parse(html: &str) -> Document {
    Document::from(html)
}

/// First node matching a CSS selector anywhere in the document.
#[must_use]
pub fn find_first<'a>(doc: &'a Document, selector: &str) -> Option<NodeRef<'a>> {
    doc.select(selector).nodes().first().cloned()
}

/// First descendant of `node` matching a CSS selector.
#[must_use]
pub fn find_in<'a>(node: &NodeRef<'a>, selector: &str) -> Option<NodeRef<'a>> {
    Selection::from(node.clone())
        .select(selector)
        .nodes()
        .first()
        .cloned()
}

/// All descendants of `node` matching a CSS selector, in document order.
#[must_use]
pub fn find_all<'a>(node: &NodeRef<'a>, selector: &str) -> Vec<NodeRef<'a>> {
    Selection::from(node.clone()).select(selector).nodes().to_vec()
}

// === Tag/Node Information ===

/// Lowercase tag name of an element; `None` for text and other nodes.
#[must_use]
pub fn tag_name(node: &NodeRef) -> Option<String> {
    if !node.is_element() {
        return None;
    }
    node.node_name().map(|t| t.to_ascii_lowercase())
}

/// Whether the element carries `class` among its classes.
#[must_use]
pub fn has_class(node: &NodeRef, class: &str) -> bool {
    node.attr("class")
        .is_some_and(|value| value.split_whitespace().any(|c| c == class))
}

/// Whether the element is hidden with an inline `display: none` style.
#[must_use]
pub fn is_hidden(node: &NodeRef) -> bool {
    node.attr("style")
        .is_some_and(|style| HIDDEN_STYLE.is_match(&style))
}

// === Attribute Operations ===

/// Get any attribute value.
#[inline]
#[must_use]
pub fn attr(node: &NodeRef, name: &str) -> Option<String> {
    node.attr(name).map(|s| s.to_string())
}

/// Get an attribute value, treating a missing attribute as empty.
#[inline]
#[must_use]
pub fn attr_or_empty(node: &NodeRef, name: &str) -> String {
    attr(node, name).unwrap_or_default()
}

// === Text Content ===

/// All text content of a node and its descendants.
///
/// Returns `StrTendril` for zero-copy passing.
#[inline]
#[must_use]
pub fn text_content(node: &NodeRef) -> StrTendril {
    node.text()
}

/// Inner HTML of an element.
#[inline]
#[must_use]
pub fn inner_html(node: &NodeRef) -> StrTendril {
    node.inner_html()
}

// === Tree Navigation ===

/// Child nodes that carry content: elements and text, in document order.
///
/// Comments, doctypes and processing instructions are skipped.
#[must_use]
pub fn content_children<'a>(node: &NodeRef<'a>) -> Vec<NodeRef<'a>> {
    node.children()
        .into_iter()
        .filter(|child| child.is_element() || child.is_text())
        .collect()
}

/// Direct element children.
#[must_use]
pub fn element_children<'a>(node: &NodeRef<'a>) -> Vec<NodeRef<'a>> {
    node.children()
        .into_iter()
        .filter(NodeRef::is_element)
        .collect()
}
