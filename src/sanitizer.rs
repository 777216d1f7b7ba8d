//! Allow-list sanitizer for note markup
//!
//! Untrusted markup is cleaned in four steps:
//!
//! 1. **Pre-filter**: textual removal of script blocks, dangerous URL schemes
//!    and `on<word>=` assignments ([`SanitizePolicy::prefilter`])
//! 2. **Parse**: html5ever builds a tree, whatever the input looks like
//! 3. **Rewrite**: a top-down walk rebuilds allowed elements with no
//!    attributes and unwraps every other element, splicing its cleaned
//!    children into the parent
//! 4. **Serialize**: the rewritten tree is written back as HTML
//!
//! Nothing here returns an error. Malformed or unsafe structure is
//! downgraded instead.
//!
//! # Examples
//!
//! ```rust
//! use hashnote::sanitizer::sanitize;
//!
//! assert_eq!(
//!     sanitize(r#"<p onclick="evil()">Hello <b>world</b></p>"#),
//!     "<p>Hello <b>world</b></p>"
//! );
//! assert_eq!(sanitize("<table><tr><td>cell</td></tr></table>"), "cell");
//! ```

use markup5ever_rcdom::{Handle, NodeData};
use tracing::{debug, warn};

use crate::parser::{collect_text, parse_markup};
use crate::security::{SanitizeAction, SanitizePolicy};

const HTML_NAMESPACE: &str = "http://www.w3.org/1999/xhtml";

/// Upper bound on rewrite passes in [`Sanitizer::sanitize`]
const MAX_PASSES: usize = 4;

/// Node of a rewritten document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CleanNode {
    /// Allowed element, attributes removed
    Element {
        tag: String,
        children: Vec<CleanNode>,
    },
    /// Text content, unescaped
    Text(String),
}

/// Markup sanitizer
#[derive(Debug, Clone, Copy, Default)]
pub struct Sanitizer {
    policy: SanitizePolicy,
}

impl Sanitizer {
    /// Create a sanitizer with the default policy
    pub fn new() -> Self {
        Self {
            policy: SanitizePolicy::new(),
        }
    }

    /// Create a sanitizer that flattens elements nested deeper than `max_depth`
    pub fn with_max_depth(max_depth: usize) -> Self {
        Self {
            policy: SanitizePolicy::with_max_depth(max_depth),
        }
    }

    /// Sanitize untrusted markup
    ///
    /// Unwrapping an element that acts as a parser scope boundary (`object`,
    /// `td`, `button`, ...) can leave markup that reparses into a different
    /// tree, so the rewrite is repeated until its output is stable.
    pub fn sanitize(&self, raw: &str) -> String {
        if raw.is_empty() {
            return String::new();
        }

        let mut output = self.sanitize_once(raw);
        let mut passes = 1;
        let mut stable = false;
        while passes < MAX_PASSES {
            let next = self.sanitize_once(&output);
            passes += 1;
            if next == output {
                stable = true;
                break;
            }
            output = next;
        }

        if !stable {
            warn!(
                input_bytes = raw.len(),
                passes, "sanitized markup did not stabilise"
            );
        }

        debug!(
            input_bytes = raw.len(),
            output_bytes = output.len(),
            passes,
            "sanitized markup"
        );
        output
    }

    /// Run steps 1-3 and return the rewritten tree
    pub fn clean_nodes(&self, raw: &str) -> Vec<CleanNode> {
        let filtered = self.policy.prefilter(raw);
        let dom = parse_markup(&filtered);

        let mut nodes = Vec::new();
        self.rewrite_children(&dom.document, &mut nodes, 0);
        nodes
    }

    /// Serialize rewritten nodes as HTML
    pub fn serialize_nodes(&self, nodes: &[CleanNode]) -> String {
        let mut output = String::new();
        self.serialize_into(nodes, &mut output);
        output
    }

    fn sanitize_once(&self, raw: &str) -> String {
        let nodes = self.clean_nodes(raw);
        self.serialize_nodes(&nodes)
    }

    fn rewrite_children(&self, node: &Handle, out: &mut Vec<CleanNode>, depth: usize) {
        for child in node.children.borrow().iter() {
            self.rewrite_node(child, out, depth);
        }
    }

    fn rewrite_node(&self, node: &Handle, out: &mut Vec<CleanNode>, depth: usize) {
        match node.data {
            NodeData::Document => self.rewrite_children(node, out, depth),
            NodeData::Text { ref contents } => push_text(out, &contents.borrow()),
            NodeData::Element { ref name, .. } => {
                if depth >= self.policy.max_depth() {
                    let mut text = String::new();
                    collect_text(node, &mut text);
                    push_text(out, &text);
                    return;
                }

                let tag = name.local.as_ref();
                let action = if &*name.ns == HTML_NAMESPACE {
                    self.policy.check_element(tag)
                } else {
                    SanitizeAction::Unwrap
                };

                match action {
                    SanitizeAction::Keep => {
                        let mut children = Vec::new();
                        if !self.policy.is_void(tag) {
                            self.rewrite_children(node, &mut children, depth + 1);
                        }
                        out.push(CleanNode::Element {
                            tag: tag.to_string(),
                            children,
                        });
                    }
                    SanitizeAction::Unwrap => self.rewrite_children(node, out, depth + 1),
                }
            }
            // Comments, doctypes and processing instructions are dropped
            NodeData::Comment { .. }
            | NodeData::Doctype { .. }
            | NodeData::ProcessingInstruction { .. } => {}
        }
    }

    fn serialize_into(&self, nodes: &[CleanNode], output: &mut String) {
        for node in nodes {
            match node {
                CleanNode::Text(text) => {
                    escape_text(&self.policy.scrub_text(text), output);
                }
                CleanNode::Element { tag, children } => {
                    output.push('<');
                    output.push_str(tag);
                    output.push('>');
                    if self.policy.is_void(tag) {
                        continue;
                    }
                    self.serialize_into(children, output);
                    output.push_str("</");
                    output.push_str(tag);
                    output.push('>');
                }
            }
        }
    }
}

/// Sanitize untrusted markup with the default policy
pub fn sanitize(raw: &str) -> String {
    Sanitizer::new().sanitize(raw)
}

/// Sanitize markup that may be absent; `None` yields an empty string
pub fn sanitize_optional(raw: Option<&str>) -> String {
    raw.map(sanitize).unwrap_or_default()
}

/// Append text, merging with a preceding text sibling
///
/// Unwrapped elements leave their text next to the parent's own text; the
/// merged run is what gets scrubbed at serialization time.
fn push_text(out: &mut Vec<CleanNode>, text: &str) {
    if text.is_empty() {
        return;
    }
    if let Some(CleanNode::Text(previous)) = out.last_mut() {
        previous.push_str(text);
    } else {
        out.push(CleanNode::Text(text.to_string()));
    }
}

/// Escape text content the way HTML fragment serialization does
fn escape_text(text: &str, output: &mut String) {
    for ch in text.chars() {
        match ch {
            '&' => output.push_str("&amp;"),
            '<' => output.push_str("&lt;"),
            '>' => output.push_str("&gt;"),
            '\u{a0}' => output.push_str("&nbsp;"),
            _ => output.push(ch),
        }
    }
}
