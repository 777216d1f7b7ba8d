//! Allow-list policy for note markup
//!
//! Note markup round-trips through a shareable URL, so anything loaded from
//! a link is attacker-controlled. The policy is deliberately closed:
//!
//! - A fixed set of structural tags survives; every other element is unwrapped
//! - No attribute survives (there is no attribute allow-list)
//! - A textual pre-filter strips script blocks, dangerous URL schemes and
//!   inline event-handler assignments before the markup is parsed
//!
//! # Threat Model
//!
//! - Malicious scripts (`<script>` tags)
//! - Event handlers (onclick, onload, etc.)
//! - JavaScript, data and VBScript URLs
//! - Elements that load or embed content (`iframe`, `img`, `object`)

use regex::Regex;
use std::borrow::Cow;
use std::sync::LazyLock;

/// Maximum nesting depth at which elements are still reconstructed
///
/// Deeper elements are flattened to their text content.
pub const MAX_NESTING_DEPTH: usize = 512;

/// Elements that survive sanitization
pub const ALLOWED_TAGS: &[&str] = &[
    "p",
    "br",
    "div",
    "span",
    "b",
    "strong",
    "i",
    "em",
    "u",
    "h1",
    "h2",
    "h3",
    "ul",
    "ol",
    "li",
    "blockquote",
];

/// Elements serialized without an end tag
const VOID_TAGS: &[&str] = &["br"];

static SCRIPT_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<script\b[^>]*>.*?</script\s*>").expect("script block pattern")
});

// Anchored at a word boundary: `metadata:` in prose is not a scheme
static DANGEROUS_SCHEME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:javascript|data|vbscript):").expect("scheme pattern")
});

static EVENT_HANDLER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bon\w+=").expect("event handler pattern"));

/// Action to take for an element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SanitizeAction {
    /// Rebuild the element with no attributes
    Keep,
    /// Drop the element, keep its cleaned children in its place
    Unwrap,
}

/// Sanitization policy
#[derive(Debug, Clone, Copy)]
pub struct SanitizePolicy {
    max_depth: usize,
}

impl SanitizePolicy {
    /// Create a policy with default settings
    pub fn new() -> Self {
        Self {
            max_depth: MAX_NESTING_DEPTH,
        }
    }

    /// Create a policy with a custom maximum depth
    pub fn with_max_depth(max_depth: usize) -> Self {
        Self { max_depth }
    }

    /// Maximum depth at which elements are still rebuilt
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Decide what happens to an element
    ///
    /// # Examples
    ///
    /// ```
    /// use hashnote::security::{SanitizeAction, SanitizePolicy};
    ///
    /// let policy = SanitizePolicy::new();
    /// assert_eq!(policy.check_element("strong"), SanitizeAction::Keep);
    /// assert_eq!(policy.check_element("script"), SanitizeAction::Unwrap);
    /// assert_eq!(policy.check_element("a"), SanitizeAction::Unwrap);
    /// ```
    pub fn check_element(&self, tag_name: &str) -> SanitizeAction {
        if ALLOWED_TAGS.contains(&tag_name) {
            SanitizeAction::Keep
        } else {
            SanitizeAction::Unwrap
        }
    }

    /// Whether an element is serialized without an end tag
    pub fn is_void(&self, tag_name: &str) -> bool {
        VOID_TAGS.contains(&tag_name)
    }

    /// Textual pre-filter applied to raw markup before parsing
    ///
    /// Removes script blocks, dangerous URL schemes and `on<word>=`
    /// assignments, repeating until no pattern matches.
    ///
    /// # Examples
    ///
    /// ```
    /// use hashnote::security::SanitizePolicy;
    ///
    /// let policy = SanitizePolicy::new();
    /// assert_eq!(policy.prefilter("a<script>x()</script>b"), "ab");
    /// assert_eq!(policy.prefilter(r#"<a href="javascript:go()">"#), r#"<a href="go()">"#);
    /// assert_eq!(policy.prefilter("<p onclick=\"x\">"), "<p \"x\">");
    /// ```
    pub fn prefilter<'a>(&self, raw: &'a str) -> Cow<'a, str> {
        strip_to_fixpoint(raw, &[&*SCRIPT_BLOCK, &*DANGEROUS_SCHEME, &*EVENT_HANDLER])
    }

    /// Scheme and handler patterns applied to decoded text content
    ///
    /// Entity-encoded payloads (`javascript&#58;`) only become visible after
    /// parsing, so text runs are scrubbed again before serialization.
    pub fn scrub_text<'a>(&self, text: &'a str) -> Cow<'a, str> {
        strip_to_fixpoint(text, &[&*DANGEROUS_SCHEME, &*EVENT_HANDLER])
    }
}

impl Default for SanitizePolicy {
    fn default() -> Self {
        Self::new()
    }
}

fn strip_to_fixpoint<'a>(input: &'a str, patterns: &[&Regex]) -> Cow<'a, str> {
    let mut current = Cow::Borrowed(input);
    loop {
        let mut changed = false;
        for pattern in patterns {
            if pattern.is_match(&current) {
                current = Cow::Owned(pattern.replace_all(&current, "").into_owned());
                changed = true;
            }
        }
        if !changed {
            return current;
        }
    }
}
