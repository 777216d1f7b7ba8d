//! hashnote - content pipeline for notes stored in the URL fragment
//!
//! A note's only persisted form is its share token in the page's address
//! fragment. This library covers the two pieces between the editing surface
//! and the address bar:
//!
//! - `sanitizer`: allow-list rewrite of untrusted markup (html5ever based)
//! - `codec`: gzip + base64url share tokens, with a startup capability probe
//!
//! Supporting modules:
//! - `parser`: tolerant HTML5 parsing of markup fragments
//! - `security`: the allow-list and textual pre-filter patterns
//! - `escape`: plain-text escape/unescape helpers
//! - `session`: save/load orchestration over host-provided traits
//! - `error`: codec error type
//!
//! Save: surface markup -> [`codec::compress`] -> fragment.
//! Load: fragment -> [`codec::decompress`] -> [`sanitizer::sanitize`] -> surface.

pub mod codec;
pub mod error;
pub mod escape;
pub mod parser;
pub mod sanitizer;
pub mod security;
pub mod session;

pub use codec::{CodecOptions, ContentCodec, compress, decompress};
pub use error::CodecError;
pub use escape::{escape_html, unescape_html};
pub use sanitizer::{Sanitizer, sanitize, sanitize_optional};
pub use session::{AddressBar, EditableSurface, EditorState, NoteSession, Notice};
