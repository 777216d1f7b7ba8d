//! Save/load orchestration between the editing surface and the address bar
//!
//! The surface and the address bar belong to the host; they are reached
//! through [`EditableSurface`] and [`AddressBar`]. A [`NoteSession`] owns the
//! probed codec and the editor's [`EditorState`], and turns each save or
//! load into a [`Notice`] for the host to show.

use tracing::{info, warn};

use crate::codec::{CodecOptions, ContentCodec};
use crate::error::CodecError;
use crate::sanitizer::Sanitizer;

/// The host's editable region
pub trait EditableSurface {
    /// Current serialized markup
    fn markup(&self) -> String;
    /// Replace the surface content with already-sanitized markup
    fn set_markup(&mut self, markup: &str);
}

/// The host's address bar
pub trait AddressBar {
    /// Current fragment, verbatim (no percent-decoding)
    fn fragment(&self) -> String;
    /// Replace the fragment without adding a history entry
    fn replace_fragment(&mut self, token: &str);
}

/// Editor flags that would otherwise live in globals
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditorState {
    /// Surface content matches the fragment
    pub saved: bool,
    /// Token most recently written to or read from the fragment
    pub last_token: Option<String>,
}

/// Outcome of a save or load, for user-visible messaging
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// Empty fragment; the surface starts empty
    NewNote,
    /// Note decoded from the fragment
    Loaded,
    /// Fragment updated
    Saved,
    /// Fragment unchanged; nothing newer to write
    Unchanged,
    /// The fragment could not be decoded; the surface was cleared
    InvalidLink(String),
    /// Compression failed; the fragment was left untouched
    SaveFailed(String),
}

impl Notice {
    /// Whether the host should present this as an error
    pub fn is_error(&self) -> bool {
        matches!(self, Notice::InvalidLink(_) | Notice::SaveFailed(_))
    }
}

/// One editing session
#[derive(Debug)]
pub struct NoteSession {
    codec: ContentCodec,
    sanitizer: Sanitizer,
    state: EditorState,
}

impl NoteSession {
    /// Probe the codec and start a session
    ///
    /// A failed probe is fatal: the host must not offer editing without a
    /// working compression stage.
    pub fn start(options: CodecOptions) -> Result<Self, CodecError> {
        let codec = ContentCodec::probe(options)?;
        Ok(Self {
            codec,
            sanitizer: Sanitizer::new(),
            state: EditorState::default(),
        })
    }

    /// Current editor state
    pub fn state(&self) -> &EditorState {
        &self.state
    }

    /// Record that the user changed the surface
    pub fn mark_dirty(&mut self) {
        self.state.saved = false;
    }

    /// Load the note named by the fragment into the surface
    pub fn load(
        &mut self,
        surface: &mut impl EditableSurface,
        address: &impl AddressBar,
    ) -> Notice {
        let fragment = address.fragment();
        let token = fragment.strip_prefix('#').unwrap_or(&fragment);

        if token.is_empty() {
            surface.set_markup("");
            self.state = EditorState {
                saved: true,
                last_token: None,
            };
            return Notice::NewNote;
        }

        match self.codec.decompress(token) {
            Ok(markup) => {
                let safe = self.sanitizer.sanitize(&markup);
                surface.set_markup(&safe);
                self.state = EditorState {
                    saved: true,
                    last_token: Some(token.to_string()),
                };
                info!(token_len = token.len(), "loaded note from fragment");
                Notice::Loaded
            }
            Err(e) => {
                surface.set_markup("");
                self.state = EditorState::default();
                Notice::InvalidLink(e.to_string())
            }
        }
    }

    /// Save the surface content into the fragment
    pub fn save(
        &mut self,
        surface: &impl EditableSurface,
        address: &mut impl AddressBar,
    ) -> Notice {
        let markup = surface.markup();
        match self.codec.compress(&markup) {
            Ok(token) => {
                self.state.saved = true;
                if self.state.last_token.as_deref() == Some(token.as_str()) {
                    return Notice::Unchanged;
                }
                address.replace_fragment(&token);
                info!(token_len = token.len(), "saved note to fragment");
                self.state.last_token = Some(token);
                Notice::Saved
            }
            Err(e) => {
                warn!(error = %e, "save failed; fragment left untouched");
                Notice::SaveFailed(e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Surface(String);

    impl EditableSurface for Surface {
        fn markup(&self) -> String {
            self.0.clone()
        }
        fn set_markup(&mut self, markup: &str) {
            self.0 = markup.to_string();
        }
    }

    #[derive(Default)]
    struct Address {
        fragment: String,
        writes: usize,
    }

    impl AddressBar for Address {
        fn fragment(&self) -> String {
            self.fragment.clone()
        }
        fn replace_fragment(&mut self, token: &str) {
            self.fragment = token.to_string();
            self.writes += 1;
        }
    }

    fn session() -> NoteSession {
        NoteSession::start(CodecOptions::default()).expect("session")
    }

    #[test]
    fn test_start_fails_on_bad_probe() {
        let result = NoteSession::start(CodecOptions {
            level: 42,
            ..CodecOptions::default()
        });
        assert!(matches!(result, Err(CodecError::CompressionUnavailable(_))));
    }

    #[test]
    fn test_empty_fragment_is_new_note() {
        let mut surface = Surface("stale".to_string());
        let address = Address::default();
        let notice = session().load(&mut surface, &address);
        assert_eq!(notice, Notice::NewNote);
        assert_eq!(surface.0, "");
    }

    #[test]
    fn test_hash_only_fragment_is_new_note() {
        let mut surface = Surface::default();
        let address = Address {
            fragment: "#".to_string(),
            writes: 0,
        };
        assert_eq!(session().load(&mut surface, &address), Notice::NewNote);
    }

    #[test]
    fn test_unchanged_save_skips_write() {
        let mut session = session();
        let surface = Surface("<p>same</p>".to_string());
        let mut address = Address::default();

        assert_eq!(session.save(&surface, &mut address), Notice::Saved);
        assert_eq!(session.save(&surface, &mut address), Notice::Unchanged);
        assert_eq!(address.writes, 1);
    }

    #[test]
    fn test_dirty_flag() {
        let mut session = session();
        let surface = Surface("<p>x</p>".to_string());
        let mut address = Address::default();

        session.save(&surface, &mut address);
        assert!(session.state().saved);
        session.mark_dirty();
        assert!(!session.state().saved);
    }

    #[test]
    fn test_notice_error_classification() {
        assert!(Notice::InvalidLink("x".into()).is_error());
        assert!(Notice::SaveFailed("x".into()).is_error());
        assert!(!Notice::Saved.is_error());
        assert!(!Notice::NewNote.is_error());
    }
}
