// Canonical content model so the raw-markup view, clipboard export and
// the live fragment all agree on one serialized HTML string.

use tracing::trace;

use crate::dom::HostEngine;
use crate::sync::SyncGuard;

/// Provides read access to the current content as HTML.
///
/// Implementations should return the markup suitable for display or export.
pub trait ContentProvider {
    fn get_content(&self) -> String;
}

/// The canonical HTML string. Only `capture`, `set_raw` and `clear` write it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentModel {
    html: String,
    revision: u64,
}

impl ContentModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn as_str(&self) -> &str {
        &self.html
    }

    pub fn is_empty(&self) -> bool {
        self.html.is_empty()
    }

    /// Incremented on every committed write
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Pull the live fragment's serialization. Skipped while a reconciliation
    /// overwrite is in flight. Returns whether the capture was committed.
    pub fn capture<E: HostEngine + ?Sized>(&mut self, engine: &E, guard: &SyncGuard) -> bool {
        if guard.is_in_flight() {
            trace!(generation = guard.generation(), "capture suppressed during overwrite");
            return false;
        }
        self.commit(engine.serialize());
        true
    }

    /// Replace the content from the raw-markup view. The live fragment is not touched.
    pub fn set_raw(&mut self, text: impl Into<String>) {
        self.commit(text.into());
    }

    /// Empty the content, and the live fragment too when it is live
    pub fn clear<E: HostEngine + ?Sized>(&mut self, engine: &mut E, live: bool) {
        self.commit(String::new());
        if live {
            engine.set_inner_html("");
        }
    }

    fn commit(&mut self, html: String) {
        self.html = html;
        self.revision += 1;
    }
}

impl ContentProvider for ContentModel {
    fn get_content(&self) -> String {
        self.html.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::MemoryEngine;

    #[test]
    fn test_capture_reads_serialization() {
        let engine = MemoryEngine::from_html("<P>hi</P>");
        let guard = SyncGuard::new();
        let mut content = ContentModel::new();
        assert!(content.capture(&engine, &guard));
        assert_eq!(content.as_str(), "<p>hi</p>");
        assert_eq!(content.revision(), 1);
    }

    #[test]
    fn test_capture_skipped_while_in_flight() {
        let engine = MemoryEngine::from_html("<p>live</p>");
        let guard = SyncGuard::new();
        let mut content = ContentModel::new();
        content.set_raw("<p>raw");
        guard.begin();
        assert!(!content.capture(&engine, &guard));
        assert_eq!(content.as_str(), "<p>raw");
        assert_eq!(content.revision(), 1);
    }

    #[test]
    fn test_set_raw_leaves_engine_alone() {
        let engine = MemoryEngine::from_html("<p>live</p>");
        let mut content = ContentModel::new();
        content.set_raw("<h1>raw</h1>");
        assert_eq!(content.get_content(), "<h1>raw</h1>");
        assert_eq!(engine.serialize(), "<p>live</p>");
    }

    #[test]
    fn test_clear() {
        let mut engine = MemoryEngine::from_html("<p>live</p>");
        let mut content = ContentModel::new();
        content.set_raw("<p>live</p>");

        content.clear(&mut engine, false);
        assert!(content.is_empty());
        assert_eq!(engine.serialize(), "<p>live</p>");

        content.clear(&mut engine, true);
        assert_eq!(engine.serialize(), "");
    }
}
