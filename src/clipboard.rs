use thiserror::Error;
use tracing::{debug, warn};

/// What the clipboard offered on paste. Either flavour may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClipboardPayload {
    html: Option<String>,
    text: Option<String>,
}

impl ClipboardPayload {
    pub fn new(html: Option<&str>, text: Option<&str>) -> Self {
        ClipboardPayload {
            html: html.map(str::to_string),
            text: text.map(str::to_string),
        }
    }

    pub fn from_html(html: &str) -> Self {
        Self::new(Some(html), None)
    }

    pub fn from_text(text: &str) -> Self {
        Self::new(None, Some(text))
    }

    /// The HTML flavour, if present and non-empty
    pub fn html(&self) -> Option<&str> {
        self.html.as_deref().filter(|html| !html.is_empty())
    }

    /// The plain-text flavour
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn is_empty(&self) -> bool {
        self.html().is_none() && self.text().is_none_or(str::is_empty)
    }
}

#[derive(Debug, Error)]
pub enum ClipboardError {
    #[error("clipboard is empty")]
    Empty,
    #[error("clipboard unavailable: {0}")]
    Unavailable(String),
}

/// Supplies paste payloads
pub trait ClipboardSource {
    fn read_payload(&mut self) -> Result<ClipboardPayload, ClipboardError>;
}

/// Receives exported content verbatim
pub trait ClipboardSink {
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError>;
}

/// The system clipboard through `arboard`
pub struct SystemClipboard {
    inner: arboard::Clipboard,
}

impl SystemClipboard {
    pub fn new() -> Result<Self, ClipboardError> {
        let inner = arboard::Clipboard::new()
            .map_err(|err| ClipboardError::Unavailable(err.to_string()))?;
        Ok(SystemClipboard { inner })
    }
}

impl ClipboardSource for SystemClipboard {
    fn read_payload(&mut self) -> Result<ClipboardPayload, ClipboardError> {
        let mut diagnostics = Vec::new();

        let html = match self.inner.get().html() {
            Ok(html) if !html.trim().is_empty() => {
                diagnostics.push(format!("text/html ({} bytes)", html.len()));
                Some(html)
            }
            Ok(_) => {
                diagnostics.push("text/html (empty payload)".to_string());
                None
            }
            Err(arboard::Error::ContentNotAvailable) => {
                diagnostics.push("text/html unavailable".to_string());
                None
            }
            Err(err) => {
                warn!(%err, "reading text/html from clipboard failed");
                None
            }
        };

        let text = match self.inner.get_text() {
            Ok(text) => {
                diagnostics.push(format!("text/plain ({} bytes)", text.len()));
                Some(text)
            }
            Err(arboard::Error::ContentNotAvailable) => None,
            Err(err) => return Err(ClipboardError::Unavailable(err.to_string())),
        };

        debug!(formats = %diagnostics.join(", "), "clipboard formats during paste");

        let payload = ClipboardPayload { html, text };
        if payload.is_empty() {
            return Err(ClipboardError::Empty);
        }
        Ok(payload)
    }
}

impl ClipboardSink for SystemClipboard {
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        self.inner
            .set_text(text)
            .map_err(|err| ClipboardError::Unavailable(err.to_string()))
    }
}

/// An in-process clipboard for scripted sessions and tests
#[derive(Debug, Clone, Default)]
pub struct MemoryClipboard {
    pub payload: ClipboardPayload,
    pub written: Vec<String>,
}

impl ClipboardSource for MemoryClipboard {
    fn read_payload(&mut self) -> Result<ClipboardPayload, ClipboardError> {
        if self.payload.is_empty() {
            return Err(ClipboardError::Empty);
        }
        Ok(self.payload.clone())
    }
}

impl ClipboardSink for MemoryClipboard {
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        self.written.push(text.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_html_is_ignored() {
        let payload = ClipboardPayload::new(Some(""), Some("x"));
        assert_eq!(payload.html(), None);
        assert_eq!(payload.text(), Some("x"));
        assert!(!payload.is_empty());
    }

    #[test]
    fn test_memory_clipboard() {
        let mut clipboard = MemoryClipboard::default();
        assert!(matches!(clipboard.read_payload(), Err(ClipboardError::Empty)));

        clipboard.payload = ClipboardPayload::from_html("<b>x</b>");
        assert_eq!(clipboard.read_payload().unwrap().html(), Some("<b>x</b>"));

        clipboard.write_text("<p>out</p>").unwrap();
        assert_eq!(clipboard.written, vec!["<p>out</p>".to_string()]);
    }
}
