// Command & Sanitization Pipeline
// Turns toolbar actions, list and link requests and paste events into
// mutations of the live fragment, then captures the result.

use tracing::debug;

use crate::clipboard::ClipboardPayload;
use crate::commands::{FormatCommand, ListKind, WrapAttribute};
use crate::content::ContentModel;
use crate::dom::{Element, HostEngine};
use crate::prompt::UrlPrompt;
use crate::sanitize::{clean, empty_list_markup, list_markup, plain_text_to_html};
use crate::sync::SyncGuard;

/// How a custom wrap was applied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WrapOutcome {
    /// The selection was structurally surrounded by the new element
    Surrounded,
    /// The selection could not be surrounded; equivalent markup was inserted instead
    InsertedMarkup,
    /// Nothing selected
    NoSelection,
    /// The tag name is not a valid element name
    InvalidTag,
}

/// What list creation inserted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListOutcome {
    Items(usize),
    Placeholder,
    NoSelection,
}

/// Which clipboard flavour a paste used
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasteSource {
    Html,
    PlainText,
    Empty,
}

/// Borrowed view over the engine and the content model for one command
pub struct Pipeline<'a, E: HostEngine + ?Sized> {
    engine: &'a mut E,
    content: &'a mut ContentModel,
    guard: &'a SyncGuard,
}

impl<'a, E: HostEngine + ?Sized> Pipeline<'a, E> {
    pub fn new(engine: &'a mut E, content: &'a mut ContentModel, guard: &'a SyncGuard) -> Self {
        Pipeline {
            engine,
            content,
            guard,
        }
    }

    fn capture(&mut self) {
        self.content.capture(&*self.engine, self.guard);
    }

    /// Run a native command, refocus the fragment and capture unconditionally
    pub fn apply_command(&mut self, command: &FormatCommand) {
        debug!(%command, "applying command");
        self.engine.exec(command);
        self.engine.focus();
        self.capture();
    }

    /// Wrap the selected text in `<tag>`, optionally with one `attr=value` attribute
    pub fn apply_custom_wrap(&mut self, tag: &str, attribute: Option<&str>) -> WrapOutcome {
        if !is_valid_tag(tag) {
            debug!(tag, "rejecting custom wrap with invalid tag");
            return WrapOutcome::InvalidTag;
        }
        let Some(range) = self.engine.selection() else {
            return WrapOutcome::NoSelection;
        };
        let text = self.engine.selected_text(&range);
        if text.is_empty() {
            return WrapOutcome::NoSelection;
        }

        let mut wrapper = Element::new(tag);
        if let Some(attr) = attribute.and_then(WrapAttribute::parse) {
            wrapper.set_attr(attr.name, attr.value);
        }

        let outcome = match self.engine.surround(&range, &wrapper) {
            Ok(()) => WrapOutcome::Surrounded,
            Err(err) => {
                debug!(%err, tag, "surround failed, inserting markup");
                self.engine.insert_html(&wrapper.markup_around(&text));
                WrapOutcome::InsertedMarkup
            }
        };
        self.capture();
        outcome
    }

    /// Turn the selected lines into a list, or insert an empty one at the caret
    pub fn create_list(&mut self, kind: ListKind) -> ListOutcome {
        let Some(range) = self.engine.selection() else {
            self.capture();
            return ListOutcome::NoSelection;
        };

        let selected = self.engine.selected_text(&range);
        let (markup, outcome) = if selected.is_empty() {
            (empty_list_markup(kind), ListOutcome::Placeholder)
        } else {
            let items = selected
                .split('\n')
                .filter(|item| !item.trim().is_empty())
                .count();
            (list_markup(kind, &selected), ListOutcome::Items(items))
        };

        debug!(list = kind.tag(), ?outcome, "creating list");
        self.engine.insert_html(&markup);
        self.capture();
        outcome
    }

    /// Ask for a URL and link the selection to it. Returns whether a link was requested.
    pub fn create_link<P: UrlPrompt + ?Sized>(&mut self, prompt: &mut P, message: &str) -> bool {
        match prompt.prompt_url(message) {
            Some(url) if !url.trim().is_empty() => {
                self.apply_command(&FormatCommand::CreateLink(url.trim().to_string()));
                true
            }
            _ => {
                debug!("link prompt cancelled");
                false
            }
        }
    }

    /// Insert clipboard content at the selection, preferring the HTML flavour
    pub fn handle_paste(&mut self, payload: &ClipboardPayload) -> PasteSource {
        let (markup, source) = match (payload.html(), payload.text()) {
            (Some(html), _) => (clean(html), PasteSource::Html),
            (None, Some(text)) => (plain_text_to_html(text), PasteSource::PlainText),
            (None, None) => (String::new(), PasteSource::Empty),
        };

        if markup.is_empty() {
            debug!(?source, "paste produced no markup");
            self.capture();
            return PasteSource::Empty;
        }

        debug!(?source, bytes = markup.len(), "pasting");
        self.engine.insert_html(&markup);
        self.capture();
        source
    }
}

fn is_valid_tag(tag: &str) -> bool {
    let mut chars = tag.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '-')
}
