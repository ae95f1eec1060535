//! Editing session tying the host engine, the canonical content and the
//! view-mode state machine together.
//!
//! Event handlers of a host UI map one-to-one onto methods here: the
//! rendered view's input event calls [`Editor::on_input`], the source
//! view's input event calls [`Editor::on_raw_edit`], the view switcher calls
//! [`Editor::set_view_mode`] and toolbar buttons call the command methods.

use tracing::debug;

use crate::clipboard::{ClipboardError, ClipboardPayload, ClipboardSink};
use crate::commands::{FormatCommand, ListKind};
use crate::config::EditorConfig;
use crate::content::{ContentModel, ContentProvider};
use crate::dom::HostEngine;
use crate::pipeline::{ListOutcome, PasteSource, Pipeline, WrapOutcome};
use crate::prompt::UrlPrompt;
use crate::sync::{SyncController, Transition, ViewMode};

pub struct Editor<E: HostEngine> {
    engine: E,
    content: ContentModel,
    sync: SyncController,
    config: EditorConfig,
}

impl<E: HostEngine> Editor<E> {
    pub fn new(engine: E) -> Self {
        Self::with_config(engine, EditorConfig::default())
    }

    /// Start a session in the rendered view. The canonical content starts
    /// empty; the first capture picks up whatever the engine holds.
    pub fn with_config(engine: E, config: EditorConfig) -> Self {
        Editor {
            engine,
            content: ContentModel::new(),
            sync: SyncController::new(),
            config,
        }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    pub fn content(&self) -> &ContentModel {
        &self.content
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn view_mode(&self) -> ViewMode {
        self.sync.mode()
    }

    pub fn is_syncing(&self) -> bool {
        self.sync.guard().is_in_flight()
    }

    pub fn set_view_mode(&mut self, mode: ViewMode) -> Transition {
        self.sync
            .transition(mode, self.content.as_str(), &mut self.engine)
    }

    /// Input event from the rendered view. Returns whether the content was updated.
    pub fn on_input(&mut self) -> bool {
        if self.sync.mode() != ViewMode::Rendered {
            return false;
        }
        self.content.capture(&self.engine, self.sync.guard())
    }

    /// Input event from the source view
    pub fn on_raw_edit(&mut self, text: impl Into<String>) {
        self.content.set_raw(text);
    }

    pub fn clear(&mut self) {
        let live = self.sync.mode() == ViewMode::Rendered;
        self.content.clear(&mut self.engine, live);
        debug!(live, "cleared content");
    }

    /// The command pipeline. Commands act on the live fragment, so there is
    /// none while the source view is shown.
    pub fn pipeline(&mut self) -> Option<Pipeline<'_, E>> {
        if self.sync.mode() != ViewMode::Rendered {
            debug!("ignoring command in source view");
            return None;
        }
        Some(Pipeline::new(
            &mut self.engine,
            &mut self.content,
            self.sync.guard(),
        ))
    }

    pub fn apply_command(&mut self, command: &FormatCommand) {
        if let Some(mut pipeline) = self.pipeline() {
            pipeline.apply_command(command);
        }
    }

    pub fn apply_custom_wrap(&mut self, tag: &str, attribute: Option<&str>) -> WrapOutcome {
        match self.pipeline() {
            Some(mut pipeline) => pipeline.apply_custom_wrap(tag, attribute),
            None => WrapOutcome::NoSelection,
        }
    }

    pub fn create_list(&mut self, kind: ListKind) -> ListOutcome {
        match self.pipeline() {
            Some(mut pipeline) => pipeline.create_list(kind),
            None => ListOutcome::NoSelection,
        }
    }

    /// Prompt for a URL with the configured message and link the selection
    pub fn create_link<P: UrlPrompt + ?Sized>(&mut self, prompt: &mut P) -> bool {
        let message = self.config.link_prompt.clone();
        match self.pipeline() {
            Some(mut pipeline) => pipeline.create_link(prompt, &message),
            None => false,
        }
    }

    pub fn handle_paste(&mut self, payload: &ClipboardPayload) -> PasteSource {
        match self.pipeline() {
            Some(mut pipeline) => pipeline.handle_paste(payload),
            None => PasteSource::Empty,
        }
    }

    /// Copy the canonical content verbatim and return the acknowledgment to show
    pub fn export<S: ClipboardSink + ?Sized>(
        &self,
        sink: &mut S,
    ) -> Result<&str, ClipboardError> {
        sink.write_text(self.content.as_str())?;
        debug!(bytes = self.content.as_str().len(), "exported content");
        Ok(self.config.export_ack.as_str())
    }
}

impl<E: HostEngine> ContentProvider for Editor<E> {
    fn get_content(&self) -> String {
        self.content.get_content()
    }
}
