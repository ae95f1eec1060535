// Host rendering engine abstraction
// The live editable fragment is owned by a host engine. The editor only talks
// to it through `HostEngine`; `MemoryEngine` is the in-process implementation.

pub mod memory;
pub mod node;
pub mod parser;
pub mod range;

use thiserror::Error;

use crate::commands::FormatCommand;

pub use memory::MemoryEngine;
pub use node::{Element, Node};
pub use range::{Boundary, NodePath, Range};

/// A one-shot continuation run after the next rendering pass
pub type FrameCallback = Box<dyn FnOnce()>;

/// Why a range could not be structurally surrounded
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SurroundError {
    #[error("range partially selects a non-text node")]
    PartialSelection,
    #[error("range boundary does not point into the fragment")]
    InvalidBoundary,
}

/// The capabilities the editor needs from whatever owns the live subtree.
pub trait HostEngine {
    /// The current selection, if it lies inside the editable fragment
    fn selection(&self) -> Option<Range>;

    /// Plain text of `range`; line breaks and block boundaries become `\n`
    fn selected_text(&self, range: &Range) -> String;

    /// Execute a native formatting command against the current selection
    fn exec(&mut self, command: &FormatCommand);

    /// Move the contents of `range` into a copy of `wrapper` placed where the range was
    fn surround(&mut self, range: &Range, wrapper: &Element) -> Result<(), SurroundError>;

    /// Replace the selection with parsed `html`, leaving the caret after it.
    /// Does nothing without a selection.
    fn insert_html(&mut self, html: &str);

    /// Serialize the live fragment (`innerHTML`)
    fn serialize(&self) -> String;

    /// Overwrite the live fragment from markup
    fn set_inner_html(&mut self, html: &str);

    fn focus(&mut self);

    /// Schedule `callback` to run after the next rendering pass
    fn request_frame(&mut self, callback: FrameCallback);
}
