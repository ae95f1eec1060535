// Library exports for dualedit

pub mod clipboard;
pub mod commands;
pub mod config;
pub mod content;
pub mod dom;
pub mod editor;
pub mod error;
pub mod logging;
pub mod pipeline;
pub mod prompt;
pub mod sanitize;
pub mod script;
pub mod sync;

pub use content::{ContentModel, ContentProvider};
pub use dom::{HostEngine, MemoryEngine};
pub use editor::Editor;
pub use sync::ViewMode;
