//! View-mode state machine.
//!
//! The canonical string is pushed into the live fragment exactly once per
//! genuine `Source -> Rendered` transition. While that overwrite settles, the
//! [`SyncGuard`] suppresses captures; it is released by a frame callback so
//! input events produced by the overwrite itself are ignored.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

use tracing::debug;

use crate::dom::HostEngine;

/// Which of the two views is displayed and interactive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    #[default]
    Rendered,
    Source,
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewMode::Rendered => f.write_str("rendered"),
            ViewMode::Source => f.write_str("source"),
        }
    }
}

impl FromStr for ViewMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rendered" | "editor" | "wysiwyg" => Ok(ViewMode::Rendered),
            "source" | "html" | "raw" => Ok(ViewMode::Source),
            other => Err(format!("unknown view mode `{other}`")),
        }
    }
}

#[derive(Debug, Default)]
struct GuardState {
    generation: Cell<u64>,
    in_flight: Cell<bool>,
}

/// Ownership hand-off flag between the live fragment and the canonical string.
///
/// Cloning shares the same state, so a frame callback can hold a clone.
/// Each `begin` starts a new generation; `release` only clears the flag for
/// the current generation, so a stale callback cannot end a newer overwrite.
#[derive(Debug, Clone, Default)]
pub struct SyncGuard {
    state: Rc<GuardState>,
}

impl SyncGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark an overwrite as in flight and return its generation
    pub fn begin(&self) -> u64 {
        let generation = self.state.generation.get() + 1;
        self.state.generation.set(generation);
        self.state.in_flight.set(true);
        generation
    }

    /// Clear the flag if `generation` is still the current overwrite
    pub fn release(&self, generation: u64) -> bool {
        if self.state.in_flight.get() && self.state.generation.get() == generation {
            self.state.in_flight.set(false);
            true
        } else {
            false
        }
    }

    pub fn is_in_flight(&self) -> bool {
        self.state.in_flight.get()
    }

    pub fn generation(&self) -> u64 {
        self.state.generation.get()
    }
}

/// What a view-mode change did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// `Source -> Rendered`: the live fragment was overwritten from the canonical string
    Reconciled { generation: u64 },
    /// `Rendered -> Source`: the raw view shows the already-current string
    ShowSource,
    /// Same mode as before; nothing happened
    Unchanged,
}

#[derive(Debug, Clone)]
pub struct SyncController {
    current: ViewMode,
    previous: ViewMode,
    guard: SyncGuard,
}

impl Default for SyncController {
    fn default() -> Self {
        Self::new()
    }
}

impl SyncController {
    pub fn new() -> Self {
        SyncController {
            current: ViewMode::Rendered,
            previous: ViewMode::Rendered,
            guard: SyncGuard::new(),
        }
    }

    pub fn mode(&self) -> ViewMode {
        self.current
    }

    /// The mode before the most recent transition
    pub fn previous(&self) -> ViewMode {
        self.previous
    }

    pub fn guard(&self) -> &SyncGuard {
        &self.guard
    }

    /// Whether the live fragment is currently the authoritative projection
    pub fn live_is_authoritative(&self) -> bool {
        self.current == ViewMode::Rendered && !self.guard.is_in_flight()
    }

    /// Move to `next`, reconciling the live fragment on `Source -> Rendered`
    pub fn transition<E: HostEngine + ?Sized>(
        &mut self,
        next: ViewMode,
        content: &str,
        engine: &mut E,
    ) -> Transition {
        self.previous = self.current;
        self.current = next;

        match (self.previous, self.current) {
            (ViewMode::Source, ViewMode::Rendered) => {
                let generation = self.guard.begin();
                engine.set_inner_html(content);
                let guard = self.guard.clone();
                engine.request_frame(Box::new(move || {
                    if guard.release(generation) {
                        debug!(generation, "sync guard released");
                    }
                }));
                debug!(generation, bytes = content.len(), "reconciled live fragment");
                Transition::Reconciled { generation }
            }
            (ViewMode::Rendered, ViewMode::Source) => {
                debug!("showing source view");
                Transition::ShowSource
            }
            _ => Transition::Unchanged,
        }
    }
}
