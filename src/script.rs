//! Line-based editing scripts.
//!
//! Each non-blank line that does not start with `#` is one event:
//!
//! ```text
//! raw <html>            edit in the source view
//! view rendered|source  switch views
//! select <from> <to>    select by character offsets of the live text
//! select-all
//! caret-end
//! exec <command>        e.g. `bold`, `formatBlock:h2`, `justifyCenter`
//! wrap <tag> [attr]     custom wrap, e.g. `wrap span class="hl"`
//! list ul|ol
//! link [url]            link the selection to `url`, or ask the prompt when missing
//! paste-html <html>
//! paste-text <text>
//! input                 input event from the rendered view
//! paint                 run pending frame callbacks
//! clear
//! print                 emit the canonical content
//! ```
//!
//! Arguments may use `\n` and `\\` escapes.

use tracing::debug;

use crate::clipboard::ClipboardPayload;
use crate::commands::{FormatCommand, ListKind};
use crate::dom::MemoryEngine;
use crate::editor::Editor;
use crate::error::ScriptError;
use crate::prompt::{FixedPrompt, UrlPrompt};
use crate::sync::ViewMode;

/// Run `script` against `editor`, returning the output of every `print`.
/// A `link` without a URL is answered by `prompt`.
pub fn run_script<P: UrlPrompt + ?Sized>(
    editor: &mut Editor<MemoryEngine>,
    prompt: &mut P,
    script: &str,
) -> Result<Vec<String>, ScriptError> {
    let mut output = Vec::new();

    for (index, line) in script.lines().enumerate() {
        let line_no = index + 1;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let (name, rest) = match line.split_once(char::is_whitespace) {
            Some((name, rest)) => (name, rest.trim()),
            None => (line, ""),
        };
        let arg = unescape(rest);
        let fail = |message: String| ScriptError::new(line_no, message);

        debug!(line = line_no, command = name, "script step");
        match name {
            "raw" => editor.on_raw_edit(arg),
            "view" => {
                let mode: ViewMode = arg.parse().map_err(fail)?;
                editor.set_view_mode(mode);
            }
            "select" => {
                let (from, to) = parse_offsets(&arg)
                    .ok_or_else(|| fail(format!("expected two offsets, got `{arg}`")))?;
                if !editor.engine_mut().select_text(from, to) {
                    return Err(fail(format!("offsets {from}..{to} are out of range")));
                }
            }
            "select-all" => editor.engine_mut().select_all(),
            "caret-end" => editor.engine_mut().collapse_to_end(),
            "exec" => {
                let command: FormatCommand =
                    arg.parse().map_err(|err| fail(format!("{err}")))?;
                editor.apply_command(&command);
            }
            "wrap" => {
                let (tag, attribute) = match arg.split_once(char::is_whitespace) {
                    Some((tag, attribute)) => (tag, Some(attribute)),
                    None => (arg.as_str(), None),
                };
                if tag.is_empty() {
                    return Err(fail("wrap needs a tag".to_string()));
                }
                editor.apply_custom_wrap(tag, attribute);
            }
            "list" => {
                let kind: ListKind = arg.parse().map_err(|err| fail(format!("{err}")))?;
                editor.create_list(kind);
            }
            "link" if arg.is_empty() => {
                editor.create_link(&mut *prompt);
            }
            "link" => {
                editor.create_link(&mut FixedPrompt::new(Some(arg.as_str())));
            }
            "paste-html" => {
                editor.handle_paste(&ClipboardPayload::from_html(&arg));
            }
            "paste-text" => {
                editor.handle_paste(&ClipboardPayload::from_text(&arg));
            }
            "input" => {
                editor.on_input();
            }
            "paint" => {
                editor.engine_mut().paint();
            }
            "clear" => editor.clear(),
            "print" => output.push(editor.content().as_str().to_string()),
            other => return Err(fail(format!("unknown script command `{other}`"))),
        }
    }

    Ok(output)
}

fn parse_offsets(arg: &str) -> Option<(usize, usize)> {
    let mut parts = arg.split_whitespace();
    let from = parts.next()?.parse().ok()?;
    let to = parts.next()?.parse().ok()?;
    match parts.next() {
        Some(_) => None,
        None => Some((from, to)),
    }
}

fn unescape(arg: &str) -> String {
    let mut out = String::with_capacity(arg.len());
    let mut chars = arg.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}
