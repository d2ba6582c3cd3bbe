//! Keystroke scripts for `hilite replay`.
//!
//! One command per line:
//!
//! ```text
//! type Hello $google
//! enter
//! backspace
//! delete
//! paste first line\nsecond line
//! select-all
//! caret 4
//! select 0 5
//! ```
//!
//! Blank lines and lines starting with `#` are ignored. `type` and `paste`
//! take the rest of the line verbatim, with `\n` and `\\` escapes.

use hilite_core::{CompositePattern, Editor};
use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Type(String),
    Enter,
    Backspace,
    Delete,
    Paste(String),
    SelectAll,
    Caret(usize),
    Select(usize, usize),
}

#[derive(Debug, Error, Diagnostic)]
pub enum ScriptError {
    #[error("unknown command {command:?} on line {line}")]
    #[diagnostic(
        code(hilite::script::unknown),
        help("expected one of: type, enter, backspace, delete, paste, select-all, caret, select")
    )]
    Unknown { line: usize, command: String },

    #[error("bad argument {argument:?} on line {line}")]
    #[diagnostic(code(hilite::script::argument))]
    Argument { line: usize, argument: String },
}

pub fn parse_script(source: &str) -> Result<Vec<Step>, ScriptError> {
    let mut steps = Vec::new();
    for (index, raw) in source.lines().enumerate() {
        let line = index + 1;
        let trimmed = raw.trim_start();
        if trimmed.trim_end().is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let (command, rest) = trimmed.split_once(' ').unwrap_or((trimmed.trim_end(), ""));
        let step = match command {
            "type" => Step::Type(unescape(rest)),
            "paste" => Step::Paste(unescape(rest)),
            "enter" => Step::Enter,
            "backspace" => Step::Backspace,
            "delete" => Step::Delete,
            "select-all" => Step::SelectAll,
            "caret" => Step::Caret(number(rest, line)?),
            "select" => {
                let (anchor, head) = rest.trim().split_once(' ').ok_or_else(|| {
                    ScriptError::Argument {
                        line,
                        argument: rest.to_owned(),
                    }
                })?;
                Step::Select(number(anchor, line)?, number(head, line)?)
            }
            other => {
                return Err(ScriptError::Unknown {
                    line,
                    command: other.to_owned(),
                });
            }
        };
        steps.push(step);
    }
    Ok(steps)
}

/// Apply one step to `editor`, returning false when it could not be
/// applied (an unresolvable caret or selection).
pub fn run_step(editor: &mut Editor, step: &Step, pattern: &CompositePattern) -> bool {
    match step {
        Step::Type(text) => editor.type_text(text, pattern),
        Step::Enter => {
            editor.press_enter(pattern);
        }
        Step::Backspace => {
            editor.backspace(pattern);
        }
        Step::Delete => {
            editor.delete_forward(pattern);
        }
        Step::Paste(text) => {
            editor.paste(text, pattern);
        }
        Step::SelectAll => editor.select_all(),
        Step::Caret(offset) => return editor.set_caret(*offset),
        Step::Select(anchor, head) => return editor.set_selection(*anchor, *head),
    }
    true
}

fn number(argument: &str, line: usize) -> Result<usize, ScriptError> {
    argument.trim().parse().map_err(|_| ScriptError::Argument {
        line,
        argument: argument.to_owned(),
    })
}

fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
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
