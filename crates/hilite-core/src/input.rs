//! Edit-event routing.
//!
//! Every text-changing action reaches the router twice: once before the
//! surface applies it ([`handle_beforeinput`]) and once after
//! ([`handle_input`]). The first may take over the event entirely; the second
//! decides which reformat, if any, the applied edit needs.
//!
//! No state is kept between events beyond the document itself. Lookups that
//! fail leave the applied edit as it is and report the event as skipped.

use std::ops::RangeInclusive;

use smol_str::SmolStr;

use crate::document::Document;
use crate::error::EditError;
use crate::offset_map::{to_linear_offset, to_structural_position};
use crate::pattern::CompositePattern;
use crate::reformat::{reformat_local, reformat_paragraph};
use crate::segment::{NBSP, Segment};
use crate::text_helpers::char_len;
use crate::types::{Caret, Point};

/// Semantic input type, following the W3C Input Events `inputType` values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputType {
    // === Insertion ===
    /// Insert typed text.
    InsertText,
    /// Insert text from IME composition.
    InsertCompositionText,
    /// Insert a line break (Shift+Enter).
    InsertLineBreak,
    /// Insert a paragraph break (Enter).
    InsertParagraph,
    /// Insert from paste operation.
    InsertFromPaste,
    /// Insert from drop operation.
    InsertFromDrop,
    /// Insert replacement text (e.g., spell check correction).
    InsertReplacementText,

    // === Deletion ===
    /// Delete content backward (Backspace).
    DeleteContentBackward,
    /// Delete content forward (Delete key).
    DeleteContentForward,
    /// Delete word backward (Ctrl/Alt+Backspace).
    DeleteWordBackward,
    /// Delete word forward (Ctrl/Alt+Delete).
    DeleteWordForward,
    /// Delete to line start (Cmd+Backspace on Mac).
    DeleteHardLineBackward,
    /// Delete to line end.
    DeleteHardLineForward,
    /// Delete by cut operation.
    DeleteByCut,
    /// Delete by drag operation.
    DeleteByDrag,
    /// Generic content deletion.
    DeleteContent,

    // === Unknown ===
    /// Unrecognized input type.
    Unknown(String),
}

impl InputType {
    /// Whether this input type is a deletion operation.
    pub fn is_deletion(&self) -> bool {
        matches!(
            self,
            Self::DeleteContentBackward
                | Self::DeleteContentForward
                | Self::DeleteWordBackward
                | Self::DeleteWordForward
                | Self::DeleteHardLineBackward
                | Self::DeleteHardLineForward
                | Self::DeleteByCut
                | Self::DeleteByDrag
                | Self::DeleteContent
        )
    }

    /// Whether this input type is an insertion operation.
    pub fn is_insertion(&self) -> bool {
        matches!(
            self,
            Self::InsertText
                | Self::InsertCompositionText
                | Self::InsertLineBreak
                | Self::InsertParagraph
                | Self::InsertFromPaste
                | Self::InsertFromDrop
                | Self::InsertReplacementText
        )
    }

    /// Enter and Shift+Enter both split the paragraph.
    pub fn is_paragraph_split(&self) -> bool {
        matches!(self, Self::InsertParagraph | Self::InsertLineBreak)
    }

    /// Paste and drop carry arbitrary, possibly multi-line, text.
    pub fn is_transfer(&self) -> bool {
        matches!(self, Self::InsertFromPaste | Self::InsertFromDrop)
    }
}

/// Parse an `inputType` string into our InputType enum.
pub fn parse_input_type(s: &str) -> InputType {
    match s {
        // Insertion
        "insertText" => InputType::InsertText,
        "insertCompositionText" => InputType::InsertCompositionText,
        "insertLineBreak" => InputType::InsertLineBreak,
        "insertParagraph" => InputType::InsertParagraph,
        "insertFromPaste" => InputType::InsertFromPaste,
        "insertFromDrop" => InputType::InsertFromDrop,
        "insertReplacementText" => InputType::InsertReplacementText,

        // Deletion
        "deleteContentBackward" => InputType::DeleteContentBackward,
        "deleteContentForward" => InputType::DeleteContentForward,
        "deleteWordBackward" | "deleteEntireWordBackward" => InputType::DeleteWordBackward,
        "deleteWordForward" | "deleteEntireWordForward" => InputType::DeleteWordForward,
        "deleteHardLineBackward" | "deleteSoftLineBackward" => {
            InputType::DeleteHardLineBackward
        }
        "deleteHardLineForward" | "deleteSoftLineForward" => InputType::DeleteHardLineForward,
        "deleteByCut" => InputType::DeleteByCut,
        "deleteByDrag" => InputType::DeleteByDrag,
        "deleteContent" => InputType::DeleteContent,

        // Unknown
        other => InputType::Unknown(other.to_string()),
    }
}

/// The key that triggered an input event, when the surface reports one.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    /// A character key.
    Character(SmolStr),
    Backspace,
    Delete,
    Enter,
    /// Unknown/unidentified key.
    Unidentified,
}

impl Key {
    /// Create a character key.
    pub fn character(s: impl Into<SmolStr>) -> Self {
        Self::Character(s.into())
    }

    /// Parse a DOM `KeyboardEvent.key` value.
    pub fn from_dom_key(key: &str) -> Self {
        match key {
            "Backspace" => Self::Backspace,
            "Delete" => Self::Delete,
            "Enter" => Self::Enter,
            " " | "Spacebar" => Self::Character(SmolStr::new_static(" ")),
            k if k.chars().count() == 1 => Self::Character(SmolStr::new(k)),
            _ => Self::Unidentified,
        }
    }
}

/// Context for beforeinput handling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BeforeInputContext {
    /// The input type.
    pub input_type: InputType,
    /// The data (text to insert, if any).
    pub data: Option<String>,
    /// The triggering key, if known.
    pub key: Option<Key>,
}

impl BeforeInputContext {
    pub fn new(input_type: InputType) -> Self {
        Self {
            input_type,
            data: None,
            key: None,
        }
    }

    pub fn with_data(mut self, data: impl Into<String>) -> Self {
        self.data = Some(data.into());
        self
    }

    pub fn with_key(mut self, key: Key) -> Self {
        self.key = Some(key);
        self
    }

    fn is_enter(&self) -> bool {
        self.input_type.is_paragraph_split() || self.key == Some(Key::Enter)
    }
}

/// Context for input (after-change) handling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputContext {
    /// The applied input type.
    pub input_type: InputType,
    /// The data that was inserted, if any.
    pub data: Option<String>,
}

impl From<&BeforeInputContext> for InputContext {
    fn from(ctx: &BeforeInputContext) -> Self {
        Self {
            input_type: ctx.input_type.clone(),
            data: ctx.data.clone(),
        }
    }
}

/// Result of handling a beforeinput event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BeforeInputResult {
    /// Event was handled, prevent the default action.
    Handled,
    /// The surface should apply the event itself.
    PassThrough,
}

/// Pre-edit interception.
///
/// In order:
/// 1. a non-empty selection covering the whole document removes every
///    paragraph;
/// 2. with no paragraphs, typed text becomes the first paragraph and Enter
///    creates two empty paragraphs with the caret in the second (pastes pass
///    through and land as orphan text);
/// 3. a space typed at the very end of a highlight is inserted as a
///    non-breaking space right after the wrapper.
pub fn handle_beforeinput(doc: &mut Document, ctx: &BeforeInputContext) -> BeforeInputResult {
    if let Some(sel) = doc.selection_range() {
        let len = doc.char_len();
        if !sel.is_collapsed() && sel.start() == 0 && sel.end() == len && len > 0 {
            tracing::debug!(len, "selection covers the document, clearing");
            doc.clear();
            doc.set_selection(None);
        }
    }

    if doc.is_empty() && doc.orphan().is_none() {
        return synthesize_first_paragraph(doc, ctx);
    }

    if ctx.input_type == InputType::InsertText && ctx.data.as_deref() == Some(" ") {
        if let Some(caret) = space_after_highlight(doc) {
            doc.set_caret(caret);
            return BeforeInputResult::Handled;
        }
    }

    BeforeInputResult::PassThrough
}

fn synthesize_first_paragraph(doc: &mut Document, ctx: &BeforeInputContext) -> BeforeInputResult {
    if ctx.is_enter() {
        let first = doc.new_paragraph("");
        let second = doc.new_paragraph("");
        doc.push_paragraph(first);
        doc.push_paragraph(second);
        doc.set_caret(Caret::new(1, Point::text(0, 0)));
        tracing::debug!("empty editor: created two paragraphs");
        return BeforeInputResult::Handled;
    }

    match ctx.input_type {
        InputType::InsertText
        | InputType::InsertCompositionText
        | InputType::InsertReplacementText => {
            let Some(data) = ctx.data.as_deref().filter(|d| !d.is_empty()) else {
                return BeforeInputResult::Handled;
            };
            let para = doc.new_paragraph(data);
            doc.push_paragraph(para);
            doc.set_caret(Caret::new(0, Point::text(0, char_len(data))));
            tracing::debug!("empty editor: created first paragraph");
            BeforeInputResult::Handled
        }
        // Nothing to delete.
        ref t if t.is_deletion() => BeforeInputResult::Handled,
        _ => BeforeInputResult::PassThrough,
    }
}

/// Insert NBSP after the highlight the caret sits at the end of.
///
/// Returns the caret after the inserted char, or `None` when the caret is
/// not at the end of a highlight.
fn space_after_highlight(doc: &mut Document) -> Option<Caret> {
    let sel = doc.selection()?;
    if !sel.is_collapsed() {
        return None;
    }
    let caret = sel.focus;
    let Point::Text {
        segment,
        part,
        offset,
    } = caret.point
    else {
        return None;
    };

    let para = doc.paragraph_mut(caret.paragraph)?;
    let highlight = para.segment(segment)?.highlight()?;
    let last_part = highlight.parts().len().checked_sub(1)?;
    if part != last_part || offset != char_len(&highlight.parts()[part]) {
        return None;
    }

    let next = segment + 1;
    let point = match para.segment(next) {
        Some(Segment::Plain(_)) => para.insert_text(Point::text(next, 0), &NBSP.to_string())?,
        _ => {
            para.insert_segment(next, Segment::plain(NBSP.to_string()));
            Point::text(next, 1)
        }
    };
    tracing::trace!(paragraph = caret.paragraph, segment, "space after highlight");
    Some(Caret::new(caret.paragraph, point))
}

/// What post-edit dispatch did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputOutcome {
    /// Orphan text was moved into new paragraphs and formatted.
    Relocated { paragraphs: RangeInclusive<usize> },
    /// A deletion emptied the sole paragraph; the document is empty again.
    Cleared,
    /// Full-paragraph reformat of these paragraphs.
    Full { paragraphs: RangeInclusive<usize> },
    /// Local reformat around the caret.
    Local { paragraph: usize },
    /// Re-highlighting was not possible; the applied edit is kept as is.
    Skipped(EditError),
}

/// Post-edit dispatch.
pub fn handle_input(
    doc: &mut Document,
    ctx: &InputContext,
    pattern: &CompositePattern,
) -> InputOutcome {
    match dispatch(doc, ctx, pattern) {
        Ok(outcome) => outcome,
        Err(err) => {
            tracing::debug!(input_type = ?ctx.input_type, error = %err, "input not re-highlighted");
            InputOutcome::Skipped(err)
        }
    }
}

fn dispatch(
    doc: &mut Document,
    ctx: &InputContext,
    pattern: &CompositePattern,
) -> Result<InputOutcome, EditError> {
    if doc.is_empty() {
        return relocate_orphan(doc, pattern);
    }

    let caret = doc.caret().ok_or(EditError::NoSelection)?;
    let index = caret.paragraph;
    let para = doc
        .paragraph(index)
        .ok_or(EditError::MissingParagraph(index))?;

    if ctx.input_type.is_deletion() && doc.paragraph_count() == 1 && para.is_empty() {
        doc.clear();
        doc.set_selection(None);
        return Ok(InputOutcome::Cleared);
    }

    let offset = to_linear_offset(para, caret.point).ok_or(EditError::AmbiguousPosition)?;

    let pasted_breaks = if ctx.input_type.is_transfer() {
        ctx.data
            .as_deref()
            .map_or(0, |d| d.chars().filter(|c| *c == '\n').count())
    } else {
        0
    };

    if ctx.input_type.is_paragraph_split() || pasted_breaks > 0 {
        let breaks = if pasted_breaks > 0 { pasted_breaks } else { 1 };
        let first = index.saturating_sub(breaks);
        for i in first..index {
            if let Some(p) = doc.paragraph_mut(i) {
                reformat_paragraph(p, None, pattern)?;
            }
        }
        let para = doc
            .paragraph_mut(index)
            .ok_or(EditError::MissingParagraph(index))?;
        let point = reformat_paragraph(para, Some(offset), pattern)?
            .ok_or(EditError::AmbiguousPosition)?;
        doc.set_caret(Caret::new(index, point));
        return Ok(InputOutcome::Full {
            paragraphs: first..=index,
        });
    }

    let active = match caret.point {
        Point::Text { segment, .. } => segment,
        Point::Child { .. } => to_structural_position(para, offset)
            .and_then(|p| p.segment())
            .ok_or(EditError::AmbiguousPosition)?,
    };
    let para = doc
        .paragraph_mut(index)
        .ok_or(EditError::MissingParagraph(index))?;
    let point = reformat_local(para, active, Some(offset), pattern)
        .map_err(|err| err.in_paragraph(index))?
        .ok_or(EditError::AmbiguousPosition)?;
    doc.set_caret(Caret::new(index, point));
    Ok(InputOutcome::Local { paragraph: index })
}

/// Move orphan text into paragraphs, one per line, caret at the end.
fn relocate_orphan(
    doc: &mut Document,
    pattern: &CompositePattern,
) -> Result<InputOutcome, EditError> {
    let orphan = doc.take_orphan().ok_or(EditError::MissingParagraph(0))?;
    for line in orphan.split('\n') {
        let mut para = doc.new_paragraph(line);
        // An aborted scan keeps the line as plain text; it is not dropped.
        let _ = reformat_paragraph(&mut para, None, pattern);
        doc.push_paragraph(para);
    }

    let last = doc.paragraph_count() - 1;
    let end = doc.paragraph(last).map(|p| p.char_len()).unwrap_or(0);
    let point = doc
        .paragraph(last)
        .and_then(|p| to_structural_position(p, end))
        .ok_or(EditError::AmbiguousPosition)?;
    doc.set_caret(Caret::new(last, point));
    tracing::debug!(paragraphs = last + 1, "relocated orphan text");
    Ok(InputOutcome::Relocated {
        paragraphs: 0..=last,
    })
}
