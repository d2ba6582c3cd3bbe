//! Default editing behaviour of the text surface.
//!
//! When [`handle_beforeinput`](crate::input::handle_beforeinput) passes an
//! event through, the surface applies it itself before the after-input hook
//! runs. [`apply_default`] models that step on the owned document the way a
//! contenteditable element does it: typed text joins whatever text node holds
//! the caret (a highlight wrapper included), Enter splits the paragraph and
//! clones a split wrapper onto both halves, Backspace at a paragraph start
//! joins paragraphs, and content arriving in an empty editor lands outside
//! any paragraph.
//!
//! Nothing here normalizes or re-highlights; that is the router's job.

use crate::document::Document;
use crate::input::{BeforeInputContext, InputType};
use crate::offset_map::{to_linear_offset, to_structural_position};
use crate::text_helpers::{find_word_boundary_backward, find_word_boundary_forward};
use crate::types::Caret;

/// Apply an input event the way the editing surface would.
///
/// Returns false if the event had no effect.
pub fn apply_default(doc: &mut Document, ctx: &BeforeInputContext) -> bool {
    if doc.is_empty() {
        return insert_orphan(doc, ctx);
    }

    let Some(sel) = doc.selection() else {
        tracing::debug!("no selection, default action dropped");
        return false;
    };

    let mut changed = false;
    if !sel.is_collapsed() {
        changed = delete_selection(doc);
        if matches!(
            ctx.input_type,
            InputType::DeleteContentBackward
                | InputType::DeleteContentForward
                | InputType::DeleteWordBackward
                | InputType::DeleteWordForward
                | InputType::DeleteHardLineBackward
                | InputType::DeleteHardLineForward
        ) {
            return changed;
        }
    }

    let data = ctx.data.as_deref().unwrap_or_default();
    match ctx.input_type {
        InputType::InsertText
        | InputType::InsertCompositionText
        | InputType::InsertReplacementText
        | InputType::InsertFromPaste
        | InputType::InsertFromDrop => insert_text(doc, data) || changed,
        InputType::InsertParagraph | InputType::InsertLineBreak => split_paragraph(doc),
        InputType::DeleteContentBackward => delete_backward(doc, |_, o| o.saturating_sub(1)),
        InputType::DeleteWordBackward => delete_backward(doc, find_word_boundary_backward),
        InputType::DeleteHardLineBackward => delete_backward(doc, |_, _| 0),
        InputType::DeleteContentForward => delete_forward(doc, |text, o| {
            (o + 1).min(text.chars().count())
        }),
        InputType::DeleteWordForward => delete_forward(doc, find_word_boundary_forward),
        InputType::DeleteHardLineForward => delete_forward(doc, |text, _| text.chars().count()),
        InputType::DeleteByCut | InputType::DeleteByDrag | InputType::DeleteContent => changed,
        InputType::Unknown(_) => changed,
    }
}

fn insert_orphan(doc: &mut Document, ctx: &BeforeInputContext) -> bool {
    let Some(data) = ctx.data.as_deref().filter(|d| !d.is_empty()) else {
        return false;
    };
    if !ctx.input_type.is_insertion() {
        return false;
    }
    let text = match doc.orphan() {
        Some(existing) => format!("{existing}{data}"),
        None => data.to_string(),
    };
    doc.set_orphan(text);
    true
}

/// Caret paragraph index and its paragraph-linear offset.
fn caret_offset(doc: &Document) -> Option<(usize, usize)> {
    let caret = doc.caret()?;
    let para = doc.paragraph(caret.paragraph)?;
    Some((caret.paragraph, to_linear_offset(para, caret.point)?))
}

fn place_caret(doc: &mut Document, paragraph: usize, offset: usize) {
    if let Some(point) = doc
        .paragraph(paragraph)
        .and_then(|p| to_structural_position(p, offset))
    {
        doc.set_caret(Caret::new(paragraph, point));
    }
}

/// Delete the selected range, across paragraphs if needed.
fn delete_selection(doc: &mut Document) -> bool {
    let Some(range) = doc.selection_range().map(|s| s.to_range()) else {
        return false;
    };
    let (Some(start), Some(end)) = (doc.caret_at(range.start), doc.caret_at(range.end)) else {
        return false;
    };
    let (Some(start_off), Some(end_off)) = (
        doc.paragraph(start.paragraph)
            .and_then(|p| to_linear_offset(p, start.point)),
        doc.paragraph(end.paragraph)
            .and_then(|p| to_linear_offset(p, end.point)),
    ) else {
        return false;
    };

    if start.paragraph == end.paragraph {
        if let Some(para) = doc.paragraph_mut(start.paragraph) {
            para.delete_chars(start_off..end_off);
        }
    } else {
        let Some(last) = doc.paragraph_mut(end.paragraph).map(|p| {
            p.delete_chars(0..end_off);
            p.take_segments()
        }) else {
            return false;
        };
        for _ in start.paragraph + 1..=end.paragraph {
            doc.remove_paragraph(start.paragraph + 1);
        }
        if let Some(first) = doc.paragraph_mut(start.paragraph) {
            let len = first.char_len();
            first.delete_chars(start_off..len);
            first.append_segments(last);
        }
    }
    place_caret(doc, start.paragraph, start_off);
    true
}

/// Insert text at the caret. Lines after the first become new paragraphs.
fn insert_text(doc: &mut Document, data: &str) -> bool {
    if data.is_empty() {
        return false;
    }
    let Some(caret) = doc.caret() else {
        return false;
    };
    let mut lines = data.split('\n');
    let first = lines.next().unwrap_or_default();
    let rest: Vec<&str> = lines.collect();

    let Some(para) = doc.paragraph_mut(caret.paragraph) else {
        return false;
    };
    let Some(base) = to_linear_offset(para, caret.point) else {
        return false;
    };
    let point = if first.is_empty() {
        caret.point
    } else {
        match para.insert_text(caret.point, first) {
            Some(point) => point,
            None => return false,
        }
    };
    if rest.is_empty() {
        doc.set_caret(Caret::new(caret.paragraph, point));
        return true;
    }

    let split_at = base + first.chars().count();
    let tail = para.split_off(split_at);
    let mut index = caret.paragraph;
    let last_line = rest.len() - 1;
    for (i, line) in rest.iter().enumerate() {
        let mut next = doc.new_paragraph(line);
        if i == last_line {
            next.append_segments(tail.clone());
        }
        index += 1;
        doc.insert_paragraph(index, next);
    }
    place_caret(doc, index, rest[last_line].chars().count());
    true
}

/// Split the caret paragraph; the caret moves to the start of the new one.
fn split_paragraph(doc: &mut Document) -> bool {
    let Some((index, offset)) = caret_offset(doc) else {
        return false;
    };
    let Some(tail) = doc.paragraph_mut(index).map(|p| p.split_off(offset)) else {
        return false;
    };
    let mut next = doc.new_paragraph("");
    next.set_segments(tail);
    doc.insert_paragraph(index + 1, next);
    place_caret(doc, index + 1, 0);
    true
}

/// Delete from `boundary(text, offset)` up to the caret, or join with the
/// previous paragraph when the caret is at the start.
fn delete_backward(doc: &mut Document, boundary: impl Fn(&str, usize) -> usize) -> bool {
    let Some((index, offset)) = caret_offset(doc) else {
        return false;
    };
    if offset == 0 {
        return join_with_previous(doc, index);
    }
    let Some(para) = doc.paragraph_mut(index) else {
        return false;
    };
    let start = boundary(&para.text(), offset).min(offset);
    para.delete_chars(start..offset);
    place_caret(doc, index, start);
    true
}

/// Delete from the caret up to `boundary(text, offset)`, or pull the next
/// paragraph up when the caret is at the end.
fn delete_forward(doc: &mut Document, boundary: impl Fn(&str, usize) -> usize) -> bool {
    let Some((index, offset)) = caret_offset(doc) else {
        return false;
    };
    let Some(para) = doc.paragraph_mut(index) else {
        return false;
    };
    if offset == para.char_len() {
        return join_with_previous(doc, index + 1);
    }
    let end = boundary(&para.text(), offset).max(offset);
    para.delete_chars(offset..end);
    place_caret(doc, index, offset);
    true
}

/// Append paragraph `index` to the one before it, caret at the seam.
fn join_with_previous(doc: &mut Document, index: usize) -> bool {
    if index == 0 || index >= doc.paragraph_count() {
        return false;
    }
    let Some(mut removed) = doc.remove_paragraph(index) else {
        return false;
    };
    let Some(prev) = doc.paragraph_mut(index - 1) else {
        return false;
    };
    let seam = prev.char_len();
    prev.append_segments(removed.take_segments());
    place_caret(doc, index - 1, seam);
    true
}
