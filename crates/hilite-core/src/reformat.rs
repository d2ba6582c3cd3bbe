//! Paragraph reformatting: strip highlights, rematch, rewrap, restore caret.
//!
//! Two modes:
//! - full-paragraph: the whole paragraph text is re-matched from scratch
//!   (after a split or join, or a paste that created paragraphs)
//! - local: only the active segment and its immediate neighbours are
//!   re-matched; every other segment keeps its identity
//!
//! # Match application order
//!
//! [`format`] applies matches **highest offset first**. Each wrap cuts the
//! leftmost plain run only, so the offsets of matches still pending (all to
//! its left) stay valid against the original text.
//!
//! A scan that aborts leaves the paragraph exactly as it was and reports
//! [`EditError::ScanAborted`]; a half-applied match list is never written.

use smol_str::SmolStr;

use crate::document::Document;
use crate::error::EditError;
use crate::offset_map::{locate_from, to_structural_position};
use crate::paragraph::Paragraph;
use crate::error::PatternError;
use crate::pattern::CompositePattern;
use crate::segment::Segment;
use crate::text_helpers::split_at_char;
use crate::types::Point;

/// Match-and-wrap pass over one run of plain text.
///
/// Returns the segments covering `text` exactly. Empty text yields no
/// segments; callers normalize to get the placeholder back.
pub fn format(text: &str, pattern: &CompositePattern) -> Result<Vec<Segment>, PatternError> {
    let matches = pattern.find_matches(text)?;
    if matches.is_empty() {
        return Ok(if text.is_empty() {
            Vec::new()
        } else {
            vec![Segment::plain(text)]
        });
    }

    // Built right to left, reversed at the end.
    let mut wrapped = Vec::with_capacity(matches.len() * 2 + 1);
    let mut remainder = text;
    for m in matches.iter().rev() {
        let (before, rest) = split_at_char(remainder, m.range.start);
        let (matched, after) = split_at_char(rest, m.range.len());
        if !after.is_empty() {
            wrapped.push(Segment::plain(after));
        }
        wrapped.push(Segment::highlighted(m.kind, SmolStr::new(matched)));
        remainder = before;
    }
    if !remainder.is_empty() {
        wrapped.push(Segment::plain(remainder));
    }
    wrapped.reverse();
    Ok(wrapped)
}

fn format_or_keep(
    paragraph: &Paragraph,
    text: &str,
    pattern: &CompositePattern,
) -> Result<Vec<Segment>, EditError> {
    format(text, pattern).map_err(|err| {
        tracing::warn!(paragraph = %paragraph.id(), error = %err, "scan aborted, paragraph left as is");
        EditError::ScanAborted
    })
}

/// Full-paragraph mode.
///
/// `caret` is a paragraph-linear offset; the returned point is where it
/// lands in the rebuilt segment list.
pub fn reformat_paragraph(
    paragraph: &mut Paragraph,
    caret: Option<usize>,
    pattern: &CompositePattern,
) -> Result<Option<Point>, EditError> {
    let text = paragraph.text();
    let segments = format_or_keep(paragraph, &text, pattern)?;
    tracing::trace!(
        paragraph = %paragraph.id(),
        matches = segments.iter().filter(|s| !s.is_plain()).count(),
        "full reformat"
    );
    paragraph.set_segments(segments);
    paragraph.normalize();
    Ok(caret.and_then(|offset| to_structural_position(paragraph, offset)))
}

/// Local mode: re-match the window `[active - 1, active + 1]`.
///
/// If the segment after `active` is empty or a placeholder it is removed and
/// `active` closes the window instead. Segments outside the window are not
/// touched, apart from the final normalize coalescing plain runs across
/// the window edges.
///
/// An out-of-range `active` is reported as `MissingSegment` with paragraph
/// 0; callers that know the index attach it with
/// [`EditError::in_paragraph`].
pub fn reformat_local(
    paragraph: &mut Paragraph,
    active: usize,
    caret: Option<usize>,
    pattern: &CompositePattern,
) -> Result<Option<Point>, EditError> {
    if active >= paragraph.segment_count() {
        return Err(EditError::MissingSegment {
            paragraph: 0,
            segment: active,
        });
    }

    let prev = active.saturating_sub(1);
    let drop_sibling = paragraph
        .segment(active + 1)
        .is_some_and(|sibling| sibling.is_empty());
    let next = if drop_sibling || active + 1 >= paragraph.segment_count() {
        active
    } else {
        active + 1
    };

    // Matched before anything is touched; the dropped sibling has no text.
    let text: String = paragraph.segments()[prev..=next]
        .iter()
        .map(|s| s.text())
        .collect();
    let segments = format_or_keep(paragraph, &text, pattern)?;
    if drop_sibling {
        paragraph.remove_segment(active + 1);
    }

    // Start of the segment in front of the window; normalize may merge the
    // window's first run into it but never moves its start.
    let anchor_index = prev.saturating_sub(1);
    let anchor_base = paragraph.segment_start(anchor_index);

    tracing::trace!(
        paragraph = %paragraph.id(),
        window = ?(prev..next + 1),
        replacement = segments.len(),
        "local reformat"
    );
    paragraph.splice_segments(prev..next + 1, segments);
    paragraph.normalize();

    Ok(caret.and_then(|offset| {
        locate_from(paragraph, anchor_index, anchor_base, offset)
            .or_else(|| to_structural_position(paragraph, offset))
    }))
}

/// Full-paragraph mode over every paragraph of a document.
pub fn reformat_document(document: &mut Document, pattern: &CompositePattern) {
    for index in 0..document.paragraph_count() {
        if let Some(para) = document.paragraph_mut(index) {
            // Logged in the paragraph pass; the rest still get formatted.
            let _ = reformat_paragraph(para, None, pattern);
        }
    }
}
