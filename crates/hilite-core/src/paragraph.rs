//! Paragraph blocks and their segment list.
//!
//! A paragraph owns an ordered list of [`Segment`]s. Structural edits go
//! through the explicit API here; [`Paragraph::normalize`] restores the
//! invariants (plain runs coalesced, no empty runs, placeholder iff empty)
//! after a batch of edits.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::ops::Range;

use smol_str::{SmolStr, format_smolstr};

use crate::segment::{Highlight, Segment};
use crate::text_helpers::{char_len, insert_at_char, remove_chars, split_at_char};
use crate::types::Point;

/// A paragraph block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paragraph {
    /// Stable ID for rendering (format: `p-{index}`)
    id: SmolStr,
    segments: Vec<Segment>,
}

impl Paragraph {
    /// An empty paragraph holding only the placeholder.
    pub fn empty(id: SmolStr) -> Self {
        Self {
            id,
            segments: vec![Segment::Placeholder],
        }
    }

    /// A paragraph with one unformatted run.
    pub fn with_text(id: SmolStr, text: &str) -> Self {
        let mut para = Self::empty(id);
        if !text.is_empty() {
            para.segments = vec![Segment::plain(text)];
        }
        para
    }

    /// A paragraph from arbitrary segments, normalized.
    pub fn from_segments(id: SmolStr, segments: Vec<Segment>) -> Self {
        let mut para = Self { id, segments };
        para.normalize();
        para
    }

    pub fn id(&self) -> &SmolStr {
        &self.id
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn segment(&self, index: usize) -> Option<&Segment> {
        self.segments.get(index)
    }

    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// Full text: segment texts concatenated without separator.
    pub fn text(&self) -> String {
        self.segments.iter().map(|s| s.text()).collect()
    }

    pub fn char_len(&self) -> usize {
        self.segments.iter().map(Segment::char_len).sum()
    }

    /// Whether the paragraph has no text.
    pub fn is_empty(&self) -> bool {
        self.segments.iter().all(Segment::is_empty)
    }

    /// Linear offset at which segment `index` starts.
    pub fn segment_start(&self, index: usize) -> usize {
        self.segments
            .iter()
            .take(index)
            .map(Segment::char_len)
            .sum()
    }

    /// Insert a segment before `index`. Returns false if `index` is out of range.
    pub fn insert_segment(&mut self, index: usize, segment: Segment) -> bool {
        if index > self.segments.len() {
            return false;
        }
        self.segments.insert(index, segment);
        true
    }

    pub fn remove_segment(&mut self, index: usize) -> Option<Segment> {
        (index < self.segments.len()).then(|| self.segments.remove(index))
    }

    /// Replace the segments in `range` with `with`, returning the removed ones.
    ///
    /// Segments outside `range` are not touched.
    pub fn splice_segments<I>(&mut self, range: Range<usize>, with: I) -> Vec<Segment>
    where
        I: IntoIterator<Item = Segment>,
    {
        let end = range.end.min(self.segments.len());
        let start = range.start.min(end);
        self.segments.splice(start..end, with).collect()
    }

    /// Replace every segment.
    pub fn set_segments(&mut self, segments: Vec<Segment>) {
        self.segments = segments;
    }

    /// Drop all content, leaving the placeholder.
    pub fn clear(&mut self) {
        self.segments = vec![Segment::Placeholder];
    }

    /// Restore the segment invariants.
    ///
    /// Adjacent plain runs are coalesced, empty runs and empty highlight
    /// children are dropped, and the placeholder is present exactly when the
    /// paragraph has no text.
    pub fn normalize(&mut self) {
        let mut out: Vec<Segment> = Vec::with_capacity(self.segments.len());
        for segment in self.segments.drain(..) {
            match segment {
                Segment::Placeholder => {}
                Segment::Plain(text) if text.is_empty() => {}
                Segment::Plain(text) => match out.last_mut() {
                    Some(Segment::Plain(prev)) => {
                        *prev = format_smolstr!("{prev}{text}");
                    }
                    _ => out.push(Segment::Plain(text)),
                },
                Segment::Highlighted(mut h) => {
                    h.parts_mut().retain(|p| !p.is_empty());
                    if !h.parts().is_empty() {
                        out.push(Segment::Highlighted(h));
                    }
                }
            }
        }
        if out.is_empty() {
            out.push(Segment::Placeholder);
        }
        self.segments = out;
    }

    /// Hash of the paragraph text, for cheap change detection.
    pub fn source_hash(&self) -> u64 {
        hash_source(&self.text())
    }

    /// Insert `text` at a structural point, as a text-editing surface does:
    /// the text joins whatever node holds the point, highlight wrappers
    /// included. Returns the point just after the inserted text.
    pub fn insert_text(&mut self, point: Point, text: &str) -> Option<Point> {
        let inserted = char_len(text);
        match point {
            Point::Child { index } => {
                if !self.insert_segment(index, Segment::plain(text)) {
                    return None;
                }
                Some(Point::text(index, inserted))
            }
            Point::Text {
                segment,
                part,
                offset,
            } => {
                let target = self.segments.get_mut(segment)?;
                match target {
                    Segment::Placeholder => {
                        *target = Segment::plain(text);
                        Some(Point::text(segment, inserted))
                    }
                    Segment::Plain(existing) => {
                        if part != 0 || offset > char_len(existing) {
                            return None;
                        }
                        *existing = insert_at_char(existing, offset, text);
                        Some(Point::text(segment, offset + inserted))
                    }
                    Segment::Highlighted(h) => {
                        let node = h.parts_mut().get_mut(part)?;
                        if offset > char_len(node) {
                            return None;
                        }
                        *node = insert_at_char(node, offset, text);
                        Some(Point::Text {
                            segment,
                            part,
                            offset: offset + inserted,
                        })
                    }
                }
            }
        }
    }

    /// Delete the chars in the paragraph-linear `range`.
    ///
    /// Emptied highlight wrappers disappear; emptied plain runs stay as empty
    /// text nodes until the next normalize. A paragraph left without text gets
    /// its placeholder back.
    pub fn delete_chars(&mut self, range: Range<usize>) -> bool {
        if range.start >= range.end || range.end > self.char_len() {
            return false;
        }

        let mut seg_start = 0;
        for segment in self.segments.iter_mut() {
            let seg_len = segment.char_len();
            let seg_end = seg_start + seg_len;
            let lo = range.start.max(seg_start);
            let hi = range.end.min(seg_end);
            if lo < hi {
                let local = (lo - seg_start)..(hi - seg_start);
                match segment {
                    Segment::Plain(text) => *text = remove_chars(text, local),
                    Segment::Highlighted(h) => {
                        let mut part_start = 0;
                        for part in h.parts_mut().iter_mut() {
                            let part_len = char_len(part);
                            let plo = local.start.max(part_start);
                            let phi = local.end.min(part_start + part_len);
                            if plo < phi {
                                *part = remove_chars(part, (plo - part_start)..(phi - part_start));
                            }
                            part_start += part_len;
                        }
                    }
                    Segment::Placeholder => {}
                }
            }
            seg_start = seg_end;
        }

        self.segments
            .retain(|s| !matches!(s, Segment::Highlighted(h) if h.char_len() == 0));
        if self.segments.iter().all(Segment::is_empty) {
            self.clear();
        }
        true
    }

    /// Split at a linear offset, keeping the left side and returning the
    /// segments of the right side. A highlight straddling the split point is
    /// cloned onto both sides. Either side left empty becomes a placeholder.
    pub fn split_off(&mut self, offset: usize) -> Vec<Segment> {
        let mut left = Vec::new();
        let mut right = Vec::new();
        let mut seg_start = 0;

        for segment in self.segments.drain(..) {
            let seg_len = segment.char_len();
            let seg_end = seg_start + seg_len;
            if segment.is_placeholder() {
                // Dropped; re-added below if a side ends up empty.
            } else if seg_end <= offset {
                left.push(segment);
            } else if seg_start >= offset {
                right.push(segment);
            } else {
                let (l, r) = split_segment(segment, offset - seg_start);
                left.push(l);
                right.push(r);
            }
            seg_start = seg_end;
        }

        if left.iter().all(Segment::is_empty) {
            left = vec![Segment::Placeholder];
        }
        if right.iter().all(Segment::is_empty) {
            right = vec![Segment::Placeholder];
        }
        self.segments = left;
        right
    }

    /// Append segments at the end (paragraph join).
    pub fn append_segments(&mut self, segments: Vec<Segment>) {
        self.segments.retain(|s| !s.is_placeholder());
        self.segments
            .extend(segments.into_iter().filter(|s| !s.is_placeholder()));
        if self.segments.iter().all(Segment::is_empty) {
            self.clear();
        }
    }

    /// Take the segments out, leaving the placeholder behind.
    pub fn take_segments(&mut self) -> Vec<Segment> {
        std::mem::replace(&mut self.segments, vec![Segment::Placeholder])
    }
}

/// Split one segment at a local char offset strictly inside it.
fn split_segment(segment: Segment, local: usize) -> (Segment, Segment) {
    match segment {
        Segment::Plain(text) => {
            let (l, r) = split_at_char(&text, local);
            (Segment::plain(l), Segment::plain(r))
        }
        Segment::Highlighted(h) => {
            let mut left = Vec::new();
            let mut right = Vec::new();
            let mut part_start = 0;
            for part in h.parts() {
                let part_len = char_len(part);
                if part_start + part_len <= local {
                    left.push(part.clone());
                } else if part_start >= local {
                    right.push(part.clone());
                } else {
                    let (l, r) = split_at_char(part, local - part_start);
                    left.push(SmolStr::new(l));
                    right.push(SmolStr::new(r));
                }
                part_start += part_len;
            }
            (
                Segment::Highlighted(Highlight::with_parts(h.kind(), left)),
                Segment::Highlighted(Highlight::with_parts(h.kind(), right)),
            )
        }
        Segment::Placeholder => (Segment::Placeholder, Segment::Placeholder),
    }
}

/// Fingerprint of a document text, compared to decide whether a
/// `TextUpdated` notification is due.
pub fn hash_source(text: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    text.hash(&mut hasher);
    hasher.finish()
}

/// Element id for the `index`th paragraph a document creates. Ids follow
/// creation order and survive edits, splits and joins.
pub fn make_paragraph_id(index: usize) -> SmolStr {
    format_smolstr!("p-{index}")
}
