//! The owned document: paragraphs, orphan text and the current selection.
//!
//! This is the tree the editing surface would otherwise hold. Rendering is a
//! projection of it (see [`crate::render`]), never the other way round.

use smol_str::SmolStr;

use crate::offset_map::{to_linear_offset, to_structural_position};
use crate::paragraph::{Paragraph, make_paragraph_id};
use crate::segment::NBSP;
use crate::types::{Caret, DomSelection, Selection};

/// Document state.
///
/// Empty only when it has zero paragraphs. Orphan text can only exist in
/// that state: it is what a surface inserts when content arrives before any
/// paragraph does.
#[derive(Debug, Clone, Default)]
pub struct Document {
    paragraphs: Vec<Paragraph>,
    orphan: Option<SmolStr>,
    selection: Option<DomSelection>,
    /// Monotonic counter for paragraph IDs.
    next_paragraph_id: usize,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Document with one unformatted paragraph per line of `text`.
    pub fn from_text(text: &str) -> Self {
        let mut doc = Self::new();
        if text.is_empty() {
            return doc;
        }
        for line in text.split('\n') {
            let para = doc.new_paragraph(line);
            doc.paragraphs.push(para);
        }
        doc
    }

    /// A fresh paragraph with the next ID. Not inserted.
    pub fn new_paragraph(&mut self, text: &str) -> Paragraph {
        let id = make_paragraph_id(self.next_paragraph_id);
        self.next_paragraph_id += 1;
        Paragraph::with_text(id, text)
    }

    pub fn paragraphs(&self) -> &[Paragraph] {
        &self.paragraphs
    }

    pub fn paragraph(&self, index: usize) -> Option<&Paragraph> {
        self.paragraphs.get(index)
    }

    pub fn paragraph_mut(&mut self, index: usize) -> Option<&mut Paragraph> {
        self.paragraphs.get_mut(index)
    }

    pub fn paragraph_count(&self) -> usize {
        self.paragraphs.len()
    }

    /// True when there are no paragraphs at all.
    pub fn is_empty(&self) -> bool {
        self.paragraphs.is_empty()
    }

    pub fn insert_paragraph(&mut self, index: usize, paragraph: Paragraph) -> bool {
        if index > self.paragraphs.len() {
            return false;
        }
        self.paragraphs.insert(index, paragraph);
        true
    }

    pub fn push_paragraph(&mut self, paragraph: Paragraph) {
        self.paragraphs.push(paragraph);
    }

    pub fn remove_paragraph(&mut self, index: usize) -> Option<Paragraph> {
        (index < self.paragraphs.len()).then(|| self.paragraphs.remove(index))
    }

    /// Remove every paragraph and any orphan text.
    pub fn clear(&mut self) {
        self.paragraphs.clear();
        self.orphan = None;
    }

    pub fn orphan(&self) -> Option<&str> {
        self.orphan.as_deref()
    }

    pub fn set_orphan(&mut self, text: impl Into<SmolStr>) {
        self.orphan = Some(text.into());
    }

    pub fn take_orphan(&mut self) -> Option<SmolStr> {
        self.orphan.take()
    }

    pub fn selection(&self) -> Option<DomSelection> {
        self.selection
    }

    pub fn set_selection(&mut self, selection: Option<DomSelection>) {
        self.selection = selection;
    }

    /// Collapse the selection to `caret`.
    pub fn set_caret(&mut self, caret: Caret) {
        self.selection = Some(DomSelection::caret(caret));
    }

    /// The focus end of the selection.
    pub fn caret(&self) -> Option<Caret> {
        self.selection.map(|s| s.focus)
    }

    /// Full text: paragraphs joined by newline, NBSP shown as a space.
    pub fn plain_text(&self) -> String {
        if self.paragraphs.is_empty() {
            return self.orphan.as_deref().unwrap_or_default().replace(NBSP, " ");
        }
        let joined = self
            .paragraphs
            .iter()
            .map(Paragraph::text)
            .collect::<Vec<_>>()
            .join("\n");
        joined.replace(NBSP, " ")
    }

    /// Document length in chars, counting one char per paragraph break.
    pub fn char_len(&self) -> usize {
        let text: usize = self.paragraphs.iter().map(Paragraph::char_len).sum();
        text + self.paragraphs.len().saturating_sub(1)
    }

    /// Document-relative offset of a caret.
    pub fn linear_offset(&self, caret: &Caret) -> Option<usize> {
        let para = self.paragraphs.get(caret.paragraph)?;
        let before: usize = self.paragraphs[..caret.paragraph]
            .iter()
            .map(|p| p.char_len() + 1)
            .sum();
        Some(before + to_linear_offset(para, caret.point)?)
    }

    /// Caret at a document-relative offset. An offset on a paragraph break
    /// resolves to the end of the earlier paragraph.
    pub fn caret_at(&self, offset: usize) -> Option<Caret> {
        let mut base = 0;
        for (index, para) in self.paragraphs.iter().enumerate() {
            let len = para.char_len();
            if offset <= base + len {
                let point = to_structural_position(para, offset - base)?;
                return Some(Caret::new(index, point));
            }
            base += len + 1;
        }
        None
    }

    /// Linear form of the current selection.
    ///
    /// `None` when there is no selection or either end cannot be resolved;
    /// cursor notifications are skipped in that case.
    pub fn selection_range(&self) -> Option<Selection> {
        let sel = self.selection?;
        let anchor = self.linear_offset(&sel.anchor)?;
        let head = self.linear_offset(&sel.focus)?;
        Some(Selection::new(anchor, head))
    }
}
