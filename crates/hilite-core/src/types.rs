//! Core position types: structural points, carets and selections.
//!
//! A [`Point`] addresses a spot inside one paragraph's segment list; a
//! [`Caret`] adds the paragraph index. [`Selection`] is the linear
//! (document-relative) form that external consumers see.

use std::ops::Range;

/// A structural position inside a paragraph.
#[derive(Clone, Debug, Copy, PartialEq, Eq, Hash)]
pub enum Point {
    /// Char offset inside a text node. `part` selects the text child of a
    /// highlighted segment and is always 0 for plain segments.
    Text {
        segment: usize,
        part: usize,
        offset: usize,
    },
    /// Between children of the paragraph element itself, before child `index`.
    Child { index: usize },
}

impl Point {
    /// Offset inside the first text node of `segment`.
    pub fn text(segment: usize, offset: usize) -> Self {
        Self::Text {
            segment,
            part: 0,
            offset,
        }
    }

    /// Segment index this point refers to, if it is inside a text node.
    pub fn segment(&self) -> Option<usize> {
        match self {
            Self::Text { segment, .. } => Some(*segment),
            Self::Child { .. } => None,
        }
    }
}

/// Paragraph index plus a structural point.
#[derive(Clone, Debug, Copy, PartialEq, Eq, Hash)]
pub struct Caret {
    pub paragraph: usize,
    pub point: Point,
}

impl Caret {
    pub fn new(paragraph: usize, point: Point) -> Self {
        Self { paragraph, point }
    }
}

/// Structural selection, as an editable surface reports it.
#[derive(Clone, Debug, Copy, PartialEq, Eq)]
pub struct DomSelection {
    pub anchor: Caret,
    pub focus: Caret,
}

impl DomSelection {
    pub fn new(anchor: Caret, focus: Caret) -> Self {
        Self { anchor, focus }
    }

    /// Collapsed selection at `caret`.
    pub fn caret(caret: Caret) -> Self {
        Self {
            anchor: caret,
            focus: caret,
        }
    }

    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.focus
    }
}

/// Linear selection in document chars, as carried by `CursorChanged`.
///
/// `anchor` is where the drag began and `head` where the caret sits, so
/// `head` may come first.
#[derive(Clone, Debug, Copy, PartialEq, Eq)]
pub struct Selection {
    pub anchor: usize,
    pub head: usize,
}

impl Selection {
    pub fn new(anchor: usize, head: usize) -> Self {
        Self { anchor, head }
    }

    /// A bare caret at `offset`.
    pub fn collapsed(offset: usize) -> Self {
        Self::new(offset, offset)
    }

    pub fn start(&self) -> usize {
        self.anchor.min(self.head)
    }

    pub fn end(&self) -> usize {
        self.anchor.max(self.head)
    }

    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.head
    }

    /// Selected chars, in document order.
    pub fn to_range(&self) -> Range<usize> {
        self.start()..self.end()
    }
}
