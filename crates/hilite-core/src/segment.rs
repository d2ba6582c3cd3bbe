//! Segments: the runs of text a paragraph is made of.

use std::borrow::Cow;

use smol_str::SmolStr;

use crate::pattern::HighlightKind;
use crate::text_helpers::char_len;

/// Display tag carried by every highlighted segment.
pub const HIGHLIGHT_TAG: &str = "highlight";

/// Non-breaking space, inserted after a highlight instead of a plain space.
pub const NBSP: char = '\u{a0}';

/// A highlighted run: one lexical category over one or more text children.
///
/// The first part is the text the pattern matched. Further parts only appear
/// when the editing surface puts extra text nodes inside the wrapper (typing
/// at its end, a decorative marker); the reformatter folds them back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Highlight {
    kind: HighlightKind,
    parts: Vec<SmolStr>,
}

impl Highlight {
    pub fn new(kind: HighlightKind, text: impl Into<SmolStr>) -> Self {
        Self {
            kind,
            parts: vec![text.into()],
        }
    }

    /// Highlight built from several text children.
    pub fn with_parts(kind: HighlightKind, parts: Vec<SmolStr>) -> Self {
        Self { kind, parts }
    }

    pub fn kind(&self) -> HighlightKind {
        self.kind
    }

    pub fn tag(&self) -> &'static str {
        HIGHLIGHT_TAG
    }

    pub fn parts(&self) -> &[SmolStr] {
        &self.parts
    }

    pub(crate) fn parts_mut(&mut self) -> &mut Vec<SmolStr> {
        &mut self.parts
    }

    /// Concatenated text of all parts.
    pub fn text(&self) -> Cow<'_, str> {
        match self.parts.as_slice() {
            [only] => Cow::Borrowed(only.as_str()),
            parts => Cow::Owned(parts.concat()),
        }
    }

    pub fn char_len(&self) -> usize {
        self.parts.iter().map(|p| char_len(p)).sum()
    }
}

/// One run of a paragraph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Untagged text.
    Plain(SmolStr),
    /// Text matched by the composite pattern when it was last formatted.
    Highlighted(Highlight),
    /// Zero-width line-break placeholder keeping an empty paragraph visible.
    Placeholder,
}

impl Segment {
    pub fn plain(text: impl Into<SmolStr>) -> Self {
        Self::Plain(text.into())
    }

    pub fn highlighted(kind: HighlightKind, text: impl Into<SmolStr>) -> Self {
        Self::Highlighted(Highlight::new(kind, text))
    }

    pub fn text(&self) -> Cow<'_, str> {
        match self {
            Self::Plain(text) => Cow::Borrowed(text.as_str()),
            Self::Highlighted(h) => h.text(),
            Self::Placeholder => Cow::Borrowed(""),
        }
    }

    pub fn char_len(&self) -> usize {
        match self {
            Self::Plain(text) => char_len(text),
            Self::Highlighted(h) => h.char_len(),
            Self::Placeholder => 0,
        }
    }

    /// True for placeholders and text segments without characters.
    pub fn is_empty(&self) -> bool {
        self.char_len() == 0
    }

    pub fn is_plain(&self) -> bool {
        matches!(self, Self::Plain(_))
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, Self::Placeholder)
    }

    pub fn highlight(&self) -> Option<&Highlight> {
        match self {
            Self::Highlighted(h) => Some(h),
            _ => None,
        }
    }

    /// Length in chars of text node `part`, if it exists.
    pub fn part_len(&self, part: usize) -> Option<usize> {
        match self {
            Self::Plain(text) if part == 0 => Some(char_len(text)),
            Self::Placeholder if part == 0 => Some(0),
            Self::Highlighted(h) => h.parts().get(part).map(|p| char_len(p)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_lengths() {
        assert_eq!(Segment::plain("héllo").char_len(), 5);
        assert_eq!(Segment::Placeholder.char_len(), 0);
        assert!(Segment::Placeholder.is_empty());

        let h = Highlight::with_parts(HighlightKind::Url, vec!["a.io".into(), "\u{a0}".into()]);
        assert_eq!(h.char_len(), 5);
        assert_eq!(h.text(), "a.io\u{a0}");
        assert_eq!(h.tag(), "highlight");
    }

    #[test]
    fn test_part_len() {
        let seg = Segment::Highlighted(Highlight::with_parts(
            HighlightKind::Hashtag,
            vec!["#a".into(), "bc".into()],
        ));
        assert_eq!(seg.part_len(0), Some(2));
        assert_eq!(seg.part_len(1), Some(2));
        assert_eq!(seg.part_len(2), None);
        assert_eq!(Segment::plain("x").part_len(1), None);
    }
}
