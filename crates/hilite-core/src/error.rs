//! Error types for pattern construction and edit handling.

use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum PatternError {
    #[error("TLD list contains no usable entries")]
    #[diagnostic(
        code(hilite::pattern::empty_tlds),
        help("the list must contain at least one top-level domain")
    )]
    EmptyTldList,

    #[error("failed to compile composite pattern")]
    #[diagnostic(code(hilite::pattern::compile))]
    Compile(#[source] Box<fancy_regex::Error>),

    #[error("pattern scan aborted")]
    #[diagnostic(
        code(hilite::pattern::scan_aborted),
        help("the text drove the matcher past its backtracking limit")
    )]
    ScanAborted(#[source] Box<fancy_regex::Error>),

    #[error("pattern source has {found} capture groups, expected {expected}")]
    #[diagnostic(
        code(hilite::pattern::group_count),
        help("a stored pattern must alternate exactly four capturing sub-patterns")
    )]
    GroupCount { expected: usize, found: usize },
}

impl From<fancy_regex::Error> for PatternError {
    fn from(err: fancy_regex::Error) -> Self {
        PatternError::Compile(Box::new(err))
    }
}

/// Reasons an edit event could not be re-highlighted.
///
/// These never escape the router as failures: the already-applied edit is
/// kept and the event is reported as skipped.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum EditError {
    #[error("no active selection")]
    #[diagnostic(code(hilite::edit::no_selection))]
    NoSelection,

    #[error("paragraph {0} does not exist")]
    #[diagnostic(code(hilite::edit::missing_paragraph))]
    MissingParagraph(usize),

    #[error("segment {segment} does not exist in paragraph {paragraph}")]
    #[diagnostic(code(hilite::edit::missing_segment))]
    MissingSegment { paragraph: usize, segment: usize },

    #[error("position cannot be resolved to a text offset")]
    #[diagnostic(code(hilite::edit::ambiguous_position))]
    AmbiguousPosition,

    #[error("pattern scan aborted, segments left as they were")]
    #[diagnostic(code(hilite::edit::scan_aborted))]
    ScanAborted,
}

impl EditError {
    /// Attach the paragraph index to an error raised by a paragraph-level
    /// operation, which only knows segment indices.
    pub fn in_paragraph(self, index: usize) -> Self {
        match self {
            Self::MissingSegment { segment, .. } => Self::MissingSegment {
                paragraph: index,
                segment,
            },
            other => other,
        }
    }
}

#[derive(Debug, Error, Diagnostic)]
pub enum StoreError {
    #[error("store I/O failed")]
    #[diagnostic(code(hilite::store::io))]
    Io(#[from] std::io::Error),

    #[error("store backend error: {0}")]
    #[diagnostic(code(hilite::store::backend))]
    Backend(String),
}
