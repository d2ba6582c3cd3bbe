//! hilite-core: incremental lexical highlighting over an owned paragraph tree.
//!
//! This crate provides:
//! - `CompositePattern` - the URL/hashtag/mention/cashtag matcher and its builder
//! - `Document`/`Paragraph`/`Segment` - the segment tree the editing surface projects
//! - offset mapping between linear offsets and structural positions
//! - full and local paragraph reformatting
//! - the before/after input router, a default-editing surface model and an
//!   `Editor` facade with debounced document notifications

pub mod document;
pub mod editor;
pub mod error;
pub mod host;
pub mod input;
pub mod notify;
pub mod offset_map;
pub mod paragraph;
pub mod pattern;
pub mod reformat;
pub mod render;
pub mod segment;
pub mod store;
pub mod text_helpers;
pub mod types;

pub use document::Document;
pub use editor::{EditOutcome, Editor};
pub use error::{EditError, PatternError, StoreError};
pub use host::apply_default;
pub use input::{
    BeforeInputContext, BeforeInputResult, InputContext, InputOutcome, InputType, Key,
    handle_beforeinput, handle_input, parse_input_type,
};
pub use notify::{DEFAULT_DEBOUNCE, DocumentEvent, Notifier};
pub use offset_map::{locate_from, to_linear_offset, to_structural_position};
pub use paragraph::{Paragraph, hash_source, make_paragraph_id};
pub use pattern::{
    CompositePattern, GROUP_COUNT, HighlightKind, LexMatch, TldList, build_pattern,
    match_index_offset,
};
pub use reformat::{format, reformat_document, reformat_local, reformat_paragraph};
pub use render::{markup, markup_document, render_document, render_paragraph, to_html};
pub use segment::{HIGHLIGHT_TAG, Highlight, NBSP, Segment};
pub use smol_str::SmolStr;
pub use store::{KeyValueStore, MemoryStore, PATTERN_KEY, load_pattern, save_pattern};
pub use types::{Caret, DomSelection, Point, Selection};
