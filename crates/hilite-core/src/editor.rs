//! Editor facade: one document, the router, the surface model and the
//! notification queue wired together.

use std::time::Duration;

use web_time::Instant;

use crate::document::Document;
use crate::host::apply_default;
use crate::input::{
    BeforeInputContext, BeforeInputResult, InputContext, InputOutcome, InputType, Key,
    handle_beforeinput, handle_input,
};
use crate::notify::{DocumentEvent, Notifier};
use crate::paragraph::hash_source;
use crate::pattern::CompositePattern;
use crate::types::{DomSelection, Selection};

/// What happened to one input event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOutcome {
    /// The pre-edit hook took the event over; no default action ran.
    Intercepted,
    /// The default action ran, followed by post-edit dispatch.
    Processed(InputOutcome),
}

#[derive(Debug, Clone, Default)]
pub struct Editor {
    document: Document,
    notifier: Notifier,
    last_text_hash: Option<u64>,
    last_selection: Option<Selection>,
}

impl Editor {
    pub fn new(debounce: Duration) -> Self {
        Self {
            notifier: Notifier::new(debounce),
            ..Self::default()
        }
    }

    /// Editor over an existing document. Its current text counts as seen.
    pub fn with_document(document: Document, debounce: Duration) -> Self {
        let last_text_hash = Some(hash_source(&document.plain_text()));
        Self {
            last_selection: document.selection_range(),
            document,
            notifier: Notifier::new(debounce),
            last_text_hash,
        }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn into_document(self) -> Document {
        self.document
    }

    /// Run one input event through before-input, the default action and
    /// after-input, then queue notifications.
    pub fn input(&mut self, ctx: BeforeInputContext, pattern: &CompositePattern) -> EditOutcome {
        let outcome = match handle_beforeinput(&mut self.document, &ctx) {
            BeforeInputResult::Handled => EditOutcome::Intercepted,
            BeforeInputResult::PassThrough => {
                apply_default(&mut self.document, &ctx);
                let after = InputContext::from(&ctx);
                EditOutcome::Processed(handle_input(&mut self.document, &after, pattern))
            }
        };
        self.queue_events(Instant::now());
        outcome
    }

    /// Type text one char at a time; `\n` presses Enter.
    pub fn type_text(&mut self, text: &str, pattern: &CompositePattern) {
        for c in text.chars() {
            if c == '\n' {
                self.press_enter(pattern);
            } else {
                let data = c.to_string();
                let ctx = BeforeInputContext::new(InputType::InsertText)
                    .with_key(Key::character(data.as_str()))
                    .with_data(data);
                self.input(ctx, pattern);
            }
        }
    }

    pub fn press_enter(&mut self, pattern: &CompositePattern) -> EditOutcome {
        let ctx = BeforeInputContext::new(InputType::InsertParagraph).with_key(Key::Enter);
        self.input(ctx, pattern)
    }

    pub fn backspace(&mut self, pattern: &CompositePattern) -> EditOutcome {
        let ctx = BeforeInputContext::new(InputType::DeleteContentBackward).with_key(Key::Backspace);
        self.input(ctx, pattern)
    }

    pub fn delete_forward(&mut self, pattern: &CompositePattern) -> EditOutcome {
        let ctx = BeforeInputContext::new(InputType::DeleteContentForward).with_key(Key::Delete);
        self.input(ctx, pattern)
    }

    pub fn paste(&mut self, text: &str, pattern: &CompositePattern) -> EditOutcome {
        let ctx = BeforeInputContext::new(InputType::InsertFromPaste).with_data(text);
        self.input(ctx, pattern)
    }

    /// Select the whole document. No-op when it is empty.
    pub fn select_all(&mut self) {
        let end = self.document.char_len();
        if let (Some(anchor), Some(focus)) = (self.document.caret_at(0), self.document.caret_at(end))
        {
            self.document
                .set_selection(Some(DomSelection::new(anchor, focus)));
            self.queue_events(Instant::now());
        }
    }

    /// Move the caret to a document-relative offset.
    pub fn set_caret(&mut self, offset: usize) -> bool {
        let Some(caret) = self.document.caret_at(offset) else {
            return false;
        };
        self.document.set_caret(caret);
        self.queue_events(Instant::now());
        true
    }

    /// Select a document-relative range.
    pub fn set_selection(&mut self, anchor: usize, head: usize) -> bool {
        let (Some(a), Some(h)) = (self.document.caret_at(anchor), self.document.caret_at(head))
        else {
            return false;
        };
        self.document.set_selection(Some(DomSelection::new(a, h)));
        self.queue_events(Instant::now());
        true
    }

    /// Release notifications whose debounce interval has passed.
    pub fn poll_events(&mut self) -> Vec<DocumentEvent> {
        self.notifier.poll(Instant::now())
    }

    /// Release all pending notifications now.
    pub fn flush_events(&mut self) -> Vec<DocumentEvent> {
        self.notifier.flush()
    }

    fn queue_events(&mut self, now: Instant) {
        let text = self.document.plain_text();
        let hash = hash_source(&text);
        if self.last_text_hash != Some(hash) {
            self.last_text_hash = Some(hash);
            self.notifier.queue(DocumentEvent::TextUpdated(text), now);
        }

        // An unresolvable selection skips the cursor notification.
        let selection = self.document.selection_range();
        if let Some(sel) = selection {
            if self.last_selection != selection {
                self.notifier.queue(
                    DocumentEvent::CursorChanged {
                        start: sel.start(),
                        end: sel.end(),
                    },
                    now,
                );
            }
        }
        self.last_selection = selection;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::HighlightKind;
    use crate::render::markup_document;
    use crate::segment::Segment;
    use crate::types::{Caret, Point};
    use insta::assert_snapshot;

    fn typed(text: &str) -> Editor {
        let mut editor = Editor::default();
        editor.type_text(text, &CompositePattern::builtin());
        editor
    }

    #[test]
    fn test_typing_cashtag() {
        let editor = typed("Hello $google");
        assert_snapshot!(markup_document(editor.document()), @"Hello <cashtag:$google>");
    }

    #[test]
    fn test_typing_cashtag_with_long_suffix() {
        let editor = typed("Hello $google_inc");
        let para = editor.document().paragraph(0).unwrap();
        assert_eq!(
            para.segments(),
            &[
                Segment::plain("Hello "),
                Segment::highlighted(HighlightKind::Cashtag, "$google"),
                Segment::plain("_inc"),
            ]
        );
    }

    #[test]
    fn test_cashtags_do_not_chain() {
        let editor = typed("$AMZN$GOOGLE");
        assert_snapshot!(markup_document(editor.document()), @"<cashtag:$AMZN>$GOOGLE");
    }

    #[test]
    fn test_url_highlight_removed_by_backspace() {
        let pattern = CompositePattern::builtin();
        let mut editor = typed("hello.com");
        assert_snapshot!(markup_document(editor.document()), @"<url:hello.com>");

        for _ in 0..3 {
            editor.backspace(&pattern);
        }
        let para = editor.document().paragraph(0).unwrap();
        assert_eq!(para.segments(), &[Segment::plain("hello.")]);
        assert_eq!(editor.document().caret(), Some(Caret::new(0, Point::text(0, 6))));
    }

    #[test]
    fn test_double_protocol_not_highlighted() {
        let editor = typed("https://google.comhttps://twitter.com");
        let para = editor.document().paragraph(0).unwrap();
        assert_eq!(
            para.segments(),
            &[Segment::plain("https://google.comhttps://twitter.com")]
        );
    }

    #[test]
    fn test_enter_then_backspace_in_empty_editor() {
        let pattern = CompositePattern::builtin();
        let mut editor = Editor::default();

        assert_eq!(editor.press_enter(&pattern), EditOutcome::Intercepted);
        let doc = editor.document();
        assert_eq!(doc.paragraph_count(), 2);
        assert!(doc.paragraphs().iter().all(|p| p.segments() == [Segment::Placeholder]));
        assert_eq!(doc.caret(), Some(Caret::new(1, Point::text(0, 0))));

        assert_eq!(
            editor.backspace(&pattern),
            EditOutcome::Processed(InputOutcome::Cleared)
        );
        assert!(editor.document().is_empty());
    }

    #[test]
    fn test_space_after_hashtag_keeps_highlight() {
        let editor = typed("#rust is");
        assert_eq!(
            markup_document(editor.document()),
            "<hashtag:#rust>\u{a0}is"
        );
        assert_eq!(editor.document().plain_text(), "#rust is");
    }

    #[test]
    fn test_typing_into_middle_of_paragraph() {
        let pattern = CompositePattern::builtin();
        let mut editor = typed("say hi");
        assert!(editor.set_caret(4));
        editor.type_text("@", &pattern);
        assert_snapshot!(markup_document(editor.document()), @"say <mention:@hi>");
    }

    #[test]
    fn test_enter_splits_and_rehighlights() {
        let pattern = CompositePattern::builtin();
        let mut editor = typed("#abc def");
        assert!(editor.set_caret(2));
        editor.press_enter(&pattern);
        assert_eq!(
            markup_document(editor.document()),
            "<hashtag:#a>\nbc\u{a0}def"
        );
        assert_eq!(
            editor.document().caret(),
            Some(Caret::new(1, Point::text(0, 0)))
        );
    }

    #[test]
    fn test_join_by_backspace_rehighlights() {
        let pattern = CompositePattern::builtin();
        let mut editor = typed("hello\n.com");
        assert_eq!(markup_document(editor.document()), "hello\n.com");
        assert!(editor.set_caret(6));
        editor.backspace(&pattern);
        assert_eq!(markup_document(editor.document()), "<url:hello.com>");
    }

    #[test]
    fn test_multiline_paste() {
        let pattern = CompositePattern::builtin();
        let mut editor = typed("x ");
        editor.paste("#a\nb.io @c", &pattern);
        assert_eq!(
            markup_document(editor.document()),
            "x <hashtag:#a>\n<url:b.io> <mention:@c>"
        );
        assert_eq!(editor.document().selection_range(), Some(Selection::collapsed(12)));
    }

    #[test]
    fn test_paste_into_empty_editor() {
        let pattern = CompositePattern::builtin();
        let mut editor = Editor::default();
        let outcome = editor.paste("see a.io", &pattern);
        assert!(matches!(
            outcome,
            EditOutcome::Processed(InputOutcome::Relocated { .. })
        ));
        assert_eq!(markup_document(editor.document()), "see <url:a.io>");
        assert_eq!(editor.document().selection_range(), Some(Selection::collapsed(8)));
    }

    #[test]
    fn test_select_all_then_type() {
        let pattern = CompositePattern::builtin();
        let mut editor = typed("#one\n#two");
        editor.select_all();
        editor.type_text("$x", &pattern);
        assert_eq!(markup_document(editor.document()), "<cashtag:$x>");
    }

    #[test]
    fn test_notifications_are_batched() {
        let pattern = CompositePattern::builtin();
        let mut editor = Editor::new(Duration::from_secs(60));
        editor.type_text("ab", &pattern);
        assert!(editor.poll_events().is_empty());
        assert_eq!(
            editor.flush_events(),
            vec![
                DocumentEvent::TextUpdated("ab".into()),
                DocumentEvent::CursorChanged { start: 2, end: 2 },
            ]
        );

        // Moving the caret does not resend the text.
        editor.set_caret(0);
        assert_eq!(
            editor.flush_events(),
            vec![DocumentEvent::CursorChanged { start: 0, end: 0 }]
        );
    }

    #[test]
    fn test_cleared_document_reports_empty_text() {
        let pattern = CompositePattern::builtin();
        let mut editor = Editor::new(Duration::ZERO);
        editor.type_text("a", &pattern);
        editor.flush_events();
        editor.backspace(&pattern);
        assert_eq!(
            editor.flush_events(),
            vec![DocumentEvent::TextUpdated(String::new())]
        );
    }
}
