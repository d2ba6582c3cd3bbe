//! Projection of the document onto HTML, plus a compact debug markup.
//!
//! The document tree is authoritative; HTML is produced from it on demand:
//!
//! ```html
//! <p id="p-0">see <span class="highlight" data-kind="url">a.io</span></p>
//! <p id="p-1"><br></p>
//! ```

use pulldown_cmark_escape::{StrWrite, escape_html, escape_html_body_text};

use crate::document::Document;
use crate::paragraph::Paragraph;
use crate::segment::Segment;

/// Write one paragraph as a `<p>` element.
pub fn render_paragraph<W: StrWrite>(w: &mut W, paragraph: &Paragraph) -> Result<(), W::Error> {
    w.write_str("<p id=\"")?;
    escape_html(&mut *w, paragraph.id())?;
    w.write_str("\">")?;
    for segment in paragraph.segments() {
        match segment {
            Segment::Plain(text) => escape_html_body_text(&mut *w, text)?,
            Segment::Highlighted(h) => {
                w.write_str("<span class=\"")?;
                w.write_str(h.tag())?;
                w.write_str("\" data-kind=\"")?;
                w.write_str(h.kind().as_str())?;
                w.write_str("\">")?;
                for part in h.parts() {
                    escape_html_body_text(&mut *w, part)?;
                }
                w.write_str("</span>")?;
            }
            Segment::Placeholder => w.write_str("<br>")?,
        }
    }
    w.write_str("</p>")
}

/// Write every paragraph, one per line. Orphan text is written bare.
pub fn render_document<W: StrWrite>(w: &mut W, document: &Document) -> Result<(), W::Error> {
    if document.is_empty() {
        if let Some(orphan) = document.orphan() {
            escape_html_body_text(&mut *w, orphan)?;
        }
        return Ok(());
    }
    for (i, paragraph) in document.paragraphs().iter().enumerate() {
        if i > 0 {
            w.write_str("\n")?;
        }
        render_paragraph(w, paragraph)?;
    }
    Ok(())
}

/// Render a document to an HTML string.
pub fn to_html(document: &Document) -> String {
    let mut out = String::new();
    // Writes into a String cannot fail.
    let _ = render_document(&mut out, document);
    out
}

/// Compact debug form of a paragraph: `plain<url:hello.com>`.
///
/// Highlight parts are separated by `|`, placeholders show as `<br>`.
pub fn markup(paragraph: &Paragraph) -> String {
    let mut out = String::new();
    for segment in paragraph.segments() {
        match segment {
            Segment::Plain(text) => out.push_str(text),
            Segment::Highlighted(h) => {
                out.push('<');
                out.push_str(h.kind().as_str());
                out.push(':');
                out.push_str(&h.parts().join("|"));
                out.push('>');
            }
            Segment::Placeholder => out.push_str("<br>"),
        }
    }
    out
}

/// [`markup`] for every paragraph, joined by newlines.
pub fn markup_document(document: &Document) -> String {
    if document.is_empty() {
        return document.orphan().unwrap_or_default().to_string();
    }
    document
        .paragraphs()
        .iter()
        .map(markup)
        .collect::<Vec<_>>()
        .join("\n")
}
