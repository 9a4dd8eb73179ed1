//! # docxflow
//!
//! Converts styled HTML documents into the WordprocessingML paragraph model
//! used by `.docx` files.
//!
//! Each input unit (an HTML file) is parsed with html5ever, styled with a
//! CSS cascade and walked in document order. Block elements start
//! paragraphs, inline elements add runs of text, breaks and pictures to the
//! paragraph already open. Every unit after the first starts on a new page.
//!
//! ## Quick Start
//!
//! ```
//! use docxflow::{ConvertOptions, SourceDocument, Token, convert};
//!
//! let mut source = SourceDocument::new();
//! source.add_unit("chapter1.html", "<h1>Title</h1><p>Hello <b>world</b></p>");
//!
//! let doc = convert(&source, &ConvertOptions::default()).unwrap();
//! assert_eq!(doc.paragraphs().len(), 2);
//! assert!(doc.paragraphs()[0].keep_next);
//!
//! let runs = doc.paragraphs()[1].runs();
//! assert!(matches!(&runs[1].tokens()[0], Token::Text { text, .. } if text == "world"));
//! assert!(doc.document_xml().contains("<w:t>world</w:t>"));
//! ```
//!
//! ## Pieces
//!
//! The walker talks to its collaborators through traits, so each can be
//! replaced:
//!
//! - [`StyleResolver`]: computed style of an element ([`Stylizer`])
//! - [`StyleRegistry`]: interned character and paragraph styles
//!   ([`StylesManager`])
//! - [`ImageEmbedder`]: pictures ([`ImagesManager`])

pub mod docx;
pub mod dom;
pub mod error;
pub mod options;
pub mod source;
pub mod style;
pub mod util;

use std::time::Instant;

pub use docx::{
    BreakClear, Converter, DocxDocument, Drawing, ImageEmbedder, ImagesManager, Paragraph, Run,
    StyleRegistry, StylesManager, Token,
};
pub use error::{Error, Result};
pub use options::{ConvertOptions, PageSetup};
pub use source::{SourceDocument, SpineItem};
pub use style::{ComputedStyle, StyleResolver, Stylizer};
pub use util::resolve_href;

/// Convert every unit of `source`, in reading order.
pub fn convert(source: &SourceDocument, options: &ConvertOptions) -> Result<DocxDocument> {
    let start = Instant::now();
    let mut converter = Converter::new(source, options.clone());
    converter.convert_all()?;
    let doc = converter.finish();
    log::info!(
        "Converted {} units into {} paragraphs in {:.1?}",
        source.spine().len(),
        doc.paragraphs().len(),
        start.elapsed()
    );
    Ok(doc)
}
