//! Whole-document conversion: units in reading order into one paragraph
//! sequence, plus the parts written from it.

use std::path::Path;

use super::blocks::Blocks;
use super::convert::Walker;
use super::images::ImagesManager;
use super::paragraph::Paragraph;
use super::serialize::document_xml;
use super::styles::StylesManager;
use crate::dom::parse_html;
use crate::error::Result;
use crate::options::ConvertOptions;
use crate::source::{SourceDocument, SpineItem};
use crate::style::{Origin, Stylesheet, Stylizer, document_stylesheets, user_agent_stylesheet};
use crate::util::{decode_markup, resolve_href};

/// Drives the walker over each unit of a [`SourceDocument`].
///
/// Styles and images are shared by all units so equal styles and repeated
/// pictures are stored once.
pub struct Converter<'s> {
    source: &'s SourceDocument,
    options: ConvertOptions,
    user_agent: Stylesheet,
    extra: Vec<Stylesheet>,
    styles: StylesManager,
    images: ImagesManager,
    blocks: Blocks,
}

impl<'s> Converter<'s> {
    pub fn new(source: &'s SourceDocument, options: ConvertOptions) -> Self {
        let extra = options
            .stylesheets
            .iter()
            .map(|css| Stylesheet::parse(css))
            .collect();
        let images = ImagesManager::new().with_max_width(Some(options.effective_max_image_width()));
        Self {
            source,
            options,
            user_agent: user_agent_stylesheet(),
            extra,
            styles: StylesManager::new(),
            images,
            blocks: Blocks::new(),
        }
    }

    /// Convert every unit of the source, in spine order.
    pub fn convert_all(&mut self) -> Result<()> {
        let source = self.source;
        for item in source.spine() {
            self.convert_unit(item)?;
        }
        Ok(())
    }

    /// Append one unit to the sequence.
    ///
    /// Each `<body>` is its own scope: its first paragraph starts a new page
    /// unless it is the first content of the document.
    pub fn convert_unit(&mut self, item: &SpineItem) -> Result<()> {
        let html = decode_markup(&item.data);
        let dom = parse_html(&html);

        let source = self.source;
        let linked = document_stylesheets(&dom, |href| {
            resolve_href(&item.href, href).and_then(|resolved| source.resource_text(&resolved))
        });

        let mut sheets = vec![(&self.user_agent, Origin::UserAgent)];
        sheets.extend(linked.iter().map(|s| (s, Origin::Author)));
        sheets.extend(self.extra.iter().map(|s| (s, Origin::Author)));
        let mut stylizer =
            Stylizer::new(&dom, sheets).with_base_font_size(self.options.base_font_size);
        let mut images = self.images.for_unit(source, &item.href);

        let before = self.blocks.paragraphs().len();
        let mut walker = Walker::new(
            &dom,
            &mut stylizer,
            &mut self.styles,
            &mut images,
            &mut self.blocks,
        );
        for (i, body) in dom.find_all_by_tag("body").into_iter().enumerate() {
            walker.convert_root(body, i == 0)?;
        }

        log::debug!(
            "Converted {} into {} paragraphs",
            item.href,
            self.blocks.paragraphs().len().saturating_sub(before)
        );
        Ok(())
    }

    /// Finalize the sequence and name the styles it uses.
    pub fn finish(self) -> DocxDocument {
        let paragraphs = self.blocks.into_paragraphs();
        let mut styles = self.styles;
        styles.finalize(&paragraphs);
        DocxDocument {
            paragraphs,
            styles,
            images: self.images,
            options: self.options,
        }
    }
}

/// A converted document.
#[derive(Debug)]
pub struct DocxDocument {
    paragraphs: Vec<Paragraph>,
    styles: StylesManager,
    images: ImagesManager,
    options: ConvertOptions,
}

impl DocxDocument {
    /// Paragraphs in document order.
    pub fn paragraphs(&self) -> &[Paragraph] {
        &self.paragraphs
    }

    pub fn styles(&self) -> &StylesManager {
        &self.styles
    }

    pub fn images(&self) -> &ImagesManager {
        &self.images
    }

    pub fn document_xml(&self) -> String {
        document_xml(&self.paragraphs, &self.styles, &self.options.page)
    }

    pub fn styles_xml(&self) -> String {
        self.styles.to_xml(self.options.base_font_size)
    }

    pub fn rels_xml(&self) -> String {
        self.images.rels_xml()
    }

    /// Write `word/document.xml`, `word/styles.xml`,
    /// `word/_rels/document.xml.rels` and `word/media/*` under `dir`.
    pub fn write_parts(&self, dir: impl AsRef<Path>) -> Result<()> {
        let word = dir.as_ref().join("word");
        std::fs::create_dir_all(word.join("_rels"))?;
        std::fs::write(word.join("document.xml"), self.document_xml())?;
        std::fs::write(word.join("styles.xml"), self.styles_xml())?;
        std::fs::write(word.join("_rels").join("document.xml.rels"), self.rels_xml())?;
        self.images.write_media(&word)?;
        log::debug!(
            "Wrote {} paragraphs and {} images to {}",
            self.paragraphs.len(),
            self.images.images().len(),
            word.display()
        );
        Ok(())
    }
}
