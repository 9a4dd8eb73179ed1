//! The tree walker: turns one unit's elements into paragraphs and runs.
//!
//! Elements are visited depth-first in document order. Each one is
//! classified once into an [`ElementCategory`]; block-like categories open a
//! paragraph, inline ones add to the paragraph already open, and table
//! structure other than cells adds nothing of its own.

use super::blocks::Blocks;
use super::images::ImageEmbedder;
use super::paragraph::TextOptions;
use super::run::BreakClear;
use super::styles::StyleRegistry;
use crate::dom::{ArenaDom, NodeId, TagKind};
use crate::error::Result;
use crate::style::{ComputedStyle, Display, Float, PageBreak, StyleResolver};

/// How an element takes part in paragraph construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementCategory {
    /// Non-content tags and hidden elements. Neither the element, its
    /// children nor its trailing text produce output.
    Ignorable,
    /// `<br>`, whatever its display.
    LineBreak,
    /// Text-level elements, including inline images.
    Inline,
    /// An image floated left or right. Flows with the open paragraph.
    FloatingImage,
    Block,
    /// Starts a paragraph like a block. No list marker is generated.
    ListItem,
    /// Starts a paragraph like a block.
    TableCell,
    /// Tables, rows, row groups, columns and captions: no paragraph of
    /// their own, children are still visited.
    OtherTable,
}

impl ElementCategory {
    pub fn classify(tag: TagKind, style: &ComputedStyle) -> Self {
        if tag == TagKind::NonContent || style.is_hidden() {
            return ElementCategory::Ignorable;
        }
        if tag == TagKind::LineBreak {
            return ElementCategory::LineBreak;
        }
        match style.display {
            Display::Inline | Display::InlineBlock => ElementCategory::Inline,
            Display::ListItem => ElementCategory::ListItem,
            Display::TableCell => ElementCategory::TableCell,
            d if d.is_table_part() => ElementCategory::OtherTable,
            _ if tag == TagKind::Image && style.float != Float::None => {
                ElementCategory::FloatingImage
            }
            _ => ElementCategory::Block,
        }
    }

    /// Categories whose trailing text continues the open paragraph.
    pub fn is_inline(self) -> bool {
        matches!(
            self,
            ElementCategory::LineBreak | ElementCategory::Inline | ElementCategory::FloatingImage
        )
    }

    fn opens_paragraph(self) -> bool {
        matches!(
            self,
            ElementCategory::Block | ElementCategory::ListItem | ElementCategory::TableCell
        )
    }
}

/// Walks one unit, adding to a shared [`Blocks`] sequence.
pub struct Walker<'a, S: ?Sized, R, I: ?Sized> {
    dom: &'a ArenaDom,
    styles: &'a mut S,
    registry: &'a mut R,
    images: &'a mut I,
    blocks: &'a mut Blocks,
}

impl<'a, S, R, I> Walker<'a, S, R, I>
where
    S: StyleResolver + ?Sized,
    R: StyleRegistry,
    I: ImageEmbedder + ?Sized,
{
    pub fn new(
        dom: &'a ArenaDom,
        styles: &'a mut S,
        registry: &'a mut R,
        images: &'a mut I,
        blocks: &'a mut Blocks,
    ) -> Self {
        Self {
            dom,
            styles,
            registry,
            images,
            blocks,
        }
    }

    /// Convert the subtree at `root` as one unit scope.
    ///
    /// `is_first` suppresses the root's own trailing text. The scope is
    /// closed even when styling fails, so the sequence stays well formed;
    /// the error is still returned.
    pub fn convert_root(&mut self, root: NodeId, is_first: bool) -> Result<()> {
        let mark = self.blocks.begin_unit();
        let result = self.process_tag(root, is_first);
        self.blocks.end_unit(mark);
        result
    }

    fn process_tag(&mut self, node: NodeId, is_first: bool) -> Result<()> {
        let Some(name) = self.dom.element_name(node) else {
            return Ok(());
        };
        let tag = TagKind::of(name);
        if tag == TagKind::NonContent {
            return Ok(());
        }

        let style = self.styles.style(node)?;
        let category = ElementCategory::classify(tag, &style);
        match category {
            ElementCategory::Ignorable => return Ok(()),
            ElementCategory::OtherTable => {}
            c if c.is_inline() => {
                if self.blocks.has_current() {
                    self.add_inline_tag(node, tag, &style)?;
                }
            }
            _ => self.add_block_tag(node, tag, &style)?,
        }

        let children: Vec<NodeId> = self.dom.element_children(node).collect();
        for child in children {
            self.process_tag(child, false)?;
        }

        if !is_first {
            self.add_trailing_text(node, category)?;
        }
        Ok(())
    }

    fn add_block_tag(&mut self, node: NodeId, tag: TagKind, style: &ComputedStyle) -> Result<()> {
        let paragraph = self
            .blocks
            .start_new_paragraph(&mut *self.registry, node, style);

        if tag == TagKind::Image {
            self.images
                .add_image(self.dom, &mut *self.registry, node, style, paragraph)?;
        } else if let Some(text) = self.dom.leading_text(node) {
            paragraph.add_text(
                &mut *self.registry,
                &text,
                style,
                TextOptions::block_leading(),
            );
        }

        if style.page_break_after == PageBreak::Avoid {
            paragraph.keep_next = true;
        }
        Ok(())
    }

    fn add_inline_tag(&mut self, node: NodeId, tag: TagKind, style: &ComputedStyle) -> Result<()> {
        let Some(paragraph) = self.blocks.current_mut() else {
            return Ok(());
        };

        match tag {
            TagKind::LineBreak => {
                if self.dom.trailing_text(node).is_some() || !self.dom.is_last_element_child(node)
                {
                    paragraph.add_break(&mut *self.registry, BreakClear::from(style.clear));
                }
            }
            TagKind::Image => {
                self.images
                    .add_image(self.dom, &mut *self.registry, node, style, paragraph)?;
            }
            _ => {
                if let Some(text) = self.dom.leading_text(node) {
                    paragraph.add_text(
                        &mut *self.registry,
                        &text,
                        style,
                        TextOptions::inline(node),
                    );
                }
            }
        }
        Ok(())
    }

    /// Text between the end of `node` and its next sibling element, styled
    /// by the parent.
    fn add_trailing_text(&mut self, node: NodeId, category: ElementCategory) -> Result<()> {
        let Some(tail) = self.dom.trailing_text(node) else {
            return Ok(());
        };
        let Some(parent) = self.dom.parent(node).filter(|&p| self.dom.is_element(p)) else {
            return Ok(());
        };

        if category.is_inline() {
            if self.blocks.has_current() {
                let parent_style = self.styles.style(parent)?;
                if let Some(paragraph) = self.blocks.current_mut() {
                    paragraph.add_text(
                        &mut *self.registry,
                        &tail,
                        &parent_style,
                        TextOptions::default(),
                    );
                }
            }
        } else if !tail.trim().is_empty() {
            debug_assert!(category.opens_paragraph() || category == ElementCategory::OtherTable);
            let parent_style = self.styles.style(parent)?;
            let paragraph = self
                .blocks
                .start_new_paragraph(&mut *self.registry, parent, &parent_style);
            paragraph.add_text(
                &mut *self.registry,
                &tail,
                &parent_style,
                TextOptions::default(),
            );
        }
        Ok(())
    }
}
