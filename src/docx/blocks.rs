//! The document's paragraph sequence.

use super::paragraph::Paragraph;
use super::styles::StyleRegistry;
use crate::dom::NodeId;
use crate::style::ComputedStyle;

/// Finalized paragraphs plus at most one paragraph under construction.
#[derive(Debug, Default)]
pub struct Blocks {
    all: Vec<Paragraph>,
    current: Option<Paragraph>,
}

/// Position saved by [`Blocks::begin_unit`].
#[derive(Debug)]
#[must_use = "a unit must be closed with Blocks::end_unit"]
pub struct UnitMark {
    pos: usize,
}

impl Blocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Finalize the open paragraph, if any, and open a new one.
    pub fn start_new_paragraph<R: StyleRegistry + ?Sized>(
        &mut self,
        registry: &mut R,
        node: NodeId,
        style: &ComputedStyle,
    ) -> &mut Paragraph {
        self.finalize_current();
        self.current.insert(Paragraph::new(registry, node, style))
    }

    /// The paragraph under construction.
    pub fn current_mut(&mut self) -> Option<&mut Paragraph> {
        self.current.as_mut()
    }

    pub fn has_current(&self) -> bool {
        self.current.is_some()
    }

    /// Start a unit. Every unit must be closed with [`Blocks::end_unit`].
    pub fn begin_unit(&mut self) -> UnitMark {
        UnitMark {
            pos: self.all.len(),
        }
    }

    /// Close a unit.
    ///
    /// The open paragraph is finalized. If the unit's first paragraph is
    /// empty it is dropped: it belongs to a wrapper element with no text of
    /// its own before its first block child. If the unit is not the first
    /// and kept at least one paragraph, its first paragraph starts a new
    /// page.
    pub fn end_unit(&mut self, mark: UnitMark) {
        self.finalize_current();
        let pos = mark.pos;

        if self.all.get(pos).is_some_and(Paragraph::is_empty) {
            log::debug!("Dropping empty leading paragraph of unit at {pos}");
            self.all.remove(pos);
        }
        if pos > 0
            && let Some(first) = self.all.get_mut(pos)
        {
            first.page_break_before = true;
        }
    }

    /// Finalized paragraphs in document order.
    pub fn paragraphs(&self) -> &[Paragraph] {
        &self.all
    }

    pub fn into_paragraphs(mut self) -> Vec<Paragraph> {
        self.finalize_current();
        self.all
    }

    fn finalize_current(&mut self) {
        if let Some(paragraph) = self.current.take() {
            self.all.push(paragraph);
        }
    }
}
