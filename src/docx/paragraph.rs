//! Paragraphs: ordered runs plus paragraph-level flags.

use super::images::Drawing;
use super::run::{BreakClear, Run};
use super::styles::{BlockStyleId, StyleRegistry};
use crate::dom::NodeId;
use crate::style::{ComputedStyle, WhiteSpace};

/// How [`Paragraph::add_text`] treats a piece of text.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextOptions {
    /// Drop leading whitespace unless the text is preformatted. Used for the
    /// first text inside a block element.
    pub ignore_leading_whitespace: bool,
    /// Element the text belongs to, if not the paragraph's own element.
    pub style_context: Option<NodeId>,
    /// The style comes from the enclosing block rather than a text element.
    pub style_is_from_parent: bool,
}

impl TextOptions {
    /// Options for the leading text of a block element.
    pub fn block_leading() -> Self {
        Self {
            ignore_leading_whitespace: true,
            style_context: None,
            style_is_from_parent: true,
        }
    }

    /// Options for the leading text of an inline element.
    pub fn inline(context: NodeId) -> Self {
        Self {
            style_context: Some(context),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Paragraph {
    node: NodeId,
    style: BlockStyleId,
    /// Style of the opening element. Registered as a text style only when a
    /// break or drawing arrives before any text.
    fallback_style: ComputedStyle,
    runs: Vec<Run>,
    /// Keep on the same page as the next paragraph.
    pub keep_next: bool,
    /// Start on a new page. Set when the paragraph opens a unit.
    pub page_break_before: bool,
}

impl Paragraph {
    /// A paragraph for the block element `node` styled by `style`.
    pub fn new<R: StyleRegistry + ?Sized>(
        registry: &mut R,
        node: NodeId,
        style: &ComputedStyle,
    ) -> Self {
        Self {
            node,
            style: registry.block_style(style),
            fallback_style: style.clone(),
            runs: Vec::new(),
            keep_next: false,
            page_break_before: false,
        }
    }

    /// The element that opened the paragraph.
    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn style(&self) -> BlockStyleId {
        self.style
    }

    pub fn runs(&self) -> &[Run] {
        &self.runs
    }

    /// Add text styled by `style`.
    ///
    /// Text continues the last run when its character style is the same,
    /// otherwise it opens a new run. `pre` and `pre-wrap` keep whitespace;
    /// `pre-line` turns line boundaries into breaks.
    pub fn add_text<R: StyleRegistry + ?Sized>(
        &mut self,
        registry: &mut R,
        text: &str,
        style: &ComputedStyle,
        options: TextOptions,
    ) {
        let text_style = registry.text_style(style, options.style_is_from_parent);
        let source = options.style_context.unwrap_or(self.node);
        if self.runs.last().is_none_or(|run| run.style() != text_style) {
            self.runs.push(Run::new(text_style, source));
        }
        let Some(run) = self.runs.last_mut() else {
            return;
        };

        let preserve = style.white_space.preserves();
        let text = if options.ignore_leading_whitespace && !preserve {
            text.trim_start()
        } else {
            text
        };

        if style.white_space == WhiteSpace::PreLine {
            for (i, line) in split_lines(text).enumerate() {
                if i > 0 {
                    run.add_break(BreakClear::None);
                }
                run.add_text(line, false);
            }
        } else {
            run.add_text(text, preserve);
        }
    }

    pub fn add_break<R: StyleRegistry + ?Sized>(&mut self, registry: &mut R, clear: BreakClear) {
        self.trailing_run(registry).add_break(clear);
    }

    pub fn add_drawing<R: StyleRegistry + ?Sized>(&mut self, registry: &mut R, drawing: Drawing) {
        self.trailing_run(registry).add_drawing(drawing);
    }

    /// True when every run is empty.
    pub fn is_empty(&self) -> bool {
        self.runs.iter().all(Run::is_empty)
    }

    fn trailing_run<R: StyleRegistry + ?Sized>(&mut self, registry: &mut R) -> &mut Run {
        if self.runs.is_empty() {
            let text_style = registry.text_style(&self.fallback_style, false);
            self.runs.push(Run::new(text_style, self.node));
        }
        let last = self.runs.len() - 1;
        &mut self.runs[last]
    }
}

/// Split on line boundaries. A boundary at the very end does not produce a
/// trailing empty line.
fn split_lines(text: &str) -> impl Iterator<Item = &str> {
    let mut rest = Some(text).filter(|t| !t.is_empty());
    std::iter::from_fn(move || {
        let current = rest?;
        match current.find(is_line_boundary) {
            Some(pos) => {
                let boundary = current[pos..].chars().next().map_or(1, char::len_utf8);
                let mut end = pos + boundary;
                if current[pos..].starts_with("\r\n") {
                    end += 1;
                }
                rest = Some(&current[end..]).filter(|r| !r.is_empty());
                Some(&current[..pos])
            }
            None => {
                rest = None;
                Some(current)
            }
        }
    })
}

fn is_line_boundary(c: char) -> bool {
    matches!(
        c,
        '\n' | '\r' | '\x0B' | '\x0C' | '\x1C' | '\x1D' | '\x1E' | '\u{85}' | '\u{2028}' | '\u{2029}'
    )
}
