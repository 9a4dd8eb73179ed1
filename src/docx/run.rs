//! Runs: spans of content sharing one character style.

use super::images::Drawing;
use super::styles::TextStyleId;
use crate::dom::NodeId;
use crate::style::Clear;

/// `w:clear` of a line break.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "cli", derive(serde::Serialize))]
#[cfg_attr(feature = "cli", serde(rename_all = "snake_case"))]
pub enum BreakClear {
    #[default]
    None,
    Left,
    Right,
    All,
}

impl BreakClear {
    pub fn as_str(self) -> &'static str {
        match self {
            BreakClear::None => "none",
            BreakClear::Left => "left",
            BreakClear::Right => "right",
            BreakClear::All => "all",
        }
    }
}

impl From<Clear> for BreakClear {
    fn from(clear: Clear) -> Self {
        match clear {
            Clear::Both => BreakClear::All,
            Clear::Left => BreakClear::Left,
            Clear::Right => BreakClear::Right,
            Clear::None => BreakClear::None,
        }
    }
}

/// One piece of run content.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "cli", derive(serde::Serialize))]
#[cfg_attr(feature = "cli", serde(rename_all = "snake_case"))]
pub enum Token {
    Text { text: String, preserve: bool },
    Break(BreakClear),
    Drawing(Drawing),
}

/// An ordered sequence of tokens under one text style.
#[derive(Debug, Clone, PartialEq)]
pub struct Run {
    style: TextStyleId,
    source: NodeId,
    tokens: Vec<Token>,
}

impl Run {
    /// `source` is the element whose style context the run was opened in.
    pub fn new(style: TextStyleId, source: NodeId) -> Self {
        Self {
            style,
            source,
            tokens: Vec::new(),
        }
    }

    pub fn style(&self) -> TextStyleId {
        self.style
    }

    pub fn source(&self) -> NodeId {
        self.source
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Append text.
    ///
    /// Unless `preserve` is set, whitespace is collapsed. Collapsed text that
    /// still begins or ends with whitespace is stored with `preserve` set so
    /// the space survives in the output.
    pub fn add_text(&mut self, text: &str, preserve: bool) {
        let token = if preserve {
            Token::Text {
                text: text.to_string(),
                preserve,
            }
        } else {
            let text = collapse_whitespace(text);
            let preserve = text.trim() != text;
            Token::Text { text, preserve }
        };
        self.tokens.push(token);
    }

    pub fn add_break(&mut self, clear: BreakClear) {
        self.tokens.push(Token::Break(clear));
    }

    pub fn add_drawing(&mut self, drawing: Drawing) {
        self.tokens.push(Token::Drawing(drawing));
    }

    /// No tokens, or only the empty non-preserving text an element with no
    /// content produces.
    pub fn is_empty(&self) -> bool {
        match self.tokens.as_slice() {
            [] => true,
            [Token::Text { text, preserve }] => text.is_empty() && !preserve,
            _ => false,
        }
    }
}

/// Replace each maximal run of ASCII whitespace with one space.
pub fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_space = false;
    for c in text.chars() {
        if is_collapsible(c) {
            if !in_space {
                out.push(' ');
                in_space = true;
            }
        } else {
            out.push(c);
            in_space = false;
        }
    }
    out
}

fn is_collapsible(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\x0B' | '\x0C' | '\r')
}
