//! Paragraph and character style deduplication.
//!
//! Every distinct combination of formatting the converter meets is interned
//! once. Ids are handed out in creation order; the names written to
//! `styles.xml` are assigned by [`StylesManager::finalize`] from how often
//! each style is actually used, and styles nothing references are dropped.

use std::collections::HashMap;
use std::fmt::Write as _;

use quick_xml::escape::escape;

use super::paragraph::Paragraph;
use crate::style::{Color, ComputedStyle, TextAlign, TextTransform, VerticalAlign};

/// Interned character style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextStyleId(pub u32);

/// Interned paragraph style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockStyleId(pub u32);

/// Turns computed styles into interned output styles.
///
/// Equal ids mean equal output formatting, which is what decides whether
/// consecutive text can share a run.
pub trait StyleRegistry {
    /// Character style for text styled by `style`.
    ///
    /// `is_parent_style` marks text that takes its style from an enclosing
    /// block; such text leaves background shading to the paragraph.
    fn text_style(&mut self, style: &ComputedStyle, is_parent_style: bool) -> TextStyleId;

    fn block_style(&mut self, style: &ComputedStyle) -> BlockStyleId;
}

/// Character formatting as it is written to `w:rPr`.
///
/// Sizes are in half-points and spacing in twentieths of a point, the units
/// WordprocessingML uses, so equal output means equal values.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TextStyle {
    pub font_family: Option<String>,
    pub font_size: u32,
    pub bold: bool,
    pub italic: bool,
    pub caps: bool,
    pub small_caps: bool,
    pub underline: bool,
    pub strike: bool,
    pub vertical_align: VerticalAlign,
    pub color: Option<Color>,
    pub shading: Option<Color>,
    pub spacing: Option<i32>,
}

impl TextStyle {
    pub fn from_computed(style: &ComputedStyle, is_parent_style: bool) -> Self {
        Self {
            font_family: style.font_family.clone(),
            font_size: (style.font_size * 2.0).round().max(1.0) as u32,
            bold: style.is_bold(),
            italic: style.is_italic(),
            caps: style.text_transform == TextTransform::Uppercase,
            small_caps: style.small_caps,
            underline: style.underline,
            strike: style.line_through,
            vertical_align: style.vertical_align,
            color: style.color,
            shading: if is_parent_style {
                None
            } else {
                style.background_color
            },
            spacing: style.letter_spacing.map(twips),
        }
    }

    fn write_rpr(&self, out: &mut String) {
        out.push_str("<w:rPr>");
        if let Some(family) = &self.font_family {
            let family = escape(family.as_str());
            let _ = write!(
                out,
                r#"<w:rFonts w:ascii="{family}" w:hAnsi="{family}" w:cs="{family}"/>"#
            );
        }
        if self.bold {
            out.push_str("<w:b/><w:bCs/>");
        }
        if self.italic {
            out.push_str("<w:i/><w:iCs/>");
        }
        if self.caps {
            out.push_str("<w:caps/>");
        }
        if self.small_caps {
            out.push_str("<w:smallCaps/>");
        }
        if self.strike {
            out.push_str("<w:strike/>");
        }
        if let Some(color) = self.color {
            let _ = write!(out, r#"<w:color w:val="{}"/>"#, color.to_hex());
        }
        if let Some(spacing) = self.spacing {
            let _ = write!(out, r#"<w:spacing w:val="{spacing}"/>"#);
        }
        let _ = write!(
            out,
            r#"<w:sz w:val="{0}"/><w:szCs w:val="{0}"/>"#,
            self.font_size
        );
        if self.underline {
            out.push_str(r#"<w:u w:val="single"/>"#);
        }
        if let Some(shading) = self.shading {
            write_shading(out, shading);
        }
        match self.vertical_align {
            VerticalAlign::Super => out.push_str(r#"<w:vertAlign w:val="superscript"/>"#),
            VerticalAlign::Sub => out.push_str(r#"<w:vertAlign w:val="subscript"/>"#),
            VerticalAlign::Baseline => {}
        }
        out.push_str("</w:rPr>");
    }
}

/// Paragraph formatting as it is written to `w:pPr`. Lengths in twips.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BlockStyle {
    pub align: TextAlign,
    pub space_before: i32,
    pub space_after: i32,
    pub indent_left: i32,
    pub indent_right: i32,
    pub indent_first_line: i32,
    pub shading: Option<Color>,
}

impl BlockStyle {
    pub fn from_computed(style: &ComputedStyle) -> Self {
        Self {
            align: style.text_align,
            space_before: twips(style.margin_top).max(0),
            space_after: twips(style.margin_bottom).max(0),
            indent_left: twips(style.margin_left),
            indent_right: twips(style.margin_right),
            indent_first_line: twips(style.text_indent),
            shading: style.background_color,
        }
    }

    fn write_ppr(&self, out: &mut String) {
        out.push_str("<w:pPr>");
        if let Some(shading) = self.shading {
            write_shading(out, shading);
        }
        let _ = write!(
            out,
            r#"<w:spacing w:before="{}" w:after="{}"/>"#,
            self.space_before, self.space_after
        );
        if self.indent_left != 0 || self.indent_right != 0 || self.indent_first_line != 0 {
            let _ = write!(
                out,
                r#"<w:ind w:left="{}" w:right="{}""#,
                self.indent_left, self.indent_right
            );
            if self.indent_first_line < 0 {
                let _ = write!(out, r#" w:hanging="{}""#, -self.indent_first_line);
            } else if self.indent_first_line > 0 {
                let _ = write!(out, r#" w:firstLine="{}""#, self.indent_first_line);
            }
            out.push_str("/>");
        }
        let jc = match self.align {
            TextAlign::Start | TextAlign::Left => None,
            TextAlign::Right => Some("end"),
            TextAlign::Center => Some("center"),
            TextAlign::Justify => Some("both"),
        };
        if let Some(jc) = jc {
            let _ = write!(out, r#"<w:jc w:val="{jc}"/>"#);
        }
        out.push_str("</w:pPr>");
    }
}

fn twips(pt: f32) -> i32 {
    (pt * 20.0).round() as i32
}

fn write_shading(out: &mut String, color: Color) {
    let _ = write!(
        out,
        r#"<w:shd w:val="clear" w:color="auto" w:fill="{}"/>"#,
        color.to_hex()
    );
}

/// An interning table with usage-based naming.
#[derive(Debug)]
struct Pool<S, I> {
    styles: Vec<S>,
    index: HashMap<S, I>,
    names: Vec<Option<String>>,
}

impl<S: Clone + Eq + std::hash::Hash, I: Copy> Pool<S, I> {
    fn new() -> Self {
        Self {
            styles: Vec::new(),
            index: HashMap::new(),
            names: Vec::new(),
        }
    }

    fn intern(&mut self, style: S, make_id: impl FnOnce(u32) -> I) -> I {
        if let Some(&id) = self.index.get(&style) {
            return id;
        }
        let id = make_id(self.styles.len() as u32);
        self.index.insert(style.clone(), id);
        self.styles.push(style);
        self.names.push(None);
        id
    }

    /// Name styles by descending use count; ties go to the older style.
    /// Returns the used style indices in naming order.
    fn assign_names(&mut self, counts: &[usize], name: impl Fn(usize) -> String) -> Vec<usize> {
        let mut used: Vec<usize> = (0..self.styles.len()).filter(|&i| counts[i] > 0).collect();
        used.sort_by(|&a, &b| counts[b].cmp(&counts[a]).then(a.cmp(&b)));
        self.names.iter_mut().for_each(|n| *n = None);
        for (rank, &i) in used.iter().enumerate() {
            self.names[i] = Some(name(rank));
        }
        used
    }
}

/// The default [`StyleRegistry`]: interns styles and writes `styles.xml`.
#[derive(Debug)]
pub struct StylesManager {
    text: Pool<TextStyle, TextStyleId>,
    block: Pool<BlockStyle, BlockStyleId>,
    text_order: Vec<usize>,
    block_order: Vec<usize>,
}

impl Default for StylesManager {
    fn default() -> Self {
        Self::new()
    }
}

impl StyleRegistry for StylesManager {
    fn text_style(&mut self, style: &ComputedStyle, is_parent_style: bool) -> TextStyleId {
        self.text
            .intern(TextStyle::from_computed(style, is_parent_style), TextStyleId)
    }

    fn block_style(&mut self, style: &ComputedStyle) -> BlockStyleId {
        self.block
            .intern(BlockStyle::from_computed(style), BlockStyleId)
    }
}

impl StylesManager {
    pub fn new() -> Self {
        Self {
            text: Pool::new(),
            block: Pool::new(),
            text_order: Vec::new(),
            block_order: Vec::new(),
        }
    }

    pub fn text_style_count(&self) -> usize {
        self.text.styles.len()
    }

    pub fn block_style_count(&self) -> usize {
        self.block.styles.len()
    }

    pub fn text_style_def(&self, id: TextStyleId) -> Option<&TextStyle> {
        self.text.styles.get(id.0 as usize)
    }

    pub fn block_style_def(&self, id: BlockStyleId) -> Option<&BlockStyle> {
        self.block.styles.get(id.0 as usize)
    }

    /// Output style id of a character style, once finalized.
    pub fn text_style_name(&self, id: TextStyleId) -> Option<&str> {
        self.text.names.get(id.0 as usize)?.as_deref()
    }

    /// Output style id of a paragraph style, once finalized. The most used
    /// paragraph style becomes `Normal`.
    pub fn block_style_name(&self, id: BlockStyleId) -> Option<&str> {
        self.block.names.get(id.0 as usize)?.as_deref()
    }

    /// Name every style used by `paragraphs`. Styles no paragraph or run
    /// refers to get no name and are not written.
    pub fn finalize(&mut self, paragraphs: &[Paragraph]) {
        let mut text_counts = vec![0usize; self.text.styles.len()];
        let mut block_counts = vec![0usize; self.block.styles.len()];

        for paragraph in paragraphs {
            if let Some(count) = block_counts.get_mut(paragraph.style().0 as usize) {
                *count += 1;
            }
            for run in paragraph.runs() {
                if let Some(count) = text_counts.get_mut(run.style().0 as usize) {
                    *count += 1;
                }
            }
        }

        self.block_order = self.block.assign_names(&block_counts, |rank| match rank {
            0 => "Normal".to_string(),
            n => format!("Para{n}"),
        });
        self.text_order = self
            .text
            .assign_names(&text_counts, |rank| format!("Text{}", rank + 1));

        log::debug!(
            "Finalized {} of {} paragraph styles and {} of {} character styles",
            self.block_order.len(),
            self.block.styles.len(),
            self.text_order.len(),
            self.text.styles.len()
        );
    }

    /// `word/styles.xml` for the finalized styles.
    pub fn to_xml(&self, base_font_size: f32) -> String {
        let mut out = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">"#,
        );
        let size = (base_font_size * 2.0).round() as u32;
        let _ = write!(
            out,
            r#"<w:docDefaults><w:rPrDefault><w:rPr><w:sz w:val="{size}"/><w:szCs w:val="{size}"/></w:rPr></w:rPrDefault><w:pPrDefault><w:pPr><w:spacing w:after="0" w:line="240" w:lineRule="auto"/></w:pPr></w:pPrDefault></w:docDefaults>"#
        );

        for (rank, &i) in self.block_order.iter().enumerate() {
            let (Some(style), Some(Some(name))) =
                (self.block.styles.get(i), self.block.names.get(i))
            else {
                continue;
            };
            let default = if rank == 0 { r#" w:default="1""# } else { "" };
            let display_name = if rank == 0 {
                name.clone()
            } else {
                format!("Paragraph {rank}")
            };
            let _ = write!(
                out,
                r#"<w:style w:type="paragraph"{default} w:styleId="{name}"><w:name w:val="{display_name}"/>"#
            );
            if rank > 0 {
                out.push_str(r#"<w:basedOn w:val="Normal"/>"#);
            }
            out.push_str("<w:qFormat/>");
            style.write_ppr(&mut out);
            out.push_str("</w:style>");
        }

        for (rank, &i) in self.text_order.iter().enumerate() {
            let (Some(style), Some(Some(name))) = (self.text.styles.get(i), self.text.names.get(i))
            else {
                continue;
            };
            let _ = write!(
                out,
                r#"<w:style w:type="character" w:styleId="{name}"><w:name w:val="Text {}"/>"#,
                rank + 1
            );
            style.write_rpr(&mut out);
            out.push_str("</w:style>");
        }

        out.push_str("</w:styles>");
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::docx::paragraph::{Paragraph, TextOptions};
    use crate::dom::NodeId;

    fn bold() -> ComputedStyle {
        ComputedStyle {
            font_weight: 700,
            ..ComputedStyle::default()
        }
    }

    #[test]
    fn test_equal_styles_intern_once() {
        let mut styles = StylesManager::new();
        let a = styles.text_style(&ComputedStyle::default(), false);
        let b = styles.text_style(&ComputedStyle::default(), false);
        let c = styles.text_style(&bold(), false);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(styles.text_style_count(), 2);
    }

    #[test]
    fn test_parent_style_drops_shading() {
        let shaded = ComputedStyle {
            background_color: Some(Color::rgb(255, 255, 0)),
            ..ComputedStyle::default()
        };
        let mut styles = StylesManager::new();
        let own = styles.text_style(&shaded, false);
        let from_parent = styles.text_style(&shaded, true);
        let plain = styles.text_style(&ComputedStyle::default(), false);
        assert_ne!(own, from_parent);
        assert_eq!(from_parent, plain);
    }

    #[test]
    fn test_block_style_lengths_in_twips() {
        let indented = ComputedStyle {
            text_align: TextAlign::Center,
            margin_top: -6.0,
            margin_bottom: 12.0,
            margin_left: 36.0,
            text_indent: -18.0,
            ..ComputedStyle::default()
        };
        let mut styles = StylesManager::new();
        let id = styles.block_style(&indented);
        let def = styles.block_style_def(id).unwrap();
        assert_eq!(def.align, TextAlign::Center);
        assert_eq!((def.space_before, def.space_after), (0, 240));
        assert_eq!((def.indent_left, def.indent_right), (720, 0));
        assert_eq!(def.indent_first_line, -360);
        assert!(styles.block_style_def(BlockStyleId(1)).is_none());
    }

    #[test]
    fn test_letter_spacing_in_twips() {
        let spaced = ComputedStyle {
            letter_spacing: Some(1.5),
            ..ComputedStyle::default()
        };
        assert_eq!(TextStyle::from_computed(&spaced, false).spacing, Some(30));
    }

    #[test]
    fn test_finalize_names_by_usage() {
        let mut styles = StylesManager::new();
        let heading = ComputedStyle {
            margin_top: 20.0,
            ..bold()
        };
        let body = ComputedStyle::default();

        let mut paragraphs = Vec::new();
        let mut p = Paragraph::new(&mut styles, NodeId(1), &heading);
        p.add_text(&mut styles, "Title", &heading, TextOptions::default());
        paragraphs.push(p);
        for i in 0..2 {
            let mut p = Paragraph::new(&mut styles, NodeId(2 + i), &body);
            p.add_text(&mut styles, "Body", &body, TextOptions::default());
            paragraphs.push(p);
        }
        // Interned but never used by a finalized paragraph
        styles.text_style(
            &ComputedStyle {
                underline: true,
                ..ComputedStyle::default()
            },
            false,
        );

        styles.finalize(&paragraphs);

        assert_eq!(styles.block_style_name(paragraphs[1].style()), Some("Normal"));
        assert_eq!(styles.block_style_name(paragraphs[0].style()), Some("Para1"));
        let body_text = paragraphs[1].runs()[0].style();
        assert_eq!(styles.text_style_name(body_text), Some("Text1"));

        let xml = styles.to_xml(12.0);
        assert_eq!(xml.matches(r#"w:type="character""#).count(), 2);
        assert!(xml.contains(r#"w:default="1" w:styleId="Normal""#));
        assert!(!xml.contains("<w:u "));
    }

    #[test]
    fn test_rpr_order() {
        let style = ComputedStyle {
            font_family: Some("Georgia & Co".to_string()),
            vertical_align: VerticalAlign::Super,
            color: Some(Color::rgb(255, 0, 0)),
            ..bold()
        };
        let mut out = String::new();
        TextStyle::from_computed(&style, false).write_rpr(&mut out);
        assert_eq!(
            out,
            concat!(
                r#"<w:rPr><w:rFonts w:ascii="Georgia &amp; Co" w:hAnsi="Georgia &amp; Co" w:cs="Georgia &amp; Co"/>"#,
                r#"<w:b/><w:bCs/><w:color w:val="FF0000"/><w:sz w:val="24"/><w:szCs w:val="24"/>"#,
                r#"<w:vertAlign w:val="superscript"/></w:rPr>"#
            )
        );
    }
}
