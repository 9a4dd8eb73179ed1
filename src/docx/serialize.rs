//! `word/document.xml`.

use std::borrow::Cow;
use std::fmt::Write as _;

use quick_xml::escape::escape;

use super::paragraph::Paragraph;
use super::run::{BreakClear, Run, Token};
use super::styles::StylesManager;
use crate::options::PageSetup;

const DOCUMENT_START: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:wp="http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing" xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:pic="http://schemas.openxmlformats.org/drawingml/2006/picture"><w:body>"#;

/// Serialize finalized paragraphs. Style names come from `styles`, which
/// must have been finalized over the same paragraphs.
pub fn document_xml(paragraphs: &[Paragraph], styles: &StylesManager, page: &PageSetup) -> String {
    let mut out = String::with_capacity(DOCUMENT_START.len() + paragraphs.len() * 128);
    out.push_str(DOCUMENT_START);
    for paragraph in paragraphs {
        write_paragraph(&mut out, paragraph, styles);
    }
    write_section(&mut out, page);
    out.push_str("</w:body></w:document>");
    out
}

pub fn write_paragraph(out: &mut String, paragraph: &Paragraph, styles: &StylesManager) {
    out.push_str("<w:p>");

    let style_name = styles.block_style_name(paragraph.style());
    if style_name.is_some() || paragraph.keep_next || paragraph.page_break_before {
        out.push_str("<w:pPr>");
        if let Some(name) = style_name {
            let _ = write!(out, r#"<w:pStyle w:val="{}"/>"#, escape(name));
        }
        if paragraph.keep_next {
            out.push_str("<w:keepNext/>");
        }
        if paragraph.page_break_before {
            out.push_str("<w:pageBreakBefore/>");
        }
        out.push_str("</w:pPr>");
    }

    for run in paragraph.runs() {
        write_run(out, run, styles);
    }
    out.push_str("</w:p>");
}

pub fn write_run(out: &mut String, run: &Run, styles: &StylesManager) {
    out.push_str("<w:r>");
    if let Some(name) = styles.text_style_name(run.style()) {
        let _ = write!(out, r#"<w:rPr><w:rStyle w:val="{}"/></w:rPr>"#, escape(name));
    }

    for token in run.tokens() {
        match token {
            Token::Text { text, preserve } => {
                let text = escape(xml_chars(text));
                if *preserve {
                    let _ = write!(out, r#"<w:t xml:space="preserve">{text}</w:t>"#);
                } else {
                    let _ = write!(out, "<w:t>{text}</w:t>");
                }
            }
            Token::Break(clear) => write_break(out, *clear),
            Token::Drawing(drawing) => drawing.write_xml(out),
        }
    }
    out.push_str("</w:r>");
}

fn write_break(out: &mut String, clear: BreakClear) {
    let _ = write!(out, r#"<w:br w:clear="{}"/>"#, clear.as_str());
}

fn write_section(out: &mut String, page: &PageSetup) {
    let twips = |pt: f32| (pt * 20.0).round() as i64;
    let _ = write!(
        out,
        r#"<w:sectPr><w:pgSz w:w="{}" w:h="{}"/><w:pgMar w:top="{}" w:right="{}" w:bottom="{}" w:left="{}" w:header="720" w:footer="720" w:gutter="0"/></w:sectPr>"#,
        twips(page.width),
        twips(page.height),
        twips(page.margin_top),
        twips(page.margin_right),
        twips(page.margin_bottom),
        twips(page.margin_left),
    );
}

/// Drop characters XML 1.0 cannot represent.
fn xml_chars(text: &str) -> Cow<'_, str> {
    let valid = |c: char| {
        matches!(c, '\t' | '\n' | '\r')
            || ('\u{20}'..='\u{D7FF}').contains(&c)
            || ('\u{E000}'..='\u{FFFD}').contains(&c)
            || c >= '\u{10000}'
    };
    if text.chars().all(valid) {
        Cow::Borrowed(text)
    } else {
        Cow::Owned(text.chars().filter(|&c| valid(c)).collect())
    }
}
