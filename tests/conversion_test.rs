//! End-to-end conversion tests through the public API.

use docxflow::{
    BreakClear, ConvertOptions, DocxDocument, Error, Paragraph, SourceDocument, Token, convert,
};
use proptest::prelude::*;

fn convert_units(units: &[&str]) -> DocxDocument {
    let mut source = SourceDocument::new();
    for (i, html) in units.iter().enumerate() {
        source.add_unit(format!("ch{i}.html"), *html);
    }
    convert(&source, &ConvertOptions::default()).expect("conversion succeeds")
}

/// Paragraph contents as strings, breaks as `|`, drawings as `#`.
fn paragraph_text(paragraph: &Paragraph) -> String {
    paragraph
        .runs()
        .iter()
        .flat_map(|r| r.tokens())
        .map(|t| match t {
            Token::Text { text, .. } => text.as_str(),
            Token::Break(_) => "|",
            Token::Drawing(_) => "#",
        })
        .collect()
}

fn texts(doc: &DocxDocument) -> Vec<String> {
    doc.paragraphs().iter().map(paragraph_text).collect()
}

#[test]
fn test_simple_document() {
    let doc = convert_units(&[
        "<html><body><h1>Chapter One</h1><p>It was a <em>dark</em> night.</p></body></html>",
    ]);
    assert_eq!(texts(&doc), ["Chapter One", "It was a dark night."]);
    assert!(doc.paragraphs()[0].keep_next);
    assert_eq!(doc.paragraphs()[1].runs().len(), 3);
}

#[test]
fn test_whitespace_collapsed_across_markup() {
    let doc = convert_units(&["<p>\n    Some   text\n    <b>bold</b>\n  </p>"]);
    assert_eq!(texts(&doc), ["Some text bold "]);

    let first = &doc.paragraphs()[0].runs()[0].tokens()[0];
    assert_eq!(
        first,
        &Token::Text {
            text: "Some text ".to_string(),
            preserve: true
        }
    );
}

#[test]
fn test_pre_line_splits_lines() {
    let doc = convert_units(&[r#"<p style="white-space: pre-line">line1
line2</p>"#]);
    let tokens = doc.paragraphs()[0].runs()[0].tokens();
    assert_eq!(
        tokens,
        [
            Token::Text {
                text: "line1".to_string(),
                preserve: false
            },
            Token::Break(BreakClear::None),
            Token::Text {
                text: "line2".to_string(),
                preserve: false
            },
        ]
    );
}

#[test]
fn test_equal_styles_share_a_run() {
    let doc = convert_units(&["<p>A<span>A</span><b>B</b></p>"]);
    let runs = doc.paragraphs()[0].runs();
    assert_eq!(runs.len(), 2);
    assert_eq!(runs[0].tokens().len(), 2);
    assert_eq!(runs[1].tokens().len(), 1);
}

#[test]
fn test_units_start_new_pages() {
    let doc = convert_units(&[
        "<body><p>one</p></body>",
        "<body>\n<div><p>two</p></div></body>",
        "<body>  </body>",
        "<body><p>three</p></body>",
    ]);
    let flags: Vec<_> = doc
        .paragraphs()
        .iter()
        .map(|p| (paragraph_text(p), p.page_break_before))
        .collect();
    // The second unit's body paragraph is elided, so its div is first.
    assert_eq!(
        flags,
        [
            ("one".to_string(), false),
            (String::new(), true),
            ("two".to_string(), false),
            ("three".to_string(), true),
        ]
    );
}

#[test]
fn test_first_content_never_breaks() {
    let doc = convert_units(&["<body></body>", "<p>first content</p>"]);
    assert_eq!(texts(&doc), ["first content"]);
    assert!(!doc.paragraphs()[0].page_break_before);
}

#[test]
fn test_trailing_br() {
    let doc = convert_units(&["<p>end<br></p><p>mid<br>dle</p>"]);
    assert_eq!(texts(&doc), ["end", "mid|dle"]);
}

#[test]
fn test_cascade_reaches_runs() {
    let doc = convert_units(&[r#"<html><head><style>
        p { color: #336699 }
        #x { color: red }
        .loud { font-weight: bold !important }
        </style></head><body>
        <p id="x" class="loud" style="font-weight: normal">text</p>
        </body></html>"#]);

    let run = &doc.paragraphs()[0].runs()[0];
    let style = doc.styles().text_style_def(run.style()).unwrap();
    assert!(style.bold, "important author rule beats inline style");
    assert_eq!(style.color.map(|c| c.to_hex()).as_deref(), Some("FF0000"));
}

#[test]
fn test_white_space_inherits_into_spans() {
    let doc = convert_units(&[r#"<div style="white-space: pre"><span>  a  b</span></div>"#]);
    let tokens = doc.paragraphs()[0].runs()[0].tokens();
    assert_eq!(
        tokens,
        [Token::Text {
            text: "  a  b".to_string(),
            preserve: true
        }]
    );
}

#[test]
fn test_document_xml_flags() {
    let doc = convert_units(&[
        "<h2>Title</h2><p> spaced </p>",
        "<p>next</p>",
    ]);
    let xml = doc.document_xml();
    assert!(xml.contains("<w:keepNext/>"));
    assert!(xml.contains("<w:pageBreakBefore/>"));
    assert!(xml.contains(r#"<w:t xml:space="preserve">spaced </w:t>"#));
    assert_eq!(xml.matches("<w:p>").count(), 3);
}

#[test]
fn test_styles_named_by_usage() {
    let doc = convert_units(&[r#"<p>a</p><p>b</p><p style="margin-left: 20pt">c</p>"#]);
    let styles = doc.styles();
    let names: Vec<_> = doc
        .paragraphs()
        .iter()
        .map(|p| styles.block_style_name(p.style()).unwrap())
        .collect();
    assert_eq!(names, ["Normal", "Normal", "Para1"]);
    let xml = doc.styles_xml();
    assert!(xml.contains(r#"w:styleId="Para1""#));
    assert!(xml.contains(r#"<w:basedOn w:val="Normal"/>"#));
}

#[test]
fn test_images_deduplicated() {
    let mut png = vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
    png.extend_from_slice(&[0, 0, 0, 13]);
    png.extend_from_slice(b"IHDR");
    png.extend_from_slice(&2000u32.to_be_bytes());
    png.extend_from_slice(&1000u32.to_be_bytes());

    let mut source = SourceDocument::new();
    source
        .add_unit("a.html", r#"<p><img src="pic.png"/></p>"#)
        .add_unit("b.html", r#"<p>x<img src="pic.png" style="float: right"/></p><p><img src="missing.png"/></p>"#)
        .add_resource("pic.png", png);
    let doc = convert(&source, &ConvertOptions::new().with_max_image_width(300.0)).unwrap();

    assert_eq!(doc.images().images().len(), 1);
    let drawings: Vec<_> = doc
        .paragraphs()
        .iter()
        .flat_map(|p| p.runs())
        .flat_map(|r| r.tokens())
        .filter_map(|t| match t {
            Token::Drawing(d) => Some(d),
            _ => None,
        })
        .collect();
    assert_eq!(drawings.len(), 2);
    assert_eq!(drawings[0].rel_id, drawings[1].rel_id);
    assert_ne!(drawings[0].id, drawings[1].id);
    // 2000px at 96dpi is 1500pt, scaled to 300pt wide.
    assert_eq!(drawings[0].cx, 300 * 12_700);
    assert_eq!(drawings[0].cy, 150 * 12_700);
    assert!(drawings[1].float.is_some());
    assert!(doc.document_xml().contains("<wp:anchor"));
    // The paragraph holding the missing image stays, empty.
    assert_eq!(paragraph_text(doc.paragraphs().last().unwrap()), "");
}

#[test]
fn test_missing_stylesheet_is_not_fatal() {
    let doc = convert_units(&[
        r#"<html><head><link rel="stylesheet" href="nope.css"></head><body><p>ok</p></body></html>"#,
    ]);
    assert_eq!(texts(&doc), ["ok"]);
}

#[test]
fn test_legacy_encoding() {
    let mut source = SourceDocument::new();
    source.add_unit("a.html", b"<p>caf\xE9</p>".to_vec());
    let doc = convert(&source, &ConvertOptions::default()).unwrap();
    assert_eq!(texts(&doc), ["café"]);
}

#[test]
fn test_write_parts_with_media() {
    let mut gif = b"GIF89a".to_vec();
    gif.extend_from_slice(&[10, 0, 5, 0]);
    gif.resize(32, 0);

    let mut source = SourceDocument::new();
    source
        .add_unit("a.html", r#"<p><img src="a.gif"/></p>"#)
        .add_resource("a.gif", gif.clone());
    let doc = convert(&source, &ConvertOptions::default()).unwrap();

    let dir = tempfile::tempdir().unwrap();
    doc.write_parts(dir.path()).unwrap();
    let media = dir.path().join("word/media/image1.gif");
    assert_eq!(std::fs::read(media).unwrap(), gif);
    let rels = std::fs::read_to_string(dir.path().join("word/_rels/document.xml.rels")).unwrap();
    assert!(rels.contains(r#"Id="rId2""#));
}

#[test]
fn test_missing_input_file() {
    let result = SourceDocument::from_paths(&["/nonexistent/docxflow/input.html"]);
    assert!(matches!(result, Err(Error::Io(_))));
}

proptest! {
    #[test]
    fn prop_paragraph_text_never_has_double_spaces(words in prop::collection::vec("[a-z]{1,6}", 1..8), gaps in prop::collection::vec("[ \t\n]{1,4}", 8)) {
        let mut body = String::new();
        for (word, gap) in words.iter().zip(gaps.iter()) {
            body.push_str(word);
            body.push_str(gap);
        }
        let html = format!("<p>{body}</p>");
        let doc = convert_units(&[&html]);
        let text = paragraph_text(&doc.paragraphs()[0]);
        prop_assert!(!text.contains("  "));
        prop_assert_eq!(text.trim_end(), words.join(" "));
    }

    #[test]
    fn prop_every_unit_after_the_first_starts_a_page(count in 1usize..5) {
        let units: Vec<String> = (0..count).map(|i| format!("<p>unit {i}</p>")).collect();
        let refs: Vec<&str> = units.iter().map(String::as_str).collect();
        let doc = convert_units(&refs);
        let flags: Vec<bool> = doc.paragraphs().iter().map(|p| p.page_break_before).collect();
        let expected: Vec<bool> = (0..count).map(|i| i > 0).collect();
        prop_assert_eq!(flags, expected);
    }
}
