//! Benchmarks for the HTML to paragraph pipeline.
//!
//! Run with: cargo bench

use criterion::{Criterion, criterion_group, criterion_main};

use docxflow::dom::parse_html;
use docxflow::style::{Origin, StyleResolver, Stylizer, user_agent_stylesheet};
use docxflow::{ConvertOptions, SourceDocument, convert};

const CSS: &str = r#"
body { font-family: Georgia, serif; }
p { text-indent: 1.5em; margin: 0; }
p.first { text-indent: 0; }
h2 { font-size: 1.4em; page-break-after: avoid; }
.sc { font-variant: small-caps; }
blockquote { margin: 1em 2em; font-style: italic; }
pre { white-space: pre; font-family: monospace; }
"#;

/// A synthetic chapter: headings, styled paragraphs, inline markup, quotes
/// and preformatted blocks.
fn sample_chapter(sections: usize) -> String {
    let mut html = String::from(
        r#"<html><head><link rel="stylesheet" href="style.css"/></head><body>"#,
    );
    for i in 0..sections {
        html.push_str(&format!("<h2>Section {i}</h2>"));
        html.push_str(
            r#"<p class="first"><span class="sc">It was</span> a bright cold day in April,
            and the clocks were <em>striking</em> thirteen.</p>"#,
        );
        for _ in 0..8 {
            html.push_str(
                "<p>Lorem ipsum dolor sit amet, <b>consectetur</b> adipiscing elit,\n\
                 sed do eiusmod <i>tempor</i> incididunt ut labore<br/>et dolore magna aliqua.</p>",
            );
        }
        html.push_str("<blockquote><p>Quoted text with <a href=\"#n\">a link</a>.</p></blockquote>");
        html.push_str("<pre>  fn main() {\n      println!(\"hi\");\n  }</pre>");
    }
    html.push_str("</body></html>");
    html
}

fn sample_source(units: usize) -> SourceDocument {
    let mut source = SourceDocument::new();
    source.add_resource("style.css", CSS);
    for i in 0..units {
        source.add_unit(format!("ch{i}.html"), sample_chapter(20));
    }
    source
}

// ============================================================================
// Parsing and styling
// ============================================================================

fn bench_parse_html(c: &mut Criterion) {
    let html = sample_chapter(20);

    c.bench_function("parse_html", |b| {
        b.iter(|| parse_html(&html));
    });
}

fn bench_cascade(c: &mut Criterion) {
    let html = sample_chapter(20);
    let dom = parse_html(&html);
    let ua = user_agent_stylesheet();
    let author = docxflow::style::Stylesheet::parse(CSS);
    let elements = dom.find_all_by_tag("p");

    c.bench_function("cascade", |b| {
        b.iter(|| {
            let mut stylizer =
                Stylizer::new(&dom, vec![(&ua, Origin::UserAgent), (&author, Origin::Author)]);
            for &p in &elements {
                stylizer.style(p).unwrap();
            }
        });
    });
}

// ============================================================================
// Whole conversion
// ============================================================================

fn bench_convert(c: &mut Criterion) {
    let source = sample_source(5);
    let options = ConvertOptions::default();

    c.bench_function("convert", |b| {
        b.iter(|| convert(&source, &options).unwrap());
    });
}

fn bench_document_xml(c: &mut Criterion) {
    let source = sample_source(5);
    let doc = convert(&source, &ConvertOptions::default()).unwrap();

    c.bench_function("document_xml", |b| {
        b.iter(|| doc.document_xml());
    });
}

criterion_group!(
    benches,
    // Parsing and styling
    bench_parse_html,
    bench_cascade,
    // Whole conversion
    bench_convert,
    bench_document_xml,
);
criterion_main!(benches);
