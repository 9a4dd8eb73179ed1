//! docxflow - HTML to WordprocessingML converter

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use serde_json::{Value, json};

use docxflow::{ConvertOptions, DocxDocument, Error, PageSetup, SourceDocument, convert};

#[derive(Parser)]
#[command(name = "docxflow")]
#[command(version, about = "Convert HTML documents to WordprocessingML", long_about = None)]
#[command(after_help = "EXAMPLES:
    docxflow ch1.html ch2.html -o out      Write out/word/*.xml
    docxflow book.html --json              Print the paragraph model")]
struct Cli {
    /// Input HTML files, one unit each, in reading order
    #[arg(value_name = "INPUT", required = true)]
    inputs: Vec<PathBuf>,

    /// Directory to write the document parts into
    #[arg(short, long, value_name = "DIR", required_unless_present = "json")]
    output: Option<PathBuf>,

    /// Extra CSS file applied to every unit
    #[arg(long, value_name = "CSS")]
    stylesheet: Vec<PathBuf>,

    /// Base font size in points
    #[arg(long, value_name = "PT")]
    base_font_size: Option<f32>,

    /// Maximum image width in points
    #[arg(long, value_name = "PT")]
    max_image_width: Option<f32>,

    /// Use A4 paper instead of US Letter
    #[arg(long)]
    a4: bool,

    /// Print the paragraph model as JSON instead of writing parts
    #[arg(long)]
    json: bool,

    /// Suppress output messages
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_filter = if cli.quiet { "error" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), Error> {
    let options = options(cli)?;
    let source = SourceDocument::from_paths(&cli.inputs)?;
    let doc = convert(&source, &options)?;

    if cli.json {
        let model = paragraphs_json(&doc);
        println!("{}", serde_json::to_string_pretty(&model).unwrap_or_default());
        return Ok(());
    }

    if let Some(output) = &cli.output {
        doc.write_parts(output)?;
        if !cli.quiet {
            println!(
                "Wrote {} paragraphs, {} images to {}",
                doc.paragraphs().len(),
                doc.images().images().len(),
                output.display()
            );
        }
    }
    Ok(())
}

fn options(cli: &Cli) -> Result<ConvertOptions, Error> {
    let mut options = ConvertOptions::new();
    for path in &cli.stylesheet {
        let css = String::from_utf8(std::fs::read(path)?)?;
        options = options.with_stylesheet(css);
    }
    if let Some(size) = cli.base_font_size {
        options = options.with_base_font_size(size);
    }
    if let Some(width) = cli.max_image_width {
        options = options.with_max_image_width(width);
    }
    if cli.a4 {
        options = options.with_page(PageSetup::A4);
    }
    Ok(options)
}

fn paragraphs_json(doc: &DocxDocument) -> Value {
    let styles = doc.styles();
    let paragraphs: Vec<Value> = doc
        .paragraphs()
        .iter()
        .map(|p| {
            let runs: Vec<Value> = p
                .runs()
                .iter()
                .map(|run| {
                    json!({
                        "style": styles.text_style_name(run.style()),
                        "tokens": run.tokens(),
                    })
                })
                .collect();
            json!({
                "style": styles.block_style_name(p.style()),
                "keep_next": p.keep_next,
                "page_break_before": p.page_break_before,
                "runs": runs,
            })
        })
        .collect();
    json!({ "paragraphs": paragraphs })
}
