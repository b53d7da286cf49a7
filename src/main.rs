//! BKD command-line converter: reads markup from stdin, writes HTML to
//! stdout. Script and style payloads are injected via repeatable flags.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use bkd::stream::LinesFrom;
use bkd::{Insert, InsertContent, InsertKind, RenderOptions, parse, render_html};

/// Convert BKD markup on stdin to HTML on stdout.
#[derive(Parser)]
#[command(name = "bkd")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Wrap the output in a standalone HTML document
    #[arg(short, long)]
    standalone: bool,

    /// Embed a CSS file inline in the output
    #[arg(long, value_name = "FILE")]
    css: Vec<PathBuf>,

    /// Reference an external stylesheet by URL
    #[arg(long, value_name = "HREF")]
    css_link: Vec<String>,

    /// Embed literal CSS text inline
    #[arg(long, value_name = "TEXT")]
    style: Vec<String>,

    /// Embed a JavaScript file inline in the output
    #[arg(long, value_name = "FILE")]
    js: Vec<PathBuf>,

    /// Reference an external script by URL
    #[arg(long, value_name = "SRC")]
    js_link: Vec<String>,

    /// Embed literal JavaScript text inline
    #[arg(long, value_name = "TEXT")]
    script: Vec<String>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let stdin = io::stdin();
    let mut source = LinesFrom::new(stdin.lock());
    let doc = parse(&mut source).context("failed to read markup from stdin")?;

    // Styles before scripts; within each kind, files, then links, then
    // literals, each group in flag order.
    let mut inserts: Vec<Insert<'_>> = Vec::new();
    for path in &cli.css {
        inserts.push(file_insert(InsertKind::Style, path)?);
    }
    for href in &cli.css_link {
        inserts.push(Insert {
            kind: InsertKind::Style,
            content: InsertContent::Linked(href.clone()),
        });
    }
    for text in &cli.style {
        inserts.push(Insert {
            kind: InsertKind::Style,
            content: InsertContent::Literal(text.clone()),
        });
    }
    for path in &cli.js {
        inserts.push(file_insert(InsertKind::Script, path)?);
    }
    for src in &cli.js_link {
        inserts.push(Insert {
            kind: InsertKind::Script,
            content: InsertContent::Linked(src.clone()),
        });
    }
    for text in &cli.script {
        inserts.push(Insert {
            kind: InsertKind::Script,
            content: InsertContent::Literal(text.clone()),
        });
    }

    let options = RenderOptions {
        standalone: cli.standalone,
    };
    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    render_html(&doc, &options, &mut inserts, &mut out).context("failed to render HTML")?;
    out.flush().context("failed to flush output")?;
    Ok(())
}

fn file_insert(kind: InsertKind, path: &PathBuf) -> Result<Insert<'static>> {
    let file =
        File::open(path).with_context(|| format!("cannot open insert file {}", path.display()))?;
    Ok(Insert {
        kind,
        content: InsertContent::Stream(Box::new(LinesFrom::new(BufReader::new(file)))),
    })
}
