//! Screenplay pager CLI
//!
//! Paginates a JSON array of parsed lines and prints a page summary, or the
//! positioned page views with `--json`.

use anyhow::{Context, Result};
use clap::Parser;
use screenplay_pager::{
    page_views, ExportSettings, PaperSize, Pagination, Paginator, Screenplay, Styles,
};
use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "screenplay-pager", version, about = "Paginate a parsed screenplay")]
struct Args {
    /// JSON array of lines; read from stdin when omitted
    input: Option<PathBuf>,
    /// Export settings as JSON
    #[arg(long, value_name = "FILE")]
    settings: Option<PathBuf>,
    /// Stylesheet replacing the bundled one
    #[arg(long, value_name = "FILE")]
    stylesheet: Option<PathBuf>,
    /// Use A4 paper instead of US Letter
    #[arg(long)]
    a4: bool,
    /// Print positioned page views as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let source = match &args.input {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read stdin")?;
            buf
        }
    };
    let screenplay = Screenplay::from_json(&source).context("invalid screenplay lines")?;

    let mut settings = match &args.settings {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            ExportSettings::from_json(&json)?
        }
        None => ExportSettings::default(),
    };
    if args.a4 {
        settings.paper_size = PaperSize::A4;
    }

    let mut paginator = Paginator::new(settings);
    if let Some(path) = &args.stylesheet {
        let css = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        paginator = paginator.with_styles(Arc::new(Styles::from_stylesheet(&css)?));
    }

    let pagination = paginator.paginate(screenplay.lines());
    tracing::info!(
        lines = screenplay.len(),
        pages = pagination.page_count(),
        "paginated"
    );

    if args.json {
        let views = page_views(&pagination, paginator.styles());
        println!("{}", serde_json::to_string_pretty(&views)?);
    } else {
        print_summary(&pagination);
    }
    Ok(())
}

fn print_summary(pagination: &Pagination) {
    for (index, page) in pagination.pages().iter().enumerate() {
        let mut sources = page.sources();
        let first = sources.next();
        let last = sources.last().or(first);
        let range = match (first, last) {
            (Some(a), Some(b)) => format!("lines {a}-{b}"),
            _ => "empty".to_string(),
        };
        println!(
            "page {:>3}: {:<16} {:>6.1} / {:.1} pt",
            index + 1,
            range,
            page.height(),
            page.max_height()
        );
        if let Some(page_break) = pagination.breaks().iter().find(|b| b.page_index == index) {
            println!("          break: {}", page_break.reason);
        }
    }
}
