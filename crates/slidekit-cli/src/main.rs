use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use slidekit_core::pml::{build_presentation_with_settings, publish_slides_with_settings};
use slidekit_core::{PmlDocument, PresentationBuilderSettings, Result, SlideSource};
use std::path::{Path, PathBuf};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "slidekit")]
#[command(version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("SLIDEKIT_BUILD_COMMIT"), ")"))]
#[command(about = "Split, merge and inspect PowerPoint presentations", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log copy decisions and cache reuse
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Builder settings as JSON; missing fields keep their defaults
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Write every slide of a deck as its own presentation
    Publish {
        #[arg(short, long)]
        file: PathBuf,

        #[arg(short, long, default_value = ".")]
        output_dir: PathBuf,

        /// Base of the output names; defaults to the input file stem
        #[arg(short, long)]
        base_name: Option<String>,
    },
    /// Concatenate slide ranges of several decks into one presentation
    Build(BuildArgs),
    /// Show slide count, size, masters and titles
    Info {
        #[arg(short, long)]
        file: PathBuf,
    },
}

#[derive(Args)]
struct BuildArgs {
    /// Source decks, optionally as `path:start:count` (zero-based start)
    #[arg(required = true)]
    sources: Vec<String>,

    #[arg(short, long)]
    output: PathBuf,

    /// Copy every master of each source, used or not
    #[arg(long)]
    keep_master: bool,
}

#[derive(Serialize)]
struct PublishedEntry {
    index: usize,
    file: String,
    title: Option<String>,
    error: Option<String>,
}

#[derive(Serialize)]
struct DeckInfo {
    file: String,
    slides: usize,
    slide_size: Option<(i64, i64)>,
    masters: usize,
    title: Option<String>,
    slide_titles: Vec<Option<String>>,
}

struct SourceSpec {
    path: PathBuf,
    start: usize,
    count: Option<usize>,
}

fn parse_source(spec: &str) -> std::result::Result<SourceSpec, String> {
    let mut parts = spec.rsplitn(3, ':').collect::<Vec<_>>();
    parts.reverse();
    fn numeric(s: &str) -> Option<usize> {
        s.parse().ok()
    }
    match parts.as_slice() {
        [path, start, count] if numeric(start).is_some() && numeric(count).is_some() => Ok(SourceSpec {
            path: PathBuf::from(path),
            start: numeric(start).unwrap_or(0),
            count: numeric(count),
        }),
        _ if !spec.is_empty() => Ok(SourceSpec {
            path: PathBuf::from(spec),
            start: 0,
            count: None,
        }),
        _ => Err("empty source".to_string()),
    }
}

fn load_settings(path: Option<&Path>) -> std::result::Result<PresentationBuilderSettings, String> {
    let Some(path) = path else {
        return Ok(PresentationBuilderSettings::default());
    };
    let text = std::fs::read_to_string(path)
        .map_err(|e| format!("cannot read {}: {}", path.display(), e))?;
    serde_json::from_str(&text).map_err(|e| format!("invalid settings in {}: {}", path.display(), e))
}

fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{}", text),
        Err(e) => error!("cannot serialize output: {}", e),
    }
}

fn publish(
    file: &Path,
    output_dir: &Path,
    base_name: Option<String>,
    settings: PresentationBuilderSettings,
    json: bool,
) -> Result<bool> {
    let source = PmlDocument::open_file(file)?;
    let base = base_name.unwrap_or_else(|| {
        file.file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "slide".to_string())
    });
    std::fs::create_dir_all(output_dir)?;

    let mut entries = Vec::new();
    let mut ok = true;
    for (position, published) in publish_slides_with_settings(&source, &base, settings).enumerate() {
        match published {
            Ok(slide) => {
                let path = output_dir.join(&slide.file_name);
                slide.document.save_as(&path)?;
                info!(file = %path.display(), "wrote slide");
                if !json {
                    println!(
                        "{:>4}  {}  {}",
                        slide.index,
                        path.display(),
                        slide.title.as_deref().unwrap_or("")
                    );
                }
                entries.push(PublishedEntry {
                    index: slide.index,
                    file: path.display().to_string(),
                    title: slide.title,
                    error: None,
                });
            }
            Err(e) => {
                ok = false;
                error!("{}", e);
                entries.push(PublishedEntry {
                    index: position + 1,
                    file: String::new(),
                    title: None,
                    error: Some(e.to_string()),
                });
            }
        }
    }
    if json {
        print_json(&entries);
    }
    Ok(ok)
}

fn build(args: BuildArgs, settings: PresentationBuilderSettings, json: bool) -> Result<bool> {
    let mut specs = Vec::new();
    for raw in &args.sources {
        match parse_source(raw) {
            Ok(spec) => specs.push(spec),
            Err(message) => {
                eprintln!("Error: {}: {}", raw, message);
                return Ok(false);
            }
        }
    }

    let documents = specs
        .iter()
        .map(|spec| PmlDocument::open_file(&spec.path))
        .collect::<Result<Vec<_>>>()?;
    let sources: Vec<SlideSource<'_>> = specs
        .iter()
        .zip(&documents)
        .map(|(spec, document)| SlideSource {
            document,
            start: spec.start,
            count: spec.count,
            keep_master: args.keep_master,
        })
        .collect();

    let result = build_presentation_with_settings(&sources, settings)?;
    result.save_as(&args.output)?;

    let slides = result.slide_count()?;
    if json {
        print_json(&serde_json::json!({
            "output": args.output.display().to_string(),
            "slides": slides,
        }));
    } else {
        println!("Wrote {} slides to {}", slides, args.output.display());
    }
    Ok(true)
}

fn show_info(file: &Path, json: bool) -> Result<bool> {
    let document = PmlDocument::open_file(file)?;
    let slides = document.slide_parts()?;
    let slide_titles = slides
        .iter()
        .map(|slide| document.slide_title(slide))
        .collect::<Result<Vec<_>>>()?;
    let deck = DeckInfo {
        file: file.display().to_string(),
        slides: slides.len(),
        slide_size: document.slide_size()?,
        masters: document.slide_master_parts()?.len(),
        title: document.title(),
        slide_titles,
    };

    if json {
        print_json(&deck);
        return Ok(true);
    }
    println!("File:    {}", deck.file);
    if let Some(title) = &deck.title {
        println!("Title:   {}", title);
    }
    match deck.slide_size {
        Some((cx, cy)) => println!("Size:    {} x {} EMU", cx, cy),
        None => println!("Size:    (not set)"),
    }
    println!("Masters: {}", deck.masters);
    println!("Slides:  {}", deck.slides);
    for (i, title) in deck.slide_titles.iter().enumerate() {
        println!("{:>4}  {}", i + 1, title.as_deref().unwrap_or(""));
    }
    Ok(true)
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let settings = match load_settings(cli.settings.as_deref()) {
        Ok(settings) => settings,
        Err(message) => {
            eprintln!("Error: {}", message);
            std::process::exit(2);
        }
    };

    let outcome = match cli.command {
        Commands::Publish {
            file,
            output_dir,
            base_name,
        } => publish(&file, &output_dir, base_name, settings, cli.json),
        Commands::Build(args) => build(args, settings, cli.json),
        Commands::Info { file } => show_info(&file, cli.json),
    };

    match outcome {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
