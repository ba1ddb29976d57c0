//! CLI tool for converting HTML fragments into PowerPoint decks.

use anyhow::{bail, Context, Result};
use clap::Parser;
use deck_core::{
    is_plausible_html, Converter, DeckBuilder, DeckModel, DeckOptions, ImageResolver,
    InlineResolver,
};
use deck_pptx::{PptxParser, PptxWriter, DEFAULT_FILE_NAME};
use deck_relay::{RelayConfig, RelayResolver, DEFAULT_RELAY_URL, DEFAULT_TIMEOUT_SECS};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// Convert an HTML fragment into a slide deck, one slide per `<hr>` section.
#[derive(Parser, Debug)]
#[command(name = "html2pptx")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Input HTML file (reads stdin when omitted)
    input: Option<PathBuf>,

    /// Output file
    #[arg(short, long, default_value = DEFAULT_FILE_NAME)]
    output: PathBuf,

    /// Presentation title stored in the document properties
    #[arg(short, long)]
    title: Option<String>,

    /// Relay endpoint used to fetch remote images
    #[arg(long, default_value = DEFAULT_RELAY_URL)]
    relay_url: String,

    /// Image fetch timeout in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    timeout: u64,

    /// Fetch the images of all slides concurrently
    #[arg(long)]
    parallel: bool,

    /// Only accept inline data: URI images; never touch the network
    #[arg(long)]
    offline: bool,

    /// Print the slide layout as JSON instead of writing a file
    #[arg(long)]
    json: bool,

    /// Read the written file back and report what each slide contains
    #[arg(long, conflicts_with = "json")]
    verify: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    if args.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    }

    let html = read_input(args.input.as_deref())?;
    if !is_plausible_html(&html) {
        bail!("Input does not look like HTML");
    }

    let converter = Converter::new(
        DeckBuilder::new(make_resolver(&args)?)
            .with_options(DeckOptions::new().with_concurrent_fetches(args.parallel)),
    );

    let deck = converter
        .convert(&html)
        .await
        .context("Conversion failed")?;

    if args.verbose {
        eprintln!("Built {} slide(s)", deck.len());
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&deck)?);
        return Ok(());
    }

    write_deck(&deck, &args)?;
    if args.verbose {
        eprintln!("Written to: {}", args.output.display());
    }

    if args.verify {
        verify_output(&args.output)?;
    }

    Ok(())
}

/// Pick the image resolver the flags ask for.
fn make_resolver(args: &Args) -> Result<Arc<dyn ImageResolver>> {
    if args.offline {
        log::debug!("Offline mode, remote images will fail");
        return Ok(Arc::new(InlineResolver::new()));
    }

    let config = RelayConfig::new()
        .with_base_url(args.relay_url.clone())
        .with_timeout(Duration::from_secs(args.timeout));
    let resolver = RelayResolver::with_config(config).context("Failed to set up image relay")?;

    Ok(Arc::new(resolver))
}

/// Read the whole input, from a file or stdin.
fn read_input(path: Option<&Path>) -> Result<String> {
    let mut html = String::new();

    match path {
        Some(path) => {
            let file =
                File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
            BufReader::new(file)
                .read_to_string(&mut html)
                .with_context(|| format!("Failed to read {}", path.display()))?;
        }
        None => {
            std::io::stdin()
                .read_to_string(&mut html)
                .context("Failed to read stdin")?;
        }
    }

    Ok(html)
}

/// Write the deck to the output path.
fn write_deck(deck: &DeckModel, args: &Args) -> Result<()> {
    if let Some(parent) = args.output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create output directory: {}", parent.display()))?;
    }

    let writer = match &args.title {
        Some(title) => PptxWriter::new().with_title(title.clone()),
        None => PptxWriter::new(),
    };

    writer
        .write_to_path(deck, &args.output)
        .with_context(|| format!("Failed to write {}", args.output.display()))
}

/// Print a per-slide summary of a written file.
fn verify_output(path: &Path) -> Result<()> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let slides = PptxParser::new()
        .parse(BufReader::new(file))
        .with_context(|| format!("Failed to read back {}", path.display()))?;

    for slide in &slides {
        println!(
            "Slide {}: {} text(s), {} picture(s), {} table(s)",
            slide.number,
            slide.texts.len(),
            slide.pictures,
            slide.tables
        );
        for text in &slide.texts {
            println!("  {}", text);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_args_are_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["html2pptx", "in.html"]).unwrap();
        assert_eq!(args.output, PathBuf::from("converted-item.pptx"));
        assert_eq!(args.relay_url, DEFAULT_RELAY_URL);
        assert_eq!(args.timeout, 30);
        assert!(!args.parallel && !args.offline && !args.json);
    }

    #[test]
    fn test_json_and_verify_conflict() {
        assert!(Args::try_parse_from(["html2pptx", "--json", "--verify"]).is_err());
    }

    #[test]
    fn test_read_input_missing_file() {
        let err = read_input(Some(Path::new("/nonexistent/input.html"))).unwrap_err();
        assert!(err.to_string().contains("Failed to open"));
    }
}
