//! CLI tool for generating slide design guidance from PowerPoint files.

mod fetch;

use anyhow::{Context, Result};
use clap::{Args as ClapArgs, Parser, Subcommand};
use deckguide_core::search::DEFAULT_PREVIEW_ENDPOINT;
use deckguide_core::style::DEFAULT_LOGO_URL;
use deckguide_core::{
    build_report, preview_url, render_table, visual_search_term, AssetFetcher, DeckStyle,
    Presentation, SlideReportRow,
};
use deckguide_pptx::{build_guide_deck, DeckRewriter, Image, PptxParser};
use deckguide_xlsx::ReportWorkbook;
use fetch::{HttpFetcher, DEFAULT_TIMEOUT_SECS};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

const REPORT_FILENAME: &str = "Slide_Visual_Guidelines.xlsx";
const GUIDE_FILENAME: &str = "Slide_Design_Guide.pptx";
const REWRITE_FILENAME: &str = "Apollo_Enhanced_Presentation.pptx";
const PREVIEW_DIRNAME: &str = "previews";

/// Generate slide-by-slide visual design guidance for PowerPoint decks.
#[derive(Parser, Debug)]
#[command(name = "deckguide")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write the design report spreadsheet
    Report(ReportArgs),
    /// Write a deck with one guidance slide per report row
    Guide(GuideArgs),
    /// Rebuild the deck in the branded style
    Rewrite(RewriteArgs),
    /// Download preview images for each report row
    Preview(PreviewArgs),
}

#[derive(ClapArgs, Debug)]
struct ReportArgs {
    /// Input PowerPoint file (.pptx)
    input: PathBuf,

    /// Output spreadsheet (default: Slide_Visual_Guidelines.xlsx next to the input)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print the report as a table instead of writing a file
    #[arg(short, long, conflicts_with_all = ["json", "output"])]
    print: bool,

    /// Print the report as JSON instead of writing a file
    #[arg(long, conflicts_with = "output")]
    json: bool,
}

#[derive(ClapArgs, Debug)]
struct GuideArgs {
    /// Input PowerPoint file (.pptx)
    input: PathBuf,

    /// Output deck (default: Slide_Design_Guide.pptx next to the input)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(ClapArgs, Debug)]
struct RewriteArgs {
    /// Input PowerPoint file (.pptx)
    input: PathBuf,

    /// Output deck (default: Apollo_Enhanced_Presentation.pptx next to the input)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Logo image to place on every slide
    #[arg(long, default_value = DEFAULT_LOGO_URL)]
    logo_url: String,

    /// Do not fetch or place a logo
    #[arg(long)]
    no_logo: bool,

    /// Timeout for the logo download
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    timeout_secs: u64,
}

#[derive(ClapArgs, Debug)]
struct PreviewArgs {
    /// Input PowerPoint file (.pptx)
    input: PathBuf,

    /// Output directory (default: previews/ next to the input)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Image endpoint; `{query}` is replaced by the search term
    #[arg(long, default_value = DEFAULT_PREVIEW_ENDPOINT)]
    endpoint: String,

    /// Timeout for each image download
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    timeout_secs: u64,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter)).init();

    match &cli.command {
        Command::Report(args) => run_report(args),
        Command::Guide(args) => run_guide(args),
        Command::Rewrite(args) => run_rewrite(args),
        Command::Preview(args) => run_preview(args),
    }
}

fn run_report(args: &ReportArgs) -> Result<()> {
    let presentation = load_presentation(&args.input)?;
    let rows = build_report(&presentation.slides);
    log::debug!("{} report rows", rows.len());

    if args.print {
        print!("{}", render_table(&rows));
        return Ok(());
    }
    if args.json {
        let json =
            serde_json::to_string_pretty(&rows).context("Failed to serialize report as JSON")?;
        println!("{}", json);
        return Ok(());
    }

    let bytes = ReportWorkbook::new()
        .to_bytes(&rows)
        .context("Failed to build report spreadsheet")?;
    let path = output_path(&args.input, args.output.as_deref(), REPORT_FILENAME);
    write_output(&path, &bytes)
}

fn run_guide(args: &GuideArgs) -> Result<()> {
    let presentation = load_presentation(&args.input)?;
    let rows = build_report(&presentation.slides);
    let bytes = build_guide_deck("Slide Design Guide", &rows)
        .to_bytes()
        .context("Failed to build guide deck")?;
    let path = output_path(&args.input, args.output.as_deref(), GUIDE_FILENAME);
    write_output(&path, &bytes)
}

fn run_rewrite(args: &RewriteArgs) -> Result<()> {
    let presentation = load_presentation(&args.input)?;
    let logo_url = (!args.no_logo).then(|| args.logo_url.clone());
    let style = DeckStyle::default().with_logo_url(logo_url);
    let rewriter = DeckRewriter::new(style, HttpFetcher::with_timeout_secs(args.timeout_secs));

    let bytes = rewriter
        .rewrite(&presentation)
        .context("Failed to build rewritten deck")?;
    let path = output_path(&args.input, args.output.as_deref(), REWRITE_FILENAME);
    write_output(&path, &bytes)
}

fn run_preview(args: &PreviewArgs) -> Result<()> {
    let presentation = load_presentation(&args.input)?;
    let rows = build_report(&presentation.slides);
    let fetcher = HttpFetcher::with_timeout_secs(args.timeout_secs);
    let previews = fetch_previews(&rows, &args.endpoint, &fetcher);

    let dir = match &args.output {
        Some(dir) => dir.clone(),
        None => sibling_path(&args.input, PREVIEW_DIRNAME),
    };
    fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create output directory: {}", dir.display()))?;

    for (name, bytes) in &previews {
        write_output(&dir.join(name), bytes)?;
    }
    log::info!(
        "Saved {} of {} preview images to {}",
        previews.len(),
        rows.len(),
        dir.display()
    );
    Ok(())
}

/// Read and parse a presentation file.
fn load_presentation(input_path: &Path) -> Result<Presentation> {
    let data = fs::read(input_path)
        .with_context(|| format!("Failed to open {}", input_path.display()))?;
    let filename = input_path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("unknown");

    let presentation = PptxParser::new()
        .parse_bytes(&data, filename)
        .with_context(|| format!("Failed to read {}", input_path.display()))?;
    log::debug!(
        "{}: {} slides, {} text blocks",
        filename,
        presentation.slides.len(),
        presentation.block_count()
    );
    Ok(presentation)
}

/// Fetch one preview image per report row. Each distinct URL is requested
/// once; rows whose image cannot be fetched or decoded are skipped.
fn fetch_previews<F: AssetFetcher>(
    rows: &[SlideReportRow],
    endpoint: &str,
    fetcher: &F,
) -> Vec<(String, Vec<u8>)> {
    let mut cache: HashMap<String, Option<Image>> = HashMap::new();

    rows.iter()
        .filter_map(|row| {
            let term = visual_search_term(row.suggestion.visual_prompt);
            let url = preview_url(endpoint, &term);
            let image = cache
                .entry(url)
                .or_insert_with_key(|url| {
                    let image = Image::decode(fetcher.fetch(url)?);
                    if image.is_none() {
                        log::warn!("Preview from {} is not an image, skipping", url);
                    }
                    image
                })
                .as_ref()?;
            Some((
                preview_filename(row, image.kind.extension()),
                image.bytes.clone(),
            ))
        })
        .collect()
}

fn preview_filename(row: &SlideReportRow, extension: &str) -> String {
    let part = row.part.label().to_lowercase().replace(' ', "_");
    format!("slide_{:02}_{}.{}", row.slide_number, part, extension)
}

/// The explicit output path, or `default_name` next to the input.
fn output_path(input_path: &Path, output: Option<&Path>, default_name: &str) -> PathBuf {
    match output {
        Some(path) => path.to_path_buf(),
        None => sibling_path(input_path, default_name),
    }
}

fn sibling_path(input_path: &Path, name: &str) -> PathBuf {
    match input_path.parent() {
        Some(parent) => parent.join(name),
        None => PathBuf::from(name),
    }
}

/// Write output to a file.
fn write_output(path: &Path, content: &[u8]) -> Result<()> {
    fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))?;
    log::info!("Written to: {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use deckguide_core::{ExtractedSlide, StaticFetcher};
    use std::io::Cursor;

    fn png_bytes() -> Vec<u8> {
        let mut cursor = Cursor::new(Vec::new());
        image::RgbaImage::new(2, 2)
            .write_to(&mut cursor, image::ImageFormat::Png)
            .unwrap();
        cursor.into_inner()
    }

    #[test]
    fn test_cli_parses_subcommands() {
        let cli = Cli::try_parse_from(["deckguide", "-v", "report", "deck.pptx", "--print"]).unwrap();
        assert!(cli.verbose);
        match cli.command {
            Command::Report(args) => {
                assert_eq!(args.input, PathBuf::from("deck.pptx"));
                assert!(args.print);
                assert!(args.output.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }

        let cli = Cli::try_parse_from(["deckguide", "rewrite", "deck.pptx", "--no-logo"]).unwrap();
        match cli.command {
            Command::Rewrite(args) => {
                assert!(args.no_logo);
                assert_eq!(args.logo_url, DEFAULT_LOGO_URL);
                assert_eq!(args.timeout_secs, DEFAULT_TIMEOUT_SECS);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_print_and_json_conflict() {
        assert!(Cli::try_parse_from(["deckguide", "report", "d.pptx", "--print", "--json"]).is_err());
    }

    #[test]
    fn test_stdout_modes_conflict_with_output() {
        for flag in ["--print", "--json"] {
            assert!(
                Cli::try_parse_from(["deckguide", "report", "d.pptx", "-o", "out.xlsx", flag])
                    .is_err()
            );
        }
        assert!(Cli::try_parse_from(["deckguide", "report", "d.pptx", "-o", "out.xlsx"]).is_ok());
    }

    #[test]
    fn test_fetch_previews_requests_each_url_once() {
        let rows = build_report(&[
            ExtractedSlide::new(1).with_blocks(["Components of health"]),
            ExtractedSlide::new(2).with_blocks(["Components again"]),
        ]);
        assert_eq!(rows.len(), 4);
        let url = preview_url(
            DEFAULT_PREVIEW_ENDPOINT,
            &visual_search_term(rows[0].suggestion.visual_prompt),
        );
        let fetcher = StaticFetcher::new().with_response(url.clone(), png_bytes());

        let previews = fetch_previews(&rows, DEFAULT_PREVIEW_ENDPOINT, &fetcher);
        let names: Vec<&str> = previews.iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "slide_01_part_1.png",
                "slide_01_part_2.png",
                "slide_02_part_1.png",
                "slide_02_part_2.png",
            ]
        );
        assert_eq!(fetcher.requests(), vec![url]);
    }

    #[test]
    fn test_output_path_defaults_next_to_input() {
        let input = Path::new("decks/health.pptx");
        assert_eq!(
            output_path(input, None, REPORT_FILENAME),
            PathBuf::from("decks/Slide_Visual_Guidelines.xlsx")
        );
        assert_eq!(
            output_path(input, Some(Path::new("out.xlsx")), REPORT_FILENAME),
            PathBuf::from("out.xlsx")
        );
        assert_eq!(
            output_path(Path::new("health.pptx"), None, GUIDE_FILENAME),
            PathBuf::from("Slide_Design_Guide.pptx")
        );
    }

    #[test]
    fn test_fetch_previews_skips_failures() {
        let rows = build_report(&[
            ExtractedSlide::new(1).with_blocks(["Disease burden in India"]),
            ExtractedSlide::new(2).with_blocks(["Welcome"]),
        ]);
        let india_url = preview_url(
            "https://img.test/?q={query}",
            &visual_search_term(rows[0].suggestion.visual_prompt),
        );
        let fetcher = StaticFetcher::new().with_response(india_url.clone(), png_bytes());

        let previews = fetch_previews(&rows, "https://img.test/?q={query}", &fetcher);
        assert_eq!(previews.len(), 1);
        assert_eq!(previews[0].0, "slide_01_full_slide.png");
        assert_eq!(fetcher.requests().len(), 2);
        assert_eq!(fetcher.requests()[0], india_url);
    }

    #[test]
    fn test_fetch_previews_skips_non_images() {
        let rows = build_report(&[ExtractedSlide::new(3).with_blocks(["Welcome"])]);
        let url = preview_url(
            DEFAULT_PREVIEW_ENDPOINT,
            &visual_search_term(rows[0].suggestion.visual_prompt),
        );
        let fetcher = StaticFetcher::new().with_response(url, b"<html></html>".to_vec());
        assert!(fetch_previews(&rows, DEFAULT_PREVIEW_ENDPOINT, &fetcher).is_empty());
    }

    #[test]
    fn test_preview_filename() {
        let rows = build_report(&[ExtractedSlide::new(12).with_blocks(["Components of health"])]);
        assert_eq!(preview_filename(&rows[1], "jpg"), "slide_12_part_2.jpg");
    }
}
