//! # Sublayer CLI
//!
//! Command-line interface for rendering subtitle scripts into PNG layers.
//!
//! ## Usage
//!
//! ```bash
//! # Render every entry of a script into ./output_images
//! sublayer render subs.txt
//!
//! # 720p, left-aligned, custom positions
//! sublayer render subs.txt --resolution 720p --align left \
//!     --pos-original 40,120 --pos-translation 40,60
//!
//! # Start from a settings file and write elsewhere
//! sublayer settings > style.json
//! sublayer render subs.txt --settings style.json --output-dir layers
//!
//! # Inspect how a script is paired
//! sublayer parse subs.txt --json
//! ```
//!
//! Exit status is 1 when nothing could be rendered (unreadable script, bad
//! settings, output directory not writable) and 2 when some entries failed.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use sublayer::{
    FontCache, RenderSettings, SublayerError,
    font::FontBackend,
    logging::{self, LoggingConfig},
    render::{self, EntryOutcome, PngDirectory},
    script::{self, ParseIssue},
    settings::{Alignment, Anchor, Color, Overrides, Resolution, StyleOverrides},
};

/// Exit status when the batch ran but some entries failed.
const EXIT_PARTIAL_FAILURE: i32 = 2;

/// Sublayer - Render subtitle scripts into transparent PNG layers
#[derive(Parser, Debug)]
#[command(name = "sublayer")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log debug details
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log as JSON lines
    #[arg(long, global = true)]
    log_json: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Render every entry of a script to PNG files
    Render {
        /// Subtitle script (UTF-8, one [Tag]Text per line)
        script: PathBuf,

        /// Settings JSON; missing keys keep their defaults
        #[arg(long, value_name = "FILE")]
        settings: Option<PathBuf>,

        #[command(flatten)]
        overrides: OverrideArgs,

        /// Directory for the PNG files (created if missing)
        #[arg(long, default_value = "output_images")]
        output_dir: PathBuf,

        /// Worker threads (defaults to available parallelism)
        #[arg(short, long)]
        jobs: Option<usize>,

        /// Draw text as solid blocks instead of loading fonts
        #[arg(long)]
        block_font: bool,
    },

    /// Show how a script's lines pair into entries
    Parse {
        /// Subtitle script
        script: PathBuf,

        /// Print entries and issues as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the default settings as JSON
    Settings,
}

/// Command-line replacements for individual settings.
#[derive(Args, Debug)]
struct OverrideArgs {
    /// Canvas size: 720p, 1080p, 1440p, 2160p, 4k, or WIDTHxHEIGHT
    #[arg(long)]
    resolution: Option<Resolution>,

    /// Text alignment relative to each anchor: left, center, right
    #[arg(long, value_name = "ALIGN")]
    align: Option<String>,

    /// Font file for the original line
    #[arg(long, value_name = "PATH")]
    font_original: Option<PathBuf>,

    /// Font size in pixels for the original line
    #[arg(long, value_name = "PX")]
    size_original: Option<f32>,

    /// Fill color for the original line: R,G,B[,A]
    #[arg(long, value_name = "COLOR")]
    color_original: Option<Color>,

    /// Anchor of the original line: X,Y from the bottom-left corner
    #[arg(long, value_name = "X,Y", allow_hyphen_values = true)]
    pos_original: Option<Anchor>,

    /// Font file for the translation line
    #[arg(long, value_name = "PATH")]
    font_translation: Option<PathBuf>,

    /// Font size in pixels for the translation line
    #[arg(long, value_name = "PX")]
    size_translation: Option<f32>,

    /// Fill color for the translation line: R,G,B[,A]
    #[arg(long, value_name = "COLOR")]
    color_translation: Option<Color>,

    /// Anchor of the translation line: X,Y from the bottom-left corner
    #[arg(long, value_name = "X,Y", allow_hyphen_values = true)]
    pos_translation: Option<Anchor>,
}

impl OverrideArgs {
    /// Resolved after logging is installed, so an unknown `--align` still
    /// reports its fallback.
    fn into_overrides(self) -> Overrides {
        Overrides {
            resolution: self.resolution,
            alignment: self.align.as_deref().map(Alignment::parse_lenient),
            original: StyleOverrides {
                font: self.font_original,
                size_px: self.size_original,
                color: self.color_original,
                anchor: self.pos_original,
            },
            translation: StyleOverrides {
                font: self.font_translation,
                size_px: self.size_translation,
                color: self.color_translation,
                anchor: self.pos_translation,
            },
        }
    }
}

fn main() {
    match run() {
        Ok(0) => {}
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

fn run() -> Result<i32, SublayerError> {
    let cli = Cli::parse();
    logging::init_logging(&LoggingConfig::for_verbosity(cli.verbose, cli.log_json));

    match cli.command {
        Commands::Render {
            script,
            settings,
            overrides,
            output_dir,
            jobs,
            block_font,
        } => {
            let base = match settings {
                Some(path) => RenderSettings::from_json_file(&path)?,
                None => RenderSettings::default(),
            };
            let settings = base.with_overrides(&overrides.into_overrides())?;

            let parsed = script::parse_file(&script)?;
            println!(
                "Parsed {} entries from {} ({} orphaned translations, {} malformed lines)",
                parsed.entries.len(),
                script.display(),
                parsed.orphan_count(),
                parsed.malformed_count()
            );
            if parsed.entries.is_empty() {
                println!("Nothing to render.");
                return Ok(0);
            }

            let sink = PngDirectory::new(&output_dir)?;
            let fonts = if block_font {
                FontCache::with_backend(FontBackend::Block)
            } else {
                FontCache::new()
            };

            let total = parsed.entries.len();
            let report = render::render_batch(&parsed.entries, &settings, &fonts, &sink, jobs, |r| {
                match &r.outcome {
                    EntryOutcome::Rendered(path) => {
                        println!("[{}/{}] {}", r.index + 1, total, path.display());
                    }
                    EntryOutcome::Failed(reason) => {
                        println!(
                            "[{}/{}] FAILED [{}] {}: {}",
                            r.index + 1,
                            total,
                            r.original_tag,
                            r.original_text,
                            reason
                        );
                    }
                }
            })?;

            println!(
                "Rendered {} of {} entries into {}",
                report.rendered_count(),
                total,
                sink.dir().display()
            );
            if report.all_rendered() {
                Ok(0)
            } else {
                Ok(EXIT_PARTIAL_FAILURE)
            }
        }

        Commands::Parse { script, json } => {
            let parsed = script::parse_file(&script)?;
            if json {
                let out = serde_json::to_string_pretty(&parsed).map_err(std::io::Error::from)?;
                println!("{}", out);
                return Ok(0);
            }

            for entry in &parsed.entries {
                match &entry.translated_text {
                    Some(translation) => {
                        println!("[{}] {}  |  {}", entry.id, entry.original_text, translation)
                    }
                    None => println!("[{}] {}", entry.id, entry.original_text),
                }
            }
            for issue in &parsed.issues {
                match issue {
                    ParseIssue::OrphanTranslation { line, tag, text } => {
                        println!("line {}: orphaned translation [{}] {}", line, tag, text)
                    }
                    ParseIssue::Malformed { line, content } => {
                        println!("line {}: not a tagged line: {}", line, content)
                    }
                }
            }
            println!(
                "{} entries, {} issues",
                parsed.entries.len(),
                parsed.issues.len()
            );
            Ok(0)
        }

        Commands::Settings => {
            println!("{}", RenderSettings::default().to_json_pretty()?);
            Ok(0)
        }
    }
}
