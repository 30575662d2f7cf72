//! QuizLens - photograph a question, read it, look up the answer
//!
//! Takes a photo, runs OCR over a draggable focus region and searches a
//! question dataset for the recognized text.

mod app;
mod capture;
mod config;
mod matching;
mod region;
mod report;
mod session;
mod storage;
mod vision;

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use crate::app::QuizLensApp;
use crate::capture::StillImageCamera;
use crate::config::AppConfig;

/// QuizLens - OCR question lookup
#[derive(Parser, Debug)]
#[command(name = "quiz-lens")]
#[command(about = "Recognize a question in a photo and look up its answer")]
struct Args {
    /// Photo to scan (stands in for the camera)
    #[arg(short, long)]
    photo: Option<PathBuf>,

    /// Pointer X in display pixels; the focus region is centered on it
    #[arg(long, requires = "pointer_y")]
    pointer_x: Option<f32>,

    /// Pointer Y in display pixels
    #[arg(long, requires = "pointer_x")]
    pointer_y: Option<f32>,

    /// Dataset file or URL (overrides the config)
    #[arg(short, long)]
    dataset: Option<String>,

    /// OCR language (overrides the config)
    #[arg(short, long)]
    lang: Option<String>,

    /// Match this text directly instead of scanning a photo
    #[arg(long, conflicts_with = "photo")]
    text: Option<String>,

    /// Configuration file (defaults to the user config directory)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write the default configuration and exit
    #[arg(long)]
    init_config: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.verbose { LevelFilter::DEBUG } else { LevelFilter::INFO };
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config_path = match &args.config {
        Some(path) => Some(path.clone()),
        None => storage::get_config_dir().ok().map(|dir| dir.join("config.toml")),
    };

    if args.init_config {
        let path = config_path.ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
        config::save_config(&AppConfig::default(), &path)?;
        println!("Wrote default configuration to {}", path.display());
        return Ok(());
    }

    let mut config = load_or_default_config(config_path.as_deref());
    if let Some(dataset) = args.dataset {
        config.general.dataset = dataset;
    }
    if let Some(lang) = args.lang {
        config.ocr.language = lang;
    }

    let app = QuizLensApp::new(config).await;
    info!("{} questions available", app.dataset().len());

    if let Some(text) = args.text {
        print!("{}", app.match_text(&text));
        return Ok(());
    }

    let photo = args
        .photo
        .ok_or_else(|| anyhow::anyhow!("Nothing to scan: pass --photo <PATH> or --text <TEXT>"))?;
    let pointer = args.pointer_x.zip(args.pointer_y);

    let mut session = app.session(Arc::new(StillImageCamera::new(photo)));
    let rendered = app.scan_once(&mut session, pointer).await?;
    print!("{}", rendered);

    Ok(())
}

/// Load configuration from file or fall back to defaults
fn load_or_default_config(path: Option<&std::path::Path>) -> AppConfig {
    if let Some(path) = path {
        if path.exists() {
            match config::load_config(path) {
                Ok(config) => {
                    info!("Loaded configuration from {:?}", path);
                    return config;
                }
                Err(e) => tracing::warn!("Ignoring unreadable config {:?}: {}", path, e),
            }
        }
    }
    info!("Using default configuration");
    AppConfig::default()
}
