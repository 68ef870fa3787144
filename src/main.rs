use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;

use photext::ocr::TesseractEngine;

#[derive(Parser, Debug)]
#[command(
    name = "photext",
    version,
    about = "Detect text overlays in images and erase them by inpainting"
)]
struct Cli {
    /// Address to listen on (default from settings: 0.0.0.0:5000)
    #[arg(short = 'a', long = "addr")]
    addr: Option<String>,

    /// Tesseract language list, e.g. "eng" or "eng+deu"
    #[arg(short = 'l', long = "ocr-lang")]
    ocr_lang: Option<String>,

    /// Read extra settings from a local TOML file
    #[arg(short = 'r', long = "read-settings")]
    read_settings: Option<String>,

    /// Enable verbose logging
    #[arg(long = "verbose")]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    photext::logging::init(cli.verbose)?;

    let settings_path = cli.read_settings.as_deref().map(Path::new);
    let mut settings = photext::settings::load_settings(settings_path)?;
    if let Some(addr) = cli.addr {
        settings.server_addr = addr;
    }
    if let Some(languages) = cli.ocr_lang {
        settings.ocr_languages = languages;
    }

    let engine = TesseractEngine::new(
        &settings.ocr_languages,
        settings.ocr_psm,
        settings.ocr_invert_retry,
    )?;
    photext::server::run_server(settings, Arc::new(engine)).await
}
