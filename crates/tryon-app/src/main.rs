//! # Bracelet Try-On
//!
//! Command-line shell: loads a hand photo, places bracelets, replays a
//! pointer script and writes the flattened PNG.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tryon_app::{AppConfig, BraceletCatalog, PointerScript, SceneHost};
use tryon_render::{FsImageLoader, ImageSource};

/// Command-line arguments for bracelet-tryon.
#[derive(Debug, Clone, Parser)]
#[command(name = "bracelet-tryon")]
#[command(about = "Compose bracelets over a hand photo and export a PNG")]
#[command(version)]
struct CliArgs {
    /// Hand photo (PNG, JPEG or WebP)
    #[arg(long)]
    hand: Option<PathBuf>,

    /// Bracelet image file; may be repeated
    #[arg(long)]
    bracelet: Vec<PathBuf>,

    /// Bracelet id from the config catalog; may be repeated
    #[arg(long = "bracelet-id")]
    bracelet_id: Vec<String>,

    /// JSON array of pointer events to replay after placement
    #[arg(long)]
    script: Option<PathBuf>,

    /// Where to write the exported PNG (defaults to the configured file name)
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// JSON config file
    #[arg(long, env = "TRYON_CONFIG", default_value = "tryon.json")]
    config: PathBuf,

    /// Canvas width in pixels
    #[arg(long)]
    width: Option<u32>,

    /// Canvas height in pixels
    #[arg(long)]
    height: Option<u32>,

    /// Export pixel ratio
    #[arg(long)]
    pixel_ratio: Option<f64>,

    /// List catalog bracelets and exit
    #[arg(long)]
    list: bool,
}

impl CliArgs {
    /// Apply command-line overrides on top of the config file.
    fn apply(&self, config: &mut AppConfig) {
        if let Some(width) = self.width {
            config.canvas_width = width;
        }
        if let Some(height) = self.height {
            config.canvas_height = height;
        }
        if let Some(ratio) = self.pixel_ratio {
            config.session.export_pixel_ratio = ratio;
        }
    }

    /// Bracelet sources in command-line order: catalog ids first, then files.
    fn bracelet_sources(&self, catalog: &BraceletCatalog) -> anyhow::Result<Vec<ImageSource>> {
        let mut sources = Vec::with_capacity(self.bracelet_id.len() + self.bracelet.len());
        for id in &self.bracelet_id {
            sources.push(catalog.get(id)?.source());
        }
        sources.extend(self.bracelet.iter().cloned().map(ImageSource::Path));
        Ok(sources)
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    log::info!("Starting bracelet-tryon");

    let args = CliArgs::parse();
    let mut config = AppConfig::load(&args.config)
        .with_context(|| format!("Failed to load config {}", args.config.display()))?;
    args.apply(&mut config);
    let catalog = config.catalog();

    if args.list {
        for entry in catalog.entries() {
            println!("{}\t{}\t{}", entry.id, entry.name, entry.path.display());
        }
        return Ok(());
    }

    let sources = args.bracelet_sources(&catalog)?;
    let script = match &args.script {
        Some(path) => PointerScript::load(path).with_context(|| format!("Failed to read {}", path.display()))?,
        None => PointerScript::default(),
    };

    let mut host = SceneHost::new(&config)?;
    let loader = FsImageLoader::new();

    pollster::block_on(async {
        if let Some(hand) = &args.hand {
            host.load_background(&loader, &ImageSource::Path(hand.clone()))
                .await
                .with_context(|| format!("Failed to load hand photo {}", hand.display()))?;
        }
        for source in &sources {
            host.add_overlay_from(&loader, source)
                .await
                .with_context(|| format!("Failed to load bracelet {}", source.describe()))?;
        }
        anyhow::Ok(())
    })?;

    log::debug!("Replaying {} pointer event(s)", script.len());
    for event in &script.events {
        host.pointer(*event)?;
    }

    let exported = host.export()?;
    for warning in host.warnings() {
        eprintln!("{}", warning);
    }
    let Some(blob) = exported else {
        anyhow::bail!("Nothing was exported");
    };

    let output = args.output.unwrap_or_else(|| PathBuf::from(&blob.file_name));
    std::fs::write(&output, &blob.bytes).with_context(|| format!("Failed to write {}", output.display()))?;
    println!("Wrote {} ({}x{}, {} bytes)", output.display(), blob.width, blob.height, blob.len());
    Ok(())
}
