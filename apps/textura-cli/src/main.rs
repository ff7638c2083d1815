use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use textura_fonts::DirectorySource;
use textura_input::FieldInput;
use textura_kernel::{Engine, EngineConfig};
use textura_render::FontdueSurface;
use textura_store::{FieldStore, JsonFileStorage};

#[derive(Parser)]
#[command(name = "textura-cli", about = "Render text into textures")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Directory holding the persisted fields
    #[arg(long, default_value = ".textura")]
    data_dir: PathBuf,

    /// Engine config file (JSON)
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and crate info
    Info,
    /// Print the persisted field values
    Show,
    /// Apply field changes and rasterize the texture to a PNG
    Render {
        #[arg(long)]
        text: Option<String>,
        #[arg(long)]
        font_family: Option<String>,
        /// Font size in pixels (clamped to 1..=64)
        #[arg(long)]
        font_size: Option<String>,
        /// CSS weight (clamped to 100..=900)
        #[arg(long)]
        font_weight: Option<String>,
        /// Hex color: #RGB, #RRGGBB or #RRGGBBAA
        #[arg(long)]
        color: Option<String>,
        #[arg(long)]
        marquee: Option<bool>,
        /// Directory with one sub-directory of font files per family
        #[arg(long, default_value = "fonts")]
        fonts_dir: PathBuf,
        /// Font file used for system-ui and the sans-serif fallback
        #[arg(long)]
        system_font: Option<PathBuf>,
        /// Output PNG path
        #[arg(short, long, default_value = "texture.png")]
        output: PathBuf,
        /// Print a text preview of the texture
        #[arg(long)]
        preview: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    let config = match &cli.config {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => EngineConfig::default(),
    };

    match cli.command {
        Commands::Info => {
            println!("textura-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("common: {}", textura_common::crate_info());
            println!("store: {}", textura_store::crate_info());
            println!("input: {}", textura_input::crate_info());
            println!("fonts: {}", textura_fonts::crate_info());
            println!("render: {}", textura_render::crate_info());
            println!("kernel: {}", textura_kernel::crate_info());
            println!("font provider: {}", config.font_provider);
        }
        Commands::Show => {
            let storage = JsonFileStorage::open(&cli.data_dir)?;
            println!("Fields ({}):", storage.path().display());
            let store = FieldStore::open(Box::new(storage), &config.defaults);
            println!("  text: {:?}", store.text());
            println!("  color: {}", store.color());
            println!("  fontWeight: {}", store.font_weight().get());
            println!("  fontFamily: {:?}", store.font_family());
            println!("  fontSize: {}", store.font_size());
            println!("  fontEmbed: {}", store.font_embed().unwrap_or("null"));
            println!("  textureMarquee: {}", store.texture_marquee());
        }
        Commands::Render {
            text,
            font_family,
            font_size,
            font_weight,
            color,
            marquee,
            fonts_dir,
            system_font,
            output,
            preview,
        } => {
            let surface = match &system_font {
                Some(path) => {
                    let data = std::fs::read(path)
                        .with_context(|| format!("reading system font {}", path.display()))?;
                    FontdueSurface::with_system_font(&data)?
                }
                None => FontdueSurface::new(),
            };
            let storage = JsonFileStorage::open(&cli.data_dir)?;
            let mut engine = Engine::start(
                &config,
                Box::new(storage),
                surface,
                DirectorySource::new(fonts_dir),
            );

            let inputs = [
                text.map(FieldInput::Text),
                font_family.map(FieldInput::FontFamily),
                font_size.map(FieldInput::FontSize),
                font_weight.map(FieldInput::FontWeight),
                color.map(FieldInput::Color),
                marquee.map(FieldInput::TextureMarquee),
            ];
            for input in inputs.into_iter().flatten() {
                engine.input(input);
            }
            let elapsed = engine.run_until_idle();
            engine.shutdown();
            tracing::debug!(?elapsed, "engine settled");

            let stats = engine.texture_stats();
            println!("Font: {} ({})", engine.store().font_family(), engine.font_state());
            println!("Texture Size: {stats}");

            let texture = engine.texture();
            if texture.is_empty() {
                println!("Texture is empty; nothing written");
            } else {
                write_png(&output, texture.width(), texture.height(), texture.as_bytes())?;
                println!("Wrote {}", output.display());
            }
            if preview {
                print!("{}", textura_render::ascii_preview(texture, 80));
            }
        }
    }

    Ok(())
}

fn write_png(path: &Path, width: u32, height: u32, rgba: &[u8]) -> anyhow::Result<()> {
    let image = image::RgbaImage::from_raw(width, height, rgba.to_vec())
        .context("pixel buffer does not match texture size")?;
    image
        .save_with_format(path, image::ImageFormat::Png)
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}
