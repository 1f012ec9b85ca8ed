//! Panel Probe
//!
//! Converts images into every RGB565 variant so the right one for a display
//! can be picked by flashing each to the hardware.

mod batch;
mod config;
mod readme;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use panel_probe_core::{Mode, RawBuffer};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

use config::Config;

/// Parsed as one comma-separated value rather than repeated flags.
type ModeList = Vec<Mode>;

#[derive(Parser)]
#[command(name = "panelprobe")]
#[command(about = "Generate RGB565 RAW test assets for embedded displays")]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert all input images under every configured mode (default)
    Convert(ConvertArgs),
    /// List the eight pixel format modes
    Modes,
    /// Render a RAW file to PNG as a panel using the given mode would show it
    Preview {
        /// RAW file to decode
        raw: PathBuf,

        /// Mode the RAW file is interpreted with (0-7)
        #[arg(short, long, default_value = "0")]
        mode: Mode,

        /// Width in pixels (default: configured width)
        #[arg(long)]
        width: Option<u32>,

        /// Height in pixels (default: configured height)
        #[arg(long)]
        height: Option<u32>,

        /// Output PNG path (default: preview.png)
        #[arg(short, long, default_value = "preview.png")]
        output: PathBuf,
    },
    /// Write the effective configuration as TOML
    DumpConfig {
        /// Output file path (default: panelprobe.toml)
        #[arg(default_value = "panelprobe.toml")]
        output: PathBuf,
    },
}

#[derive(Args, Default)]
struct ConvertArgs {
    /// Input image directory
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Output directory (cleared on every run)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Target width in pixels
    #[arg(long)]
    width: Option<u32>,

    /// Target height in pixels
    #[arg(long)]
    height: Option<u32>,

    /// Comma-separated mode list, e.g. "0,4"
    #[arg(long, value_parser = panel_probe_core::parse_mode_list)]
    modes: Option<ModeList>,

    /// Skip images that fail to decode instead of aborting
    #[arg(long)]
    skip_unreadable: bool,
}

impl ConvertArgs {
    /// Applies command-line overrides on top of a loaded configuration.
    fn apply(self, mut config: Config) -> Config {
        if let Some(input) = self.input {
            config.input = input;
        }
        if let Some(output) = self.output {
            config.output = output;
        }
        if let Some(width) = self.width {
            config.width = width;
        }
        if let Some(height) = self.height {
            config.height = height;
        }
        if let Some(modes) = self.modes {
            config.modes = modes.iter().map(Mode::index).collect();
        }
        if self.skip_unreadable {
            config.skip_unreadable = true;
        }
        config
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = match &cli.config {
        Some(path) => {
            let config = Config::load(path)
                .with_context(|| format!("Failed to load configuration {}", path.display()))?;
            info!("Loaded configuration from: {}", path.display());
            config
        }
        None => Config::default(),
    };

    match cli.command.unwrap_or(Commands::Convert(ConvertArgs::default())) {
        Commands::Convert(args) => handle_convert(args.apply(config)),
        Commands::Modes => {
            handle_modes();
            Ok(())
        }
        Commands::Preview {
            raw,
            mode,
            width,
            height,
            output,
        } => handle_preview(
            &raw,
            mode,
            width.unwrap_or(config.width),
            height.unwrap_or(config.height),
            &output,
        ),
        Commands::DumpConfig { output } => {
            config.save(&output)?;
            println!("Configuration written to: {}", output.display());
            Ok(())
        }
    }
}

fn handle_convert(config: Config) -> Result<()> {
    let report = batch::run(&config).context("Conversion failed")?;

    println!();
    println!("Conversion complete:");
    println!("  Images: {}", report.images);
    if !report.skipped.is_empty() {
        println!("  Skipped: {}", report.skipped.len());
        for path in &report.skipped {
            println!("    {}", path.display());
        }
    }
    println!(
        "  Modes: {}",
        report
            .modes
            .iter()
            .map(Mode::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    );
    println!("  RAW files: {}", report.files_written);
    if report.generated_test_pattern {
        println!("  Test pattern generated in {}", config.input.display());
    }
    println!();
    println!("Next steps:");
    println!(
        "  1. Flash each {}/mode_* directory to your device",
        config.output.display()
    );
    println!("  2. Pick the mode with pure primaries and a non-inverted gradient");
    println!(
        "  3. See {} for details",
        config.output.join(readme::README_NAME).display()
    );
    Ok(())
}

fn handle_modes() {
    println!("Modes:");
    for mode in Mode::all() {
        println!(
            "  {}  {:<28} {}",
            mode.index(),
            mode.description(),
            mode.layout()
        );
    }
}

fn handle_preview(raw: &Path, mode: Mode, width: u32, height: u32, output: &Path) -> Result<()> {
    let buffer = RawBuffer::load(raw, width, height)
        .with_context(|| format!("Failed to read {} as {}x{} RAW", raw.display(), width, height))?;
    let rgb = buffer.to_rgb_image(mode)?;

    let mut png_data = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut png_data, width, height);
        encoder.set_color(png::ColorType::Rgb);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder.write_header()?;
        writer.write_image_data(rgb.as_raw())?;
    }
    std::fs::write(output, &png_data).context("Failed to write preview file")?;
    println!(
        "Preview ({}) saved to: {}",
        mode.description(),
        output.display()
    );
    Ok(())
}
