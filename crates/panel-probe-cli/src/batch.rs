//! Batch conversion over an input directory.

use anyhow::{Context, Result};
use panel_probe_core::{encode_image, open_image, prepare, test_pattern, Error, Mode};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::readme;

/// Extensions picked up from the input directory.
const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

/// File name of the generated test pattern.
pub const TEST_PATTERN_NAME: &str = "test_pattern.png";

/// Summary of a batch run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchReport {
    pub images: usize,
    pub skipped: Vec<PathBuf>,
    pub modes: Vec<Mode>,
    pub files_written: usize,
    pub generated_test_pattern: bool,
}

/// Converts every input image under every configured mode.
pub fn run(config: &Config) -> Result<BatchReport> {
    let modes = config.resolved_modes()?;

    if !config.input.exists() {
        warn!(
            "Input directory {} not found, creating it",
            config.input.display()
        );
        std::fs::create_dir_all(&config.input).with_context(|| {
            format!("Failed to create input directory {}", config.input.display())
        })?;
    }

    let mut inputs = find_images(&config.input)?;
    let generated_test_pattern = inputs.is_empty();
    if generated_test_pattern {
        warn!(
            "No images in {}, adding test pattern",
            config.input.display()
        );
        inputs.push(write_test_pattern(config)?);
    }
    info!(
        "Found {} image(s), testing modes {:?}",
        inputs.len(),
        modes.iter().map(Mode::index).collect::<Vec<_>>()
    );

    reset_output(&config.output, &modes)?;

    let mut report = BatchReport {
        images: 0,
        skipped: Vec::new(),
        modes: modes.clone(),
        files_written: 0,
        generated_test_pattern,
    };

    let raw_names = raw_names(&inputs);
    for (path, raw_name) in inputs.iter().zip(&raw_names) {
        let source = match open_image(path) {
            Ok(image) => image,
            Err(e) if config.skip_unreadable => {
                warn!("Skipping {}: {}", path.display(), e);
                report.skipped.push(path.clone());
                continue;
            }
            Err(e) => return Err(e.into()),
        };
        let prepared = prepare(&source, config.width, config.height)?;

        for mode in &modes {
            let raw = encode_image(&prepared, *mode);
            let raw_path = config
                .output
                .join(mode.dir_name())
                .join(raw_name);
            raw.save(&raw_path)
                .with_context(|| format!("Failed to write {}", raw_path.display()))?;
            report.files_written += 1;
            debug!("{} -> {}", path.display(), raw_path.display());
        }
        info!("Converted {}", path.display());
        report.images += 1;
    }

    let output_name = config
        .output
        .file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "assets".to_string());
    let text = readme::render(
        &modes,
        report.images,
        config.width,
        config.height,
        &output_name,
    )
    .context("Failed to render usage instructions")?;
    let readme_path = config.output.join(readme::README_NAME);
    std::fs::write(&readme_path, text)
        .with_context(|| format!("Failed to write {}", readme_path.display()))?;

    Ok(report)
}

/// Lists supported images in `dir`, sorted by path.
pub fn find_images(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read input directory {}", dir.display()))?;
    let mut images = Vec::new();
    for entry in entries {
        let path = entry?.path();
        if path.is_file() && is_supported_image(&path) {
            images.push(path);
        }
    }
    images.sort();
    Ok(images)
}

/// Picks the output file name for each input: `<stem>.raw`, or
/// `<stem>.<ext>.raw` when several inputs share a stem.
fn raw_names(inputs: &[PathBuf]) -> Vec<String> {
    let stem_of = |path: &PathBuf| {
        path.file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string())
    };
    let mut counts: HashMap<String, usize> = HashMap::new();
    for path in inputs {
        *counts.entry(stem_of(path)).or_default() += 1;
    }
    inputs
        .iter()
        .map(|path| {
            let stem = stem_of(path);
            if counts[&stem] > 1 {
                let file_name = path.file_name().map(|s| s.to_string_lossy().into_owned());
                let name = format!("{}.raw", file_name.unwrap_or(stem));
                warn!(
                    "Several inputs share the name stem of {}, writing {}",
                    path.display(),
                    name
                );
                name
            } else {
                format!("{stem}.raw")
            }
        })
        .collect()
}

fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            IMAGE_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
        .unwrap_or(false)
}

fn write_test_pattern(config: &Config) -> Result<PathBuf> {
    let path = config.input.join(TEST_PATTERN_NAME);
    test_pattern(config.width, config.height)
        .save(&path)
        .map_err(|e| {
            warn!("Failed to save test pattern {}: {}", path.display(), e);
            Error::EmptyInput(config.input.clone())
        })?;
    info!("Generated test pattern: {}", path.display());
    Ok(path)
}

/// Removes the output tree and recreates one directory per mode.
fn reset_output(output: &Path, modes: &[Mode]) -> Result<()> {
    match std::fs::remove_dir_all(output) {
        Ok(()) => debug!("Cleared {}", output.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => {
            return Err(Error::Io(e))
                .with_context(|| format!("Failed to clear {}", output.display()))
        }
    }
    for mode in modes {
        let dir = output.join(mode.dir_name());
        std::fs::create_dir_all(&dir)
            .map_err(Error::Io)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
    }
    Ok(())
}
