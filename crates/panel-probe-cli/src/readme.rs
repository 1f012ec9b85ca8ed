//! HOW_TO_USE.txt generation.

use askama::Template;
use panel_probe_core::Mode;

/// File name written into the output root.
pub const README_NAME: &str = "HOW_TO_USE.txt";

/// One line of the mode table.
struct ModeEntry {
    index: u8,
    description: &'static str,
    layout: &'static str,
}

/// Usage instructions template.
#[derive(Template)]
#[template(path = "how_to_use.txt")]
struct HowToUseTemplate {
    modes: Vec<ModeEntry>,
    generated_modes: String,
    image_count: usize,
    width: u32,
    height: u32,
    output_name: String,
}

/// Renders the instructions. All eight modes are always listed; `generated`
/// names the ones actually written this run.
pub fn render(
    generated: &[Mode],
    image_count: usize,
    width: u32,
    height: u32,
    output_name: &str,
) -> askama::Result<String> {
    let template = HowToUseTemplate {
        modes: Mode::all()
            .map(|mode| ModeEntry {
                index: mode.index(),
                description: mode.description(),
                layout: mode.layout(),
            })
            .collect(),
        generated_modes: generated
            .iter()
            .map(Mode::to_string)
            .collect::<Vec<_>>()
            .join(", "),
        image_count,
        width,
        height,
        output_name: output_name.to_string(),
    };
    template.render()
}
