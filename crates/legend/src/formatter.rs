use crate::config::{OutputConfig, OutputFormat};
use legend_core::{FoundType, Resolution};

pub fn format_resolution(
    resolution: &Resolution,
    options: &OutputConfig,
) -> Result<String, serde_json::Error> {
    match options.format {
        OutputFormat::Json => serde_json::to_string(resolution),
        OutputFormat::Text => Ok(format_text(resolution, options.show_found_by)),
    }
}

fn format_text(resolution: &Resolution, show_found_by: bool) -> String {
    match resolution {
        Resolution::Found { locator, control } => {
            let mut output = format!("Resolved '{}' -> {}", locator, control);
            if control.disabled {
                output.push_str(" (disabled)");
            }
            if show_found_by && control.found_by.len() > 1 {
                output.push_str(&format!("\n  found by: {}", join(&control.found_by)));
            }
            output
        }
        Resolution::NotFound { .. } | Resolution::Ambiguous { .. } => {
            match resolution.clone().into_control() {
                Err(err) => format!("Error: {}", err),
                Ok(control) => control.to_string(),
            }
        }
    }
}

fn join(found_by: &[FoundType]) -> String {
    found_by
        .iter()
        .map(|f| f.name())
        .collect::<Vec<_>>()
        .join(", ")
}
