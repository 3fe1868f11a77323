use crate::config::OutputConfig;
use crate::formatter::format_resolution;
use legend_common::PageSnapshot;
use legend_core::{DocumentProvider, ResolutionError, Session, TargetRequirement};
use std::path::Path;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("Invalid page snapshot {path}: {source}")]
    Page {
        path: String,
        source: serde_json::Error,
    },
    #[error("Failed to format output: {0}")]
    Format(#[from] serde_json::Error),
    #[error("Step on line {line} failed: {source}")]
    Step {
        line: usize,
        source: ResolutionError,
    },
}

#[derive(Clone, Copy)]
pub struct OutputHandlers {
    pub out: fn(&str),
    pub err: fn(&str),
}

pub struct FileOptions {
    pub stop_on_error: bool,
    /// Requirement for steps without a `requirement:` prefix.
    pub default_requirement: TargetRequirement,
}

/// One locator line of a step file.
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub line: usize,
    pub requirement: TargetRequirement,
    pub locator: String,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct StepReport {
    pub passed: usize,
    pub failed: usize,
    /// Line of the failing step that ended the run early.
    pub stopped_at: Option<usize>,
}

impl StepReport {
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }
}

pub async fn load_page(path: &Path) -> Result<PageSnapshot, CliError> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| CliError::Io {
            path: path.display().to_string(),
            source,
        })?;
    PageSnapshot::from_json(&content).map_err(|source| CliError::Page {
        path: path.display().to_string(),
        source,
    })
}

/// Parse one step line. Blank lines and `#` comments yield `None`.
///
/// A leading `typeable:` (or any other requirement name) narrows the step;
/// anything else before a colon is part of the locator.
pub fn parse_step(line_no: usize, line: &str, default: TargetRequirement) -> Option<Step> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return None;
    }

    if let Some((prefix, rest)) = trimmed.split_once(':')
        && let Ok(requirement) = prefix.parse::<TargetRequirement>()
        && !rest.trim().is_empty()
    {
        return Some(Step {
            line: line_no,
            requirement,
            locator: rest.trim().to_string(),
        });
    }

    Some(Step {
        line: line_no,
        requirement: default,
        locator: trimmed.to_string(),
    })
}

pub fn parse_steps(content: &str, default: TargetRequirement) -> Vec<Step> {
    content
        .lines()
        .enumerate()
        .filter_map(|(i, line)| parse_step(i + 1, line, default))
        .collect()
}

/// Resolve every step of a file against the session's page.
///
/// Invalid locators and stale pages abort with an error. Not-found and
/// ambiguous steps are counted as failures; with `stop_on_error` the first one
/// ends the run and is recorded in [`StepReport::stopped_at`].
pub async fn run_file<P: DocumentProvider>(
    session: &mut Session<P>,
    output: OutputHandlers,
    output_config: &OutputConfig,
    path: &Path,
    options: FileOptions,
) -> Result<StepReport, CliError> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| CliError::Io {
            path: path.display().to_string(),
            source,
        })?;
    run_steps(
        session,
        output,
        output_config,
        &parse_steps(&content, options.default_requirement),
        options.stop_on_error,
    )
}

pub fn run_steps<P: DocumentProvider>(
    session: &mut Session<P>,
    output: OutputHandlers,
    output_config: &OutputConfig,
    steps: &[Step],
    stop_on_error: bool,
) -> Result<StepReport, CliError> {
    let mut report = StepReport::default();

    for step in steps {
        debug!(line = step.line, locator = %step.locator, "Running step");
        let resolution = session
            .resolve(&step.locator, step.requirement)
            .map_err(|source| CliError::Step {
                line: step.line,
                source,
            })?;
        let formatted = format_resolution(&resolution, output_config)?;

        match resolution.into_control() {
            Ok(_) => {
                report.passed += 1;
                (output.out)(&formatted);
            }
            Err(_) => {
                report.failed += 1;
                (output.err)(&format!("Line {}: {}", step.line, formatted));
                if stop_on_error {
                    report.stopped_at = Some(step.line);
                    break;
                }
            }
        }
    }

    Ok(report)
}
