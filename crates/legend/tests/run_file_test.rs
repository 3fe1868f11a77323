use legend::cli::{self, CliError, FileOptions, OutputHandlers, StepReport};
use legend::config::OutputConfig;
use legend_core::{ResolutionEngine, ResolutionError, Session, StaticProvider, TargetRequirement};
use std::cell::Cell;
use std::path::Path;
use tokio::fs;

const PAGE: &str = r#"{
  "url": "https://example.com/login",
  "generation": 1,
  "nodes": [
    {"kind": "element", "id": 1, "tag": "div", "children": [
      {"kind": "text", "text": "User Name:"},
      {"kind": "element", "id": 2, "tag": "input", "attributes": {"name": "user"}}
    ]},
    {"kind": "element", "id": 3, "tag": "div", "children": [
      {"kind": "element", "id": 4, "tag": "input", "attributes": {"type": "checkbox"}},
      {"kind": "text", "text": "Remember me"}
    ]},
    {"kind": "element", "id": 5, "tag": "button", "children": [{"kind": "text", "text": "Log in"}]},
    {"kind": "element", "id": 6, "tag": "button", "children": [{"kind": "text", "text": "Log in"}]}
  ]
}"#;

fn discard(_: &str) {}

const QUIET: OutputHandlers = OutputHandlers {
    out: discard,
    err: discard,
};

thread_local! {
    static ERRORS_PRINTED: Cell<usize> = const { Cell::new(0) };
}

fn count_error(_: &str) {
    ERRORS_PRINTED.with(|n| n.set(n.get() + 1));
}

async fn session(dir: &Path) -> Session<StaticProvider> {
    let page_path = dir.join("page.json");
    fs::write(&page_path, PAGE).await.unwrap();
    let snapshot = cli::load_page(&page_path).await.unwrap();
    Session::new(StaticProvider::new(snapshot), ResolutionEngine::default())
}

async fn run(dir: &Path, steps: &str, stop_on_error: bool) -> Result<StepReport, CliError> {
    run_with(dir, steps, stop_on_error, QUIET).await
}

async fn run_with(
    dir: &Path,
    steps: &str,
    stop_on_error: bool,
    output: OutputHandlers,
) -> Result<StepReport, CliError> {
    let steps_path = dir.join("steps.txt");
    fs::write(&steps_path, steps).await.unwrap();
    let mut session = session(dir).await;
    cli::run_file(
        &mut session,
        output,
        &OutputConfig::default(),
        &steps_path,
        FileOptions {
            stop_on_error,
            default_requirement: TargetRequirement::Any,
        },
    )
    .await
}

#[tokio::test]
async fn test_all_steps_pass() {
    let temp_dir = tempfile::tempdir().unwrap();
    let steps = "# login flow\ntypeable: User Name\ncheckable: Remember me\n";

    let report = run(temp_dir.path(), steps, true).await.unwrap();
    assert_eq!(
        report,
        StepReport {
            passed: 2,
            failed: 0,
            stopped_at: None
        }
    );
    assert!(report.is_success());
}

#[tokio::test]
async fn test_ambiguous_step_stops_run() {
    let temp_dir = tempfile::tempdir().unwrap();
    let steps = "User Name\nLog in\nRemember me\n";

    let report = run(temp_dir.path(), steps, true).await.unwrap();
    assert_eq!(
        report,
        StepReport {
            passed: 1,
            failed: 1,
            stopped_at: Some(2)
        }
    );
    assert!(!report.is_success());
}

#[tokio::test]
async fn test_failing_step_reported_once() {
    let temp_dir = tempfile::tempdir().unwrap();
    let output = OutputHandlers {
        out: discard,
        err: count_error,
    };

    let report = run_with(temp_dir.path(), "Log in\nRemember me\n", true, output)
        .await
        .unwrap();
    assert_eq!(report.stopped_at, Some(1));
    assert_eq!(ERRORS_PRINTED.with(Cell::get), 1);
}

#[tokio::test]
async fn test_keep_going_counts_failures() {
    let temp_dir = tempfile::tempdir().unwrap();
    let steps = "Log in\nForgot password\nRemember me\n";

    let report = run(temp_dir.path(), steps, false).await.unwrap();
    assert_eq!(
        report,
        StepReport {
            passed: 1,
            failed: 2,
            stopped_at: None
        }
    );
}

#[tokio::test]
async fn test_invalid_locator_always_aborts() {
    let temp_dir = tempfile::tempdir().unwrap();
    let steps = "Remember me\nLog\\in\n";

    let err = run(temp_dir.path(), steps, false).await.unwrap_err();
    assert!(matches!(
        err,
        CliError::Step {
            line: 2,
            source: ResolutionError::InvalidPattern(_)
        }
    ));
}

#[tokio::test]
async fn test_bad_page_snapshot() {
    let temp_dir = tempfile::tempdir().unwrap();
    let path = temp_dir.path().join("page.json");
    fs::write(&path, "{\"nodes\": 42}").await.unwrap();

    assert!(matches!(
        cli::load_page(&path).await,
        Err(CliError::Page { .. })
    ));
}
