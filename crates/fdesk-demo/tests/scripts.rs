//! End-to-end runs of both scripted sessions through the CLI entry point.

use std::fs;

use fdesk_demo::cli::{Cli, Commands, JobFormArgs, ModesArgs};
use fdesk_demo::{DemoError, run};
use tempfile::tempdir;

fn cli(command: Commands) -> Cli {
    Cli {
        config: None,
        json_logs: false,
        width: 72,
        height: 24,
        command,
    }
}

fn output(cli: Cli) -> String {
    let mut out = Vec::new();
    run(cli, &mut out).expect("script runs");
    String::from_utf8(out).expect("utf-8 frames")
}

#[test]
fn job_form_prints_each_step_and_final_values() {
    let text = output(cli(Commands::JobForm(JobFormArgs::default())));
    for heading in [
        "── empty job form",
        "── shipper search in flight",
        "── carriers for seaways",
        "── quick add needs a party type",
        "── created party selected",
    ] {
        assert!(text.contains(heading), "missing frame {heading:?}");
    }
    assert!(text.contains("Quick Add Party"));
    assert!(text.contains("Nordic Foods"));
    assert!(text.contains(r#""shipper_id": "108""#));
}

#[test]
fn json_config_labels_reach_the_selectors() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("widgets.json");
    fs::write(&path, r#"{"no_results_label": "Nothing on file", "debounce_ms": 120}"#).unwrap();

    let mut cli = cli(Commands::JobForm(JobFormArgs::default()));
    cli.config = Some(path);
    let text = output(cli);
    assert!(text.contains("Nothing on file"));
}

#[test]
fn invalid_config_is_a_usage_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("widgets.toml");
    fs::write(&path, "debounce_ms = 99999\n").unwrap();

    let mut cli = cli(Commands::Modes(ModesArgs::default()));
    cli.config = Some(path);
    let error = run(cli, &mut Vec::new()).unwrap_err();
    assert!(matches!(error, DemoError::Config(_)));
    assert_eq!(error.exit_code(), 2);
}

#[test]
fn modes_page_size_flag_splits_the_table() {
    let text = output(cli(Commands::Modes(ModesArgs { page_size: Some(3) })));
    assert!(text.contains("Page 1 of 3"));
    assert!(text.contains("Page 2 of 3"));
    assert!(text.contains("activated seaways"));
}
