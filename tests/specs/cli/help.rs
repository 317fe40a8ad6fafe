//! Help and version output.

use crate::prelude::*;

#[test]
fn help_lists_commands() {
    cli()
        .args(&["--help"])
        .passes()
        .stdout_has("Usage:")
        .stdout_has("watch")
        .stdout_has("status")
        .stdout_has("retry")
        .stdout_has("cancel")
        .stdout_has("logs")
        .stdout_has("forget");
}

#[test]
fn version_shows_package_version() {
    cli().args(&["--version"]).passes().stdout_has("dubwatch 0.2");
}

#[test]
fn watch_help_mentions_saved_job() {
    cli().args(&["watch", "--help"]).passes().stdout_has("saved job");
}

#[test]
fn logs_help_mentions_export_file() {
    cli().args(&["logs", "--help"]).passes().stdout_has("--file").stdout_has("job-<ID>-logs.json");
}

#[test]
fn output_flag_rejects_unknown_format() {
    cli().args(&["-o", "yaml", "forget"]).fails_with(2).stderr_has("yaml");
}
