//! CLI surface specs: help text and `version` output that don't require a
//! running supervisor or any host infrastructure.

use crate::support::{AssertStdioExt, Fixture, OutputAssertExt};

#[test]
fn no_args_shows_usage_and_exits_nonzero() {
    let fixture = Fixture::new();
    fixture.nodeagent().fails().stderr_has("Usage:");
}

#[test]
fn help_shows_usage_and_subcommands() {
    let fixture = Fixture::new();
    fixture
        .nodeagent()
        .arg("--help")
        .passes()
        .stdout_has("Usage:")
        .stdout_has("agent")
        .stdout_has("unbootstrap")
        .stdout_has("apply")
        .stdout_has("version")
        .stdout_has("token");
}

#[test]
fn apply_help_documents_the_file_flag() {
    let fixture = Fixture::new();
    fixture.nodeagent().args(["apply", "--help"]).passes().stdout_has("--file");
}

#[test]
fn version_prints_the_package_version() {
    let fixture = Fixture::new();
    fixture.nodeagent().arg("version").passes().stdout_has(env!("CARGO_PKG_VERSION"));
}

#[test]
fn version_embeds_a_build_hash_suffix() {
    let fixture = Fixture::new();
    fixture.nodeagent().arg("version").passes().stdout_has("+");
}
