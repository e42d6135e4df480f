//! `nodeagent apply` specs: document parsing and dispatch-failure
//! reporting. None of these start a real supervisor, so every dispatch
//! call below exercises the "no one is listening on the socket" path.

use crate::support::{AssertStdioExt, Fixture, OutputAssertExt};

#[test]
fn malformed_json_is_rejected_before_any_dispatch_attempt() {
    let fixture = Fixture::new();
    let doc = fixture.write_file("doc.json", "not json");

    fixture
        .nodeagent()
        .args(["apply", "-f"])
        .arg(&doc)
        .fails()
        .stdout_has("malformed action document");
}

#[test]
fn missing_file_is_reported_as_an_io_error() {
    let fixture = Fixture::new();

    fixture
        .nodeagent()
        .args(["apply", "-f", "/nonexistent/doc.json"])
        .fails()
        .stdout_has("io error");
}

#[test]
fn a_single_document_fails_with_no_daemon_listening() {
    let fixture = Fixture::new();
    let doc = fixture.write_file(
        "doc.json",
        r#"{"metadata": {"type": "type.googleapis.com/nodeagent.v1.ConfigureBaseOS", "name": "configure-os"}, "spec": {}}"#,
    );

    fixture
        .nodeagent()
        .args(["apply", "-f"])
        .arg(&doc)
        .fails()
        .stdout_has("connecting to");
}

#[test]
fn an_array_document_stops_at_the_first_failure() {
    let fixture = Fixture::new();
    let doc = fixture.write_file(
        "doc.json",
        r#"[
            {"metadata": {"type": "type.googleapis.com/nodeagent.v1.ConfigureBaseOS", "name": "configure-os"}, "spec": {}},
            {"metadata": {"type": "type.googleapis.com/nodeagent.v1.DownloadCRIBinaries", "name": "download-cri"}, "spec": {}}
        ]"#,
    );

    fixture
        .nodeagent()
        .args(["apply", "--progress", "-f"])
        .arg(&doc)
        .fails()
        .stdout_has("applying 2 action document(s)")
        .stdout_has("[1/2]")
        .stdout_has("FAILED");
}

#[test]
fn stdin_is_accepted_with_a_dash() {
    let fixture = Fixture::new();

    fixture
        .nodeagent()
        .args(["apply", "-f", "-"])
        .write_stdin(
            r#"{"metadata": {"type": "type.googleapis.com/nodeagent.v1.ConfigureBaseOS", "name": "configure-os"}, "spec": {}}"#,
        )
        .fails()
        .stdout_has("connecting to");
}
