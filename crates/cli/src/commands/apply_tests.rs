use super::*;

#[test]
fn parses_a_single_object_document() {
    let json = br#"{"metadata": {"type": "type.googleapis.com/nodeagent.v1.ConfigureBaseOS", "name": "configure-os"}, "spec": {"packages": ["conntrack"]}}"#;
    let envelopes = parse_documents(json).unwrap();
    assert_eq!(envelopes.len(), 1);
    assert_eq!(envelopes[0].metadata.type_url.as_str(), "type.googleapis.com/nodeagent.v1.ConfigureBaseOS");
}

#[test]
fn parses_an_array_of_documents_in_order() {
    let json = br#"[
        {"metadata": {"type": "type.googleapis.com/nodeagent.v1.ConfigureBaseOS", "name": "configure-os"}, "spec": {}},
        {"metadata": {"type": "type.googleapis.com/nodeagent.v1.DownloadCRIBinaries", "name": "download-cri"}, "spec": {}}
    ]"#;
    let envelopes = parse_documents(json).unwrap();
    assert_eq!(envelopes.len(), 2);
    assert_eq!(envelopes[0].metadata.name.0, "configure-os");
    assert_eq!(envelopes[1].metadata.name.0, "download-cri");
}

#[test]
fn rejects_malformed_json() {
    let err = parse_documents(b"not json").unwrap_err();
    assert!(matches!(err, NodeAgentError::InvalidArgument(_)));
}

#[test]
fn tolerates_unknown_fields() {
    let json = br#"{"metadata": {"type": "type.googleapis.com/nodeagent.v1.ConfigureBaseOS", "name": "configure-os"}, "spec": {}, "extra": "ignored"}"#;
    let envelopes = parse_documents(json).unwrap();
    assert_eq!(envelopes.len(), 1);
}

#[test]
fn reads_a_file_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("doc.json");
    std::fs::write(&path, b"{}").unwrap();
    let bytes = read_input(path.to_str().unwrap()).unwrap();
    assert_eq!(bytes, b"{}");
}

#[test]
fn missing_file_is_reported_as_io_error() {
    let err = read_input("/nonexistent/path/doc.json").unwrap_err();
    assert!(matches!(err, NodeAgentError::Io { .. }));
}
