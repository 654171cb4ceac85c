use std::io::Write;
use std::process::Command;

fn craf() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_craf"));
    cmd.env_remove("CRAF_BACKEND").env_remove("RUST_LOG");
    cmd
}

#[test]
fn translates_request_file_to_document_query() {
    let mut request = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
    writeln!(
        request,
        "backend: document\nparams:\n  filter: \"(a:1 OR b:2)\"\n  sort: \"name:asc\"\n  limit: \"10\""
    )
    .unwrap();

    let output = craf()
        .arg("--request")
        .arg(request.path())
        .arg("--verbose")
        .output()
        .expect("failed to execute process");

    assert!(output.status.success());

    let query: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(query["limit"], 10);
    assert_eq!(query["skip"], 0);
    assert_eq!(query["sort"]["name"], 1);
    assert!(query["projection"].is_null());

    let clauses = query["filter"]["$or"].as_array().unwrap();
    assert_eq!(clauses.len(), 2);
    assert_eq!(clauses[0]["a"], 1.0);
    assert_eq!(clauses[1]["b"], 2.0);
}

#[test]
fn prints_search_query_string() {
    let output = craf()
        .args(["--backend", "search"])
        .args(["--filter", "name number:!=4"])
        .args(["--default-operator", "or"])
        .output()
        .expect("failed to execute process");

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert_eq!(
        stdout.trim_end(),
        "?&from=0&size=50&sort=&_source=&default_operator=OR&q=name%20!(number:4)"
    );
}

#[test]
fn backend_can_come_from_environment() {
    let output = craf()
        .env("CRAF_BACKEND", "elasticsearch")
        .args(["--filter", "name:boo"])
        .output()
        .expect("failed to execute process");

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.starts_with("?&from=0"), "{stdout}");
}

#[test]
fn rejects_invalid_parameter() {
    let output = craf()
        .args(["--sort", "name:middle"])
        .output()
        .expect("failed to execute process");

    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(
        stderr.contains("invalid value for parameter 'sort': 'name:middle'"),
        "{stderr}"
    );
}
