use serde_json::{Value, json};
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

fn run_bpaudit<I, S>(args: I) -> Output
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let bin = env!("CARGO_BIN_EXE_bpaudit");
    Command::new(bin)
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("bpaudit command should execute")
}

fn assert_success(output: &Output) {
    if !output.status.success() {
        panic!(
            "command failed with status {:?}\nstdout:\n{}\nstderr:\n{}",
            output.status.code(),
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr),
        );
    }
}

fn assert_exit(output: &Output, code: i32) {
    assert_eq!(
        output.status.code(),
        Some(code),
        "unexpected status\nstdout:\n{}\nstderr:\n{}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr),
    );
}

fn stdout_text(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn parse_json_stdout(output: &Output) -> Value {
    serde_json::from_slice::<Value>(&output.stdout).unwrap_or_else(|e| {
        panic!(
            "stdout should be json: {e}\nstdout:\n{}",
            String::from_utf8_lossy(&output.stdout)
        )
    })
}

fn write_json(dir: &Path, name: &str, value: &Value) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, serde_json::to_string_pretty(value).expect("fixture should serialize"))
        .expect("fixture should be written");
    path
}

fn full_auth() -> Value {
    json!({
        "tokenType": "bearer_jwt",
        "loginEndpoint": "POST /auth/login",
        "defaultEmail": "admin@example.com",
        "defaultPassword": "secret",
        "tokenResponsePath": "token"
    })
}

fn clean_blueprint() -> Value {
    json!({
        "repoName": "shop",
        "frameworks": ["express"],
        "auth": full_auth(),
        "endpoints": [
            {
                "id": "ep-items",
                "method": "GET",
                "path": "/api/items",
                "authRequired": false,
                "responseSchema": {"type": "array"}
            }
        ],
        "pages": []
    })
}

#[test]
fn clean_blueprint_exits_zero_with_full_score() {
    let dir = tempfile::tempdir().expect("tempdir");
    let blueprint = write_json(dir.path(), "blueprint.json", &clean_blueprint());

    let output = run_bpaudit([
        OsStr::new("audit"),
        OsStr::new("--blueprint"),
        blueprint.as_os_str(),
        OsStr::new("--json"),
    ]);
    assert_success(&output);
    let report = parse_json_stdout(&output);
    assert_eq!(report["schema"], 1);
    assert_eq!(report["reportKind"], "bpaudit.report.v1");
    assert_eq!(report["repoName"], "shop");
    assert_eq!(report["score"], 100);
    assert_eq!(report["band"], "HIGH");
    assert_eq!(report["verdict"], "clean");
    assert_eq!(report["findings"], json!([]));
    assert_eq!(report["passes"][1]["status"], "notEvaluated");
    assert!(
        report["reportDigest"]
            .as_str()
            .is_some_and(|digest| digest.starts_with("bpr1_"))
    );
}

#[test]
fn blocking_finding_exits_one_and_renders_text() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut value = clean_blueprint();
    value["pages"] = json!([{
        "route": "/login",
        "title": "Login",
        "authRequired": false,
        "locators": [{
            "name": "submit",
            "strategy": "role",
            "selectorCode": "page.getByRole('button')",
            "isInteractive": true
        }]
    }]);
    let blueprint = write_json(dir.path(), "blueprint.json", &value);

    let output = run_bpaudit([
        OsStr::new("audit"),
        OsStr::new("--blueprint"),
        blueprint.as_os_str(),
    ]);
    assert_exit(&output, 1);
    let text = stdout_text(&output);
    assert!(text.starts_with("bpaudit report: shop"));
    assert!(text.contains("[UNQUALIFIED_ROLE] x1 BLOCKING"));
    assert!(text.contains("PAGE /login locator=submit"));
    assert!(text.trim_end().ends_with("verdict: WILL FAIL"));
}

#[test]
fn chunks_dir_and_source_scan_feed_their_passes() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut value = clean_blueprint();
    value["endpoints"]
        .as_array_mut()
        .expect("endpoints array")
        .push(json!({
            "id": "ep-health",
            "method": "GET",
            "path": "/api/health",
            "authRequired": false,
            "responseSchema": {}
        }));
    let blueprint = write_json(dir.path(), "blueprint.json", &value);

    let chunks = dir.path().join("chunks");
    fs::create_dir_all(&chunks).expect("chunks dir");
    write_json(
        &chunks,
        "01-items.json",
        &json!({
            "domain": "items",
            "llmUserMessage": format!(
                "AUTH USAGE NOTES\nAPI ENDPOINTS TO TEST\nCOVERAGE REQUIREMENTS\n{}",
                "Cover every endpoint. ".repeat(8)
            ),
            "chunk": {"endpoints": [{"id": "ep-items"}]}
        }),
    );
    fs::write(chunks.join("notes.txt"), "ignored").expect("write note");

    let scan = write_json(
        dir.path(),
        "scan.json",
        &json!({"routes": [
            {"method": "GET", "path": "/api/items"},
            {"method": "GET", "path": "/api/health"}
        ]}),
    );

    let output = run_bpaudit([
        OsStr::new("audit"),
        OsStr::new("--blueprint"),
        blueprint.as_os_str(),
        OsStr::new("--chunks-dir"),
        chunks.as_os_str(),
        OsStr::new("--source-scan"),
        scan.as_os_str(),
        OsStr::new("--json"),
    ]);
    assert_exit(&output, 1);
    let report = parse_json_stdout(&output);
    assert_eq!(report["counts"]["chunks"], 1);
    assert_eq!(report["counts"]["scannedRoutes"], 2);
    let passes = report["passes"].as_array().expect("passes array");
    assert!(passes.iter().all(|pass| pass["status"] == "evaluated"));
    let findings = report["findings"].as_array().expect("findings array");
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0]["category"], "ORPHANED_ENDPOINT");
    assert_eq!(findings[0]["entityRef"]["id"], "ep-health");
}

#[test]
fn config_file_supplies_inputs_and_rules() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut value = clean_blueprint();
    value["endpoints"][0]["confidence"] = json!(0.65);
    write_json(dir.path(), "blueprint.json", &value);
    fs::write(
        dir.path().join("bpaudit.toml"),
        "[inputs]\nblueprint = \"blueprint.json\"\n\n[rules]\nlow_confidence = 0.7\n",
    )
    .expect("write config");

    let output = Command::new(env!("CARGO_BIN_EXE_bpaudit"))
        .args(["audit", "--json"])
        .current_dir(dir.path())
        .env_remove("RUST_LOG")
        .output()
        .expect("bpaudit command should execute");
    assert_success(&output);
    let report = parse_json_stdout(&output);
    assert_eq!(report["findings"][0]["category"], "LOW_CONFIDENCE");
    assert_eq!(report["verdict"], "clean");
}

#[test]
fn malformed_blueprint_exits_two_with_json_path() {
    let dir = tempfile::tempdir().expect("tempdir");
    let blueprint = write_json(
        dir.path(),
        "blueprint.json",
        &json!({"endpoints": [{"path": "/api/items"}]}),
    );
    let output = run_bpaudit([
        OsStr::new("audit"),
        OsStr::new("--blueprint"),
        blueprint.as_os_str(),
    ]);
    assert_exit(&output, 2);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("$.endpoints[0].method"), "stderr: {stderr}");
}

#[test]
fn conflicting_route_sources_are_rejected() {
    let dir = tempfile::tempdir().expect("tempdir");
    let blueprint = write_json(dir.path(), "blueprint.json", &clean_blueprint());
    let output = run_bpaudit([
        OsStr::new("audit"),
        OsStr::new("--blueprint"),
        blueprint.as_os_str(),
        OsStr::new("--source-scan"),
        OsStr::new("scan.json"),
        OsStr::new("--scan-express"),
        dir.path().as_os_str(),
    ]);
    assert_exit(&output, 2);
}

#[test]
fn scan_output_feeds_audit() {
    let dir = tempfile::tempdir().expect("tempdir");
    let src = dir.path().join("src");
    fs::create_dir_all(&src).expect("src dir");
    fs::write(
        src.join("items.js"),
        "router.get('/items', list);\nrouter.post('/items', create);\n",
    )
    .expect("write router");
    let scan_path = dir.path().join("scan.json");

    let output = run_bpaudit([
        OsStr::new("scan"),
        OsStr::new("--framework"),
        OsStr::new("express"),
        OsStr::new("--root"),
        src.as_os_str(),
        OsStr::new("--prefix"),
        OsStr::new("/api"),
        OsStr::new("--output"),
        scan_path.as_os_str(),
    ]);
    assert_success(&output);
    let scan: Value = serde_json::from_str(&fs::read_to_string(&scan_path).expect("scan written"))
        .expect("scan should be json");
    assert_eq!(scan["scanKind"], "bpaudit.scan.v1");
    assert_eq!(scan["routes"].as_array().map(Vec::len), Some(2));

    let blueprint = write_json(dir.path(), "blueprint.json", &clean_blueprint());
    let output = run_bpaudit([
        OsStr::new("audit"),
        OsStr::new("--blueprint"),
        blueprint.as_os_str(),
        OsStr::new("--source-scan"),
        scan_path.as_os_str(),
        OsStr::new("--json"),
    ]);
    assert_exit(&output, 1);
    let report = parse_json_stdout(&output);
    let categories: Vec<&str> = report["findings"]
        .as_array()
        .expect("findings array")
        .iter()
        .filter_map(|finding| finding["category"].as_str())
        .collect();
    assert_eq!(categories, vec!["MISSING_ENDPOINT"]);
}
