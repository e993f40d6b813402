use serde_json::json;
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_dir(prefix: &str) -> PathBuf {
    let p = std::env::temp_dir().join(format!(
        "{}-{}",
        prefix,
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos()
    ));
    std::fs::create_dir_all(&p).expect("create temp dir");
    p
}

fn spawn_sidecar() -> (Child, ChildStdin, BufReader<ChildStdout>) {
    let exe = env!("CARGO_BIN_EXE_preregd");
    let mut child = Command::new(exe)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn preregd");
    let stdin = child.stdin.take().expect("child stdin");
    let stdout = child.stdout.take().expect("child stdout");
    (child, stdin, BufReader::new(stdout))
}

fn request(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let payload = json!({
        "id": id,
        "method": method,
        "params": params,
    });
    writeln!(stdin, "{}", payload).expect("write request");
    stdin.flush().expect("flush request");

    let mut line = String::new();
    reader.read_line(&mut line).expect("read response line");
    assert!(!line.trim().is_empty(), "empty response for {}", method);
    let value: serde_json::Value = serde_json::from_str(line.trim()).expect("parse response json");
    assert_eq!(value.get("id").and_then(|v| v.as_str()), Some(id));
    value
}

fn request_ok(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let value = request(stdin, reader, id, method, params);
    assert!(
        value.get("ok").and_then(|v| v.as_bool()).unwrap_or(false),
        "{} failed: {}",
        method,
        value
    );
    value.get("result").cloned().unwrap_or_else(|| json!({}))
}

#[test]
fn router_dispatch_smoke_covers_handler_families() {
    let workspace = temp_dir("preregd-router-smoke");
    let roster_path = workspace.join("roster.json");
    std::fs::write(
        &roster_path,
        r#"[ { "enrollment": "200101", "name": "Ana Souza", "grade": "6" } ]"#,
    )
    .expect("write roster");
    let csv_out = workspace.join("smoke-export.csv");

    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    let health = request_ok(&mut stdin, &mut reader, "1", "health", json!({}));
    assert!(health.get("version").and_then(|v| v.as_str()).is_some());
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );
    let imported = request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "students.importRoster",
        json!({ "path": roster_path.to_string_lossy() }),
    );
    assert_eq!(imported["studentsImported"].as_i64(), Some(1));
    let found = request_ok(
        &mut stdin,
        &mut reader,
        "4",
        "students.lookup",
        json!({ "enrollment": "200101" }),
    );
    assert_eq!(found["name"].as_str(), Some("Ana Souza"));
    let masked = request_ok(
        &mut stdin,
        &mut reader,
        "5",
        "form.maskBirthDate",
        json!({ "value": "05112010" }),
    );
    assert_eq!(masked["value"].as_str(), Some("05/11/2010"));
    let submitted = request_ok(
        &mut stdin,
        &mut reader,
        "6",
        "form.submit",
        json!({ "enrollment": "200101", "birthDate": "05/11/2010" }),
    );
    assert!(submitted.get("submissionId").and_then(|v| v.as_str()).is_some());
    let exported = request_ok(
        &mut stdin,
        &mut reader,
        "7",
        "submissions.export",
        json!({ "enrollment": "200291", "outPath": csv_out.to_string_lossy() }),
    );
    assert_eq!(exported["rowsExported"].as_i64(), Some(1));

    // Unknown methods must keep reporting not_implemented.
    let unknown = request(
        &mut stdin,
        &mut reader,
        "8",
        "classes.list",
        json!({}),
    );
    assert_eq!(
        unknown
            .get("error")
            .and_then(|e| e.get("code"))
            .and_then(|v| v.as_str()),
        Some("not_implemented")
    );

    drop(stdin);
    let _ = child.wait();
    let _ = std::fs::remove_dir_all(workspace);
}
