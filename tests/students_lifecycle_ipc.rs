use serde_json::json;
use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

fn spawn_sidecar(args: &[&str]) -> (Child, ChildStdin, BufReader<ChildStdout>) {
    let exe = env!("CARGO_BIN_EXE_attendd");
    let mut child = Command::new(exe)
        .args(args)
        .env_remove("ATTENDD_WORKSPACE")
        .env_remove("ATTENDD_NO_SEED")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn attendd");
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
            .get("error")
            .and_then(|e| e.get("message"))
            .and_then(|v| v.as_str())
            .unwrap_or("unknown error")
    );
    value.get("result").cloned().unwrap_or_else(|| json!({}))
}

fn request_err(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> String {
    let value = request(stdin, reader, id, method, params);
    assert_eq!(
        value.get("ok").and_then(|v| v.as_bool()),
        Some(false),
        "{} unexpectedly succeeded",
        method
    );
    value
        .get("error")
        .and_then(|e| e.get("code"))
        .and_then(|v| v.as_str())
        .unwrap_or("")
        .to_string()
}

#[test]
fn students_create_get_delete_lifecycle() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar(&[]);

    let listed = request_ok(&mut stdin, &mut reader, "1", "students.list", json!({}));
    let students = listed["students"].as_array().cloned().unwrap_or_default();
    assert_eq!(students.len(), 2);
    assert_eq!(students[0]["name"], "John Doe");
    assert_eq!(students[0]["studentId"], 123);
    assert_eq!(students[1]["subjects"][0]["sname"], "Math");

    let created = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "students.create",
        json!({
            "name": "  Ada Lovelace ",
            "studentId": 125,
            "subjects": [
                { "sname": "Cs", "status": "absent", "date": "2025-03-06" },
                { "sname": "Math" }
            ]
        }),
    );
    assert_eq!(created["id"], 3);
    assert_eq!(created["name"], "Ada Lovelace");
    assert_eq!(created["subjects"][0]["status"], "absent");
    assert_eq!(created["subjects"][1]["status"], "present");
    assert!(created["subjects"][1].get("date").is_none());

    let fetched = request_ok(&mut stdin, &mut reader, "3", "students.get", json!({ "id": 3 }));
    assert_eq!(fetched, created);

    let removed = request_ok(&mut stdin, &mut reader, "4", "students.delete", json!({ "id": 3 }));
    assert_eq!(removed["student"], created);

    assert_eq!(
        request_err(&mut stdin, &mut reader, "5", "students.get", json!({ "id": 3 })),
        "not_found"
    );
    assert_eq!(
        request_err(&mut stdin, &mut reader, "6", "students.delete", json!({ "id": 3 })),
        "not_found"
    );

    // Ids keep counting after a delete.
    let next = request_ok(
        &mut stdin,
        &mut reader,
        "7",
        "students.create",
        json!({ "name": "Grace Hopper", "studentId": 126 }),
    );
    assert_eq!(next["id"], 4);
    assert_eq!(next["subjects"], json!([]));

    drop(stdin);
    let _ = child.wait();
}

#[test]
fn students_params_are_validated() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar(&[]);

    for (i, params) in [
        json!({}),
        json!({ "id": 0 }),
        json!({ "id": -4 }),
        json!({ "id": "1" }),
    ]
    .into_iter()
    .enumerate()
    {
        assert_eq!(
            request_err(&mut stdin, &mut reader, &format!("g{}", i), "students.get", params),
            "bad_params"
        );
    }

    assert_eq!(
        request_err(
            &mut stdin,
            &mut reader,
            "c1",
            "students.create",
            json!({ "name": "   ", "studentId": 5 }),
        ),
        "bad_params"
    );
    assert_eq!(
        request_err(
            &mut stdin,
            &mut reader,
            "c2",
            "students.create",
            json!({ "name": "Bob", "studentId": 5, "subjects": [{ "sname": "Art", "status": "late" }] }),
        ),
        "bad_params"
    );
    assert_eq!(
        request_err(
            &mut stdin,
            &mut reader,
            "c3",
            "students.create",
            json!({ "name": "Bob", "studentId": 5, "subjects": [{ "sname": "Art", "date": "03/05/2025" }] }),
        ),
        "bad_params"
    );

    let listed = request_ok(&mut stdin, &mut reader, "l", "students.list", json!({}));
    assert_eq!(listed["students"].as_array().map(|a| a.len()), Some(2));

    drop(stdin);
    let _ = child.wait();
}

#[test]
fn no_seed_flag_starts_empty() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar(&["--no-seed"]);

    let listed = request_ok(&mut stdin, &mut reader, "1", "students.list", json!({}));
    assert_eq!(listed["students"], json!([]));
    let created = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "students.create",
        json!({ "name": "First", "studentId": 1 }),
    );
    assert_eq!(created["id"], 1);

    drop(stdin);
    let _ = child.wait();
}
