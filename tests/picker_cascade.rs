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
    let exe = env!("CARGO_BIN_EXE_gradebookd");
    let mut child = Command::new(exe)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn gradebookd");
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
    let payload = json!({ "id": id, "method": method, "params": params });
    writeln!(stdin, "{}", payload).expect("write request");
    stdin.flush().expect("flush request");

    let mut line = String::new();
    reader.read_line(&mut line).expect("read response line");
    serde_json::from_str(line.trim()).expect("parse response json")
}

fn names(value: &serde_json::Value, list: &str, field: &str) -> Vec<String> {
    value["result"][list]
        .as_array()
        .unwrap_or_else(|| panic!("{} array", list))
        .iter()
        .map(|e| e[field].as_str().expect(field).to_string())
        .collect()
}

#[test]
fn entity_mutations_refresh_dependent_pickers() {
    let workspace = temp_dir("gradebook-cascade");
    let (mut child, mut stdin, mut reader) = spawn_sidecar();
    let _ = request(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );

    // New group shows up in the Average group picker before any other call.
    let _ = request(
        &mut stdin,
        &mut reader,
        "2",
        "groups.add",
        json!({ "name": "10A" }),
    );
    let avg = request(&mut stdin, &mut reader, "3", "average.pickers", json!({}));
    assert_eq!(names(&avg, "groups", "name"), vec!["10A"]);

    // New student shows up in both picker families.
    let created = request(
        &mut stdin,
        &mut reader,
        "4",
        "students.add",
        json!({
            "lastName": "Petrov",
            "firstName": "Ivan",
            "fatherName": "Sergeevich",
            "groupName": "10A"
        }),
    );
    let student_id = created["result"]["student"]["id"]
        .as_str()
        .expect("student id")
        .to_string();
    let marks = request(&mut stdin, &mut reader, "5", "marks.pickers", json!({}));
    assert_eq!(names(&marks, "students", "lastName"), vec!["Petrov"]);
    let avg = request(&mut stdin, &mut reader, "6", "average.pickers", json!({}));
    assert_eq!(names(&avg, "students", "lastName"), vec!["Petrov"]);

    // Subject rename cascades into both picker families.
    let created = request(
        &mut stdin,
        &mut reader,
        "7",
        "subjects.add",
        json!({ "name": "Math" }),
    );
    let subject_id = created["result"]["subject"]["id"]
        .as_str()
        .expect("subject id")
        .to_string();
    let _ = request(
        &mut stdin,
        &mut reader,
        "8",
        "subjects.update",
        json!({ "subjectId": subject_id, "name": "Algebra" }),
    );
    let marks = request(&mut stdin, &mut reader, "9", "marks.pickers", json!({}));
    assert_eq!(names(&marks, "subjects", "name"), vec!["Algebra"]);
    let avg = request(&mut stdin, &mut reader, "10", "average.pickers", json!({}));
    assert_eq!(names(&avg, "subjects", "name"), vec!["Algebra"]);

    // Deleting the student empties both pickers again.
    let _ = request(
        &mut stdin,
        &mut reader,
        "11",
        "students.delete",
        json!({ "studentId": student_id }),
    );
    let marks = request(&mut stdin, &mut reader, "12", "marks.pickers", json!({}));
    assert!(names(&marks, "students", "lastName").is_empty());
    let avg = request(&mut stdin, &mut reader, "13", "average.pickers", json!({}));
    assert!(names(&avg, "students", "lastName").is_empty());

    drop(stdin);
    let _ = child.wait();
    let _ = std::fs::remove_dir_all(workspace);
}

#[test]
fn group_rename_updates_picker_but_not_denormalized_students() {
    let workspace = temp_dir("gradebook-group-rename");
    let (mut child, mut stdin, mut reader) = spawn_sidecar();
    let _ = request(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );

    let created = request(
        &mut stdin,
        &mut reader,
        "2",
        "groups.add",
        json!({ "name": "10A" }),
    );
    let group_id = created["result"]["group"]["id"]
        .as_str()
        .expect("group id")
        .to_string();
    let _ = request(
        &mut stdin,
        &mut reader,
        "3",
        "students.add",
        json!({
            "lastName": "Petrov",
            "firstName": "Ivan",
            "fatherName": "Sergeevich",
            "groupName": "10A"
        }),
    );

    let _ = request(
        &mut stdin,
        &mut reader,
        "4",
        "groups.update",
        json!({ "groupId": group_id, "name": "10B" }),
    );

    // The Average group picker sees the rename.
    let avg = request(&mut stdin, &mut reader, "5", "average.pickers", json!({}));
    assert_eq!(names(&avg, "groups", "name"), vec!["10B"]);

    // The student's denormalized group string does not.
    let students = request(&mut stdin, &mut reader, "6", "students.list", json!({}));
    assert_eq!(names(&students, "students", "groupName"), vec!["10A"]);

    drop(stdin);
    let _ = child.wait();
    let _ = std::fs::remove_dir_all(workspace);
}
