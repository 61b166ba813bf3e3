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

fn error_code(value: &serde_json::Value) -> &str {
    value
        .get("error")
        .and_then(|e| e.get("code"))
        .and_then(|v| v.as_str())
        .unwrap_or("")
}

struct Seeded {
    student_id: String,
    teacher_id: String,
    subject_id: String,
}

fn seed(stdin: &mut ChildStdin, reader: &mut BufReader<ChildStdout>) -> Seeded {
    let _ = request(stdin, reader, "s1", "groups.add", json!({ "name": "10A" }));
    let student = request(
        stdin,
        reader,
        "s2",
        "students.add",
        json!({
            "lastName": "Petrov",
            "firstName": "Ivan",
            "fatherName": "Sergeevich",
            "groupName": "10A"
        }),
    );
    let teacher = request(
        stdin,
        reader,
        "s3",
        "teachers.add",
        json!({ "lastName": "Orlova", "firstName": "Anna", "fatherName": "Pavlovna" }),
    );
    let subject = request(stdin, reader, "s4", "subjects.add", json!({ "name": "Math" }));
    Seeded {
        student_id: student["result"]["student"]["id"]
            .as_str()
            .expect("student id")
            .to_string(),
        teacher_id: teacher["result"]["teacher"]["id"]
            .as_str()
            .expect("teacher id")
            .to_string(),
        subject_id: subject["result"]["subject"]["id"]
            .as_str()
            .expect("subject id")
            .to_string(),
    }
}

#[test]
fn mark_add_edit_delete_and_orphaning() {
    let workspace = temp_dir("gradebook-marks");
    let (mut child, mut stdin, mut reader) = spawn_sidecar();
    let _ = request(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );
    let seeded = seed(&mut stdin, &mut reader);

    let created = request(
        &mut stdin,
        &mut reader,
        "2",
        "marks.add",
        json!({
            "studentId": seeded.student_id,
            "subjectId": seeded.subject_id,
            "teacherId": seeded.teacher_id,
            "value": 4
        }),
    );
    let mark_id = created["result"]["mark"]["id"]
        .as_str()
        .expect("mark id")
        .to_string();

    let listed = request(
        &mut stdin,
        &mut reader,
        "3",
        "marks.listByStudent",
        json!({ "studentId": seeded.student_id }),
    );
    let marks = listed["result"]["marks"].as_array().expect("marks array");
    assert_eq!(marks.len(), 1);
    assert_eq!(marks[0]["value"].as_i64(), Some(4));
    assert_eq!(marks[0]["subjectName"].as_str(), Some("Math"));
    assert_eq!(marks[0]["teacherLastName"].as_str(), Some("Orlova"));

    // Edit requires the ambient student selection, passed explicitly.
    let no_selection = request(
        &mut stdin,
        &mut reader,
        "4",
        "marks.update",
        json!({ "markId": mark_id, "value": 5 }),
    );
    assert_eq!(error_code(&no_selection), "validation");

    let updated = request(
        &mut stdin,
        &mut reader,
        "5",
        "marks.update",
        json!({ "markId": mark_id, "value": 5, "selectedStudentId": seeded.student_id }),
    );
    assert_eq!(
        updated["result"]["updated"].as_bool(),
        Some(true),
        "update with selection should apply"
    );

    let listed = request(
        &mut stdin,
        &mut reader,
        "6",
        "marks.listByStudent",
        json!({ "studentId": seeded.student_id }),
    );
    assert_eq!(listed["result"]["marks"][0]["value"].as_i64(), Some(5));

    // Deleting the student does not touch the mark row.
    let _ = request(
        &mut stdin,
        &mut reader,
        "7",
        "students.delete",
        json!({ "studentId": seeded.student_id }),
    );
    let students = request(&mut stdin, &mut reader, "8", "students.list", json!({}));
    assert!(students["result"]["students"]
        .as_array()
        .expect("students array")
        .is_empty());
    let orphaned = request(
        &mut stdin,
        &mut reader,
        "9",
        "marks.listByStudent",
        json!({ "studentId": seeded.student_id }),
    );
    assert_eq!(
        orphaned["result"]["marks"]
            .as_array()
            .expect("marks array")
            .len(),
        1
    );

    // Delete with no selection is a no-op.
    let noop = request(&mut stdin, &mut reader, "10", "marks.delete", json!({}));
    assert_eq!(noop["result"]["deleted"].as_bool(), Some(false));

    let deleted = request(
        &mut stdin,
        &mut reader,
        "11",
        "marks.delete",
        json!({ "markId": mark_id }),
    );
    assert_eq!(deleted["result"]["deleted"].as_bool(), Some(true));

    drop(stdin);
    let _ = child.wait();
    let _ = std::fs::remove_dir_all(workspace);
}

#[test]
fn mark_value_domain_is_closed() {
    let workspace = temp_dir("gradebook-mark-values");
    let (mut child, mut stdin, mut reader) = spawn_sidecar();
    let _ = request(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );
    let seeded = seed(&mut stdin, &mut reader);

    let pickers = request(&mut stdin, &mut reader, "2", "marks.pickers", json!({}));
    assert_eq!(
        pickers["result"]["values"],
        json!([2, 3, 4, 5]),
        "editor offers exactly the closed value set"
    );

    for (i, bad) in [0, 1, 6].iter().enumerate() {
        let resp = request(
            &mut stdin,
            &mut reader,
            &format!("bad-{}", i),
            "marks.add",
            json!({
                "studentId": seeded.student_id,
                "subjectId": seeded.subject_id,
                "teacherId": seeded.teacher_id,
                "value": bad
            }),
        );
        assert_eq!(error_code(&resp), "validation", "value {} must decline", bad);
    }

    // A pick that was never in the combos declines too.
    let unknown_subject = request(
        &mut stdin,
        &mut reader,
        "3",
        "marks.add",
        json!({
            "studentId": seeded.student_id,
            "subjectId": "no-such-subject",
            "teacherId": seeded.teacher_id,
            "value": 4
        }),
    );
    assert_eq!(error_code(&unknown_subject), "validation");

    let listed = request(
        &mut stdin,
        &mut reader,
        "4",
        "marks.listByStudent",
        json!({ "studentId": seeded.student_id }),
    );
    assert!(listed["result"]["marks"]
        .as_array()
        .expect("marks array")
        .is_empty());

    // Out-of-set edit declines as well.
    let created = request(
        &mut stdin,
        &mut reader,
        "5",
        "marks.add",
        json!({
            "studentId": seeded.student_id,
            "subjectId": seeded.subject_id,
            "teacherId": seeded.teacher_id,
            "value": 3
        }),
    );
    let mark_id = created["result"]["mark"]["id"]
        .as_str()
        .expect("mark id")
        .to_string();
    let bad_edit = request(
        &mut stdin,
        &mut reader,
        "6",
        "marks.update",
        json!({ "markId": mark_id, "value": 1, "selectedStudentId": seeded.student_id }),
    );
    assert_eq!(error_code(&bad_edit), "validation");

    let listed = request(
        &mut stdin,
        &mut reader,
        "7",
        "marks.listByStudent",
        json!({ "studentId": seeded.student_id }),
    );
    assert_eq!(listed["result"]["marks"][0]["value"].as_i64(), Some(3));

    drop(stdin);
    let _ = child.wait();
    let _ = std::fs::remove_dir_all(workspace);
}
