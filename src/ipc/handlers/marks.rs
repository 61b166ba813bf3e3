use serde_json::json;

use crate::ipc::error::{declined, err, ok, storage_err};
use crate::ipc::helpers::options;
use crate::ipc::types::{AppState, Request};
use crate::model::{Mark, Teacher, MARK_VALUES};
use crate::store;

/// Table row for the Marks tab: the mark plus the display fields the
/// original entity carried (teacher name resolved at render time; blank if
/// the teacher no longer exists).
fn mark_row(mark: &Mark, teachers: &[Teacher]) -> serde_json::Value {
    let teacher = teachers.iter().find(|t| t.id == mark.teacher_id);
    json!({
        "id": mark.id,
        "studentId": mark.student_id,
        "subjectName": mark.subject_name,
        "teacherId": mark.teacher_id,
        "teacherLastName": teacher.map(|t| t.last_name.clone()).unwrap_or_default(),
        "teacherFirstName": teacher.map(|t| t.first_name.clone()).unwrap_or_default(),
        "value": mark.value,
        "date": mark.date,
    })
}

fn rows(state: &AppState) -> Vec<serde_json::Value> {
    state
        .marks
        .iter()
        .map(|m| mark_row(m, &state.catalog.teachers))
        .collect()
}

/// The mark table is always scoped to one student picked in the filter
/// combo; there is no "all marks" view.
fn handle_marks_list_by_student(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };

    let Some(student_id) = req.params.get("studentId").and_then(|v| v.as_str()) else {
        return err(&req.id, "bad_params", "missing studentId", None);
    };

    state.marks = match store::marks::all_by_student(conn, student_id) {
        Ok(m) => m,
        Err(e) => return storage_err(&req.id, "db_query_failed", "marks.listByStudent", e),
    };
    state.marks_student = Some(student_id.to_string());

    ok(&req.id, json!({ "marks": rows(state) }))
}

fn handle_marks_pickers(state: &mut AppState, req: &Request) -> serde_json::Value {
    let pickers = &state.catalog.mark_pickers;
    ok(
        &req.id,
        json!({
            "students": options(&pickers.students, |s| s.full_name()),
            "subjects": options(&pickers.subjects, |s| s.name.clone()),
            "teachers": options(&pickers.teachers, |t| t.full_name()),
            "values": MARK_VALUES,
        }),
    )
}

fn handle_marks_add(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };

    // All four picks must be present, like the original's combo values.
    let (Some(student_id), Some(subject_id), Some(teacher_id), Some(value)) = (
        req.params.get("studentId").and_then(|v| v.as_str()),
        req.params.get("subjectId").and_then(|v| v.as_str()),
        req.params.get("teacherId").and_then(|v| v.as_str()),
        req.params.get("value").and_then(|v| v.as_i64()),
    ) else {
        return declined(&req.id, "student, subject, teacher and value are all required");
    };

    // Picks resolve against the picker snapshots: the combos only ever
    // offered what was in them at the last cascade reload.
    if !state
        .catalog
        .mark_pickers
        .students
        .iter()
        .any(|s| s.id == student_id)
    {
        return declined(&req.id, "unknown student pick");
    }
    let Some(subject_name) = state
        .catalog
        .mark_pickers
        .subjects
        .iter()
        .find(|s| s.id == subject_id)
        .map(|s| s.name.clone())
    else {
        return declined(&req.id, "unknown subject pick");
    };
    if !state
        .catalog
        .mark_pickers
        .teachers
        .iter()
        .any(|t| t.id == teacher_id)
    {
        return declined(&req.id, "unknown teacher pick");
    }
    if !MARK_VALUES.contains(&value) {
        return declined(&req.id, "value must be one of 2, 3, 4, 5");
    }

    let date = chrono::Local::now().date_naive().to_string();
    // The mark persists the subject's name, not its id.
    let mark = match store::marks::insert(conn, student_id, &subject_name, teacher_id, value, &date)
    {
        Ok(m) => m,
        Err(e) => return storage_err(&req.id, "db_insert_failed", "marks.add", e),
    };

    state.marks = match store::marks::all_by_student(conn, student_id) {
        Ok(m) => m,
        Err(e) => return storage_err(&req.id, "db_query_failed", "marks.add", e),
    };
    state.marks_student = Some(student_id.to_string());

    ok(&req.id, json!({ "mark": mark_row(&mark, &state.catalog.teachers) }))
}

fn handle_marks_delete(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };

    let selected = req
        .params
        .get("markId")
        .and_then(|v| v.as_str())
        .and_then(|id| state.marks.iter().find(|m| m.id == id))
        .cloned();

    let deleted = match &selected {
        Some(mark) => match store::marks::delete(conn, &mark.id) {
            Ok(()) => true,
            Err(e) => return storage_err(&req.id, "db_delete_failed", "marks.delete", e),
        },
        None => false,
    };

    if let Some(student_id) = state.marks_student.clone() {
        state.marks = match store::marks::all_by_student(conn, &student_id) {
            Ok(m) => m,
            Err(e) => return storage_err(&req.id, "db_query_failed", "marks.delete", e),
        };
    }

    ok(&req.id, json!({ "deleted": deleted, "marks": rows(state) }))
}

fn handle_marks_update(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };

    // The original edit silently required some student to be selected in
    // the filter combo, not necessarily the mark's owner. That ambient
    // dependency is an explicit parameter here, still unchecked against the
    // mark itself.
    let selected_student = req
        .params
        .get("selectedStudentId")
        .and_then(|v| v.as_str())
        .unwrap_or("");
    if selected_student.is_empty() {
        return declined(&req.id, "a student must be selected");
    }

    let Some(value) = req.params.get("value").and_then(|v| v.as_i64()) else {
        return declined(&req.id, "a new value is required");
    };
    if !MARK_VALUES.contains(&value) {
        return declined(&req.id, "value must be one of 2, 3, 4, 5");
    }

    let Some(mark_id) = req
        .params
        .get("markId")
        .and_then(|v| v.as_str())
        .filter(|id| state.marks.iter().any(|m| m.id == *id))
        .map(str::to_string)
    else {
        return declined(&req.id, "no such mark in the current table");
    };

    if let Err(e) = store::marks::update_value(conn, &mark_id, value) {
        return storage_err(&req.id, "db_update_failed", "marks.update", e);
    }

    // Value-only inline edit: patch the cached row, no reload.
    if let Some(mark) = state.marks.iter_mut().find(|m| m.id == mark_id) {
        mark.value = value;
    }

    ok(&req.id, json!({ "updated": true }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "marks.listByStudent" => Some(handle_marks_list_by_student(state, req)),
        "marks.pickers" => Some(handle_marks_pickers(state, req)),
        "marks.add" => Some(handle_marks_add(state, req)),
        "marks.delete" => Some(handle_marks_delete(state, req)),
        "marks.update" => Some(handle_marks_update(state, req)),
        _ => None,
    }
}
