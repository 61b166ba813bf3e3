use serde_json::json;

use crate::ipc::error::{declined, err, ok, storage_err};
use crate::ipc::types::{AppState, Request};
use crate::model::Student;
use crate::store;

fn param_str<'a>(req: &'a Request, key: &str) -> Option<&'a str> {
    req.params.get(key).and_then(|v| v.as_str())
}

fn handle_students_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return ok(&req.id, json!({ "students": [] }));
    };

    if let Err(e) = state.catalog.reload_students(conn) {
        return storage_err(&req.id, "db_query_failed", "students.list", e);
    }
    ok(&req.id, json!({ "students": &state.catalog.students }))
}

fn handle_students_add(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };

    let (Some(last_name), Some(first_name), Some(father_name), Some(group_name)) = (
        param_str(req, "lastName"),
        param_str(req, "firstName"),
        param_str(req, "fatherName"),
        param_str(req, "groupName"),
    ) else {
        return err(&req.id, "bad_params", "missing student fields", None);
    };
    if last_name.is_empty() || first_name.is_empty() || father_name.is_empty() || group_name.is_empty()
    {
        return declined(&req.id, "all fields must be non-empty");
    }

    // group_name is taken as typed; nothing checks that such a group exists.
    let student =
        match store::students::insert(conn, first_name, last_name, father_name, group_name) {
            Ok(s) => s,
            Err(e) => return storage_err(&req.id, "db_insert_failed", "students.add", e),
        };
    if let Err(e) = state.catalog.reload_students(conn) {
        return storage_err(&req.id, "db_query_failed", "students.add", e);
    }
    state.catalog.reload_mark_pickers();
    state.catalog.reload_average_pickers();

    ok(&req.id, json!({ "student": student }))
}

fn handle_students_delete(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };

    let selected = param_str(req, "studentId")
        .and_then(|id| state.catalog.students.iter().find(|s| s.id == id))
        .cloned();

    let deleted = match &selected {
        Some(student) => match store::students::delete(conn, &student.id) {
            // The student's marks are left behind; nothing cascades.
            Ok(()) => true,
            Err(e) => return storage_err(&req.id, "db_delete_failed", "students.delete", e),
        },
        None => false,
    };

    if let Err(e) = state.catalog.reload_students(conn) {
        return storage_err(&req.id, "db_query_failed", "students.delete", e);
    }
    state.catalog.reload_mark_pickers();
    state.catalog.reload_average_pickers();

    ok(&req.id, json!({ "deleted": deleted }))
}

fn handle_students_update(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };

    let Some(student_id) = param_str(req, "studentId") else {
        return err(&req.id, "bad_params", "missing studentId", None);
    };
    let (Some(last_name), Some(first_name), Some(father_name), Some(group_name)) = (
        param_str(req, "lastName"),
        param_str(req, "firstName"),
        param_str(req, "fatherName"),
        param_str(req, "groupName"),
    ) else {
        return err(&req.id, "bad_params", "missing student fields", None);
    };
    if last_name.is_empty() || first_name.is_empty() || father_name.is_empty() || group_name.is_empty()
    {
        return declined(&req.id, "all fields must be non-empty");
    }
    if !state.catalog.students.iter().any(|s| s.id == student_id) {
        return declined(&req.id, "no such student selected");
    }

    let new = Student {
        id: student_id.to_string(),
        first_name: first_name.to_string(),
        last_name: last_name.to_string(),
        father_name: father_name.to_string(),
        group_name: group_name.to_string(),
    };
    if let Err(e) = store::students::update(conn, student_id, &new) {
        return storage_err(&req.id, "db_update_failed", "students.update", e);
    }

    if let Some(student) = state
        .catalog
        .students
        .iter_mut()
        .find(|s| s.id == student_id)
    {
        *student = new;
    }
    state.catalog.reload_mark_pickers();
    state.catalog.reload_average_pickers();

    ok(&req.id, json!({ "updated": true }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "students.list" => Some(handle_students_list(state, req)),
        "students.add" => Some(handle_students_add(state, req)),
        "students.delete" => Some(handle_students_delete(state, req)),
        "students.update" => Some(handle_students_update(state, req)),
        _ => None,
    }
}
