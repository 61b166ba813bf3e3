use serde_json::json;

use crate::ipc::error::{declined, err, ok, storage_err};
use crate::ipc::types::{AppState, Request};
use crate::model::Teacher;
use crate::store;

fn param_str<'a>(req: &'a Request, key: &str) -> Option<&'a str> {
    req.params.get(key).and_then(|v| v.as_str())
}

fn handle_teachers_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return ok(&req.id, json!({ "teachers": [] }));
    };

    if let Err(e) = state.catalog.reload_teachers(conn) {
        return storage_err(&req.id, "db_query_failed", "teachers.list", e);
    }
    ok(&req.id, json!({ "teachers": &state.catalog.teachers }))
}

fn handle_teachers_add(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };

    let (Some(last_name), Some(first_name), Some(father_name)) = (
        param_str(req, "lastName"),
        param_str(req, "firstName"),
        param_str(req, "fatherName"),
    ) else {
        return err(&req.id, "bad_params", "missing teacher fields", None);
    };
    if last_name.is_empty() || first_name.is_empty() || father_name.is_empty() {
        return declined(&req.id, "all fields must be non-empty");
    }

    let teacher = match store::teachers::insert(conn, first_name, last_name, father_name) {
        Ok(t) => t,
        Err(e) => return storage_err(&req.id, "db_insert_failed", "teachers.add", e),
    };
    if let Err(e) = state.catalog.reload_teachers(conn) {
        return storage_err(&req.id, "db_query_failed", "teachers.add", e);
    }
    state.catalog.reload_mark_pickers();
    state.catalog.reload_average_pickers();

    ok(&req.id, json!({ "teacher": teacher }))
}

fn handle_teachers_delete(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };

    let selected = param_str(req, "teacherId")
        .and_then(|id| state.catalog.teachers.iter().find(|t| t.id == id))
        .cloned();

    let deleted = match &selected {
        Some(teacher) => match store::teachers::delete(conn, &teacher.id) {
            Ok(()) => true,
            Err(e) => return storage_err(&req.id, "db_delete_failed", "teachers.delete", e),
        },
        None => false,
    };

    if let Err(e) = state.catalog.reload_teachers(conn) {
        return storage_err(&req.id, "db_query_failed", "teachers.delete", e);
    }
    state.catalog.reload_mark_pickers();
    state.catalog.reload_average_pickers();

    ok(&req.id, json!({ "deleted": deleted }))
}

fn handle_teachers_update(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };

    let Some(teacher_id) = param_str(req, "teacherId") else {
        return err(&req.id, "bad_params", "missing teacherId", None);
    };
    let (Some(last_name), Some(first_name), Some(father_name)) = (
        param_str(req, "lastName"),
        param_str(req, "firstName"),
        param_str(req, "fatherName"),
    ) else {
        return err(&req.id, "bad_params", "missing teacher fields", None);
    };
    if last_name.is_empty() || first_name.is_empty() || father_name.is_empty() {
        return declined(&req.id, "all fields must be non-empty");
    }
    if !state.catalog.teachers.iter().any(|t| t.id == teacher_id) {
        return declined(&req.id, "no such teacher selected");
    }

    let new = Teacher {
        id: teacher_id.to_string(),
        first_name: first_name.to_string(),
        last_name: last_name.to_string(),
        father_name: father_name.to_string(),
    };
    if let Err(e) = store::teachers::update(conn, teacher_id, &new) {
        return storage_err(&req.id, "db_update_failed", "teachers.update", e);
    }

    if let Some(teacher) = state
        .catalog
        .teachers
        .iter_mut()
        .find(|t| t.id == teacher_id)
    {
        *teacher = new;
    }
    state.catalog.reload_mark_pickers();
    state.catalog.reload_average_pickers();

    ok(&req.id, json!({ "updated": true }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "teachers.list" => Some(handle_teachers_list(state, req)),
        "teachers.add" => Some(handle_teachers_add(state, req)),
        "teachers.delete" => Some(handle_teachers_delete(state, req)),
        "teachers.update" => Some(handle_teachers_update(state, req)),
        _ => None,
    }
}
