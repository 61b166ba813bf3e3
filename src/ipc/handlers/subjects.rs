use serde_json::json;

use crate::ipc::error::{declined, err, ok, storage_err};
use crate::ipc::types::{AppState, Request};
use crate::store;

fn handle_subjects_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return ok(&req.id, json!({ "subjects": [] }));
    };

    if let Err(e) = state.catalog.reload_subjects(conn) {
        return storage_err(&req.id, "db_query_failed", "subjects.list", e);
    }
    ok(&req.id, json!({ "subjects": &state.catalog.subjects }))
}

fn handle_subjects_add(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };

    let Some(name) = req.params.get("name").and_then(|v| v.as_str()) else {
        return err(&req.id, "bad_params", "missing name", None);
    };
    if name.is_empty() {
        return declined(&req.id, "name must not be empty");
    }

    let subject = match store::subjects::insert(conn, name) {
        Ok(s) => s,
        Err(e) => return storage_err(&req.id, "db_insert_failed", "subjects.add", e),
    };
    if let Err(e) = state.catalog.reload_subjects(conn) {
        return storage_err(&req.id, "db_query_failed", "subjects.add", e);
    }
    state.catalog.reload_mark_pickers();
    state.catalog.reload_average_pickers();

    ok(&req.id, json!({ "subject": subject }))
}

fn handle_subjects_delete(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };

    let selected = req
        .params
        .get("subjectId")
        .and_then(|v| v.as_str())
        .and_then(|id| state.catalog.subjects.iter().find(|s| s.id == id))
        .cloned();

    let deleted = match &selected {
        Some(subject) => match store::subjects::delete(conn, &subject.id) {
            // Marks referencing the subject by name stay as they are.
            Ok(()) => true,
            Err(e) => return storage_err(&req.id, "db_delete_failed", "subjects.delete", e),
        },
        None => false,
    };

    if let Err(e) = state.catalog.reload_subjects(conn) {
        return storage_err(&req.id, "db_query_failed", "subjects.delete", e);
    }
    state.catalog.reload_mark_pickers();
    state.catalog.reload_average_pickers();

    ok(&req.id, json!({ "deleted": deleted }))
}

fn handle_subjects_update(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };

    let Some(subject_id) = req.params.get("subjectId").and_then(|v| v.as_str()) else {
        return err(&req.id, "bad_params", "missing subjectId", None);
    };
    let Some(name) = req.params.get("name").and_then(|v| v.as_str()) else {
        return err(&req.id, "bad_params", "missing name", None);
    };
    if name.is_empty() {
        return declined(&req.id, "name must not be empty");
    }
    if !state.catalog.subjects.iter().any(|s| s.id == subject_id) {
        return declined(&req.id, "no such subject selected");
    }

    if let Err(e) = store::subjects::update(conn, subject_id, name) {
        return storage_err(&req.id, "db_update_failed", "subjects.update", e);
    }

    if let Some(subject) = state
        .catalog
        .subjects
        .iter_mut()
        .find(|s| s.id == subject_id)
    {
        subject.name = name.to_string();
    }
    state.catalog.reload_mark_pickers();
    state.catalog.reload_average_pickers();

    ok(&req.id, json!({ "updated": true }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "subjects.list" => Some(handle_subjects_list(state, req)),
        "subjects.add" => Some(handle_subjects_add(state, req)),
        "subjects.delete" => Some(handle_subjects_delete(state, req)),
        "subjects.update" => Some(handle_subjects_update(state, req)),
        _ => None,
    }
}
