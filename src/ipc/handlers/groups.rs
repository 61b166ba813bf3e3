use serde_json::json;

use crate::ipc::error::{declined, err, ok, storage_err};
use crate::ipc::types::{AppState, Request};
use crate::store;

fn handle_groups_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return ok(&req.id, json!({ "groups": [] }));
    };

    if let Err(e) = state.catalog.reload_groups(conn) {
        return storage_err(&req.id, "db_query_failed", "groups.list", e);
    }
    ok(&req.id, json!({ "groups": &state.catalog.groups }))
}

fn handle_groups_add(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };

    let Some(name) = req.params.get("name").and_then(|v| v.as_str()) else {
        return err(&req.id, "bad_params", "missing name", None);
    };
    // Empty string is the only validation; no trimming, no duplicate check.
    if name.is_empty() {
        return declined(&req.id, "name must not be empty");
    }

    let group = match store::groups::insert(conn, name) {
        Ok(g) => g,
        Err(e) => return storage_err(&req.id, "db_insert_failed", "groups.add", e),
    };
    if let Err(e) = state.catalog.reload_groups(conn) {
        return storage_err(&req.id, "db_query_failed", "groups.add", e);
    }
    state.catalog.reload_average_pickers();

    ok(&req.id, json!({ "group": group }))
}

fn handle_groups_delete(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };

    // No selection (absent or unknown id) means nothing to delete, but the
    // list and pickers still reload.
    let selected = req
        .params
        .get("groupId")
        .and_then(|v| v.as_str())
        .and_then(|id| state.catalog.groups.iter().find(|g| g.id == id))
        .cloned();

    let deleted = match &selected {
        Some(group) => match store::groups::delete(conn, &group.id) {
            Ok(()) => true,
            Err(e) => return storage_err(&req.id, "db_delete_failed", "groups.delete", e),
        },
        None => false,
    };

    if let Err(e) = state.catalog.reload_groups(conn) {
        return storage_err(&req.id, "db_query_failed", "groups.delete", e);
    }
    state.catalog.reload_mark_pickers();
    state.catalog.reload_average_pickers();

    ok(&req.id, json!({ "deleted": deleted }))
}

fn handle_groups_update(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };

    let Some(group_id) = req.params.get("groupId").and_then(|v| v.as_str()) else {
        return err(&req.id, "bad_params", "missing groupId", None);
    };
    let Some(name) = req.params.get("name").and_then(|v| v.as_str()) else {
        return err(&req.id, "bad_params", "missing name", None);
    };
    if name.is_empty() {
        return declined(&req.id, "name must not be empty");
    }
    if !state.catalog.groups.iter().any(|g| g.id == group_id) {
        return declined(&req.id, "no such group selected");
    }

    if let Err(e) = store::groups::update(conn, group_id, name) {
        return storage_err(&req.id, "db_update_failed", "groups.update", e);
    }

    // Inline edit: patch the cached row instead of reloading the list.
    // Only the average pickers see the rename; the marks pickers carry no
    // group list.
    if let Some(group) = state.catalog.groups.iter_mut().find(|g| g.id == group_id) {
        group.name = name.to_string();
    }
    state.catalog.reload_average_pickers();

    ok(&req.id, json!({ "updated": true }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "groups.list" => Some(handle_groups_list(state, req)),
        "groups.add" => Some(handle_groups_add(state, req)),
        "groups.delete" => Some(handle_groups_delete(state, req)),
        "groups.update" => Some(handle_groups_update(state, req)),
        _ => None,
    }
}
