use std::path::PathBuf;

use serde_json::json;

use crate::catalog::Catalog;
use crate::db;
use crate::filter::AveragePanel;
use crate::ipc::error::{err, ok, storage_err};
use crate::ipc::types::{AppState, Request};

fn handle_health(state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(
        &req.id,
        json!({
            "version": env!("CARGO_PKG_VERSION"),
            "workspacePath": state.workspace.as_ref().map(|p| p.to_string_lossy().to_string())
        }),
    )
}

/// Opens (or creates) a workspace database and performs the initial load of
/// every entity list and both picker families. A failed open leaves the
/// state without a connection; subsequent data requests answer
/// `no_workspace` instead of dereferencing a dead service.
fn handle_workspace_select(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(path) = req
        .params
        .get("path")
        .and_then(|v| v.as_str())
        .map(PathBuf::from)
    else {
        return err(&req.id, "bad_params", "missing params.path", None);
    };

    let conn = match db::open_db(&path) {
        Ok(conn) => conn,
        Err(e) => {
            log::error!("failed to open workspace {}: {}", path.display(), e);
            return err(&req.id, "db_open_failed", format!("{e:?}"), None);
        }
    };

    let mut catalog = Catalog::default();
    if let Err(e) = catalog.load_all(&conn) {
        return storage_err(&req.id, "db_query_failed", "workspace.select", e);
    }

    state.workspace = Some(path.clone());
    state.db = Some(conn);
    state.catalog = catalog;
    state.marks.clear();
    state.marks_student = None;
    state.panel = AveragePanel::default();

    ok(
        &req.id,
        json!({ "workspacePath": path.to_string_lossy() }),
    )
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "health" => Some(handle_health(state, req)),
        "workspace.select" => Some(handle_workspace_select(state, req)),
        _ => None,
    }
}
