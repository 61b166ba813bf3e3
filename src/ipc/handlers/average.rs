use chrono::NaiveDate;
use serde_json::json;

use crate::calc;
use crate::filter::{AveragePanel, ComputeDecision, DateField, FilterKind};
use crate::ipc::error::{declined, err, ok, storage_err};
use crate::ipc::helpers::options;
use crate::ipc::types::{AppState, Request};

fn panel_json(panel: &AveragePanel) -> serde_json::Value {
    json!({
        "filterKind": panel.kind.map(FilterKind::key),
        "studentsEnabled": panel.students_enabled,
        "teachersEnabled": panel.teachers_enabled,
        "subjectsEnabled": panel.subjects_enabled,
        "groupsEnabled": panel.groups_enabled,
        "computeEnabled": panel.compute_enabled,
        "startDate": panel.start.map(|d| d.to_string()),
        "endDate": panel.end.map(|d| d.to_string()),
        "result": &panel.result,
    })
}

fn handle_average_pickers(state: &mut AppState, req: &Request) -> serde_json::Value {
    let pickers = &state.catalog.average_pickers;
    ok(
        &req.id,
        json!({
            "students": options(&pickers.students, |s| s.full_name()),
            "teachers": options(&pickers.teachers, |t| t.full_name()),
            "subjects": options(&pickers.subjects, |s| s.name.clone()),
            "groups": options(&pickers.groups, |g| g.name.clone()),
        }),
    )
}

fn handle_average_panel(state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(&req.id, panel_json(&state.panel))
}

fn handle_average_select_filter(state: &mut AppState, req: &Request) -> serde_json::Value {
    let kind = match req
        .params
        .get("kind")
        .and_then(|v| v.as_str())
        .and_then(FilterKind::parse)
    {
        Some(k) => k,
        None => return err(&req.id, "bad_params", "missing or unknown kind", None),
    };

    state.panel.select_kind(kind);
    ok(&req.id, panel_json(&state.panel))
}

/// A selection in one of the four entity selectors. The stored key is what
/// the calculator will receive: the id for students and teachers, the
/// display name for subjects and groups.
fn handle_average_pick(state: &mut AppState, req: &Request) -> serde_json::Value {
    let kind = match req
        .params
        .get("kind")
        .and_then(|v| v.as_str())
        .and_then(FilterKind::parse)
    {
        Some(k) => k,
        None => return err(&req.id, "bad_params", "missing or unknown kind", None),
    };
    let Some(id) = req.params.get("id").and_then(|v| v.as_str()) else {
        return err(&req.id, "bad_params", "missing id", None);
    };

    let pickers = &state.catalog.average_pickers;
    let key = match kind {
        FilterKind::Students => pickers
            .students
            .iter()
            .find(|s| s.id == id)
            .map(|s| s.id.clone()),
        FilterKind::Teachers => pickers
            .teachers
            .iter()
            .find(|t| t.id == id)
            .map(|t| t.id.clone()),
        FilterKind::Subjects => pickers
            .subjects
            .iter()
            .find(|s| s.id == id)
            .map(|s| s.name.clone()),
        FilterKind::Groups => pickers
            .groups
            .iter()
            .find(|g| g.id == id)
            .map(|g| g.name.clone()),
    };
    let Some(key) = key else {
        return declined(&req.id, "pick is not in the current selector list");
    };

    if state.panel.pick(kind, key).is_err() {
        return declined(&req.id, "selector is disabled; choose the filter kind first");
    }
    ok(&req.id, panel_json(&state.panel))
}

fn handle_average_pick_date(state: &mut AppState, req: &Request) -> serde_json::Value {
    let field = match req.params.get("field").and_then(|v| v.as_str()) {
        Some("start") => DateField::Start,
        Some("end") => DateField::End,
        _ => return err(&req.id, "bad_params", "field must be start or end", None),
    };
    let date = match req
        .params
        .get("date")
        .and_then(|v| v.as_str())
        .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
    {
        Some(d) => d,
        None => return err(&req.id, "bad_params", "date must be YYYY-MM-DD", None),
    };

    state.panel.pick_date(field, date);
    ok(&req.id, panel_json(&state.panel))
}

fn handle_average_compute(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };

    // The compute button is disabled until a selection or date event arms
    // it; a request in that state is a gesture the UI never offered.
    if !state.panel.compute_enabled {
        return declined(&req.id, "compute is not enabled");
    }

    match state.panel.decide_compute() {
        ComputeDecision::DateGateClosed => {
            // Silent skip: the result field keeps whatever it showed, and
            // the panel still goes dark.
            state.panel.disable_all();
            ok(
                &req.id,
                json!({ "computed": false, "result": &state.panel.result }),
            )
        }
        ComputeDecision::NoKind | ComputeDecision::NoSelection => {
            state.panel.disable_all();
            declined(&req.id, "filter kind and selection are required")
        }
        ComputeDecision::Run {
            kind,
            start,
            end,
            key,
        } => {
            let result = match calc::average_for(
                conn,
                kind,
                &start.to_string(),
                &end.to_string(),
                &key,
            ) {
                Ok(r) => r,
                Err(e) => return storage_err(&req.id, "db_query_failed", "average.compute", e),
            };
            state.panel.result = Some(result.clone());
            state.panel.disable_all();
            ok(&req.id, json!({ "computed": true, "result": result }))
        }
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "average.pickers" => Some(handle_average_pickers(state, req)),
        "average.panel" => Some(handle_average_panel(state, req)),
        "average.selectFilter" => Some(handle_average_select_filter(state, req)),
        "average.pick" => Some(handle_average_pick(state, req)),
        "average.pickDate" => Some(handle_average_pick_date(state, req)),
        "average.compute" => Some(handle_average_compute(state, req)),
        _ => None,
    }
}
