use std::path::PathBuf;

use rusqlite::Connection;
use serde::Deserialize;

use crate::catalog::Catalog;
use crate::filter::AveragePanel;
use crate::model::Mark;

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

pub struct AppState {
    pub workspace: Option<PathBuf>,
    pub db: Option<Connection>,
    pub catalog: Catalog,
    /// Marks currently loaded for one student (the Marks tab is always
    /// scoped to a single student, never "all marks").
    pub marks: Vec<Mark>,
    /// The student whose marks are loaded, if any.
    pub marks_student: Option<String>,
    pub panel: AveragePanel,
}

impl AppState {
    pub fn new() -> Self {
        AppState {
            workspace: None,
            db: None,
            catalog: Catalog::default(),
            marks: Vec::new(),
            marks_student: None,
            panel: AveragePanel::default(),
        }
    }
}
