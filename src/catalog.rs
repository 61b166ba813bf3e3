//! In-memory mirrors of the entity tables plus the picker snapshots that
//! back the Marks and Average selection combos.
//!
//! Pickers are copies, not views: a mutation only shows up in a picker once
//! the matching cascade reload has run. Which mutations cascade where is
//! fixed (see the handler modules) and deliberately uneven, e.g. renaming a
//! group refreshes the average pickers but not the marks pickers.

use rusqlite::Connection;

use crate::model::{Group, Student, Subject, Teacher};
use crate::store::{self, StoreResult};

#[derive(Debug, Default)]
pub struct MarkPickers {
    pub students: Vec<Student>,
    pub subjects: Vec<Subject>,
    pub teachers: Vec<Teacher>,
}

#[derive(Debug, Default)]
pub struct AveragePickers {
    pub students: Vec<Student>,
    pub teachers: Vec<Teacher>,
    pub subjects: Vec<Subject>,
    pub groups: Vec<Group>,
}

#[derive(Debug, Default)]
pub struct Catalog {
    pub groups: Vec<Group>,
    pub students: Vec<Student>,
    pub teachers: Vec<Teacher>,
    pub subjects: Vec<Subject>,
    pub mark_pickers: MarkPickers,
    pub average_pickers: AveragePickers,
}

impl Catalog {
    /// Initial load after a workspace is opened: all four base lists plus
    /// both picker families.
    pub fn load_all(&mut self, conn: &Connection) -> StoreResult<()> {
        self.reload_groups(conn)?;
        self.reload_students(conn)?;
        self.reload_teachers(conn)?;
        self.reload_subjects(conn)?;
        self.reload_mark_pickers();
        self.reload_average_pickers();
        Ok(())
    }

    pub fn reload_groups(&mut self, conn: &Connection) -> StoreResult<()> {
        self.groups = store::groups::all(conn)?;
        Ok(())
    }

    pub fn reload_students(&mut self, conn: &Connection) -> StoreResult<()> {
        self.students = store::students::all(conn)?;
        Ok(())
    }

    pub fn reload_teachers(&mut self, conn: &Connection) -> StoreResult<()> {
        self.teachers = store::teachers::all(conn)?;
        Ok(())
    }

    pub fn reload_subjects(&mut self, conn: &Connection) -> StoreResult<()> {
        self.subjects = store::subjects::all(conn)?;
        Ok(())
    }

    pub fn reload_mark_pickers(&mut self) {
        self.mark_pickers = MarkPickers {
            students: self.students.clone(),
            subjects: self.subjects.clone(),
            teachers: self.teachers.clone(),
        };
    }

    pub fn reload_average_pickers(&mut self) {
        self.average_pickers = AveragePickers {
            students: self.students.clone(),
            teachers: self.teachers.clone(),
            subjects: self.subjects.clone(),
            groups: self.groups.clone(),
        };
    }
}
