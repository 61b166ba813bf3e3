//! Persistence access, one submodule per entity table.
//!
//! Every function takes a borrowed connection so the catalog, the handlers
//! and the calculators can share one open database.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Db(#[from] rusqlite::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

pub mod groups {
    use super::StoreResult;
    use crate::model::Group;
    use rusqlite::Connection;
    use uuid::Uuid;

    pub fn all(conn: &Connection) -> StoreResult<Vec<Group>> {
        let mut stmt = conn.prepare("SELECT id, name FROM groups ORDER BY name")?;
        let rows = stmt
            .query_map([], |row| {
                Ok(Group {
                    id: row.get(0)?,
                    name: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn insert(conn: &Connection, name: &str) -> StoreResult<Group> {
        let group = Group {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
        };
        conn.execute(
            "INSERT INTO groups(id, name) VALUES(?, ?)",
            (&group.id, &group.name),
        )?;
        Ok(group)
    }

    pub fn update(conn: &Connection, id: &str, name: &str) -> StoreResult<()> {
        conn.execute("UPDATE groups SET name = ? WHERE id = ?", (name, id))?;
        Ok(())
    }

    pub fn delete(conn: &Connection, id: &str) -> StoreResult<()> {
        // No cascade: students keep referring to the deleted group by name.
        conn.execute("DELETE FROM groups WHERE id = ?", [id])?;
        Ok(())
    }
}

pub mod students {
    use super::StoreResult;
    use crate::model::Student;
    use rusqlite::Connection;
    use uuid::Uuid;

    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Student> {
        Ok(Student {
            id: row.get(0)?,
            first_name: row.get(1)?,
            last_name: row.get(2)?,
            father_name: row.get(3)?,
            group_name: row.get(4)?,
        })
    }

    pub fn all(conn: &Connection) -> StoreResult<Vec<Student>> {
        let mut stmt = conn.prepare(
            "SELECT id, first_name, last_name, father_name, group_name
             FROM students ORDER BY last_name, first_name",
        )?;
        let rows = stmt
            .query_map([], |row| from_row(row))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn insert(
        conn: &Connection,
        first_name: &str,
        last_name: &str,
        father_name: &str,
        group_name: &str,
    ) -> StoreResult<Student> {
        let student = Student {
            id: Uuid::new_v4().to_string(),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            father_name: father_name.to_string(),
            group_name: group_name.to_string(),
        };
        conn.execute(
            "INSERT INTO students(id, first_name, last_name, father_name, group_name)
             VALUES(?, ?, ?, ?, ?)",
            (
                &student.id,
                &student.first_name,
                &student.last_name,
                &student.father_name,
                &student.group_name,
            ),
        )?;
        Ok(student)
    }

    pub fn update(conn: &Connection, id: &str, new: &Student) -> StoreResult<()> {
        conn.execute(
            "UPDATE students
             SET first_name = ?, last_name = ?, father_name = ?, group_name = ?
             WHERE id = ?",
            (
                &new.first_name,
                &new.last_name,
                &new.father_name,
                &new.group_name,
                id,
            ),
        )?;
        Ok(())
    }

    pub fn delete(conn: &Connection, id: &str) -> StoreResult<()> {
        // Marks entered for this student stay behind as orphans.
        conn.execute("DELETE FROM students WHERE id = ?", [id])?;
        Ok(())
    }
}

pub mod teachers {
    use super::StoreResult;
    use crate::model::Teacher;
    use rusqlite::Connection;
    use uuid::Uuid;

    pub fn all(conn: &Connection) -> StoreResult<Vec<Teacher>> {
        let mut stmt = conn.prepare(
            "SELECT id, first_name, last_name, father_name
             FROM teachers ORDER BY last_name, first_name",
        )?;
        let rows = stmt
            .query_map([], |row| {
                Ok(Teacher {
                    id: row.get(0)?,
                    first_name: row.get(1)?,
                    last_name: row.get(2)?,
                    father_name: row.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn insert(
        conn: &Connection,
        first_name: &str,
        last_name: &str,
        father_name: &str,
    ) -> StoreResult<Teacher> {
        let teacher = Teacher {
            id: Uuid::new_v4().to_string(),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            father_name: father_name.to_string(),
        };
        conn.execute(
            "INSERT INTO teachers(id, first_name, last_name, father_name)
             VALUES(?, ?, ?, ?)",
            (
                &teacher.id,
                &teacher.first_name,
                &teacher.last_name,
                &teacher.father_name,
            ),
        )?;
        Ok(teacher)
    }

    pub fn update(conn: &Connection, id: &str, new: &Teacher) -> StoreResult<()> {
        conn.execute(
            "UPDATE teachers SET first_name = ?, last_name = ?, father_name = ? WHERE id = ?",
            (&new.first_name, &new.last_name, &new.father_name, id),
        )?;
        Ok(())
    }

    pub fn delete(conn: &Connection, id: &str) -> StoreResult<()> {
        conn.execute("DELETE FROM teachers WHERE id = ?", [id])?;
        Ok(())
    }
}

pub mod subjects {
    use super::StoreResult;
    use crate::model::Subject;
    use rusqlite::Connection;
    use uuid::Uuid;

    pub fn all(conn: &Connection) -> StoreResult<Vec<Subject>> {
        let mut stmt = conn.prepare("SELECT id, name FROM subjects ORDER BY name")?;
        let rows = stmt
            .query_map([], |row| {
                Ok(Subject {
                    id: row.get(0)?,
                    name: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn insert(conn: &Connection, name: &str) -> StoreResult<Subject> {
        let subject = Subject {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
        };
        conn.execute(
            "INSERT INTO subjects(id, name) VALUES(?, ?)",
            (&subject.id, &subject.name),
        )?;
        Ok(subject)
    }

    pub fn update(conn: &Connection, id: &str, name: &str) -> StoreResult<()> {
        // Marks keep the old subject_name string; no rewrite.
        conn.execute("UPDATE subjects SET name = ? WHERE id = ?", (name, id))?;
        Ok(())
    }

    pub fn delete(conn: &Connection, id: &str) -> StoreResult<()> {
        conn.execute("DELETE FROM subjects WHERE id = ?", [id])?;
        Ok(())
    }
}

pub mod marks {
    use super::StoreResult;
    use crate::model::Mark;
    use rusqlite::Connection;
    use uuid::Uuid;

    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Mark> {
        Ok(Mark {
            id: row.get(0)?,
            student_id: row.get(1)?,
            subject_name: row.get(2)?,
            teacher_id: row.get(3)?,
            value: row.get(4)?,
            date: row.get(5)?,
        })
    }

    pub fn all_by_student(conn: &Connection, student_id: &str) -> StoreResult<Vec<Mark>> {
        let mut stmt = conn.prepare(
            "SELECT id, student_id, subject_name, teacher_id, value, date
             FROM marks WHERE student_id = ? ORDER BY date, rowid",
        )?;
        let rows = stmt
            .query_map([student_id], |row| from_row(row))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn insert(
        conn: &Connection,
        student_id: &str,
        subject_name: &str,
        teacher_id: &str,
        value: i64,
        date: &str,
    ) -> StoreResult<Mark> {
        let mark = Mark {
            id: Uuid::new_v4().to_string(),
            student_id: student_id.to_string(),
            subject_name: subject_name.to_string(),
            teacher_id: teacher_id.to_string(),
            value,
            date: date.to_string(),
        };
        conn.execute(
            "INSERT INTO marks(id, student_id, subject_name, teacher_id, value, date)
             VALUES(?, ?, ?, ?, ?, ?)",
            (
                &mark.id,
                &mark.student_id,
                &mark.subject_name,
                &mark.teacher_id,
                &mark.value,
                &mark.date,
            ),
        )?;
        Ok(mark)
    }

    /// The inline value editor only ever changes the value column.
    pub fn update_value(conn: &Connection, id: &str, value: i64) -> StoreResult<()> {
        conn.execute("UPDATE marks SET value = ? WHERE id = ?", (value, id))?;
        Ok(())
    }

    pub fn delete(conn: &Connection, id: &str) -> StoreResult<()> {
        conn.execute("DELETE FROM marks WHERE id = ?", [id])?;
        Ok(())
    }
}
