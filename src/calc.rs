//! Average-performance calculators: one filtered aggregate per filter kind.
//!
//! Date boundaries arrive as ISO-8601 strings and are compared
//! lexicographically, inclusive on both ends. The result is the formatted
//! string shown in the panel's read-only field.

use rusqlite::Connection;

use crate::filter::FilterKind;
use crate::store::StoreResult;

/// Mean of matching mark values to two decimals, `-` when nothing matches.
fn format_average(avg: Option<f64>) -> String {
    match avg {
        Some(v) => format!("{:.2}", v),
        None => "-".to_string(),
    }
}

pub fn average_for_student(
    conn: &Connection,
    start: &str,
    end: &str,
    student_id: &str,
) -> StoreResult<String> {
    let avg: Option<f64> = conn.query_row(
        "SELECT AVG(value) FROM marks
         WHERE student_id = ? AND date >= ? AND date <= ?",
        (student_id, start, end),
        |row| row.get(0),
    )?;
    Ok(format_average(avg))
}

pub fn average_for_teacher(
    conn: &Connection,
    start: &str,
    end: &str,
    teacher_id: &str,
) -> StoreResult<String> {
    let avg: Option<f64> = conn.query_row(
        "SELECT AVG(value) FROM marks
         WHERE teacher_id = ? AND date >= ? AND date <= ?",
        (teacher_id, start, end),
        |row| row.get(0),
    )?;
    Ok(format_average(avg))
}

pub fn average_for_subject(
    conn: &Connection,
    start: &str,
    end: &str,
    subject_name: &str,
) -> StoreResult<String> {
    let avg: Option<f64> = conn.query_row(
        "SELECT AVG(value) FROM marks
         WHERE subject_name = ? AND date >= ? AND date <= ?",
        (subject_name, start, end),
        |row| row.get(0),
    )?;
    Ok(format_average(avg))
}

/// Group membership is resolved through the students' denormalized
/// group_name string, so marks of a student moved out of the group stop
/// counting while orphaned marks of deleted students never count.
pub fn average_for_group(
    conn: &Connection,
    start: &str,
    end: &str,
    group_name: &str,
) -> StoreResult<String> {
    let avg: Option<f64> = conn.query_row(
        "SELECT AVG(m.value) FROM marks m
         JOIN students s ON s.id = m.student_id
         WHERE s.group_name = ? AND m.date >= ? AND m.date <= ?",
        (group_name, start, end),
        |row| row.get(0),
    )?;
    Ok(format_average(avg))
}

pub fn average_for(
    conn: &Connection,
    kind: FilterKind,
    start: &str,
    end: &str,
    key: &str,
) -> StoreResult<String> {
    match kind {
        FilterKind::Students => average_for_student(conn, start, end, key),
        FilterKind::Teachers => average_for_teacher(conn, start, end, key),
        FilterKind::Subjects => average_for_subject(conn, start, end, key),
        FilterKind::Groups => average_for_group(conn, start, end, key),
    }
}
