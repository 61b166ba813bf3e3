use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub father_name: String,
    /// Denormalized: the group's display name, not a key. Renaming or
    /// deleting the group does not touch this field.
    pub group_name: String,
}

impl Student {
    pub fn full_name(&self) -> String {
        format!("{} {} {}", self.last_name, self.first_name, self.father_name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Teacher {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub father_name: String,
}

impl Teacher {
    pub fn full_name(&self) -> String {
        format!("{} {} {}", self.last_name, self.first_name, self.father_name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Subject {
    pub id: String,
    pub name: String,
}

/// The closed set of values the mark editor offers. Anything outside this
/// set is unreachable through the public contract.
pub const MARK_VALUES: [i64; 4] = [2, 3, 4, 5];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Mark {
    pub id: String,
    pub student_id: String,
    /// Denormalized: subject referenced by display name.
    pub subject_name: String,
    pub teacher_id: String,
    pub value: i64,
    /// ISO-8601 date (YYYY-MM-DD) stamped when the mark was entered.
    pub date: String,
}
