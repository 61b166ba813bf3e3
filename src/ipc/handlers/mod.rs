pub mod average;
pub mod core;
pub mod groups;
pub mod marks;
pub mod students;
pub mod subjects;
pub mod teachers;
