//! State machine behind the average-performance panel.
//!
//! One filter kind is active at a time; picking a kind enables exactly one
//! selector. Any selection or date pick re-enables the compute action, even
//! when other required inputs are still missing — that looseness is part of
//! the contract. After a compute attempt the panel goes dark and the user
//! must pick a kind again.

use chrono::{Datelike, NaiveDate};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    Students,
    Teachers,
    Subjects,
    Groups,
}

impl FilterKind {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "students" => Some(Self::Students),
            "teachers" => Some(Self::Teachers),
            "subjects" => Some(Self::Subjects),
            "groups" => Some(Self::Groups),
            _ => None,
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            Self::Students => "students",
            Self::Teachers => "teachers",
            Self::Subjects => "subjects",
            Self::Groups => "groups",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateField {
    Start,
    End,
}

/// What a compute attempt should do, decided before any query runs.
#[derive(Debug, Clone, PartialEq)]
pub enum ComputeDecision {
    /// No filter kind was ever chosen.
    NoKind,
    /// Kind chosen but its selector has no value.
    NoSelection,
    /// Missing date or the start year is after the end year. The original
    /// treats this as a silent skip, not an error.
    DateGateClosed,
    Run {
        kind: FilterKind,
        start: NaiveDate,
        end: NaiveDate,
        key: String,
    },
}

#[derive(Debug, Default)]
pub struct AveragePanel {
    pub kind: Option<FilterKind>,
    pub students_enabled: bool,
    pub teachers_enabled: bool,
    pub subjects_enabled: bool,
    pub groups_enabled: bool,
    pub compute_enabled: bool,
    /// Selection keys per selector: student id, teacher id, subject name,
    /// group name. Kept separately so switching kinds does not clear a
    /// previously picked value (matching the original combos).
    pub student_key: Option<String>,
    pub teacher_key: Option<String>,
    pub subject_key: Option<String>,
    pub group_key: Option<String>,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub result: Option<String>,
}

impl AveragePanel {
    pub fn selector_enabled(&self, kind: FilterKind) -> bool {
        match kind {
            FilterKind::Students => self.students_enabled,
            FilterKind::Teachers => self.teachers_enabled,
            FilterKind::Subjects => self.subjects_enabled,
            FilterKind::Groups => self.groups_enabled,
        }
    }

    /// Choosing a filter kind: the matching selector enables, the other
    /// three disable, and compute is disabled until a selection or date
    /// event re-arms it.
    pub fn select_kind(&mut self, kind: FilterKind) {
        self.kind = Some(kind);
        self.students_enabled = kind == FilterKind::Students;
        self.teachers_enabled = kind == FilterKind::Teachers;
        self.subjects_enabled = kind == FilterKind::Subjects;
        self.groups_enabled = kind == FilterKind::Groups;
        self.compute_enabled = false;
    }

    /// Records a selector value. Fails when that selector is disabled (the
    /// UI never offered it). Any accepted pick re-enables compute.
    pub fn pick(&mut self, kind: FilterKind, key: String) -> Result<(), ()> {
        if !self.selector_enabled(kind) {
            return Err(());
        }
        match kind {
            FilterKind::Students => self.student_key = Some(key),
            FilterKind::Teachers => self.teacher_key = Some(key),
            FilterKind::Subjects => self.subject_key = Some(key),
            FilterKind::Groups => self.group_key = Some(key),
        }
        self.compute_enabled = true;
        Ok(())
    }

    /// Date pickers are never disabled; either boundary re-enables compute
    /// regardless of what else is still missing.
    pub fn pick_date(&mut self, field: DateField, date: NaiveDate) {
        match field {
            DateField::Start => self.start = Some(date),
            DateField::End => self.end = Some(date),
        }
        self.compute_enabled = true;
    }

    fn selection_key(&self, kind: FilterKind) -> Option<&String> {
        match kind {
            FilterKind::Students => self.student_key.as_ref(),
            FilterKind::Teachers => self.teacher_key.as_ref(),
            FilterKind::Subjects => self.subject_key.as_ref(),
            FilterKind::Groups => self.group_key.as_ref(),
        }
    }

    /// The date gate is deliberately coarse: only the years are compared,
    /// so a chronologically inverted range within one year passes.
    pub fn decide_compute(&self) -> ComputeDecision {
        let (start, end) = match (self.start, self.end) {
            (Some(s), Some(e)) => (s, e),
            _ => return ComputeDecision::DateGateClosed,
        };
        if start.year() > end.year() {
            return ComputeDecision::DateGateClosed;
        }
        let Some(kind) = self.kind else {
            return ComputeDecision::NoKind;
        };
        let Some(key) = self.selection_key(kind) else {
            return ComputeDecision::NoSelection;
        };
        ComputeDecision::Run {
            kind,
            start,
            end,
            key: key.clone(),
        }
    }

    /// One-shot interaction: every compute attempt ends with all four
    /// selectors and the compute action disabled.
    pub fn disable_all(&mut self) {
        self.students_enabled = false;
        self.teachers_enabled = false;
        self.subjects_enabled = false;
        self.groups_enabled = false;
        self.compute_enabled = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").expect("test date")
    }

    #[test]
    fn select_kind_enables_exactly_one_selector() {
        let mut panel = AveragePanel::default();
        panel.select_kind(FilterKind::Teachers);
        assert!(panel.teachers_enabled);
        assert!(!panel.students_enabled);
        assert!(!panel.subjects_enabled);
        assert!(!panel.groups_enabled);
        assert!(!panel.compute_enabled);
    }

    #[test]
    fn pick_on_disabled_selector_is_rejected() {
        let mut panel = AveragePanel::default();
        panel.select_kind(FilterKind::Students);
        assert!(panel.pick(FilterKind::Teachers, "t1".into()).is_err());
        assert!(!panel.compute_enabled);
        assert!(panel.pick(FilterKind::Students, "s1".into()).is_ok());
        assert!(panel.compute_enabled);
    }

    #[test]
    fn switching_kind_disables_compute_until_next_pick() {
        let mut panel = AveragePanel::default();
        panel.select_kind(FilterKind::Students);
        panel.pick(FilterKind::Students, "s1".into()).unwrap();
        assert!(panel.compute_enabled);

        panel.select_kind(FilterKind::Teachers);
        assert!(!panel.students_enabled);
        assert!(!panel.compute_enabled);

        panel.pick(FilterKind::Teachers, "t1".into()).unwrap();
        assert!(panel.compute_enabled);
    }

    #[test]
    fn date_pick_alone_arms_compute() {
        let mut panel = AveragePanel::default();
        panel.pick_date(DateField::Start, date("2023-09-01"));
        assert!(panel.compute_enabled);
        // Incomplete inputs: the gate still declines at compute time.
        assert_eq!(panel.decide_compute(), ComputeDecision::DateGateClosed);
    }

    #[test]
    fn coarse_year_gate_accepts_inverted_same_year_range() {
        let mut panel = AveragePanel::default();
        panel.select_kind(FilterKind::Students);
        panel.pick(FilterKind::Students, "s1".into()).unwrap();
        panel.pick_date(DateField::Start, date("2020-12-31"));
        panel.pick_date(DateField::End, date("2020-01-01"));
        match panel.decide_compute() {
            ComputeDecision::Run { start, end, .. } => {
                assert_eq!(start, date("2020-12-31"));
                assert_eq!(end, date("2020-01-01"));
            }
            other => panic!("expected Run, got {:?}", other),
        }
    }

    #[test]
    fn coarse_year_gate_rejects_later_start_year() {
        let mut panel = AveragePanel::default();
        panel.select_kind(FilterKind::Groups);
        panel.pick(FilterKind::Groups, "10A".into()).unwrap();
        panel.pick_date(DateField::Start, date("2021-01-01"));
        panel.pick_date(DateField::End, date("2020-12-31"));
        assert_eq!(panel.decide_compute(), ComputeDecision::DateGateClosed);
    }

    #[test]
    fn missing_selection_is_distinguished_from_closed_gate() {
        let mut panel = AveragePanel::default();
        panel.select_kind(FilterKind::Subjects);
        panel.pick_date(DateField::Start, date("2023-01-01"));
        panel.pick_date(DateField::End, date("2023-06-30"));
        assert_eq!(panel.decide_compute(), ComputeDecision::NoSelection);
    }

    #[test]
    fn compute_attempt_goes_dark_afterwards() {
        let mut panel = AveragePanel::default();
        panel.select_kind(FilterKind::Students);
        panel.pick(FilterKind::Students, "s1".into()).unwrap();
        panel.disable_all();
        assert!(!panel.students_enabled);
        assert!(!panel.compute_enabled);
        // A previously picked value survives; only enablement resets.
        assert_eq!(panel.student_key.as_deref(), Some("s1"));
    }
}
