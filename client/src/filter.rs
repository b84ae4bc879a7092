//! Filter and selection derivation for the day view
//!
//! Filtering is a pure function of the day aggregate and the filter state:
//! search text, then class, then the quick filter. The result keeps the
//! order of the source rows. Selection is a plain set of student-day ids.

use crate::config::{EM_THRESHOLD, FM_THRESHOLD};
use crate::models::{DayData, StudentDay, WarningType};
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

/// Named predicates narrowing the visible rows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuickFilter {
    #[default]
    All,
    MissingStaff,
    SpecialNeeds,
    Warnings,
}

impl std::str::FromStr for QuickFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "all" => Ok(QuickFilter::All),
            "missing_staff" => Ok(QuickFilter::MissingStaff),
            "special_needs" => Ok(QuickFilter::SpecialNeeds),
            "warnings" => Ok(QuickFilter::Warnings),
            other => Err(format!(
                "Unknown quick filter '{}'. Use all, missing_staff, special_needs or warnings",
                other
            )),
        }
    }
}

/// The filter state of the day view. Never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DayFilter {
    pub search_term: String,
    pub selected_class: Option<Uuid>,
    pub quick_filter: QuickFilter,
}

impl DayFilter {
    pub fn is_default(&self) -> bool {
        *self == DayFilter::default()
    }
}

/// Per-day facts the quick filters need besides the row itself
#[derive(Debug, Clone, Default)]
pub struct DayContext {
    pub absent_staff: HashSet<Uuid>,
    pub warned_students: HashSet<Uuid>,
}

impl DayContext {
    /// Absent staff are those the server flags with an `absence` warning.
    pub fn from_day(day: &DayData) -> Self {
        let absent_staff = day
            .warnings
            .iter()
            .filter(|w| w.warning_type == WarningType::Absence)
            .filter_map(|w| w.staff_id)
            .collect();
        let warned_students = day.warnings.iter().filter_map(|w| w.student_id).collect();

        Self {
            absent_staff,
            warned_students,
        }
    }
}

fn parse_hhmm(raw: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(raw.trim(), "%H:%M").ok()
}

fn threshold(raw: &str) -> NaiveTime {
    parse_hhmm(raw).unwrap_or(NaiveTime::MIN)
}

/// Arrival strictly before 08:30 needs FM coverage.
pub fn needs_fm(row: &StudentDay) -> bool {
    row.arrival_time
        .as_deref()
        .and_then(parse_hhmm)
        .is_some_and(|t| t < threshold(FM_THRESHOLD))
}

/// Departure strictly after 13:30 needs EM coverage.
pub fn needs_em(row: &StudentDay) -> bool {
    row.departure_time
        .as_deref()
        .and_then(parse_hhmm)
        .is_some_and(|t| t > threshold(EM_THRESHOLD))
}

fn uncovered(staff: Option<Uuid>, absent: &HashSet<Uuid>) -> bool {
    match staff {
        None => true,
        Some(id) => absent.contains(&id),
    }
}

pub fn is_missing_staff(row: &StudentDay, absent_staff: &HashSet<Uuid>) -> bool {
    (needs_fm(row) && uncovered(row.fm_staff_id, absent_staff))
        || (needs_em(row) && uncovered(row.em_staff_id, absent_staff))
}

pub fn matches_search(row: &StudentDay, search_term: &str) -> bool {
    if search_term.is_empty() {
        return true;
    }
    let needle = search_term.to_lowercase();
    row.student_name
        .as_deref()
        .is_some_and(|name| name.to_lowercase().contains(&needle))
}

pub fn matches_class(row: &StudentDay, selected_class: Option<Uuid>) -> bool {
    match selected_class {
        None => true,
        Some(class_id) => row.class_id == Some(class_id),
    }
}

pub fn matches_quick_filter(row: &StudentDay, quick: QuickFilter, context: &DayContext) -> bool {
    match quick {
        QuickFilter::All => true,
        QuickFilter::MissingStaff => is_missing_staff(row, &context.absent_staff),
        QuickFilter::SpecialNeeds => row.has_care_needs.unwrap_or(false),
        QuickFilter::Warnings => context.warned_students.contains(&row.student_id),
    }
}

/// Rows of the day that pass every predicate, in source order.
pub fn filter_rows<'a>(day: &'a DayData, filter: &DayFilter) -> Vec<&'a StudentDay> {
    let context = DayContext::from_day(day);
    day.student_days
        .iter()
        .filter(|row| matches_search(row, &filter.search_term))
        .filter(|row| matches_class(row, filter.selected_class))
        .filter(|row| matches_quick_filter(row, filter.quick_filter, &context))
        .collect()
}

/// Student-day ids checked for bulk assignment
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    ids: HashSet<Uuid>,
}

impl Selection {
    pub fn toggle(&mut self, id: Uuid) {
        if !self.ids.remove(&id) {
            self.ids.insert(id);
        }
    }

    /// Clear the visible rows if all of them are selected, otherwise select
    /// exactly the visible rows. Ids outside `visible` are left alone.
    pub fn toggle_all(&mut self, visible: &[Uuid]) {
        let all_selected = !visible.is_empty() && visible.iter().all(|id| self.ids.contains(id));
        if all_selected {
            for id in visible {
                self.ids.remove(id);
            }
        } else {
            self.ids.extend(visible.iter().copied());
        }
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.ids.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    /// Selected ids in the order they appear in `rows`
    pub fn ordered<'a>(&self, rows: impl IntoIterator<Item = &'a StudentDay>) -> Vec<Uuid> {
        rows.into_iter()
            .map(|row| row.id)
            .filter(|id| self.ids.contains(id))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AbsentType, Warning, WarningSeverity};

    fn row(name: &str, arrival: Option<&str>, departure: Option<&str>) -> StudentDay {
        StudentDay {
            id: Uuid::new_v4(),
            week_schedule_id: Uuid::nil(),
            student_id: Uuid::new_v4(),
            weekday: 0,
            arrival_time: arrival.map(str::to_string),
            departure_time: departure.map(str::to_string),
            fm_staff_id: None,
            em_staff_id: None,
            notes: None,
            absent_type: AbsentType::None,
            student_name: Some(name.to_string()),
            class_name: None,
            class_id: None,
            grade: Some(2),
            has_care_needs: Some(false),
            fm_staff_name: None,
            em_staff_name: None,
        }
    }

    fn day(rows: Vec<StudentDay>, warnings: Vec<Warning>) -> DayData {
        DayData {
            weekday: 0,
            student_days: rows,
            staff_shifts: Vec::new(),
            day_assignments: Vec::new(),
            warnings,
        }
    }

    fn warning(kind: WarningType, staff: Option<Uuid>, student: Option<Uuid>) -> Warning {
        Warning {
            warning_type: kind,
            severity: WarningSeverity::Warning,
            message: "varning".to_string(),
            staff_id: staff,
            student_id: student,
            weekday: 0,
            time: None,
        }
    }

    #[test]
    fn test_thresholds_are_strict() {
        assert!(needs_fm(&row("A", Some("08:29"), None)));
        assert!(!needs_fm(&row("A", Some("08:30"), None)));
        assert!(needs_em(&row("A", None, Some("13:31"))));
        assert!(!needs_em(&row("A", None, Some("13:30"))));
        assert!(!needs_fm(&row("A", None, None)));
        assert!(!needs_fm(&row("A", Some(""), None)));
    }

    #[test]
    fn test_missing_staff_rule() {
        let absent_id = Uuid::new_v4();
        let present_id = Uuid::new_v4();
        let absent: HashSet<Uuid> = [absent_id].into_iter().collect();

        let mut covered = row("Covered", Some("07:30"), Some("16:00"));
        covered.fm_staff_id = Some(present_id);
        covered.em_staff_id = Some(present_id);
        assert!(!is_missing_staff(&covered, &absent));

        let mut fm_absent = covered.clone();
        fm_absent.fm_staff_id = Some(absent_id);
        assert!(is_missing_staff(&fm_absent, &absent));

        let mut em_missing = covered.clone();
        em_missing.em_staff_id = None;
        assert!(is_missing_staff(&em_missing, &absent));

        // No need for coverage: unassigned is fine.
        let school_hours = row("Mid", Some("08:30"), Some("13:30"));
        assert!(!is_missing_staff(&school_hours, &absent));
    }

    #[test]
    fn test_filter_chain_preserves_order() {
        let class_a = Uuid::new_v4();
        let mut alva = row("Alva Ek", Some("07:00"), Some("15:00"));
        alva.class_id = Some(class_a);
        let mut bo = row("Bo Lind", Some("09:00"), Some("12:00"));
        bo.class_id = Some(class_a);
        let mut alma = row("Alma Svensson", Some("07:15"), Some("16:30"));
        alma.class_id = Some(Uuid::new_v4());
        let data = day(vec![alva.clone(), bo.clone(), alma.clone()], Vec::new());

        let search = DayFilter {
            search_term: "AL".to_string(),
            ..Default::default()
        };
        let names: Vec<_> = filter_rows(&data, &search)
            .iter()
            .map(|r| r.student_name.clone().unwrap())
            .collect();
        assert_eq!(names, vec!["Alva Ek", "Alma Svensson"]);

        let class_and_missing = DayFilter {
            search_term: String::new(),
            selected_class: Some(class_a),
            quick_filter: QuickFilter::MissingStaff,
        };
        let ids: Vec<_> = filter_rows(&data, &class_and_missing).iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![alva.id]);
    }

    #[test]
    fn test_predicate_order_does_not_matter() {
        let class_a = Uuid::new_v4();
        let mut rows = Vec::new();
        for (i, name) in ["Ada", "Adam", "Bea", "Adrian"].iter().enumerate() {
            let mut r = row(name, Some(if i % 2 == 0 { "07:00" } else { "09:00" }), Some("15:00"));
            r.class_id = if i < 3 { Some(class_a) } else { None };
            r.has_care_needs = Some(i != 1);
            rows.push(r);
        }
        let data = day(rows, Vec::new());
        let context = DayContext::from_day(&data);
        let filter = DayFilter {
            search_term: "ad".to_string(),
            selected_class: Some(class_a),
            quick_filter: QuickFilter::SpecialNeeds,
        };

        let forward = filter_rows(&data, &filter);
        let reversed: Vec<&StudentDay> = data
            .student_days
            .iter()
            .filter(|r| matches_quick_filter(r, filter.quick_filter, &context))
            .filter(|r| matches_class(r, filter.selected_class))
            .filter(|r| matches_search(r, &filter.search_term))
            .collect();

        assert_eq!(forward, reversed);
        assert_eq!(forward.len(), 1);
    }

    #[test]
    fn test_special_needs_and_warnings_filters() {
        let mut needs = row("Nils", None, None);
        needs.has_care_needs = Some(true);
        let warned = row("Wilma", None, None);
        let plain = row("Pelle", None, None);
        let data = day(
            vec![needs.clone(), warned.clone(), plain],
            vec![warning(WarningType::Gap, None, Some(warned.student_id))],
        );

        let special = DayFilter {
            quick_filter: QuickFilter::SpecialNeeds,
            ..Default::default()
        };
        let with_warnings = DayFilter {
            quick_filter: QuickFilter::Warnings,
            ..Default::default()
        };

        assert_eq!(filter_rows(&data, &special)[0].id, needs.id);
        assert_eq!(filter_rows(&data, &special).len(), 1);
        assert_eq!(filter_rows(&data, &with_warnings)[0].id, warned.id);
        assert_eq!(filter_rows(&data, &with_warnings).len(), 1);
    }

    #[test]
    fn test_absent_staff_from_absence_warnings_only() {
        let absent = Uuid::new_v4();
        let busy = Uuid::new_v4();
        let data = day(
            Vec::new(),
            vec![
                warning(WarningType::Absence, Some(absent), None),
                warning(WarningType::Workload, Some(busy), None),
            ],
        );

        let context = DayContext::from_day(&data);

        assert!(context.absent_staff.contains(&absent));
        assert!(!context.absent_staff.contains(&busy));
    }

    #[test]
    fn test_toggle_all_twice_deselects() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let mut selection = Selection::default();

        selection.toggle_all(&[a, b]);
        assert!(selection.contains(a) && selection.contains(b));

        selection.toggle_all(&[a, b]);
        assert!(selection.is_empty());
    }

    #[test]
    fn test_toggle_all_leaves_hidden_rows_untouched() {
        let hidden = Uuid::new_v4();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let mut selection = Selection::default();
        selection.toggle(hidden);
        selection.toggle(a);

        // Not every visible row is selected: select exactly the visible ones.
        selection.toggle_all(&[a, b]);
        assert_eq!(selection.len(), 3);

        selection.toggle_all(&[a, b]);
        assert_eq!(selection.len(), 1);
        assert!(selection.contains(hidden));
    }

    #[test]
    fn test_toggle_one() {
        let id = Uuid::new_v4();
        let mut selection = Selection::default();
        selection.toggle(id);
        assert!(selection.contains(id));
        selection.toggle(id);
        assert!(!selection.contains(id));
    }

    #[test]
    fn test_search_is_plain_substring() {
        let alva = row("Alva Ek", Some("08:00"), Some("15:00"));

        assert!(matches_search(&alva, ""));
        assert!(matches_search(&alva, "VA E"));
        assert!(matches_search(&alva, " ek"));
        // Whitespace is part of the needle.
        assert!(!matches_search(&alva, "ek "));
        assert!(!matches_search(&alva, " "));
    }

    #[test]
    fn test_default_filter() {
        assert!(DayFilter::default().is_default());

        let searching = DayFilter {
            search_term: "al".to_string(),
            ..Default::default()
        };
        let quick = DayFilter {
            quick_filter: QuickFilter::Warnings,
            ..Default::default()
        };
        assert!(!searching.is_default());
        assert!(!quick.is_default());
    }

    #[test]
    fn test_quick_filter_from_str() {
        assert_eq!("missing-staff".parse::<QuickFilter>(), Ok(QuickFilter::MissingStaff));
        assert_eq!("Warnings".parse::<QuickFilter>(), Ok(QuickFilter::Warnings));
        assert!("everything".parse::<QuickFilter>().is_err());
    }
}
