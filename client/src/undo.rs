//! Undo for inline edits
//!
//! An undo record names the row it touched, the field with its pre-edit
//! value and the mutation kind to replay. `build_revert_request` turns a
//! record into the partial update that restores that value. There is no
//! redo.

use crate::config;
use crate::models::{AbsentType, StaffShift, StaffShiftUpdate, StudentDay, StudentDayUpdate};
use crate::query::MutationKind;
use std::collections::VecDeque;
use uuid::Uuid;

/// LIFO stack that keeps only the newest `limit` entries.
#[derive(Debug, Clone)]
pub struct UndoStack<T> {
    entries: VecDeque<T>,
    limit: usize,
}

impl<T> Default for UndoStack<T> {
    fn default() -> Self {
        Self::with_limit(config::UNDO_STACK_LIMIT)
    }
}

impl<T> UndoStack<T> {
    pub fn with_limit(limit: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(limit),
            limit,
        }
    }

    /// Append an entry, dropping the oldest one once over the limit.
    pub fn push(&mut self, entry: T) {
        self.entries.push_back(entry);
        while self.entries.len() > self.limit {
            self.entries.pop_front();
        }
    }

    pub fn pop(&mut self) -> Option<T> {
        self.entries.pop_back()
    }

    pub fn peek(&self) -> Option<&T> {
        self.entries.back()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Entries from oldest to newest
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.entries.iter()
    }
}

/// One field of a student day together with a value for it
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StudentDayEdit {
    ArrivalTime(Option<String>),
    DepartureTime(Option<String>),
    FmStaff(Option<Uuid>),
    EmStaff(Option<Uuid>),
    Notes(Option<String>),
    Absence(AbsentType),
}

impl StudentDayEdit {
    /// The same field, holding the value `row` has now.
    pub fn current_in(&self, row: &StudentDay) -> Self {
        match self {
            StudentDayEdit::ArrivalTime(_) => StudentDayEdit::ArrivalTime(row.arrival_time.clone()),
            StudentDayEdit::DepartureTime(_) => {
                StudentDayEdit::DepartureTime(row.departure_time.clone())
            }
            StudentDayEdit::FmStaff(_) => StudentDayEdit::FmStaff(row.fm_staff_id),
            StudentDayEdit::EmStaff(_) => StudentDayEdit::EmStaff(row.em_staff_id),
            StudentDayEdit::Notes(_) => StudentDayEdit::Notes(row.notes.clone()),
            StudentDayEdit::Absence(_) => StudentDayEdit::Absence(row.absent_type),
        }
    }

    /// Partial update touching only this field. `None` values are sent as
    /// explicit nulls, empty strings as empty strings.
    pub fn to_update(&self) -> StudentDayUpdate {
        let mut update = StudentDayUpdate::default();
        match self {
            StudentDayEdit::ArrivalTime(v) => update.arrival_time = Some(v.clone()),
            StudentDayEdit::DepartureTime(v) => update.departure_time = Some(v.clone()),
            StudentDayEdit::FmStaff(v) => update.fm_staff_id = Some(*v),
            StudentDayEdit::EmStaff(v) => update.em_staff_id = Some(*v),
            StudentDayEdit::Notes(v) => update.notes = Some(v.clone()),
            StudentDayEdit::Absence(v) => update.absent_type = Some(*v),
        }
        update
    }

    pub fn field_name(&self) -> &'static str {
        match self {
            StudentDayEdit::ArrivalTime(_) => "ankomst",
            StudentDayEdit::DepartureTime(_) => "hämtning",
            StudentDayEdit::FmStaff(_) => "FM-personal",
            StudentDayEdit::EmStaff(_) => "EM-personal",
            StudentDayEdit::Notes(_) => "anteckning",
            StudentDayEdit::Absence(_) => "frånvaro",
        }
    }
}

/// One field of a staff shift together with a value for it
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StaffShiftEdit {
    StartTime(String),
    EndTime(String),
    BreakMinutes(u32),
    Notes(Option<String>),
}

impl StaffShiftEdit {
    pub fn current_in(&self, shift: &StaffShift) -> Self {
        match self {
            StaffShiftEdit::StartTime(_) => StaffShiftEdit::StartTime(shift.start_time.clone()),
            StaffShiftEdit::EndTime(_) => StaffShiftEdit::EndTime(shift.end_time.clone()),
            StaffShiftEdit::BreakMinutes(_) => StaffShiftEdit::BreakMinutes(shift.break_minutes),
            StaffShiftEdit::Notes(_) => StaffShiftEdit::Notes(shift.notes.clone()),
        }
    }

    pub fn to_update(&self) -> StaffShiftUpdate {
        let mut update = StaffShiftUpdate::default();
        match self {
            StaffShiftEdit::StartTime(v) => update.start_time = Some(v.clone()),
            StaffShiftEdit::EndTime(v) => update.end_time = Some(v.clone()),
            StaffShiftEdit::BreakMinutes(v) => update.break_minutes = Some(*v),
            StaffShiftEdit::Notes(v) => update.notes = Some(v.clone()),
        }
        update
    }

    pub fn field_name(&self) -> &'static str {
        match self {
            StaffShiftEdit::StartTime(_) => "start",
            StaffShiftEdit::EndTime(_) => "slut",
            StaffShiftEdit::BreakMinutes(_) => "rast",
            StaffShiftEdit::Notes(_) => "anteckning",
        }
    }
}

/// The row an edit touched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditTarget {
    StudentDay { week_id: Uuid, student_day_id: Uuid },
    StaffShift { week_id: Uuid, shift_id: Uuid },
}

/// The field and the value it held before the edit
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreviousValue {
    StudentDay(StudentDayEdit),
    StaffShift(StaffShiftEdit),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UndoRecord {
    pub label: String,
    pub target: EditTarget,
    pub previous_value: PreviousValue,
    pub mutation_kind: MutationKind,
}

impl UndoRecord {
    pub fn student_day(
        week_id: Uuid,
        student_day_id: Uuid,
        previous: StudentDayEdit,
        label: impl Into<String>,
    ) -> Self {
        Self {
            label: label.into(),
            target: EditTarget::StudentDay {
                week_id,
                student_day_id,
            },
            previous_value: PreviousValue::StudentDay(previous),
            mutation_kind: MutationKind::UpdateStudentDay,
        }
    }

    pub fn staff_shift(
        week_id: Uuid,
        shift_id: Uuid,
        previous: StaffShiftEdit,
        label: impl Into<String>,
    ) -> Self {
        Self {
            label: label.into(),
            target: EditTarget::StaffShift { week_id, shift_id },
            previous_value: PreviousValue::StaffShift(previous),
            mutation_kind: MutationKind::UpdateStaffShift,
        }
    }
}

/// The mutation that undoes a record
#[derive(Debug, Clone, PartialEq)]
pub enum RevertRequest {
    StudentDay {
        week_id: Uuid,
        student_day_id: Uuid,
        update: StudentDayUpdate,
    },
    StaffShift {
        week_id: Uuid,
        shift_id: Uuid,
        update: StaffShiftUpdate,
    },
}

impl RevertRequest {
    pub fn mutation_kind(&self) -> MutationKind {
        match self {
            RevertRequest::StudentDay { .. } => MutationKind::UpdateStudentDay,
            RevertRequest::StaffShift { .. } => MutationKind::UpdateStaffShift,
        }
    }
}

/// Build the partial update that puts the previous value back.
///
/// Returns `None` when the target and the recorded field disagree.
pub fn build_revert_request(record: &UndoRecord) -> Option<RevertRequest> {
    match (&record.target, &record.previous_value) {
        (
            EditTarget::StudentDay {
                week_id,
                student_day_id,
            },
            PreviousValue::StudentDay(previous),
        ) => Some(RevertRequest::StudentDay {
            week_id: *week_id,
            student_day_id: *student_day_id,
            update: previous.to_update(),
        }),
        (EditTarget::StaffShift { week_id, shift_id }, PreviousValue::StaffShift(previous)) => {
            Some(RevertRequest::StaffShift {
                week_id: *week_id,
                shift_id: *shift_id,
                update: previous.to_update(),
            })
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_push_beyond_limit_drops_oldest() {
        let mut stack = UndoStack::with_limit(3);
        for i in 0..5 {
            stack.push(i);
        }

        assert_eq!(stack.len(), 3);
        assert_eq!(stack.iter().copied().collect::<Vec<_>>(), vec![2, 3, 4]);
        assert_eq!(stack.pop(), Some(4));
        assert_eq!(stack.pop(), Some(3));
        assert_eq!(stack.pop(), Some(2));
        assert_eq!(stack.pop(), None);
    }

    #[test]
    fn test_default_limit() {
        let mut stack = UndoStack::default();
        for i in 0..(config::UNDO_STACK_LIMIT + 7) {
            stack.push(i);
        }

        assert_eq!(stack.len(), config::UNDO_STACK_LIMIT);
        assert_eq!(stack.peek(), Some(&(config::UNDO_STACK_LIMIT + 6)));
    }

    #[test]
    fn test_pop_on_empty_is_noop() {
        let mut stack: UndoStack<u8> = UndoStack::default();
        assert_eq!(stack.pop(), None);
        assert!(stack.is_empty());
    }

    #[test]
    fn test_clear() {
        let mut stack = UndoStack::default();
        stack.push("a");
        stack.push("b");
        stack.clear();
        assert!(stack.is_empty());
    }

    #[test]
    fn test_revert_of_null_sends_explicit_null() {
        let week_id = Uuid::new_v4();
        let sd_id = Uuid::new_v4();
        let record = UndoRecord::student_day(week_id, sd_id, StudentDayEdit::FmStaff(None), "FM");

        let revert = build_revert_request(&record).unwrap();

        match revert {
            RevertRequest::StudentDay {
                week_id: w,
                student_day_id: s,
                update,
            } => {
                assert_eq!((w, s), (week_id, sd_id));
                assert_eq!(serde_json::to_value(&update).unwrap(), json!({ "fm_staff_id": null }));
            }
            other => panic!("unexpected revert {:?}", other),
        }
    }

    #[test]
    fn test_revert_keeps_empty_string_distinct_from_null() {
        let empty = UndoRecord::student_day(
            Uuid::nil(),
            Uuid::nil(),
            StudentDayEdit::ArrivalTime(Some(String::new())),
            "ankomst",
        );
        let null = UndoRecord::student_day(
            Uuid::nil(),
            Uuid::nil(),
            StudentDayEdit::ArrivalTime(None),
            "ankomst",
        );

        let body = |record: &UndoRecord| match build_revert_request(record).unwrap() {
            RevertRequest::StudentDay { update, .. } => serde_json::to_value(update).unwrap(),
            other => panic!("unexpected revert {:?}", other),
        };

        assert_eq!(body(&empty), json!({ "arrival_time": "" }));
        assert_eq!(body(&null), json!({ "arrival_time": null }));
    }

    #[test]
    fn test_shift_revert() {
        let record = UndoRecord::staff_shift(
            Uuid::nil(),
            Uuid::nil(),
            StaffShiftEdit::BreakMinutes(30),
            "rast",
        );

        let revert = build_revert_request(&record).unwrap();

        assert_eq!(revert.mutation_kind(), MutationKind::UpdateStaffShift);
        match revert {
            RevertRequest::StaffShift { update, .. } => {
                assert_eq!(serde_json::to_value(update).unwrap(), json!({ "break_minutes": 30 }));
            }
            other => panic!("unexpected revert {:?}", other),
        }
    }

    #[test]
    fn test_mismatched_record_has_no_revert() {
        let mut record = UndoRecord::staff_shift(
            Uuid::nil(),
            Uuid::nil(),
            StaffShiftEdit::StartTime("07:00".into()),
            "start",
        );
        record.previous_value = PreviousValue::StudentDay(StudentDayEdit::Notes(None));

        assert!(build_revert_request(&record).is_none());
    }

    #[test]
    fn test_current_in_reads_same_field() {
        let staff = Uuid::new_v4();
        let row = StudentDay {
            id: Uuid::new_v4(),
            week_schedule_id: Uuid::new_v4(),
            student_id: Uuid::new_v4(),
            weekday: 0,
            arrival_time: Some("08:00".to_string()),
            departure_time: None,
            fm_staff_id: Some(staff),
            em_staff_id: None,
            notes: None,
            absent_type: AbsentType::Pm,
            student_name: None,
            class_name: None,
            class_id: None,
            grade: None,
            has_care_needs: None,
            fm_staff_name: None,
            em_staff_name: None,
        };

        assert_eq!(
            StudentDayEdit::FmStaff(None).current_in(&row),
            StudentDayEdit::FmStaff(Some(staff))
        );
        assert_eq!(
            StudentDayEdit::Absence(AbsentType::None).current_in(&row),
            StudentDayEdit::Absence(AbsentType::Pm)
        );
        assert_eq!(
            StudentDayEdit::ArrivalTime(None).current_in(&row),
            StudentDayEdit::ArrivalTime(Some("08:00".to_string()))
        );
    }
}
