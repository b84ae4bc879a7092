//! Which cached reads a mutation can make stale
//!
//! A fixed table from mutation kind to scopes. Every successful mutation
//! drops all cached keys in its scopes; dependent reads refetch on next use.

use super::keys::Scope;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MutationKind {
    CreateWeek,
    CopyWeek,
    UpdateWeek,
    DeleteWeek,
    AutoAssignDay,
    CreateStudentDay,
    UpdateStudentDay,
    DeleteStudentDay,
    CreateDayAssignment,
    UpdateDayAssignment,
    DeleteDayAssignment,
    CreateStaffShift,
    UpdateStaffShift,
    DeleteStaffShift,
    CreateStudent,
    UpdateStudent,
    DeleteStudent,
    SaveCareTime,
    DeleteCareTime,
    CreateStaff,
    UpdateStaff,
    DeleteStaff,
    CreateAbsence,
    DeleteAbsence,
    SaveWorkHour,
    DeleteWorkHour,
    CreateClass,
    UpdateClass,
    DeleteClass,
    GenerateSchedule,
    PublishSchedule,
    DeleteSchedule,
}

impl MutationKind {
    pub const ALL: [MutationKind; 32] = [
        MutationKind::CreateWeek,
        MutationKind::CopyWeek,
        MutationKind::UpdateWeek,
        MutationKind::DeleteWeek,
        MutationKind::AutoAssignDay,
        MutationKind::CreateStudentDay,
        MutationKind::UpdateStudentDay,
        MutationKind::DeleteStudentDay,
        MutationKind::CreateDayAssignment,
        MutationKind::UpdateDayAssignment,
        MutationKind::DeleteDayAssignment,
        MutationKind::CreateStaffShift,
        MutationKind::UpdateStaffShift,
        MutationKind::DeleteStaffShift,
        MutationKind::CreateStudent,
        MutationKind::UpdateStudent,
        MutationKind::DeleteStudent,
        MutationKind::SaveCareTime,
        MutationKind::DeleteCareTime,
        MutationKind::CreateStaff,
        MutationKind::UpdateStaff,
        MutationKind::DeleteStaff,
        MutationKind::CreateAbsence,
        MutationKind::DeleteAbsence,
        MutationKind::SaveWorkHour,
        MutationKind::DeleteWorkHour,
        MutationKind::CreateClass,
        MutationKind::UpdateClass,
        MutationKind::DeleteClass,
        MutationKind::GenerateSchedule,
        MutationKind::PublishSchedule,
        MutationKind::DeleteSchedule,
    ];
}

// Day-level edits change the aggregate, its warnings and every analysis.
const DAY_EDIT: &[Scope] = &[Scope::Day, Scope::Warnings, Scope::WeekReports];
const WEEK_SET: &[Scope] = &[Scope::Weeks, Scope::Day, Scope::Warnings, Scope::WeekReports];
const WEEK_STATUS: &[Scope] = &[Scope::Weeks];
const STUDENT_ROSTER: &[Scope] = &[Scope::Students, Scope::Day, Scope::Warnings, Scope::WeekReports];
const CARE_TIMES: &[Scope] = &[Scope::CareTimes, Scope::Students];
const STAFF_ROSTER: &[Scope] = &[Scope::Staff, Scope::Day, Scope::Warnings, Scope::WeekReports];
const ABSENCES: &[Scope] = &[Scope::Absences, Scope::Day, Scope::Warnings, Scope::WeekReports];
const WORK_HOURS: &[Scope] = &[Scope::WorkHours, Scope::Staff];
const CLASSES: &[Scope] = &[Scope::Classes, Scope::Students, Scope::Day];
const SCHEDULES: &[Scope] = &[Scope::Schedules];

/// Scopes made stale by a successful mutation of `kind`.
pub fn affected_scopes(kind: MutationKind) -> &'static [Scope] {
    use MutationKind::*;

    match kind {
        CreateWeek | CopyWeek | DeleteWeek => WEEK_SET,
        UpdateWeek => WEEK_STATUS,
        AutoAssignDay
        | CreateStudentDay
        | UpdateStudentDay
        | DeleteStudentDay
        | CreateDayAssignment
        | UpdateDayAssignment
        | DeleteDayAssignment
        | CreateStaffShift
        | UpdateStaffShift
        | DeleteStaffShift => DAY_EDIT,
        CreateStudent | UpdateStudent | DeleteStudent => STUDENT_ROSTER,
        SaveCareTime | DeleteCareTime => CARE_TIMES,
        CreateStaff | UpdateStaff | DeleteStaff => STAFF_ROSTER,
        CreateAbsence | DeleteAbsence => ABSENCES,
        SaveWorkHour | DeleteWorkHour => WORK_HOURS,
        CreateClass | UpdateClass | DeleteClass => CLASSES,
        GenerateSchedule | PublishSchedule | DeleteSchedule => SCHEDULES,
    }
}
