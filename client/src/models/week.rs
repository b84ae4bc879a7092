//! Week schedule models: the week record, the per-day aggregate and its rows.

use super::{double_option, timestamp, Timestamp};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeekStatus {
    Draft,
    Published,
}

impl WeekStatus {
    /// The status a publish/unpublish toggle moves to.
    pub fn toggled(self) -> Self {
        match self {
            WeekStatus::Draft => WeekStatus::Published,
            WeekStatus::Published => WeekStatus::Draft,
        }
    }
}

/// One schedule per (year, week number)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekSchedule {
    pub id: Uuid,
    pub year: i32,
    pub week_number: u32,
    pub status: WeekStatus,
    pub notes: Option<String>,
    pub copied_from_id: Option<Uuid>,
    #[serde(deserialize_with = "timestamp")]
    pub created_at: Timestamp,
    #[serde(deserialize_with = "timestamp")]
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeekScheduleCreate {
    pub year: i32,
    pub week_number: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeekScheduleCopy {
    pub target_year: i32,
    pub target_week: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WeekScheduleUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<WeekStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AbsentType {
    #[default]
    None,
    FullDay,
    Am,
    Pm,
}

/// One row per student per weekday
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentDay {
    pub id: Uuid,
    pub week_schedule_id: Uuid,
    pub student_id: Uuid,
    pub weekday: u8,
    pub arrival_time: Option<String>,
    pub departure_time: Option<String>,
    pub fm_staff_id: Option<Uuid>,
    pub em_staff_id: Option<Uuid>,
    pub notes: Option<String>,
    #[serde(default)]
    pub absent_type: AbsentType,
    #[serde(default)]
    pub student_name: Option<String>,
    #[serde(default)]
    pub class_name: Option<String>,
    #[serde(default)]
    pub class_id: Option<Uuid>,
    #[serde(default)]
    pub grade: Option<u8>,
    #[serde(default)]
    pub has_care_needs: Option<bool>,
    #[serde(default)]
    pub fm_staff_name: Option<String>,
    #[serde(default)]
    pub em_staff_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentDayCreate {
    pub student_id: Uuid,
    pub weekday: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arrival_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub departure_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fm_staff_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub em_staff_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Partial update of a student day.
///
/// Outer `None` leaves the field untouched; `Some(None)` sends an explicit
/// null which clears it on the server.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StudentDayUpdate {
    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    pub arrival_time: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    pub departure_time: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    pub fm_staff_id: Option<Option<Uuid>>,
    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    pub em_staff_id: Option<Option<Uuid>>,
    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    pub notes: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub absent_type: Option<AbsentType>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayAssignmentRole {
    SchoolSupport,
    DoubleStaffing,
    ExtraCare,
}

/// Special-needs (KTS) binding of one staff member to one student
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayAssignment {
    pub id: Uuid,
    pub week_schedule_id: Uuid,
    pub student_id: Uuid,
    pub staff_id: Uuid,
    pub weekday: u8,
    pub start_time: String,
    pub end_time: String,
    pub role: DayAssignmentRole,
    pub notes: Option<String>,
    #[serde(default)]
    pub student_name: Option<String>,
    #[serde(default)]
    pub staff_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayAssignmentCreate {
    pub student_id: Uuid,
    pub staff_id: Uuid,
    pub weekday: u8,
    pub start_time: String,
    pub end_time: String,
    pub role: DayAssignmentRole,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DayAssignmentUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub staff_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<DayAssignmentRole>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// One row per staff member per weekday
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaffShift {
    pub id: Uuid,
    pub week_schedule_id: Uuid,
    pub staff_id: Uuid,
    pub weekday: u8,
    pub start_time: String,
    pub end_time: String,
    pub break_minutes: u32,
    pub notes: Option<String>,
    #[serde(default)]
    pub staff_name: Option<String>,
    #[serde(default)]
    pub class_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaffShiftCreate {
    pub staff_id: Uuid,
    pub weekday: u8,
    pub start_time: String,
    pub end_time: String,
    pub break_minutes: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Partial update of a staff shift. Same absent/null rules as [`StudentDayUpdate`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StaffShiftUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub break_minutes: Option<u32>,
    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    pub notes: Option<Option<String>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningType {
    Conflict,
    Gap,
    Workload,
    Absence,
    Vulnerability,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningSeverity {
    Error,
    Warning,
    Info,
}

/// Server-computed diagnostic; read-only on the client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Warning {
    #[serde(rename = "type")]
    pub warning_type: WarningType,
    pub severity: WarningSeverity,
    pub message: String,
    #[serde(default)]
    pub staff_id: Option<Uuid>,
    #[serde(default)]
    pub student_id: Option<Uuid>,
    pub weekday: u8,
    #[serde(default)]
    pub time: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WarningsResponse {
    pub warnings: Vec<Warning>,
    #[serde(default)]
    pub summary: serde_json::Value,
}

/// Everything the day view shows for one weekday of one week
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayData {
    pub weekday: u8,
    pub student_days: Vec<StudentDay>,
    pub staff_shifts: Vec<StaffShift>,
    #[serde(default)]
    pub day_assignments: Vec<DayAssignment>,
    pub warnings: Vec<Warning>,
}

impl DayData {
    pub fn student_day(&self, id: Uuid) -> Option<&StudentDay> {
        self.student_days.iter().find(|sd| sd.id == id)
    }

    pub fn staff_shift(&self, id: Uuid) -> Option<&StaffShift> {
        self.staff_shifts.iter().find(|s| s.id == id)
    }

    pub fn day_assignment(&self, id: Uuid) -> Option<&DayAssignment> {
        self.day_assignments.iter().find(|a| a.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_update_omits_untouched_fields() {
        let update = StudentDayUpdate {
            fm_staff_id: Some(None),
            ..Default::default()
        };

        let body = serde_json::to_value(&update).unwrap();
        assert_eq!(body, json!({ "fm_staff_id": null }));
    }

    #[test]
    fn test_update_distinguishes_null_from_absent() {
        let parsed: StudentDayUpdate =
            serde_json::from_value(json!({ "arrival_time": null, "departure_time": "" })).unwrap();

        assert_eq!(parsed.arrival_time, Some(None));
        assert_eq!(parsed.departure_time, Some(Some(String::new())));
        assert_eq!(parsed.fm_staff_id, None);
    }

    #[test]
    fn test_warning_type_field_name() {
        let warning: Warning = serde_json::from_value(json!({
            "type": "absence",
            "severity": "error",
            "message": "Anna är frånvarande men tilldelad i schemat",
            "staff_id": "6f1c2f0e-4d7a-4c1e-9a55-0f3b1a7c2d11",
            "weekday": 2
        }))
        .unwrap();

        assert_eq!(warning.warning_type, WarningType::Absence);
        assert!(warning.student_id.is_none());
    }

    #[test]
    fn test_status_toggle() {
        assert_eq!(WeekStatus::Draft.toggled(), WeekStatus::Published);
        assert_eq!(WeekStatus::Published.toggled(), WeekStatus::Draft);
    }
}
