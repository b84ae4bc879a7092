//! Staff, absence and work-hour models.

use super::{timestamp, Timestamp};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StaffRole {
    #[serde(rename = "elevassistent")]
    Assistant,
    #[serde(rename = "pedagog")]
    Teacher,
    #[serde(rename = "fritidspedagog")]
    LeisureEducator,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleType {
    TwoWeekRotation,
    #[default]
    Fixed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GradeGroup {
    #[serde(rename = "grades_1_3")]
    Grades1To3,
    #[serde(rename = "grades_4_6")]
    Grades4To6,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Staff {
    pub id: Uuid,
    pub personal_number: String,
    pub first_name: String,
    pub last_name: String,
    pub role: StaffRole,
    #[serde(default)]
    pub care_certifications: Vec<String>,
    #[serde(default)]
    pub schedule_type: ScheduleType,
    #[serde(default)]
    pub grade_group: Option<GradeGroup>,
    #[serde(deserialize_with = "timestamp")]
    pub employment_start: Timestamp,
    pub active: bool,
    #[serde(deserialize_with = "timestamp")]
    pub created_at: Timestamp,
}

impl Staff {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaffCreate {
    pub personal_number: String,
    pub first_name: String,
    pub last_name: String,
    pub role: StaffRole,
    #[serde(default)]
    pub care_certifications: Vec<String>,
    #[serde(default)]
    pub schedule_type: ScheduleType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grade_group: Option<GradeGroup>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StaffUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<StaffRole>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub care_certifications: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schedule_type: Option<ScheduleType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grade_group: Option<GradeGroup>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AbsenceReason {
    #[default]
    Sick,
    Vacation,
    ParentalLeave,
    Training,
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Absence {
    pub id: Uuid,
    pub staff_id: Uuid,
    #[serde(deserialize_with = "timestamp")]
    pub absence_date: Timestamp,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub reason: AbsenceReason,
    #[serde(deserialize_with = "timestamp")]
    pub reported_at: Timestamp,
}

/// A single-day absence. Times are omitted for a full-day absence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AbsenceCreate {
    pub staff_id: Uuid,
    pub absence_date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    #[serde(default)]
    pub reason: AbsenceReason,
}

/// An absence spanning every school day in `start_date..=end_date`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkAbsenceCreate {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    #[serde(default)]
    pub reason: AbsenceReason,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkHour {
    pub id: Uuid,
    pub staff_id: Uuid,
    pub weekday: u8,
    /// 0 = both weeks of a rotation, 1 or 2 = that week only
    pub week_number: u8,
    pub start_time: String,
    pub end_time: String,
    pub lunch_start: Option<String>,
    pub lunch_end: Option<String>,
    #[serde(deserialize_with = "timestamp")]
    pub created_at: Timestamp,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkHourCreate {
    pub weekday: u8,
    #[serde(default)]
    pub week_number: u8,
    pub start_time: String,
    pub end_time: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lunch_start: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lunch_end: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkHourUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weekday: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub week_number: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lunch_start: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lunch_end: Option<String>,
}
