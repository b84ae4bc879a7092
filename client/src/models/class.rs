//! School class models.

use super::{timestamp, GradeGroup, Timestamp};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeacherInfo {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchoolClass {
    pub id: Uuid,
    pub name: String,
    pub grade_group: GradeGroup,
    pub primary_teacher_id: Option<Uuid>,
    #[serde(default)]
    pub primary_teacher: Option<TeacherInfo>,
    /// Format `YYYY/YYYY`, e.g. `2025/2026`
    pub academic_year: String,
    pub active: bool,
    #[serde(deserialize_with = "timestamp")]
    pub created_at: Timestamp,
    #[serde(default)]
    pub student_count: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchoolClassCreate {
    pub name: String,
    pub grade_group: GradeGroup,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_teacher_id: Option<Uuid>,
    pub academic_year: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchoolClassUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grade_group: Option<GradeGroup>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_teacher_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub academic_year: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
}
