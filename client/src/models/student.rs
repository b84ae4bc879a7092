//! Student and care-time models.

use super::{timestamp, Timestamp};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    pub id: Uuid,
    pub personal_number: String,
    pub first_name: String,
    pub last_name: String,
    pub class_id: Option<Uuid>,
    pub grade: u8,
    pub has_care_needs: bool,
    #[serde(default)]
    pub care_requirements: Vec<String>,
    #[serde(default)]
    pub preferred_staff: Vec<String>,
    #[serde(default)]
    pub requires_double_staffing: bool,
    pub notes: Option<String>,
    pub active: bool,
    #[serde(deserialize_with = "timestamp")]
    pub created_at: Timestamp,
}

impl Student {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentCreate {
    pub personal_number: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_id: Option<Uuid>,
    pub grade: u8,
    #[serde(default)]
    pub has_care_needs: bool,
    #[serde(default)]
    pub care_requirements: Vec<String>,
    #[serde(default)]
    pub preferred_staff: Vec<String>,
    #[serde(default)]
    pub requires_double_staffing: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StudentUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grade: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_care_needs: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub care_requirements: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferred_staff: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requires_double_staffing: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
}

/// Recurring care hours of a student on one weekday
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CareTime {
    pub id: Uuid,
    pub student_id: Uuid,
    pub weekday: u8,
    pub start_time: String,
    pub end_time: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CareTimeInput {
    pub weekday: u8,
    pub start_time: String,
    pub end_time: String,
}
