//! Solver-generated schedule models.
//!
//! Only the envelope is typed; analysis payloads (summaries, predictions,
//! coverage gaps, AI suggestions) are server-defined and stay as JSON.

use super::{timestamp, Timestamp};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    pub id: Uuid,
    pub week_number: u32,
    pub year: i32,
    pub solver_status: String,
    #[serde(default)]
    pub objective_value: Option<f64>,
    #[serde(default)]
    pub solve_time_ms: Option<u64>,
    #[serde(default)]
    pub published: Option<bool>,
    #[serde(deserialize_with = "timestamp")]
    pub created_at: Timestamp,
}

/// A schedule with its server-defined assignment payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleDetail {
    #[serde(flatten)]
    pub schedule: Schedule,
    #[serde(default)]
    pub assignments: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleGenerate {
    pub week_number: u32,
    pub year: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_solve_time_seconds: Option<u32>,
}

/// What-if request: how would the given absences affect a schedule
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AbsenceImpactRequest {
    pub staff_ids: Vec<Uuid>,
    pub absence_date: NaiveDate,
}
