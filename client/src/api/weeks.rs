//! `/weeks`: the week-by-week "digital spreadsheet" schedule.

use crate::error::{AppError, Result};
use crate::models::{
    DayAssignment, DayAssignmentCreate, DayAssignmentUpdate, DayData, StaffShift,
    StaffShiftCreate, StaffShiftUpdate, StudentDay, StudentDayCreate, StudentDayUpdate,
    WarningsResponse, WeekSchedule, WeekScheduleCopy, WeekScheduleCreate, WeekScheduleUpdate,
};
use crate::transport::ApiClient;
use serde_json::Value;
use uuid::Uuid;

#[derive(Clone)]
pub struct WeeksApi {
    client: ApiClient,
}

impl WeeksApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Look up the schedule for a week. `Ok(None)` means none exists yet.
    pub async fn get_week(&self, year: i32, week_number: u32) -> Result<Option<WeekSchedule>> {
        match self
            .client
            .get(&format!("/weeks/{}/{}", year, week_number))
            .await
        {
            Ok(week) => Ok(Some(week)),
            Err(AppError::NotFound(_)) => {
                tracing::debug!("No schedule for {}-W{}", year, week_number);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Create a week. The server pre-populates student days and shifts.
    pub async fn create(&self, data: &WeekScheduleCreate) -> Result<WeekSchedule> {
        self.client.post("/weeks/", data).await
    }

    pub async fn copy(&self, source_week_id: Uuid, data: &WeekScheduleCopy) -> Result<WeekSchedule> {
        self.client
            .post(&format!("/weeks/{}/copy", source_week_id), data)
            .await
    }

    pub async fn update(&self, week_id: Uuid, data: &WeekScheduleUpdate) -> Result<WeekSchedule> {
        self.client.put(&format!("/weeks/{}", week_id), data).await
    }

    pub async fn delete(&self, week_id: Uuid) -> Result<()> {
        self.client.delete(&format!("/weeks/{}", week_id)).await
    }

    pub async fn get_day(&self, week_id: Uuid, weekday: u8) -> Result<DayData> {
        self.client
            .get(&format!("/weeks/{}/days/{}", week_id, weekday))
            .await
    }

    /// Let the server fill FM/EM staff for the day.
    pub async fn auto_assign_day(&self, week_id: Uuid, weekday: u8) -> Result<DayData> {
        self.client
            .post(
                &format!("/weeks/{}/days/{}/auto-assign", week_id, weekday),
                &serde_json::json!({}),
            )
            .await
    }

    // ===== Student days =====

    pub async fn create_student_day(&self, week_id: Uuid, data: &StudentDayCreate) -> Result<StudentDay> {
        self.client
            .post(&format!("/weeks/{}/student-days", week_id), data)
            .await
    }

    pub async fn update_student_day(
        &self,
        week_id: Uuid,
        student_day_id: Uuid,
        data: &StudentDayUpdate,
    ) -> Result<StudentDay> {
        self.client
            .put(
                &format!("/weeks/{}/student-days/{}", week_id, student_day_id),
                data,
            )
            .await
    }

    pub async fn delete_student_day(&self, week_id: Uuid, student_day_id: Uuid) -> Result<()> {
        self.client
            .delete(&format!("/weeks/{}/student-days/{}", week_id, student_day_id))
            .await
    }

    // ===== Day assignments =====

    pub async fn create_day_assignment(
        &self,
        week_id: Uuid,
        data: &DayAssignmentCreate,
    ) -> Result<DayAssignment> {
        self.client
            .post(&format!("/weeks/{}/day-assignments", week_id), data)
            .await
    }

    pub async fn update_day_assignment(
        &self,
        week_id: Uuid,
        assignment_id: Uuid,
        data: &DayAssignmentUpdate,
    ) -> Result<DayAssignment> {
        self.client
            .put(
                &format!("/weeks/{}/day-assignments/{}", week_id, assignment_id),
                data,
            )
            .await
    }

    pub async fn delete_day_assignment(&self, week_id: Uuid, assignment_id: Uuid) -> Result<()> {
        self.client
            .delete(&format!("/weeks/{}/day-assignments/{}", week_id, assignment_id))
            .await
    }

    // ===== Staff shifts =====

    pub async fn create_staff_shift(&self, week_id: Uuid, data: &StaffShiftCreate) -> Result<StaffShift> {
        self.client
            .post(&format!("/weeks/{}/shifts", week_id), data)
            .await
    }

    pub async fn update_staff_shift(
        &self,
        week_id: Uuid,
        shift_id: Uuid,
        data: &StaffShiftUpdate,
    ) -> Result<StaffShift> {
        self.client
            .put(&format!("/weeks/{}/shifts/{}", week_id, shift_id), data)
            .await
    }

    pub async fn delete_staff_shift(&self, week_id: Uuid, shift_id: Uuid) -> Result<()> {
        self.client
            .delete(&format!("/weeks/{}/shifts/{}", week_id, shift_id))
            .await
    }

    // ===== Server-side analyses =====

    pub async fn warnings(&self, week_id: Uuid) -> Result<WarningsResponse> {
        self.client
            .get(&format!("/weeks/{}/warnings", week_id))
            .await
    }

    pub async fn vulnerability(&self, week_id: Uuid) -> Result<Value> {
        self.client
            .get(&format!("/weeks/{}/vulnerability", week_id))
            .await
    }

    pub async fn coverage(&self, week_id: Uuid, weekday: u8) -> Result<Value> {
        self.client
            .get(&format!("/weeks/{}/days/{}/coverage", week_id, weekday))
            .await
    }

    pub async fn class_balance(&self, week_id: Uuid) -> Result<Value> {
        self.client
            .get(&format!("/weeks/{}/class-balance", week_id))
            .await
    }

    pub async fn substitute_report(&self, week_id: Uuid) -> Result<Value> {
        self.client
            .get(&format!("/weeks/{}/substitute-report", week_id))
            .await
    }

    pub async fn wellbeing(&self, week_id: Uuid) -> Result<Value> {
        self.client
            .get(&format!("/weeks/{}/wellbeing", week_id))
            .await
    }
}
