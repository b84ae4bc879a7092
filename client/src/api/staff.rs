//! `/staff`: staff members, their absences and their work hours.

use crate::error::Result;
use crate::models::{
    Absence, AbsenceCreate, BulkAbsenceCreate, Staff, StaffCreate, StaffUpdate, WorkHour,
    WorkHourCreate, WorkHourUpdate,
};
use crate::transport::ApiClient;
use uuid::Uuid;

#[derive(Clone)]
pub struct StaffApi {
    client: ApiClient,
}

impl StaffApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> Result<Vec<Staff>> {
        self.client.get("/staff/").await
    }

    pub async fn get(&self, id: Uuid) -> Result<Staff> {
        self.client.get(&format!("/staff/{}", id)).await
    }

    pub async fn create(&self, data: &StaffCreate) -> Result<Staff> {
        self.client.post("/staff/", data).await
    }

    pub async fn update(&self, id: Uuid, data: &StaffUpdate) -> Result<Staff> {
        self.client.put(&format!("/staff/{}", id), data).await
    }

    /// Soft delete: the server marks the staff member inactive.
    pub async fn delete(&self, id: Uuid) -> Result<()> {
        self.client.delete(&format!("/staff/{}", id)).await
    }

    // ===== Absences =====

    pub async fn list_absences(&self, staff_id: Uuid) -> Result<Vec<Absence>> {
        self.client.get(&format!("/staff/{}/absences", staff_id)).await
    }

    pub async fn create_absence(&self, staff_id: Uuid, data: &AbsenceCreate) -> Result<Absence> {
        self.client
            .post(&format!("/staff/{}/absences", staff_id), data)
            .await
    }

    /// One absence per school day in the range.
    pub async fn create_bulk_absence(
        &self,
        staff_id: Uuid,
        data: &BulkAbsenceCreate,
    ) -> Result<Vec<Absence>> {
        self.client
            .post(&format!("/staff/{}/absences/bulk", staff_id), data)
            .await
    }

    pub async fn delete_absence(&self, absence_id: Uuid) -> Result<()> {
        self.client
            .delete(&format!("/staff/absences/{}", absence_id))
            .await
    }

    // ===== Work hours =====

    pub async fn list_work_hours(&self, staff_id: Uuid) -> Result<Vec<WorkHour>> {
        self.client
            .get(&format!("/staff/{}/work-hours", staff_id))
            .await
    }

    pub async fn create_work_hour(&self, staff_id: Uuid, data: &WorkHourCreate) -> Result<WorkHour> {
        self.client
            .post(&format!("/staff/{}/work-hours", staff_id), data)
            .await
    }

    pub async fn update_work_hour(&self, work_hour_id: Uuid, data: &WorkHourUpdate) -> Result<WorkHour> {
        self.client
            .put(&format!("/staff/work-hours/{}", work_hour_id), data)
            .await
    }

    pub async fn delete_work_hour(&self, work_hour_id: Uuid) -> Result<()> {
        self.client
            .delete(&format!("/staff/work-hours/{}", work_hour_id))
            .await
    }
}
