//! `/students`: students and their recurring care times.

use crate::error::Result;
use crate::models::{CareTime, CareTimeInput, Student, StudentCreate, StudentUpdate};
use crate::transport::ApiClient;
use uuid::Uuid;

#[derive(Clone)]
pub struct StudentsApi {
    client: ApiClient,
}

impl StudentsApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> Result<Vec<Student>> {
        self.client.get("/students/").await
    }

    pub async fn get(&self, id: Uuid) -> Result<Student> {
        self.client.get(&format!("/students/{}", id)).await
    }

    pub async fn create(&self, data: &StudentCreate) -> Result<Student> {
        self.client.post("/students/", data).await
    }

    pub async fn update(&self, id: Uuid, data: &StudentUpdate) -> Result<Student> {
        self.client.put(&format!("/students/{}", id), data).await
    }

    /// Soft delete: the server marks the student inactive.
    pub async fn delete(&self, id: Uuid) -> Result<()> {
        self.client.delete(&format!("/students/{}", id)).await
    }

    pub async fn list_care_times(&self, student_id: Uuid) -> Result<Vec<CareTime>> {
        self.client
            .get(&format!("/students/{}/care-times", student_id))
            .await
    }

    pub async fn create_care_time(&self, student_id: Uuid, data: &CareTimeInput) -> Result<CareTime> {
        self.client
            .post(&format!("/students/{}/care-times", student_id), data)
            .await
    }

    pub async fn update_care_time(&self, care_time_id: Uuid, data: &CareTimeInput) -> Result<CareTime> {
        self.client
            .put(&format!("/students/care-times/{}", care_time_id), data)
            .await
    }

    pub async fn delete_care_time(&self, care_time_id: Uuid) -> Result<()> {
        self.client
            .delete(&format!("/students/care-times/{}", care_time_id))
            .await
    }
}
