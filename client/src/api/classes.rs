//! `/classes`

use crate::error::Result;
use crate::models::{SchoolClass, SchoolClassCreate, SchoolClassUpdate};
use crate::transport::ApiClient;
use uuid::Uuid;

#[derive(Clone)]
pub struct ClassesApi {
    client: ApiClient,
}

impl ClassesApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> Result<Vec<SchoolClass>> {
        self.client.get("/classes/").await
    }

    pub async fn get(&self, id: Uuid) -> Result<SchoolClass> {
        self.client.get(&format!("/classes/{}", id)).await
    }

    pub async fn create(&self, data: &SchoolClassCreate) -> Result<SchoolClass> {
        self.client.post("/classes/", data).await
    }

    pub async fn update(&self, id: Uuid, data: &SchoolClassUpdate) -> Result<SchoolClass> {
        self.client.put(&format!("/classes/{}", id), data).await
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        self.client.delete(&format!("/classes/{}", id)).await
    }
}
