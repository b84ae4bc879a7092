//! `/schedules`: solver-generated schedules and the server's analyses of them.
//!
//! Generation, AI suggestions and every analysis run on the server; the
//! client only forwards requests and hands back the JSON.

use crate::error::Result;
use crate::models::{AbsenceImpactRequest, Schedule, ScheduleDetail, ScheduleGenerate};
use crate::transport::ApiClient;
use serde_json::Value;
use uuid::Uuid;

#[derive(Clone)]
pub struct SchedulesApi {
    client: ApiClient,
}

impl SchedulesApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> Result<Vec<Schedule>> {
        self.client.get("/schedules/").await
    }

    pub async fn generate(&self, data: &ScheduleGenerate) -> Result<ScheduleDetail> {
        self.client.post("/schedules/generate", data).await
    }

    pub async fn get(&self, id: Uuid) -> Result<ScheduleDetail> {
        self.client.get(&format!("/schedules/{}", id)).await
    }

    /// Unlike week schedules, a missing solver schedule is an error.
    pub async fn get_by_week(&self, year: i32, week_number: u32) -> Result<ScheduleDetail> {
        self.client
            .get(&format!("/schedules/week/{}/{}", year, week_number))
            .await
    }

    pub async fn publish(&self, id: Uuid) -> Result<Value> {
        self.client
            .put_empty(&format!("/schedules/{}/publish", id))
            .await
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        self.client.delete(&format!("/schedules/{}", id)).await
    }

    pub async fn ai_suggestions(&self, id: Uuid) -> Result<Value> {
        self.client
            .post(&format!("/schedules/{}/ai-suggestions", id), &serde_json::json!({}))
            .await
    }

    pub async fn summary(&self, id: Uuid) -> Result<Value> {
        self.client.get(&format!("/schedules/{}/summary", id)).await
    }

    pub async fn predicted_problems(&self, id: Uuid) -> Result<Value> {
        self.client
            .get(&format!("/schedules/{}/predicted-problems", id))
            .await
    }

    pub async fn test_absence_impact(&self, id: Uuid, data: &AbsenceImpactRequest) -> Result<Value> {
        self.client
            .post(&format!("/schedules/{}/test-absence-impact", id), data)
            .await
    }

    pub async fn coverage_gaps(&self, id: Uuid) -> Result<Value> {
        self.client
            .get(&format!("/schedules/{}/coverage-gaps", id))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::testing::{scripted_client, ScriptedTransport};
    use crate::transport::Method;
    use chrono::NaiveDate;
    use serde_json::json;
    use std::sync::Arc;

    fn schedule_json(id: Uuid) -> Value {
        json!({
            "id": id,
            "week_number": 10,
            "year": 2025,
            "solver_status": "optimal",
            "objective_value": 12.5,
            "created_at": "2025-03-03T07:00:00",
            "assignments": []
        })
    }

    #[tokio::test]
    async fn test_analysis_paths() {
        let transport = Arc::new(ScriptedTransport::new());
        for _ in 0..5 {
            transport.respond(200, json!({ "ok": true }));
        }
        let api = SchedulesApi::new(scripted_client(transport.clone()));
        let id = Uuid::new_v4();
        let staff_id = Uuid::new_v4();
        let impact = AbsenceImpactRequest {
            staff_ids: vec![staff_id],
            absence_date: NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
        };

        api.ai_suggestions(id).await.unwrap();
        api.summary(id).await.unwrap();
        api.predicted_problems(id).await.unwrap();
        api.test_absence_impact(id, &impact).await.unwrap();
        api.coverage_gaps(id).await.unwrap();

        let sent: Vec<(Method, String)> = transport
            .requests()
            .into_iter()
            .map(|r| (r.method, r.path))
            .collect();
        let base = format!("/api/v1/schedules/{}", id);
        assert_eq!(
            sent,
            vec![
                (Method::Post, format!("{}/ai-suggestions", base)),
                (Method::Get, format!("{}/summary", base)),
                (Method::Get, format!("{}/predicted-problems", base)),
                (Method::Post, format!("{}/test-absence-impact", base)),
                (Method::Get, format!("{}/coverage-gaps", base)),
            ]
        );
        assert_eq!(
            transport.requests()[3].body,
            Some(json!({ "staff_ids": [staff_id], "absence_date": "2025-03-10" }))
        );
    }

    #[tokio::test]
    async fn test_generate_and_publish() {
        let transport = Arc::new(ScriptedTransport::new());
        let id = Uuid::new_v4();
        transport.respond(201, schedule_json(id));
        transport.respond(200, json!({ "message": "Schedule published" }));
        let api = SchedulesApi::new(scripted_client(transport.clone()));

        let generated = api
            .generate(&ScheduleGenerate {
                week_number: 10,
                year: 2025,
                max_solve_time_seconds: None,
            })
            .await
            .unwrap();
        api.publish(generated.schedule.id).await.unwrap();

        let requests = transport.requests();
        assert_eq!(generated.schedule.id, id);
        assert_eq!(requests[0].path, "/api/v1/schedules/generate");
        assert_eq!(requests[0].body, Some(json!({ "week_number": 10, "year": 2025 })));
        assert_eq!(requests[1].method, Method::Put);
        assert_eq!(requests[1].path, format!("/api/v1/schedules/{}/publish", id));
        assert_eq!(requests[1].body, None);
    }

    #[tokio::test]
    async fn test_missing_schedule_for_week_is_an_error() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.respond(404, json!({ "detail": "Inget schema för veckan" }));
        let api = SchedulesApi::new(scripted_client(transport.clone()));

        let err = api.get_by_week(2025, 10).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(transport.requests()[0].path, "/api/v1/schedules/week/2025/10");
    }
}
