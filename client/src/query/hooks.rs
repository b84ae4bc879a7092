//! Cached reads and invalidating mutations over the resource API
//!
//! Reads go through the cache and retry transient failures according to
//! their key. Mutations never retry and never touch the cache on failure;
//! on success they drop every scope listed for their kind.

use super::cache::QueryCache;
use super::invalidation::{affected_scopes, MutationKind};
use super::keys::{QueryKey, WeekReport};
use crate::api::Api;
use crate::config;
use crate::error::Result;
use crate::models::*;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Clone)]
pub struct Queries {
    api: Api,
    cache: Arc<RwLock<QueryCache>>,
}

impl Queries {
    pub fn new(api: Api) -> Self {
        Self {
            api,
            cache: Arc::new(RwLock::new(QueryCache::new())),
        }
    }

    pub fn api(&self) -> &Api {
        &self.api
    }

    pub fn cache(&self) -> &Arc<RwLock<QueryCache>> {
        &self.cache
    }

    async fn query<T, F, Fut>(&self, key: QueryKey, fetch: F) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        if let Some(hit) = self.cache.read().await.get::<T>(&key) {
            tracing::debug!("Cache hit for {:?}", key);
            return Ok(hit);
        }

        let retries = key.retry_attempts();
        let mut attempt = 0;
        loop {
            match fetch().await {
                Ok(value) => {
                    self.cache.write().await.put(key, &value)?;
                    return Ok(value);
                }
                Err(e) if attempt < retries && e.is_transient() => {
                    attempt += 1;
                    tracing::debug!("Retrying {:?} after error: {} (attempt {})", key, e, attempt);
                    tokio::time::sleep(Duration::from_millis(config::QUERY_RETRY_DELAY_MS)).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn mutate<T, Fut>(&self, kind: MutationKind, mutation: Fut) -> Result<T>
    where
        Fut: Future<Output = Result<T>>,
    {
        let value = mutation.await?;
        let dropped = self
            .cache
            .write()
            .await
            .invalidate_scopes(affected_scopes(kind));
        tracing::debug!("{:?} succeeded, invalidated {} cached entries", kind, dropped);
        Ok(value)
    }

    // ===== Reads =====

    /// `Ok(None)` means no schedule exists for the week yet.
    pub async fn week(&self, year: i32, week_number: u32) -> Result<Option<WeekSchedule>> {
        let weeks = &self.api.weeks;
        self.query(QueryKey::WeekByNumber { year, week_number }, || {
            weeks.get_week(year, week_number)
        })
        .await
    }

    pub async fn day(&self, week_id: Uuid, weekday: u8) -> Result<DayData> {
        let weeks = &self.api.weeks;
        self.query(QueryKey::Day { week_id, weekday }, || {
            weeks.get_day(week_id, weekday)
        })
        .await
    }

    /// Drop the cached aggregate for one day and fetch it again.
    pub async fn refetch_day(&self, week_id: Uuid, weekday: u8) -> Result<DayData> {
        self.cache
            .write()
            .await
            .invalidate(&QueryKey::Day { week_id, weekday });
        self.day(week_id, weekday).await
    }

    pub async fn warnings(&self, week_id: Uuid) -> Result<WarningsResponse> {
        let weeks = &self.api.weeks;
        self.query(QueryKey::Warnings { week_id }, || weeks.warnings(week_id))
            .await
    }

    pub async fn week_report(&self, week_id: Uuid, report: WeekReport) -> Result<Value> {
        let weeks = &self.api.weeks;
        self.query(QueryKey::WeekReport { week_id, report }, || async move {
            match report {
                WeekReport::Vulnerability => weeks.vulnerability(week_id).await,
                WeekReport::ClassBalance => weeks.class_balance(week_id).await,
                WeekReport::SubstituteReport => weeks.substitute_report(week_id).await,
                WeekReport::Wellbeing => weeks.wellbeing(week_id).await,
            }
        })
        .await
    }

    pub async fn students(&self) -> Result<Vec<Student>> {
        let students = &self.api.students;
        self.query(QueryKey::Students, || students.list()).await
    }

    pub async fn care_times(&self, student_id: Uuid) -> Result<Vec<CareTime>> {
        let students = &self.api.students;
        self.query(QueryKey::CareTimes { student_id }, || {
            students.list_care_times(student_id)
        })
        .await
    }

    pub async fn staff(&self) -> Result<Vec<Staff>> {
        let staff = &self.api.staff;
        self.query(QueryKey::Staff, || staff.list()).await
    }

    pub async fn absences(&self, staff_id: Uuid) -> Result<Vec<Absence>> {
        let staff = &self.api.staff;
        self.query(QueryKey::Absences { staff_id }, || staff.list_absences(staff_id))
            .await
    }

    pub async fn work_hours(&self, staff_id: Uuid) -> Result<Vec<WorkHour>> {
        let staff = &self.api.staff;
        self.query(QueryKey::WorkHours { staff_id }, || {
            staff.list_work_hours(staff_id)
        })
        .await
    }

    pub async fn classes(&self) -> Result<Vec<SchoolClass>> {
        let classes = &self.api.classes;
        self.query(QueryKey::Classes, || classes.list()).await
    }

    pub async fn schedules(&self) -> Result<Vec<Schedule>> {
        let schedules = &self.api.schedules;
        self.query(QueryKey::Schedules, || schedules.list()).await
    }

    // ===== Week mutations =====

    pub async fn create_week(&self, data: &WeekScheduleCreate) -> Result<WeekSchedule> {
        self.mutate(MutationKind::CreateWeek, self.api.weeks.create(data))
            .await
    }

    pub async fn copy_week(&self, source_week_id: Uuid, data: &WeekScheduleCopy) -> Result<WeekSchedule> {
        self.mutate(MutationKind::CopyWeek, self.api.weeks.copy(source_week_id, data))
            .await
    }

    pub async fn update_week(&self, week_id: Uuid, data: &WeekScheduleUpdate) -> Result<WeekSchedule> {
        self.mutate(MutationKind::UpdateWeek, self.api.weeks.update(week_id, data))
            .await
    }

    pub async fn delete_week(&self, week_id: Uuid) -> Result<()> {
        self.mutate(MutationKind::DeleteWeek, self.api.weeks.delete(week_id))
            .await
    }

    pub async fn auto_assign_day(&self, week_id: Uuid, weekday: u8) -> Result<DayData> {
        self.mutate(
            MutationKind::AutoAssignDay,
            self.api.weeks.auto_assign_day(week_id, weekday),
        )
        .await
    }

    // ===== Day-level mutations =====

    pub async fn create_student_day(&self, week_id: Uuid, data: &StudentDayCreate) -> Result<StudentDay> {
        self.mutate(
            MutationKind::CreateStudentDay,
            self.api.weeks.create_student_day(week_id, data),
        )
        .await
    }

    pub async fn update_student_day(
        &self,
        week_id: Uuid,
        student_day_id: Uuid,
        data: &StudentDayUpdate,
    ) -> Result<StudentDay> {
        self.mutate(
            MutationKind::UpdateStudentDay,
            self.api.weeks.update_student_day(week_id, student_day_id, data),
        )
        .await
    }

    pub async fn delete_student_day(&self, week_id: Uuid, student_day_id: Uuid) -> Result<()> {
        self.mutate(
            MutationKind::DeleteStudentDay,
            self.api.weeks.delete_student_day(week_id, student_day_id),
        )
        .await
    }

    pub async fn create_day_assignment(
        &self,
        week_id: Uuid,
        data: &DayAssignmentCreate,
    ) -> Result<DayAssignment> {
        self.mutate(
            MutationKind::CreateDayAssignment,
            self.api.weeks.create_day_assignment(week_id, data),
        )
        .await
    }

    pub async fn update_day_assignment(
        &self,
        week_id: Uuid,
        assignment_id: Uuid,
        data: &DayAssignmentUpdate,
    ) -> Result<DayAssignment> {
        self.mutate(
            MutationKind::UpdateDayAssignment,
            self.api.weeks.update_day_assignment(week_id, assignment_id, data),
        )
        .await
    }

    pub async fn delete_day_assignment(&self, week_id: Uuid, assignment_id: Uuid) -> Result<()> {
        self.mutate(
            MutationKind::DeleteDayAssignment,
            self.api.weeks.delete_day_assignment(week_id, assignment_id),
        )
        .await
    }

    pub async fn create_staff_shift(&self, week_id: Uuid, data: &StaffShiftCreate) -> Result<StaffShift> {
        self.mutate(
            MutationKind::CreateStaffShift,
            self.api.weeks.create_staff_shift(week_id, data),
        )
        .await
    }

    pub async fn update_staff_shift(
        &self,
        week_id: Uuid,
        shift_id: Uuid,
        data: &StaffShiftUpdate,
    ) -> Result<StaffShift> {
        self.mutate(
            MutationKind::UpdateStaffShift,
            self.api.weeks.update_staff_shift(week_id, shift_id, data),
        )
        .await
    }

    pub async fn delete_staff_shift(&self, week_id: Uuid, shift_id: Uuid) -> Result<()> {
        self.mutate(
            MutationKind::DeleteStaffShift,
            self.api.weeks.delete_staff_shift(week_id, shift_id),
        )
        .await
    }

    // ===== Roster mutations =====

    pub async fn create_student(&self, data: &StudentCreate) -> Result<Student> {
        self.mutate(MutationKind::CreateStudent, self.api.students.create(data))
            .await
    }

    pub async fn update_student(&self, id: Uuid, data: &StudentUpdate) -> Result<Student> {
        self.mutate(MutationKind::UpdateStudent, self.api.students.update(id, data))
            .await
    }

    pub async fn delete_student(&self, id: Uuid) -> Result<()> {
        self.mutate(MutationKind::DeleteStudent, self.api.students.delete(id))
            .await
    }

    pub async fn create_care_time(&self, student_id: Uuid, data: &CareTimeInput) -> Result<CareTime> {
        self.mutate(
            MutationKind::SaveCareTime,
            self.api.students.create_care_time(student_id, data),
        )
        .await
    }

    pub async fn update_care_time(&self, care_time_id: Uuid, data: &CareTimeInput) -> Result<CareTime> {
        self.mutate(
            MutationKind::SaveCareTime,
            self.api.students.update_care_time(care_time_id, data),
        )
        .await
    }

    pub async fn delete_care_time(&self, care_time_id: Uuid) -> Result<()> {
        self.mutate(
            MutationKind::DeleteCareTime,
            self.api.students.delete_care_time(care_time_id),
        )
        .await
    }

    pub async fn create_staff(&self, data: &StaffCreate) -> Result<Staff> {
        self.mutate(MutationKind::CreateStaff, self.api.staff.create(data))
            .await
    }

    pub async fn update_staff(&self, id: Uuid, data: &StaffUpdate) -> Result<Staff> {
        self.mutate(MutationKind::UpdateStaff, self.api.staff.update(id, data))
            .await
    }

    pub async fn delete_staff(&self, id: Uuid) -> Result<()> {
        self.mutate(MutationKind::DeleteStaff, self.api.staff.delete(id))
            .await
    }

    pub async fn create_absence(&self, staff_id: Uuid, data: &AbsenceCreate) -> Result<Absence> {
        self.mutate(
            MutationKind::CreateAbsence,
            self.api.staff.create_absence(staff_id, data),
        )
        .await
    }

    pub async fn create_bulk_absence(&self, staff_id: Uuid, data: &BulkAbsenceCreate) -> Result<Vec<Absence>> {
        self.mutate(
            MutationKind::CreateAbsence,
            self.api.staff.create_bulk_absence(staff_id, data),
        )
        .await
    }

    pub async fn delete_absence(&self, absence_id: Uuid) -> Result<()> {
        self.mutate(
            MutationKind::DeleteAbsence,
            self.api.staff.delete_absence(absence_id),
        )
        .await
    }

    pub async fn create_work_hour(&self, staff_id: Uuid, data: &WorkHourCreate) -> Result<WorkHour> {
        self.mutate(
            MutationKind::SaveWorkHour,
            self.api.staff.create_work_hour(staff_id, data),
        )
        .await
    }

    pub async fn update_work_hour(&self, work_hour_id: Uuid, data: &WorkHourUpdate) -> Result<WorkHour> {
        self.mutate(
            MutationKind::SaveWorkHour,
            self.api.staff.update_work_hour(work_hour_id, data),
        )
        .await
    }

    pub async fn delete_work_hour(&self, work_hour_id: Uuid) -> Result<()> {
        self.mutate(
            MutationKind::DeleteWorkHour,
            self.api.staff.delete_work_hour(work_hour_id),
        )
        .await
    }

    pub async fn create_class(&self, data: &SchoolClassCreate) -> Result<SchoolClass> {
        self.mutate(MutationKind::CreateClass, self.api.classes.create(data))
            .await
    }

    pub async fn update_class(&self, id: Uuid, data: &SchoolClassUpdate) -> Result<SchoolClass> {
        self.mutate(MutationKind::UpdateClass, self.api.classes.update(id, data))
            .await
    }

    pub async fn delete_class(&self, id: Uuid) -> Result<()> {
        self.mutate(MutationKind::DeleteClass, self.api.classes.delete(id))
            .await
    }

    // ===== Generated schedules =====

    pub async fn generate_schedule(&self, data: &ScheduleGenerate) -> Result<ScheduleDetail> {
        self.mutate(MutationKind::GenerateSchedule, self.api.schedules.generate(data))
            .await
    }

    pub async fn publish_schedule(&self, id: Uuid) -> Result<Value> {
        self.mutate(MutationKind::PublishSchedule, self.api.schedules.publish(id))
            .await
    }

    pub async fn delete_schedule(&self, id: Uuid) -> Result<()> {
        self.mutate(MutationKind::DeleteSchedule, self.api.schedules.delete(id))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::services::credentials::MemoryTokenStore;
    use crate::testing::{RecordingRedirect, ScriptedTransport};
    use crate::transport::ApiClient;
    use serde_json::json;

    fn queries(transport: Arc<ScriptedTransport>) -> Queries {
        let client = ApiClient::new(
            transport,
            Arc::new(MemoryTokenStore::with_token("token")),
            Arc::new(RecordingRedirect::default()),
        );
        Queries::new(Api::new(client))
    }

    fn class_json(name: &str) -> Value {
        json!({
            "id": Uuid::new_v4(),
            "name": name,
            "grade_group": "grades_1_3",
            "primary_teacher_id": null,
            "academic_year": "2025/2026",
            "active": true,
            "created_at": "2025-08-01T08:00:00",
            "student_count": 0
        })
    }

    #[tokio::test]
    async fn test_second_read_is_served_from_cache() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.respond(200, json!([class_json("1A")]));
        let queries = queries(transport.clone());

        let first = queries.classes().await.unwrap();
        let second = queries.classes().await.unwrap();

        assert_eq!(first, second);
        assert_eq!(transport.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_read_retries_transient_failure_once() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.respond(503, json!({ "detail": "starting up" }));
        transport.respond(200, json!([]));
        let queries = queries(transport.clone());

        let staff = queries.staff().await.unwrap();

        assert!(staff.is_empty());
        assert_eq!(transport.requests().len(), 2);
    }

    #[tokio::test]
    async fn test_retry_waits_before_second_attempt() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.fail_network("reset");
        transport.respond(200, json!([]));
        let queries = queries(transport.clone());
        let started = std::time::Instant::now();

        queries.classes().await.unwrap();

        assert!(started.elapsed() >= Duration::from_millis(config::QUERY_RETRY_DELAY_MS));
        assert_eq!(transport.requests().len(), 2);
    }

    #[tokio::test]
    async fn test_week_reads_are_dropped_by_day_edit() {
        let transport = Arc::new(ScriptedTransport::new());
        let week_id = Uuid::new_v4();
        let sd_id = Uuid::new_v4();
        transport.respond(200, json!({ "week_id": week_id, "vulnerable_slots": 2 }));
        transport.respond(200, json!({ "warnings": [], "summary": { "total": 0 } }));
        transport.respond(
            200,
            json!({
                "id": sd_id,
                "week_schedule_id": week_id,
                "student_id": Uuid::new_v4(),
                "weekday": 1,
                "arrival_time": "07:30",
                "departure_time": "15:00",
                "fm_staff_id": null,
                "em_staff_id": null,
                "notes": "Hämtas tidigt",
                "absent_type": "none"
            }),
        );
        transport.respond(200, json!({ "week_id": week_id, "vulnerable_slots": 1 }));
        transport.respond(200, json!({ "warnings": [], "summary": { "total": 0 } }));
        let queries = queries(transport.clone());

        let before = queries
            .week_report(week_id, WeekReport::Vulnerability)
            .await
            .unwrap();
        queries.warnings(week_id).await.unwrap();
        // Both are cached now.
        queries
            .week_report(week_id, WeekReport::Vulnerability)
            .await
            .unwrap();
        queries.warnings(week_id).await.unwrap();
        assert_eq!(transport.requests().len(), 2);

        let update = StudentDayUpdate {
            notes: Some(Some("Hämtas tidigt".to_string())),
            ..Default::default()
        };
        queries.update_student_day(week_id, sd_id, &update).await.unwrap();

        let after = queries
            .week_report(week_id, WeekReport::Vulnerability)
            .await
            .unwrap();
        queries.warnings(week_id).await.unwrap();

        assert_eq!(before["vulnerable_slots"], 2);
        assert_eq!(after["vulnerable_slots"], 1);
        let paths: Vec<String> = transport.requests().into_iter().map(|r| r.path).collect();
        assert_eq!(paths.len(), 5);
        assert_eq!(paths[3], format!("/api/v1/weeks/{}/vulnerability", week_id));
        assert_eq!(paths[4], format!("/api/v1/weeks/{}/warnings", week_id));
    }

    #[tokio::test]
    async fn test_read_gives_up_after_retry() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.fail_network("refused");
        transport.fail_network("refused");
        transport.respond(200, json!([]));
        let queries = queries(transport.clone());

        let err = queries.students().await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Network);
        assert_eq!(transport.requests().len(), 2);
    }

    #[tokio::test]
    async fn test_validation_errors_are_not_retried() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.respond(422, json!({ "detail": "bad id" }));
        let queries = queries(transport.clone());

        assert!(queries.students().await.is_err());
        assert_eq!(transport.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_week_lookup_never_retries() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.fail_network("timeout");
        let queries = queries(transport.clone());

        let err = queries.week(2025, 10).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Network);
        assert_eq!(transport.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_missing_week_is_cached_as_none() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.respond(404, json!({ "detail": "Veckoschema hittades inte" }));
        let queries = queries(transport.clone());

        assert!(queries.week(2025, 53).await.unwrap().is_none());
        assert!(queries.week(2025, 53).await.unwrap().is_none());
        assert_eq!(transport.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_successful_mutation_invalidates() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.respond(200, json!([class_json("1A")]));
        transport.respond(201, class_json("2B"));
        transport.respond(200, json!([class_json("1A"), class_json("2B")]));
        let queries = queries(transport.clone());

        queries.classes().await.unwrap();
        queries
            .create_class(&SchoolClassCreate {
                name: "2B".to_string(),
                grade_group: GradeGroup::Grades1To3,
                primary_teacher_id: None,
                academic_year: "2025/2026".to_string(),
            })
            .await
            .unwrap();
        let after = queries.classes().await.unwrap();

        assert_eq!(after.len(), 2);
        assert_eq!(transport.requests().len(), 3);
    }

    #[tokio::test]
    async fn test_failed_mutation_leaves_cache_alone() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.respond(200, json!([class_json("1A")]));
        transport.respond(409, json!({ "detail": "Klassen finns redan" }));
        let queries = queries(transport.clone());

        queries.classes().await.unwrap();
        let err = queries.delete_class(Uuid::new_v4()).await.unwrap_err();

        assert_eq!(err.detail(), Some("Klassen finns redan"));
        assert!(queries.cache().read().await.contains(&QueryKey::Classes));
        // Still cached: no refetch.
        queries.classes().await.unwrap();
        assert_eq!(transport.requests().len(), 2);
    }

    #[tokio::test]
    async fn test_mutations_are_not_retried() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.respond(500, json!({ "detail": "boom" }));
        transport.respond(200, json!({}));
        let queries = queries(transport.clone());

        let err = queries.delete_staff(Uuid::new_v4()).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Server);
        assert_eq!(transport.requests().len(), 1);
    }
}
