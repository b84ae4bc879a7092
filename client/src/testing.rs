//! In-memory transports for tests
//!
//! `ScriptedTransport` replays canned responses in order and records what
//! was sent. `FakeBackend` is a small stateful stand-in for the scheduling
//! API covering weeks, day data, staff absences and the roster endpoints.

use crate::error::{AppError, Result};
use crate::models::*;
use crate::services::credentials::MemoryTokenStore;
use crate::transport::{ApiClient, HttpRequest, HttpResponse, LoginRedirect, Method, Transport};
use async_trait::async_trait;
use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// Counts login redirects.
#[derive(Default)]
pub struct RecordingRedirect(AtomicUsize);

impl RecordingRedirect {
    pub fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

impl LoginRedirect for RecordingRedirect {
    fn redirect_to_login(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

/// Replays queued responses in FIFO order.
#[derive(Default)]
pub struct ScriptedTransport {
    responses: Mutex<VecDeque<Result<HttpResponse>>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, status: u16, body: Value) {
        self.respond_raw(status, &body.to_string());
    }

    pub fn respond_raw(&self, status: u16, body: &str) {
        self.responses.lock().unwrap().push_back(Ok(HttpResponse {
            status,
            body: body.to_string(),
        }));
    }

    pub fn fail_network(&self, message: &str) {
        self.responses
            .lock()
            .unwrap()
            .push_back(Err(AppError::Network(message.to_string())));
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        self.requests.lock().unwrap().push(request);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(AppError::Network("no scripted response".to_string())))
    }
}

/// Client over a scripted transport, without a stored token.
pub fn scripted_client(transport: Arc<ScriptedTransport>) -> ApiClient {
    ApiClient::new(
        transport,
        Arc::new(MemoryTokenStore::default()),
        Arc::new(RecordingRedirect::default()),
    )
}

#[derive(Default)]
struct BackendState {
    students: Vec<Student>,
    care_times: Vec<CareTime>,
    staff: Vec<Staff>,
    classes: Vec<SchoolClass>,
    absences: Vec<Absence>,
    weeks: Vec<WeekSchedule>,
    student_days: Vec<StudentDay>,
    staff_shifts: Vec<StaffShift>,
    day_assignments: Vec<DayAssignment>,
    extra_warnings: Vec<(Uuid, Warning)>,
    failures: VecDeque<(u16, String)>,
    requests: Vec<HttpRequest>,
}

/// Stateful fake of the scheduling API.
#[derive(Default)]
pub struct FakeBackend {
    state: Mutex<BackendState>,
}

fn fixed_time() -> Timestamp {
    NaiveDate::from_ymd_opt(2025, 1, 6)
        .and_then(|d| d.and_hms_opt(8, 0, 0))
        .unwrap_or_default()
}

fn ok<T: Serialize>(status: u16, value: &T) -> Result<HttpResponse> {
    Ok(HttpResponse {
        status,
        body: serde_json::to_string(value)?,
    })
}

fn error(status: u16, detail: &str) -> Result<HttpResponse> {
    ok(status, &json!({ "detail": detail }))
}

fn parse_body<T: serde::de::DeserializeOwned>(request: &HttpRequest) -> Result<T> {
    Ok(serde_json::from_value(
        request.body.clone().unwrap_or(Value::Null),
    )?)
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_class(&self, name: &str) -> Uuid {
        let id = Uuid::new_v4();
        self.state.lock().unwrap().classes.push(SchoolClass {
            id,
            name: name.to_string(),
            grade_group: GradeGroup::Grades1To3,
            primary_teacher_id: None,
            primary_teacher: None,
            academic_year: "2025/2026".to_string(),
            active: true,
            created_at: fixed_time(),
            student_count: 0,
        });
        id
    }

    /// Add a student with the same care hours every weekday.
    pub fn add_student(
        &self,
        first_name: &str,
        last_name: &str,
        class_id: Option<Uuid>,
        arrival: Option<&str>,
        departure: Option<&str>,
        has_care_needs: bool,
    ) -> Uuid {
        let id = Uuid::new_v4();
        let mut state = self.state.lock().unwrap();
        let index = state.students.len();
        state.students.push(Student {
            id,
            personal_number: format!("20180101{:04}", index),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            class_id,
            grade: 1,
            has_care_needs,
            care_requirements: Vec::new(),
            preferred_staff: Vec::new(),
            requires_double_staffing: false,
            notes: None,
            active: true,
            created_at: fixed_time(),
        });
        if let (Some(start), Some(end)) = (arrival, departure) {
            for weekday in 0..5 {
                state.care_times.push(CareTime {
                    id: Uuid::new_v4(),
                    student_id: id,
                    weekday,
                    start_time: start.to_string(),
                    end_time: end.to_string(),
                });
            }
        }
        id
    }

    pub fn add_staff(&self, first_name: &str, last_name: &str) -> Uuid {
        let id = Uuid::new_v4();
        let mut state = self.state.lock().unwrap();
        let index = state.staff.len();
        state.staff.push(Staff {
            id,
            personal_number: format!("19800101{:04}", index),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            role: StaffRole::LeisureEducator,
            care_certifications: Vec::new(),
            schedule_type: ScheduleType::Fixed,
            grade_group: Some(GradeGroup::Grades1To3),
            employment_start: fixed_time(),
            active: true,
            created_at: fixed_time(),
        });
        id
    }

    /// Attach a warning to every day read of the given week.
    pub fn add_warning(&self, week_id: Uuid, warning: Warning) {
        self.state
            .lock()
            .unwrap()
            .extra_warnings
            .push((week_id, warning));
    }

    /// Make the next request fail with this status and detail.
    pub fn fail_next(&self, status: u16, detail: &str) {
        self.state
            .lock()
            .unwrap()
            .failures
            .push_back((status, detail.to_string()));
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.state.lock().unwrap().requests.clone()
    }

    /// Number of requests matching a method and path suffix.
    pub fn count(&self, method: Method, path_suffix: &str) -> usize {
        self.state
            .lock()
            .unwrap()
            .requests
            .iter()
            .filter(|r| r.method == method && r.path.ends_with(path_suffix))
            .count()
    }

    pub fn student_day(&self, id: Uuid) -> Option<StudentDay> {
        let state = self.state.lock().unwrap();
        state.student_days.iter().find(|sd| sd.id == id).cloned()
    }

    pub fn week(&self, id: Uuid) -> Option<WeekSchedule> {
        let state = self.state.lock().unwrap();
        state.weeks.iter().find(|w| w.id == id).cloned()
    }

    pub fn day_assignment_count(&self) -> usize {
        self.state.lock().unwrap().day_assignments.len()
    }

    pub fn absences(&self) -> Vec<Absence> {
        self.state.lock().unwrap().absences.clone()
    }

    fn route(state: &mut BackendState, request: &HttpRequest) -> Result<HttpResponse> {
        if request.path == crate::config::HEALTH_PATH {
            return ok(200, &json!({ "status": "healthy" }));
        }

        let path = request
            .path
            .strip_prefix(crate::config::API_V1_PREFIX)
            .unwrap_or(&request.path);
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        match (request.method, segments.as_slice()) {
            (Method::Get, ["students"]) => ok(200, &state.students),
            (Method::Get, ["staff"]) => ok(200, &state.staff),
            (Method::Get, ["classes"]) => ok(200, &state.classes),

            (Method::Post, ["staff", staff_id, "absences"]) => {
                let staff_id = parse_id(staff_id)?;
                let data: AbsenceCreate = parse_body(request)?;
                let absence = state.record_absence(staff_id, data.absence_date, data.reason);
                ok(201, &absence)
            }
            (Method::Post, ["staff", staff_id, "absences", "bulk"]) => {
                let staff_id = parse_id(staff_id)?;
                let data: BulkAbsenceCreate = parse_body(request)?;
                let mut created = Vec::new();
                let mut date = data.start_date;
                while date <= data.end_date {
                    if date.weekday().num_days_from_monday() < 5 {
                        created.push(state.record_absence(staff_id, date, data.reason));
                    }
                    match date.succ_opt() {
                        Some(next) => date = next,
                        None => break,
                    }
                }
                ok(201, &created)
            }
            (Method::Get, ["staff", staff_id, "absences"]) => {
                let staff_id = parse_id(staff_id)?;
                let list: Vec<&Absence> =
                    state.absences.iter().filter(|a| a.staff_id == staff_id).collect();
                ok(200, &list)
            }

            (Method::Post, ["weeks"]) => {
                let data: WeekScheduleCreate = parse_body(request)?;
                if state.find_week(data.year, data.week_number).is_some() {
                    return error(409, "Vecka finns redan");
                }
                let week = state.insert_week(data.year, data.week_number, None);
                state.populate(week.id);
                ok(201, &week)
            }
            (Method::Post, ["weeks", source_id, "copy"]) => {
                let source_id = parse_id(source_id)?;
                let data: WeekScheduleCopy = parse_body(request)?;
                if !state.weeks.iter().any(|w| w.id == source_id) {
                    return error(404, "Källvecka hittades inte");
                }
                if state.find_week(data.target_year, data.target_week).is_some() {
                    return error(409, "Målvecka finns redan");
                }
                let week = state.insert_week(data.target_year, data.target_week, Some(source_id));
                state.copy_rows(source_id, week.id);
                ok(201, &week)
            }
            (Method::Put, ["weeks", week_id]) => {
                let week_id = parse_id(week_id)?;
                let data: WeekScheduleUpdate = parse_body(request)?;
                match state.weeks.iter_mut().find(|w| w.id == week_id) {
                    Some(week) => {
                        if let Some(status) = data.status {
                            week.status = status;
                        }
                        if let Some(notes) = data.notes {
                            week.notes = Some(notes);
                        }
                        ok(200, week)
                    }
                    None => error(404, "Veckoschema hittades inte"),
                }
            }
            (Method::Get, ["weeks", week_id, "days", weekday]) => {
                let week_id = parse_id(week_id)?;
                let weekday = parse_weekday(weekday)?;
                if !state.weeks.iter().any(|w| w.id == week_id) {
                    return error(404, "Veckoschema hittades inte");
                }
                ok(200, &state.day_data(week_id, weekday))
            }
            (Method::Post, ["weeks", week_id, "days", weekday, "auto-assign"]) => {
                let week_id = parse_id(week_id)?;
                let weekday = parse_weekday(weekday)?;
                state.auto_assign(week_id, weekday);
                ok(200, &state.day_data(week_id, weekday))
            }
            (Method::Get, ["weeks", week_id, "warnings"]) => {
                let week_id = parse_id(week_id)?;
                let warnings: Vec<Warning> = (0..5)
                    .flat_map(|wd| state.day_data(week_id, wd).warnings)
                    .collect();
                ok(200, &json!({ "warnings": warnings, "summary": { "total": warnings.len() } }))
            }
            (Method::Get, ["weeks", year, week]) => {
                let year: i32 = year.parse().map_err(|_| AppError::Generic("bad year".into()))?;
                let week: u32 = week.parse().map_err(|_| AppError::Generic("bad week".into()))?;
                match state.find_week(year, week) {
                    Some(found) => ok(200, &found),
                    None => error(404, "Veckoschema hittades inte"),
                }
            }
            (Method::Put, ["weeks", _, "student-days", sd_id]) => {
                let sd_id = parse_id(sd_id)?;
                let data: StudentDayUpdate = parse_body(request)?;
                match state.student_days.iter_mut().find(|sd| sd.id == sd_id) {
                    Some(sd) => {
                        apply_student_day_update(sd, data);
                        let sd = sd.clone();
                        ok(200, &state.enrich_student_day(sd))
                    }
                    None => error(404, "Elevdag hittades inte"),
                }
            }
            (Method::Put, ["weeks", _, "shifts", shift_id]) => {
                let shift_id = parse_id(shift_id)?;
                let data: StaffShiftUpdate = parse_body(request)?;
                match state.staff_shifts.iter_mut().find(|s| s.id == shift_id) {
                    Some(shift) => {
                        if let Some(start) = data.start_time {
                            shift.start_time = start;
                        }
                        if let Some(end) = data.end_time {
                            shift.end_time = end;
                        }
                        if let Some(minutes) = data.break_minutes {
                            shift.break_minutes = minutes;
                        }
                        if let Some(notes) = data.notes {
                            shift.notes = notes;
                        }
                        ok(200, shift)
                    }
                    None => error(404, "Pass hittades inte"),
                }
            }
            (Method::Post, ["weeks", week_id, "day-assignments"]) => {
                let week_id = parse_id(week_id)?;
                let data: DayAssignmentCreate = parse_body(request)?;
                let assignment = DayAssignment {
                    id: Uuid::new_v4(),
                    week_schedule_id: week_id,
                    student_id: data.student_id,
                    staff_id: data.staff_id,
                    weekday: data.weekday,
                    start_time: data.start_time,
                    end_time: data.end_time,
                    role: data.role,
                    notes: data.notes,
                    student_name: None,
                    staff_name: None,
                };
                state.day_assignments.push(assignment.clone());
                ok(201, &assignment)
            }
            (Method::Put, ["weeks", _, "day-assignments", da_id]) => {
                let da_id = parse_id(da_id)?;
                let data: DayAssignmentUpdate = parse_body(request)?;
                match state.day_assignments.iter_mut().find(|a| a.id == da_id) {
                    Some(a) => {
                        if let Some(staff_id) = data.staff_id {
                            a.staff_id = staff_id;
                        }
                        if let Some(start) = data.start_time {
                            a.start_time = start;
                        }
                        if let Some(end) = data.end_time {
                            a.end_time = end;
                        }
                        if let Some(role) = data.role {
                            a.role = role;
                        }
                        if data.notes.is_some() {
                            a.notes = data.notes;
                        }
                        ok(200, a)
                    }
                    None => error(404, "Tilldelning hittades inte"),
                }
            }
            (Method::Delete, ["weeks", _, "day-assignments", da_id]) => {
                let da_id = parse_id(da_id)?;
                let before = state.day_assignments.len();
                state.day_assignments.retain(|a| a.id != da_id);
                if state.day_assignments.len() == before {
                    return error(404, "Tilldelning hittades inte");
                }
                Ok(HttpResponse {
                    status: 204,
                    body: String::new(),
                })
            }
            _ => error(404, "Not Found"),
        }
    }
}

#[async_trait]
impl Transport for FakeBackend {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        let mut state = self.state.lock().unwrap();
        state.requests.push(request.clone());
        if let Some((status, detail)) = state.failures.pop_front() {
            return error(status, &detail);
        }
        Self::route(&mut state, &request)
    }
}

fn parse_id(raw: &str) -> Result<Uuid> {
    Uuid::parse_str(raw).map_err(|e| AppError::Generic(format!("bad id '{}': {}", raw, e)))
}

fn parse_weekday(raw: &str) -> Result<u8> {
    raw.parse()
        .map_err(|_| AppError::Generic(format!("bad weekday '{}'", raw)))
}

fn apply_student_day_update(sd: &mut StudentDay, data: StudentDayUpdate) {
    if let Some(arrival) = data.arrival_time {
        sd.arrival_time = arrival;
    }
    if let Some(departure) = data.departure_time {
        sd.departure_time = departure;
    }
    if let Some(fm) = data.fm_staff_id {
        sd.fm_staff_id = fm;
    }
    if let Some(em) = data.em_staff_id {
        sd.em_staff_id = em;
    }
    if let Some(notes) = data.notes {
        sd.notes = notes;
    }
    if let Some(absent) = data.absent_type {
        sd.absent_type = absent;
    }
}

impl BackendState {
    fn find_week(&self, year: i32, week_number: u32) -> Option<WeekSchedule> {
        self.weeks
            .iter()
            .find(|w| w.year == year && w.week_number == week_number)
            .cloned()
    }

    fn insert_week(&mut self, year: i32, week_number: u32, copied_from_id: Option<Uuid>) -> WeekSchedule {
        let week = WeekSchedule {
            id: Uuid::new_v4(),
            year,
            week_number,
            status: WeekStatus::Draft,
            notes: None,
            copied_from_id,
            created_at: fixed_time(),
            updated_at: fixed_time(),
        };
        self.weeks.push(week.clone());
        week
    }

    fn populate(&mut self, week_id: Uuid) {
        for student in self.students.clone() {
            for weekday in 0..5u8 {
                let care = self
                    .care_times
                    .iter()
                    .find(|ct| ct.student_id == student.id && ct.weekday == weekday);
                self.student_days.push(StudentDay {
                    id: Uuid::new_v4(),
                    week_schedule_id: week_id,
                    student_id: student.id,
                    weekday,
                    arrival_time: care.map(|ct| ct.start_time.clone()),
                    departure_time: care.map(|ct| ct.end_time.clone()),
                    fm_staff_id: None,
                    em_staff_id: None,
                    notes: None,
                    absent_type: AbsentType::None,
                    student_name: None,
                    class_name: None,
                    class_id: None,
                    grade: None,
                    has_care_needs: None,
                    fm_staff_name: None,
                    em_staff_name: None,
                });
            }
        }
        for staff in self.staff.clone() {
            for weekday in 0..5u8 {
                self.staff_shifts.push(StaffShift {
                    id: Uuid::new_v4(),
                    week_schedule_id: week_id,
                    staff_id: staff.id,
                    weekday,
                    start_time: "07:00".to_string(),
                    end_time: "16:00".to_string(),
                    break_minutes: 30,
                    notes: None,
                    staff_name: None,
                    class_name: None,
                });
            }
        }
    }

    fn copy_rows(&mut self, source: Uuid, target: Uuid) {
        let days: Vec<StudentDay> = self
            .student_days
            .iter()
            .filter(|sd| sd.week_schedule_id == source)
            .cloned()
            .collect();
        for mut sd in days {
            sd.id = Uuid::new_v4();
            sd.week_schedule_id = target;
            self.student_days.push(sd);
        }
        let shifts: Vec<StaffShift> = self
            .staff_shifts
            .iter()
            .filter(|s| s.week_schedule_id == source)
            .cloned()
            .collect();
        for mut shift in shifts {
            shift.id = Uuid::new_v4();
            shift.week_schedule_id = target;
            self.staff_shifts.push(shift);
        }
    }

    fn record_absence(&mut self, staff_id: Uuid, date: NaiveDate, reason: AbsenceReason) -> Absence {
        let absence = Absence {
            id: Uuid::new_v4(),
            staff_id,
            absence_date: date.and_hms_opt(0, 0, 0).unwrap_or_default(),
            start_time: None,
            end_time: None,
            reason,
            reported_at: fixed_time(),
        };
        self.absences.push(absence.clone());
        absence
    }

    fn staff_name(&self, id: Option<Uuid>) -> Option<String> {
        id.and_then(|id| self.staff.iter().find(|s| s.id == id))
            .map(|s| s.full_name())
    }

    fn enrich_student_day(&self, mut sd: StudentDay) -> StudentDay {
        if let Some(student) = self.students.iter().find(|s| s.id == sd.student_id) {
            sd.student_name = Some(student.full_name());
            sd.class_id = student.class_id;
            sd.class_name = student
                .class_id
                .and_then(|cid| self.classes.iter().find(|c| c.id == cid))
                .map(|c| c.name.clone());
            sd.grade = Some(student.grade);
            sd.has_care_needs = Some(student.has_care_needs);
        }
        sd.fm_staff_name = self.staff_name(sd.fm_staff_id);
        sd.em_staff_name = self.staff_name(sd.em_staff_id);
        sd
    }

    fn day_data(&self, week_id: Uuid, weekday: u8) -> DayData {
        let student_days: Vec<StudentDay> = self
            .student_days
            .iter()
            .filter(|sd| sd.week_schedule_id == week_id && sd.weekday == weekday)
            .cloned()
            .map(|sd| self.enrich_student_day(sd))
            .collect();

        // Like the server: absences are not matched to dates, only to staff.
        let mut warnings: Vec<Warning> = Vec::new();
        for absence in &self.absences {
            let assigned = student_days.iter().any(|sd| {
                sd.fm_staff_id == Some(absence.staff_id) || sd.em_staff_id == Some(absence.staff_id)
            });
            let already = warnings.iter().any(|w| w.staff_id == Some(absence.staff_id));
            if assigned && !already {
                warnings.push(Warning {
                    warning_type: WarningType::Absence,
                    severity: WarningSeverity::Error,
                    message: format!(
                        "{} är frånvarande men tilldelad i schemat",
                        self.staff_name(Some(absence.staff_id)).unwrap_or_default()
                    ),
                    staff_id: Some(absence.staff_id),
                    student_id: None,
                    weekday,
                    time: None,
                });
            }
        }
        warnings.extend(
            self.extra_warnings
                .iter()
                .filter(|(w, warning)| *w == week_id && warning.weekday == weekday)
                .map(|(_, warning)| warning.clone()),
        );

        DayData {
            weekday,
            student_days,
            staff_shifts: self
                .staff_shifts
                .iter()
                .filter(|s| s.week_schedule_id == week_id && s.weekday == weekday)
                .cloned()
                .collect(),
            day_assignments: self
                .day_assignments
                .iter()
                .filter(|a| a.week_schedule_id == week_id && a.weekday == weekday)
                .cloned()
                .collect(),
            warnings,
        }
    }

    fn auto_assign(&mut self, week_id: Uuid, weekday: u8) {
        let Some(first) = self.staff.first().map(|s| s.id) else {
            return;
        };
        for sd in self
            .student_days
            .iter_mut()
            .filter(|sd| sd.week_schedule_id == week_id && sd.weekday == weekday)
        {
            if sd.fm_staff_id.is_none() {
                sd.fm_staff_id = Some(first);
            }
            if sd.em_staff_id.is_none() {
                sd.em_staff_id = Some(first);
            }
        }
    }
}

/// Scratch app data directory, removed on drop.
pub fn temp_app_dir() -> Result<tempfile::TempDir> {
    Ok(tempfile::TempDir::new()?)
}
