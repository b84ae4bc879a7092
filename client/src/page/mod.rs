//! Day-editing workflow for one week schedule
//!
//! `SchedulePage` is the single state container behind the week view: which
//! week and weekday are open, the loaded day aggregate, filters, selection,
//! undo history, a staged destructive action and the inline error banner.
//! All server access goes through `Queries`, so every successful mutation
//! invalidates the cache and the day is read back fresh.

pub mod confirm;

pub use confirm::PendingAction;

use crate::config;
use crate::error::{AppError, Result};
use crate::filter::{self, DayContext, DayFilter, QuickFilter, Selection};
use crate::models::*;
use crate::query::Queries;
use crate::services::settings::DisplaySettings;
use crate::undo::{
    build_revert_request, RevertRequest, StaffShiftEdit, StudentDayEdit, UndoRecord, UndoStack,
};
use chrono::NaiveDate;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageState {
    /// No schedule exists for the open week (or none is open yet).
    NoWeek,
    Loading,
    WeekNoDayLoaded,
    DayLoaded,
}

/// Half-day staffing slot of a student day
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StaffSlot {
    Fm,
    Em,
}

impl StaffSlot {
    pub fn edit(self, staff_id: Option<Uuid>) -> StudentDayEdit {
        match self {
            StaffSlot::Fm => StudentDayEdit::FmStaff(staff_id),
            StaffSlot::Em => StudentDayEdit::EmStaff(staff_id),
        }
    }
}

/// When a staff member is away
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbsenceSpan {
    /// One date; no times means the whole day.
    Day {
        date: NaiveDate,
        start_time: Option<String>,
        end_time: Option<String>,
    },
    /// Every school day from `start_date` through `end_date`
    Range {
        start_date: NaiveDate,
        end_date: NaiveDate,
    },
}

pub struct SchedulePage {
    queries: Queries,
    state: PageState,
    open_week: Option<(i32, u32)>,
    week: Option<WeekSchedule>,
    weekday: u8,
    day: Option<DayData>,
    default_quick_filter: QuickFilter,
    filter: DayFilter,
    selection: Selection,
    undo: UndoStack<UndoRecord>,
    pending: Option<PendingAction>,
    last_error: Option<String>,
    load_error: Option<String>,
}

impl SchedulePage {
    pub fn new(queries: Queries) -> Self {
        Self::with_display(queries, &DisplaySettings::default())
    }

    pub fn with_display(queries: Queries, display: &DisplaySettings) -> Self {
        Self {
            queries,
            state: PageState::NoWeek,
            open_week: None,
            week: None,
            weekday: display.default_weekday.min(config::LAST_WEEKDAY),
            day: None,
            default_quick_filter: display.default_quick_filter,
            filter: DayFilter {
                quick_filter: display.default_quick_filter,
                ..Default::default()
            },
            selection: Selection::default(),
            undo: UndoStack::default(),
            pending: None,
            last_error: None,
            load_error: None,
        }
    }

    // ===== Read access =====

    pub fn state(&self) -> PageState {
        self.state
    }

    pub fn week(&self) -> Option<&WeekSchedule> {
        self.week.as_ref()
    }

    pub fn weekday(&self) -> u8 {
        self.weekday
    }

    pub fn day(&self) -> Option<&DayData> {
        self.day.as_ref()
    }

    pub fn filter(&self) -> &DayFilter {
        &self.filter
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn pending(&self) -> Option<&PendingAction> {
        self.pending.as_ref()
    }

    /// Inline banner for the last failed action
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn dismiss_error(&mut self) {
        self.last_error = None;
    }

    /// Set when the week or day itself could not be loaded.
    pub fn load_error(&self) -> Option<&str> {
        self.load_error.as_deref()
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo.len()
    }

    /// Label of the edit the next `undo()` reverts
    pub fn next_undo_label(&self) -> Option<&str> {
        self.undo.peek().map(|record| record.label.as_str())
    }

    /// Rows of the loaded day that pass the current filters, in source order
    pub fn visible_rows(&self) -> Vec<&StudentDay> {
        match &self.day {
            Some(day) => filter::filter_rows(day, &self.filter),
            None => Vec::new(),
        }
    }

    pub fn day_context(&self) -> DayContext {
        self.day.as_ref().map(DayContext::from_day).unwrap_or_default()
    }

    // ===== Week and day navigation =====

    /// Open a week. Loads the selected weekday when a schedule exists.
    pub async fn open_week(&mut self, year: i32, week_number: u32) -> Result<PageState> {
        validate_week(year, week_number)?;

        self.open_week = Some((year, week_number));
        self.week = None;
        self.day = None;
        self.reset_day_state();
        self.load_error = None;
        self.state = PageState::Loading;

        match self.queries.week(year, week_number).await {
            Ok(Some(week)) => {
                tracing::info!("Opened week {}-W{} ({:?})", year, week_number, week.status);
                self.week = Some(week);
                self.load_day().await
            }
            Ok(None) => {
                tracing::info!("No schedule for {}-W{}", year, week_number);
                self.state = PageState::NoWeek;
                Ok(self.state)
            }
            Err(e) => {
                self.state = PageState::NoWeek;
                self.load_error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Switch weekday. Filters, selection, undo history and any staged
    /// action are reset before the new day loads.
    pub async fn select_day(&mut self, weekday: u8) -> Result<PageState> {
        if weekday > config::LAST_WEEKDAY {
            return Err(AppError::Generic(format!(
                "Veckodag måste vara 0-{}",
                config::LAST_WEEKDAY
            )));
        }

        self.weekday = weekday;
        self.day = None;
        self.reset_day_state();
        self.load_day().await
    }

    /// Fetch the open day from the server, bypassing the cache.
    pub async fn refresh_day(&mut self) -> Result<PageState> {
        let Some(week_id) = self.week_id() else {
            return Ok(self.state);
        };
        self.state = PageState::Loading;
        let result = self.queries.refetch_day(week_id, self.weekday).await;
        self.finish_day_load(result)
    }

    /// Create the schedule for the open week.
    pub async fn create_week(&mut self, notes: Option<String>) -> Result<WeekSchedule> {
        let (year, week_number) = self.require_open_week()?;
        let data = WeekScheduleCreate {
            year,
            week_number,
            notes,
        };

        let result = self.queries.create_week(&data).await;
        let week = self.surface(result)?;
        tracing::info!("Created week {}-W{}", year, week_number);

        self.week = Some(week.clone());
        self.day = None;
        self.state = PageState::WeekNoDayLoaded;
        Ok(week)
    }

    /// Copy another week's schedule into the open week.
    pub async fn copy_week_from(&mut self, source_year: i32, source_week: u32) -> Result<WeekSchedule> {
        let (year, week_number) = self.require_open_week()?;
        validate_week(source_year, source_week)?;

        let lookup = self.queries.week(source_year, source_week).await;
        let source = match self.surface(lookup)? {
            Some(source) => source,
            None => {
                let error = AppError::NotFound(format!(
                    "Vecka {} år {} har inget schema att kopiera",
                    source_week, source_year
                ));
                self.last_error = Some(error.to_string());
                return Err(error);
            }
        };

        let data = WeekScheduleCopy {
            target_year: year,
            target_week: week_number,
        };
        let result = self.queries.copy_week(source.id, &data).await;
        let week = self.surface(result)?;
        tracing::info!(
            "Copied {}-W{} to {}-W{}",
            source_year,
            source_week,
            year,
            week_number
        );

        self.week = Some(week.clone());
        self.day = None;
        self.state = PageState::WeekNoDayLoaded;
        Ok(week)
    }

    // ===== Filters and selection =====

    pub fn set_search(&mut self, term: &str) {
        self.filter.search_term = term.to_string();
    }

    pub fn set_class_filter(&mut self, class_id: Option<Uuid>) {
        self.filter.selected_class = class_id;
    }

    pub fn set_quick_filter(&mut self, quick_filter: QuickFilter) {
        self.filter.quick_filter = quick_filter;
    }

    pub fn toggle_row(&mut self, student_day_id: Uuid) {
        self.selection.toggle(student_day_id);
    }

    pub fn toggle_all_visible(&mut self) {
        let visible: Vec<Uuid> = self.visible_rows().iter().map(|row| row.id).collect();
        self.selection.toggle_all(&visible);
    }

    // ===== Inline edits =====

    /// Change one field of a student day and record how to undo it.
    pub async fn edit_student_day(
        &mut self,
        student_day_id: Uuid,
        edit: StudentDayEdit,
    ) -> Result<StudentDay> {
        let week_id = self.require_week()?;
        let row = self
            .day
            .as_ref()
            .and_then(|day| day.student_day(student_day_id))
            .ok_or_else(|| {
                AppError::Generic(format!("Elevdag {} finns inte i dagens data", student_day_id))
            })?;
        let previous = edit.current_in(row);
        let label = format!(
            "Ändra {} för {}",
            edit.field_name(),
            row.student_name.as_deref().unwrap_or("elev")
        );

        let result = self
            .queries
            .update_student_day(week_id, student_day_id, &edit.to_update())
            .await;
        let updated = self.surface(result)?;
        tracing::info!("{}", label);

        self.undo
            .push(UndoRecord::student_day(week_id, student_day_id, previous, label));
        self.reload_day().await;
        Ok(updated)
    }

    pub async fn assign_staff(
        &mut self,
        student_day_id: Uuid,
        slot: StaffSlot,
        staff_id: Option<Uuid>,
    ) -> Result<StudentDay> {
        self.edit_student_day(student_day_id, slot.edit(staff_id))
            .await
    }

    /// Change one field of a staff shift and record how to undo it.
    pub async fn edit_staff_shift(&mut self, shift_id: Uuid, edit: StaffShiftEdit) -> Result<StaffShift> {
        let week_id = self.require_week()?;
        let shift = self
            .day
            .as_ref()
            .and_then(|day| day.staff_shift(shift_id))
            .ok_or_else(|| AppError::Generic(format!("Pass {} finns inte i dagens data", shift_id)))?;
        let previous = edit.current_in(shift);
        let label = format!(
            "Ändra {} för {}",
            edit.field_name(),
            shift.staff_name.as_deref().unwrap_or("personal")
        );

        let result = self
            .queries
            .update_staff_shift(week_id, shift_id, &edit.to_update())
            .await;
        let updated = self.surface(result)?;
        tracing::info!("{}", label);

        self.undo
            .push(UndoRecord::staff_shift(week_id, shift_id, previous, label));
        self.reload_day().await;
        Ok(updated)
    }

    /// Revert the most recent edit. `Ok(None)` when there is nothing to undo.
    ///
    /// The record is consumed even when the revert fails.
    pub async fn undo(&mut self) -> Result<Option<String>> {
        let Some(record) = self.undo.pop() else {
            return Ok(None);
        };
        let Some(revert) = build_revert_request(&record) else {
            let error = AppError::Generic(format!("Kan inte ångra '{}'", record.label));
            return self.surface(Err(error));
        };

        let result = match &revert {
            RevertRequest::StudentDay {
                week_id,
                student_day_id,
                update,
            } => self
                .queries
                .update_student_day(*week_id, *student_day_id, update)
                .await
                .map(|_| ()),
            RevertRequest::StaffShift {
                week_id,
                shift_id,
                update,
            } => self
                .queries
                .update_staff_shift(*week_id, *shift_id, update)
                .await
                .map(|_| ()),
        };
        self.surface(result)?;
        tracing::info!("Undid: {}", record.label);

        self.reload_day().await;
        Ok(Some(record.label))
    }

    // ===== Bulk and day-wide actions =====

    /// Put the same staff member in one slot of every selected row.
    ///
    /// Rows are updated one by one; the first failure stops the run and
    /// keeps the selection. No undo entries are recorded.
    pub async fn bulk_assign(&mut self, slot: StaffSlot, staff_id: Option<Uuid>) -> Result<usize> {
        let week_id = self.require_week()?;
        let ids = match &self.day {
            Some(day) => self.selection.ordered(&day.student_days),
            None => Vec::new(),
        };
        if ids.is_empty() {
            return Ok(0);
        }

        let update = slot.edit(staff_id).to_update();
        let mut updated = 0;
        for id in ids {
            let result = self.queries.update_student_day(week_id, id, &update).await;
            if let Err(e) = self.surface(result) {
                tracing::warn!("Bulk assignment stopped after {} rows", updated);
                self.reload_day().await;
                return Err(e);
            }
            updated += 1;
        }
        tracing::info!("Bulk assigned {:?} on {} rows", slot, updated);

        self.selection.clear();
        self.reload_day().await;
        Ok(updated)
    }

    /// Register a staff absence. Returns the number of absence days created.
    pub async fn register_absence(
        &mut self,
        staff_id: Uuid,
        span: AbsenceSpan,
        reason: AbsenceReason,
    ) -> Result<usize> {
        let result = match span {
            AbsenceSpan::Day {
                date,
                start_time,
                end_time,
            } => {
                let data = AbsenceCreate {
                    staff_id,
                    absence_date: date,
                    start_time,
                    end_time,
                    reason,
                };
                self.queries
                    .create_absence(staff_id, &data)
                    .await
                    .map(|_| 1)
            }
            AbsenceSpan::Range {
                start_date,
                end_date,
            } => {
                if end_date < start_date {
                    return Err(AppError::Generic(
                        "Slutdatum måste vara samma som eller efter startdatum".to_string(),
                    ));
                }
                let data = BulkAbsenceCreate {
                    start_date,
                    end_date,
                    start_time: None,
                    end_time: None,
                    reason,
                };
                self.queries
                    .create_bulk_absence(staff_id, &data)
                    .await
                    .map(|created| created.len())
            }
        };
        let created = self.surface(result)?;
        tracing::info!("Registered {} absence day(s) for staff {}", created, staff_id);

        self.reload_day().await;
        Ok(created)
    }

    /// Let the server fill FM/EM staff for the open day.
    pub async fn auto_assign(&mut self) -> Result<()> {
        let week_id = self.require_week()?;
        let result = self.queries.auto_assign_day(week_id, self.weekday).await;
        self.surface(result)?;
        tracing::info!("Auto-assigned weekday {}", self.weekday);

        self.reload_day().await;
        Ok(())
    }

    // ===== Special-needs (KTS) assignments =====

    /// Create a KTS assignment on the open weekday.
    pub async fn create_assignment(&mut self, mut data: DayAssignmentCreate) -> Result<DayAssignment> {
        let week_id = self.require_week()?;
        data.weekday = self.weekday;

        let result = self.queries.create_day_assignment(week_id, &data).await;
        let created = self.surface(result)?;
        tracing::info!("Created day assignment {}", created.id);

        self.reload_day().await;
        Ok(created)
    }

    pub async fn update_assignment(
        &mut self,
        assignment_id: Uuid,
        data: &DayAssignmentUpdate,
    ) -> Result<DayAssignment> {
        let week_id = self.require_week()?;

        let result = self
            .queries
            .update_day_assignment(week_id, assignment_id, data)
            .await;
        let updated = self.surface(result)?;

        self.reload_day().await;
        Ok(updated)
    }

    // ===== Confirmed actions =====

    /// Stage publishing (or unpublishing) the open week.
    pub fn request_toggle_publish(&mut self) -> Result<PendingAction> {
        let week = self
            .week
            .as_ref()
            .ok_or_else(|| AppError::Generic("Inget veckoschema är öppet".to_string()))?;
        let action = PendingAction::SetWeekStatus {
            week_id: week.id,
            status: week.status.toggled(),
        };
        self.pending = Some(action.clone());
        Ok(action)
    }

    /// Stage deleting a KTS assignment of the open day.
    pub fn request_delete_assignment(&mut self, assignment_id: Uuid) -> Result<PendingAction> {
        let week_id = self.require_week()?;
        let assignment = self
            .day
            .as_ref()
            .and_then(|day| day.day_assignment(assignment_id))
            .ok_or_else(|| {
                AppError::Generic(format!("Tilldelning {} finns inte i dagens data", assignment_id))
            })?;
        let action = PendingAction::DeleteDayAssignment {
            week_id,
            assignment_id,
            description: format!(
                "{} → {}",
                assignment.staff_name.as_deref().unwrap_or("personal"),
                assignment.student_name.as_deref().unwrap_or("elev")
            ),
        };
        self.pending = Some(action.clone());
        Ok(action)
    }

    /// Drop the staged action without running it.
    pub fn cancel(&mut self) -> Option<PendingAction> {
        self.pending.take()
    }

    /// Run the staged action. `Ok(false)` when nothing was staged.
    pub async fn confirm(&mut self) -> Result<bool> {
        let Some(action) = self.pending.take() else {
            return Ok(false);
        };

        match action {
            PendingAction::SetWeekStatus { week_id, status } => {
                let data = WeekScheduleUpdate {
                    status: Some(status),
                    notes: None,
                };
                let result = self.queries.update_week(week_id, &data).await;
                let week = self.surface(result)?;
                tracing::info!("Week {} is now {:?}", week_id, week.status);
                self.week = Some(week);
            }
            PendingAction::DeleteDayAssignment {
                week_id,
                assignment_id,
                ..
            } => {
                let result = self
                    .queries
                    .delete_day_assignment(week_id, assignment_id)
                    .await;
                self.surface(result)?;
                tracing::info!("Deleted day assignment {}", assignment_id);
                self.reload_day().await;
            }
        }
        Ok(true)
    }

    // ===== Internals =====

    fn week_id(&self) -> Option<Uuid> {
        self.week.as_ref().map(|week| week.id)
    }

    fn require_week(&self) -> Result<Uuid> {
        self.week_id()
            .ok_or_else(|| AppError::Generic("Inget veckoschema är öppet".to_string()))
    }

    fn require_open_week(&self) -> Result<(i32, u32)> {
        self.open_week
            .ok_or_else(|| AppError::Generic("Ingen vecka är vald".to_string()))
    }

    fn reset_day_state(&mut self) {
        self.filter = DayFilter {
            quick_filter: self.default_quick_filter,
            ..Default::default()
        };
        self.selection.clear();
        self.undo.clear();
        self.pending = None;
        self.last_error = None;
    }

    async fn load_day(&mut self) -> Result<PageState> {
        let Some(week_id) = self.week_id() else {
            self.state = PageState::NoWeek;
            return Ok(self.state);
        };
        self.state = PageState::Loading;
        let result = self.queries.day(week_id, self.weekday).await;
        self.finish_day_load(result)
    }

    fn finish_day_load(&mut self, result: Result<DayData>) -> Result<PageState> {
        match result {
            Ok(day) => {
                tracing::debug!(
                    "Loaded weekday {} with {} student rows",
                    self.weekday,
                    day.student_days.len()
                );
                self.day = Some(day);
                self.load_error = None;
                self.state = PageState::DayLoaded;
                Ok(self.state)
            }
            Err(e) => {
                self.day = None;
                self.load_error = Some(e.to_string());
                self.state = PageState::WeekNoDayLoaded;
                Err(e)
            }
        }
    }

    /// Read the day back after a mutation. A failure shows up as the load
    /// error, not as a failure of the mutation.
    async fn reload_day(&mut self) {
        if let Err(e) = self.load_day().await {
            tracing::warn!("Failed to reload weekday {}: {}", self.weekday, e);
        }
    }

    /// Put a failed action's message in the banner; clear it on success.
    fn surface<T>(&mut self, result: Result<T>) -> Result<T> {
        match &result {
            Ok(_) => self.last_error = None,
            Err(e) => {
                tracing::warn!("Action failed: {}", e);
                self.last_error = Some(e.to_string());
            }
        }
        result
    }
}

fn validate_week(year: i32, week_number: u32) -> Result<()> {
    if !(config::MIN_YEAR..=config::MAX_YEAR).contains(&year)
        || !(1..=config::MAX_WEEK_NUMBER).contains(&week_number)
    {
        return Err(AppError::Generic(format!(
            "Ogiltig vecka: år {}, vecka {}",
            year, week_number
        )));
    }
    Ok(())
}
