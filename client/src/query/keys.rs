//! Cache keys for GET results

use crate::config;
use uuid::Uuid;

/// Families of cached reads. Invalidation works on whole scopes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    Weeks,
    Day,
    Warnings,
    WeekReports,
    Students,
    CareTimes,
    Staff,
    Absences,
    WorkHours,
    Classes,
    Schedules,
}

/// Server-computed week analyses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WeekReport {
    Vulnerability,
    ClassBalance,
    SubstituteReport,
    Wellbeing,
}

/// One cached read, identified by the resource tuple it was fetched with
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QueryKey {
    WeekByNumber { year: i32, week_number: u32 },
    Day { week_id: Uuid, weekday: u8 },
    Warnings { week_id: Uuid },
    WeekReport { week_id: Uuid, report: WeekReport },
    Students,
    CareTimes { student_id: Uuid },
    Staff,
    Absences { staff_id: Uuid },
    WorkHours { staff_id: Uuid },
    Classes,
    Schedules,
}

impl QueryKey {
    pub fn scope(&self) -> Scope {
        match self {
            QueryKey::WeekByNumber { .. } => Scope::Weeks,
            QueryKey::Day { .. } => Scope::Day,
            QueryKey::Warnings { .. } => Scope::Warnings,
            QueryKey::WeekReport { .. } => Scope::WeekReports,
            QueryKey::Students => Scope::Students,
            QueryKey::CareTimes { .. } => Scope::CareTimes,
            QueryKey::Staff => Scope::Staff,
            QueryKey::Absences { .. } => Scope::Absences,
            QueryKey::WorkHours { .. } => Scope::WorkHours,
            QueryKey::Classes => Scope::Classes,
            QueryKey::Schedules => Scope::Schedules,
        }
    }

    /// How many extra attempts a failed read gets.
    ///
    /// Week lookups never retry so a missing schedule is not mistaken for a
    /// flaky one.
    pub fn retry_attempts(&self) -> u32 {
        match self {
            QueryKey::WeekByNumber { .. } => 0,
            _ => config::QUERY_RETRY_ATTEMPTS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_week_lookup_does_not_retry() {
        let week = QueryKey::WeekByNumber {
            year: 2025,
            week_number: 53,
        };
        let day = QueryKey::Day {
            week_id: Uuid::new_v4(),
            weekday: 0,
        };

        assert_eq!(week.retry_attempts(), 0);
        assert_eq!(day.retry_attempts(), config::QUERY_RETRY_ATTEMPTS);
    }

    #[test]
    fn test_keys_differ_by_tuple() {
        let week_id = Uuid::new_v4();
        let monday = QueryKey::Day { week_id, weekday: 0 };
        let tuesday = QueryKey::Day { week_id, weekday: 1 };

        assert_ne!(monday, tuesday);
        assert_eq!(monday.scope(), tuesday.scope());
    }
}
