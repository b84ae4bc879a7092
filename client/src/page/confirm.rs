//! Destructive actions waiting for an explicit yes

use crate::models::WeekStatus;
use uuid::Uuid;

/// An action staged by the page. It only runs on `confirm()`; `cancel()`
/// drops it. There is no timeout and no default answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingAction {
    SetWeekStatus {
        week_id: Uuid,
        status: WeekStatus,
    },
    DeleteDayAssignment {
        week_id: Uuid,
        assignment_id: Uuid,
        description: String,
    },
}

impl PendingAction {
    /// Question shown to the user before the action runs.
    pub fn prompt(&self) -> String {
        match self {
            PendingAction::SetWeekStatus {
                status: WeekStatus::Published,
                ..
            } => "Publicera veckoschemat?".to_string(),
            PendingAction::SetWeekStatus {
                status: WeekStatus::Draft,
                ..
            } => "Avpublicera veckoschemat och gör det till utkast igen?".to_string(),
            PendingAction::DeleteDayAssignment { description, .. } => {
                format!("Ta bort tilldelningen {}?", description)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompts() {
        let publish = PendingAction::SetWeekStatus {
            week_id: Uuid::nil(),
            status: WeekStatus::Published,
        };
        let delete = PendingAction::DeleteDayAssignment {
            week_id: Uuid::nil(),
            assignment_id: Uuid::nil(),
            description: "Anna → Alva".to_string(),
        };

        assert_eq!(publish.prompt(), "Publicera veckoschemat?");
        assert!(delete.prompt().contains("Anna → Alva"));
    }
}
