use serde::Serialize;

use crate::models::user::UserRow;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ProgressSummary {
    pub purchased_modules: usize,
    pub completed_modules: usize,
    /// Whole percent of purchased modules completed, rounded half up.
    pub completion_percent: u32,
}

/// Only purchased modules count; progress recorded for anything else is ignored.
pub fn summarize_progress(user: &UserRow) -> ProgressSummary {
    let purchased_modules = user.purchased_modules.len();
    let completed_modules = user
        .purchased_modules
        .iter()
        .filter(|m| user.progress.get(&m.id).is_some_and(|p| p.completed))
        .count();
    let completion_percent = if purchased_modules == 0 {
        0
    } else {
        ((completed_modules * 200 + purchased_modules) / (purchased_modules * 2)) as u32
    };

    ProgressSummary {
        purchased_modules,
        completed_modules,
        completion_percent,
    }
}
