//! Habit definitions
//!
//! Daily checkboxes independent of the meal schedule.

use serde::Serialize;

/// Habit id whose completion feeds the recovery trend
pub const SLEEP_HABIT: &str = "sleep";

/// Habit id whose completion feeds the supplement trend
pub const CREATINE_HABIT: &str = "creatine";

/// A daily habit checkbox
#[derive(Debug, Clone, Serialize)]
pub struct HabitDef {
    pub id: &'static str,
    pub label: &'static str,
    /// Icon name for clients that render one
    pub icon: &'static str,
}

/// The standard habit set, in display order
pub const HABITS: &[HabitDef] = &[
    HabitDef {
        id: "creatine",
        label: "Creatine Infusion (7g)",
        icon: "Beaker",
    },
    HabitDef {
        id: "sleep",
        label: "Sleep Recovery (7h+)",
        icon: "Moon",
    },
    HabitDef {
        id: "reading",
        label: "Intellect Up (20m)",
        icon: "BookOpen",
    },
];

/// Resolve a free-text target to a habit: id-contains or label-contains,
/// case-insensitive
pub fn find_habit(needle: &str) -> Option<&'static HabitDef> {
    let needle = needle.to_lowercase();
    HABITS
        .iter()
        .find(|h| h.id.contains(&needle) || h.label.to_lowercase().contains(&needle))
}

/// Look up a habit by exact id
pub fn habit(id: &str) -> Option<&'static HabitDef> {
    HABITS.iter().find(|h| h.id == id)
}
