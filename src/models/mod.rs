//! Data models
//!
//! The schedule catalog, habit definitions, day-log record, and goal
//! targets shared by the whole engine.

mod day_log;
mod goals;
mod habits;
mod schedule;

pub use day_log::DayLog;
pub use goals::{fraction, percent, Goals};
pub use habits::{find_habit, habit, HabitDef, CREATINE_HABIT, HABITS, SLEEP_HABIT};
pub use schedule::{BlockType, Catalog, MealItem, ScheduleBlock, SchedulePosition};
