//! History store
//!
//! The complete per-date log mapping for a user, plus the normalized read
//! accessor and the core mutation operations. Serialization is the storage
//! contract: a JSON object keyed by ISO date (`YYYY-MM-DD`).

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::DayLog;

/// Date-keyed day logs; the full persisted state for a user
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HistoryStore {
    days: BTreeMap<NaiveDate, DayLog>,
}

impl HistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Normalized read: the stored log for the date, or the canonical
    /// default. Never inserts an entry.
    pub fn day_log(&self, date: NaiveDate) -> DayLog {
        self.days.get(&date).cloned().unwrap_or_default()
    }

    /// Whether the date has a stored entry (a zeroed entry is still present;
    /// only `reset_day` removes the key)
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.days.contains_key(&date)
    }

    /// Earliest recorded date, if any
    pub fn earliest_date(&self) -> Option<NaiveDate> {
        self.days.keys().next().copied()
    }

    /// Number of dates with a stored entry
    pub fn days_tracked(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// Player level: one level per three tracked days
    pub fn level(&self) -> u64 {
        self.days_tracked() as u64 / 3 + 1
    }

    pub fn iter(&self) -> impl Iterator<Item = (&NaiveDate, &DayLog)> {
        self.days.iter()
    }

    fn entry(&mut self, date: NaiveDate) -> &mut DayLog {
        self.days.entry(date).or_default()
    }

    /// Place a full log at a date, keeping readiness and unknown fields
    /// verbatim. Used when restoring persisted snapshots.
    pub fn insert_day(&mut self, date: NaiveDate, log: DayLog) {
        self.days.insert(date, log);
    }

    /// Flip membership of a block id in the date's completion set
    pub fn toggle_completion(&mut self, date: NaiveDate, block_id: &str) -> bool {
        let log = self.entry(date);
        if log.completed_ids.remove(block_id) {
            false
        } else {
            log.completed_ids.insert(block_id.to_string());
            true
        }
    }

    /// Flip a habit flag, treating an absent key as false
    pub fn toggle_habit(&mut self, date: NaiveDate, habit_id: &str) -> bool {
        let log = self.entry(date);
        let flag = log.habits.entry(habit_id.to_string()).or_insert(false);
        *flag = !*flag;
        *flag
    }

    /// Accumulate manually logged macros
    pub fn add_extra(&mut self, date: NaiveDate, d_protein: f64, d_kcal: f64) {
        let log = self.entry(date);
        log.extra_protein += d_protein;
        log.extra_kcal += d_kcal;
    }

    /// Accumulate water intake in milliliters. Negative deltas drain; no
    /// floor at zero is applied.
    pub fn add_water(&mut self, date: NaiveDate, d_ml: i64) {
        self.entry(date).water_intake += d_ml;
    }

    /// Remove the date's entry entirely (distinct from zeroing its fields)
    pub fn reset_day(&mut self, date: NaiveDate) -> bool {
        self.days.remove(&date).is_some()
    }
}
