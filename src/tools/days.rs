//! Day tools
//!
//! Inspect a single day and apply the core mutations. Every mutation
//! notifies the autosaver so a quiet period later the snapshot persists.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::history::{daily_totals, day_status, score_day, DailyTotals, DayStatus};
use crate::models::{habit, percent, SchedulePosition};

use super::{parse_date, Session};

/// Full picture of one day
#[derive(Debug, Serialize)]
pub struct DayDetail {
    pub date: String,
    pub status: DayStatus,
    pub score: u8,
    pub totals: DailyTotals,
    pub protein_pct: f64,
    pub kcal_pct: f64,
    pub water_pct: f64,
    pub water_intake: i64,
    pub completed_ids: Vec<String>,
    pub blocks_completed: usize,
    pub blocks_total: usize,
    pub habits: BTreeMap<String, bool>,
    pub extra_protein: f64,
    pub extra_kcal: f64,
    pub readiness: i64,
    /// Player level derived from total days tracked
    pub level: u64,
}

/// Response for toggle_block
#[derive(Debug, Serialize)]
pub struct ToggleBlockResponse {
    pub date: String,
    pub block_id: String,
    pub title: String,
    /// Whether the block is completed after the toggle
    pub completed: bool,
    pub totals: DailyTotals,
}

/// Response for toggle_habit
#[derive(Debug, Serialize)]
pub struct ToggleHabitResponse {
    pub date: String,
    pub habit_id: String,
    pub label: String,
    /// Whether the habit is done after the toggle
    pub done: bool,
}

/// Response for add_macros
#[derive(Debug, Serialize)]
pub struct AddMacrosResponse {
    pub date: String,
    pub extra_protein: f64,
    pub extra_kcal: f64,
    pub totals: DailyTotals,
}

/// Response for add_water
#[derive(Debug, Serialize)]
pub struct AddWaterResponse {
    pub date: String,
    pub water_intake: i64,
    pub water_pct: f64,
}

/// Response for reset_day
#[derive(Debug, Serialize)]
pub struct ResetDayResponse {
    pub date: String,
    /// False when the date had no entry to begin with
    pub removed: bool,
}

/// Get the full detail for a date
pub async fn get_day(session: &Session, date: &str) -> Result<DayDetail, String> {
    let day = parse_date(date)?;
    let store = session.store.lock().await;
    let log = store.day_log(day);
    let totals = daily_totals(&log, &session.catalog);

    Ok(DayDetail {
        date: day.to_string(),
        status: day_status(&log, &session.catalog, &session.goals),
        score: score_day(&log, &session.catalog, &session.goals),
        protein_pct: percent(totals.protein, session.goals.protein),
        kcal_pct: percent(totals.kcal, session.goals.kcal),
        water_pct: percent(log.water_intake as f64, session.goals.water),
        totals,
        water_intake: log.water_intake,
        completed_ids: log.completed_ids.iter().cloned().collect(),
        blocks_completed: log.completed_ids.len(),
        blocks_total: session.catalog.len(),
        habits: log.habits.clone(),
        extra_protein: log.extra_protein,
        extra_kcal: log.extra_kcal,
        readiness: log.readiness,
        level: store.level(),
    })
}

/// Flip a schedule block's completion for a date
pub async fn toggle_block(
    session: &Session,
    date: &str,
    block_id: &str,
) -> Result<ToggleBlockResponse, String> {
    let day = parse_date(date)?;
    let block = session
        .catalog
        .block(block_id)
        .ok_or_else(|| format!("Unknown block id: {block_id}"))?;

    let response = {
        let mut store = session.store.lock().await;
        let completed = store.toggle_completion(day, block_id);
        let totals = daily_totals(&store.day_log(day), &session.catalog);
        ToggleBlockResponse {
            date: day.to_string(),
            block_id: block.id.clone(),
            title: block.title.clone(),
            completed,
            totals,
        }
    };

    session.autosave.touch();
    Ok(response)
}

/// Flip a habit flag for a date
pub async fn toggle_habit(
    session: &Session,
    date: &str,
    habit_id: &str,
) -> Result<ToggleHabitResponse, String> {
    let day = parse_date(date)?;
    let def = habit(habit_id).ok_or_else(|| format!("Unknown habit id: {habit_id}"))?;

    let done = {
        let mut store = session.store.lock().await;
        store.toggle_habit(day, def.id)
    };

    session.autosave.touch();
    Ok(ToggleHabitResponse {
        date: day.to_string(),
        habit_id: def.id.to_string(),
        label: def.label.to_string(),
        done,
    })
}

/// Add manually logged macros to a date
pub async fn add_macros(
    session: &Session,
    date: &str,
    protein: f64,
    kcal: f64,
) -> Result<AddMacrosResponse, String> {
    let day = parse_date(date)?;
    if protein < 0.0 || kcal < 0.0 {
        return Err("Macro deltas must be non-negative".to_string());
    }

    let response = {
        let mut store = session.store.lock().await;
        store.add_extra(day, protein, kcal);
        let log = store.day_log(day);
        AddMacrosResponse {
            date: day.to_string(),
            extra_protein: log.extra_protein,
            extra_kcal: log.extra_kcal,
            totals: daily_totals(&log, &session.catalog),
        }
    };

    session.autosave.touch();
    Ok(response)
}

/// Add (or with a negative amount, drain) water for a date
pub async fn add_water(
    session: &Session,
    date: &str,
    amount: i64,
) -> Result<AddWaterResponse, String> {
    let day = parse_date(date)?;

    let response = {
        let mut store = session.store.lock().await;
        store.add_water(day, amount);
        let water = store.day_log(day).water_intake;
        AddWaterResponse {
            date: day.to_string(),
            water_intake: water,
            water_pct: percent(water as f64, session.goals.water),
        }
    };

    session.autosave.touch();
    Ok(response)
}

/// Remove a date's entry entirely. Requires force to confirm.
pub async fn reset_day(
    session: &Session,
    date: &str,
    force: bool,
) -> Result<ResetDayResponse, String> {
    let day = parse_date(date)?;
    if !force {
        return Err("reset_day wipes the whole date; pass force=true to confirm".to_string());
    }

    let removed = {
        let mut store = session.store.lock().await;
        store.reset_day(day)
    };

    session.autosave.touch();
    Ok(ResetDayResponse {
        date: day.to_string(),
        removed,
    })
}

/// Active and upcoming schedule block for a minutes-since-midnight clock
pub fn current_block(session: &Session, minutes_of_day: u32) -> SchedulePosition {
    session.catalog.position_at(minutes_of_day)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use tokio::sync::Mutex;

    use super::*;
    use crate::history::HistoryStore;
    use crate::models::{Catalog, Goals};
    use crate::sync::{Autosaver, Credential, LocalStore};

    fn test_session(name: &str) -> Session {
        let mut path = std::env::temp_dir();
        path.push(format!("systemos-days-{}-{}.db", name, std::process::id()));
        let _ = std::fs::remove_file(&path);

        let backend = Arc::new(LocalStore::open(&path).unwrap());
        let store = Arc::new(Mutex::new(HistoryStore::new()));
        let autosave = Autosaver::spawn(
            store.clone(),
            backend.clone(),
            Credential::Offline,
            Duration::from_secs(2),
        );
        Session::new(
            store,
            Catalog::standard(),
            Goals::standard(),
            autosave,
            Credential::Offline,
            backend,
        )
    }

    #[tokio::test]
    async fn test_get_day_defaults() {
        let session = test_session("defaults");
        let detail = get_day(&session, "2025-03-01").await.unwrap();
        assert_eq!(detail.status, DayStatus::Empty);
        assert_eq!(detail.score, 0);
        assert_eq!(detail.blocks_total, 8);
        assert_eq!(detail.readiness, 8);
        assert_eq!(detail.level, 1);

        assert!(get_day(&session, "bogus").await.is_err());
    }

    #[tokio::test]
    async fn test_toggle_block_round_trip() {
        let session = test_session("toggle");

        let on = toggle_block(&session, "2025-03-01", "block-0400").await.unwrap();
        assert!(on.completed);
        assert_eq!(on.totals.protein, 59.0);

        let off = toggle_block(&session, "2025-03-01", "block-0400").await.unwrap();
        assert!(!off.completed);
        assert_eq!(off.totals.protein, 0.0);

        assert!(toggle_block(&session, "2025-03-01", "block-x").await.is_err());
    }

    #[tokio::test]
    async fn test_macros_and_water() {
        let session = test_session("macros");

        let macros = add_macros(&session, "2025-03-01", 30.0, 500.0).await.unwrap();
        assert_eq!(macros.extra_protein, 30.0);
        assert_eq!(macros.totals.kcal, 500.0);
        assert!(add_macros(&session, "2025-03-01", -1.0, 0.0).await.is_err());

        let water = add_water(&session, "2025-03-01", 750).await.unwrap();
        assert_eq!(water.water_intake, 750);
        assert_eq!(water.water_pct, 25.0);

        // Drain past zero is tolerated
        let drained = add_water(&session, "2025-03-01", -1000).await.unwrap();
        assert_eq!(drained.water_intake, -250);
    }

    #[tokio::test]
    async fn test_reset_day() {
        let session = test_session("reset");

        add_water(&session, "2025-03-01", 500).await.unwrap();
        assert!(reset_day(&session, "2025-03-01", false).await.is_err());

        let reset = reset_day(&session, "2025-03-01", true).await.unwrap();
        assert!(reset.removed);
        let again = reset_day(&session, "2025-03-01", true).await.unwrap();
        assert!(!again.removed);

        let detail = get_day(&session, "2025-03-01").await.unwrap();
        assert_eq!(detail.water_intake, 0);
    }
}
