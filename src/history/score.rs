//! Consistency scorer
//!
//! The 0-4 adherence score behind the heatmap and the calendar day status.
//! Both run on the same normalized accessor and aggregator as every other
//! view.

use chrono::{Days, NaiveDate};
use serde::Serialize;

use crate::history::store::HistoryStore;
use crate::history::totals::daily_totals;
use crate::models::{Catalog, DayLog, Goals};

/// Days shown by the consistency heatmap
pub const HEATMAP_DAYS: u64 = 60;

/// Adherence score for one day, 0..=4. One point per criterion:
/// protein >= 90% of goal, energy >= 90% of goal, >= 60% of catalog blocks
/// completed, >= 3 habit flags true.
pub fn score_day(log: &DayLog, catalog: &Catalog, goals: &Goals) -> u8 {
    let totals = daily_totals(log, catalog);

    let mut score = 0u8;
    if goals.protein_fraction(totals.protein) >= 0.9 {
        score += 1;
    }
    if goals.kcal_fraction(totals.kcal) >= 0.9 {
        score += 1;
    }
    if !catalog.is_empty()
        && log.completed_ids.len() as f64 >= catalog.len() as f64 * 0.6
    {
        score += 1;
    }
    if log.habits_done() >= 3 {
        score += 1;
    }
    score
}

/// Calendar classification of a day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DayStatus {
    /// Nothing completed and no manual protein
    Empty,
    /// Protein below half of goal
    Started,
    /// Protein at or above half of goal
    Good,
    /// Protein at or above 90% of goal
    Perfect,
}

impl DayStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DayStatus::Empty => "empty",
            DayStatus::Started => "started",
            DayStatus::Good => "good",
            DayStatus::Perfect => "perfect",
        }
    }
}

/// Classify a day for the calendar dot
pub fn day_status(log: &DayLog, catalog: &Catalog, goals: &Goals) -> DayStatus {
    if log.completed_ids.is_empty() && log.extra_protein == 0.0 {
        return DayStatus::Empty;
    }

    let totals = daily_totals(log, catalog);
    let fraction = goals.protein_fraction(totals.protein);
    if fraction >= 0.9 {
        DayStatus::Perfect
    } else if fraction >= 0.5 {
        DayStatus::Good
    } else {
        DayStatus::Started
    }
}

/// One heatmap cell
#[derive(Debug, Clone, Copy, Serialize)]
pub struct HeatmapCell {
    pub date: NaiveDate,
    /// 0..=4, mapped by clients onto the five-step intensity scale
    pub intensity: u8,
}

/// Scores for the `days` calendar days ending at `today`, oldest first
pub fn heatmap(
    store: &HistoryStore,
    catalog: &Catalog,
    goals: &Goals,
    today: NaiveDate,
    days: u64,
) -> Vec<HeatmapCell> {
    (0..days)
        .rev()
        .filter_map(|back| today.checked_sub_days(Days::new(back)))
        .map(|date| HeatmapCell {
            date,
            intensity: score_day(&store.day_log(date), catalog, goals),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn full_day(catalog: &Catalog) -> DayLog {
        let mut log = DayLog::default();
        for block in catalog.blocks() {
            log.completed_ids.insert(block.id.clone());
        }
        for id in ["sleep", "creatine", "reading"] {
            log.habits.insert(id.to_string(), true);
        }
        log
    }

    #[test]
    fn test_score_bounds() {
        let catalog = Catalog::standard();
        let goals = Goals::standard();

        assert_eq!(score_day(&DayLog::default(), &catalog, &goals), 0);
        // The full plan (239.5g / 3152 kcal) clears every criterion
        let mut log = full_day(&catalog);
        assert_eq!(score_day(&log, &catalog, &goals), 4);
        log.habits.clear();
        assert_eq!(score_day(&log, &catalog, &goals), 3);
    }

    #[test]
    fn test_score_is_monotone_per_criterion() {
        let catalog = Catalog::standard();
        let goals = Goals::standard();
        let mut log = DayLog::default();
        let mut last = score_day(&log, &catalog, &goals);

        log.extra_protein = goals.protein * 0.9;
        let s = score_day(&log, &catalog, &goals);
        assert!(s >= last);
        last = s;

        log.extra_kcal = goals.kcal * 0.9;
        let s = score_day(&log, &catalog, &goals);
        assert!(s >= last);
        last = s;

        for block in catalog.blocks().iter().take(5) {
            log.completed_ids.insert(block.id.clone());
        }
        let s = score_day(&log, &catalog, &goals);
        assert!(s >= last);
        last = s;

        for id in ["sleep", "creatine", "reading"] {
            log.habits.insert(id.to_string(), true);
        }
        let s = score_day(&log, &catalog, &goals);
        assert!(s >= last);
        assert_eq!(s, 4);
    }

    #[test]
    fn test_schedule_criterion_at_sixty_percent() {
        let catalog = Catalog::standard();
        let goals = Goals { protein: 0.0, kcal: 0.0, water: 0.0 };
        let mut log = DayLog::default();

        // 4 of 8 blocks: below 60%
        for block in catalog.blocks().iter().take(4) {
            log.completed_ids.insert(block.id.clone());
        }
        assert_eq!(score_day(&log, &catalog, &goals), 0);

        // 5 of 8: 62.5%, and zero goals never award macro points
        log.completed_ids
            .insert(catalog.blocks()[4].id.clone());
        assert_eq!(score_day(&log, &catalog, &goals), 1);
    }

    #[test]
    fn test_day_status_thresholds() {
        let catalog = Catalog::standard();
        let goals = Goals::standard();

        let log = DayLog::default();
        assert_eq!(day_status(&log, &catalog, &goals), DayStatus::Empty);

        let mut log = DayLog::default();
        log.extra_protein = goals.protein * 0.9;
        assert_eq!(day_status(&log, &catalog, &goals), DayStatus::Perfect);

        log.extra_protein = goals.protein * 0.5;
        assert_eq!(day_status(&log, &catalog, &goals), DayStatus::Good);

        log.extra_protein = goals.protein * 0.49;
        assert_eq!(day_status(&log, &catalog, &goals), DayStatus::Started);
    }

    #[test]
    fn test_completed_block_without_protein_is_not_empty() {
        let catalog = Catalog::standard();
        let goals = Goals::standard();
        let mut log = DayLog::default();
        log.completed_ids.insert("block-1630".to_string()); // 0g block

        assert_eq!(day_status(&log, &catalog, &goals), DayStatus::Started);
    }

    #[test]
    fn test_single_block_scenario() {
        // One 59g/548kcal block completed plus 10g logged manually: 69g,
        // about 29% of the 235g goal
        let catalog = Catalog::standard();
        let goals = Goals::standard();
        let mut log = DayLog::default();
        log.completed_ids.insert("block-0400".to_string());
        log.extra_protein = 10.0;

        let totals = daily_totals(&log, &catalog);
        assert_eq!(totals.protein, 69.0);
        assert_eq!(totals.kcal, 548.0);
        assert_eq!(crate::models::percent(totals.protein, goals.protein), 29.0);
        assert_eq!(day_status(&log, &catalog, &goals), DayStatus::Started);
    }

    #[test]
    fn test_heatmap_window() {
        let mut store = HistoryStore::new();
        let catalog = Catalog::standard();
        let goals = Goals::standard();
        let today = date("2025-03-15");

        for block in catalog.blocks() {
            store.toggle_completion(today, &block.id);
        }

        let cells = heatmap(&store, &catalog, &goals, today, HEATMAP_DAYS);
        assert_eq!(cells.len(), 60);
        assert_eq!(cells[0].date, date("2025-01-15"));
        assert_eq!(cells[59].date, today);
        assert_eq!(cells[59].intensity, 3); // protein, energy, schedule
        assert_eq!(cells[0].intensity, 0);
    }
}
