//! Stat aggregator
//!
//! Derives a single day's totals from its log and the block catalog. Every
//! consumer (snapshot card, calendar status, heatmap, trend buckets) goes
//! through these two functions so the views cannot drift apart.

use serde::Serialize;

use crate::models::{Catalog, DayLog, CREATINE_HABIT, SLEEP_HABIT};

/// Derived macro totals for one day
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct DailyTotals {
    pub protein: f64,
    pub kcal: f64,
}

/// Manual extras plus the contribution of every completed block found in
/// the catalog. Ids the catalog no longer knows are skipped: logs may
/// reference blocks from an older plan.
pub fn daily_totals(log: &DayLog, catalog: &Catalog) -> DailyTotals {
    let mut totals = DailyTotals {
        protein: log.extra_protein,
        kcal: log.extra_kcal,
    };

    for id in &log.completed_ids {
        if let Some(block) = catalog.block(id) {
            totals.protein += block.total_protein;
            totals.kcal += block.total_kcal;
        }
    }

    totals
}

/// One day's full analytics sample
#[derive(Debug, Clone, Copy, Serialize)]
pub struct DaySample {
    pub totals: DailyTotals,
    pub water: i64,
    pub sleep: bool,
    pub creatine: bool,
}

/// Totals plus water and the two designated habit indicators
pub fn sample_day(log: &DayLog, catalog: &Catalog) -> DaySample {
    DaySample {
        totals: daily_totals(log, catalog),
        water: log.water_intake,
        sleep: log.habit_done(SLEEP_HABIT),
        creatine: log.habit_done(CREATINE_HABIT),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_totals_are_additive() {
        let catalog = Catalog::standard();
        let mut log = DayLog::default();
        log.extra_protein = 7.0;
        log.extra_kcal = 120.0;
        log.completed_ids.insert("block-0400".to_string()); // 59g / 548
        log.completed_ids.insert("block-0630".to_string()); // 11g / 470

        let totals = daily_totals(&log, &catalog);
        assert_eq!(totals.protein, 7.0 + 59.0 + 11.0);
        assert_eq!(totals.kcal, 120.0 + 548.0 + 470.0);
    }

    #[test]
    fn test_unknown_ids_contribute_zero() {
        let catalog = Catalog::standard();
        let mut log = DayLog::default();
        log.extra_protein = 10.0;
        log.completed_ids.insert("block-0400".to_string());
        log.completed_ids.insert("block-retired".to_string());

        let totals = daily_totals(&log, &catalog);
        assert_eq!(totals.protein, 69.0);
        assert_eq!(totals.kcal, 548.0);
    }

    #[test]
    fn test_empty_log_yields_zero() {
        let catalog = Catalog::standard();
        assert_eq!(
            daily_totals(&DayLog::default(), &catalog),
            DailyTotals::default()
        );
    }

    #[test]
    fn test_sample_picks_designated_habits() {
        let catalog = Catalog::standard();
        let mut log = DayLog::default();
        log.water_intake = -250;
        log.habits.insert("sleep".to_string(), true);
        log.habits.insert("reading".to_string(), true);

        let sample = sample_day(&log, &catalog);
        assert_eq!(sample.water, -250);
        assert!(sample.sleep);
        assert!(!sample.creatine); // reading does not stand in for creatine
    }
}
