//! Batch command interpreter
//!
//! The terminal's line protocol: fixed-letter prefixes for macro and water
//! deltas, `done`/`fin` to complete a block by 1-based index or fuzzy
//! title/time match, and `h`/`habit`/`check` for habits by fuzzy id/label.
//! Macro and water amounts accumulate across the batch and apply as one
//! mutation each at the end. A line that fails to parse or to resolve is
//! reported and never aborts the rest of the batch.

use chrono::NaiveDate;
use serde::Serialize;

use crate::history::HistoryStore;
use crate::models::{find_habit, Catalog};

/// Outcome of one batch execution
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    /// Per-line results, in input order
    pub log: Vec<String>,
    pub protein_added: i64,
    pub kcal_added: i64,
    pub water_added: i64,
    pub blocks_toggled: usize,
    pub habits_toggled: usize,
}

/// Execute a multi-line command batch against one date
pub fn run_batch(
    store: &mut HistoryStore,
    date: NaiveDate,
    catalog: &Catalog,
    input: &str,
) -> BatchReport {
    let mut report = BatchReport {
        log: Vec::new(),
        protein_added: 0,
        kcal_added: 0,
        water_added: 0,
        blocks_toggled: 0,
        habits_toggled: 0,
    };

    for raw in input.lines() {
        let line = raw.trim().to_lowercase();
        if line.is_empty() {
            continue;
        }

        let (verb, target) = match line.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, rest.trim()),
            None => (line.as_str(), ""),
        };

        match verb {
            "p" | "pro" => match parse_amount(target) {
                Some(value) => {
                    report.protein_added += value;
                    report.log.push(format!("Added {value}g Protein"));
                }
                None => report.log.push(unknown(&line)),
            },
            "k" | "c" | "kcal" => match parse_amount(target) {
                Some(value) => {
                    report.kcal_added += value;
                    report.log.push(format!("Added {value} kcal"));
                }
                None => report.log.push(unknown(&line)),
            },
            "w" | "water" => match parse_amount(target) {
                Some(value) => {
                    report.water_added += value;
                    report.log.push(format!("Added {value}ml Water"));
                }
                None => report.log.push(unknown(&line)),
            },
            "done" | "fin" if !target.is_empty() => {
                let by_position = parse_position(target, catalog.len())
                    .and_then(|n| catalog.by_position(n).map(|b| (n, b)));
                if let Some((position, block)) = by_position {
                    store.toggle_completion(date, &block.id);
                    report.blocks_toggled += 1;
                    report.log.push(format!("Completed Block #{position}"));
                } else if let Some(block) = catalog.find_fuzzy(target) {
                    store.toggle_completion(date, &block.id);
                    report.blocks_toggled += 1;
                    report.log.push(format!("Completed \"{}\"", block.title));
                } else {
                    report.log.push(format!("Block not found: \"{target}\""));
                }
            }
            "h" | "habit" | "check" if !target.is_empty() => match find_habit(target) {
                Some(habit) => {
                    store.toggle_habit(date, habit.id);
                    report.habits_toggled += 1;
                    report.log.push(format!("Checked Habit \"{}\"", habit.label));
                }
                None => report.log.push(format!("Habit not found: \"{target}\"")),
            },
            _ => report.log.push(unknown(&line)),
        }
    }

    // Accumulated macro and water deltas land as single mutations
    if report.protein_added > 0 || report.kcal_added > 0 {
        store.add_extra(
            date,
            report.protein_added as f64,
            report.kcal_added as f64,
        );
    }
    if report.water_added > 0 {
        store.add_water(date, report.water_added);
    }

    report
}

/// Amounts are plain non-negative integers, nothing else
fn parse_amount(s: &str) -> Option<i64> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

/// A target that is entirely digits addresses a block by 1-based position
fn parse_position(target: &str, len: usize) -> Option<usize> {
    if !target.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    match target.parse::<usize>() {
        Ok(n) if n >= 1 && n <= len => Some(n),
        _ => None,
    }
}

fn unknown(line: &str) -> String {
    format!("Unknown command: \"{line}\"")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn test_macro_lines_accumulate_into_one_mutation() {
        let mut store = HistoryStore::new();
        let catalog = Catalog::standard();
        let d = date("2025-03-01");

        let report = run_batch(&mut store, d, &catalog, "p 30\npro 12\nk 500\nc 200\nw 250");
        assert_eq!(report.protein_added, 42);
        assert_eq!(report.kcal_added, 700);
        assert_eq!(report.water_added, 250);

        let log = store.day_log(d);
        assert_eq!(log.extra_protein, 42.0);
        assert_eq!(log.extra_kcal, 700.0);
        assert_eq!(log.water_intake, 250);
    }

    #[test]
    fn test_done_by_index_and_fuzzy() {
        let mut store = HistoryStore::new();
        let catalog = Catalog::standard();
        let d = date("2025-03-01");

        let report = run_batch(&mut store, d, &catalog, "done 1\ndone lunch\nfin 0930");
        assert_eq!(report.blocks_toggled, 3);
        assert_eq!(report.log[0], "Completed Block #1");
        assert_eq!(report.log[1], "Completed \"Main Quest: Lunch\"");

        let log = store.day_log(d);
        assert!(log.completed_ids.contains("block-0400"));
        assert!(log.completed_ids.contains("block-1230"));
        assert!(log.completed_ids.contains("block-0930"));
    }

    #[test]
    fn test_done_is_a_toggle() {
        let mut store = HistoryStore::new();
        let catalog = Catalog::standard();
        let d = date("2025-03-01");

        run_batch(&mut store, d, &catalog, "done 1\ndone 1");
        assert!(store.day_log(d).completed_ids.is_empty());
    }

    #[test]
    fn test_out_of_range_index_falls_through_to_fuzzy() {
        let mut store = HistoryStore::new();
        let catalog = Catalog::standard();
        let d = date("2025-03-01");

        // 9 is no valid position but still matches "09:30 AM" as text
        let report = run_batch(&mut store, d, &catalog, "done 9\ndone 99");
        assert_eq!(report.blocks_toggled, 1);
        assert_eq!(report.log[0], "Completed \"Consumable: Snack\"");
        assert_eq!(report.log[1], "Block not found: \"99\"");
    }

    #[test]
    fn test_habit_resolution() {
        let mut store = HistoryStore::new();
        let catalog = Catalog::standard();
        let d = date("2025-03-01");

        let report = run_batch(&mut store, d, &catalog, "h sleep\nhabit creat\ncheck intellect");
        assert_eq!(report.habits_toggled, 3);
        let log = store.day_log(d);
        assert!(log.habit_done("sleep"));
        assert!(log.habit_done("creatine"));
        assert!(log.habit_done("reading"));
    }

    #[test]
    fn test_failures_are_reported_per_line_and_do_not_abort() {
        let mut store = HistoryStore::new();
        let catalog = Catalog::standard();
        let d = date("2025-03-01");

        let report = run_batch(
            &mut store,
            d,
            &catalog,
            "p 30\ndone second breakfast\nh yoga\nfeed me\np thirty\nw 100",
        );
        assert_eq!(report.log.len(), 6);
        assert_eq!(report.log[1], "Block not found: \"second breakfast\"");
        assert_eq!(report.log[2], "Habit not found: \"yoga\"");
        assert!(report.log[3].starts_with("Unknown command"));
        assert!(report.log[4].starts_with("Unknown command"));

        // The valid lines still applied
        let log = store.day_log(d);
        assert_eq!(log.extra_protein, 30.0);
        assert_eq!(log.water_intake, 100);
    }

    #[test]
    fn test_blank_lines_and_case_are_normalized() {
        let mut store = HistoryStore::new();
        let catalog = Catalog::standard();
        let d = date("2025-03-01");

        let report = run_batch(&mut store, d, &catalog, "\n  \nP 10\nDONE LUNCH\n");
        assert_eq!(report.log.len(), 2);
        assert_eq!(store.day_log(d).extra_protein, 10.0);
        assert!(store.day_log(d).completed_ids.contains("block-1230"));
    }
}
