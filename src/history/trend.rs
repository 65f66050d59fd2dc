//! Time-range bucketer
//!
//! Walks an inclusive date span ending at an anchor date, groups each day
//! into a day/week/month bucket, and emits per-bucket averages. Untracked
//! days count as zeros (a true period average that penalizes gaps); days
//! after "today" are excluded from sums and counts entirely. "Today" is an
//! explicit parameter so the walk stays deterministic under test.

use std::collections::HashMap;

use chrono::{Datelike, Days, Months, NaiveDate};
use serde::Serialize;

use crate::history::store::HistoryStore;
use crate::history::totals::sample_day;
use crate::models::Catalog;

/// Selectable trend window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TimeRange {
    #[serde(rename = "1W")]
    Week,
    #[serde(rename = "1M")]
    Month,
    #[serde(rename = "3M")]
    ThreeMonths,
    #[serde(rename = "6M")]
    SixMonths,
    #[serde(rename = "1Y")]
    Year,
    #[serde(rename = "ALL")]
    All,
}

impl TimeRange {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "1W" => Some(TimeRange::Week),
            "1M" => Some(TimeRange::Month),
            "3M" => Some(TimeRange::ThreeMonths),
            "6M" => Some(TimeRange::SixMonths),
            "1Y" => Some(TimeRange::Year),
            "ALL" => Some(TimeRange::All),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TimeRange::Week => "1W",
            TimeRange::Month => "1M",
            TimeRange::ThreeMonths => "3M",
            TimeRange::SixMonths => "6M",
            TimeRange::Year => "1Y",
            TimeRange::All => "ALL",
        }
    }

    pub fn granularity(&self) -> Granularity {
        match self {
            TimeRange::Week | TimeRange::Month => Granularity::Day,
            TimeRange::ThreeMonths | TimeRange::SixMonths => Granularity::Week,
            TimeRange::Year | TimeRange::All => Granularity::Month,
        }
    }

    /// Start of the inclusive span ending at `anchor`
    fn span_start(&self, anchor: NaiveDate, store: &HistoryStore) -> NaiveDate {
        match self {
            TimeRange::Week => anchor - Days::new(6),
            TimeRange::Month => anchor - Days::new(29),
            TimeRange::ThreeMonths => anchor - Days::new(90),
            TimeRange::SixMonths => anchor
                .checked_sub_months(Months::new(6))
                .unwrap_or(anchor),
            TimeRange::Year => anchor
                .checked_sub_months(Months::new(12))
                .unwrap_or(anchor),
            // Earliest recorded date; one year back when nothing is recorded
            TimeRange::All => store.earliest_date().unwrap_or_else(|| {
                anchor
                    .checked_sub_months(Months::new(12))
                    .unwrap_or(anchor)
            }),
        }
    }
}

/// Bucket width
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Day,
    Week,
    Month,
}

/// Aggregation key for one bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum BucketKey {
    Day(NaiveDate),
    /// Sunday-aligned start of the week
    Week(NaiveDate),
    Month(i32, u32),
}

impl BucketKey {
    fn for_date(date: NaiveDate, granularity: Granularity) -> Self {
        match granularity {
            Granularity::Day => BucketKey::Day(date),
            Granularity::Week => {
                let back = date.weekday().num_days_from_sunday() as u64;
                BucketKey::Week(date - Days::new(back))
            }
            Granularity::Month => BucketKey::Month(date.year(), date.month()),
        }
    }
}

/// One emitted bucket: averages over the days counted into it
#[derive(Debug, Clone, Serialize)]
pub struct TrendPoint {
    /// Display label derived from the bucket's first date
    pub label: String,
    /// First date that fell into the bucket
    pub date: NaiveDate,
    pub protein: f64,
    pub kcal: f64,
    pub water: f64,
    /// Fraction of counted days with the sleep habit done (0-1)
    pub sleep: f64,
    /// Fraction of counted days with the creatine habit done (0-1)
    pub creatine: f64,
    /// Days accumulated into the bucket; 0 when every day was in the future
    pub days: u32,
}

/// Whole-period averages: the mean of the per-bucket averages
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct TrendAverages {
    pub protein: f64,
    pub kcal: f64,
    pub water: f64,
}

/// A complete trend query result
#[derive(Debug, Clone, Serialize)]
pub struct TrendReport {
    pub range: TimeRange,
    pub granularity: Granularity,
    pub points: Vec<TrendPoint>,
    pub averages: TrendAverages,
}

#[derive(Default)]
struct Accum {
    first_date: Option<NaiveDate>,
    days: u32,
    protein: f64,
    kcal: f64,
    water: f64,
    sleep: u32,
    creatine: u32,
}

/// Build the bucketed trend for `range` ending at `anchor`. Days after
/// `today` contribute nothing, not even a zero.
pub fn build_trend(
    store: &HistoryStore,
    catalog: &Catalog,
    anchor: NaiveDate,
    range: TimeRange,
    today: NaiveDate,
) -> TrendReport {
    let granularity = range.granularity();
    let start = range.span_start(anchor, store);

    let mut order: Vec<BucketKey> = Vec::new();
    let mut buckets: HashMap<BucketKey, Accum> = HashMap::new();

    let mut day = start;
    while day <= anchor {
        let key = BucketKey::for_date(day, granularity);
        let accum = buckets.entry(key).or_insert_with(|| {
            order.push(key);
            Accum::default()
        });
        if accum.first_date.is_none() {
            accum.first_date = Some(day);
        }

        if day <= today {
            let sample = sample_day(&store.day_log(day), catalog);
            accum.days += 1;
            accum.protein += sample.totals.protein;
            accum.kcal += sample.totals.kcal;
            accum.water += sample.water as f64;
            accum.sleep += sample.sleep as u32;
            accum.creatine += sample.creatine as u32;
        }

        match day.succ_opt() {
            Some(next) => day = next,
            None => break,
        }
    }

    let points: Vec<TrendPoint> = order
        .iter()
        .map(|key| {
            let accum = &buckets[key];
            let date = accum.first_date.unwrap_or(start);
            // An all-future bucket divides by 1 and reads as zeros
            let divisor = accum.days.max(1) as f64;
            TrendPoint {
                label: bucket_label(date, granularity),
                date,
                protein: accum.protein / divisor,
                kcal: accum.kcal / divisor,
                water: accum.water / divisor,
                sleep: accum.sleep as f64 / divisor,
                creatine: accum.creatine as f64 / divisor,
                days: accum.days,
            }
        })
        .collect();

    TrendReport {
        range,
        granularity,
        averages: period_averages(&points),
        points,
    }
}

/// Mean of the per-bucket averages, not a re-aggregation of raw days
fn period_averages(points: &[TrendPoint]) -> TrendAverages {
    let divisor = points.len().max(1) as f64;
    let mut sums = TrendAverages::default();
    for p in points {
        sums.protein += p.protein;
        sums.kcal += p.kcal;
        sums.water += p.water;
    }
    TrendAverages {
        protein: sums.protein / divisor,
        kcal: sums.kcal / divisor,
        water: sums.water / divisor,
    }
}

fn bucket_label(date: NaiveDate, granularity: Granularity) -> String {
    match granularity {
        Granularity::Day => format!("{}/{}", date.month(), date.day()),
        Granularity::Week => format!("W{}", week_of_year(date)),
        Granularity::Month => date.format("%b %y").to_string(),
    }
}

/// Week-of-year: ceil((days since Jan 1 + Sunday-based weekday of Jan 1 + 1) / 7)
fn week_of_year(date: NaiveDate) -> u32 {
    let jan1 = NaiveDate::from_ymd_opt(date.year(), 1, 1).expect("Jan 1 always exists");
    let x = date.ordinal0() + jan1.weekday().num_days_from_sunday() + 1;
    x.div_ceil(7)
}
