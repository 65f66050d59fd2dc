//! History aggregation engine
//!
//! Turns the sparse per-day log store into derived statistics: daily
//! totals, bucketed trends, and consistency scores. Nothing in here is
//! fallible: malformed history degrades to defaults at the read boundary.

mod score;
mod store;
mod totals;
mod trend;

pub use score::{day_status, heatmap, score_day, DayStatus, HeatmapCell, HEATMAP_DAYS};
pub use store::HistoryStore;
pub use totals::{daily_totals, sample_day, DailyTotals, DaySample};
pub use trend::{build_trend, Granularity, TimeRange, TrendAverages, TrendPoint, TrendReport};
