//! Analytics tools
//!
//! Trend, calendar, and heatmap views. All three consume the same accessor
//! and aggregator as the day tools; "today" arrives as an argument from the
//! caller so the views stay deterministic.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::history::{
    build_trend, day_status, heatmap, DayStatus, HeatmapCell, TimeRange, TrendReport,
    HEATMAP_DAYS,
};

use super::{parse_date, Session};

/// One calendar cell
#[derive(Debug, Serialize)]
pub struct CalendarDay {
    pub date: String,
    pub status: DayStatus,
}

/// Response for get_calendar
#[derive(Debug, Serialize)]
pub struct CalendarMonth {
    pub year: i32,
    pub month: u32,
    pub days: Vec<CalendarDay>,
}

/// Response for get_heatmap
#[derive(Debug, Serialize)]
pub struct HeatmapResponse {
    pub days: u64,
    pub cells: Vec<HeatmapCell>,
}

/// Bucketed trend for a range ending at the anchor date
pub async fn trend(
    session: &Session,
    anchor: &str,
    range: &str,
    today: NaiveDate,
) -> Result<TrendReport, String> {
    let anchor = parse_date(anchor)?;
    let range = TimeRange::parse(range)
        .ok_or_else(|| format!("Invalid range (expected 1W, 1M, 3M, 6M, 1Y, or ALL): {range}"))?;

    let store = session.store.lock().await;
    Ok(build_trend(&store, &session.catalog, anchor, range, today))
}

/// Day statuses for one calendar month
pub async fn calendar_month(
    session: &Session,
    year: i32,
    month: u32,
) -> Result<CalendarMonth, String> {
    if !(1..=12).contains(&month) {
        return Err(format!("Invalid month: {month}"));
    }

    let store = session.store.lock().await;
    let mut days = Vec::new();
    let mut date = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| format!("Invalid calendar month: {year}-{month:02}"))?;
    while date.month() == month {
        days.push(CalendarDay {
            date: date.to_string(),
            status: day_status(&store.day_log(date), &session.catalog, &session.goals),
        });
        match date.succ_opt() {
            Some(next) => date = next,
            None => break,
        }
    }

    Ok(CalendarMonth { year, month, days })
}

/// Consistency heatmap ending at `today`
pub async fn heatmap_view(session: &Session, today: NaiveDate) -> HeatmapResponse {
    let store = session.store.lock().await;
    HeatmapResponse {
        days: HEATMAP_DAYS,
        cells: heatmap(&store, &session.catalog, &session.goals, today, HEATMAP_DAYS),
    }
}
