//! Day log model
//!
//! One mutable record per calendar date. Field names on the wire are
//! camelCase and the layout is the storage contract: unknown fields must
//! survive a round-trip untouched, and a malformed field decodes to its
//! default instead of failing the whole history load.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

fn default_readiness() -> i64 {
    8
}

/// Per-day user log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayLog {
    /// Completed schedule-block ids; toggle semantics, duplicates impossible
    #[serde(default, deserialize_with = "lenient_id_set")]
    pub completed_ids: BTreeSet<String>,
    /// Habit id -> completion flag; absent key means false
    #[serde(default, deserialize_with = "lenient_habit_map")]
    pub habits: BTreeMap<String, bool>,
    /// Manually logged protein (g), independent of schedule toggles
    #[serde(default, deserialize_with = "lenient_f64")]
    pub extra_protein: f64,
    /// Manually logged energy (kcal), independent of schedule toggles
    #[serde(default, deserialize_with = "lenient_f64")]
    pub extra_kcal: f64,
    /// Milliliters; draining may push this negative and the engine must
    /// tolerate that, not correct it
    #[serde(default, deserialize_with = "lenient_i64")]
    pub water_intake: i64,
    /// 1-10 scale, carried verbatim; the engine never interprets it
    #[serde(default = "default_readiness", deserialize_with = "lenient_readiness")]
    pub readiness: i64,
    /// Unknown wire fields, preserved for forward compatibility
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

impl Default for DayLog {
    fn default() -> Self {
        Self {
            completed_ids: BTreeSet::new(),
            habits: BTreeMap::new(),
            extra_protein: 0.0,
            extra_kcal: 0.0,
            water_intake: 0,
            readiness: default_readiness(),
            extra: serde_json::Map::new(),
        }
    }
}

impl DayLog {
    /// Whether a habit flag is set; absent means false
    pub fn habit_done(&self, id: &str) -> bool {
        self.habits.get(id).copied().unwrap_or(false)
    }

    /// Number of habit flags currently true
    pub fn habits_done(&self) -> usize {
        self.habits.values().filter(|v| **v).count()
    }
}

/// Accept any JSON shape for completedIds: arrays keep their string
/// entries, everything else decodes as empty
fn lenient_id_set<'de, D>(deserializer: D) -> Result<BTreeSet<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|v| match v {
                Value::String(s) => Some(s),
                _ => None,
            })
            .collect(),
        _ => BTreeSet::new(),
    })
}

/// Accept any JSON shape for habits: objects keep their boolean entries,
/// everything else decodes as empty
fn lenient_habit_map<'de, D>(deserializer: D) -> Result<BTreeMap<String, bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Object(entries) => entries
            .into_iter()
            .filter_map(|(k, v)| match v {
                Value::Bool(b) => Some((k, b)),
                _ => None,
            })
            .collect(),
        _ => BTreeMap::new(),
    })
}

fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value.as_f64().unwrap_or(0.0))
}

fn lenient_i64<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value
        .as_i64()
        .or_else(|| value.as_f64().map(|f| f as i64))
        .unwrap_or(0))
}

fn lenient_readiness<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value
        .as_i64()
        .or_else(|| value.as_f64().map(|f| f as i64))
        .unwrap_or_else(default_readiness))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_log() {
        let log = DayLog::default();
        assert!(log.completed_ids.is_empty());
        assert!(log.habits.is_empty());
        assert_eq!(log.extra_protein, 0.0);
        assert_eq!(log.extra_kcal, 0.0);
        assert_eq!(log.water_intake, 0);
        assert_eq!(log.readiness, 8);
    }

    #[test]
    fn test_wire_names_are_camel_case() {
        let mut log = DayLog::default();
        log.completed_ids.insert("block-0400".to_string());
        log.extra_protein = 12.5;
        log.water_intake = -250;

        let json = serde_json::to_value(&log).unwrap();
        assert_eq!(json["completedIds"], serde_json::json!(["block-0400"]));
        assert_eq!(json["extraProtein"], serde_json::json!(12.5));
        assert_eq!(json["waterIntake"], serde_json::json!(-250));
        assert_eq!(json["readiness"], serde_json::json!(8));
    }

    #[test]
    fn test_missing_fields_decode_to_defaults() {
        let log: DayLog = serde_json::from_str("{}").unwrap();
        assert_eq!(log, DayLog::default());

        let log: DayLog = serde_json::from_str(r#"{"extraProtein": 30}"#).unwrap();
        assert_eq!(log.extra_protein, 30.0);
        assert_eq!(log.readiness, 8);
    }

    #[test]
    fn test_malformed_fields_decode_to_defaults() {
        // completedIds as a string, habits as an array: both recover empty
        let log: DayLog = serde_json::from_str(
            r#"{"completedIds": "block-0400", "habits": ["sleep"], "waterIntake": 500}"#,
        )
        .unwrap();
        assert!(log.completed_ids.is_empty());
        assert!(log.habits.is_empty());
        assert_eq!(log.water_intake, 500);

        // Non-string array entries and non-bool habit values are dropped
        let log: DayLog = serde_json::from_str(
            r#"{"completedIds": ["block-0400", 7], "habits": {"sleep": true, "mood": "good"}}"#,
        )
        .unwrap();
        assert_eq!(log.completed_ids.len(), 1);
        assert_eq!(log.habits.len(), 1);
        assert!(log.habit_done("sleep"));

        // Wrong-typed numerics fall back instead of failing the decode
        let log: DayLog = serde_json::from_str(
            r#"{"extraProtein": "lots", "waterIntake": 250.8, "readiness": "fine"}"#,
        )
        .unwrap();
        assert_eq!(log.extra_protein, 0.0);
        assert_eq!(log.water_intake, 250);
        assert_eq!(log.readiness, 8);
    }

    #[test]
    fn test_unknown_fields_round_trip() {
        let wire = r#"{"completedIds":[],"habits":{},"extraProtein":0.0,"extraKcal":0.0,"waterIntake":0,"readiness":6,"mood":"grim","hrv":44}"#;
        let log: DayLog = serde_json::from_str(wire).unwrap();
        assert_eq!(log.readiness, 6);
        assert_eq!(log.extra["mood"], serde_json::json!("grim"));

        let back = serde_json::to_value(&log).unwrap();
        assert_eq!(back["hrv"], serde_json::json!(44));
        assert_eq!(back["mood"], serde_json::json!("grim"));
    }

    #[test]
    fn test_habit_helpers() {
        let mut log = DayLog::default();
        log.habits.insert("sleep".to_string(), true);
        log.habits.insert("creatine".to_string(), false);
        log.habits.insert("reading".to_string(), true);

        assert!(log.habit_done("sleep"));
        assert!(!log.habit_done("creatine"));
        assert!(!log.habit_done("absent"));
        assert_eq!(log.habits_done(), 2);
    }
}
