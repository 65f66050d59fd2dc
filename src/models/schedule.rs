//! Daily schedule catalog
//!
//! The fixed plan of meal/activity/workout blocks. Catalog order is
//! significant: the terminal resolves blocks by 1-based position.

use serde::{Deserialize, Serialize};

/// Block category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockType {
    Meal,
    Activity,
    Workout,
}

impl BlockType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BlockType::Meal => "meal",
            BlockType::Activity => "activity",
            BlockType::Workout => "workout",
        }
    }
}

/// A single food or activity line within a block
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MealItem {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<String>,
    pub protein: f64,
    pub kcal: f64,
}

/// A fixed plan entry with known macro contribution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleBlock {
    /// Stable identifier, unique within the catalog; never changes once defined
    pub id: String,
    /// Display time, e.g. "04:00 AM"
    pub time: String,
    /// 24h start encoded as HHMM, e.g. 1830 for 18:30
    pub start_time: u32,
    pub duration_minutes: u32,
    pub title: String,
    #[serde(rename = "type")]
    pub block_type: BlockType,
    pub items: Vec<MealItem>,
    /// Protein (g) credited when this block is marked complete
    pub total_protein: f64,
    /// Energy (kcal) credited when this block is marked complete
    pub total_kcal: f64,
}

impl ScheduleBlock {
    /// Start of the block in minutes since midnight
    pub fn start_minutes(&self) -> u32 {
        (self.start_time / 100) * 60 + self.start_time % 100
    }

    /// End of the block in minutes since midnight
    pub fn end_minutes(&self) -> u32 {
        self.start_minutes() + self.duration_minutes
    }
}

/// Where the clock currently falls within the schedule
#[derive(Debug, Clone, Serialize)]
pub struct SchedulePosition {
    pub active: Option<ScheduleBlock>,
    pub next: Option<ScheduleBlock>,
}

/// The ordered, immutable block catalog
#[derive(Debug, Clone)]
pub struct Catalog {
    blocks: Vec<ScheduleBlock>,
}

impl Catalog {
    pub fn new(blocks: Vec<ScheduleBlock>) -> Self {
        Self { blocks }
    }

    pub fn blocks(&self) -> &[ScheduleBlock] {
        &self.blocks
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Look up a block by id
    pub fn block(&self, id: &str) -> Option<&ScheduleBlock> {
        self.blocks.iter().find(|b| b.id == id)
    }

    /// Look up a block by 1-based catalog position
    pub fn by_position(&self, position: usize) -> Option<&ScheduleBlock> {
        if position == 0 {
            return None;
        }
        self.blocks.get(position - 1)
    }

    /// Resolve a free-text target to a block: title substring, display-time
    /// substring, or display time with the colon removed ("0400")
    pub fn find_fuzzy(&self, needle: &str) -> Option<&ScheduleBlock> {
        let needle = needle.to_lowercase();
        self.blocks.iter().find(|b| {
            b.title.to_lowercase().contains(&needle)
                || b.time.to_lowercase().contains(&needle)
                || b.time.replace(':', "").to_lowercase().contains(&needle)
        })
    }

    /// Active and upcoming block for a given minutes-since-midnight clock
    pub fn position_at(&self, minutes_of_day: u32) -> SchedulePosition {
        let active = self
            .blocks
            .iter()
            .find(|b| minutes_of_day >= b.start_minutes() && minutes_of_day < b.end_minutes())
            .cloned();
        let next = self
            .blocks
            .iter()
            .find(|b| b.start_minutes() > minutes_of_day)
            .cloned();
        SchedulePosition { active, next }
    }

    /// The standard bulking plan
    pub fn standard() -> Self {
        fn item(name: &str, quantity: &str, protein: f64, kcal: f64) -> MealItem {
            MealItem {
                name: name.to_string(),
                quantity: Some(quantity.to_string()),
                protein,
                kcal,
            }
        }

        Self::new(vec![
            ScheduleBlock {
                id: "block-0400".to_string(),
                time: "04:00 AM".to_string(),
                start_time: 400,
                duration_minutes: 60,
                title: "Initialize: Wake & Fuel".to_string(),
                block_type: BlockType::Meal,
                items: vec![
                    item("Eggs", "6 large", 36.0, 430.0),
                    item("Whey Protein", "1 serving", 23.0, 118.0),
                ],
                total_protein: 59.0,
                total_kcal: 548.0,
            },
            ScheduleBlock {
                id: "block-0630".to_string(),
                time: "06:30 AM".to_string(),
                start_time: 630,
                duration_minutes: 180,
                title: "Quest: Breakfast & Focus".to_string(),
                block_type: BlockType::Activity,
                items: vec![
                    item("Milk (200ml) + SF Cornflakes (40g)", "1 bowl", 10.0, 370.0),
                    item("Banana", "1 medium", 1.0, 100.0),
                ],
                total_protein: 11.0,
                total_kcal: 470.0,
            },
            ScheduleBlock {
                id: "block-0930".to_string(),
                time: "09:30 AM".to_string(),
                start_time: 930,
                duration_minutes: 30,
                title: "Consumable: Snack".to_string(),
                block_type: BlockType::Meal,
                items: vec![
                    item("Whey Protein", "1 serving", 23.0, 118.0),
                    item("Flavored Yogurt", "1 cup", 5.0, 150.0),
                ],
                total_protein: 28.0,
                total_kcal: 268.0,
            },
            ScheduleBlock {
                id: "block-1230".to_string(),
                time: "12:30 PM".to_string(),
                start_time: 1230,
                duration_minutes: 60,
                title: "Main Quest: Lunch".to_string(),
                block_type: BlockType::Meal,
                items: vec![
                    item("Chicken Breast", "200g", 62.0, 330.0),
                    item("Brown Rice", "200g", 5.0, 220.0),
                    item("Cheese / Nuggets / Cordon Bleu", "Small portion", 15.0, 400.0),
                ],
                total_protein: 82.0,
                total_kcal: 950.0,
            },
            ScheduleBlock {
                id: "block-1530".to_string(),
                time: "03:30 PM".to_string(),
                start_time: 1530,
                duration_minutes: 45,
                title: "Buff: Pre-Workout".to_string(),
                block_type: BlockType::Meal,
                items: vec![
                    item("Whey Protein", "1 serving", 23.0, 118.0),
                    item("Apple", "1 medium", 0.5, 80.0),
                    item("Salty Biscuits", "Small portion", 2.0, 150.0),
                ],
                total_protein: 25.5,
                total_kcal: 348.0,
            },
            ScheduleBlock {
                id: "block-1630".to_string(),
                time: "04:30 PM".to_string(),
                start_time: 1630,
                duration_minutes: 120,
                title: "DUNGEON: GYM".to_string(),
                block_type: BlockType::Workout,
                items: vec![item("Heavy Compounds", "Limit Break", 0.0, -400.0)],
                total_protein: 0.0,
                total_kcal: 0.0,
            },
            ScheduleBlock {
                id: "block-1830".to_string(),
                time: "06:30 PM".to_string(),
                start_time: 1830,
                duration_minutes: 60,
                title: "Recovery: Dinner".to_string(),
                block_type: BlockType::Meal,
                items: vec![
                    item("Whey Protein", "1 serving", 23.0, 118.0),
                    item("Extras (Cheese, Sauce, Toast)", "Optional", 5.0, 200.0),
                ],
                total_protein: 28.0,
                total_kcal: 318.0,
            },
            ScheduleBlock {
                id: "block-2030".to_string(),
                time: "08:30 PM".to_string(),
                start_time: 2030,
                duration_minutes: 30,
                title: "Final Consumable".to_string(),
                block_type: BlockType::Meal,
                items: vec![
                    item("Banana", "1 medium", 1.0, 100.0),
                    item("Leftovers (Nuggets/Cheese)", "Small portion", 5.0, 150.0),
                ],
                total_protein: 6.0,
                total_kcal: 250.0,
            },
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_catalog_order() {
        let catalog = Catalog::standard();
        assert_eq!(catalog.len(), 8);
        assert_eq!(catalog.by_position(1).unwrap().id, "block-0400");
        assert_eq!(catalog.by_position(8).unwrap().id, "block-2030");
        assert!(catalog.by_position(0).is_none());
        assert!(catalog.by_position(9).is_none());
    }

    #[test]
    fn test_block_lookup_by_id() {
        let catalog = Catalog::standard();
        let lunch = catalog.block("block-1230").unwrap();
        assert_eq!(lunch.total_protein, 82.0);
        assert!(catalog.block("block-9999").is_none());
    }

    #[test]
    fn test_fuzzy_matching() {
        let catalog = Catalog::standard();
        assert_eq!(catalog.find_fuzzy("lunch").unwrap().id, "block-1230");
        assert_eq!(catalog.find_fuzzy("4:00 am").unwrap().id, "block-0400");
        // Colon-stripped display time
        assert_eq!(catalog.find_fuzzy("0400").unwrap().id, "block-0400");
        assert!(catalog.find_fuzzy("second breakfast").is_none());
    }

    #[test]
    fn test_start_and_end_minutes() {
        let catalog = Catalog::standard();
        let gym = catalog.block("block-1630").unwrap();
        assert_eq!(gym.start_minutes(), 16 * 60 + 30);
        assert_eq!(gym.end_minutes(), 18 * 60 + 30);
    }

    #[test]
    fn test_position_at_clock() {
        let catalog = Catalog::standard();

        // 17:00 falls inside the gym block
        let pos = catalog.position_at(17 * 60);
        assert_eq!(pos.active.unwrap().id, "block-1630");
        assert_eq!(pos.next.unwrap().id, "block-1830");

        // 03:00 is before the first block
        let pos = catalog.position_at(3 * 60);
        assert!(pos.active.is_none());
        assert_eq!(pos.next.unwrap().id, "block-0400");

        // 23:00 is after everything
        let pos = catalog.position_at(23 * 60);
        assert!(pos.active.is_none());
        assert!(pos.next.is_none());
    }
}
