//! SYSTEM OS MCP Server Implementation
//!
//! Implements the MCP server with all tracker tools.

use std::sync::Arc;

use chrono::{Local, Timelike};
use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{
    CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
};
use rmcp::{schemars, tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::batch::run_batch;
use crate::coach::Coach;
use crate::history::daily_totals;
use crate::models::HABITS;
use crate::tools::status::StatusTracker;
use crate::tools::{analytics, days, Session};

/// SYSTEM OS MCP Service
#[derive(Clone)]
pub struct SystemOsService {
    session: Session,
    status_tracker: Arc<Mutex<StatusTracker>>,
    coach: Option<Coach>,
    tool_router: ToolRouter<SystemOsService>,
}

impl SystemOsService {
    pub fn new(session: Session, coach: Option<Coach>) -> Self {
        Self {
            session,
            status_tracker: Arc::new(Mutex::new(StatusTracker::new())),
            coach,
            tool_router: Self::tool_router(),
        }
    }

    fn today() -> String {
        Local::now().date_naive().to_string()
    }

    fn today_date() -> chrono::NaiveDate {
        Local::now().date_naive()
    }

    fn now_minutes() -> u32 {
        let now = Local::now();
        now.hour() * 60 + now.minute()
    }
}

// ============================================================================
// Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct GetDayParams {
    /// Date in ISO format YYYY-MM-DD (default: today)
    pub date: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ToggleBlockParams {
    /// Date in ISO format YYYY-MM-DD (default: today)
    pub date: Option<String>,
    /// Schedule block id, e.g. "block-0400"
    pub block_id: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ToggleHabitParams {
    /// Date in ISO format YYYY-MM-DD (default: today)
    pub date: Option<String>,
    /// Habit id: creatine, sleep, or reading
    pub habit_id: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct AddMacrosParams {
    /// Date in ISO format YYYY-MM-DD (default: today)
    pub date: Option<String>,
    /// Protein to add in grams (non-negative)
    #[serde(default)]
    pub protein: f64,
    /// Energy to add in kcal (non-negative)
    #[serde(default)]
    pub kcal: f64,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct AddWaterParams {
    /// Date in ISO format YYYY-MM-DD (default: today)
    pub date: Option<String>,
    /// Milliliters to add; negative values drain
    pub amount: i64,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ResetDayParams {
    /// Date in ISO format YYYY-MM-DD (default: today)
    pub date: Option<String>,
    /// REQUIRED: Must be true to confirm wiping the day
    #[serde(default)]
    pub force: bool,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct RunBatchParams {
    /// Date in ISO format YYYY-MM-DD (default: today)
    pub date: Option<String>,
    /// Command lines, one per line: "p 30", "k 500", "w 250", "done 1",
    /// "done lunch", "h sleep"
    pub commands: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct GetTrendParams {
    /// Anchor date in ISO format YYYY-MM-DD (default: today)
    pub date: Option<String>,
    /// Time range: 1W, 1M, 3M, 6M, 1Y, or ALL (default 1W)
    #[serde(default = "default_range")]
    pub range: String,
}

fn default_range() -> String {
    "1W".to_string()
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct GetCalendarParams {
    /// Calendar year, e.g. 2025
    pub year: i32,
    /// Calendar month 1-12
    pub month: u32,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct AskCoachParams {
    /// Message for the coach
    pub message: String,
}

// ============================================================================
// Response Structs
// ============================================================================

#[derive(Debug, Serialize)]
struct RunBatchResponse {
    date: String,
    log: Vec<String>,
    blocks_toggled: usize,
    habits_toggled: usize,
    protein_added: i64,
    kcal_added: i64,
    water_added: i64,
}

#[derive(Debug, Serialize)]
struct SaveNowResponse {
    success: bool,
    message: String,
    days_tracked: usize,
}

#[derive(Debug, Serialize)]
struct HabitListResponse {
    habits: Vec<HabitEntry>,
}

#[derive(Debug, Serialize)]
struct HabitEntry {
    id: &'static str,
    label: &'static str,
    icon: &'static str,
}

#[derive(Debug, Serialize)]
struct AskCoachResponse {
    reply: String,
}

fn to_result<T: Serialize>(value: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| McpError::internal_error(e.to_string(), None))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

// ============================================================================
// Tools
// ============================================================================

#[tool_router]
impl SystemOsService {
    // --- Status ---

    #[tool(description = "Get the current status of the SYSTEM OS service including build info, storage mode, and store statistics")]
    async fn system_status(&self) -> Result<CallToolResult, McpError> {
        let tracker = self.status_tracker.lock().await;
        let status = tracker.get_status(&self.session).await;
        to_result(&status)
    }

    // --- Day ---

    #[tool(description = "Get the full picture of one day: totals, goal percentages, status, score, completed blocks, habits, and water")]
    async fn get_day(&self, Parameters(p): Parameters<GetDayParams>) -> Result<CallToolResult, McpError> {
        let date = p.date.unwrap_or_else(Self::today);
        let detail = days::get_day(&self.session, &date)
            .await
            .map_err(|e| McpError::internal_error(e, None))?;
        to_result(&detail)
    }

    #[tool(description = "Toggle completion of a schedule block for a date (completes if pending, un-completes if done)")]
    async fn toggle_block(&self, Parameters(p): Parameters<ToggleBlockParams>) -> Result<CallToolResult, McpError> {
        let date = p.date.unwrap_or_else(Self::today);
        let response = days::toggle_block(&self.session, &date, &p.block_id)
            .await
            .map_err(|e| McpError::internal_error(e, None))?;
        to_result(&response)
    }

    #[tool(description = "Toggle a daily habit flag for a date. Use list_habits for the valid ids.")]
    async fn toggle_habit(&self, Parameters(p): Parameters<ToggleHabitParams>) -> Result<CallToolResult, McpError> {
        let date = p.date.unwrap_or_else(Self::today);
        let response = days::toggle_habit(&self.session, &date, &p.habit_id)
            .await
            .map_err(|e| McpError::internal_error(e, None))?;
        to_result(&response)
    }

    #[tool(description = "List the available daily habits")]
    fn list_habits(&self) -> Result<CallToolResult, McpError> {
        let response = HabitListResponse {
            habits: HABITS
                .iter()
                .map(|h| HabitEntry {
                    id: h.id,
                    label: h.label,
                    icon: h.icon,
                })
                .collect(),
        };
        to_result(&response)
    }

    #[tool(description = "Add manually eaten macros (protein grams and kcal) on top of the schedule for a date")]
    async fn add_macros(&self, Parameters(p): Parameters<AddMacrosParams>) -> Result<CallToolResult, McpError> {
        let date = p.date.unwrap_or_else(Self::today);
        let response = days::add_macros(&self.session, &date, p.protein, p.kcal)
            .await
            .map_err(|e| McpError::internal_error(e, None))?;
        to_result(&response)
    }

    #[tool(description = "Add water intake in milliliters for a date; a negative amount drains (totals may go negative and are tolerated)")]
    async fn add_water(&self, Parameters(p): Parameters<AddWaterParams>) -> Result<CallToolResult, McpError> {
        let date = p.date.unwrap_or_else(Self::today);
        let response = days::add_water(&self.session, &date, p.amount)
            .await
            .map_err(|e| McpError::internal_error(e, None))?;
        to_result(&response)
    }

    #[tool(description = "Remove every logged value for a date (distinct from zeroing: the date disappears from history). Requires force=true.")]
    async fn reset_day(&self, Parameters(p): Parameters<ResetDayParams>) -> Result<CallToolResult, McpError> {
        let date = p.date.unwrap_or_else(Self::today);
        let response = days::reset_day(&self.session, &date, p.force)
            .await
            .map_err(|e| McpError::internal_error(e, None))?;
        to_result(&response)
    }

    #[tool(description = "Execute a multi-line batch of terminal commands against a date: 'p 30' protein, 'k 500' kcal, 'w 250' water, 'done 1'/'done lunch' blocks, 'h sleep' habits")]
    async fn run_batch(&self, Parameters(p): Parameters<RunBatchParams>) -> Result<CallToolResult, McpError> {
        let date = p.date.unwrap_or_else(Self::today);
        let day = crate::tools::parse_date(&date).map_err(|e| McpError::internal_error(e, None))?;

        let report = {
            let mut store = self.session.store.lock().await;
            run_batch(&mut store, day, &self.session.catalog, &p.commands)
        };
        self.session.autosave.touch();

        to_result(&RunBatchResponse {
            date: day.to_string(),
            log: report.log,
            blocks_toggled: report.blocks_toggled,
            habits_toggled: report.habits_toggled,
            protein_added: report.protein_added,
            kcal_added: report.kcal_added,
            water_added: report.water_added,
        })
    }

    // --- Analytics ---

    #[tool(description = "Bucketed trend (protein, kcal, water, habit consistency) for a range ending at the anchor date. Ranges 1W/1M bucket by day, 3M/6M by week, 1Y/ALL by month.")]
    async fn get_trend(&self, Parameters(p): Parameters<GetTrendParams>) -> Result<CallToolResult, McpError> {
        let date = p.date.unwrap_or_else(Self::today);
        let report = analytics::trend(&self.session, &date, &p.range, Self::today_date())
            .await
            .map_err(|e| McpError::internal_error(e, None))?;
        to_result(&report)
    }

    #[tool(description = "Per-day status dots (empty/started/good/perfect) for one calendar month")]
    async fn get_calendar(&self, Parameters(p): Parameters<GetCalendarParams>) -> Result<CallToolResult, McpError> {
        let response = analytics::calendar_month(&self.session, p.year, p.month)
            .await
            .map_err(|e| McpError::internal_error(e, None))?;
        to_result(&response)
    }

    #[tool(description = "60-day consistency heatmap: one intensity 0-4 per day ending today")]
    async fn get_heatmap(&self) -> Result<CallToolResult, McpError> {
        let response = analytics::heatmap_view(&self.session, Self::today_date()).await;
        to_result(&response)
    }

    #[tool(description = "The schedule block active right now and the next one coming up")]
    fn current_block(&self) -> Result<CallToolResult, McpError> {
        let position = days::current_block(&self.session, Self::now_minutes());
        to_result(&position)
    }

    // --- Persistence ---

    #[tool(description = "Persist the history snapshot immediately instead of waiting for the autosave quiet period")]
    async fn save_now(&self) -> Result<CallToolResult, McpError> {
        let days_tracked = self.session.store.lock().await.days_tracked();
        let response = match self.session.autosave.flush().await {
            Ok(()) => SaveNowResponse {
                success: true,
                message: format!("Saved to {}", self.session.backend.describe()),
                days_tracked,
            },
            // A failed save is reported, not fatal; memory stays authoritative
            Err(e) => SaveNowResponse {
                success: false,
                message: format!("Save failed: {e}; in-memory history retained"),
                days_tracked,
            },
        };
        to_result(&response)
    }

    // --- Coach ---

    #[tool(description = "Ask the coach a question; today's stats are attached as context")]
    async fn ask_coach(&self, Parameters(p): Parameters<AskCoachParams>) -> Result<CallToolResult, McpError> {
        let Some(coach) = &self.coach else {
            return Err(McpError::internal_error(
                "Coach endpoint is not configured (set SYSTEMOS_COACH_URL)".to_string(),
                None,
            ));
        };

        let context = {
            let store = self.session.store.lock().await;
            let log = store.day_log(Self::today_date());
            let totals = daily_totals(&log, &self.session.catalog);
            format!(
                "Today: {:.0}g/{:.0}g protein, {:.0}/{:.0} kcal, {}ml/{:.0}ml water, {}/{} blocks, {} habits done.",
                totals.protein,
                self.session.goals.protein,
                totals.kcal,
                self.session.goals.kcal,
                log.water_intake,
                self.session.goals.water,
                log.completed_ids.len(),
                self.session.catalog.len(),
                log.habits_done(),
            )
        };

        let reply = coach
            .ask(&context, &p.message)
            .await
            .map_err(|e| McpError::internal_error(format!("Coach request failed: {e}"), None))?;
        to_result(&AskCoachResponse { reply })
    }
}

#[tool_handler]
impl ServerHandler for SystemOsService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "systemos".into(),
                version: crate::build_info::VERSION.into(),
                title: Some("SYSTEM OS".into()),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "SYSTEM OS - daily nutrition, hydration, and habit tracking. \
                 Days: get_day/toggle_block/toggle_habit/list_habits/add_macros/add_water, \
                 reset_day (requires force=true), run_batch for terminal-style multi-line input. \
                 Analytics: get_trend (1W/1M by day, 3M/6M by week, 1Y/ALL by month), \
                 get_calendar for month status dots, get_heatmap for 60-day consistency, \
                 current_block for the live schedule position. \
                 Persistence: changes autosave two seconds after the last mutation; save_now forces it. \
                 Coach: ask_coach relays a message with today's stats attached."
                    .into(),
            ),
        }
    }
}
