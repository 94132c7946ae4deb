use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

pub const SAMPLE_NOTE: &str = "DEV_RANDOM";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EntryType {
    Water,
    Urine,
    Note,
}

impl EntryType {
    pub fn display_name(self) -> &'static str {
        match self {
            EntryType::Water => "Intake",
            EntryType::Urine => "Urine",
            EntryType::Note => "Note",
        }
    }

    pub fn is_volume(self) -> bool {
        !matches!(self, EntryType::Note)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Urgency {
    #[default]
    Empty,
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub id: String,
    #[serde(rename = "type")]
    pub entry_type: EntryType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intake_type_id: Option<String>,
    #[serde(default)]
    pub amount: u32,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub notes: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub urgency: Option<Urgency>,
}

/// An entry as submitted by the dashboard form or the edit dialog.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryDraft {
    #[serde(rename = "type")]
    pub entry_type: EntryType,
    #[serde(default)]
    pub intake_type_id: Option<String>,
    #[serde(default)]
    pub amount: u32,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub urgency: Option<Urgency>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntakeCategory {
    pub id: String,
    pub label: String,
    pub is_deletable: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuickButton {
    pub id: String,
    #[serde(rename = "type")]
    pub entry_type: EntryType,
    pub label: String,
    pub amount: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Theme {
    Light,
    Dark,
    #[default]
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Sex {
    Male,
    Female,
    Other,
    #[default]
    Unspecified,
}

impl Sex {
    pub fn as_str(self) -> &'static str {
        match self {
            Sex::Male => "MALE",
            Sex::Female => "FEMALE",
            Sex::Other => "OTHER",
            Sex::Unspecified => "UNSPECIFIED",
        }
    }
}

/// Wall-clock window, both ends inclusive, as "HH:mm".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: String,
    pub end: String,
}

impl TimeRange {
    pub fn new(start: &str, end: &str) -> Self {
        Self {
            start: start.to_string(),
            end: end.to_string(),
        }
    }

    pub fn contains(&self, hhmm: &str) -> bool {
        hhmm >= self.start.as_str() && hhmm <= self.end.as_str()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DayParts {
    pub night: TimeRange,
    pub morning: TimeRange,
    pub afternoon: TimeRange,
    pub evening: TimeRange,
}

impl DayParts {
    /// Named windows in matching order.
    pub fn ordered(&self) -> [(&'static str, &TimeRange); 4] {
        [
            ("Night", &self.night),
            ("Morning", &self.morning),
            ("Afternoon", &self.afternoon),
            ("Evening", &self.evening),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserSettings {
    pub default_water_amount: u32,
    pub default_urine_amount: u32,
    pub amount_increment: u32,
    pub quick_buttons: Vec<QuickButton>,
    pub intake_categories: Vec<IntakeCategory>,
    pub theme: Theme,
    pub age: u32,
    pub sex: Sex,
    pub day_parts: DayParts,
}

#[derive(Debug, Clone, Default)]
pub struct AppData {
    pub entries: Vec<LogEntry>,
    pub settings: UserSettings,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DayTotals {
    pub intake: u64,
    pub output: u64,
    pub net: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyPoint {
    pub date: NaiveDate,
    pub intake: u64,
    pub output: u64,
    pub net: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayPartBucket {
    pub name: &'static str,
    pub intake: i64,
    pub urine: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryStats {
    pub avg_intake_per_day: i64,
    pub avg_urine_per_day: i64,
    pub avg_net_per_day: i64,
    pub avg_intake_entries_per_day: f64,
    pub avg_urine_entries_per_day: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct TodaySummary {
    pub date: NaiveDate,
    pub intake_total: u64,
    pub intake_count: usize,
    pub urine_total: u64,
    pub urine_count: usize,
    pub net_volume: i64,
    pub entries: Vec<LogEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub start_time: String,
    pub end_time: String,
    pub active_days: usize,
    pub summary: SummaryStats,
    pub daily_trend: Vec<DailyPoint>,
    pub day_parts: Vec<DayPartBucket>,
    pub entries: Vec<LogEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub in_month: bool,
    pub entry_count: usize,
    pub totals: DayTotals,
}

#[derive(Debug, Clone, Serialize)]
pub struct CalendarMonth {
    pub year: i32,
    pub month: u32,
    pub days: Vec<CalendarDay>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DayDetail {
    pub date: NaiveDate,
    pub totals: DayTotals,
    pub entries: Vec<LogEntry>,
}

#[derive(Debug, Deserialize)]
pub struct ReportQuery {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CalendarQuery {
    pub year: Option<i32>,
    pub month: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct DayQuery {
    pub date: NaiveDate,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ImportResponse {
    pub added: usize,
    pub total: usize,
}

#[derive(Debug, Deserialize)]
pub struct NewCategoryRequest {
    pub label: String,
}

#[derive(Debug, Deserialize)]
pub struct NewQuickButtonRequest {
    #[serde(rename = "type")]
    pub entry_type: EntryType,
    pub label: String,
    pub amount: u32,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReorderList {
    Categories,
    QuickButtons,
}

#[derive(Debug, Deserialize)]
pub struct ReorderRequest {
    pub list: ReorderList,
    pub from: usize,
    pub to: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Model,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub text: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct InsightsRequest {
    #[serde(default)]
    pub prompt: Option<String>,
    #[serde(default)]
    pub history: Vec<ChatMessage>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct InsightsResponse {
    pub text: String,
    pub history: Vec<ChatMessage>,
}
