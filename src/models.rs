use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Period {
    pub id: Uuid,
    pub start_date: NaiveDate,
    /// Absent for single-day or ongoing periods.
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl Period {
    pub fn new(start_date: NaiveDate, end_date: Option<NaiveDate>) -> Self {
        Self {
            id: Uuid::new_v4(),
            start_date,
            end_date,
            notes: None,
        }
    }

    /// Length in days counting both ends, if the period has ended.
    pub fn length_days(&self) -> Option<i64> {
        self.end_date.map(|end| (end - self.start_date).num_days() + 1)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum SymptomCategory {
    Physical,
    Emotional,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum SymptomIntensity {
    Mild,
    Moderate,
    Severe,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggedSymptom {
    pub id: Uuid,
    pub date: NaiveDate,
    pub name: String,
    pub category: SymptomCategory,
    pub intensity: SymptomIntensity,
    /// User-defined rather than one of the predefined symptoms.
    #[serde(default)]
    pub is_custom: bool,
}

impl LoggedSymptom {
    pub fn new(
        date: NaiveDate,
        name: impl Into<String>,
        category: SymptomCategory,
        intensity: SymptomIntensity,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            date,
            name: name.into(),
            category,
            intensity,
            is_custom: false,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum MoodType {
    Happy,
    Sad,
    Anxious,
    Energetic,
    Irritable,
    Calm,
    Stressed,
    Excited,
}

impl MoodType {
    pub fn label(self) -> &'static str {
        match self {
            MoodType::Happy => "happy",
            MoodType::Sad => "sad",
            MoodType::Anxious => "anxious",
            MoodType::Energetic => "energetic",
            MoodType::Irritable => "irritable",
            MoodType::Calm => "calm",
            MoodType::Stressed => "stressed",
            MoodType::Excited => "excited",
        }
    }
}

pub const MOOD_INTENSITY_MIN: u8 = 1;
pub const MOOD_INTENSITY_MAX: u8 = 5;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggedMood {
    pub id: Uuid,
    pub date: NaiveDate,
    pub mood: MoodType,
    pub intensity: u8, // 1-5
}

impl LoggedMood {
    pub fn new(date: NaiveDate, mood: MoodType, intensity: u8) -> Self {
        Self {
            id: Uuid::new_v4(),
            date,
            mood,
            intensity,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BbtReading {
    pub id: Uuid,
    pub date: NaiveDate,
    pub temperature_celsius: f32,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MucusType {
    Dry,
    Sticky,
    Creamy,
    Watery,
    EggWhite,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CervicalMucusObservation {
    pub id: Uuid,
    pub date: NaiveDate,
    pub kind: MucusType,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum CyclePhase {
    Menstrual,
    Follicular,
    Ovulation,
    Luteal,
    None,
}

impl CyclePhase {
    pub fn label(self) -> &'static str {
        match self {
            CyclePhase::Menstrual => "menstrual",
            CyclePhase::Follicular => "follicular",
            CyclePhase::Ovulation => "ovulation",
            CyclePhase::Luteal => "luteal",
            CyclePhase::None => "none",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CycleStats {
    pub average_cycle_length: i64,
    pub next_predicted_period: Option<NaiveDate>,
    pub total_periods: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FertileWindow {
    pub ovulation_date: NaiveDate,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CycleHistory {
    /// Start-to-start lengths in chronological order.
    pub cycle_lengths: Vec<i64>,
    pub shortest_cycle: Option<i64>,
    pub longest_cycle: Option<i64>,
    pub average_period_length: Option<f32>,
    pub last_period_start: Option<NaiveDate>,
    pub last_period_end: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CycleSummary {
    /// 1-based; day 1 is the first day of the current period.
    pub cycle_day: i64,
    pub phase: CyclePhase,
    /// Negative once the predicted start has passed.
    pub days_until_next_period: i64,
    pub in_fertile_window: bool,
    pub start_date: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppData {
    #[serde(default)]
    pub periods: Vec<Period>,
    #[serde(default)]
    pub symptoms: Vec<LoggedSymptom>,
    #[serde(default)]
    pub moods: Vec<LoggedMood>,
    #[serde(default)]
    pub bbt_readings: Vec<BbtReading>,
    #[serde(default)]
    pub cervical_mucus: Vec<CervicalMucusObservation>,
    #[serde(default)]
    pub settings: AppSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct AppSettings {
    #[serde(default)]
    pub show_fertility: bool,
}

/// Phase of a single calendar day, for month views.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DayPhase {
    pub date: NaiveDate,
    pub phase: CyclePhase,
}

/// Data returned to the frontend for a month view
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthView {
    pub year: i32,
    pub month: u32,
    pub periods: Vec<Period>,
    pub symptoms: Vec<LoggedSymptom>,
    pub moods: Vec<LoggedMood>,
    pub phases: Vec<DayPhase>,
    pub stats: CycleStats,
    pub fertility: Option<FertileWindow>,
}
