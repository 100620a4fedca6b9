use std::sync::{Mutex, MutexGuard};

use chrono::{Datelike, Duration, NaiveDate};
use uuid::Uuid;

use crate::clock::Clock;
use crate::correlation::{compute_correlation_insights, CorrelationInsights};
use crate::dates::is_date_in_range;
use crate::models::*;
use crate::phase::classify_phase;
use crate::prediction;
use crate::storage::{StorageError, Store};

#[derive(Debug, thiserror::Error)]
pub enum TrackerError {
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),
    #[error("period ends ({end}) before it starts ({start})")]
    EndBeforeStart { start: NaiveDate, end: NaiveDate },
    #[error("mood intensity {0} outside 1-5")]
    IntensityOutOfRange(u8),
    #[error("temperature {0} outside 30-45 °C")]
    InvalidTemperature(f32),
    #[error("symptom name is empty")]
    EmptyName,
    #[error("no record with id {0}")]
    NotFound(Uuid),
    #[error("tracker state poisoned")]
    StatePoisoned,
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, TrackerError>;

const MAX_YEAR: i32 = 9999;
const BBT_RANGE_CELSIUS: std::ops::RangeInclusive<f32> = 30.0..=45.0;

/// Parse a `YYYY-MM-DD` date coming from the UI. Years are limited to
/// 1-9999 so date arithmetic on stored records cannot overflow.
pub fn parse_date(date: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
        .ok()
        .filter(|d| (1..=MAX_YEAR).contains(&d.year()))
        .ok_or_else(|| TrackerError::InvalidDate(date.to_string()))
}

/// Loaded records plus the store and clock they are queried against.
/// Every mutation is persisted before it returns.
pub struct Tracker<S: Store, C: Clock> {
    store: S,
    clock: C,
    data: Mutex<AppData>,
}

impl<S: Store, C: Clock> Tracker<S, C> {
    /// Load existing data, or persist an empty document on first run.
    pub fn open(store: S, clock: C) -> Result<Self> {
        let data = if store.exists()? {
            store.load()?
        } else {
            let data = AppData::default();
            store.save(&data)?;
            tracing::info!("initialized empty tracker data");
            data
        };
        tracing::debug!(
            periods = data.periods.len(),
            symptoms = data.symptoms.len(),
            moods = data.moods.len(),
            "tracker opened"
        );
        Ok(Self {
            store,
            clock,
            data: Mutex::new(data),
        })
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    fn data(&self) -> Result<MutexGuard<'_, AppData>> {
        self.data.lock().map_err(|_| TrackerError::StatePoisoned)
    }

    /// Apply `f` to a copy and only keep it once the store has saved it.
    fn mutate<T>(&self, f: impl FnOnce(&mut AppData) -> Result<T>) -> Result<T> {
        let mut data = self.data()?;
        let mut next = data.clone();
        let out = f(&mut next)?;
        if let Err(e) = self.store.save(&next) {
            tracing::warn!(error = %e, "save failed, change discarded");
            return Err(e.into());
        }
        *data = next;
        Ok(out)
    }

    // Periods

    pub fn add_period(
        &self,
        start: &str,
        end: Option<&str>,
        notes: Option<String>,
    ) -> Result<Period> {
        let (start_date, end_date) = parse_range(start, end)?;
        let period = Period {
            id: Uuid::new_v4(),
            start_date,
            end_date,
            notes: clean_notes(notes),
        };
        let created = period.clone();
        self.mutate(|data| {
            data.periods.push(period);
            Ok(())
        })?;
        tracing::info!(start = %created.start_date, "period added");
        Ok(created)
    }

    pub fn update_period(
        &self,
        id: Uuid,
        start: &str,
        end: Option<&str>,
        notes: Option<String>,
    ) -> Result<Period> {
        let (start_date, end_date) = parse_range(start, end)?;
        self.mutate(|data| {
            let period = data
                .periods
                .iter_mut()
                .find(|p| p.id == id)
                .ok_or(TrackerError::NotFound(id))?;
            period.start_date = start_date;
            period.end_date = end_date;
            period.notes = clean_notes(notes);
            Ok(period.clone())
        })
    }

    pub fn delete_period(&self, id: Uuid) -> Result<()> {
        self.mutate(|data| remove_by_id(&mut data.periods, id, |p| p.id))?;
        tracing::info!(%id, "period deleted");
        Ok(())
    }

    /// All periods, oldest first.
    pub fn periods(&self) -> Result<Vec<Period>> {
        let mut periods = self.data()?.periods.clone();
        periods.sort_by_key(|p| p.start_date);
        Ok(periods)
    }

    // Symptoms and moods

    pub fn log_symptom(
        &self,
        date: &str,
        name: &str,
        category: SymptomCategory,
        intensity: SymptomIntensity,
        is_custom: bool,
    ) -> Result<LoggedSymptom> {
        let date = parse_date(date)?;
        let name = name.trim();
        if name.is_empty() {
            return Err(TrackerError::EmptyName);
        }
        let symptom = LoggedSymptom {
            is_custom,
            ..LoggedSymptom::new(date, name, category, intensity)
        };
        let created = symptom.clone();
        self.mutate(|data| {
            data.symptoms.push(symptom);
            Ok(())
        })?;
        Ok(created)
    }

    pub fn delete_symptom(&self, id: Uuid) -> Result<()> {
        self.mutate(|data| remove_by_id(&mut data.symptoms, id, |s| s.id))
    }

    pub fn symptoms(&self) -> Result<Vec<LoggedSymptom>> {
        Ok(self.data()?.symptoms.clone())
    }

    pub fn log_mood(&self, date: &str, mood: MoodType, intensity: u8) -> Result<LoggedMood> {
        let date = parse_date(date)?;
        if !(MOOD_INTENSITY_MIN..=MOOD_INTENSITY_MAX).contains(&intensity) {
            return Err(TrackerError::IntensityOutOfRange(intensity));
        }
        let logged = LoggedMood::new(date, mood, intensity);
        let created = logged.clone();
        self.mutate(|data| {
            data.moods.push(logged);
            Ok(())
        })?;
        Ok(created)
    }

    pub fn delete_mood(&self, id: Uuid) -> Result<()> {
        self.mutate(|data| remove_by_id(&mut data.moods, id, |m| m.id))
    }

    pub fn moods(&self) -> Result<Vec<LoggedMood>> {
        Ok(self.data()?.moods.clone())
    }

    // Fertility signals

    pub fn log_bbt(&self, date: &str, temperature_celsius: f32) -> Result<BbtReading> {
        // Non-finite values would serialize as null and break the stored file
        if !temperature_celsius.is_finite() || !BBT_RANGE_CELSIUS.contains(&temperature_celsius) {
            return Err(TrackerError::InvalidTemperature(temperature_celsius));
        }
        let reading = BbtReading {
            id: Uuid::new_v4(),
            date: parse_date(date)?,
            temperature_celsius,
        };
        let created = reading.clone();
        self.mutate(|data| {
            // One reading per day
            data.bbt_readings.retain(|r| r.date != reading.date);
            data.bbt_readings.push(reading);
            Ok(())
        })?;
        Ok(created)
    }

    pub fn bbt_readings(&self) -> Result<Vec<BbtReading>> {
        let mut readings = self.data()?.bbt_readings.clone();
        readings.sort_by_key(|r| r.date);
        Ok(readings)
    }

    pub fn log_cervical_mucus(
        &self,
        date: &str,
        kind: MucusType,
    ) -> Result<CervicalMucusObservation> {
        let observation = CervicalMucusObservation {
            id: Uuid::new_v4(),
            date: parse_date(date)?,
            kind,
        };
        let created = observation.clone();
        self.mutate(|data| {
            data.cervical_mucus.retain(|o| o.date != observation.date);
            data.cervical_mucus.push(observation);
            Ok(())
        })?;
        Ok(created)
    }

    pub fn cervical_mucus(&self) -> Result<Vec<CervicalMucusObservation>> {
        let mut observations = self.data()?.cervical_mucus.clone();
        observations.sort_by_key(|o| o.date);
        Ok(observations)
    }

    // Queries

    pub fn stats(&self) -> Result<CycleStats> {
        Ok(prediction::compute_cycle_stats(&self.data()?.periods))
    }

    pub fn fertile_window(&self) -> Result<Option<FertileWindow>> {
        Ok(prediction::compute_fertile_window(&self.data()?.periods))
    }

    pub fn history(&self) -> Result<CycleHistory> {
        Ok(prediction::cycle_history(&self.data()?.periods))
    }

    pub fn summary(&self) -> Result<Option<CycleSummary>> {
        let today = self.today();
        Ok(prediction::cycle_summary(&self.data()?.periods, today))
    }

    pub fn phase_on(&self, date: &str) -> Result<CyclePhase> {
        let date = parse_date(date)?;
        Ok(classify_phase(date, &self.data()?.periods))
    }

    pub fn phase_today(&self) -> Result<CyclePhase> {
        let today = self.today();
        Ok(classify_phase(today, &self.data()?.periods))
    }

    pub fn insights(&self) -> Result<CorrelationInsights> {
        let today = self.today();
        let data = self.data()?;
        Ok(compute_correlation_insights(
            &data.symptoms,
            &data.moods,
            &data.periods,
            today,
        ))
    }

    /// Everything the calendar needs for one month.
    pub fn month(&self, year: i32, month: u32) -> Result<MonthView> {
        let first_day = NaiveDate::from_ymd_opt(year, month, 1)
            .ok_or_else(|| TrackerError::InvalidDate(format!("{year:04}-{month:02}-01")))?;
        let next_month = if month == 12 {
            NaiveDate::from_ymd_opt(year + 1, 1, 1)
        } else {
            NaiveDate::from_ymd_opt(year, month + 1, 1)
        }
        .ok_or_else(|| TrackerError::InvalidDate(format!("{year:04}-{month:02}-01")))?;
        let last_day = next_month - Duration::days(1);

        let data = self.data()?;

        // A period touches the month if it overlaps it at all
        let periods: Vec<Period> = data
            .periods
            .iter()
            .filter(|p| {
                p.start_date <= last_day && p.end_date.unwrap_or(p.start_date) >= first_day
            })
            .cloned()
            .collect();

        let in_month = |d: NaiveDate| is_date_in_range(d, first_day, Some(last_day));
        let symptoms: Vec<LoggedSymptom> = data
            .symptoms
            .iter()
            .filter(|s| in_month(s.date))
            .cloned()
            .collect();
        let moods: Vec<LoggedMood> = data
            .moods
            .iter()
            .filter(|m| in_month(m.date))
            .cloned()
            .collect();

        let phases: Vec<DayPhase> = first_day
            .iter_days()
            .take_while(|d| *d <= last_day)
            .map(|date| DayPhase {
                date,
                phase: classify_phase(date, &data.periods),
            })
            .collect();

        let fertility = if data.settings.show_fertility {
            prediction::compute_fertile_window(&data.periods)
        } else {
            None
        };

        Ok(MonthView {
            year: first_day.year(),
            month: first_day.month(),
            periods,
            symptoms,
            moods,
            phases,
            stats: prediction::compute_cycle_stats(&data.periods),
            fertility,
        })
    }

    // Settings and data

    pub fn settings(&self) -> Result<AppSettings> {
        Ok(self.data()?.settings.clone())
    }

    pub fn toggle_fertility(&self, enabled: bool) -> Result<()> {
        self.mutate(|data| {
            data.settings.show_fertility = enabled;
            Ok(())
        })
    }

    pub fn export_data(&self) -> Result<String> {
        let data = self.data()?;
        Ok(serde_json::to_string_pretty(&*data)?)
    }

    pub fn wipe_all_data(&self) -> Result<()> {
        let mut data = self.data()?;
        self.store.wipe()?;
        *data = AppData::default();
        tracing::warn!("all tracker data wiped");
        Ok(())
    }
}

fn parse_range(start: &str, end: Option<&str>) -> Result<(NaiveDate, Option<NaiveDate>)> {
    let start = parse_date(start)?;
    let end = end.map(parse_date).transpose()?;
    if let Some(end) = end {
        if end < start {
            return Err(TrackerError::EndBeforeStart { start, end });
        }
    }
    Ok((start, end))
}

fn clean_notes(notes: Option<String>) -> Option<String> {
    notes
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
}

fn remove_by_id<T>(items: &mut Vec<T>, id: Uuid, key: impl Fn(&T) -> Uuid) -> Result<()> {
    let before = items.len();
    items.retain(|item| key(item) != id);
    if items.len() == before {
        return Err(TrackerError::NotFound(id));
    }
    Ok(())
}
