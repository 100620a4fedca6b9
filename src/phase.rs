use chrono::NaiveDate;

use crate::dates::day_difference;
use crate::models::{CyclePhase, Period};

/// Last day (offset from period start) of each phase. Fixed, and not scaled
/// to the user's average cycle length.
const MENSTRUAL_LAST_DAY: i64 = 5;
const FOLLICULAR_LAST_DAY: i64 = 13;
const OVULATION_LAST_DAY: i64 = 16;

/// The latest period starting on or before `date`.
pub fn relevant_period(date: NaiveDate, periods: &[Period]) -> Option<&Period> {
    periods
        .iter()
        .filter(|p| p.start_date <= date)
        .max_by_key(|p| p.start_date)
}

/// Classify `date` into a cycle phase by its offset from the latest period
/// start on or before it.
pub fn classify_phase(date: NaiveDate, periods: &[Period]) -> CyclePhase {
    match relevant_period(date, periods) {
        Some(period) => phase_for_offset(day_difference(period.start_date, date)),
        None => CyclePhase::None,
    }
}

pub fn phase_for_offset(days_since: i64) -> CyclePhase {
    match days_since {
        d if d <= MENSTRUAL_LAST_DAY => CyclePhase::Menstrual,
        d if d <= FOLLICULAR_LAST_DAY => CyclePhase::Follicular,
        d if d <= OVULATION_LAST_DAY => CyclePhase::Ovulation,
        _ => CyclePhase::Luteal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn phase_at(offset: i64, periods: &[Period]) -> CyclePhase {
        classify_phase(date("2024-01-01") + Duration::days(offset), periods)
    }

    #[test]
    fn phase_boundaries() {
        let periods = vec![Period::new(date("2024-01-01"), None)];
        assert_eq!(phase_at(0, &periods), CyclePhase::Menstrual);
        assert_eq!(phase_at(5, &periods), CyclePhase::Menstrual);
        assert_eq!(phase_at(6, &periods), CyclePhase::Follicular);
        assert_eq!(phase_at(13, &periods), CyclePhase::Follicular);
        assert_eq!(phase_at(14, &periods), CyclePhase::Ovulation);
        assert_eq!(phase_at(16, &periods), CyclePhase::Ovulation);
        assert_eq!(phase_at(17, &periods), CyclePhase::Luteal);
        assert_eq!(phase_at(40, &periods), CyclePhase::Luteal);
    }

    #[test]
    fn no_period_before_date() {
        let periods = vec![
            Period::new(date("2024-02-01"), None),
            Period::new(date("2024-03-01"), None),
        ];
        assert_eq!(classify_phase(date("2024-01-15"), &periods), CyclePhase::None);
        assert_eq!(classify_phase(date("2024-01-15"), &[]), CyclePhase::None);
    }

    #[test]
    fn uses_latest_period_on_or_before_date() {
        let periods = vec![
            Period::new(date("2024-02-01"), None),
            Period::new(date("2024-01-01"), None),
            Period::new(date("2024-03-01"), None),
        ];
        // 2024-02-03 is day 2 of the February period, not day 33 of January's
        assert_eq!(classify_phase(date("2024-02-03"), &periods), CyclePhase::Menstrual);
        assert_eq!(
            relevant_period(date("2024-02-03"), &periods).map(|p| p.start_date),
            Some(date("2024-02-01"))
        );
    }

    #[test]
    fn ignores_average_cycle_length() {
        // 21-day cycles, yet day 18 is still luteal
        let periods = vec![
            Period::new(date("2024-01-01"), None),
            Period::new(date("2024-01-22"), None),
        ];
        assert_eq!(classify_phase(date("2024-02-09"), &periods), CyclePhase::Luteal);
    }
}
