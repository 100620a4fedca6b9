use chrono::NaiveDate;

use crate::dates::{add_days, day_difference, is_date_in_range};
use crate::models::{CycleHistory, CycleStats, CycleSummary, FertileWindow, Period};
use crate::phase::{classify_phase, relevant_period};

/// Fallback cycle length when there is no start-to-start sample to average.
/// A fixed domain default, never computed.
pub const DEFAULT_CYCLE_LENGTH: i64 = 28;

/// Luteal phase length assumed for every user.
pub const LUTEAL_PHASE_DAYS: i64 = 14;

/// Days before ovulation that count as fertile.
pub const FERTILE_DAYS_BEFORE: i64 = 5;
/// Days after ovulation that count as fertile.
pub const FERTILE_DAYS_AFTER: i64 = 1;

/// Compute average cycle length and the next predicted period start.
pub fn compute_cycle_stats(periods: &[Period]) -> CycleStats {
    let starts = sorted_starts(periods);
    let Some(&last_start) = starts.last() else {
        return CycleStats {
            average_cycle_length: DEFAULT_CYCLE_LENGTH,
            next_predicted_period: None,
            total_periods: 0,
        };
    };

    let average_cycle_length = average_length(&cycle_lengths(&starts));

    CycleStats {
        average_cycle_length,
        next_predicted_period: Some(add_days(last_start, average_cycle_length)),
        total_periods: periods.len(),
    }
}

/// Estimate ovulation and the fertile window from the most recent period.
/// Ovulation sits `LUTEAL_PHASE_DAYS` before the next expected start; the
/// window runs from 5 days before ovulation to 1 day after.
///
/// With an average cycle shorter than the luteal phase the ovulation date
/// lands before the period start. That is left as-is.
pub fn compute_fertile_window(periods: &[Period]) -> Option<FertileWindow> {
    let last_start = periods.iter().map(|p| p.start_date).max()?;
    let stats = compute_cycle_stats(periods);

    let ovulation_day = stats.average_cycle_length - LUTEAL_PHASE_DAYS;
    let ovulation_date = add_days(last_start, ovulation_day);

    Some(FertileWindow {
        ovulation_date,
        start: add_days(ovulation_date, -FERTILE_DAYS_BEFORE),
        end: add_days(ovulation_date, FERTILE_DAYS_AFTER),
    })
}

/// Compute per-cycle history for the stats view.
pub fn cycle_history(periods: &[Period]) -> CycleHistory {
    let mut sorted: Vec<&Period> = periods.iter().collect();
    sorted.sort_by_key(|p| p.start_date);

    let starts: Vec<NaiveDate> = sorted.iter().map(|p| p.start_date).collect();
    let cycle_lengths = cycle_lengths(&starts);

    let period_lengths: Vec<f64> = sorted
        .iter()
        .filter_map(|p| p.length_days())
        .map(|days| days as f64)
        .collect();

    let last = sorted.last();

    CycleHistory {
        shortest_cycle: cycle_lengths.iter().copied().min(),
        longest_cycle: cycle_lengths.iter().copied().max(),
        average_period_length: if period_lengths.is_empty() {
            None
        } else {
            Some(mean(&period_lengths) as f32)
        },
        last_period_start: last.map(|p| p.start_date),
        last_period_end: last.and_then(|p| p.end_date),
        cycle_lengths,
    }
}

/// Where `today` sits in the current cycle. `None` until a period has started
/// on or before `today`.
pub fn cycle_summary(periods: &[Period], today: NaiveDate) -> Option<CycleSummary> {
    let current = relevant_period(today, periods)?;
    let stats = compute_cycle_stats(periods);
    let next = stats.next_predicted_period?;

    let in_fertile_window = compute_fertile_window(periods)
        .map(|w| is_date_in_range(today, w.start, Some(w.end)))
        .unwrap_or(false);

    Some(CycleSummary {
        cycle_day: day_difference(current.start_date, today) + 1,
        phase: classify_phase(today, periods),
        days_until_next_period: (next - today).num_days(),
        in_fertile_window,
        start_date: current.start_date,
    })
}

fn sorted_starts(periods: &[Period]) -> Vec<NaiveDate> {
    let mut starts: Vec<NaiveDate> = periods.iter().map(|p| p.start_date).collect();
    starts.sort();
    starts
}

fn cycle_lengths(sorted_starts: &[NaiveDate]) -> Vec<i64> {
    sorted_starts
        .windows(2)
        .map(|w| day_difference(w[0], w[1]))
        .collect()
}

fn average_length(samples: &[i64]) -> i64 {
    if samples.is_empty() {
        return DEFAULT_CYCLE_LENGTH;
    }
    let values: Vec<f64> = samples.iter().map(|&s| s as f64).collect();
    mean(&values).round() as i64
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}
