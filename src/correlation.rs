//! Symptom and mood correlation across cycle phases.
//!
//! Only events from the trailing [`CORRELATION_WINDOW_DAYS`] count. Symptoms
//! are bucketed by the phase their date falls in; the fullest bucket is the
//! dominant phase.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::dates::add_days;
use crate::models::{CyclePhase, LoggedMood, LoggedSymptom, MoodType, Period};
use crate::phase::classify_phase;

pub const CORRELATION_WINDOW_DAYS: i64 = 30;
pub const TOP_N: usize = 3;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SymptomCount {
    pub name: String,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MoodCount {
    pub mood: MoodType,
    pub count: usize,
}

/// Symptom names logged in each phase, one entry per occurrence.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PhaseBuckets {
    pub menstrual: Vec<String>,
    pub follicular: Vec<String>,
    pub ovulation: Vec<String>,
    pub luteal: Vec<String>,
}

impl PhaseBuckets {
    fn bucket_mut(&mut self, phase: CyclePhase) -> Option<&mut Vec<String>> {
        match phase {
            CyclePhase::Menstrual => Some(&mut self.menstrual),
            CyclePhase::Follicular => Some(&mut self.follicular),
            CyclePhase::Ovulation => Some(&mut self.ovulation),
            CyclePhase::Luteal => Some(&mut self.luteal),
            CyclePhase::None => None,
        }
    }

    pub fn get(&self, phase: CyclePhase) -> &[String] {
        match phase {
            CyclePhase::Menstrual => &self.menstrual,
            CyclePhase::Follicular => &self.follicular,
            CyclePhase::Ovulation => &self.ovulation,
            CyclePhase::Luteal => &self.luteal,
            CyclePhase::None => &[],
        }
    }

    /// Phase with the most entries. Ties go to the earlier phase in the cycle.
    pub fn dominant(&self) -> Option<(CyclePhase, usize)> {
        let mut best: Option<(CyclePhase, usize)> = None;
        for phase in [
            CyclePhase::Menstrual,
            CyclePhase::Follicular,
            CyclePhase::Ovulation,
            CyclePhase::Luteal,
        ] {
            let len = self.get(phase).len();
            if len > best.map_or(0, |(_, n)| n) {
                best = Some((phase, len));
            }
        }
        best
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PhaseInsight {
    Dominant {
        phase: CyclePhase,
        symptom_count: usize,
        most_common: Option<String>,
    },
    NoPattern,
}

impl PhaseInsight {
    pub fn message(&self) -> String {
        match self {
            PhaseInsight::Dominant {
                phase,
                symptom_count,
                most_common: Some(name),
            } => format!(
                "Symptoms cluster in your {} phase ({} logged), most often {}",
                phase.label(),
                symptom_count,
                name
            ),
            PhaseInsight::Dominant {
                phase,
                symptom_count,
                most_common: None,
            } => format!(
                "Symptoms cluster in your {} phase ({} logged)",
                phase.label(),
                symptom_count
            ),
            PhaseInsight::NoPattern => "No pattern detected yet".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum CorrelationInsights {
    /// Nothing logged inside the window.
    Empty,
    Populated {
        top_symptoms: Vec<SymptomCount>,
        top_moods: Vec<MoodCount>,
        phase_buckets: PhaseBuckets,
        dominant_phase: PhaseInsight,
    },
}

impl CorrelationInsights {
    pub fn is_empty(&self) -> bool {
        matches!(self, CorrelationInsights::Empty)
    }
}

/// Rank recent symptoms and moods and find the phase where symptoms cluster.
pub fn compute_correlation_insights(
    symptoms: &[LoggedSymptom],
    moods: &[LoggedMood],
    periods: &[Period],
    today: NaiveDate,
) -> CorrelationInsights {
    let cutoff = add_days(today, -CORRELATION_WINDOW_DAYS);

    let recent_symptoms: Vec<&LoggedSymptom> =
        symptoms.iter().filter(|s| s.date >= cutoff).collect();
    let recent_moods: Vec<&LoggedMood> = moods.iter().filter(|m| m.date >= cutoff).collect();

    if recent_symptoms.is_empty() && recent_moods.is_empty() {
        return CorrelationInsights::Empty;
    }

    let mut phase_buckets = PhaseBuckets::default();
    for symptom in &recent_symptoms {
        if let Some(bucket) = phase_buckets.bucket_mut(classify_phase(symptom.date, periods)) {
            bucket.push(symptom.name.clone());
        }
    }

    let dominant_phase = match phase_buckets.dominant() {
        Some((phase, symptom_count)) => PhaseInsight::Dominant {
            phase,
            symptom_count,
            most_common: rank_names(phase_buckets.get(phase).iter().map(String::as_str))
                .into_iter()
                .next()
                .map(|c| c.name),
        },
        None => PhaseInsight::NoPattern,
    };

    CorrelationInsights::Populated {
        top_symptoms: rank_names(recent_symptoms.iter().map(|s| s.name.as_str()))
            .into_iter()
            .take(TOP_N)
            .collect(),
        top_moods: rank_moods(recent_moods.iter().map(|m| m.mood))
            .into_iter()
            .take(TOP_N)
            .collect(),
        phase_buckets,
        dominant_phase,
    }
}

// Ties break alphabetically so the ranking never depends on input order.
fn rank_names<'a>(names: impl Iterator<Item = &'a str>) -> Vec<SymptomCount> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for name in names {
        *counts.entry(name).or_default() += 1;
    }
    let mut ranked: Vec<SymptomCount> = counts
        .into_iter()
        .map(|(name, count)| SymptomCount {
            name: name.to_string(),
            count,
        })
        .collect();
    ranked.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));
    ranked
}

fn rank_moods(moods: impl Iterator<Item = MoodType>) -> Vec<MoodCount> {
    let mut counts: HashMap<MoodType, usize> = HashMap::new();
    for mood in moods {
        *counts.entry(mood).or_default() += 1;
    }
    let mut ranked: Vec<MoodCount> = counts
        .into_iter()
        .map(|(mood, count)| MoodCount { mood, count })
        .collect();
    ranked.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.mood.cmp(&b.mood)));
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{SymptomCategory, SymptomIntensity};

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn symptom(day: &str, name: &str) -> LoggedSymptom {
        LoggedSymptom::new(
            date(day),
            name,
            SymptomCategory::Physical,
            SymptomIntensity::Moderate,
        )
    }

    fn mood(day: &str, mood: MoodType) -> LoggedMood {
        LoggedMood::new(date(day), mood, 3)
    }

    type Ranking = (Vec<SymptomCount>, Vec<MoodCount>, PhaseInsight);

    // Bucket contents follow input order, so only the ranked parts are compared
    fn ranking(insights: CorrelationInsights) -> Ranking {
        let CorrelationInsights::Populated {
            top_symptoms,
            top_moods,
            dominant_phase,
            ..
        } = insights
        else {
            panic!("expected populated insights");
        };
        (top_symptoms, top_moods, dominant_phase)
    }

    fn periods() -> Vec<Period> {
        vec![
            Period::new(date("2024-03-01"), Some(date("2024-03-05"))),
            Period::new(date("2024-03-29"), None),
        ]
    }

    #[test]
    fn nothing_logged_is_empty_state() {
        let insights = compute_correlation_insights(&[], &[], &periods(), date("2024-04-10"));
        assert_eq!(insights, CorrelationInsights::Empty);
        assert!(insights.is_empty());
    }

    #[test]
    fn only_stale_events_is_empty_state() {
        let symptoms = vec![symptom("2024-01-02", "cramps")];
        let moods = vec![mood("2024-01-03", MoodType::Sad)];
        let insights =
            compute_correlation_insights(&symptoms, &moods, &periods(), date("2024-04-10"));
        assert!(insights.is_empty());
    }

    #[test]
    fn window_includes_its_first_day() {
        let symptoms = vec![symptom("2024-03-11", "acne")];
        let insights = compute_correlation_insights(&symptoms, &[], &periods(), date("2024-04-10"));
        assert!(!insights.is_empty());
    }

    #[test]
    fn ranks_top_three_by_count() {
        let symptoms = vec![
            symptom("2024-03-30", "cramps"),
            symptom("2024-03-31", "cramps"),
            symptom("2024-04-01", "cramps"),
            symptom("2024-03-30", "headache"),
            symptom("2024-04-02", "headache"),
            symptom("2024-03-20", "bloating"),
            symptom("2024-03-21", "acne"),
        ];
        let moods = vec![
            mood("2024-03-30", MoodType::Irritable),
            mood("2024-03-31", MoodType::Irritable),
            mood("2024-04-01", MoodType::Calm),
        ];
        let CorrelationInsights::Populated {
            top_symptoms,
            top_moods,
            ..
        } = compute_correlation_insights(&symptoms, &moods, &periods(), date("2024-04-10"))
        else {
            panic!("expected populated insights");
        };

        let names: Vec<(&str, usize)> = top_symptoms
            .iter()
            .map(|c| (c.name.as_str(), c.count))
            .collect();
        assert_eq!(names, vec![("cramps", 3), ("headache", 2), ("acne", 1)]);
        assert_eq!(
            top_moods,
            vec![
                MoodCount {
                    mood: MoodType::Irritable,
                    count: 2,
                },
                MoodCount {
                    mood: MoodType::Calm,
                    count: 1,
                },
            ]
        );
    }

    #[test]
    fn buckets_symptoms_by_phase() {
        let symptoms = vec![
            symptom("2024-03-20", "bloating"), // 19 days in: luteal
            symptom("2024-03-24", "bloating"),
            symptom("2024-03-26", "headache"),
            symptom("2024-03-30", "cramps"), // day after the next start: menstrual
        ];
        let CorrelationInsights::Populated {
            phase_buckets,
            dominant_phase,
            ..
        } = compute_correlation_insights(&symptoms, &[], &periods(), date("2024-04-10"))
        else {
            panic!("expected populated insights");
        };

        assert_eq!(phase_buckets.luteal, vec!["bloating", "bloating", "headache"]);
        assert_eq!(phase_buckets.menstrual, vec!["cramps"]);
        assert!(phase_buckets.follicular.is_empty());
        assert_eq!(
            dominant_phase,
            PhaseInsight::Dominant {
                phase: CyclePhase::Luteal,
                symptom_count: 3,
                most_common: Some("bloating".to_string()),
            }
        );
        assert_eq!(
            dominant_phase.message(),
            "Symptoms cluster in your luteal phase (3 logged), most often bloating"
        );
    }

    #[test]
    fn moods_only_reports_no_pattern() {
        let moods = vec![mood("2024-04-01", MoodType::Happy)];
        let CorrelationInsights::Populated {
            top_symptoms,
            dominant_phase,
            ..
        } = compute_correlation_insights(&[], &moods, &periods(), date("2024-04-10"))
        else {
            panic!("expected populated insights");
        };
        assert!(top_symptoms.is_empty());
        assert_eq!(dominant_phase, PhaseInsight::NoPattern);
        assert_eq!(dominant_phase.message(), "No pattern detected yet");
    }

    #[test]
    fn symptoms_before_any_period_have_no_phase() {
        let symptoms = vec![symptom("2024-04-01", "fatigue")];
        let later = vec![Period::new(date("2024-04-05"), None)];
        let CorrelationInsights::Populated {
            phase_buckets,
            dominant_phase,
            ..
        } = compute_correlation_insights(&symptoms, &[], &later, date("2024-04-10"))
        else {
            panic!("expected populated insights");
        };
        assert_eq!(phase_buckets, PhaseBuckets::default());
        assert_eq!(dominant_phase, PhaseInsight::NoPattern);
    }

    #[test]
    fn input_order_does_not_change_result() {
        let symptoms = vec![
            symptom("2024-03-30", "cramps"),
            symptom("2024-03-30", "headache"),
            symptom("2024-03-31", "acne"),
            symptom("2024-04-01", "bloating"),
        ];
        let mut reversed = symptoms.clone();
        reversed.reverse();
        let moods = vec![
            mood("2024-03-30", MoodType::Sad),
            mood("2024-03-31", MoodType::Anxious),
        ];
        let mut reversed_moods = moods.clone();
        reversed_moods.reverse();

        let today = date("2024-04-10");
        let a = ranking(compute_correlation_insights(&symptoms, &moods, &periods(), today));
        let b = ranking(compute_correlation_insights(
            &reversed,
            &reversed_moods,
            &periods(),
            today,
        ));
        assert_eq!(a, b);
    }
}
