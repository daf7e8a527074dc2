// src/model.rs
use crate::date_key::DateKey;
use crate::oura::MetricCategory;

/// Per-category value handed from the fetch step to the reconciler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricValue {
    Score(i64),
    /// The provider answered, with no scored record for the day.
    NoData,
    /// The fetch for this category failed; the stored value must be kept.
    Unavailable,
}

impl MetricValue {
    pub fn score(self) -> Option<i64> {
        match self {
            MetricValue::Score(s) => Some(s),
            _ => None,
        }
    }
}

impl From<Option<i64>> for MetricValue {
    fn from(v: Option<i64>) -> Self {
        v.map_or(MetricValue::NoData, MetricValue::Score)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailyScores {
    pub date: DateKey,
    pub readiness: MetricValue,
    pub sleep: MetricValue,
    pub activity: MetricValue,
}

impl DailyScores {
    /// Scores straight from the provider; `None` becomes `NoData`.
    pub fn new(
        date: DateKey,
        readiness: Option<i64>,
        sleep: Option<i64>,
        activity: Option<i64>,
    ) -> Self {
        Self {
            date,
            readiness: readiness.into(),
            sleep: sleep.into(),
            activity: activity.into(),
        }
    }

    pub fn get(&self, category: MetricCategory) -> MetricValue {
        match category {
            MetricCategory::Readiness => self.readiness,
            MetricCategory::Sleep => self.sleep,
            MetricCategory::Activity => self.activity,
        }
    }

    /// A zero score is still a score.
    pub fn has_any_score(&self) -> bool {
        MetricCategory::ALL
            .iter()
            .any(|c| self.get(*c).score().is_some())
    }

    /// At least one category could not be fetched.
    pub fn any_unavailable(&self) -> bool {
        MetricCategory::ALL
            .iter()
            .any(|c| self.get(*c) == MetricValue::Unavailable)
    }

    pub fn title(&self) -> String {
        page_title(self.date)
    }
}

pub fn page_title(date: DateKey) -> String {
    format!("Oura Score {date}")
}
