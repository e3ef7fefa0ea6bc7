//! Record-level filter state.
//!
//! This is the pre-aggregation pass: it shrinks the record set before any
//! grouping happens. The minimum-response threshold is stored here too, but
//! it is never consulted by [`filter_records`]; see [`crate::suppression`]
//! for the post-aggregation pass that applies it.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::constants::filters::{AGE, COMPENSATION};
use crate::data::{GenderLabel, Respondent, ValueRange};
use crate::errors::SurveyError;

/// Current values of every user-adjustable filter.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FilterState {
    /// Inclusive age bounds.
    pub age: ValueRange,
    /// Inclusive compensation bounds.
    pub compensation: ValueRange,
    /// Inclusion flag per gender label, in dataset first-occurrence order.
    pub genders: IndexMap<GenderLabel, bool>,
    /// Per-group response threshold applied after aggregation.
    pub min_responses: u64,
}

impl FilterState {
    /// True when the respondent passes every record-level filter.
    ///
    /// Absent age or compensation never satisfies a range. Gender inclusion is
    /// an OR across the respondent's own reported genders, so a respondent with
    /// no reported gender is never admitted.
    pub fn admits(&self, respondent: &Respondent) -> bool {
        let in_range = |value: Option<f64>, range: &ValueRange| {
            value.is_some_and(|value| range.contains(value))
        };
        in_range(respondent.age, &self.age)
            && in_range(respondent.converted_comp, &self.compensation)
            && respondent
                .gender
                .iter()
                .any(|gender| self.is_gender_included(gender))
    }

    /// Labels that are unknown to the inclusion map count as excluded.
    pub fn is_gender_included(&self, gender: &str) -> bool {
        self.genders.get(gender).copied().unwrap_or(false)
    }
}

/// A single filter mutation requested by a widget.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "value")]
pub enum FilterUpdate {
    /// Replace the age range.
    Age(ValueRange),
    /// Replace the compensation range.
    Compensation(ValueRange),
    /// Toggle one gender label.
    Gender { label: GenderLabel, included: bool },
    /// Replace the per-group minimum response threshold.
    MinResponses(u64),
}

/// Keep the records admitted by `state`, in dataset order.
pub fn filter_records<'a>(records: &'a [Respondent], state: &FilterState) -> Vec<&'a Respondent> {
    records
        .iter()
        .filter(|respondent| state.admits(respondent))
        .collect()
}

/// Check a requested range and clamp it into the dataset bounds.
pub(crate) fn validate_range(
    filter: &str,
    requested: ValueRange,
    bounds: &ValueRange,
) -> Result<ValueRange, SurveyError> {
    let invalid = || SurveyError::InvalidRange {
        filter: filter.to_string(),
        min: requested.min,
        max: requested.max,
    };
    if requested.min.is_nan() || requested.max.is_nan() || requested.min > requested.max {
        return Err(invalid());
    }
    Ok(requested.clamp_to(bounds))
}

pub(crate) fn validate_age(
    requested: ValueRange,
    bounds: &ValueRange,
) -> Result<ValueRange, SurveyError> {
    validate_range(AGE, requested, bounds)
}

pub(crate) fn validate_compensation(
    requested: ValueRange,
    bounds: &ValueRange,
) -> Result<ValueRange, SurveyError> {
    validate_range(COMPENSATION, requested, bounds)
}
